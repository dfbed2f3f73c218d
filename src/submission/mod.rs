pub mod ids;
pub mod pipeline;

pub use pipeline::IngestionWorkflow;
