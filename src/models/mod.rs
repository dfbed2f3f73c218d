pub mod submission;

pub use submission::{ContactInput, Submission};
