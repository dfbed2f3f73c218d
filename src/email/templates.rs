use askama::Template;
use chrono::{DateTime, Utc};

use crate::models::Submission;

pub struct RenderedNotification {
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Template)]
#[template(path = "email/notification.html")]
struct NotificationHtml<'a> {
    name: &'a str,
    email: &'a str,
    service: &'a str,
    message: &'a str,
    received: String,
    reply_label: String,
    id: i64,
}

#[derive(Template)]
#[template(path = "email/notification.txt")]
struct NotificationText<'a> {
    name: &'a str,
    email: &'a str,
    service: &'a str,
    message: &'a str,
    received: String,
    id: i64,
}

pub fn render_notification(submission: &Submission) -> Result<RenderedNotification, askama::Error> {
    let html = NotificationHtml {
        name: &submission.name,
        email: &submission.email,
        service: &submission.service,
        message: &submission.message,
        received: format_long(&submission.timestamp),
        reply_label: reply_label(&submission.name),
        id: submission.id,
    }
    .render()?;

    let text = NotificationText {
        name: &submission.name,
        email: &submission.email,
        service: &submission.service,
        message: &submission.message,
        received: format_short(&submission.timestamp),
        id: submission.id,
    }
    .render()?;

    Ok(RenderedNotification {
        subject: format!("New Contact: {} - {}", submission.name, submission.service),
        text,
        html,
    })
}

/// e.g. "Sun, Oct 18, 2026, 09:15 AM UTC"
fn format_long(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %b %-d, %Y, %I:%M %p UTC").to_string()
}

/// e.g. "10/18/2026, 9:15:02 AM UTC"
fn format_short(ts: &DateTime<Utc>) -> String {
    ts.format("%-m/%-d/%Y, %-I:%M:%S %p UTC").to_string()
}

fn reply_label(name: &str) -> String {
    match name.split_whitespace().next() {
        Some(first) => format!("REPLY TO {}", first.to_uppercase()),
        None => "REPLY".to_string(),
    }
}
