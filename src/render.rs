//! Formatting of walk results for the terminal, as text or JSON.

use humansize::{format_size, BINARY};

use crate::error::MimeError;
use crate::model::outcome::Outcome;
use crate::parser::message::MessageSummary;

/// Format the envelope summary, one `Name: value` line per field.
pub fn summary_text(summary: &MessageSummary) -> String {
    let mut content = String::new();
    content.push_str(&format!("From: {}\n", summary.from));
    content.push_str(&format!("To: {}\n", summary.to));
    content.push_str(&format!("Subject: {}\n", summary.subject));
    content.push_str(&format!("Date: {}\n", summary.date));
    content.push_str(&format!("Content-Type: {}\n", summary.content_type));
    content
}

/// Format one walk result as display text (without a trailing newline).
pub fn item_text(item: &Result<Outcome, MimeError>) -> String {
    match item {
        Ok(Outcome::Text { text, .. }) => text.trim_end_matches(['\r', '\n']).to_string(),
        Ok(Outcome::Attachment {
            filename,
            content_type,
        }) => format!("Attachment: {filename}; {content_type}"),
        Ok(Outcome::Unsupported { content_type }) => {
            format!("[unsupported content type: {content_type}]")
        }
        Ok(Outcome::Warning { error, raw_len }) => {
            format!("[warning: {error} ({})]", format_size(*raw_len as u64, BINARY))
        }
        Err(error) => format!("[error: {error}]"),
    }
}

/// Format a whole walk: optional summary, then every result in order.
pub fn render_text(
    summary: Option<&MessageSummary>,
    items: &[Result<Outcome, MimeError>],
    separate_parts: bool,
) -> String {
    let mut content = String::new();
    if let Some(summary) = summary {
        content.push_str(&summary_text(summary));
        content.push('\n');
    }
    for (i, item) in items.iter().enumerate() {
        if separate_parts && i > 0 {
            content.push('\n');
        }
        content.push_str(&item_text(item));
        content.push('\n');
    }
    content
}

/// Convert one walk result to a JSON value.
pub fn item_json(item: &Result<Outcome, MimeError>) -> serde_json::Value {
    match item {
        Ok(Outcome::Text { text, charset }) => serde_json::json!({
            "kind": "text",
            "charset": charset,
            "text": text,
        }),
        Ok(Outcome::Attachment {
            filename,
            content_type,
        }) => serde_json::json!({
            "kind": "attachment",
            "filename": filename,
            "content_type": content_type,
        }),
        Ok(Outcome::Unsupported { content_type }) => serde_json::json!({
            "kind": "unsupported",
            "content_type": content_type,
        }),
        Ok(Outcome::Warning { error, raw_len }) => serde_json::json!({
            "kind": "warning",
            "error": error.kind(),
            "message": error.to_string(),
            "raw_len": raw_len,
        }),
        Err(error) => serde_json::json!({
            "kind": "error",
            "error": error.kind(),
            "message": error.to_string(),
        }),
    }
}

/// Convert a whole walk to a JSON document.
pub fn render_json(
    summary: Option<&MessageSummary>,
    items: &[Result<Outcome, MimeError>],
) -> serde_json::Value {
    let summary = summary.map(|s| {
        serde_json::json!({
            "from": s.from,
            "to": s.to,
            "subject": s.subject,
            "date": s.date,
            "content_type": s.content_type,
        })
    });
    serde_json::json!({
        "summary": summary,
        "part_count": items.len(),
        "parts": items.iter().map(item_json).collect::<Vec<_>>(),
    })
}
