//! Integration tests for message reading, the MIME walk, and rendering.

use std::io::Write;
use std::path::Path;

use memail::error::{MemailError, MimeError};
use memail::mime::walk::{walk, walk_message, WalkOptions};
use memail::model::outcome::Outcome;
use memail::parser::message::{read_message, split_message, MessageSummary, MAX_MESSAGE_SIZE};
use memail::render;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> Vec<u8> {
    read_message(fixture(name), MAX_MESSAGE_SIZE).unwrap()
}

fn walk_all(raw: &[u8]) -> Vec<Result<Outcome, MimeError>> {
    walk_message(raw, &WalkOptions::default()).collect()
}

// ─── Single-part message ────────────────────────────────────────────

#[test]
fn test_simple_quoted_printable_message() {
    let raw = load("simple.eml");
    let outcomes = walk_all(&raw);
    assert_eq!(
        outcomes,
        vec![Ok(Outcome::Text {
            text: "Café au lait, s'il vous plaît.".into(),
            charset: "utf-8".into(),
        })]
    );
}

#[test]
fn test_simple_message_summary() {
    let raw = load("simple.eml");
    let (headers, _) = split_message(&raw);
    let summary = MessageSummary::from_headers(&headers);
    assert_eq!(summary.from, "Carol <carol@example.com>");
    assert_eq!(summary.to, "dave@example.com");
    assert_eq!(summary.subject, "Breakfast");
    assert_eq!(summary.date, "Tue, 4 Mar 2025 08:15:00 +0100");
    assert_eq!(summary.content_type, "text/plain; charset=utf-8");
}

// ─── Nested multiparts ──────────────────────────────────────────────

#[test]
fn test_nested_message_document_order() {
    let raw = load("nested.eml");
    let outcomes = walk_all(&raw);
    assert_eq!(
        outcomes,
        vec![
            Ok(Outcome::Text {
                text: "Numbers are attached.".into(),
                charset: "utf-8".into(),
            }),
            Ok(Outcome::Unsupported {
                content_type: "text/html".into(),
            }),
            Ok(Outcome::Attachment {
                filename: "résumé.pdf".into(),
                content_type: "application/pdf".into(),
            }),
            Ok(Outcome::Text {
                text: "Café au lait".into(),
                charset: "iso-8859-1".into(),
            }),
        ]
    );
}

#[test]
fn test_nested_message_summary_decodes_subject() {
    let raw = load("nested.eml");
    let (headers, _) = split_message(&raw);
    let summary = MessageSummary::from_headers(&headers);
    assert_eq!(summary.subject, "Quarterly réport");
    assert_eq!(summary.from, "\"Alice\" <alice@example.com>");
}

#[test]
fn test_nested_message_depth_limit() {
    let raw = load("nested.eml");
    let outcomes: Vec<_> = walk_message(&raw, &WalkOptions { max_depth: 1 }).collect();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0], Err(MimeError::MultipartTooDeep { limit: 1 }));
    assert!(matches!(outcomes[1], Ok(Outcome::Attachment { .. })));
    assert_eq!(outcomes[2].as_ref().unwrap().text(), Some("Café au lait"));
}

// ─── Error recovery ─────────────────────────────────────────────────

#[test]
fn test_broken_message_recovers_per_branch() {
    let raw = load("broken.eml");
    let outcomes = walk_all(&raw);
    assert_eq!(outcomes.len(), 5);

    assert!(matches!(
        outcomes[0],
        Err(MimeError::MalformedContentType { .. })
    ));
    match &outcomes[1] {
        Ok(Outcome::Warning {
            error: MimeError::InvalidBase64(_),
            raw_len,
        }) => assert_eq!(*raw_len, "aGVsbG8=!!".len()),
        other => panic!("expected base64 warning, got {other:?}"),
    }
    assert_eq!(
        outcomes[2],
        Ok(Outcome::Warning {
            error: MimeError::UnsupportedCharset("x-unknown".into()),
            raw_len: "mystery".len(),
        })
    );
    assert_eq!(outcomes[3], Err(MimeError::MissingFilename));
    assert_eq!(
        outcomes[4],
        Ok(Outcome::Text {
            text: "still here".into(),
            charset: "us-ascii".into(),
        })
    );
}

#[test]
fn test_broken_message_strict_collect_aborts() {
    let raw = load("broken.eml");
    let collected: Result<Vec<Outcome>, MimeError> =
        walk_message(&raw, &WalkOptions::default()).collect();
    assert!(matches!(
        collected,
        Err(MimeError::MalformedContentType { .. })
    ));
}

#[test]
fn test_truncated_message_keeps_partial_results() {
    let raw = load("truncated.eml");
    let (headers, body) = split_message(&raw);
    let outcomes: Vec<_> = walk(headers, body, &WalkOptions::default()).collect();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].as_ref().unwrap().text(), Some("first"));
    assert_eq!(
        outcomes[1].as_ref().unwrap().text(),
        Some("second, cut off\n")
    );
    assert_eq!(
        outcomes[2],
        Ok(Outcome::Warning {
            error: MimeError::TruncatedMultipart {
                boundary: "T".into()
            },
            raw_len: body.len(),
        })
    );
}

#[test]
fn test_attachment_with_unparseable_content_type_is_listed() {
    let raw = b"Content-Type: multipart/mixed; boundary=Z\n\n\
--Z\nContent-Type: text/plain\n\nsee attached\n\
--Z\nContent-Type: application\nContent-Disposition: attachment; filename=\"report.bin\"\n\nxx\n\
--Z--\n";
    let outcomes = walk_all(raw);
    assert_eq!(
        outcomes,
        vec![
            Ok(Outcome::Text {
                text: "see attached".into(),
                charset: "us-ascii".into(),
            }),
            Ok(Outcome::Attachment {
                filename: "report.bin".into(),
                content_type: "application".into(),
            }),
        ]
    );
}

// ─── Reading files ──────────────────────────────────────────────────

#[test]
fn test_read_message_missing_file() {
    let err = read_message(fixture("does-not-exist.eml"), MAX_MESSAGE_SIZE).unwrap_err();
    assert!(matches!(err, MemailError::FileNotFound(_)));
}

#[test]
fn test_read_message_respects_size_limit() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"Subject: big\n\n0123456789").unwrap();
    file.flush().unwrap();

    let err = read_message(file.path(), 8).unwrap_err();
    assert!(matches!(
        err,
        MemailError::MessageTooLarge {
            size: 24,
            limit: 8,
            ..
        }
    ));
    assert_eq!(read_message(file.path(), 24).unwrap().len(), 24);
}

#[test]
fn test_crlf_message_from_tempfile() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        b"Content-Type: multipart/mixed; boundary=\"b\"\r\n\r\n\
--b\r\nContent-Type: text/plain\r\n\r\nline one\r\nline two\r\n\
--b\r\nContent-Type: image/png\r\nContent-Disposition: inline\r\n\r\nPNG\r\n\
--b--\r\n",
    )
    .unwrap();
    file.flush().unwrap();

    let raw = read_message(file.path(), MAX_MESSAGE_SIZE).unwrap();
    let outcomes = walk_all(&raw);
    assert_eq!(
        outcomes,
        vec![
            Ok(Outcome::Text {
                text: "line one\r\nline two".into(),
                charset: "us-ascii".into(),
            }),
            Ok(Outcome::Unsupported {
                content_type: "image/png".into(),
            }),
        ]
    );
}

// ─── Rendering ──────────────────────────────────────────────────────

#[test]
fn test_render_nested_as_text() {
    let raw = load("nested.eml");
    let outcomes = walk_all(&raw);
    let text = render::render_text(None, &outcomes, false);
    assert_eq!(
        text,
        "Numbers are attached.\n\
[unsupported content type: text/html]\n\
Attachment: résumé.pdf; application/pdf\n\
Café au lait\n"
    );
}

#[test]
fn test_render_broken_as_json() {
    let raw = load("broken.eml");
    let (headers, body) = split_message(&raw);
    let summary = MessageSummary::from_headers(&headers);
    let outcomes: Vec<_> = walk(headers, body, &WalkOptions::default()).collect();
    let json = render::render_json(Some(&summary), &outcomes);

    assert_eq!(json["summary"]["subject"], "Broken");
    assert_eq!(json["part_count"], 5);
    let kinds: Vec<&str> = json["parts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["error", "warning", "warning", "error", "text"]);
    assert_eq!(json["parts"][3]["error"], "missing_filename");
}
