//! Depth-first walk over the MIME tree of a message.
//!
//! The walk is a lazy iterator driven by an explicit stack of frames, so
//! nesting depth never grows the call stack. Each item is either a leaf
//! [`Outcome`] or a structural [`MimeError`] for one frame; after an error
//! the walk continues with the next sibling. Collect into
//! `Result<Vec<_>, _>` to abort on the first error instead.

use std::iter::FusedIterator;

use tracing::{debug, warn};

use crate::error::MimeError;
use crate::mime::charset::decode_charset;
use crate::mime::classify::{classify, Classification};
use crate::mime::split::{split, MultipartSplitter};
use crate::mime::transfer::decode_transfer;
use crate::model::outcome::Outcome;
use crate::model::part::{HeaderView, Part};
use crate::parser::message::split_message;

/// Default maximum multipart nesting (to bound adversarial input).
pub const MAX_DEPTH: usize = 10;

/// Tuning knobs for a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum number of nested multipart containers; the root container is level 1.
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// Walk a part given its headers and body.
pub fn walk<'a>(headers: HeaderView, body: &'a [u8], options: &WalkOptions) -> Walk<'a> {
    Walk::new(Part::new(headers, body), options)
}

/// Split a raw message into headers and body, then walk it.
pub fn walk_message<'a>(raw: &'a [u8], options: &WalkOptions) -> Walk<'a> {
    let (headers, body) = split_message(raw);
    walk(headers, body, options)
}

enum Frame<'a> {
    /// A part still to be classified. `depth` counts enclosing containers.
    Part { part: Part<'a>, depth: usize },
    /// A container whose sub-parts are being visited.
    Container {
        splitter: MultipartSplitter<'a>,
        depth: usize,
        raw_len: usize,
    },
}

/// Lazy, depth-first sequence of walk results in document order.
pub struct Walk<'a> {
    stack: Vec<Frame<'a>>,
    options: WalkOptions,
}

impl<'a> Walk<'a> {
    pub fn new(root: Part<'a>, options: &WalkOptions) -> Self {
        Self {
            stack: vec![Frame::Part {
                part: root,
                depth: 0,
            }],
            options: *options,
        }
    }

    /// Classify one part. Containers are pushed on the stack and yield nothing.
    fn visit(&mut self, part: Part<'a>, depth: usize) -> Option<Result<Outcome, MimeError>> {
        let classification = match classify(&part.headers) {
            Ok(c) => c,
            Err(e) => {
                debug!(depth, error = %e, "Part could not be classified");
                return Some(Err(e));
            }
        };

        match classification {
            Classification::Multipart(boundary) => {
                let level = depth + 1;
                if level > self.options.max_depth {
                    warn!(level, limit = self.options.max_depth, "Multipart nesting too deep");
                    return Some(Err(MimeError::MultipartTooDeep {
                        limit: self.options.max_depth,
                    }));
                }
                debug!(depth, boundary = %boundary, "Entering multipart");
                self.stack.push(Frame::Container {
                    splitter: split(part.body, &boundary),
                    depth: level,
                    raw_len: part.body.len(),
                });
                None
            }
            Classification::TextLeaf {
                charset,
                transfer_encoding,
            } => {
                debug!(depth, charset = %charset, encoding = %transfer_encoding, "Text leaf");
                Some(Ok(decode_text(part.body, &charset, &transfer_encoding)))
            }
            Classification::AttachmentLeaf {
                filename,
                content_type,
            } => {
                debug!(depth, filename = %filename, "Attachment leaf");
                Some(Ok(Outcome::Attachment {
                    filename,
                    content_type,
                }))
            }
            Classification::UnsupportedLeaf(content_type) => {
                debug!(depth, content_type = %content_type, "Unsupported leaf");
                Some(Ok(Outcome::Unsupported { content_type }))
            }
        }
    }
}

/// Transfer-decode then charset-decode a text body; failures become warnings.
fn decode_text(body: &[u8], charset: &str, transfer_encoding: &str) -> Outcome {
    let decoded = decode_transfer(body, transfer_encoding)
        .and_then(|bytes| decode_charset(&bytes, charset));

    match decoded {
        Ok(text) => Outcome::Text {
            text,
            charset: charset.to_string(),
        },
        Err(error) => {
            warn!(error = %error, bytes = body.len(), "Could not decode text part");
            Outcome::Warning {
                error,
                raw_len: body.len(),
            }
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Result<Outcome, MimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Frame::Part { part, depth } => {
                    if let Some(item) = self.visit(part, depth) {
                        return Some(item);
                    }
                }
                Frame::Container {
                    mut splitter,
                    depth,
                    raw_len,
                } => match splitter.next() {
                    Some(Ok(child)) => {
                        self.stack.push(Frame::Container {
                            splitter,
                            depth,
                            raw_len,
                        });
                        self.stack.push(Frame::Part { part: child, depth });
                    }
                    Some(Err(error)) => {
                        warn!(error = %error, bytes = raw_len, "Multipart body is truncated");
                        return Some(Ok(Outcome::Warning { error, raw_len }));
                    }
                    None => {}
                },
            }
        }
    }
}

impl FusedIterator for Walk<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(raw: &[u8]) -> Vec<Result<Outcome, MimeError>> {
        walk_message(raw, &WalkOptions::default()).collect()
    }

    fn text(s: &str) -> Result<Outcome, MimeError> {
        Ok(Outcome::Text {
            text: s.to_string(),
            charset: "utf-8".to_string(),
        })
    }

    #[test]
    fn test_text_and_attachment() {
        let raw = b"Content-Type: multipart/mixed; boundary=XYZ\r\n\r\n\
--XYZ\r\n\
Content-Type: text/plain; charset=utf-8\r\n\r\n\
hello\r\n\
--XYZ\r\n\
Content-Disposition: attachment; filename=\"a.txt\"\r\n\
Content-Type: text/plain\r\n\r\n\
file contents\r\n\
--XYZ--\r\n";
        assert_eq!(
            run(raw),
            vec![
                text("hello"),
                Ok(Outcome::Attachment {
                    filename: "a.txt".into(),
                    content_type: "text/plain".into(),
                }),
            ]
        );
    }

    #[test]
    fn test_base64_us_ascii() {
        let headers = HeaderView::from_pairs([
            ("Content-Type", "text/plain; charset=us-ascii"),
            ("Content-Transfer-Encoding", "base64"),
        ]);
        let outcomes: Vec<_> = walk(headers, b"aGVsbG8=", &WalkOptions::default()).collect();
        assert_eq!(
            outcomes,
            vec![Ok(Outcome::Text {
                text: "hello".into(),
                charset: "us-ascii".into(),
            })]
        );
    }

    #[test]
    fn test_unsupported_leaf_is_not_an_error() {
        let headers = HeaderView::from_pairs([("Content-Type", "application/pdf")]);
        let outcomes: Vec<_> = walk(headers, b"%PDF-1.4", &WalkOptions::default()).collect();
        assert_eq!(
            outcomes,
            vec![Ok(Outcome::Unsupported {
                content_type: "application/pdf".into()
            })]
        );
    }

    #[test]
    fn test_nested_multipart_document_order() {
        let raw = b"Content-Type: multipart/mixed; boundary=outer\n\n\
--outer\n\
Content-Type: multipart/alternative; boundary=inner\n\n\
--inner\n\
Content-Type: text/plain; charset=utf-8\n\n\
plain\n\
--inner\n\
Content-Type: text/html\n\n\
<p>html</p>\n\
--inner--\n\
--outer\n\
Content-Type: text/plain; charset=utf-8\n\n\
after\n\
--outer--\n";
        assert_eq!(
            run(raw),
            vec![
                text("plain"),
                Ok(Outcome::Unsupported {
                    content_type: "text/html".into()
                }),
                text("after"),
            ]
        );
    }

    #[test]
    fn test_bad_base64_is_a_warning() {
        let raw = b"Content-Type: multipart/mixed; boundary=B\n\n\
--B\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: base64\n\n\
!!!!\n\
--B\n\
Content-Type: text/plain; charset=utf-8\n\n\
ok\n\
--B--\n";
        let outcomes = run(raw);
        assert_eq!(outcomes.len(), 2);
        match &outcomes[0] {
            Ok(Outcome::Warning { error, raw_len }) => {
                assert!(matches!(error, MimeError::InvalidBase64(_)));
                assert_eq!(*raw_len, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(outcomes[1], text("ok"));
    }

    #[test]
    fn test_unknown_charset_is_a_warning() {
        let headers = HeaderView::from_pairs([("Content-Type", "text/plain; charset=x-mystery")]);
        let outcomes: Vec<_> = walk(headers, b"abc", &WalkOptions::default()).collect();
        assert_eq!(
            outcomes,
            vec![Ok(Outcome::Warning {
                error: MimeError::UnsupportedCharset("x-mystery".into()),
                raw_len: 3,
            })]
        );
    }

    #[test]
    fn test_unknown_charset_warning_keeps_declared_label() {
        let headers = HeaderView::from_pairs([("Content-Type", "text/plain; charset=X-Mystery")]);
        let outcomes: Vec<_> = walk(headers, b"abc", &WalkOptions::default()).collect();
        assert_eq!(
            outcomes,
            vec![Ok(Outcome::Warning {
                error: MimeError::UnsupportedCharset("X-Mystery".into()),
                raw_len: 3,
            })]
        );
    }

    #[test]
    fn test_structural_error_skips_only_its_branch() {
        let raw = b"Content-Type: multipart/mixed; boundary=B\n\n\
--B\n\
Content-Disposition: attachment\n\n\
data\n\
--B\n\
Content-Type: text/plain; charset=utf-8\n\n\
still here\n\
--B--\n";
        let outcomes = run(raw);
        assert_eq!(
            outcomes,
            vec![Err(MimeError::MissingFilename), text("still here")]
        );

        let aborted: Result<Vec<_>, _> = walk_message(raw, &WalkOptions::default()).collect();
        assert_eq!(aborted.unwrap_err(), MimeError::MissingFilename);
    }

    #[test]
    fn test_truncated_multipart_keeps_partial_results() {
        let raw = b"Content-Type: multipart/mixed; boundary=B\n\n\
--B\n\
Content-Type: text/plain; charset=utf-8\n\n\
first\n\
--B\n\
Content-Type: text/plain; charset=utf-8\n\n\
cut off";
        let outcomes = run(raw);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], text("first"));
        assert_eq!(outcomes[1], text("cut off"));
        assert!(matches!(
            &outcomes[2],
            Ok(Outcome::Warning {
                error: MimeError::TruncatedMultipart { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let raw = b"Content-Type: multipart/mixed; boundary=L1\n\n\
--L1\n\
Content-Type: multipart/mixed; boundary=L2\n\n\
--L2\n\
Content-Type: text/plain; charset=utf-8\n\n\
deep\n\
--L2--\n\
--L1\n\
Content-Type: text/plain; charset=utf-8\n\n\
shallow\n\
--L1--\n";

        let options = WalkOptions { max_depth: 1 };
        let outcomes: Vec<_> = walk_message(raw, &options).collect();
        assert_eq!(
            outcomes,
            vec![
                Err(MimeError::MultipartTooDeep { limit: 1 }),
                text("shallow"),
            ]
        );

        let options = WalkOptions { max_depth: 2 };
        let outcomes: Vec<_> = walk_message(raw, &options).collect();
        assert_eq!(outcomes, vec![text("deep"), text("shallow")]);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let levels = 5_000;
        let mut raw = String::new();
        raw.push_str("Content-Type: multipart/mixed; boundary=b0\n\n");
        for i in 1..levels {
            raw.push_str(&format!(
                "--b{}\nContent-Type: multipart/mixed; boundary=b{}\n\n",
                i - 1,
                i
            ));
        }
        let options = WalkOptions { max_depth: 3 };
        let outcomes: Vec<_> = walk_message(raw.as_bytes(), &options).collect();
        assert!(outcomes.contains(&Err(MimeError::MultipartTooDeep { limit: 3 })));
    }
}
