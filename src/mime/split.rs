//! Boundary-aware splitting of multipart bodies (RFC 2046 §5.1).

use memchr::memmem;

use crate::error::MimeError;
use crate::model::part::Part;
use crate::parser::header::parse_header_block;
use crate::parser::message::split_at_blank_line;

/// Lazily split a multipart body into its sub-parts.
pub fn split<'a>(body: &'a [u8], boundary: &str) -> MultipartSplitter<'a> {
    MultipartSplitter::new(body, boundary)
}

/// A delimiter line found in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Delimiter {
    /// End of the preceding part's content (the line break before the
    /// delimiter belongs to the delimiter).
    content_end: usize,
    /// First byte after the delimiter line.
    next: usize,
    /// `--boundary--`
    last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    InPart,
    Truncated,
    Done,
}

/// Forward-only iterator over the parts of a multipart body.
///
/// Preamble and epilogue are discarded. If the body ends before the closing
/// delimiter, every part seen so far (including the unterminated last one) is
/// yielded first, followed by a single `Err(TruncatedMultipart)`.
#[derive(Debug)]
pub struct MultipartSplitter<'a> {
    body: &'a [u8],
    boundary: String,
    finder: memmem::Finder<'static>,
    pos: usize,
    state: State,
}

impl<'a> MultipartSplitter<'a> {
    pub fn new(body: &'a [u8], boundary: &str) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 2);
        delimiter.extend_from_slice(b"--");
        delimiter.extend_from_slice(boundary.as_bytes());
        Self {
            body,
            boundary: boundary.to_string(),
            finder: memmem::Finder::new(&delimiter).into_owned(),
            pos: 0,
            state: State::Preamble,
        }
    }

    /// The boundary token this splitter looks for.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Find the next delimiter line at or after `from`.
    fn find_delimiter(&self, from: usize) -> Option<Delimiter> {
        let delimiter_len = self.finder.needle().len();
        let mut search_from = from;

        while search_from <= self.body.len() {
            let idx = search_from + self.finder.find(&self.body[search_from..])?;
            let at_line_start = idx == 0 || self.body[idx - 1] == b'\n';
            if at_line_start {
                if let Some((next, last)) = self.delimiter_line_end(idx + delimiter_len) {
                    let mut content_end = idx;
                    if content_end > 0 && self.body[content_end - 1] == b'\n' {
                        content_end -= 1;
                        if content_end > 0 && self.body[content_end - 1] == b'\r' {
                            content_end -= 1;
                        }
                    }
                    return Some(Delimiter {
                        content_end: content_end.max(from),
                        next,
                        last,
                    });
                }
            }
            search_from = idx + 1;
        }
        None
    }

    /// Check the rest of a candidate delimiter line: optional `--`, transport
    /// padding, then a line break or the end of the body.
    fn delimiter_line_end(&self, mut i: usize) -> Option<(usize, bool)> {
        let body = self.body;
        let last = body[i..].starts_with(b"--");
        if last {
            i += 2;
        }
        while i < body.len() && (body[i] == b' ' || body[i] == b'\t') {
            i += 1;
        }
        if i == body.len() {
            return Some((i, last));
        }
        if body[i] == b'\n' {
            return Some((i + 1, last));
        }
        if body[i..].starts_with(b"\r\n") {
            return Some((i + 2, last));
        }
        None
    }

    fn truncated(&self) -> MimeError {
        MimeError::TruncatedMultipart {
            boundary: self.boundary.clone(),
        }
    }
}

fn parse_part(segment: &[u8]) -> Part<'_> {
    let (header_bytes, body) = split_at_blank_line(segment);
    Part::new(parse_header_block(header_bytes), body)
}

impl<'a> Iterator for MultipartSplitter<'a> {
    type Item = Result<Part<'a>, MimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Preamble => match self.find_delimiter(0) {
                    Some(delimiter) if delimiter.last => {
                        self.state = State::Done;
                        return None;
                    }
                    Some(delimiter) => {
                        self.pos = delimiter.next;
                        self.state = State::InPart;
                    }
                    None => {
                        self.state = State::Done;
                        return Some(Err(self.truncated()));
                    }
                },
                State::InPart => {
                    let body = self.body;
                    return match self.find_delimiter(self.pos) {
                        Some(delimiter) => {
                            let segment = &body[self.pos..delimiter.content_end];
                            if delimiter.last {
                                self.state = State::Done;
                            } else {
                                self.pos = delimiter.next;
                            }
                            Some(Ok(parse_part(segment)))
                        }
                        None => {
                            let segment = &body[self.pos..];
                            if segment.is_empty() {
                                self.state = State::Done;
                                Some(Err(self.truncated()))
                            } else {
                                self.state = State::Truncated;
                                Some(Ok(parse_part(segment)))
                            }
                        }
                    };
                }
                State::Truncated => {
                    self.state = State::Done;
                    return Some(Err(self.truncated()));
                }
                State::Done => return None,
            }
        }
    }
}
