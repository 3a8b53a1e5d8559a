//! Message parsing: header blocks, encoded words, and splitting raw `.eml` files.

pub mod header;
pub mod message;
