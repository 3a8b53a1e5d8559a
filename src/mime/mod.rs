//! MIME content handling: classification, multipart splitting, transfer and
//! charset decoding, and the recursive content walk that ties them together.

pub mod charset;
pub mod classify;
pub mod split;
pub mod transfer;
pub mod walk;

pub use charset::decode_charset;
pub use classify::{classify, Classification};
pub use split::{split, MultipartSplitter};
pub use transfer::decode_transfer;
pub use walk::{walk, walk_message, Walk, WalkOptions};
