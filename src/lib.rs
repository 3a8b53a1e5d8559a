//! `memail`: a command-line email inspector.
//!
//! This crate provides the core library for reading a single RFC 5322
//! message, walking its MIME tree depth-first, and turning every leaf into
//! displayable text, an attachment reference, or a warning.

pub mod config;
pub mod error;
pub mod mime;
pub mod model;
pub mod parser;
pub mod render;
