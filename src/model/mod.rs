//! Core data model types for MIME parts, their descriptors, and walk outcomes.

pub mod descriptor;
pub mod outcome;
pub mod part;
