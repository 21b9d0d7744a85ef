//! Request extractors.

pub mod json;
pub mod path;
