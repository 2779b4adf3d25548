//! Shared helpers.

pub mod date;
pub mod fs;
pub mod ordered;
