//! Adapters between the outside world (files, stdin, stdout) and the application layer.

pub mod csv;
pub mod json;
