//! Plain-data request and response shapes exchanged with callers.

pub mod game;
pub mod validation;
