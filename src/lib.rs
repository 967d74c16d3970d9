//! Library crate for bughunt-back: the game lifecycle engine behind BugHunt daily and
//! interactive matches, exposed for the bootstrap binary and tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
