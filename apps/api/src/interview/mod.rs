//! The screening conversation: step machine, input validation, question
//! generation and the HTTP surface that drives it.

pub mod flow;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod questions;
pub mod sessions;
pub mod validation;
