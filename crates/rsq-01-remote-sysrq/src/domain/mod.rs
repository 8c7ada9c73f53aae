//! # Domain Layer
//!
//! Parsing, replay protection and digest verification with no I/O.
//! This is the inner layer of the hexagonal architecture.

pub mod authenticator;
pub mod config;
pub mod digest;
pub mod dispatcher;
pub mod entities;
pub mod errors;
pub mod parser;
pub mod replay_guard;
pub mod request;
