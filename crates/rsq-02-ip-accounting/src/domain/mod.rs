//! # Domain Layer
//!
//! Table layout, lazy block allocation, the table registry and read handles.

pub mod entities;
pub mod errors;
pub mod handles;
pub mod registry;
pub mod table;
