//! expense-ocr domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `prompt`: The fixed expense-extraction prompt
//! - `usecases`: Extraction and invocation logic

pub mod model;
pub mod ports;
pub mod prompt;
pub mod usecases;

pub use model::*;
pub use ports::*;
