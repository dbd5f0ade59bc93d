//! Application use cases / business logic

pub mod extract;
pub mod invoke;

pub use extract::{ExtractUseCase, decode_content};
pub use invoke::{InvocationConfig, InvocationEvent, InvocationHandler, InvocationResult};
