//! expense-ocr adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `llm`: Mistral chat-completions client and an offline stub
//! - `secrets`: API key resolution from the environment or an AWS secret store

pub mod llm;
pub mod secrets;
