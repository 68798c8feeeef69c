//! High-level API for building and running prompt chains.

mod backend;
mod chain;
mod error;

pub use backend::{CompletionBackend, CompletionRequest, CompletionResponse, GroqBackend};
pub use chain::{ChainOutput, ChainRunner, ParallelGroupBuilder, StepProfile};
pub use error::ChainError;
