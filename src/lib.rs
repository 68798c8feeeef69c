pub mod api;
pub mod core;
pub mod ui;

pub use api::{
    ChainError, ChainOutput, ChainRunner, CompletionBackend, CompletionRequest,
    CompletionResponse, GroqBackend, StepProfile,
};
pub use core::character::Character;
pub use core::parser::{ResponseSchema, StructuredOutputParser};
pub use core::template::PromptTemplate;
