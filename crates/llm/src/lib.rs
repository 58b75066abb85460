pub mod gateway;
pub mod json;
pub mod prompts;
pub mod provider;
pub mod providers;
pub mod schema;

pub use gateway::{EvaluationError, EvaluationGateway};
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
pub use schema::ResponseSchema;
