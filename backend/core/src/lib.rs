pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use error::DocentError;
pub use message::{user_turns, ChatMessage, Role};
pub use traits::{LlmProvider, LlmRequest, LlmResponse};
pub use types::{
    BoundingBox, Chunk, EmbeddingRecord, SuggestionRecord, SuggestionStatus, TextAddress,
    WordToken,
};
