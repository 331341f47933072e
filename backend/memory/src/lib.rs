pub mod embeddings;
pub mod retrieval;
pub mod store;

#[cfg(test)]
mod testing;

pub use embeddings::{create_provider, EmbeddingProvider, EmbeddingProviderKind, OllamaEmbeddings, OpenAIEmbeddings};
pub use retrieval::{cosine_similarity, rank, Retriever, DEFAULT_TOP_K};
pub use store::{embed_chunks, read_records, write_records, EmbeddingStore};
