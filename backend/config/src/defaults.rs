//! Built-in default values.

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_SOURCE_DIR: &str = "image_knowledge_artifacts";
pub const DEFAULT_DATA_DIR: &str = ".";

pub const EMBEDDINGS_FILE: &str = "embeddings.json";
pub const SUGGESTION_LOG_FILE: &str = "analyzer_output.txt";
pub const QUESTION_LOG_FILE: &str = "question_types_log.json";
pub const REVIEW_HISTORY_FILE: &str = "reviews/history.jsonl";

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_LOCAL_MODEL: &str = "llama3";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_TOP_K: usize = 3;

pub const DEFAULT_REVIEW_MODE: &str = "background";
pub const DEFAULT_TRUST_THRESHOLD: u32 = 3;
pub const DEFAULT_REVIEW_QUEUE: usize = 64;

pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_RASTER_DPI: u32 = 300;

pub const DEFAULT_LOG_LEVEL: &str = "info";
