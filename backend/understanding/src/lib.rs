//! Turning source artifacts (images, PDFs, plain text) into chunks.

pub mod chunking;
pub mod doc_parse;
pub mod ingest;
pub mod layout;
pub mod ocr;

pub use chunking::{split_into_chunks, DEFAULT_CHUNK_SIZE};
pub use doc_parse::{LopdfBackend, PdfBackend};
pub use ingest::{ArtifactKind, DocumentIngestor};
pub use layout::{reconstruct, reconstruct_with, LayoutMode, LayoutOptions};
pub use ocr::{parse_tsv, OcrBackend, TesseractOcr};
