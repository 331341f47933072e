//! Document ingestion: walk a source directory, turn every supported
//! artifact into text, and cut the text into chunks.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use docent_core::Chunk;
use tracing::{debug, info};

use crate::chunking::{split_into_chunks, DEFAULT_CHUNK_SIZE};
use crate::doc_parse::PdfBackend;
use crate::layout::{reconstruct, LayoutMode};
use crate::ocr::OcrBackend;

/// How an artifact's text is obtained, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Pdf,
    PlainText,
    Unsupported,
}

impl ArtifactKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => ArtifactKind::Image,
            "pdf" => ArtifactKind::Pdf,
            "txt" | "md" => ArtifactKind::PlainText,
            _ => ArtifactKind::Unsupported,
        }
    }
}

/// Turns a directory of artifacts into chunks.
pub struct DocumentIngestor {
    ocr: Arc<dyn OcrBackend>,
    pdf: Arc<dyn PdfBackend>,
    chunk_size: usize,
}

impl DocumentIngestor {
    pub fn new(ocr: Arc<dyn OcrBackend>, pdf: Arc<dyn PdfBackend>) -> Self {
        Self {
            ocr,
            pdf,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Ingest every regular file in `dir`, in file-name order.
    ///
    /// Unsupported files are skipped. Any extraction failure aborts the run.
    pub async fn ingest_dir(&self, dir: &Path) -> Result<Vec<Chunk>> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read source directory {}", dir.display()))?;
        while let Some(entry) = read_dir.next_entry().await? {
            if entry.file_type().await?.is_file() {
                entries.push(entry.path());
            }
        }
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut chunks = Vec::new();
        let mut ingested = 0usize;
        for path in &entries {
            let Some(text) = self.extract_text(path).await? else {
                continue;
            };
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let file_chunks = split_into_chunks(&source, &text, self.chunk_size);
            debug!(source = %source, chunks = file_chunks.len(), "Chunked artifact");
            chunks.extend(file_chunks);
            ingested += 1;
        }

        info!(
            dir = %dir.display(),
            files = ingested,
            chunks = chunks.len(),
            "Ingested source directory"
        );
        Ok(chunks)
    }

    /// Text of a single artifact, or `None` when the type is unsupported.
    pub async fn extract_text(&self, path: &Path) -> Result<Option<String>> {
        let mode = LayoutMode::from_path(path);
        match ArtifactKind::from_path(path) {
            ArtifactKind::Image => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read image {}", path.display()))?;
                let text = self
                    .ocr_image(&bytes, mode)
                    .await
                    .with_context(|| format!("OCR failed for {}", path.display()))?;
                Ok(Some(text))
            }
            ArtifactKind::Pdf => {
                let text = self
                    .pdf_text(path, mode)
                    .await
                    .with_context(|| format!("PDF extraction failed for {}", path.display()))?;
                Ok(Some(text))
            }
            ArtifactKind::PlainText => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Some(text))
            }
            ArtifactKind::Unsupported => {
                debug!(path = %path.display(), "Skipping unsupported artifact");
                Ok(None)
            }
        }
    }

    async fn ocr_image(&self, bytes: &[u8], mode: LayoutMode) -> Result<String> {
        let tokens = self.ocr.recognize(bytes).await?;
        Ok(reconstruct(&tokens, mode))
    }

    async fn pdf_text(&self, path: &Path, mode: LayoutMode) -> Result<String> {
        let pages = self.pdf.page_texts(path).await?;
        let mut out = Vec::with_capacity(pages.len());
        for (idx, page_text) in pages.into_iter().enumerate() {
            if !page_text.trim().is_empty() {
                out.push(page_text);
                continue;
            }
            let page = idx as u32 + 1;
            debug!(path = %path.display(), page, ocr = self.ocr.name(), "Page has no text layer, running OCR");
            let image = self.pdf.rasterize_page(path, page).await?;
            out.push(self.ocr_image(&image, mode).await?);
        }
        Ok(out.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docent_core::{BoundingBox, TextAddress, WordToken};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeOcr {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrBackend for FakeOcr {
        fn name(&self) -> &str {
            "fake"
        }

        async fn recognize(&self, image: &[u8]) -> Result<Vec<WordToken>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if image == b"broken" {
                anyhow::bail!("unreadable image");
            }
            Ok(vec![WordToken {
                text: String::from_utf8_lossy(image).into_owned(),
                confidence: 95.0,
                bbox: BoundingBox::new(0, 0, 10, 10),
                address: TextAddress::new(1, 1, 1),
            }])
        }
    }

    /// Every PDF has two pages: one with text, one scanned.
    struct FakePdf;

    #[async_trait]
    impl PdfBackend for FakePdf {
        async fn page_texts(&self, _path: &Path) -> Result<Vec<String>> {
            Ok(vec![String::new(), "typed page".to_string()])
        }

        async fn rasterize_page(&self, _path: &Path, page: u32) -> Result<Vec<u8>> {
            Ok(format!("scanned-page-{}", page).into_bytes())
        }
    }

    fn ingestor() -> (DocumentIngestor, Arc<FakeOcr>) {
        let ocr = Arc::new(FakeOcr {
            calls: AtomicUsize::new(0),
        });
        let ingestor = DocumentIngestor::new(ocr.clone(), Arc::new(FakePdf));
        (ingestor, ocr)
    }

    #[test]
    fn test_artifact_kind_by_extension() {
        assert_eq!(ArtifactKind::from_path(Path::new("a.PNG")), ArtifactKind::Image);
        assert_eq!(ArtifactKind::from_path(Path::new("scan.tiff")), ArtifactKind::Image);
        assert_eq!(ArtifactKind::from_path(Path::new("fees.pdf")), ArtifactKind::Pdf);
        assert_eq!(ArtifactKind::from_path(Path::new("notes.md")), ArtifactKind::PlainText);
        assert_eq!(ArtifactKind::from_path(Path::new("report.docx")), ArtifactKind::Unsupported);
        assert_eq!(ArtifactKind::from_path(Path::new("README")), ArtifactKind::Unsupported);
    }

    #[tokio::test]
    async fn test_ingest_skips_unsupported_and_ocrs_scans() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_photo.png"), b"photo").unwrap();
        std::fs::write(dir.path().join("b_scan.pdf"), b"%PDF-fake").unwrap();
        std::fs::write(dir.path().join("c_report.docx"), b"PK").unwrap();

        let (ingestor, ocr) = ingestor();
        let chunks = ingestor.ingest_dir(dir.path()).await.unwrap();

        let sources: Vec<&str> = chunks.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["a_photo.png", "b_scan.pdf"]);
        assert_eq!(chunks[0].text, "photo");
        assert_eq!(chunks[1].text, "scanned-page-1\ntyped page");
        // One call for the image, one for the scanned PDF page.
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ingest_chunks_plain_text_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("z.txt"), "last").unwrap();
        std::fs::write(dir.path().join("a.md"), "abcdef").unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let (ingestor, _) = ingestor();
        let chunks = ingestor.with_chunk_size(4).ingest_dir(dir.path()).await.unwrap();

        let pairs: Vec<(&str, &str)> = chunks
            .iter()
            .map(|c| (c.source.as_str(), c.text.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a.md", "abcd"), ("a.md", "ef"), ("z.txt", "last")]);
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"broken").unwrap();

        let (ingestor, _) = ingestor();
        let err = ingestor.ingest_dir(dir.path()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("bad.png"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let (ingestor, _) = ingestor();
        assert!(ingestor.ingest_dir(Path::new("/nonexistent/docent")).await.is_err());
    }
}
