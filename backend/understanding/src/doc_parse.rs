//! PDF text extraction.
//!
//! The native text layer is read with `lopdf`, one entry per page. Pages
//! without a text layer (scans) are rasterized with Poppler's `pdftoppm`
//! so the caller can hand them to an OCR backend.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// Access to a PDF's text layer and page images.
#[async_trait]
pub trait PdfBackend: Send + Sync {
    /// Text of every page in order. Pages without a text layer yield an
    /// empty (or whitespace-only) string.
    async fn page_texts(&self, path: &Path) -> Result<Vec<String>>;

    /// Render one page (1-based) to PNG bytes.
    async fn rasterize_page(&self, path: &Path, page: u32) -> Result<Vec<u8>>;
}

/// `lopdf` for text, `pdftoppm` for rasterization.
pub struct LopdfBackend {
    pdftoppm: String,
    dpi: u32,
}

impl LopdfBackend {
    pub fn new() -> Self {
        Self {
            pdftoppm: "pdftoppm".to_string(),
            dpi: 300,
        }
    }

    pub fn with_pdftoppm(mut self, binary: impl Into<String>) -> Self {
        self.pdftoppm = binary.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    fn page_texts_sync(path: &Path) -> Result<Vec<String>> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| anyhow::anyhow!("lopdf failed to parse {}: {}", path.display(), e))?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    // Treated like a scanned page: falls through to OCR.
                    debug!(page = page_num, error = %e, "No extractable text on page");
                    texts.push(String::new());
                }
            }
        }
        Ok(texts)
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PdfBackend for LopdfBackend {
    async fn page_texts(&self, path: &Path) -> Result<Vec<String>> {
        let owned: PathBuf = path.to_path_buf();
        let texts = tokio::task::spawn_blocking(move || Self::page_texts_sync(&owned))
            .await
            .context("PDF text extraction task failed")??;
        info!(path = %path.display(), pages = texts.len(), "Read PDF text layer");
        Ok(texts)
    }

    async fn rasterize_page(&self, path: &Path, page: u32) -> Result<Vec<u8>> {
        let page_arg = page.to_string();
        // Without an output root pdftoppm writes the single page to stdout.
        let output = Command::new(&self.pdftoppm)
            .args(["-f", &page_arg, "-l", &page_arg, "-r", &self.dpi.to_string(), "-png", "-singlefile"])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {} (is poppler installed?)", self.pdftoppm))?;

        if !output.status.success() {
            bail!(
                "pdftoppm failed on page {} of {}: {}",
                page,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if output.stdout.is_empty() {
            bail!("pdftoppm produced no image for page {} of {}", page, path.display());
        }

        debug!(page, bytes = output.stdout.len(), "Rasterized PDF page");
        Ok(output.stdout)
    }
}
