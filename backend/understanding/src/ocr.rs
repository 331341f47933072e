//! Optical Character Recognition (OCR)
//!
//! Word-level OCR behind the [`OcrBackend`] trait. The production backend
//! drives the `tesseract` CLI in TSV mode, which reports every word with its
//! confidence, bounding box and block/paragraph/line address.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use docent_core::{BoundingBox, TextAddress, WordToken};

/// Tesseract TSV row level for a single word.
const WORD_LEVEL: u32 = 5;

/// Turns an encoded image (PNG, JPEG, TIFF…) into recognized words.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Backend name for logs (e.g. "tesseract").
    fn name(&self) -> &str;

    async fn recognize(&self, image: &[u8]) -> Result<Vec<WordToken>>;
}

/// OCR via the `tesseract` command-line tool.
pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrBackend for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8]) -> Result<Vec<WordToken>> {
        debug!(binary = %self.binary, bytes = image.len(), "Running tesseract");

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {} (is tesseract installed?)", self.binary))?;

        let mut stdin = child
            .stdin
            .take()
            .context("tesseract stdin was not captured")?;
        stdin
            .write_all(image)
            .await
            .context("Failed to stream image to tesseract")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("tesseract did not complete")?;

        if !output.status.success() {
            bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse tesseract's TSV output into word tokens.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. Non-word rows and unparseable rows are
/// skipped.
pub fn parse_tsv(tsv: &str) -> Vec<WordToken> {
    let mut words = Vec::new();

    for (i, row) in tsv.lines().enumerate() {
        if i == 0 && row.starts_with("level") {
            continue;
        }
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        match parse_row(&cols) {
            Some(word) => words.push(word),
            None => {
                if cols[0] == WORD_LEVEL.to_string() {
                    warn!(row = i, "Skipping malformed tesseract row");
                }
            }
        }
    }

    words
}

fn parse_row(cols: &[&str]) -> Option<WordToken> {
    let level: u32 = cols[0].parse().ok()?;
    if level != WORD_LEVEL {
        return None;
    }
    let int = |idx: usize| cols[idx].trim().parse::<i32>().ok();
    let uint = |idx: usize| cols[idx].trim().parse::<u32>().ok();

    Some(WordToken {
        address: TextAddress::new(uint(2)?, uint(3)?, uint(4)?),
        bbox: BoundingBox::new(int(6)?, int(7)?, int(8)?, int(9)?),
        confidence: cols[10].trim().parse().ok()?,
        // The text column may itself contain tabs in pathological output.
        text: cols[11..].join("\t"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t1700\t2200\t-1\t
2\t1\t1\t0\t0\t0\t120\t88\t640\t40\t-1\t
5\t1\t1\t1\t1\t1\t120\t88\t180\t40\t96.204102\tRouting
5\t1\t1\t1\t1\t2\t310\t88\t160\t40\t91\tnumber
5\t1\t2\t1\t3\t1\t120\t400\t90\t38\t12.5\t~~
";

    #[test]
    fn parses_word_rows_only() {
        let words = parse_tsv(SAMPLE);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Routing");
        assert_eq!(words[0].address, TextAddress::new(1, 1, 1));
        assert_eq!(words[0].bbox, BoundingBox::new(120, 88, 180, 40));
        assert!((words[0].confidence - 96.204102).abs() < 1e-4);
        assert_eq!(words[2].address, TextAddress::new(2, 1, 3));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let tsv = "5\t1\tx\t1\t1\t1\t0\t0\t10\t10\t90\tbad\n5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\tgood\n5\t1\t1";
        let words = parse_tsv(tsv);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "good");
    }
}
