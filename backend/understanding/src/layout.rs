//! Layout reconstruction for OCR output.
//!
//! OCR backends report individual words with a bounding box and a
//! block/paragraph/line address. This module stitches them back into text
//! that keeps the visual structure of the page: either following the
//! backend's own line grouping (free text), or by bucketing words on their
//! vertical position (grids, tables, multi-column forms).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use docent_core::{TextAddress, WordToken};

/// Words below this confidence are treated as noise.
pub const MIN_CONFIDENCE: f32 = 60.0;

/// Horizontal gap (px) above which line mode emits the wide separator.
pub const LINE_GAP_THRESHOLD: i32 = 40;

/// Horizontal gap (px) above which column mode emits the wide separator.
pub const COLUMN_GAP_THRESHOLD: i32 = 50;

/// Vertical bin size (px) used to absorb baseline jitter in column mode.
pub const ROW_GRANULARITY: f64 = 10.0;

/// Separator standing in for a tab stop between distant words.
pub const WIDE_SEPARATOR: &str = "    ";

/// Strategy used to order recognized words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Follow the backend's (block, paragraph, line) grouping.
    #[default]
    Line,
    /// Group words by vertical position; suited to grids and tables.
    Column,
}

impl LayoutMode {
    /// Pick a mode from an artifact's file name: names mentioning "grid" or
    /// "table" hold tabular content.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("grid") || lower.contains("table") {
            LayoutMode::Column
        } else {
            LayoutMode::Line
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(Self::from_file_name)
            .unwrap_or_default()
    }
}

/// Tunables for [`reconstruct_with`].
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub min_confidence: f32,
    pub line_gap_threshold: i32,
    pub column_gap_threshold: i32,
    pub row_granularity: f64,
    pub wide_separator: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE,
            line_gap_threshold: LINE_GAP_THRESHOLD,
            column_gap_threshold: COLUMN_GAP_THRESHOLD,
            row_granularity: ROW_GRANULARITY,
            wide_separator: WIDE_SEPARATOR.to_string(),
        }
    }
}

/// Rebuild page text from OCR words using the default thresholds.
pub fn reconstruct(tokens: &[WordToken], mode: LayoutMode) -> String {
    reconstruct_with(tokens, mode, &LayoutOptions::default())
}

/// Rebuild page text from OCR words.
///
/// Returns an empty string when nothing survives the confidence filter.
pub fn reconstruct_with(tokens: &[WordToken], mode: LayoutMode, opts: &LayoutOptions) -> String {
    let words: Vec<&WordToken> = tokens
        .iter()
        .filter(|t| t.confidence >= opts.min_confidence && !t.text.trim().is_empty())
        .collect();

    if words.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = match mode {
        LayoutMode::Line => {
            let mut groups: BTreeMap<TextAddress, Vec<&WordToken>> = BTreeMap::new();
            for word in words {
                groups.entry(word.address).or_default().push(word);
            }
            groups
                .into_values()
                .map(|mut line| render_line(&mut line, opts.line_gap_threshold, &opts.wide_separator))
                .collect()
        }
        LayoutMode::Column => {
            let mut rows: BTreeMap<i64, Vec<&WordToken>> = BTreeMap::new();
            for word in words {
                rows.entry(row_bucket(word, opts.row_granularity))
                    .or_default()
                    .push(word);
            }
            rows.into_values()
                .map(|mut row| render_line(&mut row, opts.column_gap_threshold, &opts.wide_separator))
                .collect()
        }
    };

    lines.join("\n")
}

/// Vertical center snapped to the nearest multiple of `granularity`.
fn row_bucket(word: &WordToken, granularity: f64) -> i64 {
    let center = word.bbox.vertical_center();
    ((center / granularity).round() * granularity) as i64
}

/// Left-to-right order; ties fall back to top edge, then text, so the
/// result does not depend on the order the backend reported words in.
fn reading_order(a: &&WordToken, b: &&WordToken) -> Ordering {
    a.bbox
        .left
        .cmp(&b.bbox.left)
        .then(a.bbox.top.cmp(&b.bbox.top))
        .then_with(|| a.text.cmp(&b.text))
}

fn render_line(words: &mut [&WordToken], gap_threshold: i32, wide_separator: &str) -> String {
    words.sort_by(reading_order);

    let mut line = String::new();
    let mut prev_right: Option<i32> = None;
    for word in words.iter() {
        if let Some(right) = prev_right {
            let gap = word.bbox.left - right;
            line.push_str(if gap > gap_threshold { wide_separator } else { " " });
        }
        line.push_str(word.text.trim());
        prev_right = Some(word.bbox.right());
    }
    line
}
