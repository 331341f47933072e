use std::fmt;

use serde::{Deserialize, Serialize};

/// Pixel rectangle of a recognized word.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn vertical_center(&self) -> f64 {
        self.top as f64 + self.height as f64 / 2.0
    }
}

/// Structural position assigned by the OCR backend. Orders by block,
/// then paragraph, then line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextAddress {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

impl TextAddress {
    pub fn new(block: u32, paragraph: u32, line: u32) -> Self {
        Self {
            block,
            paragraph,
            line,
        }
    }
}

/// One word reported by an OCR backend for a single page or image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordToken {
    pub text: String,
    /// 0–100; backends report -1 for rows that carry no word.
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub address: TextAddress,
}

/// A contiguous slice of extracted artifact text, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub source: String,
    pub text: String,
}

impl Chunk {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A chunk together with its embedding, as persisted in the embeddings store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    pub source: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl EmbeddingRecord {
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            source: chunk.source,
            text: chunk.text,
            embedding,
        }
    }
}

/// Status of an entry in the suggestion log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Tentative,
    Trusted,
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionStatus::Tentative => write!(f, "tentative"),
            SuggestionStatus::Trusted => write!(f, "trusted"),
        }
    }
}

/// One line of the append-only suggestion log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionRecord {
    pub parameter: String,
    pub value: String,
    pub status: SuggestionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_orders_block_then_paragraph_then_line() {
        let mut addrs = vec![
            TextAddress::new(2, 1, 1),
            TextAddress::new(1, 2, 1),
            TextAddress::new(1, 1, 3),
            TextAddress::new(1, 1, 2),
        ];
        addrs.sort();
        assert_eq!(
            addrs,
            vec![
                TextAddress::new(1, 1, 2),
                TextAddress::new(1, 1, 3),
                TextAddress::new(1, 2, 1),
                TextAddress::new(2, 1, 1),
            ]
        );
    }

    #[test]
    fn test_suggestion_record_wire_format() {
        let record = SuggestionRecord {
            parameter: "intent".into(),
            value: "find_fee_policy".into(),
            status: SuggestionStatus::Trusted,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"parameter":"intent","value":"find_fee_policy","status":"trusted"}"#
        );
    }

    #[test]
    fn test_bbox_geometry() {
        let bbox = BoundingBox::new(10, 20, 30, 11);
        assert_eq!(bbox.right(), 40);
        assert_eq!(bbox.vertical_center(), 25.5);
    }
}
