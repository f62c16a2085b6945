use serde::{Deserialize, Serialize};

/// Kind of content a parsed block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Header,
    ItemHeader,
    Table,
}

/// One unit of content extracted from a filing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub text: String,
    pub kind: BlockKind,
    pub page: usize,
    pub is_table: bool,
    /// Detected section boundary, encoded as `"<header_type>:<id>"`
    /// (e.g. `"item:1A"`, `"part:II"`). Set by the parser's section
    /// detector, consumed by the chunker's section grouping.
    pub section_hint: Option<String>,
}

impl Block {
    pub fn text(text: String, page: usize) -> Self {
        Block {
            text,
            kind: BlockKind::Text,
            page,
            is_table: false,
            section_hint: None,
        }
    }

    pub fn header(text: String, page: usize) -> Self {
        Block {
            text,
            kind: BlockKind::Header,
            page,
            is_table: false,
            section_hint: None,
        }
    }

    pub fn item_header(text: String, page: usize, hint: String) -> Self {
        Block {
            text,
            kind: BlockKind::ItemHeader,
            page,
            is_table: false,
            section_hint: Some(hint),
        }
    }

    pub fn table(text: String, page: usize) -> Self {
        Block {
            text,
            kind: BlockKind::Table,
            page,
            is_table: true,
            section_hint: None,
        }
    }
}

/// Counters exposed by [`FilingParser`](super::parser::FilingParser),
/// reset at the start of every `parse` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserStats {
    pub blocks: usize,
    pub tables: usize,
    pub noise_skipped: usize,
    pub duplicates_removed: usize,
    pub pages: usize,
}

impl Default for ParserStats {
    fn default() -> Self {
        ParserStats {
            blocks: 0,
            tables: 0,
            noise_skipped: 0,
            duplicates_removed: 0,
            pages: 1,
        }
    }
}
