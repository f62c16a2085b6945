use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::config::ChunkConfig;
use crate::edgar::parsing::section::{self, HeaderKind, Part};
use crate::edgar::parsing::text;
use crate::edgar::parsing::types::{Block, BlockKind};
use crate::edgar::report::FormType;

const DEFAULT_MIN_TABLE_WORDS: usize = 75;
/// Fingerprints at or under this length identify too little content to
/// be worth tracking for deduplication.
const MIN_FINGERPRINT_CHARS: usize = 20;
const FINGERPRINT_CHARS: usize = 200;

/// Blocks that carry navigation or filler rather than content:
/// table-of-contents markers, signature pages, bare page numbers, bare
/// Part dividers, exhibit indexes, "None."/"N/A." placeholders.
static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:table\s*of\s*contents?|signatures?|page\s*\d+|\d+|part\s+[ivx]+|exhibit\s+index|None\.?|N/?A\.?)$",
    )
    .unwrap()
});

/// Pipe/dash table furniture, stripped before fingerprinting so the same
/// table re-rendered with different alignment still deduplicates.
static TABLE_DATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\|\-\s]+").unwrap());

/// A retrieval-ready chunk with its provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub ticker: String,
    pub form_type: String,
    pub year: String,
    pub accession_number: String,
    pub section_id: String,
    pub section_title: String,
    pub page: usize,
    pub has_table: bool,
    pub word_count: usize,
}

/// Counters exposed by [`FilingChunker`], reset at the start of every
/// `process` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerStats {
    pub sections: usize,
    pub chunks: usize,
    pub tables: usize,
    pub trivial_skipped: usize,
    pub boilerplate_skipped: usize,
    pub merged_undersized: usize,
    pub content_deduped: usize,
}

/// A contiguous run of blocks under one heading. Lives only within one
/// `process` call.
#[derive(Debug)]
struct Section<'a> {
    id: String,
    title: String,
    blocks: Vec<&'a Block>,
    start_page: usize,
}

/// Groups parsed blocks into sections and packs them into size-bounded,
/// overlap-linked chunks.
///
/// All per-document state (seen-content fingerprints, the 10-Q Part
/// tracker, statistics) is reset at the top of every [`process`] call,
/// so one instance can chunk many documents without leakage.
///
/// [`process`]: FilingChunker::process
#[derive(Debug)]
pub struct FilingChunker {
    form_type: FormType,
    config: ChunkConfig,
    min_table_words: usize,
    current_part: Part,
    seen_content: HashSet<String>,
    pub stats: ChunkerStats,
}

impl FilingChunker {
    pub fn new(form_type: FormType) -> Self {
        let config = ChunkConfig::for_form(&form_type);
        FilingChunker {
            form_type,
            config,
            min_table_words: DEFAULT_MIN_TABLE_WORDS,
            current_part: Part::I,
            seen_content: HashSet::new(),
            stats: ChunkerStats::default(),
        }
    }

    /// Override the form-derived sizing, e.g. for tests or tuning runs.
    pub fn with_config(form_type: FormType, config: ChunkConfig, min_table_words: usize) -> Self {
        FilingChunker {
            config,
            min_table_words,
            ..FilingChunker::new(form_type)
        }
    }

    /// Chunk parsed blocks into retrieval-ready segments.
    ///
    /// `ticker`, `year` and `accession` are passed through onto every
    /// chunk; `form_type` selects the sizing and title tables. Never
    /// fails: an empty or fully-filtered block list yields no chunks.
    pub fn process(
        &mut self,
        blocks: &[Block],
        form_type: &FormType,
        accession: &str,
        ticker: &str,
        year: &str,
    ) -> Vec<Chunk> {
        self.form_type = form_type.clone();
        self.config = ChunkConfig::for_form(form_type);
        self.current_part = Part::I;
        self.seen_content.clear();
        self.stats = ChunkerStats::default();

        debug!(
            "Processing {} blocks for {} {} ({})",
            blocks.len(),
            ticker,
            year,
            self.form_type
        );

        let filtered = self.filter_boilerplate(blocks);
        debug!(
            "After boilerplate filter: {} blocks (filtered {})",
            filtered.len(),
            blocks.len() - filtered.len()
        );

        let sections = self.extract_sections(&filtered);
        self.stats.sections = sections.len();

        let mut chunks = Vec::new();
        for section in &sections {
            let section_chunks = self.chunk_section(section, ticker, year, accession);
            debug!("Section '{}': {} chunks", section.id, section_chunks.len());
            chunks.extend(section_chunks);
        }

        let chunks = self.merge_undersized(chunks);

        self.stats.chunks = chunks.len();
        self.stats.tables = chunks.iter().filter(|c| c.has_table).count();

        info!(
            "Chunked into {} chunks ({} tables) across {} sections | \
             skipped: {} trivial, {} boilerplate, {} deduped | merged: {} undersized",
            self.stats.chunks,
            self.stats.tables,
            self.stats.sections,
            self.stats.trivial_skipped,
            self.stats.boilerplate_skipped,
            self.stats.content_deduped,
            self.stats.merged_undersized
        );

        chunks
    }

    fn item_title(&self, item_num: &str) -> Option<&'static str> {
        section::item_title(&self.form_type, self.current_part, item_num)
    }

    /// Drop boilerplate blocks, sub-5-word non-table fragments, and
    /// blocks whose content fingerprint was already seen in this
    /// document.
    fn filter_boilerplate<'a>(&mut self, blocks: &'a [Block]) -> Vec<&'a Block> {
        let mut filtered = Vec::new();
        for block in blocks {
            let trimmed = block.text.trim();
            if BOILERPLATE_RE.is_match(trimmed) {
                self.stats.boilerplate_skipped += 1;
                debug!("Filtered boilerplate: '{:.50}'", trimmed);
                continue;
            }
            if !block.is_table && text::word_count(trimmed) < 5 {
                self.stats.boilerplate_skipped += 1;
                continue;
            }
            let fingerprint = content_fingerprint(trimmed);
            if self.seen_content.contains(&fingerprint) {
                self.stats.content_deduped += 1;
                debug!("Deduped content block: '{:.50}'", trimmed);
                continue;
            }
            if fingerprint.chars().count() > MIN_FINGERPRINT_CHARS {
                self.seen_content.insert(fingerprint);
            }
            filtered.push(block);
        }
        filtered
    }

    /// Group blocks into sections by Item headers. Section hints from
    /// the parser take precedence; blocks without hints fall back to the
    /// form's bare Item regex.
    fn extract_sections<'a>(&mut self, blocks: &[&'a Block]) -> Vec<Section<'a>> {
        let mut sections: Vec<Section<'a>> = Vec::new();
        let mut current: Option<Section<'a>> = None;
        let mut preamble: Vec<&'a Block> = Vec::new();
        let item_re = section::item_pattern(&self.form_type);

        for &block in blocks {
            let trimmed = block.text.trim();

            let mut is_header = false;
            let mut item_num = String::new();
            let mut title_text = String::new();

            if let Some(hint) = &block.section_hint {
                if let Some((tag, num)) = hint.split_once(':') {
                    if let Some(kind) = HeaderKind::from_hint_tag(tag) {
                        if self.form_type == FormType::Form10Q && kind == HeaderKind::Part {
                            if let Some(part) = Part::from_roman(num) {
                                self.current_part = part;
                            }
                            // Part headers are dividers, not sections.
                            continue;
                        }
                        if kind == HeaderKind::Item {
                            is_header = true;
                            item_num = num.to_string();
                            title_text = self.item_title(num).unwrap_or("").to_string();
                        }
                    }
                }
            }

            if !is_header {
                if let Some(caps) = item_re.captures(trimmed) {
                    if matches!(
                        block.kind,
                        BlockKind::Header | BlockKind::Text | BlockKind::ItemHeader
                    ) {
                        is_header = true;
                        item_num = caps
                            .get(1)
                            .map(|m| m.as_str().to_uppercase())
                            .unwrap_or_default();
                        title_text = caps
                            .get(2)
                            .map(|m| m.as_str().trim().to_string())
                            .unwrap_or_default();
                    }
                }
            }

            if is_header {
                if let Some(done) = current.take() {
                    sections.push(done);
                } else if !preamble.is_empty() {
                    let start_page = preamble[0].page;
                    sections.push(Section {
                        id: "preamble".to_string(),
                        title: "Cover and Table of Contents".to_string(),
                        blocks: std::mem::take(&mut preamble),
                        start_page,
                    });
                }

                if title_text.chars().count() < 10 {
                    if let Some(std_title) = self.item_title(&item_num) {
                        title_text = std_title.to_string();
                    }
                }

                current = Some(Section {
                    id: format!("item_{}", item_num.to_lowercase().replace('.', "_")),
                    title: format!("Item {}: {}", item_num, title_text),
                    blocks: Vec::new(),
                    start_page: block.page,
                });
            } else if let Some(section) = current.as_mut() {
                section.blocks.push(block);
            } else {
                preamble.push(block);
            }
        }

        if let Some(done) = current.take() {
            sections.push(done);
        }

        if sections.is_empty() && !blocks.is_empty() {
            warn!("No ITEM headers found, using full document as single section");
            sections.push(Section {
                id: "full_doc".to_string(),
                title: "Full Document".to_string(),
                blocks: blocks.to_vec(),
                start_page: 1,
            });
        }

        sections
    }

    /// Pack one section's blocks into target-sized chunks with overlap.
    /// Tables always get their own chunk, with no leading overlap.
    fn chunk_section(
        &mut self,
        section: &Section,
        ticker: &str,
        year: &str,
        accession: &str,
    ) -> Vec<Chunk> {
        let mut packer = Packer {
            config: &self.config,
            form_type: self.form_type.to_string(),
            ticker,
            year,
            accession,
            section_id: &section.id,
            section_title: &section.title,
            chunks: Vec::new(),
            buffer: Vec::new(),
            buf_words: 0,
            buf_page: section.start_page,
            buf_table: false,
            last_overlap: String::new(),
        };

        for &block in &section.blocks {
            let words = text::word_count(&block.text);

            if block.is_table && words < self.min_table_words {
                self.stats.trivial_skipped += 1;
                debug!("Skipped trivial table ({} words) at page {}", words, block.page);
                continue;
            }

            if block.is_table {
                packer.flush(true);
                packer.buf_page = block.page;
                packer.buffer.push(block.text.clone());
                packer.buf_words = words;
                packer.buf_table = true;
                packer.flush(false);
            } else if packer.buf_words + words > self.config.max_chunk_size {
                if packer.buf_words >= self.config.target_chunk_size {
                    packer.flush(true);
                    packer.buf_page = block.page;
                }
                for sentence in text::split_sentences(&block.text) {
                    let sentence_words = text::word_count(sentence);
                    if packer.buf_words + sentence_words > self.config.max_chunk_size {
                        packer.flush(true);
                        packer.buf_page = block.page;
                    }
                    if sentence_words > self.config.max_chunk_size {
                        warn!(
                            "Sentence of {} words exceeds max chunk size {}; keeping it whole",
                            sentence_words, self.config.max_chunk_size
                        );
                    }
                    packer.buffer.push(sentence.to_string());
                    packer.buf_words += sentence_words;
                }
            } else {
                if packer.buffer.is_empty() {
                    packer.buf_page = block.page;
                }
                packer.buffer.push(block.text.clone());
                packer.buf_words += words;
            }
        }

        packer.flush(true);
        packer.chunks
    }

    /// Merge non-table chunks below `min_chunk_size` into a same-section
    /// neighbor (forward first, then backward) when the result stays
    /// within `max_chunk_size`. Never merges across the table/non-table
    /// divide. Unmergeable undersized chunks are kept as-is.
    fn merge_undersized(&mut self, mut chunks: Vec<Chunk>) -> Vec<Chunk> {
        let mut merged: Vec<Chunk> = Vec::new();
        let mut i = 0;

        while i < chunks.len() {
            let chunk = chunks[i].clone();

            if chunk.word_count < self.config.min_chunk_size && !chunk.has_table {
                if i + 1 < chunks.len()
                    && chunks[i + 1].section_id == chunk.section_id
                    && !chunks[i + 1].has_table
                {
                    let next = &chunks[i + 1];
                    let content = format!("{} {}", chunk.content, next.content);
                    let words = text::word_count(&content);
                    if words <= self.config.max_chunk_size {
                        debug!(
                            "Merged undersized chunk ({} words) with next ({} words) -> {} words",
                            chunk.word_count, next.word_count, words
                        );
                        // Earlier chunk's id wins; leave the combined
                        // chunk in place for potential further merging.
                        chunks[i + 1] = Chunk {
                            content,
                            word_count: words,
                            ..chunk
                        };
                        self.stats.merged_undersized += 1;
                        i += 1;
                        continue;
                    }
                }

                if let Some(prev) = merged.last_mut() {
                    if prev.section_id == chunk.section_id && !prev.has_table {
                        let content = format!("{} {}", prev.content, chunk.content);
                        let words = text::word_count(&content);
                        if words <= self.config.max_chunk_size {
                            debug!(
                                "Merged undersized chunk ({} words) with previous -> {} words",
                                chunk.word_count, words
                            );
                            prev.content = content;
                            prev.word_count = words;
                            self.stats.merged_undersized += 1;
                            i += 1;
                            continue;
                        }
                    }
                }
            }

            merged.push(chunk);
            i += 1;
        }

        merged
    }
}

/// Normalized leading fingerprint of a block, used to catch repeated
/// content (accessibility copies, duplicated cover blocks).
fn content_fingerprint(text_in: &str) -> String {
    let stripped;
    let body = if text_in.contains('|') {
        stripped = TABLE_DATA_RE.replace_all(text_in, " ").into_owned();
        stripped.as_str()
    } else {
        text_in
    };
    let lowered: String = body
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    text::collapse_whitespace(&lowered)
        .chars()
        .take(FINGERPRINT_CHARS)
        .collect()
}

/// Buffer state for packing one section. Mirrors a flush-with-overlap
/// loop: each flush prepends the previous chunk's trailing words (unless
/// told not to) and stores its own tail for the next one.
struct Packer<'a> {
    config: &'a ChunkConfig,
    form_type: String,
    ticker: &'a str,
    year: &'a str,
    accession: &'a str,
    section_id: &'a str,
    section_title: &'a str,
    chunks: Vec<Chunk>,
    buffer: Vec<String>,
    buf_words: usize,
    buf_page: usize,
    buf_table: bool,
    last_overlap: String,
}

impl Packer<'_> {
    fn flush(&mut self, add_overlap: bool) {
        if self.buffer.is_empty() {
            return;
        }

        let mut content = self.buffer.join(" ");
        if add_overlap && !self.last_overlap.is_empty() && !self.chunks.is_empty() {
            content = format!("{} {}", self.last_overlap, content);
        }

        let word_count;
        {
            let words: Vec<&str> = content.split_whitespace().collect();
            word_count = words.len();
            self.last_overlap = if word_count > self.config.overlap_size {
                words[word_count - self.config.overlap_size..].join(" ")
            } else {
                String::new()
            };
        }

        self.chunks.push(Chunk {
            id: format!(
                "{}_{}_{}_{}_{:04}",
                self.ticker,
                self.form_type,
                self.year,
                self.section_id,
                self.chunks.len()
            ),
            content,
            ticker: self.ticker.to_string(),
            form_type: self.form_type.clone(),
            year: self.year.to_string(),
            accession_number: self.accession.to_string(),
            section_id: self.section_id.to_string(),
            section_title: self.section_title.to_string(),
            page: self.buf_page,
            has_table: self.buf_table,
            word_count,
        });

        self.buffer.clear();
        self.buf_words = 0;
        self.buf_table = false;
    }
}
