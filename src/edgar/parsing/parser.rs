use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use super::dedup::Deduplicator;
use super::section::{self, HeaderKind, Part};
use super::text;
use super::types::{Block, ParserStats};
use crate::edgar::report::FormType;

const DEFAULT_MIN_TEXT_LEN: usize = 10;
const DEFAULT_MAX_TABLE_ROWS: usize = 25;
const MAX_CELL_CHARS: usize = 50;

/// Submission wrapper and inline-XBRL tag wrappers, stripped from the raw
/// text before DOM parsing. The taxonomy tags are not valid HTML and
/// confuse the tree builder if left in place.
static STRIP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?s)<SEC-DOCUMENT>.*?<DOCUMENT>").unwrap(),
        Regex::new(r"(?s)<TYPE>.*?<TEXT>").unwrap(),
        Regex::new(r"</?ix:[^>]+>").unwrap(),
        Regex::new(r"</?dei:[^>]+>").unwrap(),
        Regex::new(r"</?us-gaap:[^>]+>").unwrap(),
    ]
});

/// XBRL structural-metadata markers. Two or more hits classify a block
/// (or a whole table) as taxonomy noise rather than filing content.
static XBRL_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Namespace Prefix:|Data Type:\s*xbrli:|Balance Type:\s*(?:na|credit|debit)|Period Type:\s*(?:duration|instant)|\bdei_\w+\b|\bus-gaap_\w+\b|xbrli:\w+ItemType|Definition.*References|Reference 1:\s*http://www\.xbrl\.org|-Publisher SEC\s*-Name|No definition available\.",
    )
    .unwrap()
});

/// Inline unit/namespace tokens (iso4217:USD, xbrli:shares, ...).
static XBRL_CRUFT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:iso4217:\w+|xbrli:\w+)\b").unwrap());

/// "Reference N: http://www.xbrl.org/..." boilerplate trailing tagged facts.
static XBRL_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Reference \d+:\s*http://www\.xbrl\.org/\d+/role/\w+\s*(?:-Publisher\s+\w+\s*)?(?:-Name\s+[\w\s]+)?(?:-Number\s+\d+\s*)?(?:-Section\s+[\w\-]+\s*)?(?:-Subsection\s+[\w\-]+\s*)?",
    )
    .unwrap()
});

static DISPLAY_NONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)display:\s*none").unwrap());

/// Parses SEC HTML / inline-XBRL filings into structured blocks.
///
/// Form-specific behavior:
/// - 10-K: annual report, Items 1-16
/// - 10-Q: quarterly report, Part I/II Items
/// - 8-K: current report, event items (1.01, 2.02, ...)
///
/// One instance may be reused across documents: every call to [`parse`]
/// resets the statistics, the duplicate-sentence set and the Part
/// tracker before touching the input.
///
/// [`parse`]: FilingParser::parse
#[derive(Debug)]
pub struct FilingParser {
    min_text_len: usize,
    max_table_rows: usize,
    form_type: FormType,
    current_part: Part,
    dedup: Deduplicator,
    pub stats: ParserStats,
}

impl Default for FilingParser {
    fn default() -> Self {
        FilingParser::new(FormType::Form10K)
    }
}

impl FilingParser {
    pub fn new(form_type: FormType) -> Self {
        FilingParser {
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            max_table_rows: DEFAULT_MAX_TABLE_ROWS,
            form_type,
            current_part: Part::I,
            dedup: Deduplicator::new(),
            stats: ParserStats::default(),
        }
    }

    pub fn with_limits(form_type: FormType, min_text_len: usize, max_table_rows: usize) -> Self {
        FilingParser {
            min_text_len,
            max_table_rows,
            ..FilingParser::new(form_type)
        }
    }

    pub fn set_form_type(&mut self, form_type: FormType) {
        self.form_type = form_type;
        self.current_part = Part::I;
    }

    /// Parse filing markup into an ordered list of content blocks.
    ///
    /// Never fails: malformed fragments simply contribute no blocks, and
    /// an empty or all-noise document yields an empty list.
    pub fn parse(&mut self, content: &str, form_type: &FormType) -> Vec<Block> {
        self.set_form_type(form_type.clone());
        self.stats = ParserStats::default();
        self.dedup.reset();

        debug!(
            "Parsing {} filing, content length: {} chars",
            self.form_type,
            content.len()
        );

        let mut html = content.to_string();
        for pattern in STRIP_PATTERNS.iter() {
            html = pattern.replace_all(&html, "").into_owned();
        }

        let document = Html::parse_document(&html);
        let root = document.root_element();

        // Tables first, so their text is not re-read when the enclosing
        // element is walked as plain text below.
        let mut tables: Vec<String> = Vec::new();
        for node in root.descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            if el.value().name() != "table" || is_excluded(el) {
                continue;
            }
            if let Some(piped) = self.table_to_pipes(el) {
                if !is_xbrl_noise(&piped) {
                    tables.push(piped);
                }
            }
        }

        let rules = section::patterns_for(&self.form_type);
        let mut blocks: Vec<Block> = Vec::new();
        let mut page = 1usize;

        for node in root.descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            let name = el.value().name();
            if !matches!(name, "p" | "div" | "span" | "h1" | "h2" | "h3" | "h4" | "hr") {
                continue;
            }
            if is_excluded(el) {
                continue;
            }

            let style = el.value().attr("style").unwrap_or("");
            if name == "hr" || style.contains("page-break") {
                page += 1;
                continue;
            }

            let raw = text::normalize_unicode(&visible_text(el, true));
            let cleaned = XBRL_CRUFT_RE.replace_all(&raw, "");
            let cleaned = XBRL_REFERENCE_RE.replace_all(&cleaned, "");
            let cleaned = text::collapse_whitespace(&cleaned);
            let deduped = self.dedup.deduplicate(&cleaned);

            if deduped.chars().count() <= self.min_text_len {
                continue;
            }
            if is_xbrl_noise(&deduped) {
                self.stats.noise_skipped += 1;
                debug!("Skipped XBRL metadata text at page {}", page);
                continue;
            }

            if let Some(header) = section::detect_header(rules, &deduped) {
                if self.form_type == FormType::Form10Q && header.kind == HeaderKind::Part {
                    if let Some(part) = Part::from_roman(&header.number) {
                        self.current_part = part;
                    }
                }
                let hint = format!("{}:{}", header.kind.as_hint_tag(), header.number);
                blocks.push(Block::item_header(deduped, page, hint));
            } else if matches!(name, "h1" | "h2" | "h3" | "h4") {
                blocks.push(Block::header(deduped, page));
            } else {
                blocks.push(Block::text(deduped, page));
            }
        }

        // Tables land after the walk, tagged with the final page counter.
        // The chunker re-groups by section, not by page, so the ordering
        // approximation is deliberate.
        for piped in tables {
            blocks.push(Block::table(piped, page));
            self.stats.tables += 1;
        }

        self.stats.blocks = blocks.len();
        self.stats.pages = page;
        self.stats.duplicates_removed = self.dedup.removed();

        info!(
            "Parsed {} blocks ({} tables), skipped {} XBRL noise, removed {} duplicates, {} pages",
            self.stats.blocks,
            self.stats.tables,
            self.stats.noise_skipped,
            self.stats.duplicates_removed,
            self.stats.pages
        );

        blocks
    }

    /// Convert a table element to a row-capped pipe-delimited block:
    /// header row, `|---|` separator, data rows. Cells are truncated to
    /// [`MAX_CELL_CHARS`]; tables rendering to two lines or fewer are
    /// dropped as empty shells.
    fn table_to_pipes(&self, table: ElementRef) -> Option<String> {
        let rows: Vec<ElementRef> = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr")
            .take(self.max_table_rows)
            .collect();

        let mut lines: Vec<String> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| matches!(el.value().name(), "td" | "th"))
                .map(|el| {
                    let cell = text::collapse_whitespace(&visible_text(el, false));
                    text::truncate_chars(&cell, MAX_CELL_CHARS).to_string()
                })
                .collect();
            if !cells.is_empty() {
                lines.push(format!("| {} |", cells.join(" | ")));
                if i == 0 {
                    lines.push(format!("|{}", "---|".repeat(cells.len())));
                }
            }
        }

        if lines.len() > 2 {
            Some(lines.join("\n"))
        } else {
            None
        }
    }
}

fn is_xbrl_noise(text: &str) -> bool {
    XBRL_NOISE_RE.find_iter(text).count() >= 2
}

/// True for elements removed before text extraction: non-content tags,
/// XBRL reference/definition metadata, and hidden elements.
fn is_stripped_element(el: &ElementRef) -> bool {
    let element = el.value();
    if matches!(element.name(), "script" | "style" | "meta" | "link" | "head") {
        return true;
    }
    if element.classes().any(|c| c == "authRefData") {
        return true;
    }
    if let Some(style) = element.attr("style") {
        if DISPLAY_NONE_RE.is_match(style) {
            return true;
        }
    }
    false
}

/// True if the element, or any ancestor, is stripped or a table. Tables
/// are consumed by the tables-first pass and must not contribute text
/// (or nested tables) again.
fn is_excluded(el: ElementRef) -> bool {
    if is_stripped_element(&el) {
        return true;
    }
    el.ancestors().any(|node| {
        ElementRef::wrap(node).map_or(false, |ancestor| {
            is_stripped_element(&ancestor) || ancestor.value().name() == "table"
        })
    })
}

/// Visible text of an element: descendant text nodes, trimmed, joined
/// with single spaces, skipping stripped subtrees. With `skip_tables`,
/// table subtrees contribute nothing (they are extracted separately).
fn visible_text(el: ElementRef, skip_tables: bool) -> String {
    let mut parts: Vec<&str> = Vec::new();
    collect_visible_text(el, skip_tables, &mut parts);
    parts.join(" ")
}

fn collect_visible_text<'a>(el: ElementRef<'a>, skip_tables: bool, out: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => {
                let s = t.trim();
                if !s.is_empty() {
                    out.push(s);
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if is_stripped_element(&child_el) {
                        continue;
                    }
                    if skip_tables && child_el.value().name() == "table" {
                        continue;
                    }
                    collect_visible_text(child_el, skip_tables, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::parsing::types::BlockKind;

    fn parse(html: &str, form: FormType) -> (Vec<Block>, ParserStats) {
        let mut parser = FilingParser::new(form.clone());
        let blocks = parser.parse(html, &form);
        (blocks, parser.stats.clone())
    }

    #[test]
    fn test_extracts_paragraphs_in_order() {
        let html = "<html><body>\
            <p>The first paragraph of the filing body.</p>\
            <p>The second paragraph follows the first one.</p>\
            </body></html>";
        let (blocks, stats) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Text);
        assert!(blocks[0].text.starts_with("The first paragraph"));
        assert!(blocks[1].text.starts_with("The second paragraph"));
        assert_eq!(stats.blocks, 2);
    }

    #[test]
    fn test_short_fragments_dropped() {
        let html = "<p>tiny</p><p>A fragment that clears the minimum length.</p>";
        let (blocks, _) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_hr_and_page_break_advance_pages() {
        let html = "<p>Text on the first page of the filing.</p>\
            <hr/>\
            <p>Text on the second page of the filing.</p>\
            <div style=\"page-break-after: always\"></div>\
            <p>Text on the third page of the filing.</p>";
        let (blocks, stats) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].page, 1);
        assert_eq!(blocks[1].page, 2);
        assert_eq!(blocks[2].page, 3);
        assert_eq!(stats.pages, 3);
    }

    #[test]
    fn test_hidden_and_auth_ref_elements_skipped() {
        let html = "<p style=\"display: none\">Hidden machine metadata paragraph.</p>\
            <p class=\"authRefData\">Reference and definition metadata block.</p>\
            <p>Visible paragraph content that stays in.</p>";
        let (blocks, _) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text.starts_with("Visible paragraph"));
    }

    #[test]
    fn test_inline_xbrl_wrappers_stripped_before_parsing() {
        let html = "<p><ix:nonNumeric name=\"dei:DocumentType\">Annual report disclosure text body.</ix:nonNumeric></p>";
        let (blocks, _) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Annual report disclosure text body.");
    }

    #[test]
    fn test_xbrl_cruft_tokens_removed() {
        let html = "<p>Total revenue iso4217:USD was higher than xbrli:shares prior year totals.</p>";
        let (blocks, _) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].text.contains("iso4217"));
        assert!(!blocks[0].text.contains("xbrli"));
    }

    #[test]
    fn test_xbrl_noise_blocks_counted_and_dropped() {
        let html = "<p>Namespace Prefix: dei Balance Type: credit Period Type: duration for this element.</p>\
            <p>Ordinary narrative disclosure that is kept.</p>";
        let (blocks, stats) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 1);
        assert_eq!(stats.noise_skipped, 1);
    }

    #[test]
    fn test_table_extracted_once_as_pipes() {
        let html = "<div><p>Narrative before the results table.</p>\
            <table>\
            <tr><th>Metric</th><th>2024</th></tr>\
            <tr><td>Revenue</td><td>100</td></tr>\
            <tr><td>Net income</td><td>25</td></tr>\
            </table></div>";
        let (blocks, stats) = parse(html, FormType::Form10K);
        let tables: Vec<&Block> = blocks.iter().filter(|b| b.is_table).collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(stats.tables, 1);
        assert!(tables[0].text.contains("| Metric | 2024 |"));
        assert!(tables[0].text.contains("|---|---|"));
        assert!(tables[0].text.contains("| Revenue | 100 |"));
        // Table text must not leak into the enclosing div's block.
        for block in blocks.iter().filter(|b| !b.is_table) {
            assert!(!block.text.contains("Revenue"));
        }
    }

    #[test]
    fn test_two_row_table_dropped_as_empty_shell() {
        let html = "<table><tr><td>Lonely header cell row</td></tr></table>\
            <p>Some surrounding narrative text.</p>";
        let (blocks, stats) = parse(html, FormType::Form10K);
        assert!(blocks.iter().all(|b| !b.is_table));
        assert_eq!(stats.tables, 0);
    }

    #[test]
    fn test_item_header_detected_with_hint() {
        let html = "<p>Item 1A. Risk Factors</p><p>Risks described in detail below.</p>";
        let (blocks, _) = parse(html, FormType::Form10K);
        assert_eq!(blocks[0].kind, BlockKind::ItemHeader);
        assert_eq!(blocks[0].section_hint.as_deref(), Some("item:1A"));
        assert_eq!(blocks[1].kind, BlockKind::Text);
    }

    #[test]
    fn test_heading_elements_classified_as_headers() {
        let html = "<h2>Company Overview Heading</h2><p>Body paragraph under the heading element.</p>";
        let (blocks, _) = parse(html, FormType::Form10K);
        assert_eq!(blocks[0].kind, BlockKind::Header);
    }

    #[test]
    fn test_duplicate_sentence_across_blocks_removed() {
        let html = "<p>This exact sentence appears twice in the document body.</p>\
            <p>This exact sentence appears twice in the document body. Plus a unique second thought.</p>";
        let (blocks, stats) = parse(html, FormType::Form10K);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "Plus a unique second thought.");
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn test_empty_document_yields_no_blocks() {
        let (blocks, stats) = parse("", FormType::Form10K);
        assert!(blocks.is_empty());
        assert_eq!(stats.blocks, 0);
        assert_eq!(stats.pages, 1);
    }

    #[test]
    fn test_unparseable_garbage_never_panics() {
        let (_, _) = parse("<div><p>unclosed <table><tr><td>mess", FormType::Form10K);
        let (_, _) = parse("<<<>>>&&&", FormType::Form8K);
    }

    #[test]
    fn test_reuse_resets_state_between_documents() {
        let mut parser = FilingParser::new(FormType::Form10K);
        let html = "<p>A sentence that is certainly long enough to track.</p>";
        let first = parser.parse(html, &FormType::Form10K);
        // Same content again: without the reset the sentence set would
        // swallow the repeated sentence.
        let second = parser.parse(html, &FormType::Form10K);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].text, second[0].text);
        assert_eq!(parser.stats.duplicates_removed, 0);
    }
}
