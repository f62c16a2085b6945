use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::edgar::report::FormType;

/// What kind of structural header a block was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Item,
    Part,
    Section,
    ForwardLooking,
}

impl HeaderKind {
    /// Tag used in `Block::section_hint` (`"item:1A"`, `"part:II"`, ...).
    pub fn as_hint_tag(self) -> &'static str {
        match self {
            HeaderKind::Item => "item",
            HeaderKind::Part => "part",
            HeaderKind::Section => "section",
            HeaderKind::ForwardLooking => "forward_looking",
        }
    }

    pub fn from_hint_tag(tag: &str) -> Option<Self> {
        match tag {
            "item" => Some(HeaderKind::Item),
            "part" => Some(HeaderKind::Part),
            "section" => Some(HeaderKind::Section),
            "forward_looking" => Some(HeaderKind::ForwardLooking),
            _ => None,
        }
    }
}

/// 10-Q Part I / Part II tracker. Part headers are structural dividers,
/// not sections; their only effect is switching the Item-title table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Part {
    #[default]
    I,
    II,
}

impl Part {
    pub fn from_roman(s: &str) -> Option<Part> {
        match s {
            "I" => Some(Part::I),
            "II" => Some(Part::II),
            _ => None,
        }
    }

    pub fn other(self) -> Part {
        match self {
            Part::I => Part::II,
            Part::II => Part::I,
        }
    }
}

/// A recognized section header: normalized identifier plus whatever raw
/// title text trailed it on the same line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub kind: HeaderKind,
    pub number: String,
    pub title: String,
}

static PATTERNS_10K: Lazy<Vec<(Regex, HeaderKind)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)^ITEM\s*(\d{1,2}[A-D]?)\.?\s*[-–—.]?\s*(.*)$").unwrap(),
            HeaderKind::Item,
        ),
        (
            Regex::new(r"(?i)^PART\s+([IVX]+)\.?\s*[-–—.]?\s*(.*)$").unwrap(),
            HeaderKind::Part,
        ),
    ]
});

static PATTERNS_8K: Lazy<Vec<(Regex, HeaderKind)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)^ITEM\s*(\d+\.?\d*)\.?\s*[-–—.]?\s*(.*)$").unwrap(),
            HeaderKind::Item,
        ),
        (
            Regex::new(r"(?i)^SECTION\s*(\d+)\.?\s*[-–—.]?\s*(.*)$").unwrap(),
            HeaderKind::Section,
        ),
        (
            Regex::new(r"(?i)^Forward.Looking\s+Statements?(.*)$").unwrap(),
            HeaderKind::ForwardLooking,
        ),
    ]
});

/// Ordered header rules for a form type. Unknown forms get the 10-K set.
pub fn patterns_for(form: &FormType) -> &'static [(Regex, HeaderKind)] {
    match form {
        FormType::Form8K => &PATTERNS_8K,
        _ => &PATTERNS_10K,
    }
}

/// Bare Item regex used by the chunker as a fallback when a block carries
/// no section hint.
pub fn item_pattern(form: &FormType) -> &'static Regex {
    &patterns_for(form)[0].0
}

/// Match `text` against a form's header rules, first rule wins.
pub fn detect_header(rules: &[(Regex, HeaderKind)], text: &str) -> Option<HeaderMatch> {
    let text = text.trim();
    for (pattern, kind) in rules {
        if let Some(caps) = pattern.captures(text) {
            let number = caps
                .get(1)
                .map(|m| m.as_str().trim().to_uppercase())
                .unwrap_or_default();
            let title = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            return Some(HeaderMatch {
                kind: *kind,
                number,
                title,
            });
        }
    }
    None
}

static ITEM_TITLES_10K: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1", "Business"),
        ("1A", "Risk Factors"),
        ("1B", "Unresolved Staff Comments"),
        ("1C", "Cybersecurity"),
        ("1D", "Information about Executive Officers"),
        ("2", "Properties"),
        ("3", "Legal Proceedings"),
        ("4", "Mine Safety Disclosures"),
        ("5", "Market for Registrant's Common Equity"),
        ("6", "Reserved"),
        ("7", "Management's Discussion and Analysis"),
        ("7A", "Quantitative and Qualitative Disclosures About Market Risk"),
        ("8", "Financial Statements and Supplementary Data"),
        ("9", "Changes in and Disagreements with Accountants"),
        ("9A", "Controls and Procedures"),
        ("9B", "Other Information"),
        ("9C", "Disclosure Regarding Foreign Jurisdictions"),
        ("10", "Directors, Executive Officers and Corporate Governance"),
        ("11", "Executive Compensation"),
        ("12", "Security Ownership"),
        ("13", "Certain Relationships and Related Transactions"),
        ("14", "Principal Accountant Fees and Services"),
        ("15", "Exhibits and Financial Statement Schedules"),
        ("16", "Form 10-K Summary"),
    ])
});

static ITEM_TITLES_10Q_PART_I: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1", "Financial Statements"),
        ("2", "Management's Discussion and Analysis"),
        ("3", "Quantitative and Qualitative Disclosures About Market Risk"),
        ("4", "Controls and Procedures"),
    ])
});

static ITEM_TITLES_10Q_PART_II: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1", "Legal Proceedings"),
        ("1A", "Risk Factors"),
        ("2", "Unregistered Sales of Equity Securities"),
        ("3", "Defaults Upon Senior Securities"),
        ("4", "Mine Safety Disclosures"),
        ("5", "Other Information"),
        ("6", "Exhibits"),
    ])
});

static ITEM_TITLES_8K: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1.01", "Entry into Material Definitive Agreement"),
        ("1.02", "Termination of Material Definitive Agreement"),
        ("1.03", "Bankruptcy or Receivership"),
        ("2.01", "Completion of Acquisition or Disposition of Assets"),
        ("2.02", "Results of Operations and Financial Condition"),
        ("2.03", "Creation of Direct Financial Obligation"),
        ("2.04", "Triggering Events That Accelerate Obligations"),
        ("2.05", "Costs Associated with Exit or Disposal Activities"),
        ("2.06", "Material Impairments"),
        ("3.01", "Notice of Delisting"),
        ("3.02", "Unregistered Sales of Equity Securities"),
        ("3.03", "Material Modification to Rights"),
        ("4.01", "Changes in Registrant's Certifying Accountant"),
        ("4.02", "Non-Reliance on Previously Issued Financial Statements"),
        ("5.01", "Changes in Control of Registrant"),
        ("5.02", "Departure/Election of Directors or Officers"),
        ("5.03", "Amendments to Articles or Bylaws"),
        ("5.04", "Temporary Suspension of Trading"),
        ("5.05", "Amendment to Registrant's Code of Ethics"),
        ("5.06", "Change in Shell Company Status"),
        ("5.07", "Submission of Matters to Vote of Security Holders"),
        ("5.08", "Shareholder Nominations"),
        ("7.01", "Regulation FD Disclosure"),
        ("8.01", "Other Events"),
        ("9.01", "Financial Statements and Exhibits"),
    ])
});

fn part_titles(part: Part) -> &'static HashMap<&'static str, &'static str> {
    match part {
        Part::I => &ITEM_TITLES_10Q_PART_I,
        Part::II => &ITEM_TITLES_10Q_PART_II,
    }
}

/// Standard title for an item number. 10-Q lookups are keyed by the
/// current Part, falling back to the other Part's table when the
/// expected one has no entry (filings frequently misplace Item 1A).
pub fn item_title(form: &FormType, current_part: Part, item: &str) -> Option<&'static str> {
    match form {
        FormType::Form8K => ITEM_TITLES_8K.get(item).copied(),
        FormType::Form10Q => part_titles(current_part)
            .get(item)
            .or_else(|| part_titles(current_part.other()).get(item))
            .copied(),
        _ => ITEM_TITLES_10K.get(item).copied(),
    }
}
