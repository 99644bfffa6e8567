//! Primitive operations over the lexicon export's tag dialect.
//!
//! The export wraps every structural element in pseudo-HTML tags
//! (`<Red>`, `<Super>`, `<Three_Space>`, ...) and separates paragraphs with
//! `<BR><BR>`. Nothing here validates that tags are balanced: a pattern that
//! does not match simply yields `None`.

use lazy_static::lazy_static;
use regex::Regex;

/// Paragraph break between the header and each body line
pub const PARAGRAPH_BREAK: &str = "<BR><BR>";

/// Indentation marker that opens a sense line
pub const THREE_SPACE: &str = "<Three_Space>";

/// Indentation marker that opens a citation or note line
pub const FIVE_SPACE: &str = "<Five_Space>";

pub const ITALICS_OPEN: &str = "<Italics>";
pub const BLUE_ITALIC_OPEN: &str = "<Blue_Italic>";

/// Tamil for "see"; paired with the English word in cross-references
pub const SEE_TAMIL: &str = "பார்க்க";

lazy_static! {
    static ref ANY_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();

    // Header spans
    pub static ref RED_SPAN: Regex = Regex::new(r"(?s)<Red>(.*?)</Red>").unwrap();
    pub static ref SUPER_SPAN: Regex = Regex::new(r"(?s)<Super>(.*?)</Super>").unwrap();
    pub static ref GREEN_SPAN: Regex = Regex::new(r"(?s)<Green>(.*?)</Green>").unwrap();

    // English text is always set in the secondary font inside a blue italic span.
    // The same shape carries the transliteration in the header and glosses in the body.
    pub static ref BLUE_ITALIC_FONT: Regex =
        Regex::new(r"(?s)<Blue_Italic><myfirstfont_13>(.*?)</myfirstfont_13></Blue_Italic>").unwrap();
    pub static ref BLUE_ITALIC_SPAN: Regex = Regex::new(r"(?s)<Blue_Italic>.*?</Blue_Italic>").unwrap();

    // Part-of-speech block: "பெ. <myfirstfont_13>(n.)</myfirstfont_13>"
    pub static ref FONT_PAREN: Regex =
        Regex::new(r"(?s)<myfirstfont_13>\(?([^)]+)\)?</myfirstfont_13>").unwrap();
    pub static ref FONT_SPAN: Regex = Regex::new(r"(?s)<myfirstfont_13>.*?</myfirstfont_13>").unwrap();

    pub static ref ITALICS_SPAN: Regex = Regex::new(r"(?s)<Italics>(.*?)</Italics>").unwrap();

    // Sense ordinals: "12." at the start of a three-space line
    pub static ref NUMBERED_SENSE_LINE: Regex = Regex::new(r"^<Three_Space>\s*\d+\.").unwrap();
    pub static ref LEADING_ORDINAL: Regex = Regex::new(r"^(\d+)\.").unwrap();
}

/// Remove every tag and trim the result
pub fn strip_tags(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    ANY_TAG.replace_all(text, "").trim().to_string()
}

/// Trimmed first capture group of the first match of `pattern`, if any.
///
/// The capture is returned with its inner tags intact; callers strip them
/// when they need plain text.
pub fn extract_first(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Every capture group 1 of `pattern`, tag-stripped, in order of appearance
pub fn extract_all(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| strip_tags(m.as_str()))
        .collect()
}

/// Split on the paragraph break, dropping blank segments
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split(PARAGRAPH_BREAK)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// A bilingual "see also" line: English "see" together with the Tamil equivalent
pub fn is_cross_reference(line: &str) -> bool {
    line.to_lowercase().contains("see") && line.contains(SEE_TAMIL)
}

/// An English gloss line that continues the previous sense.
///
/// Indentation markers anywhere on the line mean it is structural, not a
/// continuation.
pub fn is_gloss_continuation(line: &str) -> bool {
    line.starts_with(BLUE_ITALIC_OPEN) && !line.contains(THREE_SPACE) && !line.contains(FIVE_SPACE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
