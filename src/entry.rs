//! Entry-level parser: header fields, body line classification, and assembly
//! of meanings, etymology and cross-references.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::markup::{
    extract_all, extract_first, is_cross_reference, is_gloss_continuation, split_paragraphs,
    strip_tags, BLUE_ITALIC_FONT, BLUE_ITALIC_SPAN, FIVE_SPACE, FONT_PAREN, FONT_SPAN, GREEN_SPAN,
    ITALICS_OPEN, ITALICS_SPAN, LEADING_ORDINAL, NUMBERED_SENSE_LINE, PARAGRAPH_BREAK, RED_SPAN,
    SUPER_SPAN, THREE_SPACE,
};

/// One sense of a headword
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    /// Ordinal label as printed ("12"); only set when the entry numbers its senses
    pub meaning_number: Option<String>,
    pub tamil_raw: String,
    pub tamil: String,
    pub tamil_italics: Vec<String>,
    pub english: String,
    pub source: Option<String>,
    pub source_extra: Option<String>,
}

/// Structured record for one dictionary row.
/// Field order is fixed so JSON, YAML and CSV outputs line up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub headword: Option<String>,
    pub headword_id: Option<String>,
    pub transliteration: Option<String>,
    pub pos_tamil: Option<String>,
    pub pos_english: Option<String>,
    pub meanings: Vec<Meaning>,
    pub etymology: Vec<String>,
    pub cross_references: Vec<String>,

    // Passthrough identifiers from the export row, never interpreted here
    #[serde(rename = "_csv_id", default)]
    pub source_row_id: Option<String>,
    #[serde(rename = "_csv_name", default)]
    pub source_row_name: Option<String>,
}

impl Entry {
    /// Attach the export row's identifiers
    pub fn with_source_row(mut self, id: Option<String>, name: Option<String>) -> Self {
        self.source_row_id = id;
        self.source_row_name = name;
        self
    }

    /// True when the senses carry explicit ordinals
    pub fn is_numbered(&self) -> bool {
        self.meanings
            .first()
            .map_or(false, |m| m.meaning_number.is_some())
    }
}

/// Header fields, extracted once from the whole raw text
#[derive(Debug, Default)]
struct Header {
    headword: Option<String>,
    headword_id: Option<String>,
    transliteration: Option<String>,
    pos_tamil: Option<String>,
    pos_english: Option<String>,
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn extract_plain(pattern: &regex::Regex, text: &str) -> Option<String> {
    extract_first(pattern, text).and_then(|s| non_empty(strip_tags(&s)))
}

fn parse_header(text: &str) -> Header {
    let mut header = Header {
        headword: extract_plain(&RED_SPAN, text),
        headword_id: extract_plain(&SUPER_SPAN, text),
        transliteration: extract_plain(&BLUE_ITALIC_FONT, text),
        ..Header::default()
    };

    // Part of speech: Tamil abbreviation followed by the English one in the secondary font
    if let Some(green) = extract_first(&GREEN_SPAN, text).filter(|g| !g.is_empty()) {
        header.pos_english = extract_plain(&FONT_PAREN, &green);
        header.pos_tamil = non_empty(strip_tags(&FONT_SPAN.replace_all(&green, "")));
    }

    header
}

/// Numbered mode: at least one sense line opens with an ordinal like "12."
fn detect_numbered(lines: &[String]) -> bool {
    lines.iter().any(|line| NUMBERED_SENSE_LINE.is_match(line))
}

/// How one body line contributes to the entry
#[derive(Debug, PartialEq, Eq)]
enum LineKind {
    SenseStart {
        ordinal: Option<String>,
        raw: String,
        content: String,
    },
    Citation {
        source: Option<String>,
        extra: Option<String>,
    },
    Etymology(String),
    CrossReference(String),
    GlossContinuation(Option<String>),
    Discard(&'static str),
}

/// Classify a body line. Several predicates can hold at once, so the rules
/// are tried in this fixed order and the first match wins:
///
/// 1. three-space line: sense start, or etymology when it cannot open a sense
/// 2. five-space line with italics: citation (discarded with no open meaning)
/// 3. five-space line without italics: etymology
/// 4. "see" + "பார்க்க": cross-reference
/// 5. bare blue-italic line with an open meaning: gloss continuation
/// 6. anything else: etymology once a meaning is open, otherwise discarded
fn classify(line: &str, numbered: bool, has_meaning: bool) -> LineKind {
    if line.starts_with(THREE_SPACE) {
        return classify_sense_line(line, numbered, has_meaning);
    }

    if line.starts_with(FIVE_SPACE) {
        if !line.contains(ITALICS_OPEN) {
            return LineKind::Etymology(strip_tags(line));
        }
        if !has_meaning {
            return LineKind::Discard("citation with no open meaning");
        }
        let source = extract_first(&ITALICS_SPAN, line).map(|s| strip_tags(&s));
        let outside = strip_tags(&ITALICS_SPAN.replace_all(line, ""));
        // "<Italics>Author</Italics>.{U, 12}." leaves ".{U, 12}." behind the author
        let extra = outside
            .trim_start_matches(|c: char| matches!(c, '.' | ',' | ';' | ':') || c.is_whitespace())
            .to_string();
        return LineKind::Citation {
            source,
            extra: non_empty(extra),
        };
    }

    if is_cross_reference(line) {
        return LineKind::CrossReference(strip_tags(line));
    }

    if has_meaning && is_gloss_continuation(line) {
        return LineKind::GlossContinuation(extract_first(&BLUE_ITALIC_FONT, line).map(|s| strip_tags(&s)));
    }

    if has_meaning {
        LineKind::Etymology(strip_tags(line))
    } else {
        LineKind::Discard("text before the first sense")
    }
}

fn classify_sense_line(line: &str, numbered: bool, has_meaning: bool) -> LineKind {
    let raw = line.replace(THREE_SPACE, "").trim().to_string();
    let ordinal = LEADING_ORDINAL
        .captures(&raw)
        .and_then(|cap| Some((cap.get(0)?.end(), cap.get(1)?.as_str().to_string())));

    match (numbered, ordinal) {
        (true, Some((prefix_len, ordinal))) => {
            let content = raw[prefix_len..].trim().to_string();
            LineKind::SenseStart {
                ordinal: Some(ordinal),
                raw,
                content,
            }
        }
        // Unordinalled line among numbered senses is a note, not a sense
        (true, None) => LineKind::Etymology(strip_tags(&raw)),
        // Unnumbered entries have exactly one sense: the first three-space line
        (false, _) if has_meaning => LineKind::Etymology(strip_tags(&raw)),
        (false, _) => LineKind::SenseStart {
            ordinal: None,
            content: raw.clone(),
            raw,
        },
    }
}

fn build_meaning(ordinal: Option<String>, raw: &str, content: &str) -> Meaning {
    let tamil_italics = extract_all(&ITALICS_SPAN, content);
    let mut rest = ITALICS_SPAN.replace_all(content, "").into_owned();

    let mut english = String::new();
    if let Some(gloss) = extract_first(&BLUE_ITALIC_FONT, &rest).filter(|g| !g.is_empty()) {
        english = strip_tags(&gloss);
        rest = BLUE_ITALIC_SPAN.replace_all(&rest, "").into_owned();
    }

    let tamil = strip_tags(&rest);
    let tamil = tamil.strip_suffix(';').unwrap_or(tamil.as_str()).trim_end().to_string();

    Meaning {
        meaning_number: ordinal,
        tamil_raw: strip_tags(raw),
        tamil,
        tamil_italics,
        english,
        source: None,
        source_extra: None,
    }
}

/// Running state of the body scan. The open meaning is always the last one.
#[derive(Debug, Default)]
struct Body {
    meanings: Vec<Meaning>,
    etymology: Vec<String>,
    cross_references: Vec<String>,
}

impl Body {
    fn has_meaning(&self) -> bool {
        !self.meanings.is_empty()
    }

    /// Fold one classified line into the entry. Etymology and cross-reference
    /// lines that strip to empty text are not recorded.
    fn apply(mut self, line: &str, kind: LineKind) -> Self {
        match kind {
            LineKind::SenseStart {
                ordinal,
                raw,
                content,
            } => {
                self.meanings.push(build_meaning(ordinal, &raw, &content));
            }
            LineKind::Citation { source, extra } => {
                // A citation only overwrites the parts it actually carries
                if let Some(meaning) = self.meanings.last_mut() {
                    if source.is_some() {
                        meaning.source = source;
                    }
                    if extra.is_some() {
                        meaning.source_extra = extra;
                    }
                }
            }
            LineKind::Etymology(text) => {
                if !text.is_empty() {
                    self.etymology.push(text);
                }
            }
            LineKind::CrossReference(text) => {
                if !text.is_empty() {
                    self.cross_references.push(text);
                }
            }
            LineKind::GlossContinuation(gloss) => {
                let gloss = gloss.unwrap_or_default();
                if let Some(meaning) = self.meanings.last_mut().filter(|_| !gloss.is_empty()) {
                    if meaning.english.is_empty() {
                        meaning.english = gloss;
                    } else {
                        meaning.english.push(' ');
                        meaning.english.push_str(&gloss);
                    }
                }
            }
            LineKind::Discard(reason) => {
                trace!(line = %line, reason = reason, "discarding body line");
            }
        }
        self
    }
}

/// Parse one raw entry. Never fails: anything that does not match is left unset.
pub fn parse_entry(text: &str) -> Entry {
    let header = parse_header(text);

    let body_text = text
        .split_once(PARAGRAPH_BREAK)
        .map(|(_, body)| body)
        .unwrap_or("");
    let lines = split_paragraphs(body_text);
    let numbered = detect_numbered(&lines);

    let body = lines.iter().fold(Body::default(), |body, line| {
        let kind = classify(line, numbered, body.has_meaning());
        body.apply(line, kind)
    });

    Entry {
        headword: header.headword,
        headword_id: header.headword_id,
        transliteration: header.transliteration,
        pos_tamil: header.pos_tamil,
        pos_english: header.pos_english,
        meanings: body.meanings,
        etymology: body.etymology,
        cross_references: body.cross_references,
        source_row_id: None,
        source_row_name: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod header_tests {
    use super::*;

    #[test]
    fn headword_and_super() {
        let e = parse_entry("<Red>அக்கரம்</Red><Super>2</Super>");
        assert_eq!(e.headword.as_deref(), Some("அக்கரம்"));
        assert_eq!(e.headword_id.as_deref(), Some("2"));
    }

    #[test]
    fn transliteration() {
        let e = parse_entry("<Blue_Italic><myfirstfont_13>akkaram,</myfirstfont_13></Blue_Italic>");
        assert_eq!(e.transliteration.as_deref(), Some("akkaram,"));
    }

    #[test]
    fn pos_split() {
        let e = parse_entry("<Green>பெ. <myfirstfont_13>(n.)</myfirstfont_13></Green>");
        assert_eq!(e.pos_tamil.as_deref(), Some("பெ."));
        assert_eq!(e.pos_english.as_deref(), Some("n."));
    }

    #[test]
    fn pos_without_english_font() {
        let e = parse_entry("<Green>வி.</Green>");
        assert_eq!(e.pos_tamil.as_deref(), Some("வி."));
        assert_eq!(e.pos_english, None);
    }

    #[test]
    fn missing_header_fields_stay_unset() {
        let e = parse_entry("plain text with no tags");
        assert_eq!(e.headword, None);
        assert_eq!(e.headword_id, None);
        assert_eq!(e.transliteration, None);
        assert_eq!(e.pos_tamil, None);
        assert_eq!(e.pos_english, None);
    }

    #[test]
    fn empty_green_span_is_ignored() {
        let e = parse_entry("<Green>  </Green>");
        assert_eq!(e.pos_tamil, None);
        assert_eq!(e.pos_english, None);
    }

    #[test]
    fn header_fields_are_tag_free() {
        let e = parse_entry("<Red><b>அக்கரம்</b></Red><Super><i>3</i></Super>");
        assert_eq!(e.headword.as_deref(), Some("அக்கரம்"));
        assert_eq!(e.headword_id.as_deref(), Some("3"));
    }
}
