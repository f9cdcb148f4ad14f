//! Minimal markup handling for the ledger file.
//!
//! The ledger is an HTML page kept by hand as much as by this program, so the
//! document is never rebuilt from a tree. It is kept as the loaded text and
//! a tokenizer only locates the element carrying `id="transactions"`, the
//! text of the cells under it and the offset where the next row belongs.
//! Everything else is written back as it was read, apart from non-ASCII
//! characters (see `Document::to_ascii`).

use std::ops::Range;

use thiserror::Error;

use crate::backend::{BackendError, Result};
use crate::core::Amount;

/// Identifier of the element holding the transaction rows.
pub const SECTION_ID: &str = "transactions";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Error, Debug, PartialEq)]
pub enum MarkupError {
    #[error("comment starting at byte {0} is never closed")]
    UnterminatedComment(usize),
    #[error("tag starting at byte {0} is never closed")]
    UnterminatedTag(usize),
    #[error("no element with id \"{0}\"")]
    MissingSection(String),
    #[error("element with id \"{0}\" is never closed")]
    UnclosedSection(String),
}

#[derive(Debug, PartialEq)]
enum Token {
    Open { name: String, attributes: Vec<(String, String)>, self_closing: bool },
    Close { name: String, span: Range<usize> },
    Text(Range<usize>),
}

impl Token {
    fn is_element_start(&self) -> bool {
        match self {
            Token::Open { name, self_closing, .. } => !self_closing && !is_void(name),
            _ => false
        }
    }
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// A ledger file held in memory between loading and persisting.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    insert_at: usize,
    cells: Vec<String>,
}

impl Document {
    pub fn parse(source: String) -> std::result::Result<Document, MarkupError> {
        let tokens = Tokenizer::new(&source).tokenize()?;
        let (insert_at, cells) = locate_section(&source, &tokens)?;
        return Ok(Document { source, insert_at, cells });
    }

    /// Trimmed text of every cell in the transactions section, in file order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Add a row holding `entry` after every existing row.
    pub fn append_entry(&mut self, entry: &str) {
        let row = format!("<tr><td>{}</td></tr>", escape_text(entry));
        self.source.insert_str(self.insert_at, &row);
        self.insert_at += row.len();
        self.cells.push(entry.trim().to_owned());
    }

    pub fn sum_entries(&self) -> Result<Amount> {
        self.entries().try_fold(Amount::ZERO, |total, text| {
            let amount = text.parse::<Amount>()
                .or_else(|_| Amount::from_scientific(text))
                .map_err(|_| BackendError::Parse { text: text.to_owned() })?;
            total.checked_add(amount).ok_or(BackendError::Overflow)
        })
    }

    /// The document as ASCII text. Anything outside ASCII becomes a numeric
    /// character reference so the page renders the same.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        for c in self.source.chars() {
            if c.is_ascii() {
                out.push(c);
            } else {
                out.push_str(&format!("&#{};", c as u32));
            }
        }
        out
    }
}

/// Find the section element and return the offset at which new rows go
/// together with the cell texts under it.
fn locate_section(source: &str, tokens: &[Token]) -> std::result::Result<(usize, Vec<String>), MarkupError> {
    let start = tokens.iter()
        .position(|token| match token {
            Token::Open { attributes, .. } => attributes.iter()
                .any(|(name, value)| name == "id" && value == SECTION_ID),
            _ => false
        })
        .ok_or_else(|| MarkupError::MissingSection(SECTION_ID.to_owned()))?;

    if !tokens[start].is_element_start() {
        return Err(MarkupError::UnclosedSection(SECTION_ID.to_owned()));
    }

    let mut stack: Vec<&str> = Vec::new();
    let mut cells = Vec::new();
    // text of the cell being read and the stack depth of its element
    let mut cell: Option<(String, usize)> = None;
    // last direct child of the section and the offset of its end tag
    let mut last_child: Option<(&str, Option<usize>)> = None;

    for token in &tokens[start..] {
        match token {
            Token::Open { name, .. } => {
                // header cells end an entry but are never one
                if matches!(name.as_str(), "td" | "th" | "tr") {
                    finish_cell(&mut cell, &mut cells);
                    if name == "td" {
                        cell = Some((String::new(), stack.len()));
                    }
                }
                if token.is_element_start() {
                    if stack.len() == 1 {
                        last_child = Some((name.as_str(), None));
                    }
                    stack.push(name.as_str());
                }
            },
            Token::Close { name, span } => {
                let Some(depth) = stack.iter().rposition(|open| *open == name.as_str()) else {
                    // stray end tag, ignored the way browsers do
                    continue;
                };
                if matches!(cell, Some((_, cell_depth)) if depth <= cell_depth) {
                    finish_cell(&mut cell, &mut cells);
                }
                if depth == 0 {
                    let insert_at = match last_child {
                        Some(("tbody", Some(tbody_end))) => tbody_end,
                        _ => span.start
                    };
                    return Ok((insert_at, cells));
                }
                if depth == 1 {
                    if let Some((_, end)) = last_child.as_mut() {
                        *end = Some(span.start);
                    }
                }
                stack.truncate(depth);
            },
            Token::Text(span) => {
                if let Some((text, _)) = cell.as_mut() {
                    text.push_str(&unescape_text(&source[span.clone()]));
                }
            }
        }
    }

    Err(MarkupError::UnclosedSection(SECTION_ID.to_owned()))
}

fn finish_cell(cell: &mut Option<(String, usize)>, cells: &mut Vec<String>) {
    if let Some((text, _)) = cell.take() {
        cells.push(text.trim().to_owned());
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn unescape_text(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';')
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Tokenizer { source, pos: 0, tokens: Vec::new() }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn tokenize(mut self) -> std::result::Result<Vec<Token>, MarkupError> {
        while self.pos < self.source.len() {
            if self.byte(0) != Some(b'<') {
                self.text_until_tag();
            } else if self.rest().starts_with("<!--") {
                let start = self.pos;
                let end = self.rest()[4..].find("-->")
                    .ok_or(MarkupError::UnterminatedComment(start))?;
                self.pos += 4 + end + 3;
            } else if self.rest().starts_with("<!") || self.rest().starts_with("<?") {
                self.skip_declaration()?;
            } else if self.byte(1) == Some(b'/') && self.byte(2).map_or(false, |b| b.is_ascii_alphabetic()) {
                self.close_tag()?;
            } else if self.byte(1).map_or(false, |b| b.is_ascii_alphabetic()) {
                self.open_tag()?;
            } else {
                // a lone '<' is plain text
                self.tokens.push(Token::Text(self.pos..self.pos + 1));
                self.pos += 1;
            }
        }
        Ok(self.tokens)
    }

    fn text_until_tag(&mut self) {
        let start = self.pos;
        self.pos = self.rest().find('<').map_or(self.source.len(), |offset| start + offset);
        self.tokens.push(Token::Text(start..self.pos));
    }

    fn skip_declaration(&mut self) -> std::result::Result<(), MarkupError> {
        let end = self.rest().find('>').ok_or(MarkupError::UnterminatedTag(self.pos))?;
        self.pos += end + 1;
        Ok(())
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.byte(0) {
            if b.is_ascii_whitespace() || b == b'>' || b == b'/' || b == b'=' {
                break;
            }
            self.pos += 1;
        }
        self.source[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        while self.byte(0).map_or(false, |b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn close_tag(&mut self) -> std::result::Result<(), MarkupError> {
        let start = self.pos;
        self.pos += 2;
        let name = self.read_name();
        let end = self.rest().find('>').ok_or(MarkupError::UnterminatedTag(start))?;
        self.pos += end + 1;
        self.tokens.push(Token::Close { name, span: start..self.pos });
        Ok(())
    }

    fn open_tag(&mut self) -> std::result::Result<(), MarkupError> {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_name();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.byte(0) {
                None => return Err(MarkupError::UnterminatedTag(start)),
                Some(b'>') => {
                    self.pos += 1;
                    break;
                },
                Some(b'/') => {
                    self.pos += 1;
                    if self.byte(0) == Some(b'>') {
                        self_closing = true;
                    }
                },
                Some(_) => {
                    let attribute = self.read_name();
                    if attribute.is_empty() {
                        // '=' without a name
                        self.pos += 1;
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.byte(0) == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.attribute_value(start)?
                    } else {
                        String::new()
                    };
                    attributes.push((attribute, value));
                }
            }
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing {
            self.tokens.push(Token::Open { name: name.clone(), attributes, self_closing });
            self.raw_text(&name, start)?;
        } else {
            self.tokens.push(Token::Open { name, attributes, self_closing });
        }
        Ok(())
    }

    fn attribute_value(&mut self, tag_start: usize) -> std::result::Result<String, MarkupError> {
        match self.byte(0) {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let end = self.rest().find(quote as char)
                    .ok_or(MarkupError::UnterminatedTag(tag_start))?;
                let value = unescape_text(&self.rest()[..end]);
                self.pos += end + 1;
                Ok(value)
            },
            _ => {
                let start = self.pos;
                while self.byte(0).map_or(false, |b| !b.is_ascii_whitespace() && b != b'>') {
                    self.pos += 1;
                }
                Ok(unescape_text(&self.source[start..self.pos]))
            }
        }
    }

    /// Contents of `<script>` and friends run up to the matching end tag.
    fn raw_text(&mut self, name: &str, tag_start: usize) -> std::result::Result<(), MarkupError> {
        let closing = format!("</{}", name);
        let offset = self.rest().to_ascii_lowercase().find(&closing)
            .ok_or(MarkupError::UnterminatedTag(tag_start))?;
        if offset > 0 {
            self.tokens.push(Token::Text(self.pos..self.pos + offset));
        }
        self.pos += offset;
        self.close_tag()
    }
}


#[cfg(test)]
mod tests {
    use super::{Document, MarkupError, Tokenizer, Token};
    use crate::backend::BackendError;
    use crate::core::Amount;

    use rstest::{fixture, rstest};

    #[fixture]
    fn ledger_html() -> String {
        String::from(concat!(
            "<!DOCTYPE html>\n<html>\n<head><title>Log</title></head>\n<body>\n",
            "<!-- <table id=\"transactions\"></table> -->\n",
            "<table id=\"transactions\">\n",
            "  <tr><td>100.00</td></tr>\n",
            "  <tr><td> -25.50 </td></tr>\n",
            "  <tr><td>-10.00</td></tr>\n",
            "</table>\n</body>\n</html>\n"
        ))
    }

    #[rstest]
    fn finds_entries(ledger_html: String) {
        let document = Document::parse(ledger_html).unwrap();
        let entries: Vec<&str> = document.entries().collect();
        assert_eq!(entries, vec!["100.00", "-25.50", "-10.00"]);
    }

    #[rstest]
    fn sums_entries(ledger_html: String) {
        let document = Document::parse(ledger_html).unwrap();
        assert_eq!(document.sum_entries().unwrap(), "64.50".parse::<Amount>().unwrap());
    }

    #[rstest]
    fn appends_after_last_row(ledger_html: String) {
        let mut document = Document::parse(ledger_html.clone()).unwrap();
        document.append_entry("42.5");

        let expected = ledger_html.replace(
            "<tr><td>-10.00</td></tr>\n</table>",
            "<tr><td>-10.00</td></tr>\n<tr><td>42.5</td></tr></table>");
        assert_eq!(document.to_ascii(), expected);
        assert_eq!(document.len(), 4);
        assert_eq!(document.entries().last(), Some("42.5"));

        let reparsed = Document::parse(document.to_ascii()).unwrap();
        assert_eq!(reparsed.entries().collect::<Vec<_>>(), document.entries().collect::<Vec<_>>());
    }

    #[test]
    fn appends_inside_tbody() {
        let html = "<table id='transactions'><tbody><tr><td>5.0</td></tr></tbody></table>";
        let mut document = Document::parse(html.to_owned()).unwrap();
        document.append_entry("-1.0");
        document.append_entry("2.0");
        assert_eq!(
            document.to_ascii(),
            "<table id='transactions'><tbody><tr><td>5.0</td></tr><tr><td>-1.0</td></tr><tr><td>2.0</td></tr></tbody></table>"
        );
        assert_eq!(document.sum_entries().unwrap(), "6.0".parse::<Amount>().unwrap());
    }

    #[test]
    fn empty_section() {
        let mut document = Document::parse("<div id=transactions></div>".to_owned()).unwrap();
        assert!(document.is_empty());
        assert_eq!(document.sum_entries().unwrap(), Amount::ZERO);
        document.append_entry("3.0");
        assert_eq!(document.to_ascii(), "<div id=transactions><tr><td>3.0</td></tr></div>");
    }

    #[test]
    fn cells_without_closing_tags() {
        let html = "<table id=\"transactions\"><tr><td>1.0<tr><td>2.5</table>";
        let document = Document::parse(html.to_owned()).unwrap();
        assert_eq!(document.entries().collect::<Vec<_>>(), vec!["1.0", "2.5"]);
    }

    #[test]
    fn nested_markup_in_cells() {
        let html = "<table id=\"transactions\"><tr><td><b>1</b>2.0</td></tr></table>";
        let document = Document::parse(html.to_owned()).unwrap();
        assert_eq!(document.entries().collect::<Vec<_>>(), vec!["12.0"]);
    }

    #[rstest]
    #[case("<html><body><table></table></body></html>", MarkupError::MissingSection("transactions".to_owned()))]
    #[case("<table id=\"transactions\"><tr><td>1.0</td></tr>", MarkupError::UnclosedSection("transactions".to_owned()))]
    #[case("<table id=\"transactions\"><!-- unterminated </table>", MarkupError::UnterminatedComment(25))]
    #[case("<table id=\"transactions", MarkupError::UnterminatedTag(0))]
    fn malformed(#[case] html: &str, #[case] error: MarkupError) {
        assert_eq!(Document::parse(html.to_owned()).unwrap_err(), error);
    }

    #[test]
    fn non_numeric_cell() {
        let html = "<table id=\"transactions\"><tr><td>1.0</td></tr><tr><td>lots</td></tr></table>";
        let document = Document::parse(html.to_owned()).unwrap();
        let err = document.sum_entries().unwrap_err();
        assert!(matches!(err, BackendError::Parse { text } if text == "lots"));
    }

    #[test]
    fn header_cells_are_not_entries() {
        let html = "<table id=\"transactions\"><tr><th>Amount</th></tr><tr><td>5.0</td></tr></table>";
        let document = Document::parse(html.to_owned()).unwrap();
        assert_eq!(document.entries().collect::<Vec<_>>(), vec!["5.0"]);
        assert_eq!(document.sum_entries().unwrap(), "5.0".parse::<Amount>().unwrap());
    }

    #[test]
    fn header_cell_ends_an_unclosed_entry() {
        let html = "<table id=\"transactions\"><tr><td>2.0<th>Total</table>";
        let document = Document::parse(html.to_owned()).unwrap();
        assert_eq!(document.entries().collect::<Vec<_>>(), vec!["2.0"]);
    }

    #[test]
    fn sum_past_decimal_range() {
        let mut document = Document::parse("<table id=\"transactions\"></table>".to_owned()).unwrap();
        document.append_entry("79228162514264337593543950335");
        assert_eq!(document.sum_entries().unwrap(), Amount::MAX);

        document.append_entry("79228162514264337593543950335");
        assert!(matches!(document.sum_entries(), Err(BackendError::Overflow)));
    }

    #[test]
    fn non_ascii_becomes_references() {
        let html = "<p>caf\u{e9}</p><table id=\"transactions\"></table>";
        let document = Document::parse(html.to_owned()).unwrap();
        assert_eq!(document.to_ascii(), "<p>caf&#233;</p><table id=\"transactions\"></table>");
    }

    #[test]
    fn script_contents_are_not_tags() {
        let tokens = Tokenizer::new("<script>if (a <b) {}</script>").tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Text(8..20));
    }
}
