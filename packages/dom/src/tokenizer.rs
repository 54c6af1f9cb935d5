//! # HTML Tokenizer
//!
//! A forgiving, single-pass tokenizer. It recognizes tags, comments and
//! doctypes; everything else is text. A `<` that does not start a tag is kept
//! as text. Content of raw-text elements (`script`, `style`, `title`,
//! `textarea`, `xmp`, `iframe`, `noscript`, `noembed`, `noframes`) is emitted
//! verbatim up to the matching end tag; `plaintext` runs to the end of input.
//! Comments close at `-->`, `--!>`, or abruptly at `<!-->` / `<!--->`, the
//! same places a browser closes them.

use crate::node::Attribute;

/// Elements whose content is never tokenized as markup
pub const RAW_TEXT_ELEMENTS: [&str; 10] = [
    "script", "style", "title", "textarea", "xmp", "iframe", "noscript", "noembed", "noframes",
    "plaintext",
];

/// Raw-text elements without an end tag
const UNTERMINATED_RAW_TEXT: &str = "plaintext";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text(String),
    Comment(String),
}

/// Tokenize an HTML string
pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).run()
}

struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    text_start: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            text_start: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            if self.starts_with("<!--") {
                self.flush_text(start);
                self.comment();
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.flush_text(start);
                self.declaration();
            } else if self.starts_with("</") && self.is_alpha_at(start + 2) {
                self.flush_text(start);
                self.end_tag();
            } else if self.is_alpha_at(start + 1) {
                self.flush_text(start);
                self.start_tag();
            } else {
                // Literal `<`
                self.pos += 1;
            }
        }
        self.flush_text(self.bytes.len());
        self.tokens
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..]
            .get(..prefix.len())
            .map(|b| b.eq_ignore_ascii_case(prefix.as_bytes()))
            .unwrap_or(false)
    }

    fn is_alpha_at(&self, index: usize) -> bool {
        self.bytes
            .get(index)
            .map(|b| b.is_ascii_alphabetic())
            .unwrap_or(false)
    }

    fn flush_text(&mut self, end: usize) {
        if end > self.text_start {
            self.tokens
                .push(Token::Text(self.source[self.text_start..end].to_string()));
        }
        self.text_start = end;
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.source.get(from..)?.find(needle).map(|i| from + i)
    }

    fn comment(&mut self) {
        let body_start = self.pos + 4;
        let abrupt = ["->", ">"]
            .into_iter()
            .find(|close| self.source[body_start..].starts_with(close));
        let (content, next) = match abrupt {
            Some(close) => ("", body_start + close.len()),
            None => {
                let end = [("-->", 3), ("--!>", 4)]
                    .into_iter()
                    .filter_map(|(close, len)| self.find_from(body_start, close).map(|at| (at, len)))
                    .min_by_key(|(at, _)| *at);
                match end {
                    Some((end, len)) => (&self.source[body_start..end], end + len),
                    None => (&self.source[body_start..], self.bytes.len()),
                }
            }
        };
        self.tokens.push(Token::Comment(content.to_string()));
        self.pos = next;
        self.text_start = next;
    }

    fn declaration(&mut self) {
        let body_start = self.pos + 2;
        let (content, next) = match self.find_from(body_start, ">") {
            Some(end) => (&self.source[body_start..end], end + 1),
            None => (&self.source[body_start..], self.bytes.len()),
        };
        let is_doctype = content
            .get(..7)
            .map(|head| head.eq_ignore_ascii_case("doctype"))
            .unwrap_or(false);
        let token = if is_doctype {
            Token::Doctype(content[7..].trim().to_string())
        } else {
            // Processing instructions and bogus declarations survive as comments
            Token::Comment(content.to_string())
        };
        self.tokens.push(token);
        self.pos = next;
        self.text_start = next;
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || b == b'/' || b == b'>' {
                break;
            }
            self.pos += 1;
        }
        self.source[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn end_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        let next = self
            .find_from(self.pos, ">")
            .map(|i| i + 1)
            .unwrap_or(self.bytes.len());
        self.tokens.push(Token::EndTag { name });
        self.pos = next;
        self.text_start = next;
    }

    fn start_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            match self.bytes[self.pos] {
                b'>' => {
                    self.pos += 1;
                    break;
                }
                b'/' => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'>') {
                        self_closing = true;
                        self.pos += 1;
                        break;
                    }
                }
                _ => {
                    if let Some(attr) = self.attribute() {
                        // First occurrence wins, as in browsers
                        if !attributes.iter().any(|a| a.name == attr.name) {
                            attributes.push(attr);
                        }
                    }
                }
            }
        }

        self.text_start = self.pos;
        // Browsers ignore `/>` on raw-text elements
        let raw = RAW_TEXT_ELEMENTS.contains(&name.as_str());
        if raw {
            self_closing = false;
        }
        self.tokens.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if raw {
            self.raw_text(&name);
        }
    }

    fn attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || b == b'=' || b == b'>' || (b == b'/' && self.pos > start) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            // Stray `=` or similar: skip it
            self.pos += 1;
            return None;
        }
        let name = self.source[start..self.pos].to_ascii_lowercase();

        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            return Some(Attribute::new(name, ""));
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.bytes.get(self.pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = self.pos + 1;
                let end = self.source[value_start..]
                    .find(quote as char)
                    .map(|i| value_start + i)
                    .unwrap_or(self.bytes.len());
                self.pos = (end + 1).min(self.bytes.len());
                self.source[value_start..end].to_string()
            }
            _ => {
                let value_start = self.pos;
                while self.pos < self.bytes.len() {
                    let b = self.bytes[self.pos];
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                self.source[value_start..self.pos].to_string()
            }
        };
        Some(Attribute::new(name, value))
    }

    fn raw_text(&mut self, name: &str) {
        let end = if name == UNTERMINATED_RAW_TEXT {
            self.bytes.len()
        } else {
            self.find_end_tag(self.pos, name).unwrap_or(self.bytes.len())
        };
        if end > self.pos {
            self.tokens
                .push(Token::Text(self.source[self.pos..end].to_string()));
        }
        self.pos = end;
        self.text_start = end;
    }

    /// Offset of the first `</name` followed by whitespace, `/`, `>` or the
    /// end of input
    fn find_end_tag(&self, from: usize, name: &str) -> Option<usize> {
        let needle = format!("</{}", name);
        let needle = needle.as_bytes();
        let mut at = from;
        loop {
            let haystack = self.bytes.get(at..)?;
            let found = at + haystack
                .windows(needle.len())
                .position(|w| w.eq_ignore_ascii_case(needle))?;
            match self.bytes.get(found + needle.len()) {
                None => return Some(found),
                Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {
                    return Some(found)
                }
                Some(_) => at = found + 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_tags_and_text() {
        let tokens = tokenize("<p class=\"a\">Hi</p>");
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "p".to_string(),
                attributes: vec![Attribute::new("class", "a")],
                self_closing: false,
            }
        );
        assert_eq!(tokens[1], Token::Text("Hi".to_string()));
        assert_eq!(tokens[2], Token::EndTag { name: "p".to_string() });
    }

    #[test]
    fn test_attribute_forms() {
        let tokens = tokenize("<img SRC=a.png alt='x \"y\"' hidden data-x = \"1\">");
        let Token::StartTag { attributes, .. } = &tokens[0] else {
            panic!("expected start tag");
        };
        assert_eq!(
            attributes,
            &vec![
                Attribute::new("src", "a.png"),
                Attribute::new("alt", "x \"y\""),
                Attribute::new("hidden", ""),
                Attribute::new("data-x", "1"),
            ]
        );
    }

    #[test]
    fn test_script_content_is_raw() {
        let tokens = tokenize("<script>if (a < b) { x = '</p>'; }</SCRIPT>after");
        assert_eq!(
            tokens[1],
            Token::Text("if (a < b) { x = '</p>'; }".to_string())
        );
        assert_eq!(tokens[2], Token::EndTag { name: "script".to_string() });
        assert_eq!(tokens[3], Token::Text("after".to_string()));
    }

    #[test]
    fn test_doctype_and_comments() {
        let tokens = tokenize("<!DOCTYPE html><!-- note --><?xml x?>");
        assert_eq!(tokens[0], Token::Doctype("html".to_string()));
        assert_eq!(tokens[1], Token::Comment(" note ".to_string()));
        assert_eq!(tokens[2], Token::Comment("xml x?".to_string()));
    }

    #[test]
    fn test_comment_closing_forms() {
        let tokens = tokenize("<!-- a --!>b<!-->c<!--->d");
        assert_eq!(
            tokens,
            vec![
                Token::Comment(" a ".to_string()),
                Token::Text("b".to_string()),
                Token::Comment(String::new()),
                Token::Text("c".to_string()),
                Token::Comment(String::new()),
                Token::Text("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_legacy_raw_text_elements() {
        let tokens = tokenize("<xmp><p title=\"</xmp><b>x</b>\">");
        assert_eq!(tokens[1], Token::Text("<p title=\"".to_string()));
        assert_eq!(tokens[2], Token::EndTag { name: "xmp".to_string() });
        assert!(matches!(&tokens[3], Token::StartTag { name, .. } if name == "b"));

        let tokens = tokenize("<plaintext></plaintext><b>");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::Text("</plaintext><b>".to_string()));
    }

    #[test]
    fn test_raw_text_end_tag_needs_delimiter() {
        let tokens = tokenize("<style/>a</stylex>b</style >c");
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "style".to_string(),
                attributes: Vec::new(),
                self_closing: false,
            }
        );
        assert_eq!(tokens[1], Token::Text("a</stylex>b".to_string()));
        assert_eq!(tokens[2], Token::EndTag { name: "style".to_string() });
        assert_eq!(tokens[3], Token::Text("c".to_string()));
    }

    #[test]
    fn test_literal_less_than_is_text() {
        let tokens = tokenize("a < b <3");
        assert_eq!(tokens, vec![Token::Text("a < b <3".to_string())]);
    }

    #[test]
    fn test_unterminated_input_does_not_panic() {
        let _ = tokenize("<div class=\"open");
        let _ = tokenize("<!-- never closed");
        let _ = tokenize("<script>alert(1)");
        let _ = tokenize("</");
        let _ = tokenize("<a href=");
    }
}
