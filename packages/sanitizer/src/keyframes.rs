use std::sync::OnceLock;

use regex::Regex;

fn keyframes_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)@(?:-[a-z]+-)?keyframes\b").ok())
        .as_ref()
}

/// Remove every `@keyframes` rule (vendor-prefixed ones included) from a
/// stylesheet. Returns the rewritten text and the number of rules removed.
///
/// Braces are matched with a depth counter. A rule with no opening brace, or
/// one that is never closed, swallows the rest of the text.
pub fn strip_keyframes(css: &str) -> (String, usize) {
    let Some(pattern) = keyframes_pattern() else {
        return (css.to_string(), 0);
    };

    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    let mut removed = 0;

    while let Some(found) = pattern.find(rest) {
        out.push_str(&rest[..found.start()]);
        removed += 1;

        let after = &rest[found.end()..];
        let Some(open) = after.find('{') else {
            rest = "";
            break;
        };

        let mut depth = 0usize;
        let mut end = None;
        for (offset, c) in after[open..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(open + offset + c.len_utf8());
                        break;
                    }
                }
                _ => {}
            }
        }

        match end {
            Some(end) => rest = &after[end..],
            None => {
                rest = "";
                break;
            }
        }
    }

    out.push_str(rest);
    (out, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_nested_blocks() {
        let css = ".a{color:red}@keyframes spin{from{transform:rotate(0)}to{transform:rotate(360deg)}}.b{color:blue}";
        let (out, removed) = strip_keyframes(css);

        assert_eq!(out, ".a{color:red}.b{color:blue}");
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_vendor_prefixes_and_case() {
        let css = "@-webkit-keyframes a{0%{opacity:0}}@KEYFRAMES b{100%{opacity:1}}p{margin:0}";
        let (out, removed) = strip_keyframes(css);

        assert_eq!(out, "p{margin:0}");
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_unclosed_rule_drops_remainder() {
        let (out, removed) = strip_keyframes("h1{font-weight:700}@keyframes pulse{50%{opacity:.5}");
        assert_eq!(out, "h1{font-weight:700}");
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_plain_css_is_untouched() {
        let css = ".keyframes-label{animation-name:none}";
        let (out, removed) = strip_keyframes(css);
        assert_eq!(out, css);
        assert_eq!(removed, 0);
    }
}
