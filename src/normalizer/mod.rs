use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

use crate::domain::Entry;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));

static IMG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b").expect("static regex"));

/// One attribute at the start of the input: name, then an optional value
/// that is double-quoted, single-quoted or bare.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("static regex")
});

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Attach the preview image taken from the entry's HTML content.
    ///
    /// Only the first `<img>` element counts: when it has no usable `src`
    /// the entry gets no preview, even if a later image would have one.
    pub fn normalize(&self, mut entry: Entry) -> Entry {
        if let Some(src) = first_image(&entry.content) {
            entry.preview_image = Some(src);
        }
        entry
    }

    pub fn normalize_all(&self, entries: Vec<Entry>) -> Vec<Entry> {
        entries.into_iter().map(|e| self.normalize(e)).collect()
    }
}

fn first_image(html: &str) -> Option<String> {
    let html = COMMENT.replace_all(html, "");
    let open = IMG_OPEN.find(&html)?;
    let raw = src_attribute(&html[open.end()..])?;

    let src = decode_html_entities(raw.trim()).to_string();
    if src.is_empty() {
        None
    } else {
        Some(src)
    }
}

/// Walk the attributes of a tag whose name was already consumed and return
/// the value of the first `src`. Quoted values are skipped whole, so a `>` or
/// `src=` inside them is not taken for markup.
fn src_attribute(tag: &str) -> Option<&str> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() || rest.starts_with('>') {
            return None;
        }

        let Some(caps) = ATTRIBUTE.captures(rest) else {
            // Stray quote or '='.
            let skip = rest.chars().next().map_or(1, char::len_utf8);
            rest = &rest[skip..];
            continue;
        };
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        if name.eq_ignore_ascii_case("src") {
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4));
            return Some(value.map_or("", |v| v.as_str()));
        }
        rest = &rest[whole.end()..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::entry;

    fn with_content(content: &str) -> Entry {
        let mut e = entry(1);
        e.content = content.to_string();
        e
    }

    #[test]
    fn test_extracts_first_image() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(
            r#"<p>Hello</p><img src="https://example.com/a.png"><img src="https://example.com/b.png">"#,
        ));
        assert_eq!(e.preview_image.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_no_image_leaves_entry_unchanged() {
        let normalizer = Normalizer::new();
        let original = with_content("<p>Just text</p>");
        let e = normalizer.normalize(original.clone());
        assert_eq!(e, original);
    }

    #[test]
    fn test_single_quoted_and_unquoted_src() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content("<IMG alt='x' SRC='/a.jpg'>"));
        assert_eq!(e.preview_image.as_deref(), Some("/a.jpg"));

        let e = normalizer.normalize(with_content("<img class=hero src=/b.jpg>"));
        assert_eq!(e.preview_image.as_deref(), Some("/b.jpg"));
    }

    #[test]
    fn test_decodes_entities_in_src() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(
            r#"<img src="https://example.com/i.png?w=300&amp;h=160">"#,
        ));
        assert_eq!(
            e.preview_image.as_deref(),
            Some("https://example.com/i.png?w=300&h=160")
        );
    }

    #[test]
    fn test_first_image_without_src_yields_none() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(
            r#"<img data-src="lazy.png"><img src="second.png">"#,
        ));
        assert_eq!(e.preview_image, None);
    }

    #[test]
    fn test_ignores_commented_out_images() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(
            r#"<!-- <img src="old.png"> --><img src="new.png">"#,
        ));
        assert_eq!(e.preview_image.as_deref(), Some("new.png"));
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let normalizer = Normalizer::new();
        for content in ["<img", "<img src=", "<<<>>>", "<img src=\"unterminated", ""] {
            let e = normalizer.normalize(with_content(content));
            assert_eq!(e.preview_image, None, "content: {content}");
        }
    }

    #[test]
    fn test_does_not_match_similar_tag_names() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(r#"<imgx src="no.png"><img src="yes.png">"#));
        assert_eq!(e.preview_image.as_deref(), Some("yes.png"));
    }

    #[test]
    fn test_quoted_greater_than_does_not_end_the_tag() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(r#"<img alt="a > b" src="real.png">"#));
        assert_eq!(e.preview_image.as_deref(), Some("real.png"));
    }

    #[test]
    fn test_src_inside_another_attribute_value_is_ignored() {
        let normalizer = Normalizer::new();
        let e = normalizer.normalize(with_content(
            r#"<img alt="x src=fake.png" src="real.png">"#,
        ));
        assert_eq!(e.preview_image.as_deref(), Some("real.png"));

        let e = normalizer.normalize(with_content(r#"<img title='src="no.png"' data-x src=yes.png>"#));
        assert_eq!(e.preview_image.as_deref(), Some("yes.png"));
    }
}
