// Link facet detection.
//
// Bluesky rich-text facets address the post text by UTF-8 byte offset,
// not character index — a single emoji before a link shifts the facet
// by four bytes. Rust regex matches already report byte offsets over
// the UTF-8 encoding, so the offsets fall out directly.

use regex_lite::Regex;

/// One detected hyperlink span over the post text's UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub byte_start: usize,
    pub byte_end: usize,
    pub uri: String,
}

/// Find every HTTP(S) URL in `text`, in order of appearance.
///
/// A URL runs greedily up to the next whitespace. Returns an empty vec
/// when no links are present — the wire layer decides whether that
/// serializes as an omitted field.
pub fn detect_links(text: &str) -> Vec<LinkSpan> {
    // Compilation can only fail on an invalid pattern, which this isn't.
    let pattern = Regex::new(r"https?://\S+").expect("valid URL pattern");

    pattern
        .find_iter(text)
        .map(|m| LinkSpan {
            byte_start: m.start(),
            byte_end: m.end(),
            uri: m.as_str().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_link_offsets_bound_the_url() {
        let text = "see http://x.io/a now";
        let links = detect_links(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].byte_start, 4);
        assert_eq!(links[0].byte_end, 17);
        assert_eq!(&text[links[0].byte_start..links[0].byte_end], "http://x.io/a");
    }

    #[test]
    fn multibyte_prefix_shifts_offsets_by_byte_length() {
        // 🔗 is four bytes in UTF-8; a char-indexed implementation
        // would be off by three.
        let text = "🔗 http://x.io/a";
        let links = detect_links(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].byte_start, 5);
        assert_eq!(links[0].byte_end, 5 + "http://x.io/a".len());
        assert_eq!(links[0].uri, "http://x.io/a");
    }

    #[test]
    fn multiple_links_in_left_to_right_order() {
        let text = "a https://one.example b http://two.example";
        let links = detect_links(text);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].uri, "https://one.example");
        assert_eq!(links[1].uri, "http://two.example");
        assert!(links[0].byte_end <= links[1].byte_start);
    }

    #[test]
    fn url_stops_at_newline() {
        let links = detect_links("https://a.example\nhttps://b.example");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].uri, "https://a.example");
    }

    #[test]
    fn no_links_yields_empty() {
        assert!(detect_links("plain text, no urls here").is_empty());
    }
}
