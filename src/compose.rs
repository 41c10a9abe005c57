// Post composition.
//
// Text layout is fixed: template line(s), blank line, artwork title,
// price line, blank line, link-emoji + profile link. Link facets are
// detected over the final text so the byte offsets already account for
// the multi-byte 🔗 prefix.

use crate::bluesky::richtext::{self, LinkSpan};
use crate::objkt::collection::ArtworkRecord;

/// Media payload attached to a composition, ready for upload.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub alt_text: String,
}

/// The assembled post before transmission.
#[derive(Debug, Clone)]
pub struct PostComposition {
    pub text: String,
    /// Detected hyperlink spans, left-to-right. Empty when no links.
    pub links: Vec<LinkSpan>,
    /// Present only when media resolution (and adaptation) succeeded.
    pub attachment: Option<MediaAttachment>,
}

/// Build the full composition for an artwork.
///
/// `message` is the schedule slot's override or the config template.
pub fn compose(
    message: &str,
    artwork: &ArtworkRecord,
    profile_link: &str,
    attachment: Option<MediaAttachment>,
) -> PostComposition {
    let text = build_post_text(
        message,
        &artwork.title,
        &artwork.price_display,
        profile_link,
    );
    let links = richtext::detect_links(&text);

    PostComposition {
        text,
        links,
        attachment,
    }
}

/// Render the fixed post layout. The profile link is normalized to
/// carry an explicit scheme before being embedded.
pub fn build_post_text(message: &str, title: &str, price_display: &str, profile_link: &str) -> String {
    let link = normalize_profile_link(profile_link);
    format!("{message}\n\n{title}\n{price_display} XTZ\n\n🔗 {link}")
}

/// Prefix `https://` unless the link already carries an HTTP(S) scheme.
pub fn normalize_profile_link(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}

/// Alt text for an attachment: the artwork's description, or its title
/// when the description is empty.
pub fn alt_text(artwork: &ArtworkRecord) -> String {
    if artwork.description.is_empty() {
        artwork.title.clone()
    } else {
        artwork.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_fixed_format() {
        let text = build_post_text("New drop!", "Sunset #4", "12.50", "objkt.com/@artist");
        assert_eq!(
            text,
            "New drop!\n\nSunset #4\n12.50 XTZ\n\n🔗 https://objkt.com/@artist"
        );
    }

    #[test]
    fn scheme_is_preserved_when_present() {
        assert_eq!(
            normalize_profile_link("https://objkt.com/@artist"),
            "https://objkt.com/@artist"
        );
        assert_eq!(
            normalize_profile_link("http://objkt.com/@artist"),
            "http://objkt.com/@artist"
        );
        assert_eq!(
            normalize_profile_link("objkt.com/@artist"),
            "https://objkt.com/@artist"
        );
    }

    #[test]
    fn profile_link_is_detected_behind_the_emoji() {
        let text = build_post_text("msg", "t", "Not for sale", "objkt.com/@a");
        let links = richtext::detect_links(&text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].uri, "https://objkt.com/@a");
        // The facet must bound the link exactly, in bytes.
        assert_eq!(&text[links[0].byte_start..links[0].byte_end], links[0].uri);
    }
}
