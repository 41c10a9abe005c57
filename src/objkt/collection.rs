// Normalized artwork records.
//
// The indexer's token shape is full of optional fields and scaled
// integers; this module flattens it into the record the rest of the
// pipeline consumes. Records are built fresh on every fetch and never
// mutated afterwards.

use super::client::Token;
use crate::media::locator;

/// Price shown when a token has no active listing.
pub const NOT_FOR_SALE: &str = "Not for sale";

/// Upstream listing prices are mutez — millionths of a tez.
const MUTEZ_PER_TEZ: f64 = 1_000_000.0;

/// One token in the creator's collection, normalized for posting.
#[derive(Debug, Clone)]
pub struct ArtworkRecord {
    /// Platform-assigned token id, unique within a collection snapshot.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Preview-resolution media, gateway-normalized. Empty when absent.
    pub display_url: String,
    /// Full-resolution media (the artifact), gateway-normalized.
    pub artifact_url: String,
    /// Thumbnail media, gateway-normalized.
    pub thumbnail_url: String,
    pub mime_type: String,
    /// Two-decimal price in tez, or the `NOT_FOR_SALE` sentinel.
    pub price_display: String,
    /// Price in tez; 0.0 when not listed.
    pub price_xtz: f64,
    /// Creation timestamp as reported upstream. Ordering only.
    pub created_at: Option<String>,
}

impl ArtworkRecord {
    /// Build a record from a raw indexer token, translating `ipfs://`
    /// locators through the given gateway prefix.
    pub fn from_token(token: Token, gateway: &str) -> Self {
        let (price_xtz, price_display) = match token.listings_active.first() {
            Some(listing) => {
                let tez = listing.price_xtz.unwrap_or(0) as f64 / MUTEZ_PER_TEZ;
                (tez, format!("{tez:.2}"))
            }
            None => (0.0, NOT_FOR_SALE.to_string()),
        };

        Self {
            id: token.token_id.unwrap_or_default(),
            title: token.name.unwrap_or_else(|| "Untitled".to_string()),
            description: token.description.unwrap_or_default(),
            display_url: normalize(token.display_uri, gateway),
            artifact_url: normalize(token.artifact_uri, gateway),
            thumbnail_url: normalize(token.thumbnail_uri, gateway),
            mime_type: token.mime.unwrap_or_else(|| "image/png".to_string()),
            price_display,
            price_xtz,
            created_at: token.timestamp,
        }
    }

    /// A record is only worth keeping if something can be downloaded.
    pub fn has_media(&self) -> bool {
        !self.display_url.is_empty()
            || !self.artifact_url.is_empty()
            || !self.thumbnail_url.is_empty()
    }

    /// Whether the primary media is a video per its MIME kind.
    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

fn normalize(uri: Option<String>, gateway: &str) -> String {
    match uri {
        Some(uri) => locator::to_gateway_url(&uri, gateway),
        None => String::new(),
    }
}
