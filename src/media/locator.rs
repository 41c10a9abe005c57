// Locator normalization and candidate selection.
//
// NFT media references come as either ordinary HTTP(S) URLs or
// content-addressed `ipfs://<hash>` locators. The latter must be
// rewritten through an HTTP gateway before they can be fetched. The
// rewrite is a plain prefix substitution and is idempotent — an
// already-HTTP locator passes through untouched.

/// Default public IPFS gateway prefix.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Translate a content-addressed locator into a fetchable HTTP URL.
///
/// `gateway` must end with the path separator (e.g.
/// `https://ipfs.io/ipfs/`). Non-IPFS locators are returned unchanged.
pub fn to_gateway_url(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(hash) => format!("{gateway}{hash}"),
        None => uri.to_string(),
    }
}

/// First non-empty locator from an ordered candidate list.
///
/// This is the single precedence rule for "which URL do we try" —
/// call sites pass candidates in priority order instead of chaining
/// ad-hoc fallbacks.
pub fn first_non_empty<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().find(|c| !c.is_empty()).copied()
}
