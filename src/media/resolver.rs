// Media download with an ordered fallback chain.
//
// Resolution is a soft operation: if neither the primary nor the
// fallback locator yields bytes, the pipeline posts text-only instead
// of failing. Errors here are therefore logged, never propagated.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::objkt::collection::ArtworkRecord;
use crate::pipeline::traits::MediaSource;

use super::locator;

/// A downloaded media payload ready for upload.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Downloads artwork media, translating IPFS locators at fetch time.
pub struct MediaResolver {
    client: reqwest::Client,
    gateway: String,
}

impl MediaResolver {
    pub fn new(gateway: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("plinth/0.1 (artwork-showcase-bot)")
            .build()?;

        Ok(Self {
            client,
            gateway: gateway.to_string(),
        })
    }

    /// Resolve the record's media to bytes, or `None` if every candidate
    /// fails. Video records prefer the full-resolution artifact; image
    /// records prefer the display rendition. The fallback (display, else
    /// thumbnail) is only attempted when it differs from the primary.
    pub async fn resolve(&self, record: &ArtworkRecord) -> Option<ResolvedMedia> {
        let candidates = candidate_locators(record, record.is_video());

        for url in &candidates {
            match self.download(url).await {
                Ok(bytes) => {
                    debug!(url = url.as_str(), size = bytes.len(), "Media downloaded");
                    return Some(ResolvedMedia {
                        bytes,
                        mime_type: record.mime_type.clone(),
                    });
                }
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "Media download failed, trying next candidate");
                }
            }
        }

        warn!(
            artwork = record.id.as_str(),
            "All media candidates failed, will post text-only"
        );
        None
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, String> {
        // Gateway translation again here is a no-op for already-HTTP
        // locators, but covers callers passing raw ipfs:// references.
        let fetch_url = locator::to_gateway_url(url, &self.gateway);

        let response = self
            .client
            .get(&fetch_url)
            .header("Accept", "image/*, video/*, */*")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl MediaSource for MediaResolver {
    async fn resolve(&self, record: &ArtworkRecord) -> Option<ResolvedMedia> {
        MediaResolver::resolve(self, record).await
    }
}

/// The ordered download candidates for a record.
///
/// Primary: artifact for video, display otherwise. Fallback: display if
/// non-empty, else thumbnail — appended only when distinct from the
/// primary. Empty locators never appear in the result.
pub fn candidate_locators(record: &ArtworkRecord, prefer_video: bool) -> Vec<String> {
    let primary = if prefer_video {
        record.artifact_url.as_str()
    } else {
        record.display_url.as_str()
    };

    let fallback = locator::first_non_empty(&[
        record.display_url.as_str(),
        record.thumbnail_url.as_str(),
    ])
    .unwrap_or("");

    let mut candidates = Vec::new();
    if !primary.is_empty() {
        candidates.push(primary.to_string());
    }
    if !fallback.is_empty() && fallback != primary {
        candidates.push(fallback.to_string());
    }
    candidates
}
