// Collaborator seams for the posting pipeline.
//
// Each external service the pipeline talks to sits behind a trait, so
// the orchestration logic can be exercised end-to-end with in-memory
// fakes. The production implementations are the thin HTTP clients in
// `objkt`, `media`, and `bluesky`.

use async_trait::async_trait;

use crate::bluesky::client::{BlobRef, PostResult, Session};
use crate::compose::PostComposition;
use crate::error::BotResult;
use crate::media::resolver::ResolvedMedia;
use crate::objkt::collection::ArtworkRecord;

/// Source of the creator's artwork collection.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Fetch the normalized, media-filtered collection for an address.
    async fn fetch_collection(&self, address: &str) -> BotResult<Vec<ArtworkRecord>>;
}

/// Source of downloadable media bytes for a chosen artwork.
///
/// Resolution is soft: `None` means "post text-only", never an error.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn resolve(&self, record: &ArtworkRecord) -> Option<ResolvedMedia>;
}

/// The social platform's write surface.
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// Exchange credentials for a per-run session.
    async fn login(&self, identifier: &str, password: &str) -> BotResult<Session>;

    /// Upload attachment bytes, returning the platform's blob reference.
    async fn upload_attachment(
        &self,
        session: &Session,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> BotResult<BlobRef>;

    /// Create the post record from a composition and an optional
    /// previously-uploaded blob.
    async fn create_post(
        &self,
        session: &Session,
        composition: &PostComposition,
        blob: Option<BlobRef>,
    ) -> BotResult<PostResult>;
}
