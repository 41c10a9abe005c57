// Pipeline orchestration — one end-to-end run per trigger.
//
// Sequence: login → fetch collection → select artwork → resolve media
// (soft) → adapt image size → compose → upload (optional) → publish.
// Fatal failures abort the run with a typed error; media failures
// degrade to a text-only post. The runner holds no cross-run state —
// construct one per invocation context.

use std::time::Duration;

use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{info, warn};

use crate::bluesky::client::PostResult;
use crate::compose::{self, MediaAttachment};
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::media::adapter::{self, MAX_ATTACHMENT_BYTES};
use crate::media::resolver::ResolvedMedia;
use crate::objkt::collection::ArtworkRecord;
use crate::schedule;
use crate::store::RunMarkerStore;

use super::traits::{CollectionSource, MediaSource, SocialPublisher};

/// Markers live slightly longer than a run is expected to take.
const RUN_MARKER_TTL: Duration = Duration::from_secs(65);

/// Which artwork a run should post.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Uniform choice over the fetched collection.
    Random,
    /// Exact match on the token id, compared trimmed. First match in
    /// collection order wins.
    ById(String),
}

/// The successful outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub artwork_id: String,
    pub artwork_title: String,
    pub price_display: String,
    /// Whether the post carried a media embed.
    pub attached_media: bool,
    /// The created record's reference as the platform returned it.
    pub post: PostResult,
}

/// Drives one pipeline run over the collaborator seams.
pub struct PipelineRunner<'a> {
    pub collection: &'a dyn CollectionSource,
    pub media: &'a dyn MediaSource,
    pub publisher: &'a dyn SocialPublisher,
}

impl<'a> PipelineRunner<'a> {
    /// Execute one full run: authenticate, fetch, select, resolve,
    /// compose, and publish.
    pub async fn run(&self, config: &BotConfig, selection: &Selection) -> BotResult<RunReport> {
        config.validate()?;

        let session = self
            .publisher
            .login(&config.platform_handle, &config.platform_credential)
            .await?;

        let collection = self.collection.fetch_collection(&config.address).await?;
        let artwork = select_artwork(&collection, selection)?;

        info!(
            artwork = artwork.id.as_str(),
            title = artwork.title.as_str(),
            "Artwork selected"
        );

        let attachment = match self.media.resolve(artwork).await {
            Some(media) => prepare_attachment(media, artwork),
            None => None,
        };

        let composition = compose::compose(
            &config.message_template,
            artwork,
            &config.profile_link,
            attachment,
        );

        let blob = match &composition.attachment {
            Some(att) => Some(
                self.publisher
                    .upload_attachment(&session, att.bytes.clone(), &att.mime_type)
                    .await?,
            ),
            None => None,
        };

        let attached_media = blob.is_some();
        let post = self
            .publisher
            .create_post(&session, &composition, blob)
            .await?;

        Ok(RunReport {
            artwork_id: artwork.id.clone(),
            artwork_title: artwork.title.clone(),
            price_display: artwork.price_display.clone(),
            attached_media,
            post,
        })
    }

    /// Scheduled-tick entry point: no-op unless the config is active and
    /// a slot matches the given wall-clock minute, and the tick's run
    /// marker was acquired. A slot's message overrides the template.
    pub async fn run_scheduled(
        &self,
        config: &BotConfig,
        markers: &dyn RunMarkerStore,
        hhmm: &str,
    ) -> BotResult<Option<RunReport>> {
        if !config.is_active {
            return Ok(None);
        }

        let Some(slot) = schedule::matching_slot(&config.schedules, hhmm) else {
            return Ok(None);
        };

        let marker_key = format!("post_lock:{hhmm}");
        if !markers.try_acquire(&marker_key, RUN_MARKER_TTL).await? {
            info!(tick = hhmm, "Already posted for this minute, skipping");
            return Ok(None);
        }

        let mut effective = config.clone();
        if let Some(message) = slot.message.as_deref() {
            if !message.is_empty() {
                effective.message_template = message.to_string();
            }
        }

        self.run(&effective, &Selection::Random).await.map(Some)
    }
}

/// Pick the artwork for this run.
pub fn select_artwork<'c>(
    collection: &'c [ArtworkRecord],
    selection: &Selection,
) -> BotResult<&'c ArtworkRecord> {
    match selection {
        Selection::Random => collection
            .choose(&mut rand::rng())
            .ok_or(BotError::EmptyCollection),
        Selection::ById(id) => {
            let wanted = id.trim();
            collection
                .iter()
                .find(|record| record.id.trim() == wanted)
                .ok_or_else(|| BotError::NotFound(wanted.to_string()))
        }
    }
}

/// Turn resolved media into an uploadable attachment.
///
/// Images get the shrink-to-fit treatment; if the quality floor leaves
/// the payload still over the ceiling, the attachment is dropped and
/// the post goes out text-only (same policy as unresolvable media).
/// Video and other payloads pass through untouched.
fn prepare_attachment(media: ResolvedMedia, artwork: &ArtworkRecord) -> Option<MediaAttachment> {
    let alt_text = compose::alt_text(artwork);

    let bytes = if media.mime_type.starts_with("image/") {
        let adapted = adapter::shrink_to_fit(media.bytes, MAX_ATTACHMENT_BYTES);
        if adapted.len() > MAX_ATTACHMENT_BYTES {
            warn!(
                artwork = artwork.id.as_str(),
                size = adapted.len(),
                "Image still over size ceiling after adaptation, posting text-only"
            );
            return None;
        }
        adapted
    } else {
        media.bytes
    };

    Some(MediaAttachment {
        bytes,
        mime_type: media.mime_type,
        alt_text,
    })
}
