// Authenticated Bluesky XRPC client.
//
// Three endpoints, always called in this order within a run:
// com.atproto.server.createSession, com.atproto.repo.uploadBlob,
// com.atproto.repo.createRecord. The session lives in memory for one
// run and is never persisted.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compose::PostComposition;
use crate::error::{BotError, BotResult};
use crate::pipeline::traits::SocialPublisher;

use super::richtext::LinkSpan;

/// Default XRPC base path for the main Bluesky PDS.
pub const DEFAULT_XRPC_URL: &str = "https://bsky.social/xrpc";

/// Authentication result — bearer credentials plus the actor identity
/// needed when creating records in the account's repo.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub did: String,
    pub handle: String,
}

/// Reference to an uploaded blob, echoed verbatim into the post embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobRef {
    #[serde(rename = "$type")]
    pub ref_type: String,
    #[serde(rename = "ref")]
    pub reference: BlobLink,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobLink {
    #[serde(rename = "$link")]
    pub link: String,
}

/// The created post record's reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResult {
    pub uri: String,
    pub cid: String,
}

/// Client for the Bluesky social platform API.
pub struct BskyClient {
    client: reqwest::Client,
    base_url: String,
}

impl BskyClient {
    /// Create a new client pointing at the given XRPC base path.
    pub fn new(base_url: &str) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("plinth/0.1 (artwork-showcase-bot)")
            .build()
            .map_err(|e| BotError::Auth(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange handle + app password for a session.
    pub async fn create_session(&self, identifier: &str, password: &str) -> BotResult<Session> {
        let url = format!("{}/com.atproto.server.createSession", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await
            .map_err(|e| BotError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Auth(read_error(response).await));
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| BotError::Auth(format!("malformed session response: {e}")))?;

        info!(handle = session.handle.as_str(), "Bluesky session created");
        Ok(session)
    }

    /// Upload raw media bytes; the returned blob ref goes into the embed.
    pub async fn upload_blob(
        &self,
        session: &Session,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> BotResult<BlobRef> {
        let url = format!("{}/com.atproto.repo.uploadBlob", self.base_url);

        debug!(size = bytes.len(), mime = mime_type, "Uploading blob");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.access_jwt)
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BotError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Upload(read_error(response).await));
        }

        let body: UploadBlobResponse = response
            .json()
            .await
            .map_err(|e| BotError::Upload(format!("malformed upload response: {e}")))?;

        Ok(body.blob)
    }

    /// Create the post record: text, timestamp, link facets, and — when
    /// a blob was uploaded — an embed shaped by the attachment's MIME
    /// kind (video embeds carry one media ref, image embeds a
    /// one-element image list with alt text).
    pub async fn create_post(
        &self,
        session: &Session,
        composition: &PostComposition,
        blob: Option<BlobRef>,
    ) -> BotResult<PostResult> {
        let url = format!("{}/com.atproto.repo.createRecord", self.base_url);

        let facets = if composition.links.is_empty() {
            None
        } else {
            Some(composition.links.iter().map(link_facet).collect())
        };

        let embed = match (&composition.attachment, blob) {
            (Some(att), Some(blob)) => Some(build_embed(blob, &att.mime_type, &att.alt_text)),
            _ => None,
        };

        let request = CreateRecordRequest {
            repo: &session.did,
            collection: "app.bsky.feed.post",
            record: PostRecord {
                record_type: "app.bsky.feed.post",
                text: &composition.text,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                facets,
                embed,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Publish(read_error(response).await));
        }

        let result: PostResult = response
            .json()
            .await
            .map_err(|e| BotError::Publish(format!("malformed createRecord response: {e}")))?;

        info!(uri = result.uri.as_str(), "Post published");
        Ok(result)
    }
}

#[async_trait]
impl SocialPublisher for BskyClient {
    async fn login(&self, identifier: &str, password: &str) -> BotResult<Session> {
        self.create_session(identifier, password).await
    }

    async fn upload_attachment(
        &self,
        session: &Session,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> BotResult<BlobRef> {
        self.upload_blob(session, bytes, mime_type).await
    }

    async fn create_post(
        &self,
        session: &Session,
        composition: &PostComposition,
        blob: Option<BlobRef>,
    ) -> BotResult<PostResult> {
        BskyClient::create_post(self, session, composition, blob).await
    }
}

/// Pull the upstream error message out of a failed XRPC response,
/// falling back to status + raw body.
async fn read_error(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<XrpcErrorBody>(&body) {
        Ok(parsed) => parsed
            .message
            .unwrap_or_else(|| format!("{status}: {body}")),
        Err(_) => format!("{status}: {body}"),
    }
}

fn link_facet(span: &LinkSpan) -> Facet {
    Facet {
        index: FacetIndex {
            byte_start: span.byte_start,
            byte_end: span.byte_end,
        },
        features: vec![FacetFeature {
            feature_type: "app.bsky.richtext.facet#link",
            uri: span.uri.clone(),
        }],
    }
}

fn build_embed(blob: BlobRef, mime_type: &str, alt: &str) -> Embed {
    if mime_type.starts_with("video/") {
        Embed::Video(VideoEmbed {
            embed_type: "app.bsky.embed.video",
            video: blob,
            alt: alt.to_string(),
        })
    } else {
        Embed::Images(ImagesEmbed {
            embed_type: "app.bsky.embed.images",
            images: vec![ImageItem {
                alt: alt.to_string(),
                image: blob,
            }],
        })
    }
}

// -- Serde types for the XRPC exchanges --

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct UploadBlobResponse {
    blob: BlobRef,
}

#[derive(Deserialize)]
struct XrpcErrorBody {
    #[allow(dead_code)]
    error: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'static str,
    record: PostRecord<'a>,
}

#[derive(Serialize)]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    facets: Option<Vec<Facet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed: Option<Embed>,
}

#[derive(Serialize)]
struct Facet {
    index: FacetIndex,
    features: Vec<FacetFeature>,
}

#[derive(Serialize)]
struct FacetIndex {
    #[serde(rename = "byteStart")]
    byte_start: usize,
    #[serde(rename = "byteEnd")]
    byte_end: usize,
}

#[derive(Serialize)]
struct FacetFeature {
    #[serde(rename = "$type")]
    feature_type: &'static str,
    uri: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Embed {
    Images(ImagesEmbed),
    Video(VideoEmbed),
}

#[derive(Serialize)]
struct ImagesEmbed {
    #[serde(rename = "$type")]
    embed_type: &'static str,
    images: Vec<ImageItem>,
}

#[derive(Serialize)]
struct ImageItem {
    alt: String,
    image: BlobRef,
}

#[derive(Serialize)]
struct VideoEmbed {
    #[serde(rename = "$type")]
    embed_type: &'static str,
    video: BlobRef,
    alt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> BlobRef {
        serde_json::from_str(
            r#"{"$type": "blob", "ref": {"$link": "bafyabc"}, "mimeType": "image/png", "size": 1234}"#,
        )
        .unwrap()
    }

    #[test]
    fn blob_ref_round_trips_verbatim() {
        let b = blob();
        assert_eq!(b.reference.link, "bafyabc");
        assert_eq!(b.mime_type, "image/png");
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["$type"], "blob");
        assert_eq!(json["ref"]["$link"], "bafyabc");
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["size"], 1234);
    }

    #[test]
    fn record_without_links_omits_facets() {
        let record = PostRecord {
            record_type: "app.bsky.feed.post",
            text: "no links here",
            created_at: "2026-08-28T12:00:00.000Z".to_string(),
            facets: None,
            embed: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("facets").is_none());
        assert!(json.get("embed").is_none());
        assert_eq!(json["$type"], "app.bsky.feed.post");
    }

    #[test]
    fn image_embed_carries_alt_text_list() {
        let embed = build_embed(blob(), "image/png", "a painting");
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["$type"], "app.bsky.embed.images");
        assert_eq!(json["images"][0]["alt"], "a painting");
        assert_eq!(json["images"][0]["image"]["ref"]["$link"], "bafyabc");
    }

    #[test]
    fn video_embed_carries_single_media_ref() {
        let embed = build_embed(blob(), "video/mp4", "a clip");
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["$type"], "app.bsky.embed.video");
        assert_eq!(json["video"]["ref"]["$link"], "bafyabc");
        assert_eq!(json["alt"], "a clip");
    }

    #[test]
    fn link_facet_uses_byte_offsets() {
        let span = LinkSpan {
            byte_start: 5,
            byte_end: 18,
            uri: "http://x.io/a".to_string(),
        };
        let json = serde_json::to_value(link_facet(&span)).unwrap();
        assert_eq!(json["index"]["byteStart"], 5);
        assert_eq!(json["index"]["byteEnd"], 18);
        assert_eq!(json["features"][0]["$type"], "app.bsky.richtext.facet#link");
        assert_eq!(json["features"][0]["uri"], "http://x.io/a");
    }

    #[test]
    fn session_deserializes_camel_case() {
        let json = r#"{"accessJwt": "aj", "refreshJwt": "rj", "did": "did:plc:me", "handle": "artist.bsky.social"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_jwt, "aj");
        assert_eq!(session.refresh_jwt, "rj");
        assert_eq!(session.did, "did:plc:me");
    }
}
