// Pipeline error taxonomy.
//
// Every fatal failure a run can hit maps to exactly one variant, so
// callers (HTTP handlers, schedulers) can branch on the kind without
// string matching. Media-resolution failure is deliberately absent —
// it degrades the run to a text-only post instead of aborting it.

use thiserror::Error;

/// Fatal errors surfaced by the posting pipeline.
#[derive(Debug, Error)]
pub enum BotError {
    /// The indexing API was unreachable, returned a non-success status,
    /// or carried a top-level GraphQL error list.
    #[error("indexer error: {0}")]
    Upstream(String),

    /// Bluesky session creation failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Random selection was requested over an empty collection.
    #[error("no artworks found for this address")]
    EmptyCollection,

    /// By-identifier selection found no matching artwork.
    #[error("artwork {0} not found in collection")]
    NotFound(String),

    /// Blob upload to Bluesky failed.
    #[error("attachment upload failed: {0}")]
    Upload(String),

    /// Post record creation failed.
    #[error("post creation failed: {0}")]
    Publish(String),

    /// The configuration / run-marker store misbehaved.
    #[error("state store error: {0}")]
    Store(String),

    /// The supplied configuration is missing required fields.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for pipeline operations.
pub type BotResult<T> = std::result::Result<T, BotError>;
