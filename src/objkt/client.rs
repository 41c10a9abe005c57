// HTTP client for the objkt.com GraphQL indexer.
//
// Issues a single POST per fetch with a fixed query document. The
// indexer signals failure two ways: a non-success HTTP status, or a
// 200 carrying a top-level `errors` list — both map to BotError::Upstream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BotError, BotResult};
use crate::pipeline::traits::CollectionSource;

use super::collection::ArtworkRecord;

/// Default GraphQL endpoint for the objkt.com v3 indexer.
pub const DEFAULT_GRAPHQL_URL: &str = "https://data.objkt.com/v3/graphql";

/// Upper bound on tokens requested per fetch. Large enough to cover a
/// whole collection for most artists without pagination.
const TOKEN_LIMIT: u32 = 1000;

/// Tokens created by an address, newest first, each with its cheapest
/// active listing (ascending price, limit 1 — the "best available
/// price" policy when a creator has concurrent listings).
const CREATOR_TOKENS_QUERY: &str = r#"
query GetUserTokens($address: String!, $limit: Int!) {
  token_creator(
    where: {creator_address: {_eq: $address}}
    limit: $limit
    order_by: {token: {timestamp: desc}}
  ) {
    token {
      token_id
      name
      description
      display_uri
      artifact_uri
      thumbnail_uri
      mime
      timestamp
      listings_active(limit: 1, order_by: {price_xtz: asc}) {
        price_xtz
      }
    }
  }
}
"#;

/// Client for the objkt.com indexing API.
pub struct ObjktClient {
    client: reqwest::Client,
    endpoint: String,
    gateway: String,
}

impl ObjktClient {
    /// Create a new indexer client pointing at the given GraphQL endpoint.
    ///
    /// `gateway` is the HTTP prefix substituted for `ipfs://` locators
    /// (see `media::locator`).
    pub fn new(endpoint: &str, gateway: &str) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("plinth/0.1 (artwork-showcase-bot)")
            .build()
            .map_err(|e| BotError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            gateway: gateway.to_string(),
        })
    }

    /// Fetch every token created by `address`, normalized into artwork
    /// records and filtered to those with at least one usable media
    /// locator. Order follows the query (creation time descending).
    pub async fn fetch_creator_tokens(&self, address: &str) -> BotResult<Vec<ArtworkRecord>> {
        debug!(address = address, "Querying objkt indexer");

        let request = GraphqlRequest {
            query: CREATOR_TOKENS_QUERY,
            variables: QueryVariables {
                address,
                limit: TOKEN_LIMIT,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Upstream(format!("indexer request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Upstream(format!(
                "indexer returned {status}: {body}"
            )));
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| BotError::Upstream(format!("malformed indexer response: {e}")))?;

        if let Some(errors) = body.errors {
            if let Some(first) = errors.first() {
                return Err(BotError::Upstream(first.message.clone()));
            }
        }

        let edges = body.data.map(|d| d.token_creator).unwrap_or_default();

        let records: Vec<ArtworkRecord> = edges
            .into_iter()
            .map(|edge| ArtworkRecord::from_token(edge.token, &self.gateway))
            .filter(ArtworkRecord::has_media)
            .collect();

        info!(
            address = address,
            count = records.len(),
            "Collection fetched"
        );

        Ok(records)
    }
}

#[async_trait]
impl CollectionSource for ObjktClient {
    async fn fetch_collection(&self, address: &str) -> BotResult<Vec<ArtworkRecord>> {
        self.fetch_creator_tokens(address).await
    }
}

// -- Serde types for the GraphQL exchange --

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: QueryVariables<'a>,
}

#[derive(Serialize)]
struct QueryVariables<'a> {
    address: &'a str,
    limit: u32,
}

#[derive(Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<TokenCreatorData>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Deserialize)]
pub struct TokenCreatorData {
    #[serde(default)]
    pub token_creator: Vec<TokenCreatorEdge>,
}

#[derive(Deserialize)]
pub struct TokenCreatorEdge {
    pub token: Token,
}

/// One token as the indexer returns it — every field may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct Token {
    pub token_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_uri: Option<String>,
    pub artifact_uri: Option<String>,
    pub thumbnail_uri: Option<String>,
    pub mime: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub listings_active: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub price_xtz: Option<i64>,
}
