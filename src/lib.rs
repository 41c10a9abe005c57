// Plinth: scheduled artwork showcase bot for Bluesky.
//
// Fetches a Tezos creator's NFT collection from the objkt.com indexer,
// picks one artwork, and publishes it to Bluesky with pricing and a
// promotional link. This is the library root — each module corresponds
// to one stage of the posting pipeline.

pub mod bluesky;
pub mod compose;
pub mod config;
pub mod error;
pub mod media;
pub mod objkt;
pub mod pipeline;
pub mod schedule;
pub mod store;
