// objkt.com indexer client — GraphQL queries over a creator's tokens.
//
// One submodule for the HTTP/GraphQL plumbing, one for the normalized
// artwork record the rest of the pipeline consumes.

pub mod client;
pub mod collection;
