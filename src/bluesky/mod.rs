// Bluesky API client — session creation, blob upload, post records.
//
// Authenticated XRPC over HTTP. `client` owns the wire calls and their
// serde schemas; `richtext` computes the byte-offset link facets the
// post record format requires.

pub mod client;
pub mod richtext;
