// Media handling — locator normalization, download with fallback, and
// size adaptation for the Bluesky attachment ceiling.

pub mod adapter;
pub mod locator;
pub mod resolver;
