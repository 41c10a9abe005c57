// The selection-and-publishing pipeline.
//
// `traits` defines the collaborator seams (collection source, media
// source, publisher); `run` drives them in sequence for one trigger.

pub mod run;
pub mod traits;
