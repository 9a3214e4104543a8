//! Media File Store for generated and uploaded audio.
//!
//! Artifacts are addressed by random 128-bit identifiers and written
//! atomically, so a reader never observes a partially written file.

pub mod store;

pub use store::{
    AudioFormat, MediaArtifact, MediaId, MediaStore, MediaStoreError, MediaStoreResult,
    PendingArtifact, ScopedArtifact,
};
