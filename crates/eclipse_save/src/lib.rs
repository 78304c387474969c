//! Versioned binary save-state codec for Eclipse-family game saves.
//!
//! [`SaveCodec`] encodes and decodes header/metadata files and payload
//! archives for one title, described by an [`EngineProfile`].
//! [`classify_bundle`] judges an on-disk bundle without decoding its body,
//! and [`migrate_bundle`] upgrades older bundles to the current format.

mod atomic_write;
pub mod codec;
pub mod profile;
pub mod save_error;
pub mod version;
pub mod warning;

pub mod effect;
pub mod entity;
pub mod item;
pub mod locals;
pub mod value;

pub mod area;
pub mod creature;
pub mod game;
pub mod globals;
pub mod party;

pub mod header;
pub mod metadata;
pub mod payload;
mod save_codec;

pub mod bundle;
pub mod compat;
pub mod migrate;
mod migrate_registry;

#[cfg(test)]
mod fixtures;

pub use bundle::{read_bundle, read_metadata_only, write_bundle, LoadedSave};
pub use compat::{classify_bundle, CompatibilityReport, Verdict};
pub use game::SaveGame;
pub use header::SaveHeader;
pub use metadata::SaveMetadata;
pub use migrate::{migrate_bundle, MigrationResult};
pub use migrate_registry::MigrationReport;
pub use profile::{EngineProfile, EngineVariant};
pub use save_codec::{DecodedMetadata, SaveCodec};
pub use save_error::{SaveError, SaveResult};
pub use warning::LoadWarning;
