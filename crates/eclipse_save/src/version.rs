// ---------------------------------------------------------------------------
// Save format version constants and feature gates
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// Newest format this codec can read and write.
/// v1 = baseline: header, names, play time, timestamp, player name; entity,
///      creature, area, party and global blocks
/// v2 = screenshot + portrait blobs, effect `colored` byte, creature
///      attribute block
/// v3 = morality score + romance/approval/mission summaries, party
///      extension block (variants with squads only)
/// v4 = difficulty, DLC list, save kind, cheat flag, save number; area
///      spawned-entity list
pub const CURRENT_FORMAT_VERSION: u32 = 4;

/// Oldest format still accepted. Version 0 never shipped.
pub const MIN_FORMAT_VERSION: u32 = 1;

/// A block that did not exist in every format revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    MetadataMedia,
    EffectColor,
    CreatureAttributes,
    RelationshipSummaries,
    PartyExtensions,
    SessionInfo,
    SpawnedEntities,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::MetadataMedia,
        Feature::EffectColor,
        Feature::CreatureAttributes,
        Feature::RelationshipSummaries,
        Feature::PartyExtensions,
        Feature::SessionInfo,
        Feature::SpawnedEntities,
    ];

    pub fn introduced_in(self) -> u32 {
        match self {
            Feature::MetadataMedia | Feature::EffectColor | Feature::CreatureAttributes => 2,
            Feature::RelationshipSummaries | Feature::PartyExtensions => 3,
            Feature::SessionInfo | Feature::SpawnedEntities => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::MetadataMedia => "screenshot/portrait",
            Feature::EffectColor => "effect color flag",
            Feature::CreatureAttributes => "creature attributes",
            Feature::RelationshipSummaries => "morality/romance/mission summaries",
            Feature::PartyExtensions => "party extension block",
            Feature::SessionInfo => "difficulty/DLC/save kind",
            Feature::SpawnedEntities => "spawned entity list",
        }
    }
}

/// The layout a stream is read or written with.
///
/// Every block codec takes a `Format` so that the same code path serves
/// every supported revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub version: u32,
    /// Whether this title carries the party extension block at all.
    pub party_extensions: bool,
}

impl Format {
    pub fn new(version: u32, party_extensions: bool) -> Self {
        Self {
            version,
            party_extensions,
        }
    }

    pub fn current(party_extensions: bool) -> Self {
        Self::new(CURRENT_FORMAT_VERSION, party_extensions)
    }

    pub fn supports(self, feature: Feature) -> bool {
        if feature == Feature::PartyExtensions && !self.party_extensions {
            return false;
        }
        self.version >= feature.introduced_in()
    }

    /// Features a reader at this format has to default.
    pub fn missing_features(self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| !self.supports(*f))
            .filter(|f| *f != Feature::PartyExtensions || self.party_extensions)
            .collect()
    }
}
