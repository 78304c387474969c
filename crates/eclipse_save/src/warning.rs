// ---------------------------------------------------------------------------
// warning – Non-fatal findings reported alongside a successful load
// ---------------------------------------------------------------------------

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::EngineVariant;
use crate::version::Feature;

/// A known loss of fidelity or a tolerated oddity in a save that still
/// loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadWarning {
    /// Written by an older format revision; later blocks were defaulted.
    OlderVersion { found: u32, current: u32 },
    /// Signature of a sibling title in the same engine family.
    CrossVariantSignature { found: EngineVariant, expected: EngineVariant },
    /// Engine id names a sibling title in the same engine family.
    CrossVariantEngine { engine_id: String, variant: EngineVariant },
    /// Engine id not in the compatibility table.
    UnknownEngine { engine_id: String },
    /// A block the stream's version predates.
    FeatureUnavailable { feature: Feature, version: u32 },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::OlderVersion { found, current } => {
                write!(f, "save format v{found} is older than current v{current}")
            }
            LoadWarning::CrossVariantSignature { found, expected } => write!(
                f,
                "signature belongs to {} but the profile is {}",
                found.engine_id(),
                expected.engine_id()
            ),
            LoadWarning::CrossVariantEngine { engine_id, variant } => write!(
                f,
                "engine id '{engine_id}' is the sibling title {}",
                variant.engine_id()
            ),
            LoadWarning::UnknownEngine { engine_id } => {
                write!(f, "unrecognized engine id '{engine_id}'")
            }
            LoadWarning::FeatureUnavailable { feature, version } => write!(
                f,
                "{} not present in v{version} saves; defaulted",
                feature.name()
            ),
        }
    }
}
