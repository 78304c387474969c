// ---------------------------------------------------------------------------
// header – Save header: signature, format version, engine id
// ---------------------------------------------------------------------------
//
// Layout (little-endian):
//   [0..4]  signature, 4 ASCII bytes (DAO1, DAO2, MES1, MES2)
//   [4..8]  format version (u32)
//   [8..]   engine id (text)
//
// Decoding runs in a fixed order and stops at the first failure:
//   signature -> version range -> engine id -> body.
// Nothing after the signature is trusted until the signature is known.

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter, MAX_TEXT_LEN};
use crate::profile::{EngineCompat, EngineProfile, EngineVariant};
use crate::save_error::{SaveError, SaveResult};
use crate::version::Format;
use crate::warning::LoadWarning;

/// Longest possible encoded header.
pub const MAX_HEADER_LEN: usize = 4 + 4 + 4 + MAX_TEXT_LEN as usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub signature: [u8; 4],
    pub format_version: u32,
    pub engine_id: String,
}

impl Default for SaveHeader {
    fn default() -> Self {
        Self::for_profile(&EngineProfile::default())
    }
}

/// A header that passed every check, with what the body reader needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedHeader {
    pub header: SaveHeader,
    /// Title that wrote the stream, from its signature.
    pub variant: EngineVariant,
    /// Layout of the rest of the stream.
    pub format: Format,
    pub warnings: Vec<LoadWarning>,
}

impl SaveHeader {
    /// Header stamped with the profile's signature, write version and id.
    pub fn for_profile(profile: &EngineProfile) -> Self {
        Self {
            signature: profile.signature(),
            format_version: profile.current_version,
            engine_id: profile.engine_id.clone(),
        }
    }

    pub fn variant(&self) -> Option<EngineVariant> {
        EngineVariant::from_signature(self.signature)
    }

    pub fn encode(&self, w: &mut SaveWriter) -> SaveResult<()> {
        w.write_raw(&self.signature);
        w.write_u32(self.format_version);
        w.write_text("header.engine_id", &self.engine_id)
    }

    /// Read and validate a header against `profile`.
    pub fn decode(r: &mut SaveReader<'_>, profile: &EngineProfile) -> SaveResult<CheckedHeader> {
        let mut warnings = Vec::new();

        let signature = r.read_raw::<4>("header.signature")?;
        let variant =
            EngineVariant::from_signature(signature).ok_or(SaveError::UnknownSignature {
                found: signature,
            })?;
        if variant != profile.variant {
            warnings.push(LoadWarning::CrossVariantSignature {
                found: variant,
                expected: profile.variant,
            });
        }

        let format_version = r.read_u32("header.format_version")?;
        if format_version > profile.current_version {
            return Err(SaveError::VersionTooNew {
                found: format_version,
                max: profile.current_version,
            });
        }
        if format_version < profile.min_version {
            return Err(SaveError::VersionUnsupported {
                found: format_version,
                min: profile.min_version,
                max: profile.current_version,
            });
        }

        let engine_id = r.read_text("header.engine_id")?;
        match profile.engine_compat(&engine_id)? {
            EngineCompat::Exact => {}
            EngineCompat::KnownVariant(v) => warnings.push(LoadWarning::CrossVariantEngine {
                engine_id: engine_id.clone(),
                variant: v,
            }),
            EngineCompat::Unknown => warnings.push(LoadWarning::UnknownEngine {
                engine_id: engine_id.clone(),
            }),
        }

        let format = profile.format_for(variant, format_version);
        if format_version < profile.current_version {
            warnings.push(LoadWarning::OlderVersion {
                found: format_version,
                current: profile.current_version,
            });
            warnings.extend(format.missing_features().into_iter().map(|feature| {
                LoadWarning::FeatureUnavailable {
                    feature,
                    version: format_version,
                }
            }));
        }

        Ok(CheckedHeader {
            header: SaveHeader {
                signature,
                format_version,
                engine_id,
            },
            variant,
            format,
            warnings,
        })
    }

    /// Printable signature, for logs and reports.
    pub fn signature_lossy(&self) -> String {
        String::from_utf8_lossy(&self.signature).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{Feature, CURRENT_FORMAT_VERSION};

    fn header_bytes(sig: &[u8; 4], version: u32, engine: &str) -> Vec<u8> {
        let mut w = SaveWriter::new();
        SaveHeader {
            signature: *sig,
            format_version: version,
            engine_id: engine.to_string(),
        }
        .encode(&mut w)
        .unwrap();
        w.into_bytes()
    }

    fn decode(bytes: &[u8]) -> SaveResult<CheckedHeader> {
        let profile = EngineProfile::for_variant(EngineVariant::MassEffect2);
        SaveHeader::decode(&mut SaveReader::new(bytes), &profile)
    }

    #[test]
    fn test_current_header_has_no_warnings() {
        let checked = decode(&header_bytes(b"MES2", 4, "Eclipse")).unwrap();
        assert_eq!(checked.variant, EngineVariant::MassEffect2);
        assert_eq!(checked.format, Format::current(true));
        assert!(checked.warnings.is_empty());
    }

    #[test]
    fn test_layout_is_signature_version_engine() {
        let bytes = header_bytes(b"MES2", 4, "Eclipse");
        assert_eq!(&bytes[0..4], b"MES2");
        assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &7i32.to_le_bytes());
        assert_eq!(&bytes[12..], b"Eclipse");
    }

    #[test]
    fn test_unknown_signature() {
        assert!(matches!(
            decode(&header_bytes(b"XXXX", 4, "Eclipse")),
            Err(SaveError::UnknownSignature { found }) if &found == b"XXXX"
        ));
    }

    #[test]
    fn test_unknown_signature_wins_over_bad_version() {
        assert!(matches!(
            decode(&header_bytes(b"XXXX", 99, "Odyssey")),
            Err(SaveError::UnknownSignature { .. })
        ));
    }

    #[test]
    fn test_version_too_new() {
        assert!(matches!(
            decode(&header_bytes(b"MES2", 7, "Eclipse")),
            Err(SaveError::VersionTooNew { found: 7, max: 4 })
        ));
    }

    #[test]
    fn test_version_zero_is_unsupported() {
        assert!(matches!(
            decode(&header_bytes(b"MES2", 0, "Eclipse")),
            Err(SaveError::VersionUnsupported { found: 0, .. })
        ));
    }

    #[test]
    fn test_foreign_engine_is_mismatch() {
        assert!(matches!(
            decode(&header_bytes(b"MES2", 4, "Aurora")),
            Err(SaveError::EngineMismatch { .. })
        ));
    }

    #[test]
    fn test_older_version_lists_missing_features() {
        let checked = decode(&header_bytes(b"MES2", 2, "Eclipse")).unwrap();
        assert!(checked.warnings.contains(&LoadWarning::OlderVersion {
            found: 2,
            current: CURRENT_FORMAT_VERSION
        }));
        assert!(checked.warnings.contains(&LoadWarning::FeatureUnavailable {
            feature: Feature::SpawnedEntities,
            version: 2
        }));
        assert!(!checked.warnings.contains(&LoadWarning::FeatureUnavailable {
            feature: Feature::MetadataMedia,
            version: 2
        }));
    }

    #[test]
    fn test_sibling_signature_uses_its_own_party_layout() {
        let checked = decode(&header_bytes(b"DAO1", 4, "DragonAgeOrigins")).unwrap();
        assert_eq!(checked.variant, EngineVariant::DragonAgeOrigins);
        assert!(!checked.format.party_extensions);
        assert_eq!(checked.warnings.len(), 2);
    }

    #[test]
    fn test_unknown_engine_is_a_warning() {
        let checked = decode(&header_bytes(b"MES2", 4, "Frostbite")).unwrap();
        assert_eq!(
            checked.warnings,
            vec![LoadWarning::UnknownEngine {
                engine_id: "Frostbite".into()
            }]
        );
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            decode(b"MES2\x04\x00"),
            Err(SaveError::TruncatedStream {
                field: "header.format_version",
                ..
            })
        ));
    }
}
