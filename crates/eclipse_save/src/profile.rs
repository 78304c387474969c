// ---------------------------------------------------------------------------
// profile – Per-title codec configuration and the engine compatibility table
// ---------------------------------------------------------------------------
//
// One EngineProfile per supported title. It replaces a process-wide version
// constant, so saves for several titles can be handled side by side.

use serde::{Deserialize, Serialize};

use crate::save_error::{SaveError, SaveResult};
use crate::version::{Format, CURRENT_FORMAT_VERSION, MIN_FORMAT_VERSION};

/// Titles that share the Eclipse save codec family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineVariant {
    DragonAgeOrigins,
    DragonAge2,
    MassEffect,
    MassEffect2,
}

impl EngineVariant {
    pub const ALL: [EngineVariant; 4] = [
        EngineVariant::DragonAgeOrigins,
        EngineVariant::DragonAge2,
        EngineVariant::MassEffect,
        EngineVariant::MassEffect2,
    ];

    pub fn signature(self) -> [u8; 4] {
        match self {
            EngineVariant::DragonAgeOrigins => *b"DAO1",
            EngineVariant::DragonAge2 => *b"DAO2",
            EngineVariant::MassEffect => *b"MES1",
            EngineVariant::MassEffect2 => *b"MES2",
        }
    }

    pub fn from_signature(signature: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.signature() == signature)
    }

    /// Variant-specific engine id. Tools may also write the family id
    /// [`ECLIPSE_ENGINE_ID`].
    pub fn engine_id(self) -> &'static str {
        match self {
            EngineVariant::DragonAgeOrigins => "DragonAgeOrigins",
            EngineVariant::DragonAge2 => "DragonAge2",
            EngineVariant::MassEffect => "MassEffect",
            EngineVariant::MassEffect2 => "MassEffect2",
        }
    }

    /// Titles with squad mechanics carry the party extension block.
    pub fn has_party_extensions(self) -> bool {
        matches!(
            self,
            EngineVariant::DragonAge2 | EngineVariant::MassEffect | EngineVariant::MassEffect2
        )
    }
}

/// Family-wide engine id.
pub const ECLIPSE_ENGINE_ID: &str = "Eclipse";

/// Engine families an engine id can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    Eclipse,
    Odyssey,
    Aurora,
    Infinity,
}

/// Result of checking a stream's engine id against a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCompat {
    /// Same title, the family id, or no id at all.
    Exact,
    /// A sibling title of the same family.
    KnownVariant(EngineVariant),
    /// Not in the table; accepted with a warning.
    Unknown,
}

/// Map an engine id to its family and, for Eclipse ids, the title.
pub fn identify_engine(engine_id: &str) -> Option<(EngineFamily, Option<EngineVariant>)> {
    if engine_id.eq_ignore_ascii_case(ECLIPSE_ENGINE_ID) {
        return Some((EngineFamily::Eclipse, None));
    }
    if let Some(v) = EngineVariant::ALL
        .into_iter()
        .find(|v| v.engine_id().eq_ignore_ascii_case(engine_id))
    {
        return Some((EngineFamily::Eclipse, Some(v)));
    }
    const FOREIGN: [(&str, EngineFamily); 3] = [
        ("Odyssey", EngineFamily::Odyssey),
        ("Aurora", EngineFamily::Aurora),
        ("Infinity", EngineFamily::Infinity),
    ];
    FOREIGN
        .into_iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(engine_id))
        .map(|(_, family)| (family, None))
}

/// Codec configuration for one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineProfile {
    pub variant: EngineVariant,
    /// Engine id written into headers.
    pub engine_id: String,
    /// Version new saves are written with.
    pub current_version: u32,
    /// Oldest version accepted on load.
    pub min_version: u32,
    /// Whether the party extension block exists for this title.
    pub party_extensions: bool,
    /// LZ4-compress the payload archive body.
    pub compress_payload: bool,
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::for_variant(EngineVariant::MassEffect2)
    }
}

impl EngineProfile {
    pub fn for_variant(variant: EngineVariant) -> Self {
        Self {
            variant,
            engine_id: ECLIPSE_ENGINE_ID.to_string(),
            current_version: CURRENT_FORMAT_VERSION,
            min_version: MIN_FORMAT_VERSION,
            party_extensions: variant.has_party_extensions(),
            compress_payload: true,
        }
    }

    /// Parse and validate a tool-supplied profile.
    pub fn from_json(json: &str) -> SaveResult<Self> {
        let profile: EngineProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> SaveResult<()> {
        if self.min_version < MIN_FORMAT_VERSION {
            return Err(SaveError::Config(format!(
                "min_version {} is below the oldest known format v{MIN_FORMAT_VERSION}",
                self.min_version
            )));
        }
        if self.current_version > CURRENT_FORMAT_VERSION {
            return Err(SaveError::Config(format!(
                "current_version {} is newer than this codec (v{CURRENT_FORMAT_VERSION})",
                self.current_version
            )));
        }
        if self.min_version > self.current_version {
            return Err(SaveError::Config(format!(
                "min_version {} exceeds current_version {}",
                self.min_version, self.current_version
            )));
        }
        if self.engine_id.len() > crate::codec::MAX_TEXT_LEN as usize {
            return Err(SaveError::Config("engine_id is too long".to_string()));
        }
        Ok(())
    }

    pub fn signature(&self) -> [u8; 4] {
        self.variant.signature()
    }

    /// Layout used when writing.
    pub fn write_format(&self) -> Format {
        Format::new(self.current_version, self.party_extensions)
    }

    /// Layout for reading a stream stamped with `version`.
    pub fn read_format(&self, version: u32) -> Format {
        Format::new(version, self.party_extensions)
    }

    /// Layout of a stream written by `variant` at `version`. A sibling
    /// title's stream uses that title's own party layout.
    pub fn format_for(&self, variant: EngineVariant, version: u32) -> Format {
        if variant == self.variant {
            self.read_format(version)
        } else {
            Format::new(version, variant.has_party_extensions())
        }
    }

    /// Check an engine id read from a stream against this profile.
    pub fn engine_compat(&self, engine_id: &str) -> SaveResult<EngineCompat> {
        if engine_id.is_empty() || engine_id.eq_ignore_ascii_case(&self.engine_id) {
            return Ok(EngineCompat::Exact);
        }
        match identify_engine(engine_id) {
            Some((EngineFamily::Eclipse, None)) => Ok(EngineCompat::Exact),
            Some((EngineFamily::Eclipse, Some(v))) if v == self.variant => Ok(EngineCompat::Exact),
            Some((EngineFamily::Eclipse, Some(v))) => Ok(EngineCompat::KnownVariant(v)),
            Some((_, _)) => Err(SaveError::EngineMismatch {
                found: engine_id.to_string(),
                expected: self.engine_id.clone(),
            }),
            None => Ok(EngineCompat::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures_are_unique_per_variant() {
        for v in EngineVariant::ALL {
            assert_eq!(EngineVariant::from_signature(v.signature()), Some(v));
        }
        assert_eq!(EngineVariant::from_signature(*b"XXXX"), None);
    }

    #[test]
    fn test_engine_compat_table() {
        let profile = EngineProfile::for_variant(EngineVariant::MassEffect2);
        assert_eq!(profile.engine_compat("").unwrap(), EngineCompat::Exact);
        assert_eq!(profile.engine_compat("Eclipse").unwrap(), EngineCompat::Exact);
        assert_eq!(profile.engine_compat("eclipse").unwrap(), EngineCompat::Exact);
        assert_eq!(
            profile.engine_compat("MassEffect2").unwrap(),
            EngineCompat::Exact
        );
        assert_eq!(
            profile.engine_compat("DragonAge2").unwrap(),
            EngineCompat::KnownVariant(EngineVariant::DragonAge2)
        );
        assert_eq!(
            profile.engine_compat("Frostbite").unwrap(),
            EngineCompat::Unknown
        );
        assert!(matches!(
            profile.engine_compat("Odyssey"),
            Err(SaveError::EngineMismatch { .. })
        ));
    }

    #[test]
    fn test_profile_from_json_fills_defaults() {
        let profile =
            EngineProfile::from_json(r#"{ "variant": "DragonAgeOrigins", "current_version": 3 }"#)
                .unwrap();
        assert_eq!(profile.variant, EngineVariant::DragonAgeOrigins);
        assert_eq!(profile.current_version, 3);
        assert_eq!(profile.engine_id, ECLIPSE_ENGINE_ID);
    }

    #[test]
    fn test_profile_rejects_future_version() {
        let json = format!(r#"{{ "current_version": {} }}"#, CURRENT_FORMAT_VERSION + 1);
        assert!(matches!(
            EngineProfile::from_json(&json),
            Err(SaveError::Config(_))
        ));
    }

    #[test]
    fn test_profile_rejects_inverted_range() {
        let json = r#"{ "current_version": 2, "min_version": 3 }"#;
        assert!(matches!(
            EngineProfile::from_json(json),
            Err(SaveError::Config(_))
        ));
    }

    #[test]
    fn test_party_extension_default_follows_variant() {
        assert!(!EngineProfile::for_variant(EngineVariant::DragonAgeOrigins).party_extensions);
        assert!(EngineProfile::for_variant(EngineVariant::MassEffect2).party_extensions);
    }
}
