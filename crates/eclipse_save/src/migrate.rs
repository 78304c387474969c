// ---------------------------------------------------------------------------
// migrate – Bundle migration between format versions
// ---------------------------------------------------------------------------
//
// Same-title upgrades decode the source bundle, run the registry steps and
// write the result at the current version. Moving a save between titles
// needs per-field mapping tables between their data models; none exist, so
// that path is a hard `NotImplemented`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bundle::{aux_files, read_bundle, write_bundle};
use crate::compat::{classify_bundle, Verdict};
use crate::migrate_registry::{MigratingSave, MigrationRegistry, MigrationStep};
use crate::party::PartyExtensions;
use crate::profile::{EngineProfile, EngineVariant};
use crate::save_codec::SaveCodec;
use crate::save_error::{SaveError, SaveResult};
use crate::version::{CURRENT_FORMAT_VERSION, MIN_FORMAT_VERSION};

/// Outcome of [`migrate_bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success: bool,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Every version step from the oldest supported format to the current one.
///
/// Blocks a format predates decode as defaults, so most steps only bump
/// the version.
pub(crate) fn build_migration_registry() -> MigrationRegistry {
    let steps = vec![
        MigrationStep {
            from_version: 1,
            description: "v1 -> v2: screenshot/portrait, effect color flag, creature attributes",
            migrate_fn: |_save| {},
        },
        MigrationStep {
            from_version: 2,
            description: "v2 -> v3: relationship summaries, party extension block",
            migrate_fn: |save| {
                if save.variant.has_party_extensions() && save.game.party.extensions.is_none() {
                    save.game.party.extensions = Some(PartyExtensions::default());
                }
            },
        },
        MigrationStep {
            from_version: 3,
            description: "v3 -> v4: difficulty, DLC list, save kind, spawned entities",
            migrate_fn: |_save| {},
        },
    ];
    MigrationRegistry::new(steps, MIN_FORMAT_VERSION, CURRENT_FORMAT_VERSION)
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Migrate the bundle at `source` into `destination` for `target`.
///
/// Returns `Ok` with `success == false` when the source cannot be
/// migrated (too new, unreadable, corrupt). Returns
/// `Err(NotImplemented)` when `target` is a different title than the
/// source; `Err` for I/O failures on the destination.
pub fn migrate_bundle(
    source: &Path,
    destination: &Path,
    target: EngineVariant,
) -> SaveResult<MigrationResult> {
    let profile = EngineProfile::for_variant(target);
    let mut result = MigrationResult::default();

    let report = classify_bundle(source, &profile);
    result.warnings.extend(report.warnings.iter().cloned());
    result.notes.extend(report.notes.iter().cloned());
    if matches!(
        report.verdict,
        Verdict::Incompatible | Verdict::RequiresMigration
    ) {
        result.errors.extend(report.errors);
        warn!(
            "Cannot migrate {}: {:?}",
            source.display(),
            report.verdict
        );
        return Ok(result);
    }

    let source_variant = report.header.as_ref().and_then(|h| h.variant());
    if source_variant != Some(target) {
        return Err(SaveError::NotImplemented("cross-title save migration"));
    }

    let codec = SaveCodec::new(profile);
    let loaded = match read_bundle(&codec, source) {
        Ok(loaded) => loaded,
        Err(e) => {
            result.errors.push(e.to_string());
            warn!("Cannot migrate {}: {e}", source.display());
            return Ok(result);
        }
    };

    let mut save = MigratingSave {
        metadata: loaded.metadata,
        game: loaded.game,
        variant: target,
    };
    let migration = build_migration_registry().migrate(&mut save)?;
    if migration.steps_applied == 0 {
        result
            .notes
            .push(format!("already at v{}", migration.final_version));
    }
    result
        .notes
        .extend(migration.step_descriptions.iter().map(|d| d.to_string()));

    save.metadata.header = codec.header();
    write_bundle(&codec, destination, &save.metadata, &save.game)?;

    if !same_path(source, destination) {
        for rel in aux_files(source) {
            let to = destination.join(&rel);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source.join(&rel), &to)?;
            result.notes.push(format!("copied {}", rel.display()));
        }
    }

    info!(
        "Migrated {} -> {} (v{} -> v{}, {} steps)",
        source.display(),
        destination.display(),
        migration.original_version,
        migration.final_version,
        migration.steps_applied
    );
    result.success = true;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{HEADER_FILE, PAYLOAD_FILE};
    use crate::fixtures::{sample_game, sample_metadata};

    fn write_source(dir: &Path, version: u32) {
        let codec = SaveCodec::default();
        let mut meta = sample_metadata();
        meta.header.format_version = version;
        let mut game = sample_game();
        if version < 3 {
            game.party.extensions = None;
        }
        write_bundle(&codec, dir, &meta, &game).unwrap();
    }

    #[test]
    fn test_upgrades_v2_bundle_to_current() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_source(src.path(), 2);
        fs::write(src.path().join("morality.dat"), b"paragon").unwrap();

        let result = migrate_bundle(src.path(), dst.path(), EngineVariant::MassEffect2).unwrap();
        assert!(result.success, "{result:?}");
        assert!(result.errors.is_empty());
        assert_eq!(
            result.notes.iter().filter(|n| n.starts_with("v")).count(),
            2
        );
        assert!(result.notes.iter().any(|n| n == "copied morality.dat"));
        assert_eq!(
            fs::read(dst.path().join("morality.dat")).unwrap(),
            b"paragon"
        );

        let loaded = read_bundle(&SaveCodec::default(), dst.path()).unwrap();
        assert_eq!(loaded.metadata.header.format_version, CURRENT_FORMAT_VERSION);
        assert!(loaded.warnings.is_empty());
        assert_eq!(
            loaded.game.party.extensions,
            Some(PartyExtensions::default())
        );
    }

    #[test]
    fn test_current_bundle_is_copied_through() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_source(src.path(), CURRENT_FORMAT_VERSION);

        let result = migrate_bundle(src.path(), dst.path(), EngineVariant::MassEffect2).unwrap();
        assert!(result.success);
        assert!(result.notes.iter().any(|n| n.starts_with("already at")));
        assert!(dst.path().join(HEADER_FILE).is_file());
        assert!(dst.path().join(PAYLOAD_FILE).is_file());
    }

    #[test]
    fn test_future_version_fails_without_writing() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_source(src.path(), 7);

        let result = migrate_bundle(src.path(), dst.path(), EngineVariant::MassEffect2).unwrap();
        assert!(!result.success);
        assert!(!result.errors.is_empty());
        assert!(!dst.path().join(HEADER_FILE).exists());
    }

    #[test]
    fn test_missing_source_fails() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let result = migrate_bundle(src.path(), dst.path(), EngineVariant::MassEffect2).unwrap();
        assert!(!result.success);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn test_cross_title_is_not_implemented() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_source(src.path(), CURRENT_FORMAT_VERSION);
        assert!(matches!(
            migrate_bundle(src.path(), dst.path(), EngineVariant::DragonAge2),
            Err(SaveError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_corrupt_payload_fails() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_source(src.path(), 3);
        fs::write(src.path().join(PAYLOAD_FILE), b"MES2 but not really").unwrap();

        let result = migrate_bundle(src.path(), dst.path(), EngineVariant::MassEffect2).unwrap();
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
    }
}
