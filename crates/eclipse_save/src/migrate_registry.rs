// ---------------------------------------------------------------------------
// Format migration registry: validated chain of single-version steps
// ---------------------------------------------------------------------------
//
// Each step upgrades a decoded save from version N to N+1 in memory. The
// registry checks at construction that the steps cover every version from
// the oldest supported one up to the current one, with no gaps or
// duplicates.

use std::collections::HashSet;

use crate::game::SaveGame;
use crate::metadata::SaveMetadata;
use crate::profile::EngineVariant;
use crate::save_error::{SaveError, SaveResult};

/// A decoded save on its way to the current format. The version lives in
/// `metadata.header.format_version`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MigratingSave {
    pub metadata: SaveMetadata,
    pub game: SaveGame,
    pub variant: EngineVariant,
}

impl MigratingSave {
    pub fn version(&self) -> u32 {
        self.metadata.header.format_version
    }
}

pub(crate) struct MigrationStep {
    pub from_version: u32,
    pub description: &'static str,
    pub migrate_fn: fn(&mut MigratingSave),
}

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub original_version: u32,
    pub final_version: u32,
    pub steps_applied: u32,
    pub step_descriptions: Vec<&'static str>,
}

pub(crate) struct MigrationRegistry {
    steps: Vec<MigrationStep>,
    min_version: u32,
    current_version: u32,
}

impl MigrationRegistry {
    /// # Panics
    ///
    /// Panics if two steps share a `from_version`, or if any version in
    /// `min_version..current_version` has no step.
    pub fn new(mut steps: Vec<MigrationStep>, min_version: u32, current_version: u32) -> Self {
        let mut seen = HashSet::new();
        for step in &steps {
            assert!(
                seen.insert(step.from_version),
                "Duplicate migration step for version {}",
                step.from_version
            );
        }
        for v in min_version..current_version {
            assert!(
                seen.contains(&v),
                "Missing migration step from v{} to v{}",
                v,
                v + 1
            );
        }
        steps.sort_by_key(|s| s.from_version);
        Self {
            steps,
            min_version,
            current_version,
        }
    }

    pub fn migrate(&self, save: &mut MigratingSave) -> SaveResult<MigrationReport> {
        let original_version = save.version();
        if original_version > self.current_version {
            return Err(SaveError::VersionTooNew {
                found: original_version,
                max: self.current_version,
            });
        }
        if original_version < self.min_version {
            return Err(SaveError::VersionUnsupported {
                found: original_version,
                min: self.min_version,
                max: self.current_version,
            });
        }

        let mut report = MigrationReport {
            original_version,
            final_version: original_version,
            steps_applied: 0,
            step_descriptions: Vec::new(),
        };
        for step in &self.steps {
            if save.version() >= self.current_version {
                break;
            }
            if step.from_version == save.version() {
                (step.migrate_fn)(save);
                save.metadata.header.format_version = step.from_version + 1;
                report.steps_applied += 1;
                report.step_descriptions.push(step.description);
            }
        }
        report.final_version = save.version();
        Ok(report)
    }

    #[cfg(test)]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
