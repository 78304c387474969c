// ---------------------------------------------------------------------------
// compat – Compatibility classifier for on-disk bundles
// ---------------------------------------------------------------------------
//
// Reads only the header prefix of the header file, then checks that the
// payload archive and auxiliary files exist and are non-empty. The body is
// never decoded. Problems accumulate into the report; only header-level
// problems make a bundle Incompatible.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bundle::{find_header_file, find_payload_file, AUX_FILES, DLC_DIR, DLC_EXTENSION};
use crate::codec::SaveReader;
use crate::header::{SaveHeader, MAX_HEADER_LEN};
use crate::profile::EngineProfile;
use crate::save_error::SaveError;

/// Coarse verdict, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Verdict {
    #[default]
    Compatible,
    CompatibleWithWarnings,
    RequiresMigration,
    Incompatible,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub verdict: Verdict,
    /// Present when the header passed validation.
    pub header: Option<SaveHeader>,
    pub header_file: Option<PathBuf>,
    pub payload_file: Option<PathBuf>,
    /// Informational findings that do not affect the verdict.
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CompatibilityReport {
    fn escalate(&mut self, verdict: Verdict) {
        self.verdict = self.verdict.max(verdict);
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
        self.escalate(Verdict::CompatibleWithWarnings);
    }

    fn fail(&mut self, verdict: Verdict, message: String) {
        self.errors.push(message);
        self.escalate(verdict);
    }

    pub fn is_loadable(&self) -> bool {
        self.verdict <= Verdict::CompatibleWithWarnings
    }
}

/// Read at most the longest possible header from the front of `path`.
fn read_header_prefix(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    File::open(path)?
        .take(MAX_HEADER_LEN as u64)
        .read_to_end(&mut buf)?;
    Ok(buf)
}

fn classify_header(report: &mut CompatibilityReport, path: &Path, profile: &EngineProfile) {
    let prefix = match read_header_prefix(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            report.fail(
                Verdict::Incompatible,
                format!("cannot read {}: {e}", path.display()),
            );
            return;
        }
    };

    match SaveHeader::decode(&mut SaveReader::new(&prefix), profile) {
        Ok(checked) => {
            for w in &checked.warnings {
                report.warn(w.to_string());
            }
            report.header = Some(checked.header);
        }
        Err(e @ SaveError::VersionTooNew { .. }) => {
            report.fail(Verdict::RequiresMigration, e.to_string());
        }
        Err(e) => report.fail(Verdict::Incompatible, e.to_string()),
    }
}

fn probe_file(report: &mut CompatibilityReport, path: &Path, label: &str) {
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => report.warn(format!("{label} is empty")),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            report.notes.push(format!("{label} not present"));
        }
        Err(e) => report.warn(format!("{label} unreadable: {e}")),
    }
}

fn probe_aux(report: &mut CompatibilityReport, dir: &Path) {
    for name in AUX_FILES {
        probe_file(report, &dir.join(name), name);
    }

    let dlc_dir = dir.join(DLC_DIR);
    let entries = match fs::read_dir(&dlc_dir) {
        Ok(entries) => entries,
        Err(_) => {
            report.notes.push(format!("{DLC_DIR}/ not present"));
            return;
        }
    };
    let mut dlc: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == DLC_EXTENSION))
        .collect();
    dlc.sort();
    if dlc.is_empty() {
        report.notes.push(format!("{DLC_DIR}/ has no .{DLC_EXTENSION} files"));
    }
    for path in dlc {
        let label = path
            .file_name()
            .map(|n| format!("{DLC_DIR}/{}", n.to_string_lossy()))
            .unwrap_or_else(|| DLC_DIR.to_string());
        probe_file(report, &path, &label);
    }
}

/// Judge whether the bundle in `dir` can be loaded with `profile`.
///
/// Never fails: every problem ends up in the report.
pub fn classify_bundle(dir: &Path, profile: &EngineProfile) -> CompatibilityReport {
    let mut report = CompatibilityReport::default();

    match find_header_file(dir) {
        Some(path) => {
            classify_header(&mut report, &path, profile);
            report.header_file = Some(path);
        }
        None => report.fail(
            Verdict::Incompatible,
            format!("no header file in {}", dir.display()),
        ),
    }

    match find_payload_file(dir) {
        Some(path) => {
            probe_file(&mut report, &path, "payload archive");
            report.payload_file = Some(path);
        }
        None => report.warn("payload archive not found".to_string()),
    }

    probe_aux(&mut report, dir);

    for note in &report.notes {
        debug!("{}: {note}", dir.display());
    }
    info!(
        "Classified bundle {}: {:?} ({} warnings, {} errors)",
        dir.display(),
        report.verdict,
        report.warnings.len(),
        report.errors.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SaveWriter;

    fn write_header(dir: &Path, sig: &[u8; 4], version: u32, engine: &str) {
        let mut w = SaveWriter::new();
        SaveHeader {
            signature: *sig,
            format_version: version,
            engine_id: engine.to_string(),
        }
        .encode(&mut w)
        .unwrap();
        fs::write(dir.join("savenfo.res"), w.as_bytes()).unwrap();
    }

    fn classify(dir: &Path) -> CompatibilityReport {
        classify_bundle(dir, &EngineProfile::default())
    }

    #[test]
    fn test_verdict_order() {
        assert!(Verdict::Compatible < Verdict::CompatibleWithWarnings);
        assert!(Verdict::CompatibleWithWarnings < Verdict::RequiresMigration);
        assert!(Verdict::RequiresMigration < Verdict::Incompatible);
    }

    #[test]
    fn test_empty_dir_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::Incompatible);
        assert!(report.header.is_none());
        assert!(!report.is_loadable());
    }

    #[test]
    fn test_header_without_payload_warns() {
        let dir = tempfile::tempdir().unwrap();
        write_header(dir.path(), b"MES2", 4, "Eclipse");
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::CompatibleWithWarnings);
        assert!(report.warnings.iter().any(|w| w.contains("payload")));
    }

    #[test]
    fn test_missing_aux_files_are_notes_only() {
        let dir = tempfile::tempdir().unwrap();
        write_header(dir.path(), b"MES2", 4, "Eclipse");
        fs::write(dir.path().join("save.pcsave"), b"payload").unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::Compatible);
        assert_eq!(report.payload_file, Some(dir.path().join("save.pcsave")));
        assert!(report.notes.iter().any(|n| n.contains("physics.dat")));
        assert!(report.is_loadable());
    }

    #[test]
    fn test_empty_aux_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        write_header(dir.path(), b"MES2", 4, "Eclipse");
        fs::write(dir.path().join("save.das"), b"payload").unwrap();
        fs::write(dir.path().join("romance.dat"), b"").unwrap();
        fs::create_dir(dir.path().join("DLC")).unwrap();
        fs::write(dir.path().join("DLC/kasumi.dlc"), b"").unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::CompatibleWithWarnings);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_future_version_requires_migration() {
        let dir = tempfile::tempdir().unwrap();
        write_header(dir.path(), b"MES2", 7, "Eclipse");
        fs::write(dir.path().join("save.das"), b"payload").unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::RequiresMigration);
    }

    #[test]
    fn test_unknown_signature_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        write_header(dir.path(), b"XXXX", 4, "Eclipse");
        fs::write(dir.path().join("save.das"), b"payload").unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::Incompatible);
        assert!(report.header.is_none());
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_truncated_header_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("header.dat"), b"ME").unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::Incompatible);
        assert_eq!(report.header_file, Some(dir.path().join("header.dat")));
    }

    #[test]
    fn test_cross_variant_engine_warns() {
        let dir = tempfile::tempdir().unwrap();
        write_header(dir.path(), b"MES2", 4, "MassEffect");
        fs::write(dir.path().join("save.das"), b"payload").unwrap();
        let report = classify(dir.path());
        assert_eq!(report.verdict, Verdict::CompatibleWithWarnings);
        assert!(report.header.is_some());
    }

    #[test]
    fn test_header_prefix_read_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savenfo.res");
        fs::write(&path, vec![0u8; MAX_HEADER_LEN + 4096]).unwrap();
        assert_eq!(read_header_prefix(&path).unwrap().len(), MAX_HEADER_LEN);
    }
}
