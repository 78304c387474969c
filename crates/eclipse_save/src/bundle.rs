// ---------------------------------------------------------------------------
// bundle – Save bundle directory: header file, payload archive, aux files
// ---------------------------------------------------------------------------
//
// A bundle is one directory:
//   savenfo.res | savegame.nfo | header.dat   header + metadata (first hit)
//   save.das | save.sav | save.pcsave | save.erf   payload archive
//   DLC/*.dlc, physics.dat, morality.dat, romance.dat, missions.dat
//                                             optional per-feature files
//
// Writers always produce `savenfo.res` and `save.das`. Auxiliary files are
// owned by other systems; this module only locates and copies them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::atomic_write::atomic_write;
use crate::game::SaveGame;
use crate::metadata::SaveMetadata;
use crate::save_codec::SaveCodec;
use crate::save_error::{SaveError, SaveResult};
use crate::warning::LoadWarning;

/// Header file names, probed in order.
pub const HEADER_CANDIDATES: [&str; 3] = ["savenfo.res", "savegame.nfo", "header.dat"];

/// Payload archive stem and extensions, probed in order.
pub const PAYLOAD_STEM: &str = "save";
pub const PAYLOAD_EXTENSIONS: [&str; 4] = [".das", ".sav", ".pcsave", ".erf"];

/// Auxiliary per-feature files at the bundle root.
pub const AUX_FILES: [&str; 4] = ["physics.dat", "morality.dat", "romance.dat", "missions.dat"];

/// Directory holding one `.dlc` file per installed DLC.
pub const DLC_DIR: &str = "DLC";
pub const DLC_EXTENSION: &str = "dlc";

/// Names written by [`write_bundle`].
pub const HEADER_FILE: &str = HEADER_CANDIDATES[0];
pub const PAYLOAD_FILE: &str = "save.das";

/// A fully loaded bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSave {
    pub metadata: SaveMetadata,
    pub game: SaveGame,
    pub warnings: Vec<LoadWarning>,
}

/// First header candidate that exists as a file.
pub fn find_header_file(dir: &Path) -> Option<PathBuf> {
    HEADER_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// First payload candidate that exists as a file.
pub fn find_payload_file(dir: &Path) -> Option<PathBuf> {
    PAYLOAD_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{PAYLOAD_STEM}{ext}")))
        .find(|p| p.is_file())
}

/// Every auxiliary file present in the bundle, relative to `dir`.
pub fn aux_files(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = AUX_FILES
        .iter()
        .map(PathBuf::from)
        .filter(|rel| dir.join(rel).is_file())
        .collect();
    let mut dlc: Vec<PathBuf> = fs::read_dir(dir.join(DLC_DIR))
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == DLC_EXTENSION))
        .filter_map(|p| p.file_name().map(|n| Path::new(DLC_DIR).join(n)))
        .collect();
    dlc.sort();
    found.extend(dlc);
    found
}

fn not_found(dir: &Path, what: &str) -> SaveError {
    SaveError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no {what} in {}", dir.display()),
    ))
}

/// Write the header file and the payload archive.
///
/// Both files are stamped with `metadata.header`.
pub fn write_bundle(
    codec: &SaveCodec,
    dir: &Path,
    metadata: &SaveMetadata,
    game: &SaveGame,
) -> SaveResult<()> {
    let header_bytes = codec.encode_metadata(metadata)?;
    let payload_bytes = codec.encode_game(&metadata.header, game)?;

    // Payload first: a header file never points at a missing payload.
    atomic_write(&dir.join(PAYLOAD_FILE), &payload_bytes)?;
    atomic_write(&dir.join(HEADER_FILE), &header_bytes)?;

    info!(
        "Saved bundle {} ({} v{}, header {} bytes, payload {} bytes)",
        dir.display(),
        metadata.header.signature_lossy(),
        metadata.header.format_version,
        header_bytes.len(),
        payload_bytes.len()
    );
    Ok(())
}

/// Decode just the metadata, for save browsers.
pub fn read_metadata_only(
    codec: &SaveCodec,
    dir: &Path,
) -> SaveResult<(SaveMetadata, Vec<LoadWarning>)> {
    let path = find_header_file(dir).ok_or_else(|| not_found(dir, "header file"))?;
    let bytes = fs::read(&path)?;
    let decoded = codec.decode_metadata(&bytes)?;
    Ok((decoded.metadata, decoded.warnings))
}

/// Full load: metadata and payload.
pub fn read_bundle(codec: &SaveCodec, dir: &Path) -> SaveResult<LoadedSave> {
    let (metadata, mut warnings) = read_metadata_only(codec, dir)?;

    let payload_path = find_payload_file(dir).ok_or_else(|| not_found(dir, "payload archive"))?;
    let bytes = fs::read(&payload_path)?;
    let (game, payload_warnings) = codec.decode_game(&bytes)?;
    for w in payload_warnings {
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }

    for w in &warnings {
        warn!("Loading {}: {w}", dir.display());
    }
    info!(
        "Loaded bundle {} ({} areas, {} globals)",
        dir.display(),
        game.areas.len(),
        game.globals.len()
    );
    Ok(LoadedSave {
        metadata,
        game,
        warnings,
    })
}
