// ---------------------------------------------------------------------------
// save_codec – Profile-bound entry point for in-memory encode/decode
// ---------------------------------------------------------------------------
//
// A SaveCodec owns one EngineProfile. Several codecs for different titles
// can live side by side; nothing here is global.

use crate::codec::{SaveReader, SaveWriter};
use crate::game::SaveGame;
use crate::header::SaveHeader;
use crate::metadata::SaveMetadata;
use crate::payload;
use crate::profile::EngineProfile;
use crate::save_error::SaveResult;
use crate::version::Format;
use crate::warning::LoadWarning;

/// Metadata decoded from a header file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMetadata {
    pub metadata: SaveMetadata,
    pub format: Format,
    pub warnings: Vec<LoadWarning>,
}

#[derive(Debug, Clone)]
pub struct SaveCodec {
    profile: EngineProfile,
}

impl SaveCodec {
    pub fn new(profile: EngineProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    /// Header new saves are stamped with.
    pub fn header(&self) -> SaveHeader {
        SaveHeader::for_profile(&self.profile)
    }

    /// Encode the header file contents. The layout follows
    /// `metadata.header.format_version`, so older revisions can be written
    /// too.
    pub fn encode_metadata(&self, metadata: &SaveMetadata) -> SaveResult<Vec<u8>> {
        let mut w = SaveWriter::with_capacity(256);
        metadata.header.encode(&mut w)?;
        metadata.encode_body(&mut w, self.format_for(&metadata.header))?;
        Ok(w.into_bytes())
    }

    pub fn decode_metadata(&self, bytes: &[u8]) -> SaveResult<DecodedMetadata> {
        let mut r = SaveReader::new(bytes);
        let checked = SaveHeader::decode(&mut r, &self.profile)?;
        let metadata = SaveMetadata::decode_body(&mut r, checked.header, checked.format)?;
        Ok(DecodedMetadata {
            metadata,
            format: checked.format,
            warnings: checked.warnings,
        })
    }

    /// Encode the payload archive contents under `header`.
    pub fn encode_game(&self, header: &SaveHeader, game: &SaveGame) -> SaveResult<Vec<u8>> {
        payload::encode_archive(
            header,
            game,
            self.format_for(header),
            self.profile.compress_payload,
        )
    }

    pub fn decode_game(&self, bytes: &[u8]) -> SaveResult<(SaveGame, Vec<LoadWarning>)> {
        payload::decode_archive(bytes, &self.profile)
    }

    /// Layout of a body written under `header`.
    fn format_for(&self, header: &SaveHeader) -> Format {
        let variant = header.variant().unwrap_or(self.profile.variant);
        self.profile.format_for(variant, header.format_version)
    }
}

impl Default for SaveCodec {
    fn default() -> Self {
        Self::new(EngineProfile::default())
    }
}
