// ---------------------------------------------------------------------------
// metadata – Save-browser summary stored after the header
// ---------------------------------------------------------------------------
//
// Body layout, after the header:
//   v1: save_name text, area_name text, time_played_seconds u32,
//       timestamp i64 (unix seconds), player_name text
//   v2: screenshot blob, portrait blob
//   v3: morality_score i32, romance / approval / mission entry lists
//       (each entry: name text, value i32)
//   v4: difficulty i32, dlc_entries list<text>, save_kind u32,
//       cheat_used bool, save_number i32
//
// A load screen reads this without touching the payload archive.

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::header::SaveHeader;
use crate::save_error::{SaveError, SaveResult};
use crate::version::{Feature, Format};

/// Ordered (name, value) pair in the relationship and mission summaries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: i32,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveKind {
    #[default]
    Manual,
    Quick,
    Auto,
    /// End-of-game export meant to be imported by a sequel.
    Export,
}

impl SaveKind {
    pub fn to_u32(self) -> u32 {
        match self {
            SaveKind::Manual => 0,
            SaveKind::Quick => 1,
            SaveKind::Auto => 2,
            SaveKind::Export => 3,
        }
    }

    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(SaveKind::Manual),
            1 => Some(SaveKind::Quick),
            2 => Some(SaveKind::Auto),
            3 => Some(SaveKind::Export),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub header: SaveHeader,
    pub save_name: String,
    pub area_name: String,
    pub time_played_seconds: u32,
    /// Unix seconds.
    pub timestamp: i64,
    pub screenshot: Option<Vec<u8>>,
    pub portrait: Option<Vec<u8>>,
    pub player_name: String,
    pub morality_score: i32,
    pub romance_entries: Vec<NamedValue>,
    pub approval_entries: Vec<NamedValue>,
    pub mission_entries: Vec<NamedValue>,
    pub difficulty: i32,
    pub dlc_entries: Vec<String>,
    pub save_kind: SaveKind,
    pub cheat_used: bool,
    pub save_number: i32,
}

fn write_entries(w: &mut SaveWriter, field: &'static str, entries: &[NamedValue]) -> SaveResult<()> {
    w.write_list(field, entries.iter(), |w, e| {
        w.write_text(field, &e.name)?;
        w.write_i32(e.value);
        Ok(())
    })
}

fn read_entries(r: &mut SaveReader<'_>, field: &'static str) -> SaveResult<Vec<NamedValue>> {
    r.read_list(field, 8, |r| {
        Ok(NamedValue {
            name: r.read_text(field)?,
            value: r.read_i32(field)?,
        })
    })
}

impl SaveMetadata {
    /// Body only; the header is written by the caller.
    pub fn encode_body(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        w.write_text("meta.save_name", &self.save_name)?;
        w.write_text("meta.area_name", &self.area_name)?;
        w.write_u32(self.time_played_seconds);
        w.write_i64(self.timestamp);
        w.write_text("meta.player_name", &self.player_name)?;

        if format.supports(Feature::MetadataMedia) {
            w.write_blob("meta.screenshot", self.screenshot.as_deref())?;
            w.write_blob("meta.portrait", self.portrait.as_deref())?;
        }

        if format.supports(Feature::RelationshipSummaries) {
            w.write_i32(self.morality_score);
            write_entries(w, "meta.romance", &self.romance_entries)?;
            write_entries(w, "meta.approval", &self.approval_entries)?;
            write_entries(w, "meta.missions", &self.mission_entries)?;
        }

        if format.supports(Feature::SessionInfo) {
            w.write_i32(self.difficulty);
            w.write_list("meta.dlc", self.dlc_entries.iter(), |w, d| {
                w.write_text("meta.dlc", d)
            })?;
            w.write_u32(self.save_kind.to_u32());
            w.write_bool(self.cheat_used);
            w.write_i32(self.save_number);
        }
        Ok(())
    }

    /// Body only. Blocks the format predates keep their defaults.
    pub fn decode_body(
        r: &mut SaveReader<'_>,
        header: SaveHeader,
        format: Format,
    ) -> SaveResult<Self> {
        let mut meta = SaveMetadata {
            header,
            save_name: r.read_text("meta.save_name")?,
            area_name: r.read_text("meta.area_name")?,
            time_played_seconds: r.read_u32("meta.time_played_seconds")?,
            timestamp: r.read_i64("meta.timestamp")?,
            player_name: r.read_text("meta.player_name")?,
            ..Default::default()
        };

        if format.supports(Feature::MetadataMedia) {
            meta.screenshot = r.read_blob("meta.screenshot")?;
            meta.portrait = r.read_blob("meta.portrait")?;
        }

        if format.supports(Feature::RelationshipSummaries) {
            meta.morality_score = r.read_i32("meta.morality_score")?;
            meta.romance_entries = read_entries(r, "meta.romance")?;
            meta.approval_entries = read_entries(r, "meta.approval")?;
            meta.mission_entries = read_entries(r, "meta.missions")?;
        }

        if format.supports(Feature::SessionInfo) {
            meta.difficulty = r.read_i32("meta.difficulty")?;
            meta.dlc_entries = r.read_list("meta.dlc", 4, |r| r.read_text("meta.dlc"))?;
            let offset = r.position();
            let kind = r.read_u32("meta.save_kind")?;
            meta.save_kind = SaveKind::from_u32(kind).ok_or(SaveError::UnknownDiscriminant {
                field: "meta.save_kind",
                offset,
                value: kind,
            })?;
            meta.cheat_used = r.read_bool("meta.cheat_used")?;
            meta.save_number = r.read_i32("meta.save_number")?;
        }
        Ok(meta)
    }
}
