// ---------------------------------------------------------------------------
// game – Full payload body: current area, globals, party, areas
// ---------------------------------------------------------------------------
//
// Layout:
//   current_area text
//   globals
//   party
//   areas list<area>

use serde::{Deserialize, Serialize};

use crate::area::AreaState;
use crate::codec::{SaveReader, SaveWriter};
use crate::globals::GlobalVariableTable;
use crate::party::PartyState;
use crate::save_error::SaveResult;
use crate::version::Format;

/// Smallest encoded area (see `AreaState::encode`).
const MIN_AREA_SIZE: usize = 4 + 4 + 9 * 4 + 4 + 20;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveGame {
    /// `area_ref` of the area the player is in.
    pub current_area: String,
    pub globals: GlobalVariableTable,
    pub party: PartyState,
    pub areas: Vec<AreaState>,
}

impl SaveGame {
    pub fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        w.write_text("game.current_area", &self.current_area)?;
        self.globals.encode(w)?;
        self.party.encode(w, format)?;
        w.write_list("game.areas", self.areas.iter(), |w, a| a.encode(w, format))
    }

    pub fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        Ok(Self {
            current_area: r.read_text("game.current_area")?,
            globals: GlobalVariableTable::decode(r)?,
            party: PartyState::decode(r, format)?,
            areas: r.read_list("game.areas", MIN_AREA_SIZE, |r| AreaState::decode(r, format))?,
        })
    }

    pub fn area(&self, area_ref: &str) -> Option<&AreaState> {
        self.areas.iter().find(|a| a.area_ref == area_ref)
    }

    pub fn current(&self) -> Option<&AreaState> {
        self.area(&self.current_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_game;

    #[test]
    fn test_game_roundtrip() {
        let game = sample_game();
        let format = Format::current(true);
        let mut w = SaveWriter::new();
        game.encode(&mut w, format).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        assert_eq!(SaveGame::decode(&mut r, format).unwrap(), game);
        assert!(r.is_at_end());
    }

    #[test]
    fn test_current_area_lookup() {
        let game = sample_game();
        assert_eq!(
            game.current().map(|a| a.area_ref.as_str()),
            Some(game.current_area.as_str())
        );
        assert!(game.area("nowhere").is_none());
    }

    #[test]
    fn test_min_area_size_matches_empty_area() {
        let mut w = SaveWriter::new();
        AreaState::default()
            .encode(&mut w, Format::new(3, false))
            .unwrap();
        assert_eq!(w.len(), MIN_AREA_SIZE);
    }
}
