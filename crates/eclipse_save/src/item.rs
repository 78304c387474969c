// ---------------------------------------------------------------------------
// item – Item records and the fixed nine-slot equipment block
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::save_error::SaveResult;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemState {
    pub template: String,
    pub stack_size: i32,
    pub charges: i32,
    pub identified: bool,
    pub upgrades: Vec<String>,
}

impl ItemState {
    /// Empty template + stack + charges + flag + empty upgrade list.
    pub(crate) const MIN_ENCODED_SIZE: usize = 20;

    pub fn encode(&self, w: &mut SaveWriter) -> SaveResult<()> {
        w.write_text("item.template", &self.template)?;
        w.write_i32(self.stack_size);
        w.write_i32(self.charges);
        w.write_bool(self.identified);
        w.write_list("item.upgrades", self.upgrades.iter(), |w, u| {
            w.write_text("item.upgrade", u)
        })
    }

    pub fn decode(r: &mut SaveReader<'_>) -> SaveResult<Self> {
        Ok(Self {
            template: r.read_text("item.template")?,
            stack_size: r.read_i32("item.stack_size")?,
            charges: r.read_i32("item.charges")?,
            identified: r.read_bool("item.identified")?,
            upgrades: r.read_list("item.upgrades", 4, |r| r.read_text("item.upgrade"))?,
        })
    }
}

/// Equipped items. Slot identity is structural, so this is a fixed record
/// rather than a map; each slot is a presence flag plus an item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquipmentState {
    pub head: Option<ItemState>,
    pub armor: Option<ItemState>,
    pub gloves: Option<ItemState>,
    pub main_hand: Option<ItemState>,
    pub off_hand: Option<ItemState>,
    pub belt: Option<ItemState>,
    pub implant: Option<ItemState>,
    pub left_arm: Option<ItemState>,
    pub right_arm: Option<ItemState>,
}

impl EquipmentState {
    pub const SLOT_COUNT: usize = 9;

    /// Slots in wire order.
    pub fn slots(&self) -> [&Option<ItemState>; Self::SLOT_COUNT] {
        [
            &self.head,
            &self.armor,
            &self.gloves,
            &self.main_hand,
            &self.off_hand,
            &self.belt,
            &self.implant,
            &self.left_arm,
            &self.right_arm,
        ]
    }

    fn slots_mut(&mut self) -> [&mut Option<ItemState>; Self::SLOT_COUNT] {
        [
            &mut self.head,
            &mut self.armor,
            &mut self.gloves,
            &mut self.main_hand,
            &mut self.off_hand,
            &mut self.belt,
            &mut self.implant,
            &mut self.left_arm,
            &mut self.right_arm,
        ]
    }

    pub fn equipped_count(&self) -> usize {
        self.slots().iter().filter(|s| s.is_some()).count()
    }

    pub fn encode(&self, w: &mut SaveWriter) -> SaveResult<()> {
        for slot in self.slots() {
            w.write_optional(slot.as_ref(), |w, item| item.encode(w))?;
        }
        Ok(())
    }

    pub fn decode(r: &mut SaveReader<'_>) -> SaveResult<Self> {
        let mut equipment = EquipmentState::default();
        for slot in equipment.slots_mut() {
            *slot = r.read_optional("equipment.slot", ItemState::decode)?;
        }
        Ok(equipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rifle() -> ItemState {
        ItemState {
            template: "wpn_assault_rifle".into(),
            stack_size: 1,
            charges: -1,
            identified: true,
            upgrades: vec!["upg_piercing".into(), "upg_heat_sink".into()],
        }
    }

    #[test]
    fn test_empty_item_is_min_encoded_size() {
        let mut w = SaveWriter::new();
        ItemState::default().encode(&mut w).unwrap();
        assert_eq!(w.len(), ItemState::MIN_ENCODED_SIZE);
    }

    #[test]
    fn test_empty_equipment_is_nine_zero_flags() {
        let mut w = SaveWriter::new();
        EquipmentState::default().encode(&mut w).unwrap();
        assert_eq!(w.as_bytes(), &[0u8; 36]);
    }

    #[test]
    fn test_equipment_keeps_slot_identity() {
        let equipment = EquipmentState {
            main_hand: Some(rifle()),
            implant: Some(ItemState {
                template: "imp_amp".into(),
                stack_size: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut w = SaveWriter::new();
        equipment.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        let decoded = EquipmentState::decode(&mut r).unwrap();
        assert_eq!(decoded, equipment);
        assert_eq!(decoded.equipped_count(), 2);
        assert!(decoded.off_hand.is_none());
    }
}
