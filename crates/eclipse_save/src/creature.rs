// ---------------------------------------------------------------------------
// creature – Creature record: entity state plus character progression
// ---------------------------------------------------------------------------
//
// Layout:
//   entity
//   level, experience, resource_current, resource_max, alignment (i32 each)
//   equipment (nine flagged slots)
//   inventory list<item>
//   known_powers list<i32>, known_feats list<i32>
//   class_levels list<(class_id i32, level i32, gained_powers list<i32>)>
//   skills count + (skill_id i32, rank i32)*
//   [v2+] attributes? (flag i32) six i32

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::entity::EntityState;
use crate::item::{EquipmentState, ItemState};
use crate::save_error::SaveResult;
use crate::version::{Feature, Format};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassLevel {
    pub class_id: i32,
    pub level: i32,
    pub gained_powers: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeBlock {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub willpower: i32,
    pub cunning: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreatureState {
    pub entity: EntityState,
    pub level: i32,
    pub experience: i32,
    /// Mana, stamina, or whatever secondary pool the title uses.
    pub resource_current: i32,
    pub resource_max: i32,
    pub alignment: i32,
    pub equipment: EquipmentState,
    pub inventory: Vec<ItemState>,
    pub known_powers: Vec<i32>,
    pub known_feats: Vec<i32>,
    pub class_levels: Vec<ClassLevel>,
    pub skills: BTreeMap<i32, i32>,
    pub attributes: Option<AttributeBlock>,
}

impl CreatureState {
    pub(crate) const MIN_ENCODED_SIZE: usize =
        EntityState::MIN_ENCODED_SIZE + 20 + 36 + 4 * 5;

    pub fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        self.entity.encode(w, format)?;
        w.write_i32(self.level);
        w.write_i32(self.experience);
        w.write_i32(self.resource_current);
        w.write_i32(self.resource_max);
        w.write_i32(self.alignment);
        self.equipment.encode(w)?;
        w.write_list("creature.inventory", self.inventory.iter(), |w, item| {
            item.encode(w)
        })?;
        w.write_list("creature.known_powers", self.known_powers.iter(), |w, p| {
            w.write_i32(*p);
            Ok(())
        })?;
        w.write_list("creature.known_feats", self.known_feats.iter(), |w, f| {
            w.write_i32(*f);
            Ok(())
        })?;
        w.write_list("creature.class_levels", self.class_levels.iter(), |w, c| {
            w.write_i32(c.class_id);
            w.write_i32(c.level);
            w.write_list("class.gained_powers", c.gained_powers.iter(), |w, p| {
                w.write_i32(*p);
                Ok(())
            })
        })?;
        w.write_count("creature.skills", self.skills.len())?;
        for (skill, rank) in &self.skills {
            w.write_i32(*skill);
            w.write_i32(*rank);
        }
        if format.supports(Feature::CreatureAttributes) {
            w.write_optional(self.attributes.as_ref(), |w, a| {
                for v in [
                    a.strength,
                    a.dexterity,
                    a.constitution,
                    a.intelligence,
                    a.willpower,
                    a.cunning,
                ] {
                    w.write_i32(v);
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    pub fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        let entity = EntityState::decode(r, format)?;
        let level = r.read_i32("creature.level")?;
        let experience = r.read_i32("creature.experience")?;
        let resource_current = r.read_i32("creature.resource_current")?;
        let resource_max = r.read_i32("creature.resource_max")?;
        let alignment = r.read_i32("creature.alignment")?;
        let equipment = EquipmentState::decode(r)?;
        let inventory = r.read_list(
            "creature.inventory",
            ItemState::MIN_ENCODED_SIZE,
            ItemState::decode,
        )?;
        let known_powers = r.read_list("creature.known_powers", 4, |r| r.read_i32("power"))?;
        let known_feats = r.read_list("creature.known_feats", 4, |r| r.read_i32("feat"))?;
        let class_levels = r.read_list("creature.class_levels", 12, |r| {
            Ok(ClassLevel {
                class_id: r.read_i32("class.class_id")?,
                level: r.read_i32("class.level")?,
                gained_powers: r.read_list("class.gained_powers", 4, |r| r.read_i32("power"))?,
            })
        })?;
        let mut skills = BTreeMap::new();
        for _ in 0..r.read_count("creature.skills", 8)? {
            let skill = r.read_i32("skill.id")?;
            skills.insert(skill, r.read_i32("skill.rank")?);
        }
        let attributes = if format.supports(Feature::CreatureAttributes) {
            r.read_optional("creature.attributes", |r| {
                Ok(AttributeBlock {
                    strength: r.read_i32("attributes.strength")?,
                    dexterity: r.read_i32("attributes.dexterity")?,
                    constitution: r.read_i32("attributes.constitution")?,
                    intelligence: r.read_i32("attributes.intelligence")?,
                    willpower: r.read_i32("attributes.willpower")?,
                    cunning: r.read_i32("attributes.cunning")?,
                })
            })?
        } else {
            None
        };
        Ok(Self {
            entity,
            level,
            experience,
            resource_current,
            resource_max,
            alignment,
            equipment,
            inventory,
            known_powers,
            known_feats,
            class_levels,
            skills,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_creature;
    use crate::save_error::SaveError;

    #[test]
    fn test_creature_roundtrip_current_format() {
        let c = sample_creature("garrus", 0x10);
        let format = Format::current(true);
        let mut w = SaveWriter::new();
        c.encode(&mut w, format).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        assert_eq!(CreatureState::decode(&mut r, format).unwrap(), c);
        assert!(r.is_at_end());
    }

    #[test]
    fn test_v1_creature_drops_attribute_block() {
        let c = sample_creature("tali", 0x11);
        let v1 = Format::new(1, true);
        let mut w = SaveWriter::new();
        c.encode(&mut w, v1).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        let decoded = CreatureState::decode(&mut r, v1).unwrap();
        assert!(r.is_at_end());
        assert_eq!(decoded.attributes, None);
        assert_eq!(decoded.skills, c.skills);
    }

    #[test]
    fn test_default_creature_is_min_encoded_size_at_v1() {
        let mut w = SaveWriter::new();
        CreatureState::default()
            .encode(&mut w, Format::new(1, false))
            .unwrap();
        assert_eq!(w.len(), CreatureState::MIN_ENCODED_SIZE);
    }

    #[test]
    fn test_truncated_skills_fail() {
        let c = sample_creature("jack", 0x12);
        let format = Format::current(true);
        let mut w = SaveWriter::new();
        c.encode(&mut w, format).unwrap();
        let bytes = w.into_bytes();
        // Cut inside the skills map.
        let cut = &bytes[..bytes.len() - 30];
        let mut r = SaveReader::new(cut);
        assert!(matches!(
            CreatureState::decode(&mut r, format),
            Err(SaveError::TruncatedStream { .. })
        ));
    }
}
