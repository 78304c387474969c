// ---------------------------------------------------------------------------
// party – Party leader, roster, resources and per-title extensions
// ---------------------------------------------------------------------------
//
// Layout:
//   leader? (flag i32) creature
//   members count + (template text, available bool, selectable bool,
//                    state? (flag i32) creature)*
//   selected list<text>
//   currency i32, experience i32
//   [v3+, titles with squads] extensions? (flag i32)
//       approval map<text,i32>, romance map<text,i32>,
//       loyalty map<text,bool>, tactics map<text,i32>, squad list<entity>
//
// The extension maps duplicate data the global table owns; this engine
// family writes them into the party record as well.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::creature::CreatureState;
use crate::entity::EntityState;
use crate::save_error::SaveResult;
use crate::version::{Feature, Format};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyMember {
    pub available: bool,
    pub selectable: bool,
    pub state: Option<CreatureState>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyExtensions {
    pub approval: BTreeMap<String, i32>,
    pub romance: BTreeMap<String, i32>,
    pub loyalty: BTreeMap<String, bool>,
    pub tactics: BTreeMap<String, i32>,
    pub squad: Vec<EntityState>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyState {
    pub leader: Option<CreatureState>,
    /// Keyed by member template.
    pub members: BTreeMap<String, PartyMember>,
    /// Templates of the active squad, in selection order.
    pub selected: Vec<String>,
    pub currency: i32,
    pub experience: i32,
    pub extensions: Option<PartyExtensions>,
}

fn write_int_map(
    w: &mut SaveWriter,
    field: &'static str,
    map: &BTreeMap<String, i32>,
) -> SaveResult<()> {
    w.write_count(field, map.len())?;
    for (name, v) in map {
        w.write_text(field, name)?;
        w.write_i32(*v);
    }
    Ok(())
}

fn read_int_map(r: &mut SaveReader<'_>, field: &'static str) -> SaveResult<BTreeMap<String, i32>> {
    let mut map = BTreeMap::new();
    for _ in 0..r.read_count(field, 8)? {
        let name = r.read_text(field)?;
        map.insert(name, r.read_i32(field)?);
    }
    Ok(map)
}

impl PartyExtensions {
    fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        write_int_map(w, "party.approval", &self.approval)?;
        write_int_map(w, "party.romance", &self.romance)?;
        w.write_count("party.loyalty", self.loyalty.len())?;
        for (name, loyal) in &self.loyalty {
            w.write_text("party.loyalty", name)?;
            w.write_bool(*loyal);
        }
        write_int_map(w, "party.tactics", &self.tactics)?;
        w.write_list("party.squad", self.squad.iter(), |w, e| e.encode(w, format))
    }

    fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        let approval = read_int_map(r, "party.approval")?;
        let romance = read_int_map(r, "party.romance")?;
        let mut loyalty = BTreeMap::new();
        for _ in 0..r.read_count("party.loyalty", 8)? {
            let name = r.read_text("party.loyalty")?;
            loyalty.insert(name, r.read_bool("party.loyalty")?);
        }
        Ok(Self {
            approval,
            romance,
            loyalty,
            tactics: read_int_map(r, "party.tactics")?,
            squad: r.read_list("party.squad", EntityState::MIN_ENCODED_SIZE, |r| {
                EntityState::decode(r, format)
            })?,
        })
    }
}

impl PartyState {
    pub fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        w.write_optional(self.leader.as_ref(), |w, c| c.encode(w, format))?;
        w.write_count("party.members", self.members.len())?;
        for (template, member) in &self.members {
            w.write_text("member.template", template)?;
            w.write_bool(member.available);
            w.write_bool(member.selectable);
            w.write_optional(member.state.as_ref(), |w, c| c.encode(w, format))?;
        }
        w.write_list("party.selected", self.selected.iter(), |w, t| {
            w.write_text("party.selected", t)
        })?;
        w.write_i32(self.currency);
        w.write_i32(self.experience);
        if format.supports(Feature::PartyExtensions) {
            w.write_optional(self.extensions.as_ref(), |w, x| x.encode(w, format))?;
        }
        Ok(())
    }

    pub fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        let leader = r.read_optional("party.leader", |r| CreatureState::decode(r, format))?;
        let mut members = BTreeMap::new();
        for _ in 0..r.read_count("party.members", 16)? {
            let template = r.read_text("member.template")?;
            let member = PartyMember {
                available: r.read_bool("member.available")?,
                selectable: r.read_bool("member.selectable")?,
                state: r.read_optional("member.state", |r| CreatureState::decode(r, format))?,
            };
            members.insert(template, member);
        }
        let selected = r.read_list("party.selected", 4, |r| r.read_text("party.selected"))?;
        let currency = r.read_i32("party.currency")?;
        let experience = r.read_i32("party.experience")?;
        let extensions = if format.supports(Feature::PartyExtensions) {
            r.read_optional("party.extensions", |r| PartyExtensions::decode(r, format))?
        } else {
            None
        };
        Ok(Self {
            leader,
            members,
            selected,
            currency,
            experience,
            extensions,
        })
    }

    /// Selected templates that have no roster entry or are not selectable.
    pub fn invalid_selections(&self) -> Vec<&str> {
        self.selected
            .iter()
            .filter(|t| !self.members.get(*t).is_some_and(|m| m.selectable))
            .map(String::as_str)
            .collect()
    }
}
