// ---------------------------------------------------------------------------
// area – Area contents: categorised entity lists, destroyed ids, spawns
// ---------------------------------------------------------------------------
//
// Layout:
//   area_ref text, visited bool
//   nine entity lists in fixed order: creatures, items, placeables, doors,
//     triggers, waypoints, sounds, stores, encounters
//   destroyed_ids list<u32>
//   [v4+] spawned list<(entity, blueprint text, spawner text)>
//   locals
//
// Every list is written even when empty so the reader stays in step.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::{SaveReader, SaveWriter};
use crate::entity::{EntitySource, EntityState};
use crate::locals::LocalVariableSet;
use crate::save_error::SaveResult;
use crate::version::{Feature, Format};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnedEntity {
    pub entity: EntityState,
    pub blueprint: String,
    /// Back-reference (tag) to the encounter or script that spawned it.
    pub spawner: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaState {
    pub area_ref: String,
    pub visited: bool,
    pub creatures: Vec<EntityState>,
    pub items: Vec<EntityState>,
    pub placeables: Vec<EntityState>,
    pub doors: Vec<EntityState>,
    pub triggers: Vec<EntityState>,
    pub waypoints: Vec<EntityState>,
    pub sounds: Vec<EntityState>,
    pub stores: Vec<EntityState>,
    pub encounters: Vec<EntityState>,
    pub destroyed_ids: BTreeSet<u32>,
    pub spawned: Vec<SpawnedEntity>,
    pub locals: LocalVariableSet,
}

const LIST_FIELDS: [&str; 9] = [
    "area.creatures",
    "area.items",
    "area.placeables",
    "area.doors",
    "area.triggers",
    "area.waypoints",
    "area.sounds",
    "area.stores",
    "area.encounters",
];

impl AreaState {
    /// Category lists in wire order.
    pub fn categories(&self) -> [&Vec<EntityState>; 9] {
        [
            &self.creatures,
            &self.items,
            &self.placeables,
            &self.doors,
            &self.triggers,
            &self.waypoints,
            &self.sounds,
            &self.stores,
            &self.encounters,
        ]
    }

    fn categories_mut(&mut self) -> [&mut Vec<EntityState>; 9] {
        [
            &mut self.creatures,
            &mut self.items,
            &mut self.placeables,
            &mut self.doors,
            &mut self.triggers,
            &mut self.waypoints,
            &mut self.sounds,
            &mut self.stores,
            &mut self.encounters,
        ]
    }

    /// Every categorised entity, in wire order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityState> {
        self.categories().into_iter().flatten()
    }

    pub fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        w.write_text("area.area_ref", &self.area_ref)?;
        w.write_bool(self.visited);
        for (field, list) in LIST_FIELDS.into_iter().zip(self.categories()) {
            w.write_list(field, list.iter(), |w, e| e.encode(w, format))?;
        }
        w.write_list("area.destroyed_ids", self.destroyed_ids.iter(), |w, id| {
            w.write_u32(*id);
            Ok(())
        })?;
        if format.supports(Feature::SpawnedEntities) {
            w.write_list("area.spawned", self.spawned.iter(), |w, s| {
                s.entity.encode(w, format)?;
                w.write_text("spawned.blueprint", &s.blueprint)?;
                w.write_text("spawned.spawner", &s.spawner)
            })?;
        }
        self.locals.encode(w)
    }

    pub fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        let mut area = AreaState {
            area_ref: r.read_text("area.area_ref")?,
            visited: r.read_bool("area.visited")?,
            ..Default::default()
        };
        for (field, list) in LIST_FIELDS.into_iter().zip(area.categories_mut()) {
            *list = r.read_list(field, EntityState::MIN_ENCODED_SIZE, |r| {
                EntityState::decode(r, format)
            })?;
        }
        area.destroyed_ids = r
            .read_list("area.destroyed_ids", 4, |r| r.read_u32("area.destroyed_id"))?
            .into_iter()
            .collect();
        if format.supports(Feature::SpawnedEntities) {
            area.spawned = r.read_list(
                "area.spawned",
                EntityState::MIN_ENCODED_SIZE + 8,
                |r| {
                    Ok(SpawnedEntity {
                        entity: EntityState::decode(r, format)?,
                        blueprint: r.read_text("spawned.blueprint")?,
                        spawner: r.read_text("spawned.spawner")?,
                    })
                },
            )?;
        }
        area.locals = LocalVariableSet::decode(r)?;
        Ok(area)
    }

    /// Push this state into the live area.
    ///
    /// Matching policy: every entity is first matched by `object_id`. Those
    /// the world has no id for (ids are reassigned when an area is rebuilt
    /// from its template) then fall back to a live entity with the same tag
    /// and template that no other saved entity has claimed. Each live
    /// entity receives at most one record; entities matching neither way
    /// are reported, not created. Destroyed ids are destroyed, then spawns
    /// are requested, then area locals are applied.
    pub fn apply(&self, world: &mut dyn AreaWorld) -> AreaApplyReport {
        let mut report = AreaApplyReport::default();
        let mut claimed = BTreeSet::new();
        let mut by_tag = Vec::new();

        for entity in self.entities() {
            if self.destroyed_ids.contains(&entity.object_id) {
                continue;
            }
            if !claimed.contains(&entity.object_id) {
                if let Some(live) = world.entity_by_id(entity.object_id) {
                    claimed.insert(live.object_id());
                    entity.restore_data(live);
                    report.matched_by_id += 1;
                    continue;
                }
            }
            by_tag.push(entity);
        }

        for entity in by_tag {
            let live = if entity.tag.is_empty() {
                None
            } else {
                world
                    .entity_by_tag(&entity.tag, &entity.template, &claimed)
                    .filter(|live| !claimed.contains(&live.object_id()))
            };
            match live {
                Some(live) => {
                    claimed.insert(live.object_id());
                    entity.restore_data(live);
                    report.matched_by_tag += 1;
                }
                None => {
                    debug!(
                        "Area {}: no live entity for {} (id {})",
                        self.area_ref, entity.tag, entity.object_id
                    );
                    report.unmatched.push(entity.object_id);
                }
            }
        }

        for id in &self.destroyed_ids {
            if world.destroy(*id) {
                report.destroyed += 1;
            }
        }
        for spawn in &self.spawned {
            if world.spawn(spawn) {
                report.spawned += 1;
            } else {
                warn!(
                    "Area {}: spawn of {} from {} failed",
                    self.area_ref, spawn.blueprint, spawn.spawner
                );
                report.failed_spawns.push(spawn.blueprint.clone());
            }
        }
        world.set_area_locals(&self.locals);
        report
    }
}

/// The live area a saved `AreaState` is applied to.
pub trait AreaWorld {
    fn entity_by_id(&mut self, object_id: u32) -> Option<&mut dyn EntitySource>;
    /// A live entity with this tag and template whose object id is not in
    /// `claimed`.
    fn entity_by_tag(
        &mut self,
        tag: &str,
        template: &str,
        claimed: &BTreeSet<u32>,
    ) -> Option<&mut dyn EntitySource>;
    /// Returns whether an entity was removed.
    fn destroy(&mut self, object_id: u32) -> bool;
    /// Returns whether the spawn succeeded.
    fn spawn(&mut self, spawned: &SpawnedEntity) -> bool;
    fn set_area_locals(&mut self, locals: &LocalVariableSet);
}

/// Outcome of [`AreaState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaApplyReport {
    pub matched_by_id: usize,
    pub matched_by_tag: usize,
    /// Object ids of saved entities with no live counterpart.
    pub unmatched: Vec<u32>,
    pub destroyed: usize,
    pub spawned: usize,
    /// Blueprints that could not be spawned.
    pub failed_spawns: Vec<String>,
}

#[cfg(test)]
#[path = "area_tests.rs"]
mod tests;
