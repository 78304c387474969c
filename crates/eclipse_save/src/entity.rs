// ---------------------------------------------------------------------------
// entity – Per-entity record shared by creatures, area occupants, spawns and
// squad members
// ---------------------------------------------------------------------------
//
// Layout:
//   tag text, object_id u32, object_type u32, template text
//   transform?  (flag i32) position vec3, facing f32
//   stats?      (flag i32) current_hp i32, max_hp i32, plot bool
//   inventory?  (flag i32) count, then (slot u8, item)*
//   scripts?    (flag i32) count, then (event u32, script text)*
//   door?       (flag i32) open, locked, key_required bool, lock_dc i32, key_tag text
//   placeable?  (flag i32) open, locked, useable bool, lock_dc i32, key_tag text
//   destroyed bool, animation_state i32
//   locals, effects list
//
// Presence flags are always read; a block body is read only behind a set
// flag. Locals and effects are counted lists and always present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter, Vec3};
use crate::effect::SavedEffect;
use crate::item::ItemState;
use crate::locals::LocalVariableSet;
use crate::save_error::{SaveError, SaveResult};
use crate::value::{Location, Value};
use crate::version::Format;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ObjectType {
    #[default]
    Invalid,
    Creature,
    Item,
    Trigger,
    Door,
    AreaOfEffect,
    Waypoint,
    Placeable,
    Store,
    Encounter,
    Sound,
    Area,
    Module,
}

impl ObjectType {
    pub const ALL: [ObjectType; 13] = [
        ObjectType::Invalid,
        ObjectType::Creature,
        ObjectType::Item,
        ObjectType::Trigger,
        ObjectType::Door,
        ObjectType::AreaOfEffect,
        ObjectType::Waypoint,
        ObjectType::Placeable,
        ObjectType::Store,
        ObjectType::Encounter,
        ObjectType::Sound,
        ObjectType::Area,
        ObjectType::Module,
    ];

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(v: u32) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }
}

/// Script hook slots an entity can bind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ScriptEvent {
    OnSpawn,
    OnDeath,
    OnDamaged,
    OnHeartbeat,
    OnPerception,
    OnDialogue,
    OnUsed,
    OnOpened,
    OnClosed,
    OnLocked,
    OnUnlocked,
    OnEnter,
    OnExit,
    OnUserDefined,
}

impl ScriptEvent {
    pub const ALL: [ScriptEvent; 14] = [
        ScriptEvent::OnSpawn,
        ScriptEvent::OnDeath,
        ScriptEvent::OnDamaged,
        ScriptEvent::OnHeartbeat,
        ScriptEvent::OnPerception,
        ScriptEvent::OnDialogue,
        ScriptEvent::OnUsed,
        ScriptEvent::OnOpened,
        ScriptEvent::OnClosed,
        ScriptEvent::OnLocked,
        ScriptEvent::OnUnlocked,
        ScriptEvent::OnEnter,
        ScriptEvent::OnExit,
        ScriptEvent::OnUserDefined,
    ];

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(v: u32) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ScriptEvent::OnSpawn => "on_spawn",
            ScriptEvent::OnDeath => "on_death",
            ScriptEvent::OnDamaged => "on_damaged",
            ScriptEvent::OnHeartbeat => "on_heartbeat",
            ScriptEvent::OnPerception => "on_perception",
            ScriptEvent::OnDialogue => "on_dialogue",
            ScriptEvent::OnUsed => "on_used",
            ScriptEvent::OnOpened => "on_opened",
            ScriptEvent::OnClosed => "on_closed",
            ScriptEvent::OnLocked => "on_locked",
            ScriptEvent::OnUnlocked => "on_unlocked",
            ScriptEvent::OnEnter => "on_enter",
            ScriptEvent::OnExit => "on_exit",
            ScriptEvent::OnUserDefined => "on_user_defined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformState {
    pub position: Vec3,
    pub facing: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsState {
    pub current_hp: i32,
    pub max_hp: i32,
    pub plot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoorState {
    pub open: bool,
    pub locked: bool,
    pub key_required: bool,
    pub lock_dc: i32,
    pub key_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceableState {
    pub open: bool,
    pub locked: bool,
    pub useable: bool,
    pub lock_dc: i32,
    pub key_tag: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub tag: String,
    /// Identity assigned by the live world; transported, never allocated.
    pub object_id: u32,
    pub object_type: ObjectType,
    pub template: String,
    pub transform: Option<TransformState>,
    pub stats: Option<StatsState>,
    /// Occupied inventory slots, keyed by slot index.
    pub inventory: Option<BTreeMap<u8, ItemState>>,
    pub scripts: Option<BTreeMap<ScriptEvent, String>>,
    pub door: Option<DoorState>,
    pub placeable: Option<PlaceableState>,
    pub destroyed: bool,
    pub animation_state: i32,
    pub locals: LocalVariableSet,
    pub effects: Vec<SavedEffect>,
}

impl EntityState {
    /// Two empty texts, id, type, six absent flags, destroyed, animation,
    /// empty locals and effects.
    pub(crate) const MIN_ENCODED_SIZE: usize = 8 + 8 + 24 + 8 + 20 + 4;

    pub fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        w.write_text("entity.tag", &self.tag)?;
        w.write_u32(self.object_id);
        w.write_u32(self.object_type.to_u32());
        w.write_text("entity.template", &self.template)?;

        w.write_optional(self.transform.as_ref(), |w, t| {
            w.write_vec3(t.position);
            w.write_f32(t.facing);
            Ok(())
        })?;
        w.write_optional(self.stats.as_ref(), |w, s| {
            w.write_i32(s.current_hp);
            w.write_i32(s.max_hp);
            w.write_bool(s.plot);
            Ok(())
        })?;
        w.write_optional(self.inventory.as_ref(), |w, inv| {
            w.write_count("entity.inventory", inv.len())?;
            for (slot, item) in inv {
                w.write_u8(*slot);
                item.encode(w)?;
            }
            Ok(())
        })?;
        w.write_optional(self.scripts.as_ref(), |w, scripts| {
            w.write_count("entity.scripts", scripts.len())?;
            for (event, script) in scripts {
                w.write_u32(event.to_u32());
                w.write_text("entity.script", script)?;
            }
            Ok(())
        })?;
        w.write_optional(self.door.as_ref(), |w, d| {
            w.write_bool(d.open);
            w.write_bool(d.locked);
            w.write_bool(d.key_required);
            w.write_i32(d.lock_dc);
            w.write_text("door.key_tag", &d.key_tag)
        })?;
        w.write_optional(self.placeable.as_ref(), |w, p| {
            w.write_bool(p.open);
            w.write_bool(p.locked);
            w.write_bool(p.useable);
            w.write_i32(p.lock_dc);
            w.write_text("placeable.key_tag", &p.key_tag)
        })?;

        w.write_bool(self.destroyed);
        w.write_i32(self.animation_state);
        self.locals.encode(w)?;
        w.write_list("entity.effects", self.effects.iter(), |w, e| {
            e.encode(w, format)
        })
    }

    pub fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        let tag = r.read_text("entity.tag")?;
        let object_id = r.read_u32("entity.object_id")?;
        let type_offset = r.position();
        let raw_type = r.read_u32("entity.object_type")?;
        let object_type =
            ObjectType::from_u32(raw_type).ok_or(SaveError::UnknownDiscriminant {
                field: "entity.object_type",
                offset: type_offset,
                value: raw_type,
            })?;
        let template = r.read_text("entity.template")?;

        let transform = r.read_optional("entity.transform", |r| {
            Ok(TransformState {
                position: r.read_vec3("transform.position")?,
                facing: r.read_f32("transform.facing")?,
            })
        })?;
        let stats = r.read_optional("entity.stats", |r| {
            Ok(StatsState {
                current_hp: r.read_i32("stats.current_hp")?,
                max_hp: r.read_i32("stats.max_hp")?,
                plot: r.read_bool("stats.plot")?,
            })
        })?;
        let inventory = r.read_optional("entity.inventory", |r| {
            let count = r.read_count("entity.inventory", 1 + ItemState::MIN_ENCODED_SIZE)?;
            let mut inv = BTreeMap::new();
            for _ in 0..count {
                let offset = r.position();
                let slot = r.read_u8("inventory.slot")?;
                if inv.insert(slot, ItemState::decode(r)?).is_some() {
                    return Err(SaveError::DuplicateKey {
                        field: "inventory.slot",
                        offset,
                        key: slot.to_string(),
                    });
                }
            }
            Ok(inv)
        })?;
        let scripts = r.read_optional("entity.scripts", |r| {
            let count = r.read_count("entity.scripts", 8)?;
            let mut scripts = BTreeMap::new();
            for _ in 0..count {
                let offset = r.position();
                let raw = r.read_u32("script.event")?;
                let event = ScriptEvent::from_u32(raw).ok_or(SaveError::UnknownDiscriminant {
                    field: "script.event",
                    offset,
                    value: raw,
                })?;
                scripts.insert(event, r.read_text("entity.script")?);
            }
            Ok(scripts)
        })?;
        let door = r.read_optional("entity.door", |r| {
            Ok(DoorState {
                open: r.read_bool("door.open")?,
                locked: r.read_bool("door.locked")?,
                key_required: r.read_bool("door.key_required")?,
                lock_dc: r.read_i32("door.lock_dc")?,
                key_tag: r.read_text("door.key_tag")?,
            })
        })?;
        let placeable = r.read_optional("entity.placeable", |r| {
            Ok(PlaceableState {
                open: r.read_bool("placeable.open")?,
                locked: r.read_bool("placeable.locked")?,
                useable: r.read_bool("placeable.useable")?,
                lock_dc: r.read_i32("placeable.lock_dc")?,
                key_tag: r.read_text("placeable.key_tag")?,
            })
        })?;

        Ok(Self {
            tag,
            object_id,
            object_type,
            template,
            transform,
            stats,
            inventory,
            scripts,
            door,
            placeable,
            destroyed: r.read_bool("entity.destroyed")?,
            animation_state: r.read_i32("entity.animation_state")?,
            locals: LocalVariableSet::decode(r)?,
            effects: r.read_list("entity.effects", SavedEffect::MIN_ENCODED_SIZE, |r| {
                SavedEffect::decode(r, format)
            })?,
        })
    }

    /// Snapshot a live entity through its component accessors.
    pub fn capture(source: &dyn EntitySource) -> Self {
        let inventory: Option<BTreeMap<u8, ItemState>> = source.has_inventory().then(|| {
            (0..=u8::MAX)
                .filter_map(|slot| source.inventory_item(slot).map(|item| (slot, item)))
                .collect()
        });
        let scripts: Option<BTreeMap<ScriptEvent, String>> = source.has_scripts().then(|| {
            ScriptEvent::ALL
                .into_iter()
                .filter_map(|event| source.script(event).map(|s| (event, s)))
                .collect()
        });
        Self {
            tag: source.tag(),
            object_id: source.object_id(),
            object_type: source.object_type(),
            template: source.template(),
            transform: source.transform(),
            stats: source.stats(),
            inventory,
            scripts,
            door: source.door(),
            placeable: source.placeable(),
            destroyed: source.is_destroyed(),
            animation_state: source.animation_state(),
            locals: source.locals(),
            effects: source.effects(),
        }
    }

    /// Hand every saved field back to a live entity through `set_data`.
    ///
    /// Keys:
    ///   tag, template, destroyed, animation_state
    ///   transform (location, area_id 0), hp.current, hp.max, plot
    ///   door.{open,locked,key_required,lock_dc,key_tag}
    ///   placeable.{open,locked,useable,lock_dc,key_tag}
    ///   inventory.count, inventory.<slot>.{template,stack_size,charges,identified}
    ///   inventory.<slot>.upgrade.<i>
    ///   scripts.count, script.<event>
    ///   effects.count, effect.<i>.{type,sub_type,duration_type,remaining,
    ///     creator,spell,colored}, effect.<i>.{int,float,text,object}.<j>
    ///   local.<kind>.<name>
    ///
    /// The `.count` keys are sent only when the block is present, so a
    /// runtime can clear a component the save says is empty.
    pub fn restore_data(&self, target: &mut dyn EntitySource) {
        target.set_data("tag", Value::Text(self.tag.clone()));
        target.set_data("template", Value::Text(self.template.clone()));
        target.set_data("destroyed", Value::Bool(self.destroyed));
        target.set_data("animation_state", Value::Int(self.animation_state));
        if let Some(t) = &self.transform {
            target.set_data(
                "transform",
                Value::Location(Location {
                    area_id: 0,
                    position: t.position,
                    facing: t.facing,
                }),
            );
        }
        if let Some(s) = &self.stats {
            target.set_data("hp.current", Value::Int(s.current_hp));
            target.set_data("hp.max", Value::Int(s.max_hp));
            target.set_data("plot", Value::Bool(s.plot));
        }
        if let Some(d) = &self.door {
            target.set_data("door.open", Value::Bool(d.open));
            target.set_data("door.locked", Value::Bool(d.locked));
            target.set_data("door.key_required", Value::Bool(d.key_required));
            target.set_data("door.lock_dc", Value::Int(d.lock_dc));
            target.set_data("door.key_tag", Value::Text(d.key_tag.clone()));
        }
        if let Some(p) = &self.placeable {
            target.set_data("placeable.open", Value::Bool(p.open));
            target.set_data("placeable.locked", Value::Bool(p.locked));
            target.set_data("placeable.useable", Value::Bool(p.useable));
            target.set_data("placeable.lock_dc", Value::Int(p.lock_dc));
            target.set_data("placeable.key_tag", Value::Text(p.key_tag.clone()));
        }
        if let Some(inv) = &self.inventory {
            target.set_data("inventory.count", Value::Int(inv.len() as i32));
            for (slot, item) in inv {
                restore_item(target, &format!("inventory.{slot}"), item);
            }
        }
        if let Some(scripts) = &self.scripts {
            target.set_data("scripts.count", Value::Int(scripts.len() as i32));
            for (event, script) in scripts {
                target.set_data(
                    &format!("script.{}", event.name()),
                    Value::Text(script.clone()),
                );
            }
        }
        target.set_data("effects.count", Value::Int(self.effects.len() as i32));
        for (i, effect) in self.effects.iter().enumerate() {
            restore_effect(target, &format!("effect.{i}"), effect);
        }
        for (name, v) in &self.locals.ints {
            target.set_data(&format!("local.int.{name}"), Value::Int(*v));
        }
        for (name, v) in &self.locals.floats {
            target.set_data(&format!("local.float.{name}"), Value::Float(*v));
        }
        for (name, v) in &self.locals.strings {
            target.set_data(&format!("local.string.{name}"), Value::Text(v.clone()));
        }
        for (name, v) in &self.locals.objects {
            target.set_data(&format!("local.object.{name}"), v.clone());
        }
        for (name, v) in &self.locals.locations {
            target.set_data(&format!("local.location.{name}"), Value::Location(*v));
        }
    }
}

fn restore_item(target: &mut dyn EntitySource, prefix: &str, item: &ItemState) {
    target.set_data(&format!("{prefix}.template"), Value::Text(item.template.clone()));
    target.set_data(&format!("{prefix}.stack_size"), Value::Int(item.stack_size));
    target.set_data(&format!("{prefix}.charges"), Value::Int(item.charges));
    target.set_data(&format!("{prefix}.identified"), Value::Bool(item.identified));
    for (i, upgrade) in item.upgrades.iter().enumerate() {
        target.set_data(&format!("{prefix}.upgrade.{i}"), Value::Text(upgrade.clone()));
    }
}

fn restore_effect(target: &mut dyn EntitySource, prefix: &str, e: &SavedEffect) {
    target.set_data(&format!("{prefix}.type"), Value::Int(e.effect_type));
    target.set_data(&format!("{prefix}.sub_type"), Value::Int(e.sub_type));
    target.set_data(&format!("{prefix}.duration_type"), Value::Int(e.duration_type));
    target.set_data(&format!("{prefix}.remaining"), Value::Float(e.remaining_duration));
    target.set_data(&format!("{prefix}.creator"), Value::Object(e.creator_id));
    target.set_data(&format!("{prefix}.spell"), Value::Int(e.spell_id));
    target.set_data(&format!("{prefix}.colored"), Value::Bool(e.colored));
    for (j, v) in e.int_params.iter().enumerate() {
        target.set_data(&format!("{prefix}.int.{j}"), Value::Int(*v));
    }
    for (j, v) in e.float_params.iter().enumerate() {
        target.set_data(&format!("{prefix}.float.{j}"), Value::Float(*v));
    }
    for (j, v) in e.text_params.iter().enumerate() {
        target.set_data(&format!("{prefix}.text.{j}"), Value::Text(v.clone()));
    }
    for (j, v) in e.object_params.iter().enumerate() {
        target.set_data(&format!("{prefix}.object.{j}"), Value::Object(*v));
    }
}

/// Read side of a live entity, plus a sink for restored raw fields.
///
/// Component accessors default to "absent" so simple entities only
/// implement what they have.
pub trait EntitySource {
    fn tag(&self) -> String;
    fn object_id(&self) -> u32;
    fn object_type(&self) -> ObjectType;
    fn template(&self) -> String;

    fn transform(&self) -> Option<TransformState> {
        None
    }
    fn stats(&self) -> Option<StatsState> {
        None
    }
    /// Whether the entity has an inventory component at all.
    fn has_inventory(&self) -> bool {
        false
    }
    fn inventory_item(&self, _slot: u8) -> Option<ItemState> {
        None
    }
    fn has_scripts(&self) -> bool {
        false
    }
    fn script(&self, _event: ScriptEvent) -> Option<String> {
        None
    }
    fn door(&self) -> Option<DoorState> {
        None
    }
    fn placeable(&self) -> Option<PlaceableState> {
        None
    }
    fn is_destroyed(&self) -> bool {
        false
    }
    fn animation_state(&self) -> i32 {
        0
    }
    fn locals(&self) -> LocalVariableSet {
        LocalVariableSet::default()
    }
    fn effects(&self) -> Vec<SavedEffect> {
        Vec::new()
    }

    /// Sink for fields the runtime has no typed setter for.
    fn set_data(&mut self, key: &str, value: Value);
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
