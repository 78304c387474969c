//! Shared sample records for unit tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::area::{AreaState, SpawnedEntity};
use crate::creature::{AttributeBlock, ClassLevel, CreatureState};
use crate::effect::SavedEffect;
use crate::entity::{
    EntityState, ObjectType, PlaceableState, ScriptEvent, StatsState, TransformState,
};
use crate::game::SaveGame;
use crate::globals::{GlobalValue, GlobalVariableTable};
use crate::header::SaveHeader;
use crate::item::{EquipmentState, ItemState};
use crate::locals::LocalVariableSet;
use crate::metadata::{NamedValue, SaveKind, SaveMetadata};
use crate::party::{PartyExtensions, PartyMember, PartyState};
use crate::value::{Location, Value};

fn item(template: &str) -> ItemState {
    ItemState {
        template: template.to_string(),
        stack_size: 1,
        charges: 0,
        identified: true,
        upgrades: Vec::new(),
    }
}

fn entity(id: u32, tag: &str, template: &str, object_type: ObjectType) -> EntityState {
    EntityState {
        tag: tag.to_string(),
        object_id: id,
        object_type,
        template: template.to_string(),
        transform: Some(TransformState {
            position: [id as f32, 2.5, -4.0],
            facing: 1.25,
        }),
        ..Default::default()
    }
}

pub(crate) fn sample_creature(tag: &str, id: u32) -> CreatureState {
    let mut base = entity(id, tag, &format!("hench_{tag}"), ObjectType::Creature);
    base.stats = Some(StatsState {
        current_hp: 180,
        max_hp: 200,
        plot: false,
    });
    base.scripts = Some(BTreeMap::from([(
        ScriptEvent::OnDeath,
        "hench_death".to_string(),
    )]));
    base.effects.push(SavedEffect {
        effect_type: 12,
        sub_type: 1,
        duration_type: 1,
        remaining_duration: 6.5,
        creator_id: id,
        spell_id: 101,
        colored: true,
        int_params: vec![25],
        float_params: vec![0.5],
        text_params: Vec::new(),
        object_params: vec![id],
    });
    base.locals.ints.insert("times_talked".into(), 3);

    let mut rifle = item("wpn_sniper_mantis");
    rifle.upgrades = vec!["upg_scope".into()];
    let mut grenade = item("gre_frag");
    grenade.stack_size = 3;

    CreatureState {
        entity: base,
        level: 12,
        experience: 48_000,
        resource_current: 80,
        resource_max: 100,
        alignment: 3,
        equipment: EquipmentState {
            armor: Some(item("arm_colossus")),
            main_hand: Some(rifle),
            ..Default::default()
        },
        inventory: vec![grenade],
        known_powers: vec![101, 102],
        known_feats: vec![7],
        class_levels: vec![ClassLevel {
            class_id: 2,
            level: 12,
            gained_powers: vec![101, 102],
        }],
        skills: BTreeMap::from([(1, 5), (4, 2)]),
        attributes: Some(AttributeBlock {
            strength: 14,
            dexterity: 16,
            constitution: 12,
            intelligence: 10,
            willpower: 11,
            cunning: 13,
        }),
    }
}

/// Creatures 100 (`merc_a`) and 101 (`merc_b`), placeable 200, destroyed
/// id 300 and one spawn.
pub(crate) fn sample_area() -> AreaState {
    let mut merc_a = entity(100, "merc_a", "c_merc", ObjectType::Creature);
    merc_a.stats = Some(StatsState {
        current_hp: 40,
        max_hp: 60,
        plot: false,
    });
    let mut merc_b = entity(101, "merc_b", "c_merc", ObjectType::Creature);
    merc_b.animation_state = 4;

    let mut crate_01 = entity(200, "crate_01", "plc_crate", ObjectType::Placeable);
    crate_01.placeable = Some(PlaceableState {
        open: false,
        locked: true,
        useable: true,
        lock_dc: 15,
        key_tag: String::new(),
    });
    crate_01.inventory = Some(BTreeMap::from([(0, item("med_gel")), (3, item("credits_small"))]));

    let mut locals = LocalVariableSet::default();
    locals.ints.insert("alarm_raised".into(), 1);
    locals.strings.insert("last_speaker".into(), "merc_a".into());
    locals.objects.insert("boss".into(), Value::Object(100));

    AreaState {
        area_ref: "omega_afterlife".to_string(),
        visited: true,
        creatures: vec![merc_a, merc_b],
        placeables: vec![crate_01],
        destroyed_ids: BTreeSet::from([300]),
        spawned: vec![SpawnedEntity {
            entity: entity(400, "merc_reinforcement", "c_merc", ObjectType::Creature),
            blueprint: "c_merc_reinforce".to_string(),
            spawner: "enc_ambush".to_string(),
        }],
        locals,
        ..Default::default()
    }
}

pub(crate) fn sample_party() -> PartyState {
    let members = BTreeMap::from([
        (
            "hench_garrus".to_string(),
            PartyMember {
                available: true,
                selectable: true,
                state: Some(sample_creature("garrus", 2)),
            },
        ),
        (
            "hench_tali".to_string(),
            PartyMember {
                available: true,
                selectable: false,
                state: None,
            },
        ),
    ]);
    PartyState {
        leader: Some(sample_creature("shepard", 1)),
        members,
        selected: vec!["hench_garrus".to_string()],
        currency: 15_000,
        experience: 48_000,
        extensions: Some(PartyExtensions {
            approval: BTreeMap::from([("garrus".to_string(), 10)]),
            romance: BTreeMap::from([("tali".to_string(), 2)]),
            loyalty: BTreeMap::from([("garrus".to_string(), true)]),
            tactics: BTreeMap::from([("garrus".to_string(), 1)]),
            squad: vec![entity(2, "garrus", "hench_garrus", ObjectType::Creature)],
        }),
    }
}

pub(crate) fn sample_game() -> SaveGame {
    let mut globals = GlobalVariableTable::new();
    globals.set("ME2_Omega_Done", GlobalValue::Bool(true));
    globals.set("Paragon", GlobalValue::Int(240));
    globals.set("LastSystem", GlobalValue::Text("Omega Nebula".into()));
    globals.set(
        "ReturnPoint",
        GlobalValue::Location(Location {
            area_id: 7,
            position: [10.0, 0.0, -3.5],
            facing: 3.0,
        }),
    );

    let normandy = AreaState {
        area_ref: "normandy_sr2".to_string(),
        visited: true,
        ..Default::default()
    };

    SaveGame {
        current_area: "omega_afterlife".to_string(),
        globals,
        party: sample_party(),
        areas: vec![sample_area(), normandy],
    }
}

pub(crate) fn sample_metadata() -> SaveMetadata {
    SaveMetadata {
        header: SaveHeader::default(),
        save_name: "Before the Relay".to_string(),
        area_name: "Omega - Afterlife".to_string(),
        time_played_seconds: 123_456,
        timestamp: 1_264_982_400,
        screenshot: Some(vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4]),
        portrait: Some(vec![9; 32]),
        player_name: "Shepard".to_string(),
        morality_score: 240,
        romance_entries: vec![NamedValue::new("tali", 2)],
        approval_entries: vec![NamedValue::new("garrus", 10), NamedValue::new("jack", -1)],
        mission_entries: vec![NamedValue::new("recruit_archangel", 1)],
        difficulty: 3,
        dlc_entries: vec!["Kasumi".to_string(), "Overlord".to_string()],
        save_kind: SaveKind::Quick,
        cheat_used: false,
        save_number: 42,
    }
}
