// ---------------------------------------------------------------------------
// globals – Global variable table (four typed partitions)
// ---------------------------------------------------------------------------
//
// Layout: four counted partitions in fixed order, each (name text, value):
//   booleans  bool (i32 0/1)
//   integers  i32
//   strings   text
//   locations location
//
// Names are unique case-insensitively across all partitions. The writer of
// the live game state supplies a tagged `GlobalValue`, so there is no
// guessing of a name's type on either side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::save_error::SaveResult;
use crate::value::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlobalValue {
    Bool(bool),
    Int(i32),
    Text(String),
    Location(Location),
}

impl GlobalValue {
    fn partition(&self) -> u8 {
        match self {
            GlobalValue::Bool(_) => 0,
            GlobalValue::Int(_) => 1,
            GlobalValue::Text(_) => 2,
            GlobalValue::Location(_) => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GlobalEntry {
    name: String,
    value: GlobalValue,
}

/// Global variables keyed by case-insensitive name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalVariableTable {
    /// Keyed by the ASCII-lowercased name; the entry keeps original casing.
    entries: BTreeMap<String, GlobalEntry>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl GlobalVariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace. A name previously stored in a different partition
    /// moves to the new one; the table never holds it twice.
    pub fn set(&mut self, name: &str, value: GlobalValue) -> Option<GlobalValue> {
        self.entries
            .insert(
                fold(name),
                GlobalEntry {
                    name: name.to_string(),
                    value,
                },
            )
            .map(|e| e.value)
    }

    pub fn get(&self, name: &str) -> Option<&GlobalValue> {
        self.entries.get(&fold(name)).map(|e| &e.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&fold(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<GlobalValue> {
        self.entries.remove(&fold(name)).map(|e| e.value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            GlobalValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            GlobalValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            GlobalValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_location(&self, name: &str) -> Option<Location> {
        match self.get(name)? {
            GlobalValue::Location(l) => Some(*l),
            _ => None,
        }
    }

    /// Entries in name order with their original casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GlobalValue)> {
        self.entries.values().map(|e| (e.name.as_str(), &e.value))
    }

    fn partition(&self, p: u8) -> impl Iterator<Item = &GlobalEntry> {
        self.entries.values().filter(move |e| e.value.partition() == p)
    }

    pub fn encode(&self, w: &mut SaveWriter) -> SaveResult<()> {
        for p in 0..4u8 {
            let entries: Vec<&GlobalEntry> = self.partition(p).collect();
            w.write_count("globals.partition", entries.len())?;
            for entry in entries {
                w.write_text("globals.name", &entry.name)?;
                match &entry.value {
                    GlobalValue::Bool(b) => w.write_bool(*b),
                    GlobalValue::Int(v) => w.write_i32(*v),
                    GlobalValue::Text(s) => w.write_text("globals.text", s)?,
                    GlobalValue::Location(l) => l.encode(w),
                }
            }
        }
        Ok(())
    }

    /// A name repeated across partitions in a hand-edited stream resolves to
    /// the last one read.
    pub fn decode(r: &mut SaveReader<'_>) -> SaveResult<Self> {
        let mut table = GlobalVariableTable::new();
        for _ in 0..r.read_count("globals.booleans", 8)? {
            let name = r.read_text("globals.name")?;
            let v = r.read_bool("globals.bool")?;
            table.set(&name, GlobalValue::Bool(v));
        }
        for _ in 0..r.read_count("globals.integers", 8)? {
            let name = r.read_text("globals.name")?;
            let v = r.read_i32("globals.int")?;
            table.set(&name, GlobalValue::Int(v));
        }
        for _ in 0..r.read_count("globals.strings", 8)? {
            let name = r.read_text("globals.name")?;
            let v = r.read_text("globals.text")?;
            table.set(&name, GlobalValue::Text(v));
        }
        for _ in 0..r.read_count("globals.locations", 24)? {
            let name = r.read_text("globals.name")?;
            let v = Location::decode(r)?;
            table.set(&name, GlobalValue::Location(v));
        }
        Ok(table)
    }

    /// Snapshot every global the live game state exposes.
    ///
    /// Only `has_global` is authoritative for existence; a listed name
    /// without a typed value is skipped.
    pub fn capture(store: &dyn GlobalStore) -> Self {
        let mut table = GlobalVariableTable::new();
        for name in store.global_names() {
            if !store.has_global(&name) {
                continue;
            }
            if let Some(value) = store.global(&name) {
                table.set(&name, value);
            }
        }
        table
    }

    /// Push every global back into the live game state.
    pub fn apply(&self, store: &mut dyn GlobalStore) {
        for entry in self.entries.values() {
            store.set_global(&entry.name, entry.value.clone());
        }
    }
}

/// Live game state seen as a global variable store.
pub trait GlobalStore {
    fn global_names(&self) -> Vec<String>;
    /// Typed value for a name; `None` when the store has no value for it.
    fn global(&self, name: &str) -> Option<GlobalValue>;
    fn has_global(&self, name: &str) -> bool;
    fn set_global(&mut self, name: &str, value: GlobalValue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn roundtrip(table: &GlobalVariableTable) -> GlobalVariableTable {
        let mut w = SaveWriter::new();
        table.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        let out = GlobalVariableTable::decode(&mut r).unwrap();
        assert!(r.is_at_end());
        out
    }

    #[test]
    fn test_name_lives_in_one_partition() {
        let mut t = GlobalVariableTable::new();
        t.set("PLOT_Horizon", GlobalValue::Bool(true));
        let old = t.set("plot_horizon", GlobalValue::Int(3));
        assert_eq!(old, Some(GlobalValue::Bool(true)));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get_int("PLOT_HORIZON"), Some(3));
        assert_eq!(t.get_bool("plot_horizon"), None);
    }

    #[test]
    fn test_table_roundtrip_keeps_casing() {
        let mut t = GlobalVariableTable::new();
        t.set("ME2_Suicide_Mission", GlobalValue::Bool(false));
        t.set("Paragon", GlobalValue::Int(240));
        t.set("LastSystem", GlobalValue::Text("Omega Nebula".into()));
        t.set(
            "ReturnPoint",
            GlobalValue::Location(Location {
                area_id: 9,
                position: [1.0, 2.0, 3.0],
                facing: 0.5,
            }),
        );
        let out = roundtrip(&t);
        assert_eq!(out, t);
        let names: Vec<&str> = out.iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"ME2_Suicide_Mission"));
    }

    #[test]
    fn test_partitions_are_written_in_fixed_order() {
        let mut t = GlobalVariableTable::new();
        t.set("a_int", GlobalValue::Int(1));
        t.set("b_bool", GlobalValue::Bool(true));
        let mut w = SaveWriter::new();
        t.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        // Boolean partition first: count 1, then "b_bool".
        assert_eq!(&bytes[0..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..14], b"b_bool");
    }

    #[test]
    fn test_duplicate_name_in_stream_keeps_last() {
        let mut w = SaveWriter::new();
        w.write_i32(1);
        w.write_text("n", "Flag").unwrap();
        w.write_bool(true);
        w.write_i32(1);
        w.write_text("n", "FLAG").unwrap();
        w.write_i32(7);
        w.write_i32(0);
        w.write_i32(0);
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        let t = GlobalVariableTable::decode(&mut r).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get_int("flag"), Some(7));
    }

    #[derive(Default)]
    struct MemoryStore {
        names: Vec<String>,
        values: HashMap<String, GlobalValue>,
    }

    impl GlobalStore for MemoryStore {
        fn global_names(&self) -> Vec<String> {
            self.names.clone()
        }
        fn global(&self, name: &str) -> Option<GlobalValue> {
            self.values.get(name).cloned()
        }
        fn has_global(&self, name: &str) -> bool {
            self.names.iter().any(|n| n == name)
        }
        fn set_global(&mut self, name: &str, value: GlobalValue) {
            if !self.has_global(name) {
                self.names.push(name.to_string());
            }
            self.values.insert(name.to_string(), value);
        }
    }

    #[test]
    fn test_capture_skips_names_without_value() {
        let mut store = MemoryStore::default();
        store.set_global("Renegade", GlobalValue::Int(12));
        store.names.push("Dangling".into());
        let table = GlobalVariableTable::capture(&store);
        assert_eq!(table.len(), 1);
        assert!(!table.contains("Dangling"));

        let mut restored = MemoryStore::default();
        table.apply(&mut restored);
        assert_eq!(restored.global("Renegade"), Some(GlobalValue::Int(12)));
    }
}
