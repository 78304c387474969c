// ---------------------------------------------------------------------------
// locals – Named variables scoped to an entity or area
// ---------------------------------------------------------------------------
//
// Layout: five counted maps in fixed order (int, float, text, object,
// location). Each entry is (name text, value). Object slots are untyped in
// the scripting model, so they carry a full `Value`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::save_error::{SaveError, SaveResult};
use crate::value::{Location, Value};

/// Smallest possible encoded entry: empty name + 1-byte null value.
const MIN_ENTRY_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalVariableSet {
    pub ints: BTreeMap<String, i32>,
    pub floats: BTreeMap<String, f32>,
    pub strings: BTreeMap<String, String>,
    pub objects: BTreeMap<String, Value>,
    pub locations: BTreeMap<String, Location>,
}

impl LocalVariableSet {
    pub fn is_empty(&self) -> bool {
        self.ints.is_empty()
            && self.floats.is_empty()
            && self.strings.is_empty()
            && self.objects.is_empty()
            && self.locations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ints.len()
            + self.floats.len()
            + self.strings.len()
            + self.objects.len()
            + self.locations.len()
    }

    pub fn encode(&self, w: &mut SaveWriter) -> SaveResult<()> {
        w.write_count("locals.ints", self.ints.len())?;
        for (name, v) in &self.ints {
            w.write_text("locals.name", name)?;
            w.write_i32(*v);
        }
        w.write_count("locals.floats", self.floats.len())?;
        for (name, v) in &self.floats {
            w.write_text("locals.name", name)?;
            w.write_f32(*v);
        }
        w.write_count("locals.strings", self.strings.len())?;
        for (name, v) in &self.strings {
            w.write_text("locals.name", name)?;
            w.write_text("locals.string", v)?;
        }
        w.write_count("locals.objects", self.objects.len())?;
        for (name, v) in &self.objects {
            w.write_text("locals.name", name)?;
            v.encode(w)?;
        }
        w.write_count("locals.locations", self.locations.len())?;
        for (name, v) in &self.locations {
            w.write_text("locals.name", name)?;
            v.encode(w);
        }
        Ok(())
    }

    /// A name repeated within one map is a `DuplicateKey` error.
    pub fn decode(r: &mut SaveReader<'_>) -> SaveResult<Self> {
        Ok(LocalVariableSet {
            ints: read_map(r, "locals.ints", |r| r.read_i32("locals.int"))?,
            floats: read_map(r, "locals.floats", |r| r.read_f32("locals.float"))?,
            strings: read_map(r, "locals.strings", |r| r.read_text("locals.string"))?,
            objects: read_map(r, "locals.objects", Value::decode)?,
            locations: read_map(r, "locals.locations", Location::decode)?,
        })
    }
}

fn read_map<T>(
    r: &mut SaveReader<'_>,
    field: &'static str,
    mut read: impl FnMut(&mut SaveReader<'_>) -> SaveResult<T>,
) -> SaveResult<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for _ in 0..r.read_count(field, MIN_ENTRY_SIZE)? {
        let offset = r.position();
        let name = r.read_text("locals.name")?;
        let value = read(r)?;
        if map.contains_key(&name) {
            return Err(SaveError::DuplicateKey {
                field,
                offset,
                key: name,
            });
        }
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_five_zero_counts() {
        let mut w = SaveWriter::new();
        LocalVariableSet::default().encode(&mut w).unwrap();
        assert_eq!(w.as_bytes(), &[0u8; 20]);
    }

    #[test]
    fn test_populated_set_roundtrips() {
        let mut set = LocalVariableSet::default();
        set.ints.insert("nTimesSpoken".into(), 3);
        set.floats.insert("fDelay".into(), 0.25);
        set.strings.insert("sLastLine".into(), "Shepard.".into());
        set.objects.insert("oTarget".into(), Value::Object(77));
        set.objects.insert("oNothing".into(), Value::Null);
        set.locations.insert(
            "lHome".into(),
            Location {
                area_id: 1,
                position: [4.0, 5.0, 6.0],
                facing: 0.0,
            },
        );

        let mut w = SaveWriter::new();
        set.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        assert_eq!(LocalVariableSet::decode(&mut r).unwrap(), set);
        assert!(r.is_at_end());
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_truncated_map_fails() {
        let mut set = LocalVariableSet::default();
        set.strings.insert("s".into(), "value".into());
        let mut w = SaveWriter::new();
        set.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        let cut = &bytes[..bytes.len() - 14];
        let mut r = SaveReader::new(cut);
        assert!(matches!(
            LocalVariableSet::decode(&mut r),
            Err(SaveError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn test_repeated_name_is_duplicate_key() {
        let mut w = SaveWriter::new();
        w.write_i32(2);
        for value in [1, 2] {
            w.write_text("name", "nState").unwrap();
            w.write_i32(value);
        }
        for _ in 0..4 {
            w.write_i32(0);
        }
        let bytes = w.into_bytes();
        match LocalVariableSet::decode(&mut SaveReader::new(&bytes)) {
            Err(SaveError::DuplicateKey { field, offset, key }) => {
                assert_eq!(field, "locals.ints");
                assert_eq!(offset, 4 + 4 + 6 + 4);
                assert_eq!(key, "nState");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }
}
