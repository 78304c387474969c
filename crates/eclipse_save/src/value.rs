// ---------------------------------------------------------------------------
// value – Tagged scalar for untyped variable slots
// ---------------------------------------------------------------------------
//
// Wire form: one discriminant byte, then the payload.
//   0 null        (no payload)
//   1 integer     i32
//   2 float       f32
//   3 text        text
//   4 boolean     i32 0/1
//   5 object      u32 object id
//   6 location    location

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter, Vec3};
use crate::save_error::{SaveError, SaveResult};

/// A point in a specific area, with facing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Back-reference to the area object.
    pub area_id: u32,
    pub position: Vec3,
    pub facing: f32,
}

impl Location {
    pub(crate) fn encode(&self, w: &mut SaveWriter) {
        w.write_u32(self.area_id);
        w.write_vec3(self.position);
        w.write_f32(self.facing);
    }

    pub(crate) fn decode(r: &mut SaveReader<'_>) -> SaveResult<Self> {
        Ok(Self {
            area_id: r.read_u32("location.area_id")?,
            position: r.read_vec3("location.position")?,
            facing: r.read_f32("location.facing")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Int(i32),
    Float(f32),
    Text(String),
    Bool(bool),
    Object(u32),
    Location(Location),
}

impl Value {
    pub fn kind_byte(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) => 1,
            Value::Float(_) => 2,
            Value::Text(_) => 3,
            Value::Bool(_) => 4,
            Value::Object(_) => 5,
            Value::Location(_) => 6,
        }
    }

    pub fn encode(&self, w: &mut SaveWriter) -> SaveResult<()> {
        w.write_u8(self.kind_byte());
        match self {
            Value::Null => {}
            Value::Int(v) => w.write_i32(*v),
            Value::Float(v) => w.write_f32(*v),
            Value::Text(s) => w.write_text("value.text", s)?,
            Value::Bool(b) => w.write_bool(*b),
            Value::Object(id) => w.write_u32(*id),
            Value::Location(loc) => loc.encode(w),
        }
        Ok(())
    }

    pub fn decode(r: &mut SaveReader<'_>) -> SaveResult<Self> {
        let offset = r.position();
        let kind = r.read_u8("value.kind")?;
        Ok(match kind {
            0 => Value::Null,
            1 => Value::Int(r.read_i32("value.int")?),
            2 => Value::Float(r.read_f32("value.float")?),
            3 => Value::Text(r.read_text("value.text")?),
            4 => Value::Bool(r.read_bool("value.bool")?),
            5 => Value::Object(r.read_u32("value.object")?),
            6 => Value::Location(Location::decode(r)?),
            kind => return Err(SaveError::UnknownValueKind { offset, kind }),
        })
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Location> for Value {
    fn from(v: Location) -> Self {
        Value::Location(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: &Value) -> Value {
        let mut w = SaveWriter::new();
        v.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = SaveReader::new(&bytes);
        let out = Value::decode(&mut r).unwrap();
        assert!(r.is_at_end());
        out
    }

    #[test]
    fn test_every_kind_roundtrips() {
        let values = [
            Value::Null,
            Value::Int(-7),
            Value::Float(2.5),
            Value::Text("plot_flag".into()),
            Value::Text(String::new()),
            Value::Bool(true),
            Value::Object(0x7F00_0001),
            Value::Location(Location {
                area_id: 3,
                position: [1.0, -2.0, 0.5],
                facing: 1.57,
            }),
        ];
        for v in &values {
            assert_eq!(&roundtrip(v), v);
        }
    }

    #[test]
    fn test_null_is_a_single_byte() {
        let mut w = SaveWriter::new();
        Value::Null.encode(&mut w).unwrap();
        assert_eq!(w.as_bytes(), &[0]);
    }

    #[test]
    fn test_unknown_kind_is_reported_with_offset() {
        let bytes = [1, 5, 0, 0, 0, 9];
        let mut r = SaveReader::new(&bytes);
        assert_eq!(Value::decode(&mut r).unwrap(), Value::Int(5));
        assert!(matches!(
            Value::decode(&mut r),
            Err(SaveError::UnknownValueKind { offset: 5, kind: 9 })
        ));
    }
}
