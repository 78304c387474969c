// ---------------------------------------------------------------------------
// effect – Active timed effects on an entity
// ---------------------------------------------------------------------------
//
// Layout:
//   effect_type i32, sub_type i32, duration_type i32, remaining_duration f32,
//   creator_id u32, spell_id i32,
//   [v2+] colored u8            <- single byte, unlike every other flag
//   int_params list<i32>, float_params list<f32>,
//   text_params list<text>, object_params list<u32>
//
// The `colored` byte is a historical quirk of the format. It must stay one
// byte wide or existing saves stop lining up.

use serde::{Deserialize, Serialize};

use crate::codec::{SaveReader, SaveWriter};
use crate::save_error::SaveResult;
use crate::version::{Feature, Format};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedEffect {
    pub effect_type: i32,
    pub sub_type: i32,
    pub duration_type: i32,
    pub remaining_duration: f32,
    /// Back-reference to whoever applied the effect.
    pub creator_id: u32,
    pub spell_id: i32,
    pub colored: bool,
    pub int_params: Vec<i32>,
    pub float_params: Vec<f32>,
    pub text_params: Vec<String>,
    pub object_params: Vec<u32>,
}

impl SavedEffect {
    /// Fixed-width head plus four empty lists, at the oldest layout.
    pub(crate) const MIN_ENCODED_SIZE: usize = 24 + 16;

    pub fn encode(&self, w: &mut SaveWriter, format: Format) -> SaveResult<()> {
        w.write_i32(self.effect_type);
        w.write_i32(self.sub_type);
        w.write_i32(self.duration_type);
        w.write_f32(self.remaining_duration);
        w.write_u32(self.creator_id);
        w.write_i32(self.spell_id);
        if format.supports(Feature::EffectColor) {
            w.write_byte_bool(self.colored);
        }
        w.write_list("effect.int_params", self.int_params.iter(), |w, v| {
            w.write_i32(*v);
            Ok(())
        })?;
        w.write_list("effect.float_params", self.float_params.iter(), |w, v| {
            w.write_f32(*v);
            Ok(())
        })?;
        w.write_list("effect.text_params", self.text_params.iter(), |w, v| {
            w.write_text("effect.text_param", v)
        })?;
        w.write_list("effect.object_params", self.object_params.iter(), |w, v| {
            w.write_u32(*v);
            Ok(())
        })
    }

    pub fn decode(r: &mut SaveReader<'_>, format: Format) -> SaveResult<Self> {
        Ok(Self {
            effect_type: r.read_i32("effect.effect_type")?,
            sub_type: r.read_i32("effect.sub_type")?,
            duration_type: r.read_i32("effect.duration_type")?,
            remaining_duration: r.read_f32("effect.remaining_duration")?,
            creator_id: r.read_u32("effect.creator_id")?,
            spell_id: r.read_i32("effect.spell_id")?,
            colored: if format.supports(Feature::EffectColor) {
                r.read_byte_bool("effect.colored")?
            } else {
                false
            },
            int_params: r.read_list("effect.int_params", 4, |r| r.read_i32("effect.int_param"))?,
            float_params: r.read_list("effect.float_params", 4, |r| {
                r.read_f32("effect.float_param")
            })?,
            text_params: r.read_list("effect.text_params", 4, |r| {
                r.read_text("effect.text_param")
            })?,
            object_params: r.read_list("effect.object_params", 4, |r| {
                r.read_u32("effect.object_param")
            })?,
        })
    }
}
