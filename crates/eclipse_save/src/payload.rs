// ---------------------------------------------------------------------------
// payload – Payload archive: header, integrity fields, optional LZ4 body
// ---------------------------------------------------------------------------
//
// Archive layout (little-endian):
//   header            signature + version + engine id
//   flags             u32 (bit 0 = LZ4 compressed)
//   uncompressed size u32
//   checksum          u32, xxHash32 of the stored body
//   body              SaveGame encoding; LZ4 with a u32 size prefix when
//                     compressed
//
// On save: encode SaveGame -> compress -> checksum the stored bytes.
// On load: validate header -> verify checksum -> decompress -> decode.

use std::borrow::Cow;

use byteorder::{ByteOrder, LittleEndian};
use xxhash_rust::xxh32::xxh32;

use crate::codec::{SaveReader, SaveWriter};
use crate::game::SaveGame;
use crate::header::SaveHeader;
use crate::profile::EngineProfile;
use crate::save_error::{SaveError, SaveResult};
use crate::version::Format;
use crate::warning::LoadWarning;

/// Body is LZ4 block-compressed with a size prefix.
pub const FLAG_COMPRESSED: u32 = 1 << 0;

/// Seed for the xxHash32 body checksum.
const XXHASH_SEED: u32 = 0;

/// Largest accepted uncompressed body. Guards the decompression buffer
/// against a forged size field.
pub const MAX_BODY_LEN: usize = 256 * 1024 * 1024;

pub fn encode_archive(
    header: &SaveHeader,
    game: &SaveGame,
    format: Format,
    compress: bool,
) -> SaveResult<Vec<u8>> {
    let mut body = SaveWriter::with_capacity(4096);
    game.encode(&mut body, format)?;
    let body = body.into_bytes();
    let uncompressed_len = u32::try_from(body.len()).map_err(|_| SaveError::MalformedLength {
        field: "payload.size",
        offset: 0,
        length: body.len() as i64,
    })?;

    let (flags, stored) = if compress {
        (FLAG_COMPRESSED, lz4_flex::compress_prepend_size(&body))
    } else {
        (0, body)
    };

    let mut w = SaveWriter::with_capacity(stored.len() + 64);
    header.encode(&mut w)?;
    w.write_u32(flags);
    w.write_u32(uncompressed_len);
    w.write_u32(xxh32(&stored, XXHASH_SEED));
    w.write_raw(&stored);
    Ok(w.into_bytes())
}

pub fn decode_archive(
    bytes: &[u8],
    profile: &EngineProfile,
) -> SaveResult<(SaveGame, Vec<LoadWarning>)> {
    let mut r = SaveReader::new(bytes);
    let checked = SaveHeader::decode(&mut r, profile)?;

    let flags_offset = r.position();
    let flags = r.read_u32("payload.flags")?;
    if flags & !FLAG_COMPRESSED != 0 {
        return Err(SaveError::UnknownDiscriminant {
            field: "payload.flags",
            offset: flags_offset,
            value: flags,
        });
    }
    let size_offset = r.position();
    let size = r.read_u32("payload.size")? as usize;
    let expected = r.read_u32("payload.checksum")?;
    let stored = r.rest();

    let computed = xxh32(stored, XXHASH_SEED);
    if computed != expected {
        return Err(SaveError::ChecksumMismatch { expected, computed });
    }
    if size > MAX_BODY_LEN {
        return Err(SaveError::MalformedLength {
            field: "payload.size",
            offset: size_offset,
            length: size as i64,
        });
    }

    let body: Cow<'_, [u8]> = if flags & FLAG_COMPRESSED != 0 {
        if stored.len() < 4 {
            return Err(SaveError::Decompress(
                "compressed body is missing its size prefix".to_string(),
            ));
        }
        let prefixed = LittleEndian::read_u32(&stored[..4]) as usize;
        if prefixed != size {
            return Err(SaveError::Decompress(format!(
                "size prefix {prefixed} does not match archive size {size}"
            )));
        }
        Cow::Owned(lz4_flex::decompress_size_prepended(stored)?)
    } else {
        if stored.len() != size {
            return Err(SaveError::MalformedLength {
                field: "payload.size",
                offset: size_offset,
                length: size as i64,
            });
        }
        Cow::Borrowed(stored)
    };

    let mut body_reader = SaveReader::new(&body);
    let game = SaveGame::decode(&mut body_reader, checked.format)?;
    Ok((game, checked.warnings))
}
