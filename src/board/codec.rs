//! Binary snapshot format.
//!
//! ## Layout
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..4  | magic `b"UNIB"` |
//! | 4..6  | format version, little-endian `u16` |
//! | 6     | `BoardKind` that wrote the snapshot |
//! | 7..   | `bincode` encoding of `BoardState` |
//!
//! A snapshot only decodes into the variant that wrote it. Convert between
//! variants with `Board::snapshot` and `Board::from_state` instead.

use std::path::Path;

use tracing::warn;

use super::state::BoardState;
use super::BoardKind;
use crate::error::{BoardError, Result};

const MAGIC: &[u8; 4] = b"UNIB";
const VERSION: u16 = 1;
const HEADER_LEN: usize = 7;

pub(crate) fn encode(kind: BoardKind, state: &BoardState) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + 256);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.push(kind as u8);
    bincode::serialize_into(&mut bytes, state)?;
    Ok(bytes)
}

pub(crate) fn decode(expected: BoardKind, bytes: &[u8]) -> Result<BoardState> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        warn!(len = bytes.len(), "rejecting snapshot without magic");
        return Err(BoardError::BadMagic);
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        warn!(version, "rejecting snapshot version");
        return Err(BoardError::UnsupportedVersion(version));
    }

    let found = BoardKind::from_byte(bytes[6])
        .ok_or_else(|| BoardError::InvalidState(format!("unknown board kind {}", bytes[6])))?;
    if found != expected {
        warn!(%expected, %found, "rejecting snapshot of another board kind");
        return Err(BoardError::KindMismatch { expected, found });
    }

    Ok(bincode::deserialize(&bytes[HEADER_LEN..])?)
}

pub(crate) fn write_file(path: &Path, kind: BoardKind, state: &BoardState) -> Result<()> {
    std::fs::write(path, encode(kind, state)?)?;
    Ok(())
}

pub(crate) fn read_file(path: &Path, expected: BoardKind) -> Result<BoardState> {
    decode(expected, &std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoardConfig;
    use crate::level::Level;

    fn sample() -> BoardState {
        let level = Level::parse(&["#######", "#.pcm.#", "#######"]).unwrap();
        BoardState::from_level(&level, BoardConfig::default())
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(BoardKind::Packed, &sample()).unwrap();

        assert_eq!(&bytes[..4], b"UNIB");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), VERSION);
        assert_eq!(bytes[6], BoardKind::Packed as u8);
    }

    #[test]
    fn test_decode_round_trip() {
        let state = sample();
        let bytes = encode(BoardKind::Indexed, &state).unwrap();
        assert_eq!(decode(BoardKind::Indexed, &bytes).unwrap(), state);
    }

    #[test]
    fn test_decode_rejects_bad_headers() {
        let mut bytes = encode(BoardKind::Canonical, &sample()).unwrap();

        assert!(matches!(decode(BoardKind::Canonical, &bytes[..3]), Err(BoardError::BadMagic)));
        assert!(matches!(
            decode(BoardKind::Packed, &bytes),
            Err(BoardError::KindMismatch { expected: BoardKind::Packed, found: BoardKind::Canonical })
        ));

        bytes[4] = 9;
        assert!(matches!(decode(BoardKind::Canonical, &bytes), Err(BoardError::UnsupportedVersion(9))));

        bytes[0] = b'X';
        assert!(matches!(decode(BoardKind::Canonical, &bytes), Err(BoardError::BadMagic)));
    }

    #[test]
    fn test_decode_rejects_truncated_body() {
        let bytes = encode(BoardKind::Canonical, &sample()).unwrap();
        let truncated = &bytes[..bytes.len() - 5];

        assert!(matches!(decode(BoardKind::Canonical, truncated), Err(BoardError::Codec(_))));
    }
}
