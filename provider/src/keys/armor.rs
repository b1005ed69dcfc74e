//! ASCII armour decoding for OpenPGP public key blocks.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const BEGIN_MARKER: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";
const END_MARKER: &str = "-----END PGP PUBLIC KEY BLOCK-----";

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;
const CRC24_MASK: u32 = 0x00FF_FFFF;

/// Errors arising while removing the armour.
#[derive(Debug, thiserror::Error)]
pub enum ArmorError {
    /// No public key block header was found.
    #[error("missing `-----BEGIN PGP PUBLIC KEY BLOCK-----` line")]
    MissingBegin,

    /// The block is not terminated.
    #[error("missing `-----END PGP PUBLIC KEY BLOCK-----` line")]
    MissingEnd,

    /// The payload is not valid base64.
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The checksum line is malformed.
    #[error("malformed armour checksum `{0}`")]
    MalformedChecksum(String),

    /// The payload does not match its checksum.
    #[error("armour checksum mismatch: expected {expected:06X}, computed {computed:06X}")]
    ChecksumMismatch {
        /// Checksum carried by the armour.
        expected: u32,
        /// Checksum of the decoded payload.
        computed: u32,
    },
}

/// Returns true when `raw` looks like an armoured public key block.
#[must_use]
pub fn is_armored(raw: &[u8]) -> bool {
    raw.windows(BEGIN_MARKER.len())
        .any(|window| window == BEGIN_MARKER.as_bytes())
}

/// Decode the first public key block found in `text`.
///
/// Armour headers such as `Comment:` are skipped. The CRC-24 checksum line
/// is verified when present.
///
/// # Errors
///
/// Returns an [`ArmorError`] if the block is incomplete, the payload is not
/// base64, or the checksum does not match.
pub fn decode(text: &str) -> Result<Vec<u8>, ArmorError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .skip_while(|line| *line != BEGIN_MARKER);

    if lines.next().is_none() {
        return Err(ArmorError::MissingBegin);
    }

    let mut payload = String::new();
    let mut checksum = None;
    let mut terminated = false;

    for line in lines {
        if line == END_MARKER {
            terminated = true;
            break;
        }
        // Base64 never contains `:`, so such lines are armour headers.
        if line.is_empty() || line.contains(':') {
            continue;
        }
        if let Some(encoded) = line.strip_prefix('=') {
            checksum = Some(encoded.to_owned());
            continue;
        }
        payload.push_str(line);
    }

    if !terminated {
        return Err(ArmorError::MissingEnd);
    }

    let data = STANDARD.decode(payload.as_bytes())?;
    if let Some(encoded) = checksum {
        verify_checksum(&encoded, &data)?;
    }
    Ok(data)
}

fn verify_checksum(encoded: &str, data: &[u8]) -> Result<(), ArmorError> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| ArmorError::MalformedChecksum(encoded.to_owned()))?;
    let [high, middle, low] = bytes.as_slice() else {
        return Err(ArmorError::MalformedChecksum(encoded.to_owned()));
    };

    let expected = (u32::from(*high) << 16) | (u32::from(*middle) << 8) | u32::from(*low);
    let computed = crc24(data);
    if expected == computed {
        Ok(())
    } else {
        Err(ArmorError::ChecksumMismatch { expected, computed })
    }
}

/// CRC-24 as used by OpenPGP armour.
fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for byte in data {
        crc ^= u32::from(*byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & CRC24_MASK
}
