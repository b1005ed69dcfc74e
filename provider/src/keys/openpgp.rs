//! OpenPGP packet framing and key fingerprints.
//!
//! Only what is needed to identify a public key is implemented: walking the
//! packet stream to the first public key packet and hashing its body.

use super::SigningKey;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Packet tag of a primary public key.
const PUBLIC_KEY_TAG: u8 = 6;

/// Errors arising while reading OpenPGP packets.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PacketError {
    /// The data ended in the middle of a packet.
    #[error("truncated packet at offset {offset}")]
    Truncated {
        /// Offset of the packet header.
        offset: usize,
    },

    /// A byte that should start a packet header has its high bit clear.
    #[error("invalid packet header byte {byte:#04x} at offset {offset}")]
    InvalidHeader {
        /// The offending byte.
        byte: u8,
        /// Its offset in the data.
        offset: usize,
    },

    /// Partial body lengths are not allowed for key packets.
    #[error("unsupported partial body length at offset {offset}")]
    PartialLength {
        /// Offset of the packet header.
        offset: usize,
    },

    /// No public key packet was found.
    #[error("no public key packet found")]
    MissingPublicKey,

    /// The public key packet has a version this crate cannot fingerprint.
    #[error("unsupported public key version {0}")]
    UnsupportedVersion(u8),

    /// The key packet is larger than its version allows.
    #[error("public key packet of {0} bytes is too large")]
    Oversized(usize),
}

/// A single packet borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Packet<'a> {
    tag: u8,
    body: &'a [u8],
}

/// Identify the first public key in `data`.
///
/// # Errors
///
/// Returns a [`PacketError`] if the packet stream is malformed, holds no
/// public key, or the key version is not 4, 5 or 6.
pub fn identify(data: &[u8]) -> Result<SigningKey, PacketError> {
    let body = find_public_key(data)?;
    fingerprint(body)
}

fn find_public_key(data: &[u8]) -> Result<&[u8], PacketError> {
    let mut offset = 0;
    while offset < data.len() {
        let (packet, next) = read_packet(data, offset)?;
        if packet.tag == PUBLIC_KEY_TAG {
            return Ok(packet.body);
        }
        offset = next;
    }
    Err(PacketError::MissingPublicKey)
}

/// Read the packet starting at `offset`; returns it and the next offset.
fn read_packet(data: &[u8], offset: usize) -> Result<(Packet<'_>, usize), PacketError> {
    let truncated = PacketError::Truncated { offset };
    let header = *data.get(offset).ok_or_else(|| truncated.clone())?;
    if header & 0x80 == 0 {
        return Err(PacketError::InvalidHeader {
            byte: header,
            offset,
        });
    }

    let (tag, body_start, body_len) = if header & 0x40 != 0 {
        let tag = header & 0x3F;
        let (len, consumed) = new_format_length(data, offset)?;
        (tag, offset + 1 + consumed, len)
    } else {
        let tag = (header >> 2) & 0x0F;
        let (len, consumed) = old_format_length(data, offset, header & 0x03)?;
        (tag, offset + 1 + consumed, len)
    };

    let body_end = body_start
        .checked_add(body_len)
        .ok_or_else(|| truncated.clone())?;
    let body = data.get(body_start..body_end).ok_or(truncated)?;
    Ok((Packet { tag, body }, body_end))
}

fn length_bytes(data: &[u8], offset: usize, count: usize) -> Result<&[u8], PacketError> {
    data.get(offset + 1..offset + 1 + count)
        .ok_or(PacketError::Truncated { offset })
}

fn be_length(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte))
}

/// Body length of a new-format packet and the number of length octets.
fn new_format_length(data: &[u8], offset: usize) -> Result<(usize, usize), PacketError> {
    let first = *length_bytes(data, offset, 1)?
        .first()
        .ok_or(PacketError::Truncated { offset })?;
    match first {
        0..=191 => Ok((usize::from(first), 1)),
        192..=223 => {
            let bytes = length_bytes(data, offset, 2)?;
            let second = bytes.get(1).copied().unwrap_or_default();
            Ok((
                ((usize::from(first) - 192) << 8) + usize::from(second) + 192,
                2,
            ))
        }
        255 => {
            let bytes = length_bytes(data, offset, 5)?;
            Ok((be_length(bytes.get(1..).unwrap_or_default()), 5))
        }
        _ => Err(PacketError::PartialLength { offset }),
    }
}

/// Body length of an old-format packet and the number of length octets.
fn old_format_length(
    data: &[u8],
    offset: usize,
    length_type: u8,
) -> Result<(usize, usize), PacketError> {
    let count = match length_type {
        0 => 1,
        1 => 2,
        2 => 4,
        // Indeterminate length: the packet runs to the end of the data.
        _ => return Ok((data.len().saturating_sub(offset + 1), 0)),
    };
    let bytes = length_bytes(data, offset, count)?;
    Ok((be_length(bytes), count))
}

/// Compute key id and fingerprint from a public key packet body.
fn fingerprint(body: &[u8]) -> Result<SigningKey, PacketError> {
    let version = *body.first().ok_or(PacketError::Truncated { offset: 0 })?;
    match version {
        4 => {
            let len = u16::try_from(body.len()).map_err(|_| PacketError::Oversized(body.len()))?;
            let mut hasher = Sha1::new();
            hasher.update([0x99]);
            hasher.update(len.to_be_bytes());
            hasher.update(body);
            let digest = hasher.finalize();
            Ok(SigningKey::new(
                &hex::encode_upper(digest.get(12..).unwrap_or_default()),
                &format!("{digest:X}"),
            ))
        }
        5 | 6 => {
            let len = u32::try_from(body.len()).map_err(|_| PacketError::Oversized(body.len()))?;
            let prefix = if version == 6 { 0x9B } else { 0x9A };
            let mut hasher = Sha256::new();
            hasher.update([prefix]);
            hasher.update(len.to_be_bytes());
            hasher.update(body);
            let digest = hasher.finalize();
            Ok(SigningKey::new(
                &hex::encode_upper(digest.get(..8).unwrap_or_default()),
                &format!("{digest:X}"),
            ))
        }
        other => Err(PacketError::UnsupportedVersion(other)),
    }
}
