//! Base58 device UIDs.

use crate::Error;

const ALPHABET: &[u8; 58] = b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Decode a base58 UID string into the 32-bit UID used on the wire.
///
/// UIDs wider than 32 bits are folded down the same way the hub does it.
pub fn decode(uid: &str) -> Result<u32, Error> {
    let invalid = || Error::InvalidUid(uid.to_owned());
    if uid.is_empty() {
        return Err(invalid());
    }

    let mut value: u64 = 0;
    for c in uid.bytes() {
        let digit = ALPHABET.iter().position(|&a| a == c).ok_or_else(invalid)?;
        value = value
            .checked_mul(58)
            .and_then(|v| v.checked_add(digit as u64))
            .ok_or_else(invalid)?;
    }

    if value <= u32::MAX as u64 {
        return Ok(value as u32);
    }

    let low = value as u32;
    let high = (value >> 32) as u32;
    Ok((low & 0x0000_0FFF)
        | ((low & 0x0F00_0000) >> 12)
        | ((high & 0x0000_003F) << 16)
        | ((high & 0x000F_0000) << 6)
        | ((high & 0x3F00_0000) << 2))
}

pub fn encode(mut value: u32) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(ALPHABET[(value % 58) as usize]);
        value /= 58;
        if value == 0 {
            break;
        }
    }
    digits.reverse();
    // Alphabet is ASCII.
    String::from_utf8(digits).unwrap_or_default()
}
