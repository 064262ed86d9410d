//! Fixed-width identity and hash values shared by every component.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity of any of the three balances.
pub type Amount = u128;

/// Block height as reported by the block oracle.
pub type BlockIndex = u64;

/// A 32-byte hash value.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The all-zero value. Never produced by Keccak-256 in practice and
    /// therefore usable as a sentinel.
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Wraps raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if every byte is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Least significant bit when the bytes are read as a big-endian integer.
    #[inline]
    pub fn low_bit(&self) -> u8 {
        self.0[31] & 1
    }

    /// Builds a hash whose trailing eight bytes hold `value` (big-endian).
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self)
    }
}

/// A 20-byte account identity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wraps raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convenience constructor with every byte set to `byte`.
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; 20])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_detection() {
        assert!(Hash32::ZERO.is_zero());
        assert!(!Hash32::from_low_u64(1).is_zero());
    }

    #[test]
    fn test_low_bit_reads_last_byte() {
        assert_eq!(Hash32::from_low_u64(2).low_bit(), 0);
        assert_eq!(Hash32::from_low_u64(3).low_bit(), 1);
    }

    #[test]
    fn test_display_is_prefixed_hex() {
        let addr = Address::repeat(0xab);
        let text = addr.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(text.len(), 2 + 40);
    }
}
