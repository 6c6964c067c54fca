//! Execution-layer account address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// A 20-byte execution-layer address, rendered as `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        if stripped.len() != 40 || !stripped.is_ascii() {
            return Err(TypeError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &stripped[i * 2..i * 2 + 2];
            *byte =
                u8::from_str_radix(pair, 16).map_err(|_| TypeError::InvalidAddress(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

// Inline hex encoding to avoid adding the `hex` crate as a dependency of types.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let addr = Address::new([0x11; 20]);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn parse_accepts_unprefixed_hex() {
        let parsed: Address = "1111111111111111111111111111111111111111".parse().unwrap();
        assert_eq!(parsed, Address::new([0x11; 20]));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!("0xzz11111111111111111111111111111111111111"
            .parse::<Address>()
            .is_err());
    }
}
