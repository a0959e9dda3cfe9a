//! Core market types: holder addresses, curve parameters, quotes.
//!
//! All currency amounts and token quantities are unsigned integers in base
//! units. `u128` is wide enough for every curve term the market accepts;
//! anything beyond it is rejected, never wrapped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    ADDRESS_LEN, ADDRESS_PREFIX, DEFAULT_BASE_PRICE, DEFAULT_COOLDOWN_SECS, DEFAULT_SLOPE,
};
use crate::error::AddressError;

/// Currency amount in base units.
pub type Amount = u128;

/// Token quantity in whole units.
pub type Quantity = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 20-byte holder address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Create an address from a byte array.
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ADDRESS_PREFIX}{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse a `0x`-prefixed, 40-hex-digit address. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(ADDRESS_PREFIX)
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let arr: [u8; ADDRESS_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable parameters of a linear bonding curve.
///
/// Unit price at supply `x` is `slope * x + base_price`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveParams {
    /// Price units added per unit of outstanding supply.
    pub slope: u128,
    /// Price of the first unit when supply is zero.
    pub base_price: u128,
    /// Seconds a holder must wait after a purchase before selling.
    pub cooldown_secs: u64,
}

impl CurveParams {
    /// Parameters with the given slope, no price floor and no cooldown.
    pub fn linear(slope: u128) -> Self {
        Self {
            slope,
            base_price: DEFAULT_BASE_PRICE,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
        }
    }

    /// Set the price floor.
    pub fn with_base_price(mut self, base_price: u128) -> Self {
        self.base_price = base_price;
        self
    }

    /// Set the post-purchase cooldown.
    pub fn with_cooldown(mut self, cooldown_secs: u64) -> Self {
        self.cooldown_secs = cooldown_secs;
        self
    }

    /// Whether the curve is flat (every unit priced at `base_price`).
    pub fn is_flat(&self) -> bool {
        self.slope == 0
    }
}

impl Default for CurveParams {
    fn default() -> Self {
        Self::linear(DEFAULT_SLOPE)
    }
}

/// Direction of a market move.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Mint units, supply increases.
    Buy,
    /// Burn units, supply decreases.
    Sell,
}

/// Priced supply move, produced without touching market state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub side: Side,
    pub quantity: Quantity,
    pub supply_before: Quantity,
    pub supply_after: Quantity,
    /// Cost for a buy, proceeds for a sell.
    pub amount: Amount,
    /// Spot price before the move.
    pub price_before: Amount,
    /// Spot price after the move.
    pub price_after: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        Address([seed; ADDRESS_LEN])
    }

    #[test]
    fn address_display_is_prefixed_lower_hex() {
        let a = addr(0xAB);
        assert_eq!(a.to_string(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn address_parse_roundtrip() {
        let a = addr(0x1f);
        let parsed: Address = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn address_parse_accepts_uppercase() {
        let text = format!("0X{}", "CD".repeat(20));
        assert_eq!(text.parse::<Address>().unwrap(), addr(0xCD));
    }

    #[test]
    fn address_parse_rejects_missing_prefix() {
        assert_eq!("ab".repeat(20).parse::<Address>(), Err(AddressError::MissingPrefix));
    }

    #[test]
    fn address_parse_rejects_short() {
        assert_eq!("0xabcd".parse::<Address>(), Err(AddressError::InvalidLength(2)));
    }

    #[test]
    fn address_parse_rejects_bad_hex() {
        let text = format!("0x{}", "zz".repeat(20));
        assert!(matches!(text.parse::<Address>(), Err(AddressError::InvalidHex(_))));
    }

    #[test]
    fn address_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!addr(1).is_zero());
    }

    #[test]
    fn address_serde_as_string() {
        let a = addr(7);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{a}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn curve_params_defaults() {
        let p = CurveParams::default();
        assert_eq!(p.slope, DEFAULT_SLOPE);
        assert_eq!(p.base_price, 0);
        assert_eq!(p.cooldown_secs, 0);
        assert!(!p.is_flat());
    }

    #[test]
    fn curve_params_builders() {
        let p = CurveParams::linear(0).with_base_price(5).with_cooldown(60);
        assert!(p.is_flat());
        assert_eq!(p.base_price, 5);
        assert_eq!(p.cooldown_secs, 60);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_form_parses_back(bytes in any::<[u8; ADDRESS_LEN]>()) {
                let a = Address(bytes);
                let text = a.to_string();
                prop_assert!(text.starts_with(ADDRESS_PREFIX));
                prop_assert_eq!(text.len(), 42);
                prop_assert_eq!(text.parse::<Address>().unwrap(), a);
                prop_assert_eq!(text.to_uppercase().replacen("0X", "0x", 1).parse::<Address>().unwrap(), a);
            }
        }
    }
}
