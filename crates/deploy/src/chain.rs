//! Chain identifiers and the factory registry.

use std::{collections::BTreeMap, str::FromStr};

use alloy_core::primitives::{Address, address};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

use crate::LaunchpadError;

/// Identifier of an EVM network (EIP-155). Always positive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Deref, Serialize,
    Deserialize,
)]
#[serde(into = "u64", try_from = "u64")]
pub struct ChainId(u64);

impl ChainId {
    pub fn new(id: u64) -> Result<Self, LaunchpadError> {
        if id == 0 {
            return Err(LaunchpadError::validation("chain id must be positive"));
        }
        Ok(Self(id))
    }

    /// The `0x`-prefixed hexadecimal form wallets expect.
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Parse a chain id typed by a user, either `0x`-hex or decimal.
    ///
    /// A malformed hex input falls back to decimal parsing, so `"0x"` and
    /// `"abc"` both end up as validation errors instead of a garbage id.
    pub fn parse_user_input(input: &str) -> Result<Self, LaunchpadError> {
        let input = input.trim();

        let from_hex = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .and_then(|digits| u64::from_str_radix(digits, 16).ok());

        let id = match from_hex {
            Some(id) => id,
            None => input.parse::<u64>().map_err(|_| {
                LaunchpadError::validation(format!("chain id '{}' is not a number", input))
            })?,
        };

        Self::new(id)
    }
}

impl TryFrom<u64> for ChainId {
    type Error = LaunchpadError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl FromStr for ChainId {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_user_input(s)
    }
}

/// Factory contracts deployed ahead of time, keyed by chain id.
const BUILTIN_FACTORIES: &[(u64, Address)] = &[
    // Sepolia
    (11155111, address!("1234567890123456789012345678901234567890")),
    // Goerli
    (5, address!("0987654321098765432109876543210987654321")),
];

/// Look up the built-in factory for a chain.
pub fn lookup_factory(chain_id: ChainId) -> Option<Address> {
    BUILTIN_FACTORIES
        .iter()
        .find(|(id, _)| *id == *chain_id)
        .map(|(_, factory)| *factory)
}

/// A factory registered through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryEntry {
    pub chain_id: ChainId,
    pub address: Address,
}

/// Built-in factory table extended with configured entries.
///
/// Configured entries take precedence over built-in ones for the same chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoryRegistry {
    overrides: BTreeMap<ChainId, Address>,
}

impl FactoryRegistry {
    pub fn new(entries: impl IntoIterator<Item = FactoryEntry>) -> Self {
        Self {
            overrides: entries
                .into_iter()
                .map(|entry| (entry.chain_id, entry.address))
                .collect(),
        }
    }

    pub fn lookup(&self, chain_id: ChainId) -> Option<Address> {
        self.overrides
            .get(&chain_id)
            .copied()
            .or_else(|| lookup_factory(chain_id))
    }

    /// All chains with a factory, sorted by chain id.
    pub fn entries(&self) -> Vec<FactoryEntry> {
        let mut all: BTreeMap<ChainId, Address> = BUILTIN_FACTORIES
            .iter()
            .map(|(id, address)| (ChainId(*id), *address))
            .collect();
        all.extend(self.overrides.iter().map(|(id, address)| (*id, *address)));

        all.into_iter()
            .map(|(chain_id, address)| FactoryEntry { chain_id, address })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(id: u64) -> ChainId {
        ChainId::new(id).unwrap()
    }

    #[test]
    fn test_lookup_factory_known_chains() {
        assert_eq!(
            lookup_factory(chain(11155111)),
            Some(address!("1234567890123456789012345678901234567890"))
        );
        assert_eq!(
            lookup_factory(chain(5)),
            Some(address!("0987654321098765432109876543210987654321"))
        );
    }

    #[test]
    fn test_lookup_factory_unknown_chain() {
        assert_eq!(lookup_factory(chain(1)), None);
        assert_eq!(lookup_factory(chain(137)), None);
    }

    #[test]
    fn test_lookup_factory_is_stable() {
        for id in [1, 5, 10, 8453, 11155111] {
            assert_eq!(lookup_factory(chain(id)), lookup_factory(chain(id)));
        }
    }

    #[test]
    fn test_registry_overrides_take_precedence() {
        let custom = address!("00000000000000000000000000000000000000aa");
        let registry = FactoryRegistry::new([
            FactoryEntry { chain_id: chain(5), address: custom },
            FactoryEntry { chain_id: chain(31337), address: custom },
        ]);

        assert_eq!(registry.lookup(chain(5)), Some(custom));
        assert_eq!(registry.lookup(chain(31337)), Some(custom));
        assert_eq!(
            registry.lookup(chain(11155111)),
            lookup_factory(chain(11155111))
        );
        assert_eq!(registry.entries().len(), 3);
    }

    #[test]
    fn test_chain_id_rejects_zero() {
        assert!(ChainId::new(0).is_err());
        assert!(ChainId::try_from(0).is_err());
        assert!(serde_json::from_str::<ChainId>("0").is_err());
        assert_eq!(serde_json::from_str::<ChainId>("10").unwrap(), chain(10));
        assert_eq!(serde_json::to_string(&chain(10)).unwrap(), "10");
    }

    #[test]
    fn test_parse_user_input() {
        assert_eq!(ChainId::parse_user_input("0x10").unwrap(), chain(16));
        assert_eq!(ChainId::parse_user_input("0XaA36A7").unwrap(), chain(11155111));
        assert_eq!(ChainId::parse_user_input(" 1234 ").unwrap(), chain(1234));
        assert_eq!(chain(1234).to_hex(), "0x4d2");
    }

    #[test]
    fn test_parse_user_input_malformed() {
        for input in ["0x", "abc", "", "0xzz", "12ab", "-5", "0"] {
            let err = ChainId::parse_user_input(input).unwrap_err();
            assert!(
                matches!(err, LaunchpadError::Validation(_)),
                "input {input:?} should fail validation"
            );
        }
    }
}
