//! Ledger account addresses
//!
//! An address is a signed 8-bit workchain id plus a 256-bit account id. Two
//! textual forms circulate:
//!
//! - **raw**: `0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8`
//! - **user-friendly**: 48 base64 characters encoding
//!   `flags(1) | workchain(1) | account(32) | crc16(2)`
//!
//! Config services and indexers hand out the friendly form; contract getters
//! and logs use the raw form. Both parse through `FromStr`.

use crate::common::errors::AddressError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use crc::{Crc, CRC_16_XMODEM};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const FLAG_BOUNCEABLE: u8 = 0x11;
const FLAG_NON_BOUNCEABLE: u8 = 0x51;
const FLAG_TEST_ONLY: u8 = 0x80;
const FRIENDLY_LEN: usize = 36;

/// Standard (non-anycast) account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl Address {
    /// Basechain id
    pub const BASECHAIN: i8 = 0;

    /// Masterchain id
    pub const MASTERCHAIN: i8 = -1;

    pub const fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Parse `<workchain>:<64 hex chars>`
    pub fn parse_raw(s: &str) -> Result<Self, AddressError> {
        let invalid = |reason: &str| AddressError::InvalidRaw {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (wc, account) = s.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
        let workchain = wc
            .parse::<i8>()
            .map_err(|_| invalid("workchain is not an 8-bit signed integer"))?;
        if account.len() != 64 {
            return Err(invalid("account id must be 64 hex chars"));
        }

        let mut hash = [0u8; 32];
        hex::decode_to_slice(account, &mut hash).map_err(|_| invalid("account id is not hex"))?;

        Ok(Self { workchain, hash })
    }

    /// Parse the 48-char user-friendly form (url-safe or standard alphabet)
    pub fn parse_friendly(s: &str) -> Result<FriendlyAddress, AddressError> {
        let invalid = |reason: &str| AddressError::InvalidFriendly {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if s.len() != 48 {
            return Err(invalid("expected 48 characters"));
        }
        let bytes = if s.contains('-') || s.contains('_') {
            URL_SAFE.decode(s)
        } else {
            STANDARD.decode(s)
        }
        .map_err(|e| invalid(&e.to_string()))?;

        if bytes.len() != FRIENDLY_LEN {
            return Err(invalid("decoded length is not 36 bytes"));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual = crc16(&bytes[..34]);
        if expected != actual {
            return Err(AddressError::ChecksumMismatch { expected, actual });
        }

        let mut flags = bytes[0];
        let test_only = flags & FLAG_TEST_ONLY != 0;
        flags &= !FLAG_TEST_ONLY;
        let bounceable = match flags {
            FLAG_BOUNCEABLE => true,
            FLAG_NON_BOUNCEABLE => false,
            _ => return Err(AddressError::UnknownFlags { flags: bytes[0] }),
        };

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);

        Ok(FriendlyAddress {
            address: Self {
                workchain: bytes[1] as i8,
                hash,
            },
            bounceable,
            test_only,
        })
    }

    /// Raw `<workchain>:<hex>` form
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// User-friendly url-safe form
    pub fn to_friendly(&self, bounceable: bool, test_only: bool) -> String {
        let mut bytes = [0u8; FRIENDLY_LEN];
        bytes[0] = if bounceable {
            FLAG_BOUNCEABLE
        } else {
            FLAG_NON_BOUNCEABLE
        };
        if test_only {
            bytes[0] |= FLAG_TEST_ONLY;
        }
        bytes[1] = self.workchain as u8;
        bytes[2..34].copy_from_slice(&self.hash);
        let crc = crc16(&bytes[..34]);
        bytes[34..].copy_from_slice(&crc.to_be_bytes());
        URL_SAFE.encode(bytes)
    }
}

/// Parsed user-friendly address with its presentation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendlyAddress {
    pub address: Address,
    pub bounceable: bool,
    pub test_only: bool,
}

/// CRC16/XMODEM over the first 34 bytes of a friendly address
const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

fn crc16(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s).map(|f| f.address)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
