use crate::errors::*;
use eui48::MacAddress;
use std::fmt;
use std::str::FromStr;

const SEPARATORS: [char; 3] = [':', '-', '.'];
const MAX_HEX_DIGITS: usize = 12;

/// Number of hex digits in a registry prefix (the OUI).
pub const PREFIX_LEN: usize = 6;

/// A MAC address reduced to uppercase hex digits with separators removed.
///
/// Only an upper bound on length is enforced. Anything shorter than a full
/// prefix is still accepted and simply never matches a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedAddress(String);

impl NormalizedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The vendor-table key, or `None` if the address is too short to have one.
    pub fn prefix(&self) -> Option<&str> {
        self.0.get(..PREFIX_LEN)
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NormalizedAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl From<MacAddress> for NormalizedAddress {
    fn from(mac: MacAddress) -> Self {
        let hex = mac.as_bytes()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        NormalizedAddress(hex)
    }
}

/// Drops `:`, `-` and `.` and uppercases the rest, without validating.
pub(crate) fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !SEPARATORS.contains(c))
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn normalize(raw: &str) -> Result<NormalizedAddress> {
    let mac = strip_separators(raw);

    if mac.is_empty() {
        bail!(ErrorKind::InvalidAddress(raw.to_string(), "no hex digits".to_string()));
    }

    if !mac.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!(ErrorKind::InvalidAddress(raw.to_string(), "contains unexpected character".to_string()));
    }

    if mac.len() > MAX_HEX_DIGITS {
        bail!(ErrorKind::InvalidAddress(raw.to_string(), "too long".to_string()));
    }

    Ok(NormalizedAddress(mac))
}
