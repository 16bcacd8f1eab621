use crate::error::DiscoveryError;
use std::fmt;
use std::str::FromStr;

/// Hardware address, rendered as `XX:XX:XX:XX:XX:XX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

impl FromStr for MacAddress {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();

        if parts.len() != 6 {
            return Err(DiscoveryError::InvalidMac(
                "MAC address must contain 6 bytes separated by ':'".to_string(),
            ));
        }

        let mut bytes = [0u8; 6];

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(DiscoveryError::InvalidMac(format!(
                    "Invalid octet: '{}'",
                    part
                )));
            }
            bytes[i] = u8::from_str_radix(part, 16).map_err(|_| {
                DiscoveryError::InvalidMac(format!("Invalid octet: '{}'", part))
            })?;
        }

        Ok(MacAddress(bytes))
    }
}
