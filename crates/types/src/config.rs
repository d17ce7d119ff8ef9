//! Device configuration type tags.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type tag attached to a device configuration value.
///
/// These mirror the firmware's C type names, which is why `Display` and
/// `FromStr` use forms like `uint32_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigType {
    /// `uint8_t`
    U8,
    /// `uint16_t`
    U16,
    /// `uint32_t`
    U32,
    /// `int8_t`
    I8,
    /// `int16_t`
    I16,
    /// `int32_t`
    I32,
}

impl ConfigType {
    /// The C name of this type tag.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigType::U8 => "uint8_t",
            ConfigType::U16 => "uint16_t",
            ConfigType::U32 => "uint32_t",
            ConfigType::I8 => "int8_t",
            ConfigType::I16 => "int16_t",
            ConfigType::I32 => "int32_t",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint8_t" => Ok(ConfigType::U8),
            "uint16_t" => Ok(ConfigType::U16),
            "uint32_t" => Ok(ConfigType::U32),
            "int8_t" => Ok(ConfigType::I8),
            "int16_t" => Ok(ConfigType::I16),
            "int32_t" => Ok(ConfigType::I32),
            _ => Err(ParseError::Unrecognized {
                text: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for name in ["uint8_t", "uint16_t", "uint32_t", "int8_t", "int16_t", "int32_t"] {
            let ty: ConfigType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert!("float".parse::<ConfigType>().is_err());
    }
}
