use serde::{Deserialize, Serialize};
use std::fmt;

/// How a service is priced, stored as SMALLINT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum PriceType {
    #[default]
    Fixed = 0,
    Hourly = 1,
    Daily = 2,
    Negotiable = 3,
}

impl PriceType {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use PriceType::*;
        match self {
            Fixed => "FIXED",
            Hourly => "HOURLY",
            Daily => "DAILY",
            Negotiable => "NEGOTIABLE",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use PriceType::*;
        match id {
            0 => Some(Fixed),
            1 => Some(Hourly),
            2 => Some(Daily),
            3 => Some(Negotiable),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        use PriceType::*;
        match code.trim().to_ascii_uppercase().as_str() {
            "FIXED" => Some(Fixed),
            "HOURLY" => Some(Hourly),
            "DAILY" => Some(Daily),
            "NEGOTIABLE" => Some(Negotiable),
            _ => None,
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
