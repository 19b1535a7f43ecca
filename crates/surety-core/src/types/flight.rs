//! Flight keys and status codes.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::errors::{SuretyError, SuretyResult};
use crate::types::AccountId;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Deterministic key of a flight: SHA-256 over (airline, flight number, departure time)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FlightKey(pub [u8; 32]);

impl FlightKey {
    pub fn derive(airline: &AccountId, flight_number: &str, departure_time: i64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(airline.as_bytes());
        // Length prefix keeps ("AB", 1) and ("A", ...) from colliding
        hasher.update((flight_number.len() as u64).to_be_bytes());
        hasher.update(flight_number.as_bytes());
        hasher.update(departure_time.to_be_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightKey(")?;
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..)")
    }
}

/// Resolved status of a flight
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum StatusCode {
    #[default]
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl StatusCode {
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Unknown,
        StatusCode::OnTime,
        StatusCode::LateAirline,
        StatusCode::LateWeather,
        StatusCode::LateTechnical,
        StatusCode::LateOther,
    ];

    /// Wire value
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Any LATE_* status; only these generate credit
    pub const fn is_late(self) -> bool {
        matches!(
            self,
            StatusCode::LateAirline
                | StatusCode::LateWeather
                | StatusCode::LateTechnical
                | StatusCode::LateOther
        )
    }

    pub const fn is_resolved(self) -> bool {
        !matches!(self, StatusCode::Unknown)
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = SuretyError;

    fn try_from(value: u8) -> SuretyResult<Self> {
        match value {
            0 => Ok(StatusCode::Unknown),
            10 => Ok(StatusCode::OnTime),
            20 => Ok(StatusCode::LateAirline),
            30 => Ok(StatusCode::LateWeather),
            40 => Ok(StatusCode::LateTechnical),
            50 => Ok(StatusCode::LateOther),
            other => Err(SuretyError::UnknownStatusCode(other)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::OnTime => "ON_TIME",
            StatusCode::LateAirline => "LATE_AIRLINE",
            StatusCode::LateWeather => "LATE_WEATHER",
            StatusCode::LateTechnical => "LATE_TECHNICAL",
            StatusCode::LateOther => "LATE_OTHER",
        };
        write!(f, "{}({})", name, self.code())
    }
}
