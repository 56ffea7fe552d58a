//! Room model

use crate::models::RoomCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical room status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Free and bookable
    #[default]
    Available,
    /// Allocated to a booking
    Occupied,
    /// Taken out of inventory
    Maintenance,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Available => write!(f, "available"),
            RoomStatus::Occupied => write!(f, "occupied"),
            RoomStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}

impl RoomStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(RoomStatus::Available),
            "occupied" => Some(RoomStatus::Occupied),
            "maintenance" => Some(RoomStatus::Maintenance),
            _ => None,
        }
    }
}

/// Physical room belonging to one branch and one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i32,
    pub branch_id: i32,
    pub category: RoomCategory,
    pub status: RoomStatus,
    /// Base price per night for this room
    pub nightly_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            RoomStatus::Available,
            RoomStatus::Occupied,
            RoomStatus::Maintenance,
        ] {
            assert_eq!(RoomStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(RoomStatus::from_str("haunted"), None);
    }
}
