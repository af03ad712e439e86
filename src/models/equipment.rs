//! Equipment model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Equipment status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    InService,
    OutOfService,
    BrokenDown,
}

impl EquipmentStatus {
    /// Whether a unit in this status shows up in "available for report"
    /// listings. This is a read-side filter only; the report guard itself
    /// rejects just `OutOfService`.
    pub fn is_reportable(&self) -> bool {
        matches!(self, EquipmentStatus::Available | EquipmentStatus::InService)
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EquipmentStatus::Available => "AVAILABLE",
            EquipmentStatus::InService => "IN_SERVICE",
            EquipmentStatus::OutOfService => "OUT_OF_SERVICE",
            EquipmentStatus::BrokenDown => "BROKEN_DOWN",
        };
        write!(f, "{}", label)
    }
}

/// A physical equipment unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub status: EquipmentStatus,
    pub serial_number: String,
    /// Owning client, set by an admin-only assignment; a unit with no owner
    /// cannot receive a breakdown report
    pub client_id: Option<i64>,
}

/// Create equipment request (admin)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Serial number is required"))]
    pub serial_number: String,
}

/// Update equipment request (admin)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<EquipmentStatus>,
}
