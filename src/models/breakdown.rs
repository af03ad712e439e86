//! Breakdown catalog and equipment-breakdown links

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakdownPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakdownType {
    Hardware,
    Software,
    Network,
    Other,
}

/// Immutable catalog entry describing a class of breakdown; created and
/// edited only by admins, referenced by reports, never owned by them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub priority: BreakdownPriority,
    #[serde(rename = "type")]
    pub kind: BreakdownType,
}

/// Create breakdown catalog entry (admin)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBreakdown {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub priority: BreakdownPriority,
    #[serde(rename = "type")]
    pub kind: BreakdownType,
}

/// Update breakdown catalog entry (admin)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBreakdown {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<BreakdownPriority>,
    #[serde(rename = "type")]
    pub kind: Option<BreakdownType>,
}

/// Composite key uniquely identifying "this breakdown class occurred on this
/// unit"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub equipment_id: i64,
    pub breakdown_id: i64,
}

impl std::fmt::Display for ReportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "equipment {} / breakdown {}", self.equipment_id, self.breakdown_id)
    }
}

/// The equipment-breakdown association record; owns zero or more tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownReport {
    pub key: ReportKey,
}
