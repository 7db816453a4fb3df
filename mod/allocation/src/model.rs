use serde::{Deserialize, Serialize};

/// Allocation lifecycle status.
///
/// A bed is counted as occupied by any record that is not `rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl Default for AllocationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl AllocationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status string (case-insensitive, since the legacy data mixed
    /// casings).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A student's claim on a specific hostel/floor/room/bed.
///
/// Serialized with the snake_case field names existing clients expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    #[serde(default)]
    pub id: String,

    pub email: String,
    pub name: String,
    pub reg_no: String,
    pub department: String,

    /// Fee payment state, e.g. "Paid".
    pub fees_status: String,

    pub hostel: String,
    /// Floor name: Ground/First/Second/Third.
    pub floor: String,
    /// Canonical zero-padded room number, e.g. "001" or "101".
    pub room_number: String,
    /// 1-based bed number within the room.
    pub bed_number: u32,

    /// Public URL of the uploaded fee receipt, if one was provided.
    #[serde(default)]
    pub receipt_url: Option<String>,

    #[serde(default)]
    pub status: AllocationStatus,

    #[serde(default)]
    pub created_at: String,
}

/// The subset of an allocation the occupancy deriver needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccupiedBed {
    pub room_number: String,
    pub bed_number: u32,
    pub status: AllocationStatus,
}
