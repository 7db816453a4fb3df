//! Front-desk records: leave permissions, feedback, the weekly mess menu,
//! the hostel rule book and announcements.

use serde::{Deserialize, Serialize};

/// Review state of a leave application. Stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            _ => None,
        }
    }
}

/// An overnight-stay permission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub roll_number: String,
    pub branch: String,
    pub year: String,
    pub semester: String,
    pub hostel_name: String,
    pub room_number: String,
    pub date_of_stay: String,
    pub time: String,
    pub reason: String,
    pub student_mobile: String,
    pub parent_mobile: String,
    pub informed_advisor: String,
    pub advisor_name: Option<String>,
    pub advisor_mobile: Option<String>,
    pub student_signature_url: Option<String>,
    /// Set when an admin approves; cleared on rejection.
    pub admin_signature_url: Option<String>,
    pub status: LeaveStatus,
    pub created_at: String,
}

/// A maintenance or mess complaint from a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub department: String,
    pub room_no: String,
    pub feedback_type: String,
    pub message: String,
    pub urgency: String,
    pub status: String,
    pub created_at: String,
}

/// One day of the weekly mess menu, keyed by day name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDay {
    pub day: String,
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub evening: String,
    #[serde(default)]
    pub dinner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessTimings {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub snacks: String,
    #[serde(default)]
    pub dinner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GateTimings {
    #[serde(default)]
    pub opening: String,
    #[serde(default)]
    pub curfew_regular: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProhibitedItems {
    #[serde(default)]
    pub electrical: Vec<String>,
    #[serde(default)]
    pub restricted: Vec<String>,
}

/// The hostel rule book. A singleton document, always id 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostelRules {
    #[serde(default = "default_rules_id")]
    pub id: i64,
    #[serde(default)]
    pub general_rules: Vec<String>,
    #[serde(default)]
    pub mess_timings: MessTimings,
    #[serde(default)]
    pub gate_timings: GateTimings,
    #[serde(default)]
    pub prohibited_items: ProhibitedItems,
    #[serde(default)]
    pub consequences: Vec<String>,
}

fn default_rules_id() -> i64 {
    1
}

impl Default for HostelRules {
    fn default() -> Self {
        Self {
            id: 1,
            general_rules: Vec::new(),
            mess_timings: MessTimings::default(),
            gate_timings: GateTimings::default(),
            prohibited_items: ProhibitedItems::default(),
            consequences: Vec::new(),
        }
    }
}

/// An admin notice shown on the student dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_status_wire_format_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Approved).unwrap(),
            r#""approved""#
        );
        assert_eq!(LeaveStatus::parse("Rejected"), Some(LeaveStatus::Rejected));
        assert_eq!(LeaveStatus::parse("cancelled"), None);
    }

    #[test]
    fn rules_default_matches_empty_document() {
        let r = HostelRules::default();
        assert_eq!(r.id, 1);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["mess_timings"]["breakfast"], "");
        assert!(v["general_rules"].as_array().unwrap().is_empty());
    }
}
