use serde::{Deserialize, Serialize};

/// A student's hostel profile, keyed by the identity service's user id.
///
/// Everything except the key and the application flag is filled in by the
/// student over time, so the fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: String,

    pub name: Option<String>,
    pub roll_no: Option<String>,
    pub dob: Option<String>,
    pub blood_group: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub section: Option<String>,
    pub admission_mode: Option<String>,
    pub mobile: Option<String>,
    pub whatsapp: Option<String>,
    pub father_name: Option<String>,
    pub father_contact: Option<String>,
    pub mother_name: Option<String>,
    pub mother_contact: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub floor: Option<String>,
    pub room_no: Option<String>,
    pub fee_mode: Option<String>,

    pub passport_photo_url: Option<String>,
    pub id_card_photo_url: Option<String>,
    pub fees_receipt_url: Option<String>,

    /// Whether the student may submit a room application. Flipped false
    /// when an allocation is confirmed, back to true otherwise.
    #[serde(default = "default_can_apply")]
    pub can_apply: bool,
}

fn default_can_apply() -> bool {
    true
}

impl StudentProfile {
    /// An empty profile for a user who has never saved one.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: None,
            roll_no: None,
            dob: None,
            blood_group: None,
            department: None,
            year: None,
            section: None,
            admission_mode: None,
            mobile: None,
            whatsapp: None,
            father_name: None,
            father_contact: None,
            mother_name: None,
            mother_contact: None,
            address: None,
            district: None,
            floor: None,
            room_no: None,
            fee_mode: None,
            passport_photo_url: None,
            id_card_photo_url: None,
            fees_receipt_url: None,
            can_apply: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_apply_defaults_true_when_absent() {
        let p: StudentProfile = serde_json::from_str(r#"{"user_id":"u1"}"#).unwrap();
        assert!(p.can_apply);
        assert!(p.roll_no.is_none());
    }
}
