//! Occupied-bed queries and the rendered occupancy grid.

use std::collections::BTreeMap;

use hostel_core::ServiceError;
use hostel_store::Value;
use serde::Serialize;

use crate::model::OccupiedBed;
use crate::rooms::{self, Floor, OccupancyIndex, BEDS_PER_ROOM};
use crate::service::AllocationService;

/// Rendered floor occupancy: every room, with a boolean per bed.
#[derive(Debug, Serialize)]
pub struct OccupancyGrid {
    pub hostel: String,
    pub floor: String,
    pub beds_per_room: u32,
    pub rooms: Vec<String>,
    pub grid: BTreeMap<String, Vec<bool>>,
}

impl AllocationService {
    /// All non-rejected `{room_number, bed_number, status}` rows for a
    /// hostel floor. Rejected applications are vacant by definition.
    pub fn occupied(&self, hostel: &str, floor: &str) -> Result<Vec<OccupiedBed>, ServiceError> {
        let floor = Self::validate_floor_query(hostel, floor)?;

        let rows = self
            .sql
            .query(
                "SELECT room_number, bed_number, status FROM allocations
                 WHERE hostel = ?1 AND floor = ?2 AND status != 'rejected'",
                &[
                    Value::Text(hostel.to_string()),
                    Value::Text(floor.as_str().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut beds = Vec::with_capacity(rows.len());
        for row in &rows {
            let status = row
                .get_text("status")
                .and_then(crate::model::AllocationStatus::parse)
                .ok_or_else(|| ServiceError::Internal("bad status column".into()))?;
            beds.push(OccupiedBed {
                room_number: row
                    .get_text("room_number")
                    .unwrap_or_default()
                    .to_string(),
                bed_number: row.get_int("bed_number").unwrap_or_default() as u32,
                status,
            });
        }
        Ok(beds)
    }

    /// Derive the free/occupied matrix for a hostel floor.
    pub fn grid(&self, hostel: &str, floor: &str) -> Result<OccupancyGrid, ServiceError> {
        let parsed = Self::validate_floor_query(hostel, floor)?;
        let records = self.occupied(hostel, floor)?;

        let rooms = rooms::gen_rooms(parsed);
        let index = OccupancyIndex::new(&records);
        let grid = index.grid(&rooms, BEDS_PER_ROOM);

        Ok(OccupancyGrid {
            hostel: hostel.to_string(),
            floor: parsed.as_str().to_string(),
            beds_per_room: BEDS_PER_ROOM,
            rooms,
            grid,
        })
    }

    fn validate_floor_query(hostel: &str, floor: &str) -> Result<Floor, ServiceError> {
        if !rooms::is_valid_hostel(hostel) {
            return Err(ServiceError::Validation(format!(
                "unknown hostel {:?}",
                hostel
            )));
        }
        Floor::parse(floor)
            .ok_or_else(|| ServiceError::Validation(format!("unknown floor {:?}", floor)))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::AllocationStatus;
    use crate::service::submit::SubmitAllocation;
    use crate::service::test_support::test_service;

    fn submission(email: &str, room: &str, bed: u32) -> SubmitAllocation {
        SubmitAllocation {
            email: email.into(),
            name: "Student".into(),
            reg_no: format!("R-{}", email),
            department: "CSE".into(),
            fees_status: "Paid".into(),
            hostel: "Hostel 1".into(),
            floor: "Ground".into(),
            room_number: room.into(),
            bed_number: bed,
            receipt: None,
        }
    }

    #[test]
    fn occupied_lists_active_rows_only() {
        let (_dir, svc) = test_service();
        let a = svc.submit(submission("a@y.com", "001", 1)).unwrap();
        svc.submit(submission("b@y.com", "001", 2)).unwrap();

        svc.update_status(&a.id, AllocationStatus::Rejected).unwrap();

        let occupied = svc.occupied("Hostel 1", "Ground").unwrap();
        assert_eq!(occupied.len(), 1);
        assert_eq!(occupied[0].room_number, "001");
        assert_eq!(occupied[0].bed_number, 2);
    }

    #[test]
    fn occupied_is_scoped_to_hostel_and_floor() {
        let (_dir, svc) = test_service();
        svc.submit(submission("a@y.com", "001", 1)).unwrap();

        assert_eq!(svc.occupied("Hostel 2", "Ground").unwrap().len(), 0);
        assert_eq!(svc.occupied("Hostel 1", "First").unwrap().len(), 0);
        assert_eq!(svc.occupied("Hostel 1", "Ground").unwrap().len(), 1);
    }

    #[test]
    fn grid_covers_all_rooms() {
        let (_dir, svc) = test_service();
        svc.submit(submission("a@y.com", "005", 3)).unwrap();

        let report = svc.grid("Hostel 1", "Ground").unwrap();
        assert_eq!(report.rooms.len(), 40);
        assert_eq!(report.beds_per_room, 3);
        assert_eq!(report.grid["005"], vec![false, false, true]);
        assert_eq!(report.grid["001"], vec![false, false, false]);
    }

    #[test]
    fn bad_query_params_are_validation_errors() {
        let (_dir, svc) = test_service();
        assert!(svc.occupied("Nowhere", "Ground").is_err());
        assert!(svc.occupied("Hostel 1", "Fourth").is_err());
    }
}
