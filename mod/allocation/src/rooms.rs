//! Room/bed numbering and the occupancy deriver.
//!
//! Everything here is pure and deterministic; the service layer feeds it
//! the current allocation rows and renders the result.

use std::collections::{BTreeMap, HashSet};

use crate::model::{AllocationStatus, OccupiedBed};

/// The fixed set of hostels students can apply to.
pub const HOSTELS: [&str; 7] = [
    "Hostel 1", "Hostel 2", "Hostel 3", "Hostel 4", "Hostel 5", "Hostel 6", "Hostel 7",
];

/// Rooms on every floor.
pub const ROOMS_PER_FLOOR: u32 = 40;

/// Beds in every room.
pub const BEDS_PER_ROOM: u32 = 3;

pub fn is_valid_hostel(name: &str) -> bool {
    HOSTELS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Floor {
    Ground,
    First,
    Second,
    Third,
}

impl Floor {
    pub const ALL: [Floor; 4] = [Floor::Ground, Floor::First, Floor::Second, Floor::Third];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Ground" => Some(Self::Ground),
            "First" => Some(Self::First),
            "Second" => Some(Self::Second),
            "Third" => Some(Self::Third),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ground => "Ground",
            Self::First => "First",
            Self::Second => "Second",
            Self::Third => "Third",
        }
    }

    /// First room number on this floor.
    fn room_start(self) -> u32 {
        match self {
            Self::Ground => 1,
            Self::First => 101,
            Self::Second => 201,
            Self::Third => 301,
        }
    }
}

/// Generate the ordered room numbers for a floor.
///
/// Room numbers are canonical zero-padded width-3 decimal strings on every
/// floor: "001".."040" on Ground, "101".."140" on First, and so on. (The
/// legacy UI padded only the ground floor; for the other floors the padded
/// and unpadded forms coincide, so no stored value changes meaning.)
pub fn gen_rooms(floor: Floor) -> Vec<String> {
    let start = floor.room_start();
    (start..start + ROOMS_PER_FLOOR)
        .map(|n| format!("{:03}", n))
        .collect()
}

/// Normalize a room number to the canonical zero-padded form.
///
/// Purely-numeric strings shorter than 3 digits are left-padded; anything
/// else is returned trimmed and unchanged (validation happens elsewhere).
pub fn normalize_room(room: &str) -> String {
    let t = room.trim();
    if !t.is_empty() && t.len() < 3 && t.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>3}", t)
    } else {
        t.to_string()
    }
}

/// Occupancy lookup index over a floor's allocation rows.
///
/// Rejected records never occupy a bed. Room numbers are normalized on
/// the way in, so a legacy unpadded "1" matches the canonical "001".
pub struct OccupancyIndex {
    occupied: HashSet<(String, u32)>,
}

impl OccupancyIndex {
    pub fn new(records: &[OccupiedBed]) -> Self {
        let occupied = records
            .iter()
            .filter(|r| r.status != AllocationStatus::Rejected)
            .map(|r| (normalize_room(&r.room_number), r.bed_number))
            .collect();
        Self { occupied }
    }

    /// Is the bed at 0-based `bed_index` in `room` taken?
    pub fn is_occupied(&self, room: &str, bed_index: usize) -> bool {
        let bed_number = bed_index as u32 + 1;
        self.occupied
            .contains(&(normalize_room(room), bed_number))
    }

    /// Per-room boolean bed vectors: `grid[room][i]` is true when bed
    /// `i + 1` is occupied.
    pub fn grid(&self, rooms: &[String], beds_per_room: u32) -> BTreeMap<String, Vec<bool>> {
        rooms
            .iter()
            .map(|room| {
                let beds = (0..beds_per_room as usize)
                    .map(|i| self.is_occupied(room, i))
                    .collect();
                (room.clone(), beds)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bed(room: &str, bed_number: u32, status: AllocationStatus) -> OccupiedBed {
        OccupiedBed {
            room_number: room.into(),
            bed_number,
            status,
        }
    }

    #[test]
    fn rooms_are_deterministic_and_unique() {
        for floor in Floor::ALL {
            let rooms = gen_rooms(floor);
            assert_eq!(rooms.len(), ROOMS_PER_FLOOR as usize);
            let mut sorted = rooms.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted, rooms, "monotonic and duplicate-free on {:?}", floor);
        }
        assert_eq!(gen_rooms(Floor::Ground)[0], "001");
        assert_eq!(gen_rooms(Floor::Ground)[39], "040");
        assert_eq!(gen_rooms(Floor::First)[0], "101");
        assert_eq!(gen_rooms(Floor::Second)[39], "240");
        assert_eq!(gen_rooms(Floor::Third)[0], "301");
    }

    #[test]
    fn normalize_pads_short_numeric_rooms() {
        assert_eq!(normalize_room("1"), "001");
        assert_eq!(normalize_room(" 40 "), "040");
        assert_eq!(normalize_room("001"), "001");
        assert_eq!(normalize_room("101"), "101");
        assert_eq!(normalize_room("abc"), "abc");
    }

    #[test]
    fn occupancy_matches_active_records_only() {
        // bedIndex 1 maps to bed_number 2.
        let records = vec![bed("001", 2, AllocationStatus::Pending)];
        let idx = OccupancyIndex::new(&records);
        assert!(idx.is_occupied("001", 1));
        assert!(!idx.is_occupied("001", 0));
        assert!(!idx.is_occupied("002", 1));
    }

    #[test]
    fn rejected_records_leave_the_bed_free() {
        let records = vec![bed("001", 1, AllocationStatus::Rejected)];
        let idx = OccupancyIndex::new(&records);
        assert!(!idx.is_occupied("001", 0));
    }

    #[test]
    fn confirmed_records_occupy() {
        let records = vec![bed("213", 3, AllocationStatus::Confirmed)];
        let idx = OccupancyIndex::new(&records);
        assert!(idx.is_occupied("213", 2));
    }

    #[test]
    fn legacy_unpadded_rooms_match_canonical() {
        let records = vec![bed("1", 1, AllocationStatus::Pending)];
        let idx = OccupancyIndex::new(&records);
        assert!(idx.is_occupied("001", 0));
    }

    #[test]
    fn grid_is_pure() {
        let records = vec![
            bed("001", 2, AllocationStatus::Pending),
            bed("003", 1, AllocationStatus::Confirmed),
            bed("003", 2, AllocationStatus::Rejected),
        ];
        let rooms = gen_rooms(Floor::Ground);
        let idx = OccupancyIndex::new(&records);

        let grid = idx.grid(&rooms, BEDS_PER_ROOM);
        assert_eq!(grid.len(), rooms.len());
        assert_eq!(grid["001"], vec![false, true, false]);
        assert_eq!(grid["003"], vec![true, false, false]);
        assert_eq!(grid["040"], vec![false, false, false]);

        // Same input, same output.
        assert_eq!(grid, idx.grid(&rooms, BEDS_PER_ROOM));
    }

    #[test]
    fn floor_parse() {
        assert_eq!(Floor::parse("Ground"), Some(Floor::Ground));
        assert_eq!(Floor::parse(" Third "), Some(Floor::Third));
        assert_eq!(Floor::parse("Basement"), None);
    }
}
