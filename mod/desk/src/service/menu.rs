//! The weekly mess menu, one row per day.

use hostel_core::ServiceError;
use hostel_store::Value;

use crate::model::MenuDay;
use crate::service::DeskService;

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn canonical_day(day: &str) -> Option<&'static str> {
    let day = day.trim();
    DAYS.iter().find(|d| d.eq_ignore_ascii_case(day)).copied()
}

impl DeskService {
    pub fn list_menu(&self) -> Result<Vec<MenuDay>, ServiceError> {
        let rows = self
            .sql
            .query("SELECT data FROM weekly_menu", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut by_day = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_text("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let day: MenuDay = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            by_day.push(day);
        }
        // Weekday order, not insertion order.
        by_day.sort_by_key(|m| DAYS.iter().position(|d| *d == m.day).unwrap_or(DAYS.len()));
        Ok(by_day)
    }

    /// Insert or replace the menu for one day.
    pub fn upsert_menu_day(&self, day: &str, mut menu: MenuDay) -> Result<MenuDay, ServiceError> {
        let day = canonical_day(day)
            .ok_or_else(|| ServiceError::Validation(format!("unknown day {:?}", day)))?;
        menu.day = day.to_string();

        let json = serde_json::to_string(&menu)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "INSERT INTO weekly_menu (day, data) VALUES (?1, ?2)
                 ON CONFLICT(day) DO UPDATE SET data = excluded.data",
                &[Value::Text(day.to_string()), Value::Text(json)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;

    fn menu(day: &str, lunch: &str) -> MenuDay {
        MenuDay {
            day: day.into(),
            morning: "milk".into(),
            breakfast: "idli".into(),
            lunch: lunch.into(),
            evening: "tea".into(),
            dinner: "chapati".into(),
        }
    }

    #[test]
    fn upsert_replaces_existing_day() {
        let (_dir, svc) = test_service();
        svc.upsert_menu_day("Monday", menu("Monday", "rice")).unwrap();
        svc.upsert_menu_day("monday", menu("Monday", "biryani")).unwrap();

        let all = svc.list_menu().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].lunch, "biryani");
    }

    #[test]
    fn list_is_in_weekday_order() {
        let (_dir, svc) = test_service();
        svc.upsert_menu_day("Friday", menu("Friday", "rice")).unwrap();
        svc.upsert_menu_day("Monday", menu("Monday", "rice")).unwrap();

        let all = svc.list_menu().unwrap();
        assert_eq!(all[0].day, "Monday");
        assert_eq!(all[1].day, "Friday");
    }

    #[test]
    fn unknown_day_is_rejected() {
        let (_dir, svc) = test_service();
        let err = svc
            .upsert_menu_day("Funday", menu("Funday", "rice"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
