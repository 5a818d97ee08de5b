use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// JSON body exchanged with the sync server for a single day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotePayload {
    pub date: String,
    pub content: String,
}

impl NotePayload {
    pub fn new(date: NaiveDate, content: &str) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            content: content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_formats_date_as_iso_day() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let payload = NotePayload::new(date, "# 2025.01.02\n");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["date"], "2025-01-02");
        assert_eq!(json["content"], "# 2025.01.02\n");
    }
}
