//! Day Document Cache: one markdown file per calendar day.
//!
//! Files live directly in the notes directory as `YYYY-MM-DD.md`. Anything
//! else in the directory is ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveTime};

use crate::error::Result;

pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DAY_HEADER_FORMAT: &str = "%Y.%m.%d";
const ENTRY_TIME_FORMAT: &str = "%-I:%M %p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayDocument {
    pub date: NaiveDate,
    pub content: String,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Content of a freshly created day file: the day header and a blank line.
pub fn day_template(date: NaiveDate) -> String {
    format!("# {}\n\n", date.format(DAY_HEADER_FORMAT))
}

/// Text as it goes to disk after a whole-day edit: LF line endings and a
/// trailing newline. A blank buffer keeps the day header.
pub fn normalize_for_save(text: &str, date: NaiveDate) -> String {
    let mut out = text.replace("\r\n", "\n");
    if out.trim().is_empty() {
        return day_template(date);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone)]
pub struct DayStore {
    dir: PathBuf,
}

impl DayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}.md", date.format(FILE_DATE_FORMAT)))
    }

    /// Reads a day. A missing file is an empty day, not an error.
    pub fn read_day(&self, date: NaiveDate) -> Result<String> {
        match fs::read_to_string(self.path_for(date)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_day(&self, date: NaiveDate, content: &str) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.path_for(date), content)?;
        Ok(())
    }

    /// Appends a timestamped entry, creating the day from the template if needed.
    pub fn append_entry(&self, date: NaiveDate, time: NaiveTime, entry: &str) -> Result<()> {
        let mut content = self.read_day(date)?;
        if content.trim().is_empty() {
            content = day_template(date);
        } else if !content.ends_with("\n\n") {
            if !content.ends_with('\n') {
                content.push('\n');
            }
            content.push('\n');
        }

        content.push_str(&format!("## {}\n", time.format(ENTRY_TIME_FORMAT)));
        content.push_str(entry.trim_end());
        content.push('\n');

        self.write_day(date, &content)
    }

    /// All dates with a day file, oldest first.
    pub fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".md")) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, FILE_DATE_FORMAT) {
                dates.push(date);
            }
        }

        dates.sort();
        Ok(dates)
    }

    /// Loads the most recent `limit` days, oldest first, and whether older
    /// days exist beyond them. `today` is always present so it can be edited.
    pub fn load_recent(&self, limit: usize, today: NaiveDate) -> Result<(Vec<DayDocument>, bool)> {
        let dates = self.list_dates()?;
        let has_more = dates.len() > limit;
        let recent = &dates[dates.len().saturating_sub(limit)..];

        let mut days = Vec::with_capacity(recent.len() + 1);
        for &date in recent {
            let content = self.read_day(date)?;
            if content.is_empty() && date != today {
                continue;
            }
            days.push(DayDocument { date, content });
        }

        if !days.iter().any(|d| d.date == today) {
            days.push(DayDocument {
                date: today,
                content: String::new(),
            });
            days.sort_by_key(|d| d.date);
        }

        Ok((days, has_more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> (TempDir, DayStore) {
        let tmp = TempDir::new().unwrap();
        let store = DayStore::new(tmp.path().join("notes"));
        (tmp, store)
    }

    #[test]
    fn missing_day_reads_as_empty() {
        let (_tmp, store) = store();
        assert_eq!(store.read_day(date(2025, 1, 1)).unwrap(), "");
    }

    #[test]
    fn write_then_read_returns_same_text() {
        let (_tmp, store) = store();
        let text = "# 2025.01.01\n\nhello\n";
        store.write_day(date(2025, 1, 1), text).unwrap();
        assert_eq!(store.read_day(date(2025, 1, 1)).unwrap(), text);
    }

    #[test]
    fn normalized_edit_survives_a_write() {
        let (_tmp, store) = store();
        let d = date(2025, 1, 1);
        let text = normalize_for_save("# 2025.01.01\r\n\r\nhello", d);
        assert_eq!(text, "# 2025.01.01\n\nhello\n");

        store.write_day(d, &text).unwrap();
        assert_eq!(store.read_day(d).unwrap(), text);
    }

    #[test]
    fn blank_edit_keeps_the_header() {
        assert_eq!(normalize_for_save("  \n", date(2025, 1, 4)), "# 2025.01.04\n\n");
    }

    #[test]
    fn day_template_has_header_and_blank_line() {
        assert_eq!(day_template(date(2025, 1, 2)), "# 2025.01.02\n\n");
    }

    #[test]
    fn append_creates_day_from_template() {
        let (_tmp, store) = store();
        let time = NaiveTime::from_hms_opt(10, 32, 0).unwrap();
        store.append_entry(date(2025, 1, 2), time, "first thought").unwrap();

        let content = store.read_day(date(2025, 1, 2)).unwrap();
        assert_eq!(content, "# 2025.01.02\n\n## 10:32 AM\nfirst thought\n");
    }

    #[test]
    fn append_separates_entries_with_blank_line() {
        let (_tmp, store) = store();
        let d = date(2025, 1, 2);
        store.write_day(d, "# 2025.01.02\n\nexisting").unwrap();
        let time = NaiveTime::from_hms_opt(15, 4, 0).unwrap();
        store.append_entry(d, time, "second\n\n").unwrap();

        let content = store.read_day(d).unwrap();
        assert_eq!(content, "# 2025.01.02\n\nexisting\n\n## 3:04 PM\nsecond\n");
    }

    #[test]
    fn list_dates_sorted_and_ignores_other_files() {
        let (_tmp, store) = store();
        store.write_day(date(2025, 1, 3), "c").unwrap();
        store.write_day(date(2025, 1, 1), "a").unwrap();
        std::fs::write(store.dir().join("notes.txt"), "x").unwrap();
        std::fs::write(store.dir().join("not-a-date.md"), "x").unwrap();
        std::fs::create_dir(store.dir().join("2025-01-09.md")).unwrap();

        let dates = store.list_dates().unwrap();
        assert_eq!(dates, vec![date(2025, 1, 1), date(2025, 1, 3)]);
    }

    #[test]
    fn list_dates_on_missing_dir_is_empty() {
        let (_tmp, store) = store();
        assert!(store.list_dates().unwrap().is_empty());
    }

    #[test]
    fn load_recent_takes_newest_days_oldest_first() {
        let (_tmp, store) = store();
        for d in 1..=5 {
            store.write_day(date(2025, 1, d), &format!("day {}", d)).unwrap();
        }

        let (days, has_more) = store.load_recent(3, date(2025, 1, 5)).unwrap();
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 3), date(2025, 1, 4), date(2025, 1, 5)]);
        assert!(has_more);
        assert_eq!(days[0].content, "day 3");
    }

    #[test]
    fn load_recent_always_includes_today() {
        let (_tmp, store) = store();
        store.write_day(date(2025, 1, 1), "old").unwrap();

        let (days, has_more) = store.load_recent(10, date(2025, 1, 7)).unwrap();
        assert!(!has_more);
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date, date(2025, 1, 7));
        assert_eq!(days[1].content, "");
    }

    #[test]
    fn load_recent_skips_empty_files_except_today() {
        let (_tmp, store) = store();
        store.write_day(date(2025, 1, 1), "").unwrap();
        store.write_day(date(2025, 1, 2), "kept").unwrap();

        let (days, _) = store.load_recent(10, date(2025, 1, 2)).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2025, 1, 2));
    }
}
