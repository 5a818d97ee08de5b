use chrono::NaiveDate;

use crate::composer::ComposeSnapshot;
use crate::notes::DayDocument;

use super::compose::handle_compose_started;
use super::state::{AppState, ComposeKind, ComposeTarget};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_day(day: u32, body: &str) -> DayDocument {
    let date = date(2025, 1, day);
    DayDocument {
        date,
        content: format!("# {}\n\n{}", date.format("%Y.%m.%d"), body),
    }
}

/// Three initial days, a step of 60, an 80x30 terminal.
pub fn empty_state() -> AppState {
    AppState::new(3, 60, Vec::new(), (80, 30))
}

/// Days in January 2025, focused on the last one.
pub fn state_with_days(days: &[u32], has_more: bool) -> AppState {
    let mut state = empty_state();
    let docs = days.iter().map(|&d| make_day(d, "body")).collect();
    state.nav.apply_loaded(docs, has_more, None);
    state
}

/// A started compose session (generation 1) over three loaded days.
pub fn composing_state(kind: ComposeKind, date: NaiveDate) -> AppState {
    let mut state = state_with_days(&[1, 2, 3], false);
    state.compose_target = Some(ComposeTarget { kind, date });
    state.compose_pending = true;
    handle_compose_started(&mut state, ComposeSnapshot::default());
    state
}
