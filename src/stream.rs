//! Turns loaded day documents into one flat list of display lines.
//!
//! Every line remembers which day it belongs to, and every day remembers the
//! line it starts on, so navigation can move by line or by day.

use chrono::NaiveDate;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::markdown;
use crate::notes::{DayDocument, DAY_HEADER_FORMAT};

pub const EMPTY_DAY_PLACEHOLDER: &str = "_No notes for this day yet._";

const MIN_RENDER_WIDTH: usize = 24;
/// Columns reserved for the guide rail and margins.
const RAIL_COLUMNS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamView {
    pub lines: Vec<Line<'static>>,
    pub line_to_day: Vec<usize>,
    pub day_start_line: Vec<usize>,
}

impl StreamView {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Day index owning `line`, clamped into range.
    pub fn day_of(&self, line: usize) -> Option<usize> {
        if self.line_to_day.is_empty() {
            return None;
        }
        let line = line.min(self.line_to_day.len() - 1);
        Some(self.line_to_day[line])
    }
}

pub fn render_width(term_width: u16) -> usize {
    (term_width as usize)
        .saturating_sub(RAIL_COLUMNS)
        .max(MIN_RENDER_WIDTH)
}

pub fn build_stream_view(days: &[DayDocument], width: usize) -> StreamView {
    let mut view = StreamView::default();
    if days.is_empty() {
        return view;
    }

    let banner_style = Style::default()
        .fg(Color::LightYellow)
        .add_modifier(Modifier::BOLD);

    for (i, day) in days.iter().enumerate() {
        view.day_start_line.push(view.lines.len());

        view.lines.push(Line::from(Span::styled(
            centered_date_banner(day.date, width),
            banner_style,
        )));
        view.line_to_day.push(i);

        let body = strip_day_header(&day.content);
        let body = if body.is_empty() {
            EMPTY_DAY_PLACEHOLDER
        } else {
            body.as_str()
        };

        for line in markdown::render(body, width) {
            view.lines.push(line);
            view.line_to_day.push(i);
        }

        if i + 1 < days.len() {
            view.lines.push(Line::default());
            view.line_to_day.push(i);
        }
    }

    view
}

/// Drops leading blank lines and a first-level `# ` header, then trims.
pub fn strip_day_header(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    if start < lines.len() && lines[start].trim().starts_with("# ") {
        start += 1;
    }
    lines[start..].join("\n").trim().to_string()
}

/// `---- 2025.01.02 ----` padded with dashes to `width`, at least two per side.
pub fn centered_date_banner(date: NaiveDate, width: usize) -> String {
    let label = date.format(DAY_HEADER_FORMAT).to_string();
    let label_width = label.width();
    if width <= label_width + 2 {
        return label;
    }

    let dash_count = width - label_width - 2;
    let left = (dash_count / 2).max(2);
    let right = (dash_count - dash_count / 2).max(2);

    format!("{} {} {}", "-".repeat(left), label, "-".repeat(right))
}
