pub mod compose_pane;
pub mod header;
pub mod status_bar;
pub mod stream_area;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as WidgetBlock, BorderType, Borders, Clear};
use ratatui::Frame;

use crate::app::{AppState, ComposeKind, Mode};
use crate::error::ErrorPopup;
use crate::notes::DAY_HEADER_FORMAT;

use compose_pane::ComposePane;
use header::Header;
use status_bar::StatusBar;
use stream_area::StreamArea;

const COMPOSE_HELP: [(&str, &str); 4] = [
    ("C-s / :w", "save"),
    ("C-g / :q", "leave compose"),
    (":wq", "save and leave"),
    ("C-c", "quit scrbl"),
];

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(state.compose_rows()),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let date = state
        .nav
        .focused_date()
        .map(|d| d.format(DAY_HEADER_FORMAT).to_string())
        .unwrap_or_default();
    let header = Header {
        date: &date,
        sync_enabled: state.sync_enabled,
    };
    frame.render_widget(header, chunks[0]);

    let composing = state.mode == Mode::Compose;
    let stream = StreamArea {
        view: state.nav.view(),
        guide: state.nav.guide(),
        offset: state.nav.offset(),
        loading: state.nav.load().loading,
        dimmed: composing,
    };
    frame.render_widget(stream, chunks[1]);

    let title = match (composing, state.compose_target) {
        (true, Some(target)) => Some(match target.kind {
            ComposeKind::NewEntry => "New entry".to_string(),
            ComposeKind::EditDay => format!("Edit {}", target.date.format(DAY_HEADER_FORMAT)),
        }),
        _ => None,
    };
    let pane = ComposePane {
        snapshot: &state.snapshot,
        title,
    };
    frame.render_widget(pane, chunks[2]);

    if state.show_help {
        render_help_popup(frame, &state.hints, chunks[1]);
    }

    if let Some(err) = &state.error_popup {
        render_error_popup(frame, err, chunks[1]);
    }

    let status = StatusBar {
        hints: &state.hints,
        message: state.status_message.as_deref(),
        composing,
        editor_mode: state.snapshot.mode_label(),
    };
    frame.render_widget(status, chunks[3]);
}

fn render_help_popup(frame: &mut Frame, hints: &[(String, &str)], area: Rect) {
    // stream hints, a blank, a compose header, compose keys, footer
    let line_count = hints.len() + 2 + COMPOSE_HELP.len();
    let popup_height = (line_count + 3).min(area.height as usize) as u16; // +2 borders +1 footer
    let popup_width = (area.width * 60 / 100).max(30).min(area.width);
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(x, y, popup_width, popup_height);
    frame.render_widget(Clear, popup_area);

    let block = WidgetBlock::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Help ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_line = |key: &str, action: &str| {
        Line::from(vec![
            Span::styled(format!("{:>12}", key), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(action.to_string(), Style::default().fg(Color::White)),
        ])
    };

    let mut lines: Vec<Line> = hints.iter().map(|(k, a)| key_line(k.as_str(), *a)).collect();
    lines.push(Line::default());
    lines.push(Line::styled(
        "Compose",
        Style::default().fg(Color::Cyan),
    ));
    lines.extend(COMPOSE_HELP.iter().map(|&(k, a)| key_line(k, a)));

    for (i, line) in lines.into_iter().enumerate() {
        if i as u16 >= inner.height.saturating_sub(1) {
            break;
        }
        let line_area = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
        frame.render_widget(line, line_area);
    }

    // Footer
    if inner.height > 0 {
        let footer_y = inner.y + inner.height - 1;
        let footer = Line::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        );
        let footer_area = Rect::new(inner.x, footer_y, inner.width, 1);
        frame.render_widget(footer, footer_area);
    }
}

fn render_error_popup(frame: &mut Frame, popup: &ErrorPopup, area: Rect) {
    let popup_width = (area.width * 50 / 100).max(30).min(area.width);
    let inner_width = popup_width.saturating_sub(2) as usize; // -2 for borders

    let msg_lines = wrap_text(&popup.message, inner_width);
    // blank, message, blank, hint, blank, footer
    let content_height = 1 + msg_lines.len() + 1 + 1 + 1 + 1;
    let popup_height = (content_height + 2).min(area.height as usize) as u16;

    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(x, y, popup_width, popup_height);
    frame.render_widget(Clear, popup_area);

    let block = WidgetBlock::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" ! {} ", popup.title));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut row: u16 = 1;

    for line_text in &msg_lines {
        if row >= inner.height.saturating_sub(1) {
            break;
        }
        let line = Line::from(Span::styled(
            line_text.clone(),
            Style::default().fg(Color::White),
        ));
        frame.render_widget(line, Rect::new(inner.x, inner.y + row, inner.width, 1));
        row += 1;
    }

    row += 1;

    if row < inner.height.saturating_sub(1) {
        let hint = Line::from(Span::styled(
            popup.hint.clone(),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(hint, Rect::new(inner.x, inner.y + row, inner.width, 1));
        row += 1;
    }

    row += 1;

    if row < inner.height {
        let footer = Line::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        );
        frame.render_widget(footer, Rect::new(inner.x, inner.y + row, inner.width, 1));
    }
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
