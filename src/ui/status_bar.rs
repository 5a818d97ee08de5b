use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

const COMPOSE_HINTS: [(&str, &str); 3] = [("C-s", "save"), ("C-g", "leave"), (":wq", "save+leave")];

pub struct StatusBar<'a> {
    pub hints: &'a [(String, &'static str)],
    pub message: Option<&'a str>,
    pub composing: bool,
    /// Editor mode label while composing.
    pub editor_mode: &'a str,
}

fn hint_spans(spans: &mut Vec<Span<'static>>, key: &str, action: &str, first: bool) {
    if !first {
        spans.push(Span::styled("  ", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(format!("[{}]", key), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
        action.to_string(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
    ));
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let badge = if self.composing {
            let label = if self.editor_mode.is_empty() {
                " COMPOSE ".to_string()
            } else {
                format!(" COMPOSE({}) ", self.editor_mode)
            };
            Span::styled(label, Style::default().fg(Color::Black).bg(Color::Green))
        } else {
            Span::styled(" STREAM ", Style::default().fg(Color::Black).bg(Color::Blue))
        };

        let mut spans = vec![badge, Span::raw(" ")];

        if let Some(msg) = self.message {
            spans.push(Span::styled(msg.to_string(), Style::default().fg(Color::Yellow)));
        } else if self.composing {
            for (i, (key, action)) in COMPOSE_HINTS.iter().enumerate() {
                hint_spans(&mut spans, key, action, i == 0);
            }
        } else {
            for (i, (key, action)) in self.hints.iter().enumerate() {
                hint_spans(&mut spans, key, action, i == 0);
            }
        }

        Line::from(spans).render(area, buf);
    }
}
