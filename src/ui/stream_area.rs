use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::stream::StreamView;

const GUIDE_BG: Color = Color::Rgb(40, 44, 52);

pub struct StreamArea<'a> {
    pub view: &'a StreamView,
    pub guide: usize,
    pub offset: usize,
    pub loading: bool,
    /// Dims the stream while the compose pane has focus.
    pub dimmed: bool,
}

impl<'a> Widget for StreamArea<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.view.is_empty() {
            let text = if self.loading {
                "Loading notes..."
            } else {
                "No notes yet."
            };
            Line::styled(format!("  {}", text), Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        for row in 0..area.height {
            let idx = self.offset + row as usize;
            let Some(line) = self.view.lines.get(idx) else {
                break;
            };
            let row_area = Rect::new(area.x, area.y + row, area.width, 1);
            let is_guide = idx == self.guide && !self.dimmed;

            let rail = if is_guide {
                Span::styled("▸ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("│ ", Style::default().fg(Color::DarkGray))
            };

            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(rail);
            spans.extend(line.spans.iter().cloned());
            let mut rendered = Line::from(spans).style(line.style);
            if self.dimmed {
                rendered = rendered.patch_style(Style::default().add_modifier(Modifier::DIM));
            }

            if is_guide {
                buf.set_style(row_area, Style::default().bg(GUIDE_BG));
            }
            rendered.render(row_area, buf);
        }
    }
}
