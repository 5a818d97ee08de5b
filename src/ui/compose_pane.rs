use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Widget};

use crate::composer::ComposeSnapshot;

/// The editor's buffer mirrored into the bottom pane. Collapses to a rule
/// while the stream has focus.
pub struct ComposePane<'a> {
    pub snapshot: &'a ComposeSnapshot,
    /// `None` when not composing.
    pub title: Option<String>,
}

/// First buffer row to show so the cursor row sits mid-pane when possible.
pub(crate) fn window_start(line_count: usize, cursor_row: usize, height: usize) -> usize {
    let cursor = cursor_row.saturating_sub(1);
    let max_start = line_count.saturating_sub(height);
    cursor.saturating_sub(height / 2).min(max_start)
}

/// Character column of a byte offset, clamped to a char boundary.
pub(crate) fn char_column(line: &str, byte_col: usize) -> usize {
    let mut b = byte_col.min(line.len());
    while !line.is_char_boundary(b) {
        b -= 1;
    }
    line[..b].chars().count()
}

impl<'a> Widget for ComposePane<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(title) = self.title else {
            let rule = "─".repeat(area.width as usize);
            Line::styled(rule, Style::default().fg(Color::DarkGray)).render(area, buf);
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", title));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines: Vec<&str> = self.snapshot.text.split('\n').collect();
        let height = inner.height as usize;
        let start = window_start(lines.len(), self.snapshot.cursor_row, height);

        let cursor_idx = self.snapshot.cursor_row.saturating_sub(1);
        let cursor_line = lines.get(cursor_idx).copied().unwrap_or("");
        let cursor_col = char_column(cursor_line, self.snapshot.cursor_col);
        let hscroll = cursor_col.saturating_sub(inner.width as usize - 1);

        for (row, text) in lines.iter().skip(start).take(height).enumerate() {
            let visible: String = text.chars().skip(hscroll).collect();
            let row_area = Rect::new(inner.x, inner.y + row as u16, inner.width, 1);
            Line::raw(visible).render(row_area, buf);
        }

        if cursor_idx >= start && cursor_idx < start + height {
            let x = inner.x + (cursor_col - hscroll) as u16;
            let y = inner.y + (cursor_idx - start) as u16;
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
            }
        }
    }
}
