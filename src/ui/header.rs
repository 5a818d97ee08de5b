use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct Header<'a> {
    /// Focused day, empty before the first load.
    pub date: &'a str,
    pub sync_enabled: bool,
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = Style::default().bg(Color::DarkGray);
        let title = Span::styled(
            " scrbl ",
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

        let sync = if self.sync_enabled {
            Span::styled(" [sync] ", Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        } else {
            Span::styled("", bg)
        };

        let date = Span::styled(
            format!("{} ", self.date),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let used = title.width() + sync.width() + date.width();
        let spacer = Span::styled(" ".repeat((area.width as usize).saturating_sub(used)), bg);

        Line::from(vec![title, sync, spacer, date]).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| {
                buf.cell((x, 0))
                    .unwrap()
                    .symbol()
                    .chars()
                    .next()
                    .unwrap_or(' ')
            })
            .collect()
    }

    #[test]
    fn header_renders_title_and_date() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        Header {
            date: "2025.01.02",
            sync_enabled: false,
        }
        .render(area, &mut buf);

        let content = row(&buf, area.width);
        assert!(content.contains("scrbl"));
        assert!(content.trim_end().ends_with("2025.01.02"));
        assert!(!content.contains("[sync]"));
    }

    #[test]
    fn header_marks_sync() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        Header {
            date: "",
            sync_enabled: true,
        }
        .render(area, &mut buf);

        assert!(row(&buf, area.width).contains("[sync]"));
    }
}
