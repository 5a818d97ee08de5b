use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const CODE_BG: Color = Color::Rgb(30, 41, 59);

fn text_style() -> Style {
    Style::default().fg(Color::Gray)
}

fn bullet_style() -> Style {
    Style::default().fg(Color::LightMagenta)
}

fn quote_style() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

fn code_style() -> Style {
    Style::default().fg(Color::LightBlue).bg(CODE_BG)
}

fn header_style(level: usize) -> Style {
    match level {
        1 | 2 => Style::default()
            .fg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        3 => Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
        4 => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

/// Render a markdown document into styled terminal lines, word-wrapped at
/// `width` columns. Pure: the same input always yields the same lines.
pub fn render(text: &str, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut in_code = false;

    for raw in text.lines() {
        let trimmed = raw.trim();

        if trimmed.starts_with("```") {
            in_code = !in_code;
            continue;
        }

        if in_code {
            lines.push(Line::from(Span::styled(
                format!("  {}  ", raw.replace('\t', "    ")),
                code_style(),
            )));
            continue;
        }

        render_line(raw, width, &mut lines);
    }

    lines
}

fn render_line(raw: &str, width: usize, out: &mut Vec<Line<'static>>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        out.push(Line::default());
        return;
    }

    if let Some((level, title)) = parse_header(trimmed) {
        let style = header_style(level);
        let spans = render_spans(title, style);
        push_wrapped(out, spans, Vec::new(), Vec::new(), width);
        return;
    }

    if let Some(quoted) = trimmed.strip_prefix("> ").or_else(|| trimmed.strip_prefix('>').filter(|s| s.is_empty())) {
        let bar = || vec![Span::styled("┃ ".to_string(), Style::default().fg(Color::Magenta))];
        let spans = render_spans(quoted, quote_style());
        push_wrapped(out, spans, bar(), bar(), width);
        return;
    }

    let indent = " ".repeat(leading_spaces(raw));

    if let Some(rest) = strip_checkbox(trimmed, true) {
        let style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::CROSSED_OUT);
        let mut spans = vec![Span::styled("☑ ".to_string(), Style::default().fg(Color::Green))];
        spans.extend(render_spans(rest, style));
        push_list_item(out, &indent, spans, width);
        return;
    }
    if let Some(rest) = strip_checkbox(trimmed, false) {
        let mut spans = vec![Span::styled(
            "☐ ".to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )];
        spans.extend(render_spans(rest, text_style()));
        push_list_item(out, &indent, spans, width);
        return;
    }

    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        let mut spans = vec![Span::styled("• ".to_string(), bullet_style())];
        spans.extend(render_spans(rest, text_style()));
        push_list_item(out, &indent, spans, width);
        return;
    }

    if matches!(trimmed, "---" | "***" | "___") {
        out.push(Line::from(Span::styled(
            "─".repeat(width),
            Style::default().fg(Color::DarkGray),
        )));
        return;
    }

    let spans = render_spans(trimmed, text_style());
    let prefix = if indent.is_empty() {
        Vec::new()
    } else {
        vec![Span::raw(indent.clone())]
    };
    push_wrapped(out, spans, prefix.clone(), prefix, width);
}

/// List items hang continuation lines under the item text, past the marker.
fn push_list_item(out: &mut Vec<Line<'static>>, indent: &str, spans: Vec<Span<'static>>, width: usize) {
    let first = vec![Span::raw(indent.to_string())];
    let cont = vec![Span::raw(format!("{}  ", indent))];
    push_wrapped(out, spans, first, cont, width);
}

fn push_wrapped(
    out: &mut Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    first_prefix: Vec<Span<'static>>,
    cont_prefix: Vec<Span<'static>>,
    width: usize,
) {
    let first_w = width.saturating_sub(spans_width(&first_prefix));
    let cont_w = width.saturating_sub(spans_width(&cont_prefix));

    for (i, row) in wrap_spans(spans, first_w, cont_w).into_iter().enumerate() {
        let mut full = if i == 0 {
            first_prefix.clone()
        } else {
            cont_prefix.clone()
        };
        full.retain(|s| !s.content.is_empty());
        full.extend(row);
        out.push(Line::from(full));
    }
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

fn parse_header(trimmed: &str) -> Option<(usize, &str)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=5).contains(&level) {
        return None;
    }
    trimmed[level..].strip_prefix(' ').map(|title| (level, title))
}

fn strip_checkbox(trimmed: &str, checked: bool) -> Option<&str> {
    if checked {
        trimmed
            .strip_prefix("- [x] ")
            .or_else(|| trimmed.strip_prefix("- [X] "))
    } else {
        trimmed.strip_prefix("- [ ] ")
    }
}

fn leading_spaces(line: &str) -> usize {
    let mut count = 0;
    for ch in line.chars() {
        match ch {
            ' ' => count += 1,
            '\t' => count += 4,
            _ => break,
        }
    }
    count
}

/// Parse inline markdown into styled spans layered over `base_style`.
///
/// Supports: **bold**, __bold__, *italic*, _italic_, `inline code`,
/// ~~strikethrough~~ and [text](url) links (the url is dropped).
pub fn render_spans(text: &str, base_style: Style) -> Vec<Span<'static>> {
    if text.is_empty() {
        return vec![];
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < len {
        // `inline code`
        if chars[i] == '`' {
            if let Some(end) = find_single_delimiter(&chars, i + 1, '`') {
                flush_plain(&mut plain, base_style, &mut spans);
                let content: String = chars[i + 1..end].iter().collect();
                spans.push(Span::styled(content, code_style()));
                i = end + 1;
                continue;
            }
        }

        // **bold** / __bold__
        if (chars[i] == '*' || chars[i] == '_') && i + 1 < len && chars[i + 1] == chars[i] {
            if let Some(end) = find_double_delimiter(&chars, i + 2, chars[i]) {
                flush_plain(&mut plain, base_style, &mut spans);
                let content: String = chars[i + 2..end].iter().collect();
                spans.push(Span::styled(
                    content,
                    base_style.fg(Color::White).add_modifier(Modifier::BOLD),
                ));
                i = end + 2;
                continue;
            }
        }

        // ~~strikethrough~~
        if chars[i] == '~' && i + 1 < len && chars[i + 1] == '~' {
            if let Some(end) = find_double_delimiter(&chars, i + 2, '~') {
                flush_plain(&mut plain, base_style, &mut spans);
                let content: String = chars[i + 2..end].iter().collect();
                spans.push(Span::styled(
                    content,
                    base_style
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                ));
                i = end + 2;
                continue;
            }
        }

        // *italic* / _italic_
        if (chars[i] == '*' || chars[i] == '_') && opens_emphasis(&chars, i) {
            if let Some(end) = find_emphasis_close(&chars, i + 1, chars[i]) {
                flush_plain(&mut plain, base_style, &mut spans);
                let content: String = chars[i + 1..end].iter().collect();
                spans.push(Span::styled(
                    content,
                    base_style.add_modifier(Modifier::ITALIC),
                ));
                i = end + 1;
                continue;
            }
        }

        // [text](url)
        if chars[i] == '[' {
            if let Some((text, link_end)) = parse_markdown_link(&chars, i) {
                flush_plain(&mut plain, base_style, &mut spans);
                spans.push(Span::styled(
                    text,
                    base_style
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                ));
                i = link_end;
                continue;
            }
        }

        plain.push(chars[i]);
        i += 1;
    }

    flush_plain(&mut plain, base_style, &mut spans);
    spans
}

/// `_` inside a word (snake_case) is literal; `*` and `_` followed by a
/// space never open emphasis.
fn opens_emphasis(chars: &[char], i: usize) -> bool {
    let next_ok = chars.get(i + 1).is_some_and(|c| !c.is_whitespace() && *c != chars[i]);
    let prev_ok = chars[i] == '*' || i == 0 || !chars[i - 1].is_alphanumeric();
    next_ok && prev_ok
}

fn find_emphasis_close(chars: &[char], start: usize, delim: char) -> Option<usize> {
    (start + 1..chars.len()).find(|&j| {
        chars[j] == delim
            && !chars[j - 1].is_whitespace()
            && (delim == '*' || chars.get(j + 1).is_none_or(|c| !c.is_alphanumeric()))
    })
}

/// Parse `[text](url)` starting at position `start` (which points to the `[`).
/// Returns `(text, end_position)` where end_position is past the closing `)`.
fn parse_markdown_link(chars: &[char], start: usize) -> Option<(String, usize)> {
    let close = find_single_delimiter(chars, start + 1, ']')?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let url_end = find_single_delimiter(chars, close + 2, ')')?;

    let text: String = chars[start + 1..close].iter().collect();
    if text.is_empty() {
        return None;
    }
    Some((text, url_end + 1))
}

fn flush_plain(plain: &mut String, style: Style, spans: &mut Vec<Span<'static>>) {
    if !plain.is_empty() {
        spans.push(Span::styled(plain.clone(), style));
        plain.clear();
    }
}

fn find_single_delimiter(chars: &[char], start: usize, delim: char) -> Option<usize> {
    (start..chars.len()).find(|&i| chars[i] == delim)
}

fn find_double_delimiter(chars: &[char], start: usize, delim: char) -> Option<usize> {
    let mut i = start;
    while i + 1 < chars.len() {
        if chars[i] == delim && chars[i + 1] == delim {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Reconstruct spans from (char, Style) pairs, merging runs of equal style.
fn chars_to_spans(chars: &[(char, Style)]) -> Vec<Span<'static>> {
    if chars.is_empty() {
        return vec![];
    }
    let mut spans = Vec::new();
    let mut current_text = String::new();
    let mut current_style = chars[0].1;

    for &(ch, style) in chars {
        if style == current_style {
            current_text.push(ch);
        } else {
            spans.push(Span::styled(current_text.clone(), current_style));
            current_text.clear();
            current_text.push(ch);
            current_style = style;
        }
    }
    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, current_style));
    }
    spans
}

/// Word-wrap styled spans into rows.
///
/// - `first_width`: columns available on the first row
/// - `cont_width`: columns available on continuation rows
///
/// Breaks after the last space that fits, hard-wraps otherwise.
pub fn wrap_spans(
    spans: Vec<Span<'static>>,
    first_width: usize,
    cont_width: usize,
) -> Vec<Vec<Span<'static>>> {
    let first_width = first_width.max(1);
    let cont_width = cont_width.max(1);

    let chars: Vec<(char, Style)> = spans
        .iter()
        .flat_map(|s| s.content.chars().map(move |c| (c, s.style)))
        .collect();
    let widths: Vec<usize> = chars.iter().map(|&(c, _)| c.width().unwrap_or(0)).collect();

    if widths.iter().sum::<usize>() <= first_width {
        return vec![spans];
    }

    let mut result = Vec::new();
    let mut pos = 0;
    let mut is_first = true;

    while pos < chars.len() {
        let width = if is_first { first_width } else { cont_width };

        let mut used = 0;
        let mut end = pos;
        while end < chars.len() && used + widths[end] <= width {
            used += widths[end];
            end += 1;
        }
        if end == chars.len() {
            result.push(chars_to_spans(&chars[pos..]));
            break;
        }
        // A glyph wider than the row still takes a row of its own.
        let end = end.max(pos + 1);

        let break_at = chars[pos..end]
            .iter()
            .rposition(|&(c, _)| c == ' ')
            .filter(|&offset| offset > 0)
            .map(|offset| pos + offset + 1)
            .unwrap_or(end);

        result.push(chars_to_spans(&chars[pos..break_at]));
        pos = break_at;
        is_first = false;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn collect_text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn headers_drop_their_prefix() {
        let lines = render("## 10:32 AM\n### Sub\n##### Small", 40);
        assert_eq!(line_text(&lines[0]), "10:32 AM");
        assert_eq!(line_text(&lines[1]), "Sub");
        assert_eq!(line_text(&lines[2]), "Small");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn hash_without_space_is_plain_text() {
        let lines = render("#tag", 40);
        assert_eq!(line_text(&lines[0]), "#tag");
    }

    #[test]
    fn blank_lines_are_kept() {
        let lines = render("a\n\nb", 40);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[1]), "");
    }

    #[test]
    fn bullets_use_dot_marker() {
        let lines = render("- one\n* two", 40);
        assert_eq!(line_text(&lines[0]), "• one");
        assert_eq!(line_text(&lines[1]), "• two");
    }

    #[test]
    fn nested_bullet_keeps_indent() {
        let lines = render("  - inner", 40);
        assert_eq!(line_text(&lines[0]), "  • inner");
    }

    #[test]
    fn checkboxes_render_glyphs() {
        let lines = render("- [ ] todo\n- [x] done", 40);
        assert_eq!(line_text(&lines[0]), "☐ todo");
        assert_eq!(line_text(&lines[1]), "☑ done");
        let done = lines[1].spans.last().unwrap();
        assert!(done.style.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn bullet_wraps_with_hanging_indent() {
        let lines = render("- alpha beta gamma delta", 12);
        assert!(lines.len() >= 2);
        assert!(line_text(&lines[0]).starts_with("• alpha"));
        assert!(line_text(&lines[1]).starts_with("  "));
        for line in &lines {
            assert!(line_text(line).chars().count() <= 12);
        }
    }

    #[test]
    fn blockquote_wraps_with_bar_on_every_row() {
        let lines = render("> one two three four five", 12);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(line_text(line).starts_with("┃ "));
        }
    }

    #[test]
    fn code_fence_lines_are_verbatim() {
        let lines = render("```\nlet **x** = 1;\n```\nafter", 40);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "  let **x** = 1;  ");
        assert_eq!(lines[0].spans[0].style.bg, Some(CODE_BG));
        assert_eq!(line_text(&lines[1]), "after");
    }

    #[test]
    fn horizontal_rule_spans_width() {
        let lines = render("---", 10);
        assert_eq!(line_text(&lines[0]), "─".repeat(10));
    }

    #[test]
    fn render_is_deterministic() {
        let text = "## 9:00 AM\n- **bold** and `code`\n> quote\n\nplain _it_";
        assert_eq!(render(text, 30), render(text, 30));
    }

    #[test]
    fn inline_bold_and_code() {
        let spans = render_spans("a **b** `c`", Style::default());
        assert_eq!(collect_text(&spans), "a b c");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[3].style.bg, Some(CODE_BG));
    }

    #[test]
    fn inline_italic_variants() {
        let spans = render_spans("*a* and _b_", Style::default());
        assert_eq!(collect_text(&spans), "a and b");
        assert!(spans[0].style.add_modifier.contains(Modifier::ITALIC));
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn snake_case_is_not_italic() {
        let spans = render_spans("some_long_name", Style::default());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "some_long_name");
    }

    #[test]
    fn lone_asterisk_is_literal() {
        let spans = render_spans("2 * 3 = 6", Style::default());
        assert_eq!(collect_text(&spans), "2 * 3 = 6");
    }

    #[test]
    fn strikethrough_and_link() {
        let spans = render_spans("~~old~~ [site](https://x.y)", Style::default());
        assert_eq!(collect_text(&spans), "old site");
        assert!(spans[0].style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn unclosed_delimiters_stay_literal() {
        let spans = render_spans("**open `tick [x](", Style::default());
        assert_eq!(collect_text(&spans), "**open `tick [x](");
    }

    #[test]
    fn wrap_spans_short_text_no_wrap() {
        let spans = vec![Span::raw("hello")];
        let result = wrap_spans(spans, 20, 20);
        assert_eq!(result.len(), 1);
        assert_eq!(collect_text(&result[0]), "hello");
    }

    #[test]
    fn wrap_spans_long_text_wraps_at_word() {
        let spans = vec![Span::raw("hello world foo")];
        let result = wrap_spans(spans, 10, 10);
        assert_eq!(result.len(), 2);
        assert_eq!(collect_text(&result[0]), "hello ");
        assert_eq!(collect_text(&result[1]), "world foo");
    }

    #[test]
    fn wrap_spans_no_space_hard_wraps() {
        let spans = vec![Span::raw("abcdefghijklmno")];
        let result = wrap_spans(spans, 10, 10);
        assert_eq!(result.len(), 2);
        assert_eq!(collect_text(&result[0]), "abcdefghij");
        assert_eq!(collect_text(&result[1]), "klmno");
    }

    #[test]
    fn wrap_spans_counts_wide_glyphs_as_two_columns() {
        let spans = vec![Span::raw("日本語の文章です")];
        let result = wrap_spans(spans, 6, 6);
        assert_eq!(result.len(), 3);
        assert_eq!(collect_text(&result[0]), "日本語");
        assert_eq!(collect_text(&result[1]), "の文章");
        assert_eq!(collect_text(&result[2]), "です");
    }

    #[test]
    fn wide_text_fits_when_display_width_fits() {
        let spans = vec![Span::raw("日本")];
        assert_eq!(wrap_spans(spans, 4, 4).len(), 1);
        assert_eq!(spans_width(&[Span::raw("a日本")]), 5);
    }

    #[test]
    fn wrap_spans_preserves_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let spans = vec![Span::styled("aaaa", bold), Span::raw(" bbbb cccc")];
        let result = wrap_spans(spans, 10, 10);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0][0].content, "aaaa");
        assert!(result[0][0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(result[0][1].content, " bbbb ");
        assert_eq!(collect_text(&result[1]), "cccc");
    }
}
