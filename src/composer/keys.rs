use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Translate a terminal key event into Neovim `nvim_input` notation.
///
/// Returns an empty string for keys that have no mapping; callers skip the
/// RPC in that case.
pub fn translate_key(key: &KeyEvent) -> String {
    let named = match key.code {
        KeyCode::Enter => Some("<CR>"),
        KeyCode::Tab => Some("<Tab>"),
        KeyCode::BackTab => Some("<S-Tab>"),
        KeyCode::Backspace => Some("<BS>"),
        KeyCode::Esc => Some("<Esc>"),
        KeyCode::Up => Some("<Up>"),
        KeyCode::Down => Some("<Down>"),
        KeyCode::Left => Some("<Left>"),
        KeyCode::Right => Some("<Right>"),
        KeyCode::Home => Some("<Home>"),
        KeyCode::End => Some("<End>"),
        KeyCode::PageUp => Some("<PageUp>"),
        KeyCode::PageDown => Some("<PageDown>"),
        KeyCode::Delete => Some("<Del>"),
        KeyCode::Insert => Some("<Insert>"),
        _ => None,
    };
    if let Some(token) = named {
        return token.to_string();
    }

    let KeyCode::Char(c) = key.code else {
        return String::new();
    };

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let ch = if c == '<' { "lt".to_string() } else { c.to_string() };

    match (ctrl, alt) {
        (true, true) => format!("<C-M-{}>", ch),
        (true, false) => format!("<C-{}>", ch),
        (false, true) => format!("<M-{}>", ch),
        (false, false) if c == '<' => "<lt>".to_string(),
        (false, false) => ch,
    }
}
