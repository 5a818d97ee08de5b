use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{Result, ScrblError};

/// Parses a key binding written either as `Ctrl+Shift+k` or in Vim
/// notation such as `<C-k>`, `<M-n>` or `<PageUp>`.
pub fn parse_key(input: &str) -> Result<KeyEvent> {
    let trimmed = input.trim();
    if let Some(inner) = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .filter(|s| !s.is_empty())
    {
        return parse_vim_notation(inner, input);
    }
    parse_plus_notation(trimmed, input)
}

fn parse_plus_notation(trimmed: &str, input: &str) -> Result<KeyEvent> {
    // A lone "+" is the plus key, not a separator.
    if trimmed == "+" {
        return Ok(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::NONE));
    }

    let parts: Vec<&str> = trimmed.split('+').collect();
    let (key_part, modifier_parts) = match parts.split_last() {
        Some((last, rest)) => (last.trim(), rest),
        None => ("", &[][..]),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts {
        modifiers |= parse_modifier(part.trim()).ok_or_else(|| {
            ScrblError::Config(format!("Unknown modifier '{}' in key '{}'", part.trim(), input))
        })?;
    }

    if key_part.is_empty() {
        return Err(ScrblError::Config(format!("No key code found in '{}'", input)));
    }

    Ok(KeyEvent::new(parse_key_code(key_part)?, modifiers))
}

fn parse_vim_notation(inner: &str, input: &str) -> Result<KeyEvent> {
    let mut modifiers = KeyModifiers::NONE;
    let mut rest = inner;

    // Modifier prefixes look like `C-`, `M-`, `A-`, `S-`; the key itself may be `-`.
    while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
        let modifier = match rest.as_bytes()[0].to_ascii_lowercase() {
            b'c' => KeyModifiers::CONTROL,
            b'm' | b'a' => KeyModifiers::ALT,
            b's' => KeyModifiers::SHIFT,
            _ => {
                return Err(ScrblError::Config(format!(
                    "Unknown modifier '{}' in key '{}'",
                    &rest[..1],
                    input
                )))
            }
        };
        modifiers |= modifier;
        rest = &rest[2..];
    }

    let code = match rest.to_lowercase().as_str() {
        "cr" => KeyCode::Enter,
        "bs" => KeyCode::Backspace,
        "lt" => KeyCode::Char('<'),
        _ => parse_key_code(rest)?,
    };

    Ok(KeyEvent::new(code, modifiers))
}

fn parse_modifier(s: &str) -> Option<KeyModifiers> {
    match s.to_lowercase().as_str() {
        "ctrl" | "control" => Some(KeyModifiers::CONTROL),
        "shift" => Some(KeyModifiers::SHIFT),
        "alt" | "meta" => Some(KeyModifiers::ALT),
        _ => None,
    }
}

fn parse_key_code(s: &str) -> Result<KeyCode> {
    match s.to_lowercase().as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "insert" | "ins" => Ok(KeyCode::Insert),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" | "↑" => Ok(KeyCode::Up),
        "down" | "↓" => Ok(KeyCode::Down),
        "left" | "←" => Ok(KeyCode::Left),
        "right" | "→" => Ok(KeyCode::Right),
        "space" => Ok(KeyCode::Char(' ')),
        lower if lower.starts_with('f') && lower.len() > 1 => {
            let num: u8 = lower[1..]
                .parse()
                .map_err(|_| ScrblError::Config(format!("Unknown key: {}", s)))?;
            if !(1..=12).contains(&num) {
                return Err(ScrblError::Config(format!(
                    "Function key out of range: F{}",
                    num
                )));
            }
            Ok(KeyCode::F(num))
        }
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(KeyCode::Char(ch)),
                _ => Err(ScrblError::Config(format!("Unknown key: {}", s))),
            }
        }
    }
}
