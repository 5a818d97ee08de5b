use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Stream-mode actions. Compose mode forwards keys to the editor instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
    PrevDay,
    NextDay,
    EditDay,
    NewEntry,
    Reload,
    Help,
    Quit,
}

impl Action {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "move_up" => Some(Self::MoveUp),
            "move_down" => Some(Self::MoveDown),
            "half_page_up" => Some(Self::HalfPageUp),
            "half_page_down" => Some(Self::HalfPageDown),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "prev_day" => Some(Self::PrevDay),
            "next_day" => Some(Self::NextDay),
            "edit_day" => Some(Self::EditDay),
            "new_entry" => Some(Self::NewEntry),
            "reload" => Some(Self::Reload),
            "help" => Some(Self::Help),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    pub fn hint_text(&self) -> &'static str {
        match self {
            Self::MoveUp => "up",
            Self::MoveDown => "down",
            Self::HalfPageUp => "page up",
            Self::HalfPageDown => "page down",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::PrevDay => "prev day",
            Self::NextDay => "next day",
            Self::EditDay => "edit",
            Self::NewEntry => "new",
            Self::Reload => "reload",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
}

fn alt(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::ALT)
}

fn shift(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SHIFT)
}

pub fn vim_preset() -> HashMap<KeyEvent, Action> {
    let mut m = HashMap::new();
    m.insert(key(KeyCode::Char('k')), Action::MoveUp);
    m.insert(key(KeyCode::Up), Action::MoveUp);
    m.insert(key(KeyCode::Char('j')), Action::MoveDown);
    m.insert(key(KeyCode::Down), Action::MoveDown);
    m.insert(ctrl(KeyCode::Char('u')), Action::HalfPageUp);
    m.insert(key(KeyCode::PageUp), Action::HalfPageUp);
    m.insert(ctrl(KeyCode::Char('d')), Action::HalfPageDown);
    m.insert(key(KeyCode::PageDown), Action::HalfPageDown);
    m.insert(key(KeyCode::Char('g')), Action::Top);
    m.insert(shift(KeyCode::Char('G')), Action::Bottom);
    m.insert(key(KeyCode::Char('[')), Action::PrevDay);
    m.insert(key(KeyCode::Char(']')), Action::NextDay);
    m.insert(key(KeyCode::Char('e')), Action::EditDay);
    m.insert(key(KeyCode::Enter), Action::EditDay);
    m.insert(key(KeyCode::Char('i')), Action::NewEntry);
    m.insert(key(KeyCode::Char('r')), Action::Reload);
    m.insert(key(KeyCode::Char('?')), Action::Help);
    m.insert(key(KeyCode::Char('q')), Action::Quit);
    m.insert(ctrl(KeyCode::Char('c')), Action::Quit);
    m
}

pub fn emacs_preset() -> HashMap<KeyEvent, Action> {
    let mut m = HashMap::new();
    m.insert(ctrl(KeyCode::Char('p')), Action::MoveUp);
    m.insert(key(KeyCode::Up), Action::MoveUp);
    m.insert(ctrl(KeyCode::Char('n')), Action::MoveDown);
    m.insert(key(KeyCode::Down), Action::MoveDown);
    m.insert(alt(KeyCode::Char('v')), Action::HalfPageUp);
    m.insert(key(KeyCode::PageUp), Action::HalfPageUp);
    m.insert(ctrl(KeyCode::Char('v')), Action::HalfPageDown);
    m.insert(key(KeyCode::PageDown), Action::HalfPageDown);
    m.insert(alt(KeyCode::Char('<')), Action::Top);
    m.insert(alt(KeyCode::Char('>')), Action::Bottom);
    m.insert(alt(KeyCode::Char('p')), Action::PrevDay);
    m.insert(alt(KeyCode::Char('n')), Action::NextDay);
    m.insert(key(KeyCode::Enter), Action::EditDay);
    m.insert(ctrl(KeyCode::Char('o')), Action::NewEntry);
    m.insert(ctrl(KeyCode::Char('r')), Action::Reload);
    m.insert(key(KeyCode::F(1)), Action::Help);
    m.insert(ctrl(KeyCode::Char('x')), Action::Quit);
    m.insert(ctrl(KeyCode::Char('c')), Action::Quit);
    m
}

pub fn get_preset(name: &str) -> Option<HashMap<KeyEvent, Action>> {
    match name.to_lowercase().as_str() {
        "vim" => Some(vim_preset()),
        "emacs" => Some(emacs_preset()),
        _ => None,
    }
}
