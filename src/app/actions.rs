use chrono::NaiveDate;

use crate::keys::preset::Action;
use crate::notes;

use super::state::{AppState, ComposeKind, ComposeTarget, ComposerCommand, Effect};

pub(super) fn handle_action(state: &mut AppState, action: &Action) -> Vec<Effect> {
    let step = state.load_step;
    let nav = &mut state.nav;

    let upward = match action {
        Action::MoveUp => {
            nav.move_guide(-1);
            true
        }
        Action::MoveDown => {
            nav.move_guide(1);
            false
        }
        Action::HalfPageUp => {
            nav.move_guide(-nav.half_page());
            true
        }
        Action::HalfPageDown => {
            nav.move_guide(nav.half_page());
            false
        }
        Action::Top => {
            nav.top();
            true
        }
        Action::Bottom => {
            nav.bottom();
            false
        }
        Action::PrevDay => {
            nav.prev_day();
            true
        }
        Action::NextDay => {
            nav.next_day();
            false
        }
        Action::EditDay => {
            return match nav.focused_date() {
                Some(date) => begin_compose(state, ComposeKind::EditDay, date),
                None => Vec::new(),
            };
        }
        Action::NewEntry => {
            return begin_compose(state, ComposeKind::NewEntry, notes::today());
        }
        Action::Reload => {
            return match nav.reload_request(None) {
                Some(request) => {
                    state.status_message = Some("reloading".into());
                    vec![Effect::LoadStream(request)]
                }
                None => Vec::new(),
            };
        }
        Action::Help => {
            state.show_help = true;
            return Vec::new();
        }
        Action::Quit => {
            state.should_quit = true;
            return Vec::new();
        }
    };

    if !upward {
        return Vec::new();
    }
    match nav.request_more(step) {
        Some(request) => {
            state.status_message = Some("loading older notes".into());
            vec![Effect::LoadStream(request)]
        }
        None => Vec::new(),
    }
}

/// Asks the worker for an editor session. The mode switches once the
/// session reports back.
pub(super) fn begin_compose(state: &mut AppState, kind: ComposeKind, date: NaiveDate) -> Vec<Effect> {
    if state.compose_pending {
        return Vec::new();
    }
    let target = ComposeTarget { kind, date };
    state.compose_target = Some(target);
    state.compose_pending = true;
    state.status_message = Some("starting editor".into());
    vec![Effect::Composer(ComposerCommand::Start { target })]
}
