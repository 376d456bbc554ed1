//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::telemetry::Node;

use super::state::{AppState, Navigable, PopupState, Tab};

const PAGE: usize = 10;
const NOT_FILTERABLE: &str = "Filters and export are available on Failover and Sessions";

/// Result of handling a key event. Actions that need the sampler or the
/// API are returned to the app loop; pure UI changes are applied in place.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Switch to another tab.
    SwitchTab(Tab),
    /// Switch the monitored node.
    SwitchNode(Node),
    /// Re-fetch the data behind the current tab.
    Refresh,
    /// The tab's filter changed; re-fetch its list.
    ApplyFilter(Tab),
    /// Export the current tab's filtered list as CSV.
    Export,
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    match state.popup {
        PopupState::Help => return handle_help(state, key),
        PopupState::Filter => return handle_filter_form(state, key),
        PopupState::None => {}
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('?') => {
            state.popup = PopupState::Help;
            KeyAction::None
        }
        KeyCode::Char(c @ '1'..='4') => c
            .to_digit(10)
            .and_then(Tab::from_number)
            .map(KeyAction::SwitchTab)
            .unwrap_or(KeyAction::None),
        KeyCode::Tab => KeyAction::SwitchTab(state.current_tab.next()),
        KeyCode::BackTab => KeyAction::SwitchTab(state.current_tab.prev()),
        KeyCode::Char('n') => KeyAction::SwitchNode(state.node.other()),
        KeyCode::Char('p') => KeyAction::SwitchNode(Node::Primary),
        KeyCode::Char('s') => KeyAction::SwitchNode(Node::Secondary),
        KeyCode::Char('r') => KeyAction::Refresh,
        KeyCode::Char('f') => {
            if !state.open_filter_form() {
                state.status_message = Some(NOT_FILTERABLE.to_string());
            }
            KeyAction::None
        }
        KeyCode::Char('x') => {
            if state.clear_filter() {
                KeyAction::ApplyFilter(state.current_tab)
            } else {
                KeyAction::None
            }
        }
        KeyCode::Char('e') => {
            if state.current_tab.is_filterable() {
                KeyAction::Export
            } else {
                state.status_message = Some(NOT_FILTERABLE.to_string());
                KeyAction::None
            }
        }
        KeyCode::Up | KeyCode::Char('k') => navigate(state, |n| n.select_up()),
        KeyCode::Down | KeyCode::Char('j') => navigate(state, |n| n.select_down()),
        KeyCode::PageUp => navigate(state, |n| n.page_up(PAGE)),
        KeyCode::PageDown => navigate(state, |n| n.page_down(PAGE)),
        KeyCode::Home | KeyCode::Char('g') => navigate(state, |n| n.home()),
        KeyCode::End | KeyCode::Char('G') => navigate(state, |n| n.end()),
        _ => KeyAction::None,
    }
}

fn handle_help(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        KeyCode::Char('q') => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

/// Handles keys while the filter form is open.
fn handle_filter_form(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let Some(form) = state.filter_form.as_mut() else {
        state.close_filter_form();
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc => state.close_filter_form(),
        KeyCode::Enter => {
            if let Some(tab) = state.submit_filter_form() {
                return KeyAction::ApplyFilter(tab);
            }
        }
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.pop(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => form.clear_field(),
        KeyCode::Char(c) => form.push(c),
        _ => {}
    }
    KeyAction::None
}

fn navigate(state: &mut AppState, f: impl FnOnce(&mut dyn Navigable)) -> KeyAction {
    if let Some(nav) = state.navigable() {
        f(nav);
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        AppState::new(&DashboardConfig::default())
    }

    #[test]
    fn test_tab_keys() {
        let mut state = state();
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('3'))),
            KeyAction::SwitchTab(Tab::Failover)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Tab)),
            KeyAction::SwitchTab(Tab::Applications)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::BackTab)),
            KeyAction::SwitchTab(Tab::Sessions)
        );
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('5'))), KeyAction::None);
    }

    #[test]
    fn test_node_keys() {
        let mut state = state();
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('n'))),
            KeyAction::SwitchNode(Node::Secondary)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('p'))),
            KeyAction::SwitchNode(Node::Primary)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('s'))),
            KeyAction::SwitchNode(Node::Secondary)
        );
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('r'))), KeyAction::Refresh);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyAction::Quit);
        assert_eq!(
            handle_key(
                &mut state,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            KeyAction::Quit
        );
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_filter_form_keys() {
        let mut state = state();
        state.current_tab = Tab::Failover;
        handle_key(&mut state, key(KeyCode::Char('f')));
        assert_eq!(state.popup, PopupState::Filter);

        // Typed keys go into the form, not to the tab or node bindings.
        type_text(&mut state, "2025-12-01");
        handle_key(&mut state, key(KeyCode::Tab));
        handle_key(&mut state, key(KeyCode::Tab));
        type_text(&mut state, "Manualx");
        handle_key(&mut state, key(KeyCode::Backspace));
        assert_eq!(state.current_tab, Tab::Failover);
        assert_eq!(state.node, Node::Primary);

        assert_eq!(
            handle_key(&mut state, key(KeyCode::Enter)),
            KeyAction::ApplyFilter(Tab::Failover)
        );
        assert_eq!(state.popup, PopupState::None);
        assert_eq!(state.failover_filter.from.as_deref(), Some("2025-12-01"));
        assert_eq!(state.failover_filter.kind.as_deref(), Some("Manual"));

        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('x'))),
            KeyAction::ApplyFilter(Tab::Failover)
        );
        assert!(state.failover_filter.is_empty());
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('x'))), KeyAction::None);
    }

    #[test]
    fn test_filter_form_esc_discards_edits() {
        let mut state = state();
        state.current_tab = Tab::Sessions;
        handle_key(&mut state, key(KeyCode::Char('f')));
        type_text(&mut state, "bad-date");
        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), KeyAction::None);
        assert!(state.filter_form.as_ref().unwrap().error.is_some());

        handle_key(&mut state, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(state.filter_form.as_ref().unwrap().fields[0].1, "");
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);
        assert!(state.session_filter.is_empty());
    }

    #[test]
    fn test_export_and_filter_need_list_tab() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('f'))), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('e'))), KeyAction::None);
        assert!(state.status_message.is_some());

        state.current_tab = Tab::Sessions;
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('e'))), KeyAction::Export);
    }

    #[test]
    fn test_help_popup_captures_esc() {
        let mut state = state();
        handle_key(&mut state, key(KeyCode::Char('?')));
        assert_eq!(state.popup, PopupState::Help);
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('1'))), KeyAction::None);
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);
    }
}
