/*
 * This file is part of Fanlord.
 *
 * Copyright (C) 2025 Fanlord contributors
 *
 * Fanlord is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanlord is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanlord. If not, see <https://www.gnu.org/licenses/>.
 */

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus};
use crate::dispatch::CommandRunner;
use crate::encoder::PresetMode;
use crate::i18n::Language;

/// Main event handler. Returns `true` when the user asked to quit.
pub fn handle_key_event<R: CommandRunner>(app: &mut App<R>, key_event: KeyEvent) -> anyhow::Result<bool> {
    let KeyEvent { code, modifiers, kind, .. } = key_event;
    if kind == KeyEventKind::Release {
        return Ok(false);
    }

    // Popups swallow everything first
    if handle_popup_events(app, code) {
        return Ok(false);
    }

    Ok(handle_global_events(app, code, modifiers))
}

fn handle_popup_events<R: CommandRunner>(app: &mut App<R>, code: KeyCode) -> bool {
    if app.show_warning_popup {
        if matches!(code, KeyCode::Esc | KeyCode::Enter) {
            app.show_warning_popup = false;
            app.warning_message.clear();
        }
        return true;
    }

    if app.show_language_menu {
        match code {
            KeyCode::Esc => app.show_language_menu = false,
            KeyCode::Up => {
                if app.language_idx > 0 {
                    app.language_idx -= 1;
                }
            }
            KeyCode::Down => {
                if app.language_idx + 1 < Language::ALL.len() {
                    app.language_idx += 1;
                }
            }
            KeyCode::Enter => app.change_language(Language::ALL[app.language_idx]),
            _ => {}
        }
        return true;
    }

    false
}

fn handle_global_events<R: CommandRunner>(app: &mut App<R>, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::Down => app.focus = app.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.focus = app.focus.prev(),
        KeyCode::Char('1') => app.apply_preset(PresetMode::Silent),
        KeyCode::Char('2') => app.apply_preset(PresetMode::Performance),
        KeyCode::Char('3') => app.apply_preset(PresetMode::FullSpeed),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('l') => app.open_language_menu(),
        KeyCode::Left => move_horizontal(app, modifiers, -1),
        KeyCode::Right => move_horizontal(app, modifiers, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_focused(),
        _ => {}
    }
    false
}

/// Drag the focused slider, or pick a preset when the preset row has focus.
fn move_horizontal<R: CommandRunner>(app: &mut App<R>, modifiers: KeyModifiers, direction: i16) {
    if let Some(channel) = app.focus.channel() {
        let step = if modifiers.contains(KeyModifiers::SHIFT) { 1 } else { i16::from(app.slider_step) };
        app.drag(channel, direction * step);
        return;
    }
    if app.focus == Focus::Presets {
        let last = PresetMode::ALL.len() - 1;
        app.preset_idx = match direction {
            d if d < 0 => app.preset_idx.saturating_sub(1),
            _ => (app.preset_idx + 1).min(last),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MockCommandRunner;
    use crate::encoder::FanChannel;
    use crate::test_utils::mock_app;

    fn test_app() -> App<MockCommandRunner> {
        mock_app(0)
    }

    fn press(app: &mut App<MockCommandRunner>, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_drag_then_release_sends_once() {
        let mut app = test_app();
        app.focus = Focus::CpuSlider;
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.cpu_slider, 10);
        assert!(app.controller.log().is_empty());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.controller.log().len(), 1);
        assert_eq!(app.controller.mirror().percent(FanChannel::Cpu), 10);
    }

    #[test]
    fn test_shift_drags_by_one() {
        let mut app = test_app();
        app.focus = Focus::PeripheralSlider;
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT)).unwrap();
        assert_eq!(app.peripheral_slider, 1);
    }

    #[test]
    fn test_preset_hotkeys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('1'));
        assert_eq!((app.cpu_slider, app.peripheral_slider), (40, 40));
        press(&mut app, KeyCode::Char('3'));
        assert_eq!((app.cpu_slider, app.peripheral_slider), (100, 100));
        press(&mut app, KeyCode::Char('r'));
        assert!(app.controller.mirror().is_automatic(FanChannel::Peripheral));
        assert_eq!(app.controller.log().len(), 5);
    }

    #[test]
    fn test_preset_row_navigation() {
        let mut app = test_app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.focused_preset(), PresetMode::FullSpeed);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.focused_preset(), PresetMode::Performance);
    }

    #[test]
    fn test_language_menu_swallows_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('l'));
        assert!(app.show_language_menu);
        // 'q' must not quit while the menu is open
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.language, Language::Chinese);
        assert!(!app.show_language_menu);
    }

    #[test]
    fn test_warning_popup_dismiss() {
        let mut app = test_app();
        app.show_warning("boom".to_string());
        assert!(!press(&mut app, KeyCode::Char('1')));
        assert!(app.controller.log().is_empty());
        press(&mut app, KeyCode::Enter);
        assert!(!app.show_warning_popup);
    }
}
