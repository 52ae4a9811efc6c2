use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use wayfarer_core::{Action, AppMode, LocationId};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;
use crate::ui::{location_cell, route_slot_at};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Reply(action) => app.on_reply(action),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_chat_editing(app, key),
        InputMode::Normal => match app.mode() {
            None => handle_mode_select(app, key),
            Some(_) => handle_normal(app, key),
        },
    }
}

fn handle_mode_select(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('t') => {
            app.dispatch(Action::ToggleTheme);
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab
        | KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Char('j') | KeyCode::Char('k') => {
            app.mode_cursor = 1 - app.mode_cursor.min(1);
        }
        KeyCode::Enter => {
            let mode = if app.mode_cursor == 0 {
                AppMode::Adventure
            } else {
                AppMode::Standard
            };
            app.choose_mode(mode);
        }
        KeyCode::Char('1') => app.choose_mode(AppMode::Adventure),
        KeyCode::Char('2') => app.choose_mode(AppMode::Standard),
        _ => {}
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) {
    // Panel-specific keys take priority
    if app.panel_open() && handle_panel(app, key) {
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('t') => {
            app.dispatch(Action::ToggleTheme);
        }
        KeyCode::Char('m') => app.leave_mode(),
        KeyCode::Backspace if !app.panel_open() => app.leave_mode(),

        // Location cursor
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.location_next(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.location_prev(),
        KeyCode::Enter => {
            let target = app.focused_location();
            app.go_to(target);
        }

        // Number shortcuts follow the selectable order for the mode
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            if let Some(target) = app.selectable_locations().get(idx).copied() {
                app.go_to(target);
            }
        }
        _ => {}
    }
}

/// Returns true when the key was consumed by the open panel.
fn handle_panel(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc || key.code == KeyCode::Backspace {
        app.close_panel();
        return true;
    }

    match app.current_location() {
        LocationId::Function => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                app.skill_next();
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.skill_prev();
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => {
                app.scan_selected_skill();
                true
            }
            KeyCode::Char('x') => {
                app.dispatch(Action::DismissScan);
                true
            }
            _ => false,
        },
        LocationId::Oracle => match key.code {
            KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('/') => {
                app.input_mode = InputMode::Editing;
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                app.chat_scroll = app.chat_scroll.saturating_add(1);
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.chat_scroll = app.chat_scroll.saturating_sub(1);
                true
            }
            KeyCode::Char('G') => {
                app.scroll_chat_to_bottom();
                true
            }
            _ => false,
        },
        _ => false,
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_chat(),
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.panel_open() {
                return;
            }
            match app.mode() {
                Some(AppMode::Adventure) => {
                    let Some(area) = app.map_area else { return };
                    if !point_in_rect(x, y, area) {
                        return;
                    }
                    // Markers are a few cells wide; pick the closest within reach
                    let hit = LocationId::all()
                        .into_iter()
                        .map(|id| {
                            let (cx, cy) = location_cell(area, id.position());
                            let dx = (cx as i32 - x as i32).abs();
                            let dy = (cy as i32 - y as i32).abs();
                            (id, dx, dy)
                        })
                        .filter(|(_, dx, dy)| *dx <= 3 && *dy <= 1)
                        .min_by_key(|(_, dx, dy)| dx + dy * 2)
                        .map(|(id, _, _)| id);
                    if let Some(target) = hit {
                        app.go_to(target);
                    }
                }
                Some(AppMode::Standard) => {
                    let Some(area) = app.route_area else { return };
                    if point_in_rect(x, y, area) {
                        if let Some(target) = route_slot_at(area, x) {
                            app.go_to(target);
                        }
                    }
                }
                None => {}
            }
        }
        MouseEventKind::ScrollDown => {
            if app.panel_open() && app.current_location() == LocationId::Oracle {
                app.chat_scroll = app.chat_scroll.saturating_add(3);
            } else if app.panel_open() && app.current_location() == LocationId::Function {
                app.skill_next();
            }
        }
        MouseEventKind::ScrollUp => {
            if app.panel_open() && app.current_location() == LocationId::Oracle {
                app.chat_scroll = app.chat_scroll.saturating_sub(3);
            } else if app.panel_open() && app.current_location() == LocationId::Function {
                app.skill_prev();
            }
        }
        _ => {}
    }
}
