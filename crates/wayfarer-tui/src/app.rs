use std::time::Instant;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use wayfarer_core::{
    profile, Action, AppMode, AppState, Config, Controller, GeminiClient, LocationId,
    PromptRequest,
};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: Controller,

    // Oracle client and the channel replies come back on
    pub client: GeminiClient,
    pub replies: Option<UnboundedSender<AppEvent>>,
    pub key_source: Option<&'static str>,

    // Selection cursors
    pub mode_cursor: usize,
    pub location_cursor: usize,
    pub skill_cursor: usize,

    // Oracle chat input
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input (chars)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state
    pub animation_frame: u8,
    last_tick: Instant,

    // Areas for mouse hit-testing (updated during render)
    pub map_area: Option<Rect>,
    pub route_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let api_key = config.api_key();
        let key_source = config.key_source();
        if api_key.is_none() {
            warn!("no Gemini API key configured; oracle replies will fall back");
        }

        let client = GeminiClient::new(api_key.as_deref().unwrap_or_default())
            .with_model(config.model.clone())
            .with_endpoint(config.endpoint.clone());

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            controller: Controller::with_mode(config.default_mode, config.night),

            client,
            replies: None,
            key_source,

            mode_cursor: 0,
            location_cursor: 0,
            skill_cursor: 0,

            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,
            last_tick: Instant::now(),

            map_area: None,
            route_area: None,
        }
    }

    pub fn state(&self) -> &AppState {
        self.controller.state()
    }

    /// Dispatches `action` and starts any oracle requests it produced.
    pub fn dispatch(&mut self, action: Action) -> bool {
        // Timers scheduled by this action start from the current instant.
        self.sync_clock();
        let prompts = self.controller.dispatch(action);
        let sent = !prompts.is_empty();
        for request in prompts {
            self.spawn_prompt(request);
        }
        sent
    }

    fn spawn_prompt(&self, request: PromptRequest) {
        let Some(tx) = self.replies.clone() else {
            warn!(kind = ?request.kind, "no reply channel; prompt dropped");
            return;
        };
        let client = self.client.clone();
        debug!(kind = ?request.kind, "spawning oracle request");
        tokio::spawn(async move {
            let text = client
                .send_prompt(&request.prompt, &request.instruction)
                .await;
            let _ = tx.send(AppEvent::Reply(request.into_reply(text)));
        });
    }

    /// Brings the navigation clock up to real time, firing due timers.
    fn sync_clock(&mut self) {
        let now = Instant::now();
        self.controller.advance(now - self.last_tick);
        self.last_tick = now;
    }

    /// Advance the navigation clock by real elapsed time (called by Tick event)
    pub fn tick(&mut self) {
        self.sync_clock();
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    pub fn mode(&self) -> Option<AppMode> {
        self.state().mode
    }

    pub fn panel_open(&self) -> bool {
        self.state().nav.panel_open
    }

    pub fn current_location(&self) -> LocationId {
        self.state().nav.current
    }

    /// Locations the cursor cycles through in the current mode.
    pub fn selectable_locations(&self) -> Vec<LocationId> {
        match self.mode() {
            Some(AppMode::Standard) => LocationId::routes().to_vec(),
            _ => LocationId::all().to_vec(),
        }
    }

    pub fn focused_location(&self) -> LocationId {
        let locations = self.selectable_locations();
        locations[self.location_cursor % locations.len()]
    }

    pub fn location_next(&mut self) {
        let len = self.selectable_locations().len();
        self.location_cursor = (self.location_cursor + 1) % len;
    }

    pub fn location_prev(&mut self) {
        let len = self.selectable_locations().len();
        self.location_cursor = (self.location_cursor + len - 1) % len;
    }

    /// Go to `target` the way the current mode does it.
    pub fn go_to(&mut self, target: LocationId) {
        if let Some(idx) = self.selectable_locations().iter().position(|l| *l == target) {
            self.location_cursor = idx;
        }
        match self.mode() {
            Some(AppMode::Adventure) => {
                self.dispatch(Action::Navigate(target));
            }
            Some(AppMode::Standard) => {
                self.dispatch(Action::NavigateDirect(target));
            }
            None => {}
        }
        if target == LocationId::Oracle {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn choose_mode(&mut self, mode: AppMode) {
        self.location_cursor = 0;
        self.dispatch(Action::ChooseMode(mode));
    }

    pub fn close_panel(&mut self) {
        self.input_mode = InputMode::Normal;
        self.dispatch(Action::ClosePanel);
    }

    pub fn leave_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.dispatch(Action::LeaveMode);
    }

    // Skills panel
    pub fn skill_next(&mut self) {
        let len = profile::skill_count();
        if len > 0 {
            self.skill_cursor = (self.skill_cursor + 1).min(len - 1);
        }
    }

    pub fn skill_prev(&mut self) {
        self.skill_cursor = self.skill_cursor.saturating_sub(1);
    }

    pub fn scan_selected_skill(&mut self) {
        if let Some(skill) = profile::skill_at(self.skill_cursor) {
            self.dispatch(Action::ScanSkill(skill.to_string()));
        }
    }

    // Oracle chat
    pub fn submit_chat(&mut self) {
        let text = self.chat_input.clone();
        if self.dispatch(Action::SubmitChat(text)) {
            self.chat_input.clear();
            self.chat_cursor = 0;
            self.scroll_chat_to_bottom();
        }
    }

    pub fn on_reply(&mut self, action: Action) {
        let is_chat = matches!(action, Action::ChatReplied(_));
        self.dispatch(action);
        if is_chat {
            self.scroll_chat_to_bottom();
        }
    }

    /// Scroll chat to bottom so the newest message (or "Computing...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.state().visible_chat() {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "Oracle:")
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = u16::try_from(char_count / wrap_width + 1).unwrap_or(u16::MAX);
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }
        if self.state().chat_loading {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn shutdown(&mut self) {
        let dropped = self.controller.shutdown();
        debug!(dropped, "shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app(mode: Option<AppMode>) -> App {
        let mut config = Config::new();
        config.default_mode = mode;
        App::new(&config)
    }

    #[test]
    fn test_location_cursor_wraps() {
        let mut app = app(Some(AppMode::Standard));
        assert_eq!(app.focused_location(), LocationId::Bio);
        app.location_prev();
        assert_eq!(app.focused_location(), LocationId::Contact);
        app.location_next();
        assert_eq!(app.focused_location(), LocationId::Bio);
    }

    #[test]
    fn test_go_to_in_standard_opens_panel_immediately() {
        let mut app = app(Some(AppMode::Standard));
        app.go_to(LocationId::Contact);
        assert!(app.panel_open());
        assert_eq!(app.current_location(), LocationId::Contact);
        assert_eq!(app.focused_location(), LocationId::Contact);
    }

    #[test]
    fn test_go_to_in_adventure_starts_walking() {
        let mut app = app(Some(AppMode::Adventure));
        app.go_to(LocationId::Bio);
        assert!(app.state().nav.is_walking());
        assert!(!app.panel_open());
    }

    #[test]
    fn test_go_to_without_mode_does_nothing() {
        let mut app = app(None);
        app.go_to(LocationId::Bio);
        assert_eq!(app.current_location(), LocationId::Home);
        assert!(!app.state().nav.is_walking());
    }

    #[test]
    fn test_blank_chat_keeps_input() {
        let mut app = app(Some(AppMode::Standard));
        app.chat_input = "   ".into();
        app.submit_chat();
        assert_eq!(app.chat_input, "   ");
        assert!(!app.state().chat_loading);
    }

    #[test]
    fn test_actions_schedule_from_current_instant() {
        let mut app = app(Some(AppMode::Adventure));
        std::thread::sleep(Duration::from_millis(30));
        app.go_to(LocationId::Bio);
        assert!(app.controller.now() >= Duration::from_millis(30));
        assert!(app.state().nav.is_walking());
    }

    #[test]
    fn test_scroll_survives_huge_transcript() {
        let mut app = app(Some(AppMode::Standard));
        app.chat_width = 1;
        app.chat_height = 10;
        let long = "x".repeat(70_000);
        app.on_reply(Action::ChatReplied(long.clone()));
        app.on_reply(Action::ChatReplied(long));
        assert_eq!(app.chat_scroll, u16::MAX - 10);
    }

    #[test]
    fn test_skill_cursor_is_clamped() {
        let mut app = app(Some(AppMode::Standard));
        app.skill_prev();
        assert_eq!(app.skill_cursor, 0);
        for _ in 0..100 {
            app.skill_next();
        }
        assert_eq!(app.skill_cursor, profile::skill_count() - 1);
    }
}
