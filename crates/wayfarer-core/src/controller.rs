//! Owns the session state and the timer queue.
//!
//! The controller is what a front end talks to. It feeds actions through
//! [`reduce`], keeps navigation timers on a virtual clock and hands prompt
//! requests back to the caller, which decides how to run them.

use std::mem;
use std::time::Duration;

use tracing::debug;

use crate::location::{LocationId, Point};
use crate::navigation::{NavTimer, ARRIVE_DELAY};
use crate::scheduler::Scheduler;
use crate::state::{reduce, Action, AppMode, AppState, Effect, PromptRequest};

#[derive(Debug, Default)]
pub struct Controller {
    state: AppState,
    timers: Scheduler<NavTimer>,
    walk_started: Option<Duration>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: Option<AppMode>, is_night: bool) -> Self {
        let mut controller = Self::new();
        controller.state.mode = mode;
        controller.state.is_night = is_night;
        controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Virtual time, advanced only by [`Controller::advance`].
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Applies `action` and returns the prompts that should be sent.
    pub fn dispatch(&mut self, action: Action) -> Vec<PromptRequest> {
        if action == Action::LeaveMode {
            // The reducer settles the walk; its timers must not fire later.
            self.timers.cancel_all();
            self.walk_started = None;
        }

        let state = mem::take(&mut self.state);
        let (state, effects) = reduce(state, action);
        self.state = state;

        let mut prompts = Vec::new();
        for effect in effects {
            match effect {
                Effect::Schedule { delay, timer } => {
                    if let NavTimer::Snap { .. } = timer {
                        self.walk_started = Some(self.timers.now());
                    }
                    self.timers.schedule(delay, timer);
                }
                Effect::Prompt(request) => prompts.push(request),
            }
        }
        prompts
    }

    /// Moves virtual time forward, firing any navigation timers that came due.
    pub fn advance(&mut self, elapsed: Duration) {
        for timer in self.timers.advance(elapsed) {
            debug!(?timer, "timer fired");
            self.dispatch(Action::Timer(timer));
        }
        if !self.state.nav.is_walking() {
            self.walk_started = None;
        }
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_idle()
    }

    /// Drops pending timers. Used on exit; a walk cut short stays walking.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.timers.cancel_all();
        if dropped > 0 {
            debug!(dropped, "cancelled pending timers");
        }
        dropped
    }

    pub fn request_navigation(&mut self, target: LocationId) -> Vec<PromptRequest> {
        self.dispatch(Action::Navigate(target))
    }

    pub fn request_direct_navigation(&mut self, target: LocationId) -> Vec<PromptRequest> {
        self.dispatch(Action::NavigateDirect(target))
    }

    pub fn close_panel(&mut self) -> Vec<PromptRequest> {
        self.dispatch(Action::ClosePanel)
    }

    /// Where to draw the avatar: glides from the walk origin to the target
    /// over the walk duration, otherwise its stored position.
    pub fn avatar_draw_position(&self) -> Point {
        let nav = &self.state.nav;
        match (nav.walk_origin, self.walk_started) {
            (Some(origin), Some(started)) if nav.is_walking() => {
                let elapsed = self.timers.now().saturating_sub(started);
                let t = elapsed.as_secs_f32() / ARRIVE_DELAY.as_secs_f32();
                // Until the snap fires the stored position is still the origin.
                origin.lerp(nav.avatar.position, t)
            }
            _ => nav.avatar.position,
        }
    }
}
