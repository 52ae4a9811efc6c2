//! Avatar navigation between map locations.
//!
//! A walk is a two-step choreography: the walking flag and facing change
//! immediately, the coordinates snap to the target after [`SNAP_DELAY`], and
//! the avatar comes to rest after [`ARRIVE_DELAY`]. The delays are expressed
//! as [`NavTimer`]s for the caller to schedule; this module never sleeps.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::location::{LocationId, Point};

pub const SNAP_DELAY: Duration = Duration::from_millis(50);
pub const ARRIVE_DELAY: Duration = Duration::from_millis(1500);

/// Where the avatar starts, just below the home marker.
pub const AVATAR_START: Point = Point::new(50.0, 50.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Front,
    Left,
    Right,
    Back,
}

impl Facing {
    /// Facing for a walk from `from` to `to`, judged on the x axis only.
    pub fn toward(from: Point, to: Point) -> Facing {
        if to.x > from.x {
            Facing::Right
        } else if to.x < from.x {
            Facing::Left
        } else {
            Facing::Front
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarState {
    pub position: Point,
    pub is_walking: bool,
    pub facing: Facing,
}

impl Default for AvatarState {
    fn default() -> Self {
        Self {
            position: AVATAR_START,
            is_walking: false,
            facing: Facing::Front,
        }
    }
}

/// Deferred steps of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTimer {
    Snap { target: LocationId, facing: Facing },
    Arrive { target: LocationId },
}

/// What an animated navigation request did.
#[derive(Debug, Clone, PartialEq)]
pub enum NavRequest {
    /// A walk is already in flight.
    Ignored,
    /// Already at the target; the panel was reopened.
    PanelOpened,
    /// Already at the target and nothing to reopen.
    Unchanged,
    /// A walk started; schedule these timers relative to now.
    Walking(Vec<(Duration, NavTimer)>),
}

/// What firing a timer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Snapped,
    Arrived(LocationId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavState {
    pub current: LocationId,
    pub avatar: AvatarState,
    pub panel_open: bool,
    /// Avatar position when the current walk began.
    pub walk_origin: Option<Point>,
    /// Where the current walk ends.
    pub walk_target: Option<LocationId>,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            current: LocationId::Home,
            avatar: AvatarState::default(),
            panel_open: false,
            walk_origin: None,
            walk_target: None,
        }
    }
}

impl NavState {
    pub fn is_walking(&self) -> bool {
        self.avatar.is_walking
    }

    pub fn request(&mut self, target: LocationId) -> NavRequest {
        if self.avatar.is_walking {
            debug!(target = target.as_str(), "navigation ignored while walking");
            return NavRequest::Ignored;
        }

        if self.current == target {
            if !self.panel_open && target != LocationId::Home {
                self.panel_open = true;
                return NavRequest::PanelOpened;
            }
            return NavRequest::Unchanged;
        }

        let facing = Facing::toward(self.avatar.position, target.position());
        debug!(
            from = self.current.as_str(),
            to = target.as_str(),
            ?facing,
            "walk started"
        );

        self.panel_open = false;
        self.walk_origin = Some(self.avatar.position);
        self.walk_target = Some(target);
        self.avatar.is_walking = true;
        self.avatar.facing = facing;

        NavRequest::Walking(vec![
            (SNAP_DELAY, NavTimer::Snap { target, facing }),
            (ARRIVE_DELAY, NavTimer::Arrive { target }),
        ])
    }

    /// Jumps straight to `target` and opens its panel.
    pub fn request_direct(&mut self, target: LocationId) {
        self.current = target;
        self.panel_open = true;
    }

    pub fn close_panel(&mut self, reset_to_home: bool) {
        self.panel_open = false;
        if reset_to_home {
            self.current = LocationId::Home;
        }
    }

    /// Ends an unfinished walk at its target without opening the panel.
    /// The caller must drop the walk's pending timers.
    pub fn settle(&mut self) {
        let Some(target) = self.walk_target.take() else {
            return;
        };
        debug!(at = target.as_str(), "walk cut short");
        self.avatar = AvatarState {
            position: target.position(),
            is_walking: false,
            facing: Facing::Front,
        };
        self.walk_origin = None;
        self.current = target;
        self.panel_open = false;
    }

    pub fn fire(&mut self, timer: NavTimer) -> TimerOutcome {
        match timer {
            NavTimer::Snap { target, facing } => {
                self.avatar = AvatarState {
                    position: target.position(),
                    is_walking: true,
                    facing,
                };
                TimerOutcome::Snapped
            }
            NavTimer::Arrive { target } => {
                self.avatar.is_walking = false;
                self.avatar.facing = Facing::Front;
                self.walk_origin = None;
                self.walk_target = None;
                self.current = target;
                if target != LocationId::Home {
                    self.panel_open = true;
                }
                debug!(at = target.as_str(), "walk finished");
                TimerOutcome::Arrived(target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_follows_x_axis() {
        let origin = Point::new(50.0, 50.0);
        assert_eq!(Facing::toward(origin, Point::new(80.0, 10.0)), Facing::Right);
        assert_eq!(Facing::toward(origin, Point::new(20.0, 90.0)), Facing::Left);
        assert_eq!(Facing::toward(origin, Point::new(50.0, 45.0)), Facing::Front);
    }

    #[test]
    fn test_walk_sets_flag_before_coordinates() {
        let mut nav = NavState::default();
        let request = nav.request(LocationId::Bio);

        let timers = match request {
            NavRequest::Walking(timers) => timers,
            other => panic!("expected a walk, got {:?}", other),
        };
        assert_eq!(timers.len(), 2);
        assert_eq!(timers[0].0, SNAP_DELAY);
        assert_eq!(timers[1].0, ARRIVE_DELAY);

        assert!(nav.avatar.is_walking);
        assert_eq!(nav.avatar.facing, Facing::Left);
        assert_eq!(nav.avatar.position, AVATAR_START);
        assert_eq!(nav.walk_origin, Some(AVATAR_START));
        assert_eq!(nav.current, LocationId::Home);
    }

    #[test]
    fn test_walk_closes_open_panel() {
        let mut nav = NavState::default();
        nav.request_direct(LocationId::Oracle);
        assert!(nav.panel_open);

        nav.request(LocationId::Contact);
        assert!(!nav.panel_open);
    }

    #[test]
    fn test_snap_then_arrive() {
        let mut nav = NavState::default();
        nav.request(LocationId::Function);

        let outcome = nav.fire(NavTimer::Snap {
            target: LocationId::Function,
            facing: Facing::Right,
        });
        assert_eq!(outcome, TimerOutcome::Snapped);
        assert_eq!(nav.avatar.position, LocationId::Function.position());
        assert!(nav.avatar.is_walking);
        assert!(!nav.panel_open);

        let outcome = nav.fire(NavTimer::Arrive {
            target: LocationId::Function,
        });
        assert_eq!(outcome, TimerOutcome::Arrived(LocationId::Function));
        assert!(!nav.avatar.is_walking);
        assert_eq!(nav.avatar.facing, Facing::Front);
        assert_eq!(nav.current, LocationId::Function);
        assert!(nav.panel_open);
        assert_eq!(nav.walk_origin, None);
    }

    #[test]
    fn test_arriving_home_keeps_panel_closed() {
        let mut nav = NavState::default();
        nav.request_direct(LocationId::Bio);
        nav.close_panel(false);

        nav.request(LocationId::Home);
        nav.fire(NavTimer::Arrive {
            target: LocationId::Home,
        });
        assert_eq!(nav.current, LocationId::Home);
        assert!(!nav.panel_open);
    }

    #[test]
    fn test_requests_while_walking_are_ignored() {
        let mut nav = NavState::default();
        nav.request(LocationId::Bio);
        let before = nav.clone();

        assert_eq!(nav.request(LocationId::Contact), NavRequest::Ignored);
        assert_eq!(nav.request(LocationId::Home), NavRequest::Ignored);
        assert_eq!(nav, before);
    }

    #[test]
    fn test_same_location_reopens_panel_without_moving() {
        let mut nav = NavState::default();
        nav.request_direct(LocationId::Contact);
        nav.close_panel(false);
        let position = nav.avatar.position;

        assert_eq!(nav.request(LocationId::Contact), NavRequest::PanelOpened);
        assert!(nav.panel_open);
        assert_eq!(nav.avatar.position, position);
        assert!(!nav.avatar.is_walking);

        assert_eq!(nav.request(LocationId::Contact), NavRequest::Unchanged);
    }

    #[test]
    fn test_settle_ends_walk_at_target_with_panel_closed() {
        let mut nav = NavState::default();
        nav.request(LocationId::Oracle);
        nav.settle();

        assert!(!nav.avatar.is_walking);
        assert_eq!(nav.avatar.facing, Facing::Front);
        assert_eq!(nav.avatar.position, LocationId::Oracle.position());
        assert_eq!(nav.current, LocationId::Oracle);
        assert!(!nav.panel_open);
        assert_eq!(nav.walk_origin, None);
        assert_eq!(nav.walk_target, None);
    }

    #[test]
    fn test_settle_when_idle_changes_nothing() {
        let mut nav = NavState::default();
        let before = nav.clone();
        nav.settle();
        assert_eq!(nav, before);
    }

    #[test]
    fn test_home_at_home_is_unchanged() {
        let mut nav = NavState::default();
        assert_eq!(nav.request(LocationId::Home), NavRequest::Unchanged);
        assert!(!nav.panel_open);
    }

    #[test]
    fn test_close_panel_resets_to_home_when_asked() {
        let mut nav = NavState::default();
        nav.request_direct(LocationId::Oracle);
        nav.close_panel(true);
        assert!(!nav.panel_open);
        assert_eq!(nav.current, LocationId::Home);

        nav.request_direct(LocationId::Oracle);
        nav.close_panel(false);
        assert_eq!(nav.current, LocationId::Oracle);
    }
}
