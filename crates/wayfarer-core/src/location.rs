//! Points of interest on the portfolio map.
//!
//! Coordinates are percentages of the viewport, so a renderer can place
//! markers regardless of terminal size.

use serde::{Deserialize, Serialize};

/// A position on the map, in viewport percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward `to`; `t` is clamped to `0.0..=1.0`.
    pub fn lerp(self, to: Point, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationId {
    Home,
    Bio,
    Function,
    Oracle,
    Contact,
}

/// An immutable named location with its marker data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub position: Point,
    pub label: &'static str,
    pub route_label: &'static str,
    pub icon: &'static str,
}

const LOCATIONS: [Location; 5] = [
    Location {
        id: LocationId::Home,
        position: Point::new(50.0, 45.0),
        label: "Start",
        route_label: "Home",
        icon: "⌂",
    },
    Location {
        id: LocationId::Bio,
        position: Point::new(20.0, 60.0),
        label: "Bio Forest",
        route_label: "About Me",
        icon: "☺",
    },
    Location {
        id: LocationId::Function,
        position: Point::new(80.0, 60.0),
        label: "Code Castle",
        route_label: "Skills",
        icon: "⚔",
    },
    Location {
        id: LocationId::Oracle,
        position: Point::new(35.0, 85.0),
        label: "AI Nexus",
        route_label: "AI Chat",
        icon: "✦",
    },
    Location {
        id: LocationId::Contact,
        position: Point::new(65.0, 85.0),
        label: "Contact Cave",
        route_label: "Contact",
        icon: "✉",
    },
];

impl LocationId {
    pub fn all() -> [LocationId; 5] {
        [
            LocationId::Home,
            LocationId::Bio,
            LocationId::Function,
            LocationId::Oracle,
            LocationId::Contact,
        ]
    }

    /// Locations reachable from the Standard-mode route bar.
    pub fn routes() -> [LocationId; 4] {
        [
            LocationId::Bio,
            LocationId::Function,
            LocationId::Oracle,
            LocationId::Contact,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationId::Home => "home",
            LocationId::Bio => "bio",
            LocationId::Function => "function",
            LocationId::Oracle => "oracle",
            LocationId::Contact => "contact",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "home" => Some(LocationId::Home),
            "bio" => Some(LocationId::Bio),
            "function" => Some(LocationId::Function),
            "oracle" => Some(LocationId::Oracle),
            "contact" => Some(LocationId::Contact),
            _ => None,
        }
    }

    pub fn location(&self) -> &'static Location {
        let idx = match self {
            LocationId::Home => 0,
            LocationId::Bio => 1,
            LocationId::Function => 2,
            LocationId::Oracle => 3,
            LocationId::Contact => 4,
        };
        &LOCATIONS[idx]
    }

    pub fn position(&self) -> Point {
        self.location().position
    }
}
