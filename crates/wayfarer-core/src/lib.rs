pub mod ai;
pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod navigation;
pub mod profile;
pub mod prompts;
pub mod retry;
pub mod scheduler;
pub mod state;

// Re-export main types for convenience
pub use ai::{GeminiClient, ReqwestTransport, Transport};
pub use config::Config;
pub use controller::Controller;
pub use error::TransportError;
pub use location::{Location, LocationId, Point};
pub use navigation::{AvatarState, Facing, NavState, NavTimer};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use scheduler::Scheduler;
pub use state::{Action, AppMode, AppState, ChatMessage, ChatRole, PromptKind, PromptRequest, SkillScan};
