//! UI-agnostic session state and its reducer
//!
//! Every user action and timer tick is an [`Action`]. [`reduce`] folds it
//! into [`AppState`] and reports the side effects the caller must carry out:
//! timers to schedule and prompts to send. Nothing here performs IO.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::location::LocationId;
use crate::navigation::{NavRequest, NavState, NavTimer, TimerOutcome};
use crate::prompts::{skill_scan_prompt, ORACLE_GREETING, ORACLE_PERSONA};

/// A chat message in the oracle conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Ai,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// The skill currently being described by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillScan {
    pub skill: String,
    pub description: String,
    pub loading: bool,
    /// Matches replies to the request that produced them.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Animated walking between locations.
    Adventure,
    /// Route bar with instant panels.
    Standard,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Adventure => "adventure",
            AppMode::Standard => "standard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "adventure" | "rpg" => Some(AppMode::Adventure),
            "standard" | "normal" => Some(AppMode::Standard),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AppMode::Adventure => "Adventure Mode",
            AppMode::Standard => "Standard Mode",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// `None` while the mode-selection screen is up.
    pub mode: Option<AppMode>,
    pub is_night: bool,
    pub nav: NavState,
    pub chat: Vec<ChatMessage>,
    pub chat_loading: bool,
    pub scan: Option<SkillScan>,
    pub scan_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: None,
            is_night: true,
            nav: NavState::default(),
            chat: vec![ChatMessage::new(ChatRole::System, ORACLE_GREETING)],
            chat_loading: false,
            scan: None,
            scan_generation: 0,
        }
    }
}

impl AppState {
    /// Messages meant to be shown as bubbles (the system greeting is not).
    pub fn visible_chat(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chat.iter().filter(|m| m.role != ChatRole::System)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ChooseMode(AppMode),
    LeaveMode,
    ToggleTheme,
    /// Animated walk to a location.
    Navigate(LocationId),
    /// Instant jump to a location's panel.
    NavigateDirect(LocationId),
    ClosePanel,
    Timer(NavTimer),
    SubmitChat(String),
    ChatReplied(String),
    ScanSkill(String),
    SkillScanned { generation: u64, text: String },
    DismissScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Chat,
    SkillScan { generation: u64 },
}

/// A prompt for the oracle, with the action to dispatch on reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub prompt: String,
    pub instruction: String,
}

impl PromptRequest {
    pub fn into_reply(self, text: String) -> Action {
        match self.kind {
            PromptKind::Chat => Action::ChatReplied(text),
            PromptKind::SkillScan { generation } => Action::SkillScanned { generation, text },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Schedule { delay: Duration, timer: NavTimer },
    Prompt(PromptRequest),
}

pub fn reduce(mut state: AppState, action: Action) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::ChooseMode(mode) => {
            debug!(mode = mode.as_str(), "mode chosen");
            state.mode = Some(mode);
        }
        Action::LeaveMode => {
            state.mode = None;
            state.nav.settle();
            state.nav.close_panel(false);
            state.scan = None;
        }
        Action::ToggleTheme => {
            state.is_night = !state.is_night;
        }
        Action::Navigate(target) => match state.nav.request(target) {
            NavRequest::Walking(timers) => {
                effects.extend(
                    timers
                        .into_iter()
                        .map(|(delay, timer)| Effect::Schedule { delay, timer }),
                );
            }
            NavRequest::Ignored | NavRequest::PanelOpened | NavRequest::Unchanged => {}
        },
        Action::NavigateDirect(target) => {
            state.nav.request_direct(target);
            state.scan = None;
        }
        Action::ClosePanel => {
            let reset = state.mode == Some(AppMode::Standard);
            state.nav.close_panel(reset);
            state.scan = None;
        }
        Action::Timer(timer) => {
            if let TimerOutcome::Arrived(_) = state.nav.fire(timer) {
                state.scan = None;
            }
        }
        Action::SubmitChat(text) => {
            if text.trim().is_empty() || state.chat_loading {
                return (state, effects);
            }
            state.chat.push(ChatMessage::new(ChatRole::User, text.clone()));
            state.chat_loading = true;
            effects.push(Effect::Prompt(PromptRequest {
                kind: PromptKind::Chat,
                prompt: text,
                instruction: ORACLE_PERSONA.to_string(),
            }));
        }
        Action::ChatReplied(text) => {
            state.chat.push(ChatMessage::new(ChatRole::Ai, text));
            state.chat_loading = false;
        }
        Action::ScanSkill(skill) => {
            state.scan_generation += 1;
            let generation = state.scan_generation;
            let prompt = skill_scan_prompt(&skill);
            state.scan = Some(SkillScan {
                skill,
                description: String::new(),
                loading: true,
                generation,
            });
            effects.push(Effect::Prompt(PromptRequest {
                kind: PromptKind::SkillScan { generation },
                prompt,
                instruction: String::new(),
            }));
        }
        Action::SkillScanned { generation, text } => match state.scan.as_mut() {
            Some(scan) if scan.generation == generation => {
                scan.description = text;
                scan.loading = false;
            }
            _ => debug!(generation, "dropping stale skill scan reply"),
        },
        Action::DismissScan => {
            state.scan = None;
        }
    }

    (state, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{ARRIVE_DELAY, SNAP_DELAY};

    fn apply(state: AppState, actions: Vec<Action>) -> (AppState, Vec<Effect>) {
        let mut effects = Vec::new();
        let mut state = state;
        for action in actions {
            let (next, mut produced) = reduce(state, action);
            state = next;
            effects.append(&mut produced);
        }
        (state, effects)
    }

    fn scanning(skill: &str) -> AppState {
        let (state, _) = apply(
            AppState::default(),
            vec![
                Action::ChooseMode(AppMode::Adventure),
                Action::NavigateDirect(LocationId::Function),
                Action::ScanSkill(skill.to_string()),
            ],
        );
        state
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::default();
        assert_eq!(state.mode, None);
        assert!(state.is_night);
        assert_eq!(state.nav.current, LocationId::Home);
        assert_eq!(state.chat.len(), 1);
        assert_eq!(state.visible_chat().count(), 0);
    }

    #[test]
    fn test_navigate_emits_both_timers_in_order() {
        let (_, effects) = reduce(AppState::default(), Action::Navigate(LocationId::Oracle));
        let delays: Vec<Duration> = effects
            .iter()
            .map(|e| match e {
                Effect::Schedule { delay, .. } => *delay,
                other => panic!("unexpected effect {:?}", other),
            })
            .collect();
        assert_eq!(delays, vec![SNAP_DELAY, ARRIVE_DELAY]);
    }

    #[test]
    fn test_navigate_while_walking_changes_nothing() {
        let (walking, _) = reduce(AppState::default(), Action::Navigate(LocationId::Bio));
        let (after, effects) = reduce(walking.clone(), Action::Navigate(LocationId::Contact));
        assert_eq!(after, walking);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_arrival_clears_scan() {
        let state = scanning("Git");
        let (state, _) = reduce(state, Action::ClosePanel);
        let (state, _) = reduce(state, Action::ScanSkill("Docker".into()));
        assert!(state.scan.is_some());

        let (state, _) = reduce(
            state,
            Action::Timer(NavTimer::Arrive {
                target: LocationId::Bio,
            }),
        );
        assert_eq!(state.scan, None);
    }

    #[test]
    fn test_close_panel_always_clears_scan() {
        for mode in [AppMode::Adventure, AppMode::Standard] {
            let (state, _) = apply(
                AppState::default(),
                vec![
                    Action::ChooseMode(mode),
                    Action::NavigateDirect(LocationId::Function),
                    Action::ScanSkill("Python".into()),
                    Action::ClosePanel,
                ],
            );
            assert_eq!(state.scan, None);
            assert!(!state.nav.panel_open);
        }
    }

    #[test]
    fn test_close_panel_in_standard_mode_returns_home() {
        let (state, _) = apply(
            AppState::default(),
            vec![
                Action::ChooseMode(AppMode::Standard),
                Action::NavigateDirect(LocationId::Contact),
                Action::ClosePanel,
            ],
        );
        assert_eq!(state.nav.current, LocationId::Home);

        let (state, _) = apply(
            AppState::default(),
            vec![
                Action::ChooseMode(AppMode::Adventure),
                Action::NavigateDirect(LocationId::Contact),
                Action::ClosePanel,
            ],
        );
        assert_eq!(state.nav.current, LocationId::Contact);
    }

    #[test]
    fn test_submit_chat_appends_and_prompts() {
        let (state, effects) = reduce(AppState::default(), Action::SubmitChat("Who are you?".into()));
        assert!(state.chat_loading);
        assert_eq!(
            state.chat.last(),
            Some(&ChatMessage::new(ChatRole::User, "Who are you?"))
        );
        assert_eq!(
            effects,
            vec![Effect::Prompt(PromptRequest {
                kind: PromptKind::Chat,
                prompt: "Who are you?".into(),
                instruction: ORACLE_PERSONA.into(),
            })]
        );

        let (state, _) = reduce(state, Action::ChatReplied("A seeker of bugs.".into()));
        assert!(!state.chat_loading);
        assert_eq!(state.visible_chat().count(), 2);
        assert_eq!(state.chat.last().map(|m| m.role), Some(ChatRole::Ai));
    }

    #[test]
    fn test_submit_chat_rejects_blank_and_pending() {
        let (state, effects) = reduce(AppState::default(), Action::SubmitChat("   ".into()));
        assert!(effects.is_empty());
        assert_eq!(state, AppState::default());

        let (state, _) = reduce(state, Action::SubmitChat("first".into()));
        let before = state.clone();
        let (state, effects) = reduce(state, Action::SubmitChat("second".into()));
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_scan_prompt_has_no_instruction() {
        let (state, effects) = reduce(AppState::default(), Action::ScanSkill("Rust".into()));
        let scan = state.scan.as_ref().expect("scan started");
        assert!(scan.loading);
        assert_eq!(scan.description, "");
        match &effects[..] {
            [Effect::Prompt(request)] => {
                assert_eq!(request.kind, PromptKind::SkillScan { generation: scan.generation });
                assert_eq!(request.prompt, skill_scan_prompt("Rust"));
                assert!(request.instruction.is_empty());
            }
            other => panic!("unexpected effects {:?}", other),
        }
    }

    #[test]
    fn test_stale_scan_reply_is_dropped() {
        let state = scanning("Java");
        let first = state.scan_generation;
        let (state, _) = reduce(state, Action::ScanSkill("C".into()));
        let second = state.scan_generation;

        let (state, _) = reduce(
            state,
            Action::SkillScanned {
                generation: first,
                text: "old news".into(),
            },
        );
        let scan = state.scan.clone().expect("scan open");
        assert_eq!(scan.skill, "C");
        assert!(scan.loading);

        let (state, _) = reduce(
            state,
            Action::SkillScanned {
                generation: second,
                text: "A sharp dagger of pointers.".into(),
            },
        );
        let scan = state.scan.expect("scan open");
        assert!(!scan.loading);
        assert_eq!(scan.description, "A sharp dagger of pointers.");
    }

    #[test]
    fn test_reply_after_dismiss_is_dropped() {
        let state = scanning("Linux");
        let generation = state.scan_generation;
        let (state, _) = reduce(state, Action::DismissScan);
        let (state, _) = reduce(
            state,
            Action::SkillScanned {
                generation,
                text: "late".into(),
            },
        );
        assert_eq!(state.scan, None);
    }

    #[test]
    fn test_chat_and_scan_are_independent() {
        let (state, _) = apply(
            scanning("HTML"),
            vec![Action::SubmitChat("hello".into()), Action::DismissScan],
        );
        assert!(state.chat_loading);
        assert_eq!(state.visible_chat().count(), 1);

        let (state, _) = reduce(state, Action::ScanSkill("CSS".into()));
        let (state, _) = reduce(state, Action::ChatReplied("hi".into()));
        assert!(state.scan.as_ref().map(|s| s.loading).unwrap_or(false));
    }

    #[test]
    fn test_into_reply_routes_by_kind() {
        let chat = PromptRequest {
            kind: PromptKind::Chat,
            prompt: "p".into(),
            instruction: String::new(),
        };
        assert_eq!(chat.into_reply("r".into()), Action::ChatReplied("r".into()));

        let scan = PromptRequest {
            kind: PromptKind::SkillScan { generation: 4 },
            prompt: "p".into(),
            instruction: String::new(),
        };
        assert_eq!(
            scan.into_reply("r".into()),
            Action::SkillScanned {
                generation: 4,
                text: "r".into()
            }
        );
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(AppMode::from_str("RPG"), Some(AppMode::Adventure));
        assert_eq!(AppMode::from_str("standard"), Some(AppMode::Standard));
        assert_eq!(AppMode::from_str("nope"), None);
    }
}
