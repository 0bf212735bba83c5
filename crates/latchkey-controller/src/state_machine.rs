//! Access session state machine.
//!
//! # States
//!
//! - `Idle`: no session in progress
//! - `AwaitingCredential`: the operator is typing a key
//! - `Deciding`: the key is being looked up in the identity store
//! - `Granted` / `Denied`: outcome of the lookup
//! - `Opening`: the latch is moving to open
//! - `HoldingOpen`: the open window is running
//! - `Closing`: viewer shutdown, latch moving to closed
//!
//! # Valid Transitions
//!
//! - Idle → AwaitingCredential → Deciding → Granted/Denied
//! - Granted → Opening → HoldingOpen → Closing → Idle
//! - Granted/Opening → Closing
//! - Denied → Idle
//! - AwaitingCredential/Deciding → Idle (input closed, store failure)
//!
//! Every path out of `Granted` goes through `Closing`; there is no edge from
//! `Granted`, `Opening` or `HoldingOpen` back to `Idle`.
//!
//! # Examples
//!
//! ```
//! use latchkey_controller::{SessionState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! machine.transition_to(SessionState::AwaitingCredential).unwrap();
//! machine.transition_to(SessionState::Deciding).unwrap();
//! machine.transition_to(SessionState::Denied).unwrap();
//! machine.transition_to(SessionState::Idle).unwrap();
//!
//! assert_eq!(machine.history().len(), 4);
//! assert!(machine.transition_to(SessionState::HoldingOpen).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use latchkey_core::{Error, Result};

/// Maximum number of state transitions to keep in history.
///
/// A granted session takes seven transitions, so this covers the last dozen
/// or so sessions.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of an access session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session in progress.
    Idle,

    /// Waiting for the operator to enter a key.
    AwaitingCredential,

    /// Looking the key up in the identity store.
    Deciding,

    /// The key belongs to an enrolled identity.
    Granted,

    /// Unknown key.
    Denied,

    /// The latch is being opened.
    Opening,

    /// The open window is running.
    HoldingOpen,

    /// Viewer shutdown and latch closing.
    Closing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            SessionState::Idle => "Idle",
            SessionState::AwaitingCredential => "AwaitingCredential",
            SessionState::Deciding => "Deciding",
            SessionState::Granted => "Granted",
            SessionState::Denied => "Denied",
            SessionState::Opening => "Opening",
            SessionState::HoldingOpen => "HoldingOpen",
            SessionState::Closing => "Closing",
        };
        write!(f, "{}", state_str)
    }
}

impl SessionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_controller::SessionState;
    ///
    /// assert!(SessionState::Granted.can_transition_to(&SessionState::Opening));
    /// assert!(!SessionState::Granted.can_transition_to(&SessionState::Idle));
    /// ```
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            // From Idle
            (SessionState::Idle, SessionState::AwaitingCredential)
            // From AwaitingCredential
            | (SessionState::AwaitingCredential, SessionState::Deciding | SessionState::Idle)
            // From Deciding
            | (SessionState::Deciding, SessionState::Granted | SessionState::Denied | SessionState::Idle)
            // From Granted
            | (SessionState::Granted, SessionState::Opening | SessionState::Closing)
            // From Denied
            | (SessionState::Denied, SessionState::Idle)
            // From Opening
            | (SessionState::Opening, SessionState::HoldingOpen | SessionState::Closing)
            // From HoldingOpen
            | (SessionState::HoldingOpen, SessionState::Closing)
            // From Closing
            | (SessionState::Closing, SessionState::Idle)
        )
    }

    /// Whether the latch may be open in this state.
    pub fn latch_may_be_open(&self) -> bool {
        matches!(
            self,
            SessionState::Opening | SessionState::HoldingOpen | SessionState::Closing
        )
    }
}

/// A single recorded state transition.
///
/// The `timestamp` is process-local and is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: SessionState,

    /// The state transitioned to.
    pub to: SessionState,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State machine for one access controller.
///
/// Not thread-safe; the session that owns it drives it from a single task.
#[derive(Debug)]
pub struct StateMachine {
    current_state: SessionState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::Idle,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Create a builder for constructing a state machine with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_controller::{SessionState, StateMachine};
    ///
    /// let machine = StateMachine::builder()
    ///     .with_initial_state(SessionState::HoldingOpen)
    ///     .build();
    ///
    /// assert_eq!(machine.current_state(), &SessionState::HoldingOpen);
    /// ```
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::default()
    }

    pub fn current_state(&self) -> &SessionState {
        &self.current_state
    }

    /// Get the time elapsed in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N state transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if `new_state` is not
    /// reachable from the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());

        Ok(transition)
    }

    /// Force the machine back to Idle, whatever the current state.
    ///
    /// Used after an aborted workflow. Never call this while the latch may
    /// be open; close it through `Closing` instead.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, SessionState::Idle);
        self.perform_state_change(SessionState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: SessionState, transition: StateTransition) {
        self.current_state = new_state;
        self.state_entered_at = Instant::now();
        self.add_to_history(transition);
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`StateMachine`].
#[derive(Debug)]
pub struct StateMachineBuilder {
    initial_state: SessionState,
    history: VecDeque<StateTransition>,
}

impl StateMachineBuilder {
    pub fn with_initial_state(mut self, state: SessionState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_history(mut self, history: VecDeque<StateTransition>) -> Self {
        self.history = history;
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            state_entered_at: Instant::now(),
            history: self.history,
        }
    }
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: SessionState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GRANTED_FLOW: [SessionState; 8] = [
        SessionState::Idle,
        SessionState::AwaitingCredential,
        SessionState::Deciding,
        SessionState::Granted,
        SessionState::Opening,
        SessionState::HoldingOpen,
        SessionState::Closing,
        SessionState::Idle,
    ];

    #[test]
    fn test_new_machine_starts_idle() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), &SessionState::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_complete_granted_flow() {
        let mut machine = StateMachine::new();
        for state in &GRANTED_FLOW[1..] {
            machine.transition_to(*state).unwrap();
        }

        assert_eq!(machine.current_state(), &SessionState::Idle);
        assert_eq!(machine.history().len(), 7);
        let visited: Vec<_> = machine.history().iter().map(|t| t.to).collect();
        assert_eq!(visited, GRANTED_FLOW[1..].to_vec());
    }

    #[test]
    fn test_denied_flow() {
        let mut machine = StateMachine::new();
        machine
            .transition_to(SessionState::AwaitingCredential)
            .unwrap();
        machine.transition_to(SessionState::Deciding).unwrap();
        machine.transition_to(SessionState::Denied).unwrap();
        machine.transition_to(SessionState::Idle).unwrap();

        assert_eq!(machine.current_state(), &SessionState::Idle);
    }

    #[rstest]
    #[case(SessionState::Idle, SessionState::Granted)]
    #[case(SessionState::Idle, SessionState::Opening)]
    #[case(SessionState::AwaitingCredential, SessionState::Granted)]
    #[case(SessionState::Denied, SessionState::Opening)]
    #[case(SessionState::Granted, SessionState::Idle)]
    #[case(SessionState::Opening, SessionState::Idle)]
    #[case(SessionState::HoldingOpen, SessionState::Idle)]
    #[case(SessionState::Closing, SessionState::HoldingOpen)]
    fn test_invalid_transitions(#[case] from: SessionState, #[case] to: SessionState) {
        let mut machine = StateMachine::builder().with_initial_state(from).build();

        let result = machine.transition_to(to);

        assert!(matches!(
            result,
            Err(Error::InvalidStateTransition { .. })
        ));
        assert_eq!(machine.current_state(), &from);
        assert!(machine.history().is_empty());
    }

    #[rstest]
    #[case(SessionState::Granted)]
    #[case(SessionState::Opening)]
    #[case(SessionState::HoldingOpen)]
    fn test_open_states_only_leave_through_closing(#[case] state: SessionState) {
        assert!(state.can_transition_to(&SessionState::Closing));
        assert!(!state.can_transition_to(&SessionState::Idle));
        assert!(!state.can_transition_to(&SessionState::Denied));
    }

    #[test]
    fn test_history_is_capped() {
        let mut machine = StateMachine::new();
        for _ in 0..30 {
            for state in &GRANTED_FLOW[1..] {
                machine.transition_to(*state).unwrap();
            }
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(machine.history().back().unwrap().to, SessionState::Idle);
    }

    #[test]
    fn test_last_transitions_returns_most_recent() {
        let mut machine = StateMachine::new();
        for state in &GRANTED_FLOW[1..] {
            machine.transition_to(*state).unwrap();
        }

        let last = machine.last_transitions(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].to, SessionState::Closing);
        assert_eq!(last[1].to, SessionState::Idle);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut machine = StateMachine::builder()
            .with_initial_state(SessionState::Deciding)
            .build();

        let transition = machine.reset();

        assert_eq!(transition.from, SessionState::Deciding);
        assert_eq!(transition.to, SessionState::Idle);
        assert_eq!(machine.current_state(), &SessionState::Idle);
    }

    #[test]
    fn test_state_display_formatting() {
        assert_eq!(SessionState::HoldingOpen.to_string(), "HoldingOpen");
        assert_eq!(
            SessionState::AwaitingCredential.to_string(),
            "AwaitingCredential"
        );
    }

    #[test]
    fn test_latch_may_be_open() {
        assert!(SessionState::HoldingOpen.latch_may_be_open());
        assert!(!SessionState::Granted.latch_may_be_open());
        assert!(!SessionState::Idle.latch_may_be_open());
    }
}
