//! Per-instance write state machine.
//!
//! Tracks a tag writer from mount through each write attempt and back.
//!
//! # States
//!
//! - `Idle`: Mounted or between attempts
//! - `Probing`: Availability probe in progress
//! - `Unavailable` / `Available`: Probe result
//! - `Acquiring`: Requesting the NFC session (native only)
//! - `Encoding`: Building the NDEF payload
//! - `Writing`: Waiting for the platform to confirm the write
//! - `Succeeded` / `Failed`: Attempt result
//! - `Releasing`: Relinquishing the session
//!
//! # Valid Transitions
//!
//! - Idle → Probing → Available/Unavailable
//! - Unavailable → Probing
//! - Available/Idle → Acquiring → Encoding → Writing → Succeeded/Failed
//! - Available/Idle → Encoding (browser targets hold no session)
//! - Acquiring/Encoding → Failed
//! - Succeeded/Failed → Releasing → Idle
//! - Acquiring/Encoding/Writing → Releasing (attempt abandoned mid-flight)
//! - Any → Idle via [`reset`](WriteStateMachine::reset)
//!
//! Acquiring is only reachable from Idle or Available, so it cannot be
//! re-entered before the previous attempt has passed through Releasing.
//!
//! # Examples
//!
//! ```
//! use tapwrite_writer::{WriteState, WriteStateMachine};
//!
//! let mut machine = WriteStateMachine::new();
//! machine.transition_to(WriteState::Probing).unwrap();
//! machine.transition_to(WriteState::Available).unwrap();
//! assert_eq!(machine.current_state(), WriteState::Available);
//!
//! assert!(machine.transition_to(WriteState::Writing).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use tapwrite_core::{Error, Result, constants::DEFAULT_HISTORY_SIZE};

/// States of a tag writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteState {
    Idle,
    Probing,
    Unavailable,
    Available,
    Acquiring,
    Encoding,
    Writing,
    Succeeded,
    Failed,
    Releasing,
}

impl fmt::Display for WriteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            WriteState::Idle => "Idle",
            WriteState::Probing => "Probing",
            WriteState::Unavailable => "Unavailable",
            WriteState::Available => "Available",
            WriteState::Acquiring => "Acquiring",
            WriteState::Encoding => "Encoding",
            WriteState::Writing => "Writing",
            WriteState::Succeeded => "Succeeded",
            WriteState::Failed => "Failed",
            WriteState::Releasing => "Releasing",
        };
        write!(f, "{}", state_str)
    }
}

impl WriteState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapwrite_writer::WriteState;
    ///
    /// assert!(WriteState::Available.can_transition_to(&WriteState::Acquiring));
    /// assert!(!WriteState::Unavailable.can_transition_to(&WriteState::Acquiring));
    /// ```
    pub fn can_transition_to(&self, target: &WriteState) -> bool {
        matches!(
            (self, target),
            // Mount
            (WriteState::Idle, WriteState::Probing)
            | (WriteState::Probing, WriteState::Available | WriteState::Unavailable)
            | (WriteState::Unavailable, WriteState::Probing)
            // User-triggered attempt
            | (
                WriteState::Available | WriteState::Idle,
                WriteState::Acquiring | WriteState::Encoding
            )
            | (WriteState::Acquiring, WriteState::Encoding | WriteState::Failed)
            | (WriteState::Encoding, WriteState::Writing | WriteState::Failed)
            | (WriteState::Writing, WriteState::Succeeded | WriteState::Failed)
            // Teardown of the attempt
            | (WriteState::Succeeded | WriteState::Failed, WriteState::Releasing)
            | (
                WriteState::Acquiring | WriteState::Encoding | WriteState::Writing,
                WriteState::Releasing
            )
            | (WriteState::Releasing, WriteState::Idle)
        )
    }

    /// Whether an attempt is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WriteState::Acquiring
                | WriteState::Encoding
                | WriteState::Writing
                | WriteState::Succeeded
                | WriteState::Failed
                | WriteState::Releasing
        )
    }
}

/// Represents a single state transition with timestamp.
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: WriteState,
    pub to: WriteState,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: WriteState, to: WriteState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// State machine for one tag writer instance.
///
/// Not thread-safe by design. Protect shared access with
/// `tokio::sync::Mutex`.
#[derive(Debug)]
pub struct WriteStateMachine {
    current_state: WriteState,
    history: VecDeque<StateTransition>,
    history_size: usize,
}

impl WriteStateMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for a machine with custom history or initial state.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapwrite_writer::{WriteState, WriteStateMachine};
    ///
    /// let machine = WriteStateMachine::builder()
    ///     .with_initial_state(WriteState::Available)
    ///     .with_history_size(10)
    ///     .build();
    ///
    /// assert_eq!(machine.current_state(), WriteState::Available);
    /// ```
    pub fn builder() -> WriteStateMachineBuilder {
        WriteStateMachineBuilder::default()
    }

    pub fn current_state(&self) -> WriteState {
        self.current_state
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
    /// Returns `Error::InvalidStateTransition` if the requested transition
    /// is not valid for the current state. The state is left unchanged.
    pub fn transition_to(&mut self, new_state: WriteState) -> Result<StateTransition> {
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

    /// Reset the state machine to Idle from any state.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, WriteState::Idle);
        self.perform_state_change(WriteState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: WriteState, transition: StateTransition) {
        self.current_state = new_state;
        self.add_to_history(transition);
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        while self.history.len() > self.history_size {
            self.history.pop_front();
        }
    }
}

impl Default for WriteStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`WriteStateMachine`].
#[derive(Debug)]
pub struct WriteStateMachineBuilder {
    initial_state: WriteState,
    history_size: usize,
}

impl WriteStateMachineBuilder {
    pub fn with_initial_state(mut self, state: WriteState) -> Self {
        self.initial_state = state;
        self
    }

    /// Number of transitions kept. Values below 1 are raised to 1.
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size.max(1);
        self
    }

    pub fn build(self) -> WriteStateMachine {
        WriteStateMachine {
            current_state: self.initial_state,
            history: VecDeque::with_capacity(self.history_size),
            history_size: self.history_size,
        }
    }
}

impl Default for WriteStateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: WriteState::Idle,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL: [WriteState; 10] = [
        WriteState::Idle,
        WriteState::Probing,
        WriteState::Unavailable,
        WriteState::Available,
        WriteState::Acquiring,
        WriteState::Encoding,
        WriteState::Writing,
        WriteState::Succeeded,
        WriteState::Failed,
        WriteState::Releasing,
    ];

    fn drive(machine: &mut WriteStateMachine, states: &[WriteState]) {
        for state in states {
            machine.transition_to(*state).unwrap();
        }
    }

    #[test]
    fn test_new_machine_starts_idle() {
        let machine = WriteStateMachine::new();
        assert_eq!(machine.current_state(), WriteState::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_native_success_flow() {
        let mut machine = WriteStateMachine::new();
        drive(
            &mut machine,
            &[
                WriteState::Probing,
                WriteState::Available,
                WriteState::Acquiring,
                WriteState::Encoding,
                WriteState::Writing,
                WriteState::Succeeded,
                WriteState::Releasing,
                WriteState::Idle,
            ],
        );
        assert_eq!(machine.history().len(), 8);
        assert_eq!(machine.current_state(), WriteState::Idle);
    }

    #[test]
    fn test_browser_flow_skips_acquiring() {
        let mut machine = WriteStateMachine::new();
        drive(
            &mut machine,
            &[
                WriteState::Probing,
                WriteState::Available,
                WriteState::Encoding,
                WriteState::Writing,
                WriteState::Failed,
                WriteState::Releasing,
                WriteState::Idle,
            ],
        );
        assert_eq!(machine.current_state(), WriteState::Idle);
    }

    #[test]
    fn test_second_attempt_from_idle() {
        let mut machine = WriteStateMachine::builder()
            .with_initial_state(WriteState::Idle)
            .build();
        drive(
            &mut machine,
            &[
                WriteState::Acquiring,
                WriteState::Failed,
                WriteState::Releasing,
                WriteState::Idle,
                WriteState::Acquiring,
            ],
        );
        assert_eq!(machine.current_state(), WriteState::Acquiring);
    }

    #[rstest]
    #[case(WriteState::Unavailable, WriteState::Acquiring)]
    #[case(WriteState::Unavailable, WriteState::Encoding)]
    #[case(WriteState::Acquiring, WriteState::Acquiring)]
    #[case(WriteState::Writing, WriteState::Acquiring)]
    #[case(WriteState::Succeeded, WriteState::Idle)]
    #[case(WriteState::Failed, WriteState::Acquiring)]
    #[case(WriteState::Available, WriteState::Probing)]
    #[case(WriteState::Idle, WriteState::Writing)]
    fn test_invalid_transitions(#[case] from: WriteState, #[case] to: WriteState) {
        let mut machine = WriteStateMachine::builder().with_initial_state(from).build();
        let error = machine.transition_to(to).unwrap_err();
        assert!(matches!(error, Error::InvalidStateTransition { .. }));
        assert_eq!(machine.current_state(), from);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_acquiring_only_after_release() {
        // Every state that can enter Acquiring is outside an attempt.
        for from in ALL {
            if from.can_transition_to(&WriteState::Acquiring) {
                assert!(!from.is_busy(), "{from} can re-enter Acquiring");
            }
        }
    }

    #[test]
    fn test_abandoned_attempt_passes_through_releasing() {
        for from in [WriteState::Acquiring, WriteState::Encoding, WriteState::Writing] {
            let mut machine = WriteStateMachine::builder().with_initial_state(from).build();
            drive(
                &mut machine,
                &[WriteState::Releasing, WriteState::Idle, WriteState::Acquiring],
            );
            assert_eq!(machine.current_state(), WriteState::Acquiring);
        }
    }

    #[test]
    fn test_reset_from_any_state() {
        for from in ALL {
            let mut machine = WriteStateMachine::builder().with_initial_state(from).build();
            let transition = machine.reset();
            assert_eq!(transition.from, from);
            assert_eq!(machine.current_state(), WriteState::Idle);
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = WriteStateMachine::builder().with_history_size(3).build();
        drive(
            &mut machine,
            &[
                WriteState::Probing,
                WriteState::Unavailable,
                WriteState::Probing,
                WriteState::Unavailable,
                WriteState::Probing,
            ],
        );

        assert_eq!(machine.history().len(), 3);
        let last = machine.last_transitions(1);
        assert_eq!(last[0].from, WriteState::Unavailable);
        assert_eq!(last[0].to, WriteState::Probing);
    }

    #[test]
    fn test_default_history_size() {
        let mut machine = WriteStateMachine::new();
        for _ in 0..60 {
            drive(&mut machine, &[WriteState::Probing, WriteState::Unavailable]);
            machine.reset();
        }
        assert_eq!(machine.history().len(), DEFAULT_HISTORY_SIZE);
    }

    #[test]
    fn test_transition_serialization() {
        let transition = StateTransition::new(WriteState::Writing, WriteState::Succeeded);
        let json = serde_json::to_string(&transition).unwrap();
        assert_eq!(json, r#"{"from":"writing","to":"succeeded"}"#);
    }
}
