use crate::automaton::{Automaton, AutomatonError};
use crate::fa::{Label, State, Transition};
use std::collections::BTreeSet;

/// Mutable staging area used to assemble an automaton step by step before freezing it with
/// `result`.
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    initial_state: Option<State>,
    states: BTreeSet<State>,
    transitions: BTreeSet<Transition>,
    final_states: BTreeSet<State>,
    state_counter: usize,
}

impl From<&Automaton> for AutomatonBuilder {
    fn from(automaton: &Automaton) -> Self {
        let mut builder = AutomatonBuilder::new();
        builder.add_states(automaton.get_states().iter().cloned());
        for transition in automaton.get_transitions() {
            builder.add_transition(transition.clone());
        }
        builder.set_initial_state(automaton.get_initial_state().clone());
        for state in automaton.get_final_states() {
            builder.make_final_state(state.clone());
        }
        builder
    }
}

impl AutomatonBuilder {
    pub fn new() -> Self {
        AutomatonBuilder::default()
    }

    /// Adds a fresh state named after the prefix and an internal counter, skipping names
    /// which are already taken.
    pub fn new_state_with_prefix(&mut self, prefix: &str) -> State {
        loop {
            let candidate = State::new(format!("{}{}", prefix, self.state_counter));

            if !self.states.contains(&candidate) {
                self.states.insert(candidate.clone());
                return candidate;
            }

            self.state_counter += 1;
        }
    }

    pub fn new_state(&mut self) -> State {
        self.new_state_with_prefix("q")
    }

    /// Returns true if the state was not known before
    pub fn add_state(&mut self, state: State) -> bool {
        self.states.insert(state)
    }

    pub fn add_states(&mut self, states: impl IntoIterator<Item = State>) {
        self.states.extend(states);
    }

    pub fn set_initial_state(&mut self, state: State) {
        self.states.insert(state.clone());
        self.initial_state = Some(state);
    }

    pub fn get_initial_state(&self) -> Option<&State> {
        self.initial_state.as_ref()
    }

    pub fn make_final_state(&mut self, state: State) {
        self.states.insert(state.clone());
        self.final_states.insert(state);
    }

    /// Adds a transition together with both of its states. Returns false if the same
    /// transition was already present.
    pub fn add_transition(&mut self, transition: Transition) -> bool {
        self.states.insert(transition.get_left().clone());
        self.states.insert(transition.get_right().clone());
        self.transitions.insert(transition)
    }

    pub fn has_transition(&self, from: &State, to: &State, label: Label) -> bool {
        self.transitions
            .iter()
            .any(|t| t.get_left() == from && t.get_right() == to && t.get_label() == label)
    }

    /// Freezes the builder. The alphabet is made up of the symbols used by the transitions.
    pub fn result(self) -> Result<Automaton, AutomatonError> {
        let initial_state = self
            .initial_state
            .ok_or(AutomatonError::MissingInitialState)?;

        let alphabet = self
            .transitions
            .iter()
            .filter_map(Transition::get_symbol)
            .collect();

        Ok(Automaton::new(
            self.states,
            alphabet,
            initial_state,
            self.final_states,
            self.transitions,
        ))
    }
}
