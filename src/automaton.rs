/* The five-tuple of a finite automaton: states, alphabet, initial state, final states and
 * transitions. Automata are immutable once built, transformations produce new values. */

use crate::dot;
use crate::fa::{State, Symbol, Transition};
use crate::powerset::PowersetConstruction;
use color_eyre::eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// List of possible errors raised by automaton operations
#[derive(Debug, PartialEq, Eq)]
pub enum AutomatonError {
    /// A deterministic-only operation was called on a nondeterministic automaton
    NonDeterministic,
    /// The powerset construction needed more subsets than the given limit
    StateLimitExceeded(usize),
    /// The builder was frozen before an initial state was set
    MissingInitialState,
}

impl fmt::Display for AutomatonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomatonError::NonDeterministic => write!(
                f,
                "Error: Stepping through a nondeterministic automaton is unsupported, convert it to a DFA first!"
            ),
            AutomatonError::StateLimitExceeded(limit) => write!(
                f,
                "Error: Powerset construction exceeded the limit of {} states!",
                limit
            ),
            AutomatonError::MissingInitialState => {
                write!(f, "Error: The automaton has no initial state!")
            }
        }
    }
}

impl std::error::Error for AutomatonError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automaton {
    states: BTreeSet<State>,
    alphabet: BTreeSet<Symbol>,
    initial_state: State,
    final_states: BTreeSet<State>,
    transitions: BTreeSet<Transition>,
}

impl Automaton {
    pub fn new(
        states: BTreeSet<State>,
        alphabet: BTreeSet<Symbol>,
        initial_state: State,
        final_states: BTreeSet<State>,
        transitions: BTreeSet<Transition>,
    ) -> Self {
        Automaton {
            states,
            alphabet,
            initial_state,
            final_states,
            transitions,
        }
    }

    pub fn get_states(&self) -> &BTreeSet<State> {
        &self.states
    }

    pub fn get_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn get_initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn get_final_states(&self) -> &BTreeSet<State> {
        &self.final_states
    }

    pub fn get_transitions(&self) -> &BTreeSet<Transition> {
        &self.transitions
    }

    pub fn is_final(&self, state: &State) -> bool {
        self.final_states.contains(state)
    }

    /// Returns the state reached from `state` on `symbol`, or None if there is no such
    /// transition. On a nondeterministic automaton the first match is returned.
    pub fn next(&self, state: &State, symbol: Symbol) -> Option<&State> {
        self.transitions_from(state)
            .find(|t| t.get_symbol() == Some(symbol))
            .map(Transition::get_right)
    }

    // Transitions are ordered by their left state first, so the ones leaving `state` form a
    // contiguous range starting at the smallest transition with that left side.
    fn transitions_from(&self, state: &State) -> impl Iterator<Item = &Transition> {
        let left = state.clone();
        let lowest = Transition::new_epsilon(state.clone(), State::new(""));
        self.transitions
            .range(lowest..)
            .take_while(move |t| t.get_left() == &left)
    }

    /// Returns all transitions whose left side is the given state
    pub fn get_transitions_from(&self, state: &State) -> Vec<&Transition> {
        self.transitions_from(state).collect()
    }

    pub fn is_deterministic(&self) -> bool {
        self.transition_table().is_some()
    }

    // Successor lookup keyed by (state, symbol), None if the automaton is nondeterministic
    fn transition_table(&self) -> Option<HashMap<(&State, Symbol), &State>> {
        let mut table = HashMap::with_capacity(self.transitions.len());

        for transition in &self.transitions {
            // Any epsilon move makes the automaton nondeterministic
            let symbol = transition.get_symbol()?;

            if table
                .insert((transition.get_left(), symbol), transition.get_right())
                .is_some()
            {
                return None;
            }
        }
        Some(table)
    }

    /// Steps through the automaton consuming one symbol at a time. Only defined for
    /// deterministic automata, call `to_dfa` first otherwise.
    pub fn accepts(&self, input: &[Symbol]) -> Result<bool, AutomatonError> {
        let table = self
            .transition_table()
            .ok_or(AutomatonError::NonDeterministic)?;

        let mut current = &self.initial_state;

        for symbol in input {
            current = match table.get(&(current, *symbol)) {
                None => return Ok(false),
                Some(&next) => next,
            };
        }

        Ok(self.is_final(current))
    }

    /// Tests a word, treating every character as one symbol
    pub fn test(&self, word: &str) -> Result<bool, AutomatonError> {
        let input: Vec<Symbol> = word.chars().map(Symbol::new).collect();
        self.accepts(&input)
    }

    /// Returns an equivalent deterministic automaton. A deterministic automaton is returned
    /// as is.
    pub fn to_dfa(&self) -> Cow<'_, Automaton> {
        if self.is_deterministic() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(PowersetConstruction::apply(self))
        }
    }

    /// Like `to_dfa`, but gives up once the construction would produce more than `limit`
    /// states.
    pub fn to_dfa_with_limit(&self, limit: usize) -> Result<Cow<'_, Automaton>, AutomatonError> {
        if self.is_deterministic() {
            return Ok(Cow::Borrowed(self));
        }

        let dfa = PowersetConstruction::new(self)
            .with_state_limit(limit)
            .construct()?;
        Ok(Cow::Owned(dfa))
    }

    /// Converts the automaton to Graphviz dot code
    pub fn to_dot(&self) -> String {
        dot::to_dot(self)
    }

    pub fn save_json(&self, file_name: impl AsRef<Path>) -> Result<()> {
        let file_name = file_name.as_ref();
        let json_string = serde_json::to_string_pretty(self)?;

        let mut file = File::create(file_name)?;

        writeln!(file, "{}", json_string)?;

        info!("Saved automaton as {}", file_name.display());
        Ok(())
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dot())
    }
}

/// Load an automaton from a saved json file
pub fn load_automaton(file_name: impl AsRef<Path>) -> Result<Automaton> {
    let file = File::open(file_name)?;

    let buf_reader = BufReader::new(file);

    let automaton: Automaton = serde_json::from_reader(buf_reader)?;
    Ok(automaton)
}

#[cfg(test)]
mod automaton_tests {
    use super::*;

    fn state(name: &str) -> State {
        State::new(name)
    }

    fn sym(c: char) -> Symbol {
        Symbol::new(c)
    }

    /// Accepts words over {a, b} ending in "b"
    fn ends_in_b() -> Automaton {
        let transitions = BTreeSet::from([
            Transition::new_symbol(state("s"), state("s"), sym('a')),
            Transition::new_symbol(state("s"), state("t"), sym('b')),
            Transition::new_symbol(state("t"), state("s"), sym('a')),
            Transition::new_symbol(state("t"), state("t"), sym('b')),
        ]);
        Automaton::new(
            BTreeSet::from([state("s"), state("t")]),
            BTreeSet::from([sym('a'), sym('b')]),
            state("s"),
            BTreeSet::from([state("t")]),
            transitions,
        )
    }

    #[test]
    fn test_next() {
        let dfa = ends_in_b();
        assert_eq!(dfa.next(&state("s"), sym('b')), Some(&state("t")));
        assert_eq!(dfa.next(&state("t"), sym('a')), Some(&state("s")));
        assert_eq!(dfa.next(&state("t"), sym('c')), None);
        assert_eq!(dfa.next(&state("unknown"), sym('a')), None);
    }

    #[test]
    fn test_transitions_from() {
        let dfa = ends_in_b();
        let from_s = dfa.get_transitions_from(&state("s"));
        assert_eq!(from_s.len(), 2);
        assert!(from_s.iter().all(|t| t.get_left() == &state("s")));
        assert!(dfa.get_transitions_from(&state("x")).is_empty());
    }

    #[test]
    fn test_transitions_from_neighbouring_names() {
        // `p`, `q` and `q0` sort next to each other, only `q` may be returned
        let automaton = Automaton::new(
            BTreeSet::from([state("p"), state("q"), state("q0")]),
            BTreeSet::from([sym('a'), sym('b')]),
            state("q"),
            BTreeSet::from([state("q0")]),
            BTreeSet::from([
                Transition::new_symbol(state("p"), state("q"), sym('a')),
                Transition::new_epsilon(state("q"), state("")),
                Transition::new_symbol(state("q"), state("q0"), sym('b')),
                Transition::new_symbol(state("q"), state("p"), sym('a')),
                Transition::new_symbol(state("q0"), state("q"), sym('a')),
            ]),
        );

        let from_q = automaton.get_transitions_from(&state("q"));
        assert_eq!(from_q.len(), 3);
        assert!(from_q.iter().all(|t| t.get_left() == &state("q")));
        assert_eq!(automaton.next(&state("q"), sym('b')), Some(&state("q0")));
        assert_eq!(automaton.next(&state("q0"), sym('a')), Some(&state("q")));
        assert_eq!(automaton.get_transitions_from(&state("")).len(), 0);
    }

    #[test]
    fn test_accepts_long_word() {
        let dfa = ends_in_b();
        let word: String = "ab".repeat(5000);
        assert_eq!(dfa.test(&word), Ok(true));
        assert_eq!(dfa.test(&format!("{}a", word)), Ok(false));
    }

    #[test]
    fn test_is_deterministic() {
        assert!(ends_in_b().is_deterministic());

        let mut transitions = ends_in_b().get_transitions().clone();
        transitions.insert(Transition::new_epsilon(state("s"), state("t")));
        let with_epsilon = Automaton::new(
            BTreeSet::from([state("s"), state("t")]),
            BTreeSet::from([sym('a'), sym('b')]),
            state("s"),
            BTreeSet::from([state("t")]),
            transitions,
        );
        assert!(!with_epsilon.is_deterministic());

        let mut transitions = ends_in_b().get_transitions().clone();
        transitions.insert(Transition::new_symbol(state("s"), state("t"), sym('a')));
        let ambiguous = Automaton::new(
            BTreeSet::from([state("s"), state("t")]),
            BTreeSet::from([sym('a'), sym('b')]),
            state("s"),
            BTreeSet::from([state("t")]),
            transitions,
        );
        assert!(!ambiguous.is_deterministic());
    }

    #[test]
    fn test_accepts() {
        let dfa = ends_in_b();
        assert_eq!(dfa.test("b"), Ok(true));
        assert_eq!(dfa.test("aab"), Ok(true));
        assert_eq!(dfa.test("aba"), Ok(false));
        assert_eq!(dfa.test(""), Ok(false));
        // Symbols outside the alphabet have no successor
        assert_eq!(dfa.test("bc"), Ok(false));
        assert_eq!(dfa.accepts(&[sym('a'), sym('b')]), Ok(true));
    }

    #[test]
    fn test_accepts_empty_input_on_final_initial_state() {
        let automaton = Automaton::new(
            BTreeSet::from([state("q")]),
            BTreeSet::new(),
            state("q"),
            BTreeSet::from([state("q")]),
            BTreeSet::new(),
        );
        assert_eq!(automaton.test(""), Ok(true));
        assert_eq!(automaton.test("a"), Ok(false));
    }

    #[test]
    fn test_accepts_fails_on_nfa() {
        let nfa = Automaton::new(
            BTreeSet::from([state("q0"), state("q1")]),
            BTreeSet::new(),
            state("q0"),
            BTreeSet::from([state("q1")]),
            BTreeSet::from([Transition::new_epsilon(state("q0"), state("q1"))]),
        );
        assert_eq!(nfa.test(""), Err(AutomatonError::NonDeterministic));
    }

    #[test]
    fn test_to_dfa_borrows_deterministic_input() {
        let dfa = ends_in_b();
        match dfa.to_dfa() {
            Cow::Borrowed(result) => assert_eq!(result, &dfa),
            Cow::Owned(_) => panic!("Expected the deterministic automaton to be returned as is"),
        }
        assert!(matches!(dfa.to_dfa_with_limit(1), Ok(Cow::Borrowed(_))));
    }

    #[test]
    fn test_json_save_and_load() {
        let dfa = ends_in_b();
        let path = std::env::temp_dir().join("nfa2dfa_automaton_test.json");

        dfa.save_json(&path).unwrap();
        let loaded = load_automaton(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, dfa);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_automaton("does/not/exist.json").is_err());
    }
}
