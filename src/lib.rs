//! # nfa2dfa
//!
//! Finite automata and their conversion from nondeterministic to deterministic form using the
//! Rabin-Scott powerset construction.
//!
//! This library provides functionality to:
//! - Model automata as the five-tuple of states, alphabet, initial state, final states and
//!   transitions
//! - Parse automata from a line oriented `left -> right : symbol` description
//! - Compute epsilon closures and symbol moves over sets of states
//! - Convert NFAs, including ones with epsilon transitions, to equivalent DFAs
//! - Render automata as Graphviz dot code or show them in an interactive window

pub mod automaton;
pub mod builder;
pub mod config;
pub mod dot;
pub mod fa;
pub mod parser;
pub mod powerset;
pub mod visualizer;

// Re-export commonly used items for convenience
pub use automaton::{load_automaton, Automaton, AutomatonError};
pub use builder::AutomatonBuilder;
pub use fa::{Label, State, Symbol, Transition};
pub use parser::{parse_automaton, read_automaton_file, ParseError};
pub use powerset::{canonical_state, construct_dfa, PowersetConstruction};
pub use visualizer::visualize;
