use serde::{Deserialize, Serialize};
use std::fmt;

/// A single input character labelling a non-epsilon transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(char);

impl Symbol {
    pub fn new(value: char) -> Self {
        Symbol(value)
    }

    pub fn get_value(&self) -> char {
        self.0
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Symbol(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A state of an automaton. Two states with the same name are the same state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        State(name.into())
    }

    pub fn get_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Epsilon,
    Symbol(Symbol),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// A directed edge between two states, either labelled with a symbol or an epsilon move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    left: State,
    right: State,
    label: Label,
}

impl Transition {
    pub fn new(left: State, right: State, label: Label) -> Self {
        Transition { left, right, label }
    }

    pub fn new_epsilon(left: State, right: State) -> Self {
        Transition::new(left, right, Label::Epsilon)
    }

    pub fn new_symbol(left: State, right: State, symbol: Symbol) -> Self {
        Transition::new(left, right, Label::Symbol(symbol))
    }

    pub fn get_left(&self) -> &State {
        &self.left
    }

    pub fn get_right(&self) -> &State {
        &self.right
    }

    pub fn get_label(&self) -> Label {
        self.label
    }

    /// Returns the symbol of the transition, or None for an epsilon transition
    pub fn get_symbol(&self) -> Option<Symbol> {
        match self.label {
            Label::Epsilon => None,
            Label::Symbol(symbol) => Some(symbol),
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.label == Label::Epsilon
    }
}
