/* Rabin-Scott powerset construction. While simulating an NFA on some input we are always in a
 * subset of its states; there are exponentially many of those but still finitely many, so
 * enumerating the subsets reachable from the initial epsilon closure yields an equivalent DFA. */

use crate::automaton::{Automaton, AutomatonError};
use crate::fa::{State, Symbol, Transition};
use bitvec::prelude::*;
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};

/// A subset of the NFA states as a bitvec over their indices, with the hash stored alongside so
/// that lookups in the work list bookkeeping do not rehash the whole vector.
#[derive(Clone, Debug)]
struct StateSet {
    bv: BitVec<u8>,
    hash: u64,
}

impl StateSet {
    fn new(bv: BitVec<u8>) -> Self {
        let mut hasher = DefaultHasher::new();
        bv.hash(&mut hasher);
        let hash = hasher.finish();
        Self { bv, hash }
    }
}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bv == other.bv
    }
}

impl Eq for StateSet {}

/// Maps a set of NFA states to the single DFA state representing it. The member names are
/// sorted, so the result does not depend on iteration order: {q1, q0} becomes `{q0,q1}` and the
/// empty set becomes `{}`. Separators inside member names are escaped with a backslash and an
/// empty member name is written `\ε`, so distinct subsets never share a name.
pub fn canonical_state<'s>(states: impl IntoIterator<Item = &'s State>) -> State {
    let names: BTreeSet<&str> = states.into_iter().map(State::get_name).collect();
    let names: Vec<String> = names.into_iter().map(escape_member).collect();
    State::new(format!("{{{}}}", names.join(",")))
}

fn escape_member(name: &str) -> String {
    // Otherwise {""} and {} would be confused
    if name.is_empty() {
        return String::from("\\ε");
    }

    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '\\' | ',' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub struct PowersetConstruction<'a> {
    nfa: &'a Automaton,
    states: Vec<State>, // Sorted by name, the position is the bit index
    index: HashMap<State, usize>,
    epsilon_edges: Vec<Vec<usize>>,
    symbol_edges: Vec<HashMap<Symbol, Vec<usize>>>,
    accepting: BitVec<u8>,
    state_limit: Option<usize>,
}

impl<'a> PowersetConstruction<'a> {
    pub fn new(nfa: &'a Automaton) -> Self {
        // Endpoints of transitions and the initial state are indexed even if the state set
        // misses them.
        let mut all_states: BTreeSet<&State> = nfa.get_states().iter().collect();
        all_states.insert(nfa.get_initial_state());
        for transition in nfa.get_transitions() {
            all_states.insert(transition.get_left());
            all_states.insert(transition.get_right());
        }

        let states: Vec<State> = all_states.into_iter().cloned().collect();
        let index: HashMap<State, usize> = states
            .iter()
            .enumerate()
            .map(|(id, state)| (state.clone(), id))
            .collect();

        let mut epsilon_edges = vec![Vec::new(); states.len()];
        let mut symbol_edges: Vec<HashMap<Symbol, Vec<usize>>> = vec![HashMap::new(); states.len()];

        for transition in nfa.get_transitions() {
            let from = index[transition.get_left()];
            let to = index[transition.get_right()];
            match transition.get_symbol() {
                None => epsilon_edges[from].push(to),
                Some(symbol) => symbol_edges[from].entry(symbol).or_default().push(to),
            }
        }

        let mut accepting = BitVec::repeat(false, states.len());
        for state in nfa.get_final_states() {
            if let Some(&id) = index.get(state) {
                accepting.set(id, true);
            }
        }

        PowersetConstruction {
            nfa,
            states,
            index,
            epsilon_edges,
            symbol_edges,
            accepting,
            state_limit: None,
        }
    }

    /// Makes `construct` fail once more than `limit` subsets would become DFA states
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = Some(limit);
        self
    }

    /// Runs the construction without a state limit
    pub fn apply(nfa: &Automaton) -> Automaton {
        let construction = PowersetConstruction::new(nfa);
        let (states, initial, finals, transitions) = construction.enumerate(usize::MAX);
        construction.assemble(states, initial, finals, transitions)
    }

    fn empty(&self) -> BitVec<u8> {
        BitVec::repeat(false, self.states.len())
    }

    fn to_bits<'s>(&self, states: impl IntoIterator<Item = &'s State>) -> BitVec<u8> {
        let mut bits = self.empty();
        for state in states {
            if let Some(&id) = self.index.get(state) {
                bits.set(id, true);
            }
        }
        bits
    }

    fn to_states(&self, bits: &BitVec<u8>) -> BTreeSet<State> {
        bits.iter_ones().map(|id| self.states[id].clone()).collect()
    }

    fn name_of(&self, set: &StateSet) -> State {
        canonical_state(set.bv.iter_ones().map(|id| &self.states[id]))
    }

    /// Worklist traversal of the epsilon edges starting from every state in `seeds`
    fn closure(&self, seeds: &BitVec<u8>) -> StateSet {
        let mut closure = seeds.clone();
        let mut work_list: VecDeque<usize> = seeds.iter_ones().collect();

        while let Some(state) = work_list.pop_front() {
            for &target in &self.epsilon_edges[state] {
                if !closure[target] {
                    closure.set(target, true);
                    work_list.push_back(target);
                }
            }
        }

        StateSet::new(closure)
    }

    // The set of states directly reachable from any member of `set` on `symbol`, not closed
    fn delta(&self, set: &StateSet, symbol: Symbol) -> BitVec<u8> {
        let mut result = self.empty();
        for state in set.bv.iter_ones() {
            if let Some(targets) = self.symbol_edges[state].get(&symbol) {
                for &target in targets {
                    result.set(target, true);
                }
            }
        }
        result
    }

    /// All states reachable from `state` through zero or more epsilon transitions, including
    /// the state itself.
    pub fn epsilon_closure(&self, state: &State) -> BTreeSet<State> {
        self.epsilon_closure_of(&BTreeSet::from([state.clone()]))
    }

    /// Union of the epsilon closures of every member
    pub fn epsilon_closure_of(&self, states: &BTreeSet<State>) -> BTreeSet<State> {
        let closure = self.closure(&self.to_bits(states));
        let mut result = self.to_states(&closure.bv);
        // States foreign to the automaton only reach themselves
        result.extend(
            states
                .iter()
                .filter(|state| !self.index.contains_key(*state))
                .cloned(),
        );
        result
    }

    /// The states the automaton can be in after consuming `symbol`, starting anywhere in the
    /// epsilon closure of `state`. The result is itself epsilon closed.
    pub fn move_state(&self, state: &State, symbol: Symbol) -> BTreeSet<State> {
        self.move_set(&BTreeSet::from([state.clone()]), symbol)
    }

    /// Union of `move_state` over every member
    pub fn move_set(&self, states: &BTreeSet<State>, symbol: Symbol) -> BTreeSet<State> {
        let sources = self.closure(&self.to_bits(states));
        let targets = self.closure(&self.delta(&sources, symbol));
        self.to_states(&targets.bv)
    }

    /// Enumerates every subset reachable from the initial closure. Returns the completed
    /// subsets in the order they were completed, the initial subset, the accepting subsets and
    /// the DFA transitions.
    #[allow(clippy::type_complexity)]
    fn enumerate(
        &self,
        limit: usize,
    ) -> (Vec<StateSet>, StateSet, Vec<StateSet>, BTreeSet<Transition>) {
        // The initial state is always indexed by `new`
        let mut seeds = self.empty();
        if let Some(&initial) = self.index.get(self.nfa.get_initial_state()) {
            seeds.set(initial, true);
        }
        let initial_subset = self.closure(&seeds);

        let mut work_list: VecDeque<StateSet> = VecDeque::from([initial_subset.clone()]);
        let mut completed: HashSet<StateSet> = HashSet::new();
        let mut order: Vec<StateSet> = Vec::new();
        let mut transitions: BTreeSet<Transition> = BTreeSet::new();

        while let Some(current) = work_list.pop_front() {
            if completed.contains(&current) {
                continue;
            }
            if order.len() >= limit {
                break;
            }

            let from = self.name_of(&current);

            for &symbol in self.nfa.get_alphabet() {
                // `current` is epsilon closed, so closing the delta is the full move
                let ends = self.closure(&self.delta(&current, symbol));

                transitions.insert(Transition::new_symbol(
                    from.clone(),
                    self.name_of(&ends),
                    symbol,
                ));

                if !completed.contains(&ends) {
                    work_list.push_back(ends);
                }
            }

            trace!("Completed subset {}", from);
            completed.insert(current.clone());
            order.push(current);
        }

        // Pending subsets that were never completed mean the limit cut the enumeration short
        let truncated = work_list.iter().any(|set| !completed.contains(set));
        if truncated {
            debug!("Powerset construction stopped after {} subsets", order.len());
        }

        let finals = order
            .iter()
            .filter(|set| set.bv.iter_ones().any(|id| self.accepting[id]))
            .cloned()
            .collect();

        (order, initial_subset, finals, transitions)
    }

    fn assemble(
        &self,
        subsets: Vec<StateSet>,
        initial: StateSet,
        finals: Vec<StateSet>,
        transitions: BTreeSet<Transition>,
    ) -> Automaton {
        let states: BTreeSet<State> = subsets.iter().map(|set| self.name_of(set)).collect();
        let final_states: BTreeSet<State> = finals.iter().map(|set| self.name_of(set)).collect();

        debug!(
            "Powerset construction turned {} NFA states into {} DFA states ({} final, {} transitions)",
            self.states.len(),
            states.len(),
            final_states.len(),
            transitions.len()
        );

        Automaton::new(
            states,
            self.nfa.get_alphabet().clone(),
            self.name_of(&initial),
            final_states,
            transitions,
        )
    }

    /// Applies the construction, honoring the state limit if one was set
    pub fn construct(&self) -> Result<Automaton, AutomatonError> {
        let limit = self.state_limit.unwrap_or(usize::MAX);
        let (subsets, initial, finals, transitions) = self.enumerate(limit);

        // Every transition target must be a completed subset, otherwise the limit was hit
        let names: BTreeSet<State> = subsets.iter().map(|set| self.name_of(set)).collect();
        if subsets.is_empty() || transitions.iter().any(|t| !names.contains(t.get_right())) {
            return Err(AutomatonError::StateLimitExceeded(limit));
        }

        Ok(self.assemble(subsets, initial, finals, transitions))
    }
}

/// Apply the powerset construction on an automaton to build an equivalent DFA
pub fn construct_dfa(nfa: &Automaton) -> Automaton {
    PowersetConstruction::apply(nfa)
}
