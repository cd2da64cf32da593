mod integration_tests_helper {

    use nfa2dfa::{read_automaton_file, Automaton, State};
    use std::collections::HashSet;
    use std::path::PathBuf;

    pub fn load(name: &str) -> Automaton {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("test_data");
        path.push(name);

        let automaton = read_automaton_file(&path);

        // assert that parsing the file was successful
        assert!(automaton.is_ok(), "{:?}", automaton);

        automaton.unwrap()
    }

    /// Nondeterministic acceptance: explores every (state, position) configuration, following
    /// epsilon transitions without consuming input.
    pub fn simulate(nfa: &Automaton, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        let mut seen: HashSet<(State, usize)> = HashSet::new();
        let mut stack = vec![(nfa.get_initial_state().clone(), 0)];

        while let Some((state, pos)) = stack.pop() {
            if !seen.insert((state.clone(), pos)) {
                continue;
            }
            if pos == chars.len() && nfa.is_final(&state) {
                return true;
            }
            for transition in nfa.get_transitions_from(&state) {
                match transition.get_symbol() {
                    None => stack.push((transition.get_right().clone(), pos)),
                    Some(symbol) if pos < chars.len() && symbol.get_value() == chars[pos] => {
                        stack.push((transition.get_right().clone(), pos + 1))
                    }
                    _ => {}
                }
            }
        }
        false
    }

    /// All words up to `max_len` over the automaton's alphabet plus one foreign character
    pub fn words(automaton: &Automaton, max_len: usize) -> Vec<String> {
        let mut letters: Vec<char> = automaton
            .get_alphabet()
            .iter()
            .map(|symbol| symbol.get_value())
            .collect();
        letters.push('#');

        let mut result = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for word in &frontier {
                for letter in &letters {
                    let mut longer = word.clone();
                    longer.push(*letter);
                    next.push(longer);
                }
            }
            result.extend(next.iter().cloned());
            frontier = next;
        }
        result
    }
}

mod integration_tests {
    use crate::integration_tests_helper::{load, simulate, words};

    use nfa2dfa::{construct_dfa, AutomatonError, State};

    const SAMPLES: [&str; 5] = [
        "ambiguous_a.txt",
        "epsilon.txt",
        "even_as.txt",
        "third_from_end.txt",
        "epsilon_cycles.txt",
    ];

    #[test]
    fn test_language_equivalence() {
        for sample in SAMPLES {
            let nfa = load(sample);
            let dfa = nfa.to_dfa();

            assert!(dfa.is_deterministic(), "{} did not become deterministic", sample);

            for word in words(&nfa, 5) {
                assert_eq!(
                    dfa.test(&word),
                    Ok(simulate(&nfa, &word)),
                    "{} disagrees on {:?}",
                    sample,
                    word
                );
            }
        }
    }

    #[test]
    fn test_determinization_is_idempotent() {
        for sample in SAMPLES {
            let nfa = load(sample);
            let dfa = nfa.to_dfa().into_owned();
            let again = dfa.to_dfa();

            assert_eq!(again.as_ref(), &dfa);
            for word in words(&nfa, 4) {
                assert_eq!(again.test(&word), dfa.test(&word));
            }
        }
    }

    #[test]
    fn test_state_count_is_bounded() {
        for sample in SAMPLES {
            let nfa = load(sample);
            let dfa = construct_dfa(&nfa);
            assert!(dfa.get_states().len() <= 1usize << nfa.get_states().len());
        }
    }

    #[test]
    fn test_ambiguous_a() {
        let nfa = load("ambiguous_a.txt");
        assert!(!nfa.is_deterministic());
        assert_eq!(nfa.test("a"), Err(AutomatonError::NonDeterministic));

        let dfa = nfa.to_dfa();
        assert_eq!(dfa.get_states().len(), 2);
        assert_eq!(
            dfa.next(&State::new("{q0}"), 'a'.into()),
            Some(&State::new("{q0,q1}"))
        );
        for (word, expected) in [("a", true), ("aa", true), ("aaa", true), ("", false), ("b", false)] {
            assert_eq!(dfa.test(word), Ok(expected), "{:?}", word);
        }
    }

    #[test]
    fn test_epsilon_start() {
        let dfa = load("epsilon.txt").to_dfa().into_owned();
        assert_eq!(dfa.get_initial_state(), &State::new("{q0,q1}"));
        assert_eq!(dfa.test("a"), Ok(true));
        assert_eq!(dfa.test(""), Ok(false));
    }

    #[test]
    fn test_deterministic_input_is_unchanged() {
        let dfa = load("even_as.txt");
        assert!(dfa.is_deterministic());

        let converted = dfa.to_dfa();
        assert_eq!(converted.as_ref(), &dfa);
        for word in words(&dfa, 5) {
            assert_eq!(converted.test(&word), dfa.test(&word));
        }
    }

    #[test]
    fn test_state_limit() {
        let nfa = load("third_from_end.txt");
        assert_eq!(
            nfa.to_dfa_with_limit(7).unwrap_err(),
            AutomatonError::StateLimitExceeded(7)
        );
        assert_eq!(nfa.to_dfa_with_limit(8).unwrap().get_states().len(), 8);
    }

    #[test]
    fn test_dot_has_every_transition() {
        for sample in SAMPLES {
            let nfa = load(sample);
            let dfa = nfa.to_dfa();
            for automaton in [&nfa, dfa.as_ref()] {
                let dot = automaton.to_dot();
                assert_eq!(
                    dot.matches(" -> ").count(),
                    automaton.get_transitions().len() + 1
                );
                assert_eq!(
                    dot.matches("shape = doublecircle").count(),
                    automaton.get_final_states().len()
                );
            }
        }
    }
}
