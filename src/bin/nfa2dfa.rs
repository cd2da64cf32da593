use color_eyre::eyre::Result;
use log::{debug, info};
use nfa2dfa::config::{build_cli, Config, VisualizeTarget};
use nfa2dfa::dot::{save_dot, with_extension};
use nfa2dfa::{read_automaton_file, visualize};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = build_cli().get_matches();
    let config = Config::from_matches(&args)?;
    debug!("Running with {:?}", config);

    let nfa = read_automaton_file(&config.input)?;

    let dfa = match config.max_states {
        Some(limit) => nfa.to_dfa_with_limit(limit)?,
        None => nfa.to_dfa(),
    };

    if nfa.is_deterministic() {
        info!("The input automaton is already deterministic");
    }

    println!("Dot-code for nondeterministic automaton:");
    println!("{}", nfa.to_dot());

    println!("Dot-code for deterministic automaton:");
    println!("{}", dfa.to_dot());

    let nfa_base = config.nfa_base();
    let dfa_base = config.dfa_base();

    let nfa_filename = save_dot(&nfa, &nfa_base, config.render)?;
    let dfa_filename = save_dot(&dfa, &dfa_base, config.render)?;

    println!(
        "Dot files printed to '{}' and '{}'.",
        nfa_filename.display(),
        dfa_filename.display()
    );

    if config.save_json {
        let nfa_json = with_extension(&nfa_base, "json");
        let dfa_json = with_extension(&dfa_base, "json");
        nfa.save_json(&nfa_json)?;
        dfa.save_json(&dfa_json)?;
        println!(
            "Json files saved to '{}' and '{}'.",
            nfa_json.display(),
            dfa_json.display()
        );
    }

    for word in &config.words {
        let verdict = if dfa.test(word)? {
            "accepted"
        } else {
            "rejected"
        };
        println!("{:?} is {}", word, verdict);
    }

    match config.visualize {
        None => {}
        Some(VisualizeTarget::Nfa) => visualize(&nfa)?,
        Some(VisualizeTarget::Dfa) => visualize(&dfa)?,
    }

    Ok(())
}
