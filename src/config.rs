use crate::dot::with_extension;
use clap::{Arg, ArgAction, ArgMatches, Command};
use color_eyre::eyre::Result;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizeTarget {
    Nfa,
    Dfa,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidVisualizeTarget(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidVisualizeTarget(target) => write!(
                f,
                "Error: visualize should be one of NFA | DFA, found {}",
                target
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the command line can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub render: bool,
    pub save_json: bool,
    pub max_states: Option<usize>,
    pub words: Vec<String>,
    pub visualize: Option<VisualizeTarget>,
}

pub fn build_cli() -> Command {
    Command::new("nfa2dfa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts a nondeterministic finite automaton into a deterministic one using the powerset construction")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("File describing the automaton, one `left -> right : symbol` transition per line. [q] marks the initial state, (q) marks final states")
                .default_value("input.txt")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("render")
                .short('r')
                .long("render")
                .help("Render both automata as jpg images using Graphviz")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-json")
                .short('j')
                .long("save-json")
                .help("Save both automata as json next to the input file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-states")
                .short('m')
                .long("max-states")
                .value_name("N")
                .help("Abort the powerset construction once the DFA would have more than N states")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("test")
                .short('t')
                .long("test")
                .value_name("WORD")
                .help("Report whether the DFA accepts the word. May be given several times")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("visualize")
                .short('v')
                .long("visualize")
                .value_name("NFA, DFA")
                .help("Open an interactive window showing one of the automata")
                .value_parser(clap::value_parser!(String))
                .num_args(1),
        )
}

impl Config {
    pub fn from_matches(args: &ArgMatches) -> Result<Self, ConfigError> {
        let input = args
            .get_one::<PathBuf>("input")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("input.txt"));

        let visualize = match args.get_one::<String>("visualize") {
            None => None,
            Some(target) if target.eq_ignore_ascii_case("nfa") => Some(VisualizeTarget::Nfa),
            Some(target) if target.eq_ignore_ascii_case("dfa") => Some(VisualizeTarget::Dfa),
            Some(target) => return Err(ConfigError::InvalidVisualizeTarget(target.clone())),
        };

        let words = args
            .get_many::<String>("test")
            .map(|words| words.cloned().collect())
            .unwrap_or_default();

        Ok(Config {
            input,
            render: args.get_flag("render"),
            save_json: args.get_flag("save-json"),
            max_states: args.get_one::<usize>("max-states").copied(),
            words,
            visualize,
        })
    }

    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = build_cli().try_get_matches_from(args)?;
        Ok(Config::from_matches(&matches)?)
    }

    fn output_base(&self, kind: &str) -> PathBuf {
        with_extension(&self.input, kind)
    }

    /// `<input>.nfa`, the extension is appended by the writers
    pub fn nfa_base(&self) -> PathBuf {
        self.output_base("nfa")
    }

    /// `<input>.dfa`, the extension is appended by the writers
    pub fn dfa_base(&self) -> PathBuf {
        self.output_base("dfa")
    }
}
