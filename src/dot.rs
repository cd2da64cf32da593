/* Rendering of automata as Graphviz dot code. Final states are drawn as double circles and an
 * invisible ENTRY node points at the initial state. */

use crate::automaton::Automaton;
use crate::fa::State;
use color_eyre::eyre::{eyre, Result};
use log::info;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Entry,
    Circle,
    DoubleCircle,
}

#[derive(Debug, Clone)]
struct Node {
    label: String,
    shape: Shape,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_attributes(node: &Node) -> String {
    match node.shape {
        Shape::Entry => "shape = point style = invis ".to_string(),
        Shape::Circle => format!("label = \"{}\" shape = circle ", escape(&node.label)),
        Shape::DoubleCircle => format!("label = \"{}\" shape = doublecircle ", escape(&node.label)),
    }
}

// The entry edge has an empty label and no attributes
fn edge_attributes(label: &str) -> String {
    if label.is_empty() {
        String::new()
    } else {
        format!("label = \"{}\" ", escape(label))
    }
}

// Referenced but undeclared states are still drawn
fn node_of<'a>(
    graph: &mut DiGraph<Node, String>,
    node_map: &mut HashMap<&'a State, NodeIndex>,
    state: &'a State,
) -> NodeIndex {
    if let Some(node) = node_map.get(state) {
        return *node;
    }
    let node = graph.add_node(Node {
        label: state.get_name().to_string(),
        shape: Shape::Circle,
    });
    node_map.insert(state, node);
    node
}

fn build_graph(automaton: &Automaton) -> DiGraph<Node, String> {
    let mut graph = DiGraph::new();
    let mut node_map: HashMap<&State, NodeIndex> = HashMap::new();

    let entry = graph.add_node(Node {
        label: "ENTRY".to_string(),
        shape: Shape::Entry,
    });

    // Add nodes

    for state in automaton.get_states() {
        let shape = if automaton.is_final(state) {
            Shape::DoubleCircle
        } else {
            Shape::Circle
        };
        let node = graph.add_node(Node {
            label: state.get_name().to_string(),
            shape,
        });
        node_map.insert(state, node);
    }

    let initial = node_of(&mut graph, &mut node_map, automaton.get_initial_state());
    graph.add_edge(entry, initial, String::new());

    // Add edges, one per transition

    for transition in automaton.get_transitions() {
        let from = node_of(&mut graph, &mut node_map, transition.get_left());
        let to = node_of(&mut graph, &mut node_map, transition.get_right());
        graph.add_edge(from, to, transition.get_label().to_string());
    }

    graph
}

/// Converts an automaton to Graphviz dot code
pub fn to_dot(automaton: &Automaton) -> String {
    let graph = build_graph(automaton);

    format!(
        "digraph automaton {{\n{INDENT}rankdir=LR;\n{}}}\n",
        Dot::with_attr_getters(
            &graph,
            &[
                Config::NodeNoLabel,
                Config::EdgeNoLabel,
                Config::GraphContentOnly,
            ],
            &|_, edge| edge_attributes(edge.weight()),
            &|_, (_, node)| node_attributes(node),
        )
    )
}

/// Appends `.<extension>` to the whole path, so `input.txt.nfa` becomes `input.txt.nfa.dot`
pub fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut file_name: OsString = base.as_os_str().to_owned();
    file_name.push(".");
    file_name.push(extension);
    PathBuf::from(file_name)
}

/// Writes the dot code of the automaton to `<base>.dot`. If `render` is set, Graphviz is
/// invoked to also produce `<base>.jpg`.
pub fn save_dot(automaton: &Automaton, base: &Path, render: bool) -> Result<PathBuf> {
    let dot_filename = with_extension(base, "dot");
    let mut dot_file = File::create(&dot_filename)?;

    dot_file.write_all(to_dot(automaton).as_bytes())?;
    info!("Wrote {}", dot_filename.display());

    if render {
        let jpg_filename = with_extension(base, "jpg");
        let output = Command::new("dot")
            .arg("-Tjpg")
            .arg(&dot_filename)
            .arg("-o")
            .arg(&jpg_filename)
            .output()
            .map_err(|error| eyre!("Error: Failed to execute Graphviz: {}", error))?;

        if !output.status.success() {
            return Err(eyre!(
                "Error: Graphviz failed to render {}: {}",
                dot_filename.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        println!("Automaton visualization saved as {}", jpg_filename.display());
    }

    Ok(dot_filename)
}
