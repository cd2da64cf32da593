use std::collections::HashMap;

use crate::automaton::Automaton;
use crate::fa::State;
use color_eyre::eyre::{eyre, Result};
use eframe::{run_native, App, CreationContext, NativeOptions};
use egui::Color32;
use egui_graphs::{
    DefaultGraphView, Graph, SettingsInteraction, SettingsNavigation, SettingsStyle,
};
use petgraph::{graph::NodeIndex, prelude::StableGraph};

struct Visualizer {
    graph: Graph,
}

impl Visualizer {
    fn new(_: &CreationContext<'_>, graph: Graph) -> Self {
        Visualizer { graph }
    }
}

impl App for Visualizer {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let navigation_settings = &SettingsNavigation::new()
                .with_zoom_and_pan_enabled(true)
                .with_fit_to_screen_enabled(true);
            let interactive_settings = &SettingsInteraction::new()
                .with_dragging_enabled(true)
                .with_node_clicking_enabled(true)
                .with_node_selection_enabled(true)
                .with_node_selection_multi_enabled(true)
                .with_edge_clicking_enabled(true)
                .with_edge_selection_enabled(true)
                .with_edge_selection_multi_enabled(true);
            let style_settings = &SettingsStyle::default().with_labels_always(true);
            ui.add(
                &mut DefaultGraphView::new(&mut self.graph)
                    .with_styles(style_settings)
                    .with_interactions(interactive_settings)
                    .with_navigations(navigation_settings),
            );
        });
    }
}

/// Builds the egui graph for an automaton. Transitions between the same pair of states share one
/// edge whose label lists all of their symbols.
fn generate_graph(automaton: &Automaton) -> Graph {
    let mut stable_graph = StableGraph::new();

    let initial_node_color = Color32::from_rgb(20, 67, 130);
    let final_node_color = Color32::from_rgb(20, 130, 90);

    let mut node_map: HashMap<&State, NodeIndex> = HashMap::new();
    let mut edge_labels: HashMap<(NodeIndex, NodeIndex), Vec<String>> = HashMap::new();

    // Add all nodes

    for state in automaton.get_states() {
        node_map.insert(state, stable_graph.add_node(()));
    }

    // Group the transition labels by their endpoints

    for transition in automaton.get_transitions() {
        let (Some(&from), Some(&to)) = (
            node_map.get(transition.get_left()),
            node_map.get(transition.get_right()),
        ) else {
            continue;
        };

        edge_labels
            .entry((from, to))
            .or_default()
            .push(transition.get_label().to_string());
    }

    let mut edge_map = HashMap::new();
    for &(from, to) in edge_labels.keys() {
        edge_map.insert((from, to), stable_graph.add_edge(from, to, ()));
    }

    let mut graph = Graph::from(&stable_graph);

    for (state, node_idx) in &node_map {
        if let Some(node) = graph.node_mut(*node_idx) {
            node.set_label(state.get_name().to_string());

            if automaton.is_final(state) {
                node.set_color(final_node_color);
            }
            if *state == automaton.get_initial_state() {
                node.set_color(initial_node_color);
            }
        }
    }

    for (endpoints, labels) in edge_labels {
        let edge = edge_map
            .get(&endpoints)
            .and_then(|edge_idx| graph.edge_mut(*edge_idx));

        if let Some(edge) = edge {
            edge.set_label(labels.join(", "));
        }
    }

    graph
}

/// Visualizes the automaton in an interactive window. Blocks until the window is closed.
pub fn visualize(automaton: &Automaton) -> Result<()> {
    let graph = generate_graph(automaton);
    run_native(
        "finite automata visualizer",
        NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(Visualizer::new(cc, graph)))),
    )
    .map_err(|error| eyre!("Error: The visualizer window failed: {}", error))
}
