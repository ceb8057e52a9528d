use crate::{graph::RouteGraph, rule::Rule, types::AnyKey};
use core::fmt::Write as _;

impl RouteGraph {
    /// Render the graph in Graphviz DOT format.
    ///
    /// Every slot becomes a node and every source of a rule an edge to the
    /// rule's destination, labeled with the rule. Root rules get an edge from
    /// a shared `start` node.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph routes {\n\trankdir=LR;\n");
        if self.rules().any(Rule::is_start) {
            out.push_str("\t\"start\"[shape=circle, label=\"\"];\n");
        }
        for key in self.destinations() {
            // Writing into a `String` cannot fail.
            let _ = writeln!(out, "\t{}[shape=rectangle, label={}];", id(key), id(key));
        }
        for rule in self.rules() {
            let label = quote(rule.label());
            if rule.is_start() {
                let _ = writeln!(
                    out,
                    "\t\"start\" -> {}[label={label}];",
                    id(rule.destination())
                );
            }
            for source in rule.sources() {
                let _ = writeln!(
                    out,
                    "\t{} -> {}[label={label}];",
                    id(source),
                    id(rule.destination())
                );
            }
        }
        out.push_str("}\n");
        out
    }
}

fn id(key: &AnyKey) -> String {
    quote(&key.to_string())
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
