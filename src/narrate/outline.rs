use super::rule_to_prose;
use crate::analyzer::{ExecutionModel, ExecutionNode, NodeId};
use itertools::Itertools;

const INDENT: &str = "    ";

/// Formats an execution model into an indented, human-readable outline.
pub struct OutlineFormatter;

impl OutlineFormatter {
    pub fn format(model: &ExecutionModel) -> String {
        let mut out = String::new();
        let mut stack: Vec<NodeId> = model.execution_tree().iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = model.node(id) else {
                continue;
            };
            Self::format_node(node, &mut out);
            stack.extend(node.children.iter().rev());
        }
        Self::format_registry(model, &mut out);
        out
    }

    fn format_node(node: &ExecutionNode, out: &mut String) {
        let pad = INDENT.repeat(node.depth);
        let body = format!("{}{}", pad, INDENT);

        out.push_str(&format!("{}{}\n", pad, Self::heading(node)));
        if !node.context.is_empty() {
            out.push_str(&format!("{}{}\n", body, node.context));
        }
        for detail in &node.details {
            out.push_str(&format!("{}- {}\n", body, detail));
        }
        if let Some(projection) = &node.projection {
            out.push_str(&format!("{}| {} |\n", body, projection.headers.join(" | ")));
            for row in &projection.rows {
                let cells = row.iter().map(|cell| cell.text.as_str()).join(" | ");
                out.push_str(&format!("{}| {} |\n", body, cells));
                for cell in row {
                    for rule in cell.rules.iter().flatten() {
                        out.push_str(&format!("{}{}  {}\n", body, INDENT, rule_to_prose(rule)));
                    }
                }
            }
        }
        for rule in node.rules.iter().flatten() {
            out.push_str(&format!("{}{}\n", body, rule_to_prose(rule)));
        }
    }

    /// `[Kind] label`, marked when the step is disabled.
    fn heading(node: &ExecutionNode) -> String {
        let mut heading = format!("[{}] {}", node.kind, node.flow_label);
        if node.flow_label != node.name {
            heading.push_str(&format!(" ({})", node.name));
        }
        if !node.active {
            heading.push_str(" [inactive]");
        }
        heading
    }

    fn format_registry(model: &ExecutionModel, out: &mut String) {
        let variables: Vec<_> = model.variables().collect();
        if !variables.is_empty() {
            out.push_str("\nVariables:\n");
            for entry in variables {
                let role = if entry.is_iterator { " (iterator)" } else { "" };
                out.push_str(&format!("{}{}{} = {}\n", INDENT, entry.name, role, entry.value));
                if !entry.used_by.is_empty() {
                    out.push_str(&format!(
                        "{}{}used by: {}\n",
                        INDENT,
                        INDENT,
                        entry.used_by.iter().join(", ")
                    ));
                }
            }
        }
        if !model.table_set().is_empty() {
            out.push_str(&format!("\nTables: {}\n", model.table_set().iter().join(", ")));
        }
        if !model.step_output_set().is_empty() {
            out.push_str(&format!(
                "\nStep outputs: {}\n",
                model.step_output_set().iter().join(", ")
            ));
        }
    }
}
