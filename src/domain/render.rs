//! Text rendering of the command model for debug output.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{CommandModel, NodeId};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for CommandModel {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn label(model: &CommandModel, idx: NodeId) -> String {
            let node = model.node(idx);
            let mut label = node.display_name().to_string();
            for parameter in &node.parameters {
                label.push(' ');
                label.push_str(&parameter_label(parameter));
            }
            if node.is_branch() {
                if let Some(default) = node.default_child {
                    label.push_str(&format!(" (default: {})", model.node(default).name));
                }
            }
            label
        }

        fn build_tree(model: &CommandModel, node_idx: NodeId, parent_tree: &mut Tree<String>) {
            for &child_idx in &model.node(node_idx).children {
                let mut child_tree = Tree::new(label(model, child_idx));
                build_tree(model, child_idx, &mut child_tree);
                parent_tree.push(child_tree);
            }
        }

        let mut tree = Tree::new(label(self, self.root()));
        build_tree(self, self.root(), &mut tree);
        tree
    }
}

fn parameter_label(parameter: &crate::domain::ParameterDefinition) -> String {
    use crate::domain::ParameterKind;

    match &parameter.kind {
        ParameterKind::Argument { value_name, .. } if parameter.required => format!("<{value_name}>"),
        ParameterKind::Argument { value_name, .. } => format!("[{value_name}]"),
        ParameterKind::Option {
            short,
            long,
            value_name,
        } => {
            let name = match (long, short) {
                (Some(long), _) => format!("--{long}"),
                (None, Some(short)) => format!("-{short}"),
                (None, None) => parameter.property.clone(),
            };
            match value_name {
                Some(value) => format!("[{name} <{value}>]"),
                None => format!("[{name}]"),
            }
        }
    }
}
