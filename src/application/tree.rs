//! Result of a single parse: the matched command path and leftovers.

use std::collections::BTreeMap;

use crate::domain::{CommandModel, NodeId, ParameterDefinition};

/// Raw value captured for a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedValue {
    /// Index into the command node's parameters
    pub parameter: usize,
    pub value: String,
    /// Offset of the value in the command line
    pub position: usize,
}

/// One step of the matched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTreeNode {
    pub command: NodeId,
    /// Index of the parent step in [`CommandTree::nodes`]
    pub parent: Option<usize>,
    /// Captured values in arrival order
    pub mapped: Vec<MappedValue>,
}

impl CommandTreeNode {
    pub(crate) fn new(command: NodeId, parent: Option<usize>) -> Self {
        Self {
            command,
            parent,
            mapped: Vec::new(),
        }
    }

    /// Raw values captured for the parameter at `parameter`.
    pub fn values_for(&self, parameter: usize) -> impl Iterator<Item = &str> {
        self.mapped
            .iter()
            .filter(move |m| m.parameter == parameter)
            .map(|m| m.value.as_str())
    }

    pub fn has_value(&self, parameter: usize) -> bool {
        self.mapped.iter().any(|m| m.parameter == parameter)
    }
}

/// The single path from the root to the matched command.
///
/// `nodes[0]` is the root step; every following step is a child of the one
/// before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTree {
    nodes: Vec<CommandTreeNode>,
}

impl CommandTree {
    pub(crate) fn new(root: NodeId) -> Self {
        Self {
            nodes: vec![CommandTreeNode::new(root, None)],
        }
    }

    /// Append a step below the current deepest one and return its index.
    pub(crate) fn descend(&mut self, command: NodeId) -> usize {
        let parent = self.nodes.len() - 1;
        self.nodes.push(CommandTreeNode::new(command, Some(parent)));
        parent + 1
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut CommandTreeNode> {
        self.nodes.get_mut(index)
    }

    pub fn root(&self) -> &CommandTreeNode {
        &self.nodes[0]
    }

    /// Deepest matched step.
    pub fn leaf(&self) -> &CommandTreeNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&CommandTreeNode> {
        self.nodes.get(index)
    }

    /// Step matching `command`, if it lies on the path.
    pub fn find(&self, command: NodeId) -> Option<&CommandTreeNode> {
        self.nodes.iter().find(|n| n.command == command)
    }

    /// Steps from root to leaf.
    pub fn iter(&self) -> std::slice::Iter<'_, CommandTreeNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Command names along the path, root excluded.
    pub fn path<'m>(&self, model: &'m CommandModel) -> Vec<&'m str> {
        model.path(self.leaf().command)
    }

    /// Parameter definitions and raw values per step, for diagnostics.
    pub fn captured<'m>(
        &'m self,
        model: &'m CommandModel,
    ) -> impl Iterator<Item = (&'m ParameterDefinition, &'m str)> + 'm {
        self.nodes.iter().flat_map(move |n| {
            let command = model.node(n.command);
            n.mapped
                .iter()
                .map(move |m| (&command.parameters[m.parameter], m.value.as_str()))
        })
    }
}

impl<'a> IntoIterator for &'a CommandTree {
    type Item = &'a CommandTreeNode;
    type IntoIter = std::slice::Iter<'a, CommandTreeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Input not consumed by the command path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingArguments {
    /// Original strings in order
    pub raw: Vec<String>,
    /// `--key value` pairs found after `--`, keys verbatim
    pub parsed: BTreeMap<String, Vec<String>>,
}

impl RemainingArguments {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Every value given for `key`, in arrival order.
    pub fn values(&self, key: &str) -> &[String] {
        self.parsed.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub tree: CommandTree,
    pub remaining: RemainingArguments,
}
