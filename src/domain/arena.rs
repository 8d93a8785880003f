use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::parameter::{names_equal, ParameterDefinition};

/// Handle of a node in the [`CommandModel`] arena.
pub type NodeId = Index;

/// Node of the command model: the implicit root, a branch or a leaf command.
#[derive(Debug)]
pub struct CommandNode {
    /// Declared name, empty for the implicit root
    pub name: String,
    pub description: Option<String>,
    /// Declaring branch, None for the root
    pub parent: Option<NodeId>,
    /// Children in declaration order
    pub children: Vec<NodeId>,
    /// Leaf commands are executable; branches only group children
    pub is_leaf: bool,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterDefinition>,
    /// Child invoked when none is named on the command line
    pub default_child: Option<NodeId>,
    /// Key handed to the type resolver to create this node's settings
    pub settings: Option<String>,
}

impl CommandNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_branch(&self) -> bool {
        !self.is_leaf
    }

    /// Argument parameters in position order.
    pub fn arguments(&self) -> impl Iterator<Item = (usize, &ParameterDefinition)> {
        self.parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_argument())
    }

    pub fn options(&self) -> impl Iterator<Item = (usize, &ParameterDefinition)> {
        self.parameters.iter().enumerate().filter(|(_, p)| p.is_option())
    }

    /// Name used in messages: `<root>` for the implicit root.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "<root>"
        } else {
            &self.name
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Immutable tree of branches and commands stored in a single arena.
///
/// Built once by [`crate::domain::CommandModelBuilder`]; safe to share
/// between concurrent parses afterwards.
#[derive(Debug)]
pub struct CommandModel {
    arena: Arena<CommandNode>,
    root: NodeId,
}

impl CommandModel {
    /// Model holding only the implicit root.
    pub(crate) fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(CommandNode {
            name: String::new(),
            description: None,
            parent: None,
            children: Vec::new(),
            is_leaf: false,
            parameters: Vec::new(),
            default_child: None,
            settings: None,
        });
        Self { arena, root }
    }

    #[instrument(level = "trace", skip(self, node), fields(name = %node.name))]
    pub(crate) fn insert_node(&mut self, mut node: CommandNode, parent: NodeId) -> NodeId {
        node.parent = Some(parent);
        let node_idx = self.arena.insert(node);
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        node_idx
    }

    pub(crate) fn get_node_mut(&mut self, idx: NodeId) -> Option<&mut CommandNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get_node(&self, idx: NodeId) -> Option<&CommandNode> {
        self.arena.get(idx)
    }

    /// Node by handle.
    ///
    /// # Panics
    /// If `idx` does not belong to this model. Handles are only minted by
    /// the model and nodes are never removed.
    pub fn node(&self, idx: NodeId) -> &CommandNode {
        &self.arena[idx]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    /// Declared child of `parent` named `name`, first match wins.
    pub fn find_child(&self, parent: NodeId, name: &str, case_sensitive: bool) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| names_equal(&self.node(child).name, name, case_sensitive))
    }

    /// `node` followed by its ancestors up to the root.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            model: self,
            next: Some(node),
        }
    }

    /// Names from the root down to `node`, root excluded.
    pub fn path(&self, node: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .ancestors(node)
            .map(|idx| self.node(idx))
            .filter(|n| !n.is_root())
            .map(|n| n.name.as_str())
            .collect();
        names.reverse();
        names
    }

    /// Resolve a node by its path of names from the root.
    pub fn lookup(&self, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root, |current, name| self.find_child(current, name, true))
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, node_idx: NodeId) -> usize {
        match self.get_node(node_idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Paths of all executable commands, space separated.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_commands(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf)
            .map(|(idx, _)| self.path(idx).join(" "))
            .collect()
    }
}

pub struct Ancestors<'a> {
    model: &'a CommandModel,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.model.get_node(current).and_then(|n| n.parent);
        Some(current)
    }
}

/// Pre-order traversal in declaration order.
pub struct TreeIterator<'a> {
    model: &'a CommandModel,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(model: &'a CommandModel) -> Self {
        Self {
            model,
            stack: vec![model.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a CommandNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.model.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
