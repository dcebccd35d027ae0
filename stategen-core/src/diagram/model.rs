//! Semantic model for parsed diagrams

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Node shape in the diagram notation
///
/// Shape carries semantic weight: a circle node defaults to a final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeShape {
    Rectangle,
    Rounded,
    Circle,
    Diamond,
    Hexagon,
    Stadium,
}

impl NodeShape {
    /// Parse a shape name from a styling directive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rect" | "rectangle" => Some(Self::Rectangle),
            "rounded" => Some(Self::Rounded),
            "circle" | "circ" => Some(Self::Circle),
            "diamond" | "decision" => Some(Self::Diamond),
            "hexagon" | "hex" => Some(Self::Hexagon),
            "stadium" => Some(Self::Stadium),
            _ => None,
        }
    }
}

/// How a transition is triggered, derived from its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    UserInput,
    SystemAction,
    Conditional,
    Error,
    Timeout,
    External,
}

/// Machine category derived from diagram class annotations
///
/// Drives default context fields, actor names, and validation heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineCategory {
    Info,
    User,
    Agent,
    Account,
    Core,
}

impl MachineCategory {
    pub const ALL: [MachineCategory; 5] =
        [Self::Info, Self::User, Self::Agent, Self::Account, Self::Core];

    /// Derive a category from a class tag, matching on substrings
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lower = tag.to_lowercase();
        if lower.contains("info") {
            Some(Self::Info)
        } else if lower.contains("agent") {
            Some(Self::Agent)
        } else if lower.contains("account") {
            Some(Self::Account)
        } else if lower.contains("core") {
            Some(Self::Core)
        } else if lower.contains("user") {
            Some(Self::User)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::User => "user",
            Self::Agent => "agent",
            Self::Account => "account",
            Self::Core => "core",
        }
    }

    /// Output subdirectory for generated artifacts of this category
    pub fn subdirectory(&self) -> &'static str {
        match self {
            Self::Info => "information",
            Self::User | Self::Account => "user-services",
            Self::Agent => "agent",
            Self::Core => "core",
        }
    }
}

impl Default for MachineCategory {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for MachineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A labeled vertex in the diagram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Identifier token
    pub id: String,

    /// Display text
    pub label: String,

    pub shape: NodeShape,

    /// Ordered class tags assigned via `class` statements or directives
    pub css_classes: Vec<String>,

    pub is_initial: bool,
    pub is_final: bool,

    /// Source line, for diagnostics
    pub line: usize,
}

impl Node {
    pub fn new(id: impl Into<String>, line: usize) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            shape: NodeShape::Rectangle,
            css_classes: Vec::new(),
            is_initial: false,
            is_final: false,
            line,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }
}

/// A labeled directed connection between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,

    /// Raw annotation text, including any guard/action sub-patterns
    pub label: String,

    pub kind: TransitionKind,

    /// Guard name embedded in the label, if any
    pub guard: Option<String>,

    /// Action name embedded in the label, if any
    pub action: Option<String>,

    /// Source line, for diagnostics
    pub line: usize,
}

/// A fully assembled machine parsed from one diagram block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMachine {
    /// Stable identifier (slug derived from the display name)
    pub id: String,

    pub display_name: String,

    pub category: MachineCategory,

    /// Declaration-ordered nodes with unique ids
    pub nodes: Vec<Node>,

    pub edges: Vec<Edge>,

    pub initial_node: String,

    pub final_nodes: BTreeSet<String>,
}

impl ParsedMachine {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Outgoing edges of a node, in declaration order
    pub fn outgoing(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.from == node_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_tag() {
        assert_eq!(MachineCategory::from_tag("user-machine"), Some(MachineCategory::User));
        assert_eq!(MachineCategory::from_tag("agentFlow"), Some(MachineCategory::Agent));
        assert_eq!(MachineCategory::from_tag("account-style"), Some(MachineCategory::Account));
        assert_eq!(MachineCategory::from_tag("infoPage"), Some(MachineCategory::Info));
        assert_eq!(MachineCategory::from_tag("core-service"), Some(MachineCategory::Core));
        assert_eq!(MachineCategory::from_tag("highlight"), None);
    }

    #[test]
    fn test_category_subdirectories() {
        assert_eq!(MachineCategory::Info.subdirectory(), "information");
        assert_eq!(MachineCategory::User.subdirectory(), "user-services");
        assert_eq!(MachineCategory::Account.subdirectory(), "user-services");
        assert_eq!(MachineCategory::Agent.subdirectory(), "agent");
        assert_eq!(MachineCategory::Core.subdirectory(), "core");
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(NodeShape::from_name("stadium"), Some(NodeShape::Stadium));
        assert_eq!(NodeShape::from_name("Circle"), Some(NodeShape::Circle));
        assert_eq!(NodeShape::from_name("blob"), None);
    }

    #[test]
    fn test_node_builder() {
        let node = Node::new("Start", 3).with_label("Session start").with_shape(NodeShape::Rounded);
        assert_eq!(node.id, "Start");
        assert_eq!(node.label, "Session start");
        assert_eq!(node.shape, NodeShape::Rounded);
        assert!(!node.is_final);
    }
}
