//! Small accessors over `kdl` nodes.

use kdl::KdlNode;

/// First positional argument of a node as a string, if it is one
pub fn get_first_arg_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|entry| entry.name().is_none())
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
}

/// Whether the node has a positional argument of any type
pub fn has_first_arg(node: &KdlNode) -> bool {
    node.entries().iter().any(|entry| entry.name().is_none())
}
