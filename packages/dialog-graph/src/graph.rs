//! Dialogue session: the loaded node graph and its cursor.

use std::collections::HashMap;

use crate::error::DialogError;
use crate::loader::{build_nodes, DialogSource};
use crate::node::{DialogChoice, DialogNode, NodeId};

/// A loaded dialogue and the node currently presented.
///
/// States are inactive (no nodes) and active with a cursor on a valid node.
#[derive(Debug, Default)]
pub struct DialogGraph {
    /// Nodes in load order
    nodes: Vec<DialogNode>,
    /// Node id to position in `nodes`
    id_to_index: HashMap<NodeId, usize>,
    /// Cursor, `0` when inactive
    current_id: NodeId,
    active: bool,
}

impl DialogGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a dialogue and places the cursor on its first node.
    ///
    /// Any previous session is discarded first, so on error the graph is inactive.
    pub fn start_dialogue<S: DialogSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<(), DialogError> {
        self.end_dialogue();

        let count = source
            .load_document()
            .and_then(|document| build_nodes(&document))
            .and_then(|nodes| self.install(nodes))
            .map_err(|e| {
                tracing::error!("Failed to load '{}': {}", source.describe(), e);
                e
            })?;

        tracing::debug!("Started '{}' with {} nodes", source.describe(), count);
        Ok(())
    }

    /// Starts a session from nodes built in code.
    pub fn start_with_nodes(&mut self, nodes: Vec<DialogNode>) -> Result<(), DialogError> {
        self.end_dialogue();
        let labelled = nodes
            .into_iter()
            .map(|node| (node.id.to_string(), node))
            .collect();
        self.install(labelled)?;
        Ok(())
    }

    /// Indexes and activates `nodes`, returning the node count.
    fn install(&mut self, nodes: Vec<(String, DialogNode)>) -> Result<usize, DialogError> {
        if nodes.is_empty() {
            return Err(DialogError::Empty);
        }

        let mut id_to_index = HashMap::with_capacity(nodes.len());
        for (index, (label, node)) in nodes.iter().enumerate() {
            if node.id <= 0 {
                return Err(DialogError::InvalidId {
                    id: node.id,
                    label: label.clone(),
                });
            }
            if id_to_index.insert(node.id, index).is_some() {
                return Err(DialogError::DuplicateId {
                    id: node.id,
                    label: label.clone(),
                });
            }
        }

        let nodes: Vec<DialogNode> = nodes.into_iter().map(|(_, node)| node).collect();
        for node in &nodes {
            let targets = node
                .choices
                .iter()
                .map(|c| c.next_id)
                .chain(node.next_id);
            for next_id in targets {
                if next_id != 0 && !id_to_index.contains_key(&next_id) {
                    tracing::warn!("Node {}: next id {} not found", node.id, next_id);
                }
            }
        }

        self.current_id = nodes[0].id;
        self.nodes = nodes;
        self.id_to_index = id_to_index;
        self.active = true;
        Ok(self.nodes.len())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Clears the session. Safe to call when already inactive.
    pub fn end_dialogue(&mut self) {
        self.nodes.clear();
        self.id_to_index.clear();
        self.current_id = 0;
        self.active = false;
    }

    /// Node under the cursor.
    pub fn current(&self) -> Option<&DialogNode> {
        if !self.active || self.current_id == 0 {
            return None;
        }
        self.node(self.current_id)
    }

    pub fn current_id(&self) -> NodeId {
        self.current_id
    }

    pub fn node(&self, id: NodeId) -> Option<&DialogNode> {
        self.id_to_index.get(&id).map(|&index| &self.nodes[index])
    }

    /// Loaded nodes in load order.
    pub fn nodes(&self) -> &[DialogNode] {
        &self.nodes
    }

    pub fn has_choices(&self) -> bool {
        self.current().is_some_and(|node| !node.choices.is_empty())
    }

    pub fn choices(&self) -> &[DialogChoice] {
        self.current()
            .map(|node| node.choices.as_slice())
            .unwrap_or(&[])
    }

    /// Moves the cursor.
    ///
    /// With choices on the current node, `choice` must index one of them; otherwise
    /// the call is rejected and the cursor stays put. Without choices, `choice` is
    /// ignored and the cursor follows the node's `next`, or the next node in load
    /// order. Reaching id `0`, the end of the list, or an unknown id ends the session.
    ///
    /// Returns `true` only when the cursor landed on a node.
    pub fn advance(&mut self, choice: Option<usize>) -> bool {
        let Some(node) = self.current() else {
            if self.active {
                tracing::warn!("Cursor {} points at no node; ending dialogue", self.current_id);
                self.end_dialogue();
            }
            return false;
        };

        let next_id = if !node.choices.is_empty() {
            match choice.and_then(|index| node.choices.get(index)) {
                Some(selected) => selected.next_id,
                None => return false,
            }
        } else if let Some(next_id) = node.next_id {
            next_id
        } else {
            self.id_to_index
                .get(&node.id)
                .and_then(|&index| self.nodes.get(index + 1))
                .map_or(0, |following| following.id)
        };

        if next_id == 0 {
            self.end_dialogue();
            return false;
        }
        if !self.id_to_index.contains_key(&next_id) {
            tracing::warn!("Next id {} not found; ending dialogue", next_id);
            self.end_dialogue();
            return false;
        }

        self.current_id = next_id;
        true
    }
}
