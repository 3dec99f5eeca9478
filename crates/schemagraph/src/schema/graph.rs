//! Arena of write-once slots and the frozen graph it produces
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::{Schema, SchemaId, SchemaNode};
use crate::validation::{ValidationFailure, Validator, Violation};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Arena misuse detected while filling or freezing a graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("schema slot {0} was reserved but never built")]
    UnresolvedSlot(SchemaId),

    #[error("schema slot {0} was built twice")]
    SlotAlreadyFilled(SchemaId),

    #[error("schema slot {0} does not exist in this graph")]
    UnknownSlot(SchemaId),
}

/// Mutable arena used while a graph is being assembled
///
/// Slots can be reserved ahead of their contents so that references may
/// point at nodes whose bodies are still being built.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    slots: Vec<Option<SchemaNode>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an empty slot to be filled later with [`GraphBuilder::fill`]
    pub fn reserve(&mut self) -> SchemaId {
        self.slots.push(None);
        SchemaId::new(self.slots.len() - 1)
    }

    /// Write a node into a reserved slot; each slot accepts exactly one write
    pub fn fill<N: Into<SchemaNode>>(&mut self, id: SchemaId, node: N) -> Result<(), GraphError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(GraphError::UnknownSlot(id))?;
        if slot.is_some() {
            return Err(GraphError::SlotAlreadyFilled(id));
        }
        *slot = Some(node.into());
        Ok(())
    }

    /// Append a finished node
    pub fn add<N: Into<SchemaNode>>(&mut self, node: N) -> SchemaId {
        self.slots.push(Some(node.into()));
        SchemaId::new(self.slots.len() - 1)
    }

    pub fn is_filled(&self, id: SchemaId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Freeze the arena, failing if any slot is empty or any edge dangles
    pub fn finish(self, root: SchemaId) -> Result<CompiledSchema, GraphError> {
        let len = self.slots.len();
        if root.index() >= len {
            return Err(GraphError::UnknownSlot(root));
        }

        let mut nodes = Vec::with_capacity(len);
        for (index, slot) in self.slots.into_iter().enumerate() {
            let node = slot.ok_or(GraphError::UnresolvedSlot(SchemaId::new(index)))?;
            if let Some(dangling) = node.schema.children().into_iter().find(|c| c.index() >= len) {
                return Err(GraphError::UnknownSlot(dangling));
            }
            nodes.push(node);
        }

        Ok(CompiledSchema {
            graph: Arc::new(SchemaGraph { nodes }),
            root,
        })
    }
}

/// Frozen, read-only node arena
#[derive(Debug)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
}

impl SchemaGraph {
    /// Node behind a handle issued for this graph
    ///
    /// Handles are checked when the graph is frozen, so every id reachable
    /// from the graph is in range.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &SchemaNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (SchemaId::new(index), node))
    }
}

/// A loaded schema: a shared frozen graph plus its root handle
///
/// Cloning is cheap and clones share the graph; validation never mutates it,
/// so one compiled schema can serve any number of threads.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    graph: Arc<SchemaGraph>,
    root: SchemaId,
}

impl CompiledSchema {
    pub fn root(&self) -> SchemaId {
        self.root
    }

    pub fn root_node(&self) -> &SchemaNode {
        self.graph.node(self.root)
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        self.graph.node(id)
    }

    /// Same graph, different entry point
    pub fn with_root(&self, root: SchemaId) -> Option<Self> {
        self.graph.get(root).map(|_| Self {
            graph: Arc::clone(&self.graph),
            root,
        })
    }

    /// Collect-all validation with the default configuration
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationFailure> {
        Validator::default().validate(self, instance)
    }

    /// Every violation for `instance`; empty means valid
    pub fn violations(&self, instance: &Value) -> Vec<Violation> {
        Validator::default().violations(self, instance)
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        Validator::fail_fast().violations(self, instance).is_empty()
    }

    /// Handle of the first node of a given variant, mostly useful in tests
    pub fn find(&self, predicate: impl Fn(&Schema) -> bool) -> Option<SchemaId> {
        self.graph
            .iter()
            .find(|(_, node)| predicate(&node.schema))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NotSchema, ReferenceSchema};

    #[test]
    fn test_reserved_slot_must_be_filled() {
        let mut builder = GraphBuilder::new();
        let root = builder.reserve();
        assert!(!builder.is_filled(root));
        assert_eq!(
            builder.finish(root).unwrap_err(),
            GraphError::UnresolvedSlot(root)
        );
    }

    #[test]
    fn test_slot_is_write_once() {
        let mut builder = GraphBuilder::new();
        let slot = builder.reserve();
        builder.fill(slot, Schema::Empty).unwrap();
        assert_eq!(
            builder.fill(slot, Schema::False).unwrap_err(),
            GraphError::SlotAlreadyFilled(slot)
        );
    }

    #[test]
    fn test_cycle_through_reference() {
        let mut builder = GraphBuilder::new();
        let a = builder.reserve();
        let b = builder.add(Schema::Reference(ReferenceSchema::new("#/a", "doc#/a", a)));
        builder.fill(a, Schema::Not(NotSchema::new(b))).unwrap();

        let compiled = builder.finish(a).unwrap();
        assert_eq!(compiled.graph().len(), 2);
        assert_eq!(compiled.node(b).schema.children(), vec![a]);
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let mut builder = GraphBuilder::new();
        let root = builder.add(Schema::Not(NotSchema::new(SchemaId::new(9))));
        assert_eq!(
            builder.finish(root).unwrap_err(),
            GraphError::UnknownSlot(SchemaId::new(9))
        );
    }
}
