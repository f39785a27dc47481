//! Operation recording for tour-construction animation.
//!
//! The pipeline reports edge-addition events to a caller-owned recorder so a
//! visualization layer can replay MST growth and the final shortcut tour.
//! Correctness never depends on a recorder being present; events fire in
//! algorithmic edge-discovery order.

use crate::graph::Node;
use serde::{Deserialize, Serialize};

/// A single recorded event: an edge appeared between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeAdded {
    pub source: usize,
    pub target: usize,
}

/// Sink for edge-addition events emitted by the pipeline
pub trait OperationRecorder {
    fn edge_added(&mut self, source: &Node, target: &Node);
}

/// Recorder that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl OperationRecorder for NullRecorder {
    fn edge_added(&mut self, _source: &Node, _target: &Node) {}
}

/// Recorder that accumulates events in order, for replay or export
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EdgeLog {
    pub events: Vec<EdgeAdded>,
}

impl EdgeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl OperationRecorder for EdgeLog {
    fn edge_added(&mut self, source: &Node, target: &Node) {
        self.events.push(EdgeAdded {
            source: source.id,
            target: target.id,
        });
    }
}
