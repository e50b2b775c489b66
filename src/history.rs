// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Linear undo/redo over whole-graph snapshots
//!
//! Every edit pushes the pre-edit graph; undoing moves snapshots between the
//! past and future stacks. Pushing after an undo clears the future, so the
//! history is strictly linear.

use crate::types::GraphData;
use chrono::{DateTime, Utc};

/// One recorded graph state
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The graph as it was before the edit
    pub graph: GraphData,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

/// Linear edit history for a derived graph
#[derive(Debug, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
}

impl History {
    /// An empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current graph before an edit; clears the redo stack
    pub fn push(&mut self, graph: GraphData) {
        self.past.push(Snapshot {
            graph,
            taken_at: Utc::now(),
        });
        self.future.clear();
    }

    /// Step back one edit, exchanging `current` for the previous snapshot
    pub fn undo(&mut self, current: GraphData) -> Option<GraphData> {
        let previous = self.past.pop()?;
        self.future.insert(
            0,
            Snapshot {
                graph: current,
                taken_at: Utc::now(),
            },
        );
        Some(previous.graph)
    }

    /// Step forward one edit, exchanging `current` for the next snapshot
    pub fn redo(&mut self, current: GraphData) -> Option<GraphData> {
        if self.future.is_empty() {
            return None;
        }
        let next = self.future.remove(0);
        self.past.push(Snapshot {
            graph: current,
            taken_at: Utc::now(),
        });
        Some(next.graph)
    }

    /// True if an undo step is available
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// True if a redo step is available
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Node, NodeKind};

    fn graph_with(id: &str) -> GraphData {
        GraphData {
            nodes: vec![Node::new(id, id, NodeKind::Computer)],
            edges: vec![],
        }
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut history = History::new();
        let first = graph_with("one");
        let second = graph_with("two");

        history.push(first.clone());
        assert!(history.can_undo());

        let restored = history.undo(second.clone()).expect("undo");
        assert_eq!(restored, first);
        assert!(history.can_redo());

        let forward = history.redo(restored).expect("redo");
        assert_eq!(forward, second);
    }

    #[test]
    fn push_clears_future() {
        let mut history = History::new();
        history.push(graph_with("one"));
        let _ = history.undo(graph_with("two"));
        assert!(history.can_redo());

        history.push(graph_with("three"));
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_on_empty_history() {
        let mut history = History::new();
        assert!(history.undo(graph_with("x")).is_none());
        assert!(history.redo(graph_with("x")).is_none());
    }
}
