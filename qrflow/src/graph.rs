//! The actor network: an arena of nodes, an arena of edges, and a
//! deterministic data-driven scheduler.

use std::fmt;

use crate::edge::{EdgeId, EdgeStore, PortKind};
use crate::error::RunError;

/// Index of a node in the network's arena.
pub(crate) type NodeId = usize;

/// A unit of execution in the dataflow network.
///
/// An actor fires when its input edges hold the tokens it needs and its
/// output edges have room; otherwise it is simply not eligible this wave.
/// There is no blocking call and no shared state between actors; the only
/// shared resource is the edge store, handed in exclusively per firing.
pub(crate) trait Actor: fmt::Debug {
    /// Attempts one firing. Returns whether anything happened.
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool;
}

/// A wired network of actors.
///
/// Topology is immutable once built; only register state inside actors and
/// tokens inside edges mutate while running.
#[derive(Debug, Default)]
pub(crate) struct Network {
    nodes: Vec<Box<dyn Actor>>,
    edges: EdgeStore,
}

impl Network {
    pub(crate) fn new() -> Self { Network::default() }

    pub(crate) fn add_edge(&mut self, kind: PortKind, capacity: usize) -> EdgeId {
        self.edges.add(kind, capacity)
    }

    pub(crate) fn add_node(&mut self, node: Box<dyn Actor>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub(crate) fn edge_kind(&self, edge: EdgeId) -> PortKind { self.edges.kind(edge) }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize { self.nodes.len() }

    /// Fires every eligible actor once, in arena order. Returns the number of
    /// firings. Waves keep the run deterministic: per-edge FIFO order plus a
    /// fixed sweep order leaves no scheduling freedom.
    pub(crate) fn step(&mut self) -> usize {
        let mut fired = 0;
        for node in &mut self.nodes {
            if node.try_fire(&mut self.edges) {
                fired += 1;
            }
        }
        fired
    }

    /// Runs waves until `complete` reports done. A wave with zero firings
    /// before completion means an edge was sized below its worst-case token
    /// count; that is a construction defect, reported as a stall.
    pub(crate) fn run_until<F>(&mut self, mut complete: F) -> Result<u64, u64>
    where F: FnMut() -> bool {
        let mut total = 0u64;
        loop {
            if complete() {
                return Ok(total);
            }
            let fired = self.step();
            if fired == 0 {
                return Err(total);
            }
            total += fired as u64;
        }
    }
}

/// Builds the stall diagnosis out of the raw firing count.
pub(crate) fn stalled(after_firings: u64, delivered: usize, expected: usize) -> RunError {
    RunError::Stalled { after_firings, delivered, expected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::Fix;

    /// Repeats an input token a fixed number of times, then idles.
    #[derive(Debug)]
    struct Pulse {
        remaining: usize,
        out: EdgeId,
    }

    impl Actor for Pulse {
        fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
            if self.remaining == 0 || !edges.has_room(self.out) {
                return false;
            }
            edges.push_value(self.out, Fix::from_raw(self.remaining as i64));
            self.remaining -= 1;
            true
        }
    }

    #[derive(Debug)]
    struct Count {
        seen: usize,
        input: EdgeId,
    }

    impl Actor for Count {
        fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
            if !edges.has_token(self.input) {
                return false;
            }
            let _ = edges.pop_value(self.input);
            self.seen += 1;
            true
        }
    }

    #[test]
    fn waves_drain_a_pipeline() {
        let mut net = Network::new();
        let e = net.add_edge(PortKind::Value, 2);
        net.add_node(Box::new(Pulse { remaining: 5, out: e }));
        net.add_node(Box::new(Count { seen: 0, input: e }));
        let total = net.run_until(|| false).unwrap_err();
        // 5 producer firings + 5 consumer firings, then quiescence.
        assert_eq!(total, 10);
    }

    #[test]
    fn full_edge_suspends_the_producer() {
        let mut net = Network::new();
        let e = net.add_edge(PortKind::Value, 1);
        net.add_node(Box::new(Pulse { remaining: 3, out: e }));
        assert_eq!(net.step(), 1);
        // Edge full: the producer is not eligible, nothing fires.
        assert_eq!(net.step(), 0);
    }
}
