//! Bounded FIFO edges between cell ports.

use std::collections::VecDeque;

use crate::cordic::AngleSeq;
use crate::fix::Fix;

/// Index of an edge in the network's edge store.
pub(crate) type EdgeId = usize;

/// What a port produces or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// Scalar fixed-point values.
    Value,
    /// Rotation-direction sequences.
    Angles,
}

/// One token in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Value(Fix),
    Angles(AngleSeq),
}

/// A bounded FIFO with exactly one producer and one consumer.
///
/// Capacity is fixed at wiring time; a full edge exerts backpressure by
/// making the producer ineligible to fire. Tokens keep per-edge FIFO order;
/// nothing orders tokens across different edges.
#[derive(Debug)]
pub(crate) struct Fifo {
    kind: PortKind,
    capacity: usize,
    queue: VecDeque<Token>,
}

impl Fifo {
    pub(crate) fn new(kind: PortKind, capacity: usize) -> Self {
        Fifo { kind, capacity, queue: VecDeque::with_capacity(capacity) }
    }

    pub(crate) fn kind(&self) -> PortKind { self.kind }

    pub(crate) fn has_token(&self) -> bool { !self.queue.is_empty() }

    pub(crate) fn has_room(&self) -> bool { self.queue.len() < self.capacity }

    /// Enqueues a token. Callers check [`Fifo::has_room`] as a firing guard;
    /// overflowing anyway is a scheduler bug, not backpressure.
    pub(crate) fn push(&mut self, token: Token) {
        assert!(self.has_room(), "fifo overflow past capacity {}", self.capacity);
        self.queue.push_back(token);
    }

    pub(crate) fn pop(&mut self) -> Option<Token> { self.queue.pop_front() }
}

/// Arena of all edges in a network, addressed by [`EdgeId`].
#[derive(Debug, Default)]
pub(crate) struct EdgeStore {
    edges: Vec<Fifo>,
}

impl EdgeStore {
    pub(crate) fn add(&mut self, kind: PortKind, capacity: usize) -> EdgeId {
        self.edges.push(Fifo::new(kind, capacity));
        self.edges.len() - 1
    }

    pub(crate) fn kind(&self, edge: EdgeId) -> PortKind { self.edges[edge].kind() }

    pub(crate) fn has_token(&self, edge: EdgeId) -> bool { self.edges[edge].has_token() }

    pub(crate) fn has_room(&self, edge: EdgeId) -> bool { self.edges[edge].has_room() }

    pub(crate) fn push_value(&mut self, edge: EdgeId, value: Fix) {
        debug_assert_eq!(self.edges[edge].kind(), PortKind::Value);
        self.edges[edge].push(Token::Value(value));
    }

    pub(crate) fn push_angles(&mut self, edge: EdgeId, seq: AngleSeq) {
        debug_assert_eq!(self.edges[edge].kind(), PortKind::Angles);
        self.edges[edge].push(Token::Angles(seq));
    }

    /// Dequeues a scalar. Edge kinds are validated at wiring time, so a
    /// mismatched token here is unreachable.
    pub(crate) fn pop_value(&mut self, edge: EdgeId) -> Fix {
        match self.edges[edge].pop() {
            Some(Token::Value(value)) => value,
            _ => unreachable!("value token expected on edge {edge}"),
        }
    }

    /// Dequeues an angle sequence.
    pub(crate) fn pop_angles(&mut self, edge: EdgeId) -> AngleSeq {
        match self.edges[edge].pop() {
            Some(Token::Angles(seq)) => seq,
            _ => unreachable!("angle token expected on edge {edge}"),
        }
    }

    /// Dequeues whatever is queued, for sinks that cap unused ports.
    pub(crate) fn pop_any(&mut self, edge: EdgeId) -> Option<Token> { self.edges[edge].pop() }
}
