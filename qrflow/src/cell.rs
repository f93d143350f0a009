//! Boundary and inner processing cells of the systolic mesh.
//!
//! Both kinds are two-transition state machines over one accumulator register
//! and a firing counter. The emit-and-reset transition ("done", eligible when
//! the counter reaches the matrix row count) is guarded ahead of the
//! accumulate transition at every scheduling opportunity, so a finished
//! result leaves the cell before any token of the next matrix is accepted.

use crate::cordic::{AngleSeq, Cordic};
use crate::edge::{EdgeId, EdgeStore};
use crate::fix::Fix;
use crate::graph::Actor;

/// A diagonal cell: vectoring mode.
///
/// Accumulates the magnitude of its column slice and produces the
/// rotation-direction sequence the rest of the row replays.
///
/// When the incoming column is linearly dependent on the ones above it, every
/// residual falls under the near-zero guard: the accumulator stays zero and
/// the whole grid row replays identities, so R's row and Q's column for that
/// pivot come out zero instead of an arbitrary orthonormal completion.
#[derive(Debug)]
pub(crate) struct BoundaryCell {
    cordic: Cordic,
    near_zero: i64,
    rows: usize,
    accumulator: Fix,
    count: usize,
    x_in: EdgeId,
    angle_out: EdgeId,
    result_out: EdgeId,
}

impl BoundaryCell {
    pub(crate) fn new(
        cordic: Cordic, near_zero: Fix, rows: usize, x_in: EdgeId, angle_out: EdgeId,
        result_out: EdgeId,
    ) -> Self {
        BoundaryCell {
            cordic,
            near_zero: near_zero.raw(),
            rows,
            accumulator: Fix::ZERO,
            count: 0,
            x_in,
            angle_out,
            result_out,
        }
    }
}

impl Actor for BoundaryCell {
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
        // Done transition first: emit the finished value, reset the register.
        if self.count == self.rows {
            if !edges.has_room(self.result_out) {
                return false;
            }
            edges.push_value(self.result_out, self.accumulator);
            self.accumulator = Fix::ZERO;
            self.count = 0;
            return true;
        }

        if !edges.has_token(self.x_in) || !edges.has_room(self.angle_out) {
            return false;
        }
        let x_in = edges.pop_value(self.x_in);
        if x_in.abs_raw() < self.near_zero {
            // Vectoring a near-zero vector is unstable; the rotation for this
            // step degrades to the identity and the magnitude is kept.
            edges.push_angles(self.angle_out, AngleSeq::identity());
        } else {
            let (magnitude, seq) = self.cordic.vector(self.accumulator, x_in);
            self.accumulator = magnitude;
            edges.push_angles(self.angle_out, seq);
        }
        self.count += 1;
        true
    }
}

/// An off-diagonal cell: rotation mode.
///
/// Replays the incoming direction sequence on its accumulator and the
/// incoming scalar, forwards the rotated scalar downward and the sequence
/// rightward unchanged.
#[derive(Debug)]
pub(crate) struct InnerCell {
    cordic: Cordic,
    rows: usize,
    accumulator: Fix,
    count: usize,
    x_in: EdgeId,
    angle_in: EdgeId,
    x_out: EdgeId,
    angle_out: EdgeId,
    result_out: EdgeId,
}

impl InnerCell {
    pub(crate) fn new(
        cordic: Cordic, rows: usize, x_in: EdgeId, angle_in: EdgeId, x_out: EdgeId,
        angle_out: EdgeId, result_out: EdgeId,
    ) -> Self {
        InnerCell {
            cordic,
            rows,
            accumulator: Fix::ZERO,
            count: 0,
            x_in,
            angle_in,
            x_out,
            angle_out,
            result_out,
        }
    }
}

impl Actor for InnerCell {
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
        if self.count == self.rows {
            if !edges.has_room(self.result_out) {
                return false;
            }
            edges.push_value(self.result_out, self.accumulator);
            self.accumulator = Fix::ZERO;
            self.count = 0;
            return true;
        }

        if !edges.has_token(self.x_in)
            || !edges.has_token(self.angle_in)
            || !edges.has_room(self.x_out)
            || !edges.has_room(self.angle_out)
        {
            return false;
        }
        let x_in = edges.pop_value(self.x_in);
        let seq = edges.pop_angles(self.angle_in);
        let (rotated_r, rotated_x) = self.cordic.rotate(self.accumulator, x_in, &seq);
        self.accumulator = rotated_r;
        edges.push_value(self.x_out, rotated_x);
        edges.push_angles(self.angle_out, seq);
        self.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::PortKind;
    use crate::fix::FixFormat;

    const Q3_19: FixFormat = FixFormat::new(3, 19);

    fn harness() -> (EdgeStore, Cordic) { (EdgeStore::default(), Cordic::new(Q3_19, 16)) }

    #[test]
    fn boundary_accumulates_magnitude_and_emits_once() {
        let (mut edges, cordic) = harness();
        let x_in = edges.add(PortKind::Value, 4);
        let angle_out = edges.add(PortKind::Angles, 4);
        let result_out = edges.add(PortKind::Value, 2);
        let mut cell =
            BoundaryCell::new(cordic, Q3_19.encode(0.00005), 2, x_in, angle_out, result_out);

        edges.push_value(x_in, Q3_19.encode(0.3));
        edges.push_value(x_in, Q3_19.encode(0.4));
        assert!(cell.try_fire(&mut edges));
        assert!(cell.try_fire(&mut edges));
        // Third firing is the done transition.
        assert!(cell.try_fire(&mut edges));
        let result = edges.pop_value(result_out);
        assert!((Q3_19.decode(result) - 0.5).abs() < 1e-3);
        // Register reset: no state leaks into the next matrix.
        assert_eq!(cell.accumulator, Fix::ZERO);
        assert_eq!(cell.count, 0);
        assert_eq!(edges.pop_angles(angle_out).len(), 16);
    }

    #[test]
    fn boundary_near_zero_short_circuits() {
        let (mut edges, cordic) = harness();
        let x_in = edges.add(PortKind::Value, 4);
        let angle_out = edges.add(PortKind::Angles, 4);
        let result_out = edges.add(PortKind::Value, 2);
        let mut cell =
            BoundaryCell::new(cordic, Q3_19.encode(0.00005), 2, x_in, angle_out, result_out);

        edges.push_value(x_in, Q3_19.encode(0.25));
        assert!(cell.try_fire(&mut edges));
        let before = cell.accumulator;
        edges.push_value(x_in, Fix::from_raw(1));
        assert!(cell.try_fire(&mut edges));
        assert_eq!(cell.accumulator, before);
        let _ = edges.pop_angles(angle_out);
        assert!(edges.pop_angles(angle_out).is_identity());
    }

    #[test]
    fn done_takes_priority_over_new_input() {
        let (mut edges, cordic) = harness();
        let x_in = edges.add(PortKind::Value, 4);
        let angle_out = edges.add(PortKind::Angles, 4);
        let result_out = edges.add(PortKind::Value, 1);
        let mut cell =
            BoundaryCell::new(cordic, Q3_19.encode(0.00005), 1, x_in, angle_out, result_out);

        edges.push_value(x_in, Q3_19.encode(0.5));
        assert!(cell.try_fire(&mut edges));
        // Next matrix already waiting, but the done transition goes first.
        edges.push_value(x_in, Q3_19.encode(0.7));
        assert!(cell.try_fire(&mut edges));
        assert!(edges.has_token(result_out));
        assert_eq!(cell.count, 0);
        // With the result port blocked the cell would have stalled instead.
    }

    #[test]
    fn inner_rotates_and_forwards() {
        let (mut edges, cordic) = harness();
        let x_in = edges.add(PortKind::Value, 4);
        let angle_in = edges.add(PortKind::Angles, 4);
        let x_out = edges.add(PortKind::Value, 4);
        let angle_out = edges.add(PortKind::Angles, 4);
        let result_out = edges.add(PortKind::Value, 2);
        let mut cell = InnerCell::new(cordic, 1, x_in, angle_in, x_out, angle_out, result_out);

        // A sequence that maps (0, 0.11) onto the x axis maps any pair the
        // same way; replaying it on (0, 0.22) must zero the forwarded scalar.
        let (_, seq) = cordic.vector(Fix::ZERO, Q3_19.encode(0.11));
        edges.push_value(x_in, Q3_19.encode(0.22));
        edges.push_angles(angle_in, seq.clone());
        assert!(cell.try_fire(&mut edges));
        assert!((Q3_19.decode(cell.accumulator) - 0.22).abs() < 1e-3);
        assert!(Q3_19.decode(edges.pop_value(x_out)).abs() < 1e-3);
        // Sequence forwarded unchanged.
        assert_eq!(edges.pop_angles(angle_out), seq);

        // Done transition emits the accumulator and resets it.
        assert!(cell.try_fire(&mut edges));
        assert!(edges.has_token(result_out));
        assert_eq!(cell.accumulator, Fix::ZERO);
    }

    #[test]
    fn inner_waits_for_both_operands() {
        let (mut edges, cordic) = harness();
        let x_in = edges.add(PortKind::Value, 4);
        let angle_in = edges.add(PortKind::Angles, 4);
        let x_out = edges.add(PortKind::Value, 4);
        let angle_out = edges.add(PortKind::Angles, 4);
        let result_out = edges.add(PortKind::Value, 2);
        let mut cell = InnerCell::new(cordic, 4, x_in, angle_in, x_out, angle_out, result_out);

        edges.push_value(x_in, Q3_19.encode(0.22));
        assert!(!cell.try_fire(&mut edges));
        edges.push_angles(angle_in, AngleSeq::identity());
        assert!(cell.try_fire(&mut edges));
    }
}
