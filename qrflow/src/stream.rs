//! Input-side actors: the matrix source and the identity-column generators.

use crate::collect::LogHandle;
use crate::edge::{EdgeId, EdgeStore};
use crate::fix::{Fix, FixFormat};
use crate::graph::Actor;

/// Streams the test matrices into the triangular grid, one row per firing,
/// one token per column port.
///
/// Values are deterministic fixed-point constants: each advances on the
/// previous by a fixed increment, wrapping back by 1.0 once it passes 1.0 so
/// the stream stays inside the format for any matrix count. Every emitted row
/// is also logged so the run can report A exactly as fed in.
#[derive(Debug)]
pub(crate) struct MatrixSource {
    fmt: FixFormat,
    increment: Fix,
    next: Fix,
    rows_remaining: usize,
    outputs: Vec<EdgeId>,
    log: LogHandle,
}

impl MatrixSource {
    pub(crate) fn new(
        fmt: FixFormat, increment: Fix, rows: usize, matrices: usize, outputs: Vec<EdgeId>,
        log: LogHandle,
    ) -> Self {
        let next = increment;
        MatrixSource { fmt, increment, next, rows_remaining: rows * matrices, outputs, log }
    }

    fn advance(&mut self) -> Fix {
        let value = self.next;
        let mut next = self.fmt.add(self.next, self.increment);
        if next > self.fmt.one() {
            next = self.fmt.sub(next, self.fmt.one());
        }
        self.next = next;
        value
    }
}

impl Actor for MatrixSource {
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
        if self.rows_remaining == 0 || !self.outputs.iter().all(|&e| edges.has_room(e)) {
            return false;
        }
        let row: Vec<Fix> = (0..self.outputs.len()).map(|_| self.advance()).collect();
        for (&output, &value) in self.outputs.iter().zip(&row) {
            edges.push_value(output, value);
        }
        self.log.borrow_mut().push_a_row(row);
        self.rows_remaining -= 1;
        true
    }
}

/// Feeds one column of the identity matrix into the rectangular grid.
///
/// Generator `index` emits 1 on the firing whose row position equals its own
/// index and 0 on every other row, cycling modulo M across matrices, so the
/// rectangular field rotates an exact identity per streamed matrix.
#[derive(Debug)]
pub(crate) struct IdentityColumn {
    one: Fix,
    index: usize,
    rows: usize,
    emitted: usize,
    total: usize,
    output: EdgeId,
}

impl IdentityColumn {
    pub(crate) fn new(fmt: FixFormat, index: usize, rows: usize, matrices: usize, output: EdgeId) -> Self {
        IdentityColumn { one: fmt.one(), index, rows, emitted: 0, total: rows * matrices, output }
    }
}

impl Actor for IdentityColumn {
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
        if self.emitted == self.total || !edges.has_room(self.output) {
            return false;
        }
        let value = if self.emitted % self.rows == self.index { self.one } else { Fix::ZERO };
        edges.push_value(self.output, value);
        self.emitted += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::OutputLog;
    use crate::edge::PortKind;

    const Q3_19: FixFormat = FixFormat::new(3, 19);

    #[test]
    fn source_emits_increment_rows() {
        let mut edges = EdgeStore::default();
        let outputs = vec![edges.add(PortKind::Value, 8), edges.add(PortKind::Value, 8)];
        let log = OutputLog::new(Q3_19, 2, 2, 1);
        let mut source = MatrixSource::new(
            Q3_19,
            Q3_19.encode(0.11),
            2,
            1,
            outputs.clone(),
            std::rc::Rc::clone(&log),
        );

        assert!(source.try_fire(&mut edges));
        assert!(source.try_fire(&mut edges));
        assert!(!source.try_fire(&mut edges));

        let expect = [[0.11, 0.22], [0.33, 0.44]];
        for (r, row) in expect.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                let got = Q3_19.decode(edges.pop_value(outputs[c]));
                assert!((got - value).abs() < 1e-5, "A[{r}][{c}] = {got}");
            }
        }
        assert_eq!(log.borrow().fed_rows(), 2);
    }

    #[test]
    fn source_wraps_into_range() {
        let mut edges = EdgeStore::default();
        let outputs = vec![edges.add(PortKind::Value, 64)];
        let log = OutputLog::new(Q3_19, 20, 1, 1);
        let mut source =
            MatrixSource::new(Q3_19, Q3_19.encode(0.11), 20, 1, outputs.clone(), log);
        while source.try_fire(&mut edges) {}
        let mut max = 0.0f64;
        while edges.has_token(outputs[0]) {
            max = max.max(Q3_19.decode(edges.pop_value(outputs[0])).abs());
        }
        assert!(max <= 1.0 + 1e-6);
    }

    #[test]
    fn identity_column_cycles() {
        let mut edges = EdgeStore::default();
        let output = edges.add(PortKind::Value, 16);
        let mut column = IdentityColumn::new(Q3_19, 1, 3, 2, output);
        let mut values = Vec::new();
        while column.try_fire(&mut edges) {}
        while edges.has_token(output) {
            values.push(edges.pop_value(output).raw());
        }
        let one = Q3_19.one().raw();
        assert_eq!(values, vec![0, one, 0, 0, one, 0]);
    }
}
