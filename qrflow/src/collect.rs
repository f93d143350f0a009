//! Row joiners, sinks, and the shared output log.

use std::cell::RefCell;
use std::rc::Rc;

use linked_hash_map::LinkedHashMap;

use crate::edge::{EdgeId, EdgeStore};
use crate::fix::{Fix, FixFormat};
use crate::graph::Actor;

/// One finished decomposition: the matrix as fed in, R, and Q.
///
/// Rows hold raw fixed-point values so exact properties (the integer zeros
/// below R's diagonal) stay checkable; real-valued views rescale by `2^-n`.
#[derive(Debug, Clone)]
pub struct Decomposition {
    fmt: FixFormat,
    /// The input matrix A, M rows of N values.
    pub a: Vec<Vec<Fix>>,
    /// Upper-triangular R, N rows of N values.
    pub r: Vec<Vec<Fix>>,
    /// Q, M rows of N values.
    pub q: Vec<Vec<Fix>>,
}

impl Decomposition {
    /// A as real values.
    pub fn a_real(&self) -> Vec<Vec<f64>> { decode_rows(self.fmt, &self.a) }

    /// R as real values.
    pub fn r_real(&self) -> Vec<Vec<f64>> { decode_rows(self.fmt, &self.r) }

    /// Q as real values.
    pub fn q_real(&self) -> Vec<Vec<f64>> { decode_rows(self.fmt, &self.q) }
}

fn decode_rows(fmt: FixFormat, rows: &[Vec<Fix>]) -> Vec<Vec<f64>> {
    rows.iter().map(|row| row.iter().map(|&v| fmt.decode(v)).collect()).collect()
}

/// Where joiners and the source deliver completed rows.
///
/// Sections are registered in print order at construction (R rows first,
/// then Q rows); each holds one row per streamed matrix.
#[derive(Debug)]
pub(crate) struct OutputLog {
    fmt: FixFormat,
    rows: usize,
    cols: usize,
    matrices: usize,
    a: Vec<Vec<Fix>>,
    sections: LinkedHashMap<String, Vec<Vec<Fix>>>,
}

/// Shared handle to the log; the source and every joiner hold one.
pub(crate) type LogHandle = Rc<RefCell<OutputLog>>;

impl OutputLog {
    pub(crate) fn new(fmt: FixFormat, rows: usize, cols: usize, matrices: usize) -> LogHandle {
        let mut sections = LinkedHashMap::new();
        for r in 0..cols {
            sections.insert(format!("R{r}"), Vec::new());
        }
        for c in 0..rows {
            sections.insert(format!("Q{c}"), Vec::new());
        }
        Rc::new(RefCell::new(OutputLog { fmt, rows, cols, matrices, a: Vec::new(), sections }))
    }

    pub(crate) fn push_a_row(&mut self, row: Vec<Fix>) { self.a.push(row); }

    /// Matrix rows fed in so far.
    #[cfg(test)]
    pub(crate) fn fed_rows(&self) -> usize { self.a.len() }

    pub(crate) fn push_row(&mut self, section: &str, row: Vec<Fix>) {
        self.sections
            .get_mut(section)
            .unwrap_or_else(|| unreachable!("unregistered section {section}"))
            .push(row);
    }

    /// Result rows delivered so far.
    pub(crate) fn delivered(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Result rows a full run delivers.
    pub(crate) fn expected(&self) -> usize { (self.rows + self.cols) * self.matrices }

    /// Whether every joiner has delivered every matrix.
    pub(crate) fn complete(&self) -> bool {
        self.a.len() == self.rows * self.matrices
            && self.sections.values().all(|rows| rows.len() == self.matrices)
    }

    /// Reassembles per-matrix decompositions from the section queues.
    pub(crate) fn decompositions(&self) -> Vec<Decomposition> {
        (0..self.matrices)
            .map(|k| Decomposition {
                fmt: self.fmt,
                a: self.a[k * self.rows..(k + 1) * self.rows].to_vec(),
                r: (0..self.cols).map(|r| self.sections[&format!("R{r}")][k].clone()).collect(),
                q: (0..self.rows).map(|c| self.sections[&format!("Q{c}")][k].clone()).collect(),
            })
            .collect()
    }
}

/// Collects one value per cell of a result row, pads the leading zeros, and
/// delivers the assembled row to the log.
///
/// For R, joiner `r` collects the boundary and inner results of triangular
/// row `r` and pads `r` exact zeros on the left. For Q, joiner `c` collects
/// rectangular grid column `c` across all grid rows (the transpose routing)
/// with no padding.
#[derive(Debug)]
pub(crate) struct RowJoiner {
    section: String,
    pad: usize,
    inputs: Vec<EdgeId>,
    log: LogHandle,
}

impl RowJoiner {
    pub(crate) fn new(section: String, pad: usize, inputs: Vec<EdgeId>, log: LogHandle) -> Self {
        RowJoiner { section, pad, inputs, log }
    }
}

impl Actor for RowJoiner {
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
        if !self.inputs.iter().all(|&e| edges.has_token(e)) {
            return false;
        }
        let mut row = vec![Fix::ZERO; self.pad];
        row.extend(self.inputs.iter().map(|&e| edges.pop_value(e)));
        self.log.borrow_mut().push_row(&self.section, row);
        true
    }
}

/// Drains unused output ports so unconsumed tokens never block upstream
/// production: the bottom row of the rectangular field and the end of every
/// angle chain terminate here.
#[derive(Debug)]
pub(crate) struct Sink {
    inputs: Vec<EdgeId>,
}

impl Sink {
    pub(crate) fn new(inputs: Vec<EdgeId>) -> Self { Sink { inputs } }
}

impl Actor for Sink {
    fn try_fire(&mut self, edges: &mut EdgeStore) -> bool {
        let mut drained = false;
        for &input in &self.inputs {
            if edges.pop_any(input).is_some() {
                drained = true;
            }
        }
        drained
    }
}
