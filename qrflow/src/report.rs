//! Renders the tagged row stream consumed by the offline accuracy checker.
//!
//! One line per matrix row, `A{k}:row {r}: v v ... ;`, repeated for R and Q.
//! The checker filters lines by their tag prefix, splits the values after the
//! last colon, and reconstructs the three matrices per streamed matrix.

use std::fmt::Write;

use crate::collect::Decomposition;

fn render_section(out: &mut String, tag: &str, index: usize, rows: &[Vec<f64>]) {
    for (r, row) in rows.iter().enumerate() {
        let _ = write!(out, "{tag}{index}:row {r}:");
        for value in row {
            let _ = write!(out, " {value:.10}");
        }
        out.push_str(" ;\n");
    }
}

/// Renders the complete output stream for a run.
pub fn render(decompositions: &[Decomposition]) -> String {
    let mut out = String::new();
    for (k, dec) in decompositions.iter().enumerate() {
        render_section(&mut out, "A", k, &dec.a_real());
        render_section(&mut out, "R", k, &dec.r_real());
        render_section(&mut out, "Q", k, &dec.q_real());
    }
    out
}
