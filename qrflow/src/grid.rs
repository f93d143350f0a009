//! Systolic grid builder: deterministic index arithmetic laying out the
//! triangular and rectangular cell fields and wiring them into a mesh.
//!
//! For an M-row, N-column matrix the mesh holds N boundary cells on the
//! diagonal, N(N-1)/2 inner cells in the triangle above it, and an N-row by
//! M-column rectangular field of inner cells. Scalars flow downward, angle
//! sequences flow rightward, finished accumulators flow out to joiners.

use itertools::iproduct;

use crate::cell::{BoundaryCell, InnerCell};
use crate::collect::Sink;
use crate::config::QrdConfig;
use crate::cordic::Cordic;
use crate::edge::{EdgeId, PortKind};
use crate::error::BuildError;
use crate::graph::Network;

/// Number of inner cells in the triangular field.
pub(crate) fn tri_count(cols: usize) -> usize { cols * (cols - 1) / 2 }

/// Linear index of the triangular inner cell at (row, col), col > row.
///
/// Rows shrink as the triangle narrows, so the offset of row `r` is the full
/// triangle minus the sub-triangle that starts at row `r`.
pub(crate) fn tri_index(cols: usize, row: usize, col: usize) -> usize {
    debug_assert!(row < col && col < cols);
    tri_count(cols) - (cols - row) * (cols - row - 1) / 2 + col - row - 1
}

/// Linear index of the rectangular inner cell at (row, col).
pub(crate) fn rect_index(rows: usize, row: usize, col: usize) -> usize { row * rows + col }

/// The grid's boundary edges, for the source, generators, and joiners.
#[derive(Debug)]
pub(crate) struct GridIo {
    /// One scalar input per matrix column, feeding triangular row 0.
    pub(crate) col_inputs: Vec<EdgeId>,
    /// One scalar input per identity column, feeding rectangular row 0.
    pub(crate) ident_inputs: Vec<EdgeId>,
    /// Result edges of triangular row `r`: the boundary cell first, then the
    /// inner cells left to right. Joiner `r` pads `r` zeros in front.
    pub(crate) r_results: Vec<Vec<EdgeId>>,
    /// Result edges of Q output row `c`: rectangular grid column `c` across
    /// grid rows 0..N (the transpose routing).
    pub(crate) q_results: Vec<Vec<EdgeId>>,
}

fn expect_kind(net: &Network, edge: EdgeId, expected: PortKind) -> Result<(), BuildError> {
    let found = net.edge_kind(edge);
    if found == expected {
        Ok(())
    } else {
        Err(BuildError::PortKind { edge, expected, found })
    }
}

/// Lays out and wires the whole mesh into `net`.
///
/// Buffer sizing: edges that absorb a full row's worth of in-flight tokens
/// (source-to-grid, identity-to-grid, and the angle chains along each row)
/// get [`QrdConfig::deep_capacity`]; plain cell-to-cell and result edges get
/// the base depth. Undersizing any of these stalls the run, which the
/// scheduler reports rather than hangs on.
pub(crate) fn build(net: &mut Network, config: &QrdConfig) -> Result<GridIo, BuildError> {
    config.validate()?;
    let (rows, cols) = (config.rows, config.cols);
    let cordic = Cordic::new(config.format(), config.iterations);
    let near_zero = config.near_zero();
    let deep = config.deep_capacity();
    let depth = config.fifo_depth;

    // Edges first; cells bind to them by index arithmetic below.
    let col_inputs: Vec<EdgeId> =
        (0..cols).map(|_| net.add_edge(PortKind::Value, deep)).collect();
    let ident_inputs: Vec<EdgeId> =
        (0..rows).map(|_| net.add_edge(PortKind::Value, deep)).collect();

    // Downward scalar edges out of every inner cell, addressed by the linear
    // cell index. The bottom rectangular row drains into the sink.
    let mut tri_x = vec![0; tri_count(cols)];
    for (r, c) in iproduct!(0..cols, 0..cols).filter(|&(r, c)| c > r) {
        tri_x[tri_index(cols, r, c)] = net.add_edge(PortKind::Value, depth);
    }
    let mut rect_x = vec![0; cols * rows];
    for (r, c) in iproduct!(0..cols, 0..rows) {
        rect_x[rect_index(rows, r, c)] = net.add_edge(PortKind::Value, depth);
    }

    // Rightward angle chains, one per grid row: the boundary cell feeds the
    // triangular inners, then the rectangular row, then the sink.
    let chains: Vec<Vec<EdgeId>> = (0..cols)
        .map(|r| (0..cols - r + rows).map(|_| net.add_edge(PortKind::Angles, deep)).collect())
        .collect();

    // Result edges, one per cell.
    let bnd_result: Vec<EdgeId> = (0..cols).map(|_| net.add_edge(PortKind::Value, depth)).collect();
    let mut tri_result = vec![0; tri_count(cols)];
    for (r, c) in iproduct!(0..cols, 0..cols).filter(|&(r, c)| c > r) {
        tri_result[tri_index(cols, r, c)] = net.add_edge(PortKind::Value, depth);
    }
    let mut rect_result = vec![0; cols * rows];
    for (r, c) in iproduct!(0..cols, 0..rows) {
        rect_result[rect_index(rows, r, c)] = net.add_edge(PortKind::Value, depth);
    }

    // Scalar input of the triangular cell at (r, c): the source on row 0,
    // the cell above otherwise.
    let tri_x_in = |r: usize, c: usize| {
        if r == 0 {
            col_inputs[c]
        } else {
            tri_x[tri_index(cols, r - 1, c)]
        }
    };

    // Boundary cells. Row r's boundary sits at column r and consumes the
    // scalar stream that the row above already rotated.
    for r in 0..cols {
        let x_in = tri_x_in(r, r);
        let angle_out = chains[r][0];
        expect_kind(net, x_in, PortKind::Value)?;
        expect_kind(net, angle_out, PortKind::Angles)?;
        expect_kind(net, bnd_result[r], PortKind::Value)?;
        net.add_node(Box::new(BoundaryCell::new(
            cordic,
            near_zero,
            rows,
            x_in,
            angle_out,
            bnd_result[r],
        )));
    }

    // Triangular inner cells: angle position c - r - 1 along the row chain.
    for (r, c) in iproduct!(0..cols, 0..cols).filter(|&(r, c)| c > r) {
        let idx = tri_index(cols, r, c);
        let x_in = tri_x_in(r, c);
        let (angle_in, angle_out) = (chains[r][c - r - 1], chains[r][c - r]);
        expect_kind(net, x_in, PortKind::Value)?;
        expect_kind(net, angle_in, PortKind::Angles)?;
        net.add_node(Box::new(InnerCell::new(
            cordic,
            rows,
            x_in,
            angle_in,
            tri_x[idx],
            angle_out,
            tri_result[idx],
        )));
    }

    // Rectangular inner cells: row r continues the triangular row's angle
    // chain at position N - r - 1.
    for (r, c) in iproduct!(0..cols, 0..rows) {
        let idx = rect_index(rows, r, c);
        let x_in = if r == 0 { ident_inputs[c] } else { rect_x[rect_index(rows, r - 1, c)] };
        let (angle_in, angle_out) = (chains[r][cols - r - 1 + c], chains[r][cols - r + c]);
        expect_kind(net, x_in, PortKind::Value)?;
        expect_kind(net, angle_in, PortKind::Angles)?;
        net.add_node(Box::new(InnerCell::new(
            cordic,
            rows,
            x_in,
            angle_in,
            rect_x[idx],
            angle_out,
            rect_result[idx],
        )));
    }

    // Cap the unused ports: the end of every angle chain and the scalar
    // outputs of the bottom rectangular row.
    // Chain r has cols - r + rows edges; its tail is the one past the last
    // rectangular cell.
    let mut capped: Vec<EdgeId> = (0..cols).map(|r| chains[r][cols - r + rows - 1]).collect();
    capped.extend((0..rows).map(|c| rect_x[rect_index(rows, cols - 1, c)]));
    net.add_node(Box::new(Sink::new(capped)));

    let r_results = (0..cols)
        .map(|r| {
            let mut row = vec![bnd_result[r]];
            row.extend((r + 1..cols).map(|c| tri_result[tri_index(cols, r, c)]));
            row
        })
        .collect();
    let q_results =
        (0..rows).map(|c| (0..cols).map(|r| rect_result[rect_index(rows, r, c)]).collect()).collect();

    Ok(GridIo { col_inputs, ident_inputs, r_results, q_results })
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn tri_index_is_a_bijection() {
        for cols in 2..8 {
            let indices: Vec<usize> = iproduct!(0..cols, 0..cols)
                .filter(|&(r, c)| c > r)
                .map(|(r, c)| tri_index(cols, r, c))
                .sorted()
                .collect();
            assert_eq!(indices, (0..tri_count(cols)).collect::<Vec<_>>());
        }
    }

    #[test]
    fn tri_index_matches_row_major_layout() {
        // N = 4: row 0 owns indices 0..3, row 1 owns 3..5, row 2 owns 5..6.
        assert_eq!(tri_index(4, 0, 1), 0);
        assert_eq!(tri_index(4, 0, 3), 2);
        assert_eq!(tri_index(4, 1, 2), 3);
        assert_eq!(tri_index(4, 2, 3), 5);
    }

    #[test]
    fn rect_index_is_row_major() {
        assert_eq!(rect_index(3, 0, 0), 0);
        assert_eq!(rect_index(3, 1, 0), 3);
        assert_eq!(rect_index(3, 1, 2), 5);
    }

    #[test]
    fn build_rejects_invalid_dimensions() {
        let mut net = Network::new();
        let config = QrdConfig { rows: 2, cols: 3, ..QrdConfig::default() };
        assert!(matches!(build(&mut net, &config), Err(BuildError::Dimensions { .. })));
    }

    #[test]
    fn build_lays_out_the_expected_cells() {
        let mut net = Network::new();
        let config = QrdConfig { rows: 5, cols: 3, ..QrdConfig::default() };
        let io = build(&mut net, &config).unwrap();
        // 3 boundary + 3 triangular inner + 15 rectangular inner + 1 sink.
        assert_eq!(net.node_count(), 22);
        assert_eq!(io.col_inputs.len(), 3);
        assert_eq!(io.ident_inputs.len(), 5);
        assert_eq!(io.r_results.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(io.q_results.len(), 5);
        assert!(io.q_results.iter().all(|column| column.len() == 3));
    }
}
