//! The runnable pipeline: source, grid, generators, joiners, composed.

use std::rc::Rc;

use crate::collect::{Decomposition, LogHandle, OutputLog, RowJoiner};
use crate::config::QrdConfig;
use crate::error::{BuildError, RunError};
use crate::graph::{stalled, Network};
use crate::grid;
use crate::stream::{IdentityColumn, MatrixSource};

/// A fully wired QR decomposition network.
///
/// Built once from a [`QrdConfig`]; the topology is immutable afterwards.
/// Changing any parameter means building a new network.
#[derive(Debug)]
pub struct QrdNetwork {
    net: Network,
    log: LogHandle,
    config: QrdConfig,
}

impl QrdNetwork {
    /// Validates the configuration and wires the whole pipeline.
    pub fn build(config: QrdConfig) -> Result<Self, BuildError> {
        let mut net = Network::new();
        let io = grid::build(&mut net, &config)?;
        let log = OutputLog::new(config.format(), config.rows, config.cols, config.num_matrices);

        net.add_node(Box::new(MatrixSource::new(
            config.format(),
            config.increment(),
            config.rows,
            config.num_matrices,
            io.col_inputs,
            Rc::clone(&log),
        )));
        for (c, &input) in io.ident_inputs.iter().enumerate() {
            net.add_node(Box::new(IdentityColumn::new(
                config.format(),
                c,
                config.rows,
                config.num_matrices,
                input,
            )));
        }
        for (r, inputs) in io.r_results.into_iter().enumerate() {
            net.add_node(Box::new(RowJoiner::new(format!("R{r}"), r, inputs, Rc::clone(&log))));
        }
        for (c, inputs) in io.q_results.into_iter().enumerate() {
            net.add_node(Box::new(RowJoiner::new(format!("Q{c}"), 0, inputs, Rc::clone(&log))));
        }

        Ok(QrdNetwork { net, log, config })
    }

    /// The configuration this network was built from.
    pub fn config(&self) -> &QrdConfig { &self.config }

    /// Drives the scheduler until every joiner has delivered every matrix.
    ///
    /// Returns one [`Decomposition`] per streamed matrix, in stream order.
    pub fn run(mut self) -> Result<Vec<Decomposition>, RunError> {
        let log = Rc::clone(&self.log);
        match self.net.run_until(|| log.borrow().complete()) {
            Ok(_) => Ok(self.log.borrow().decompositions()),
            Err(after_firings) => {
                let log = self.log.borrow();
                Err(stalled(after_firings, log.delivered(), log.expected()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_two_decomposition_runs() {
        let config = QrdConfig { rows: 2, cols: 2, ..QrdConfig::default() };
        let decs = QrdNetwork::build(config).unwrap().run().unwrap();
        assert_eq!(decs.len(), 1);
        let dec = &decs[0];
        assert_eq!(dec.a.len(), 2);
        assert_eq!(dec.r.len(), 2);
        assert_eq!(dec.q.len(), 2);
        // Strictly-lower-triangular entries are the integer zero.
        assert_eq!(dec.r[1][0].raw(), 0);
    }

    #[test]
    fn empty_stream_completes_without_firing() {
        let config = QrdConfig { rows: 3, cols: 2, num_matrices: 0, ..QrdConfig::default() };
        let decs = QrdNetwork::build(config).unwrap().run().unwrap();
        assert!(decs.is_empty());
    }

    #[test]
    fn build_surfaces_config_errors() {
        let config = QrdConfig { cols: 0, ..QrdConfig::default() };
        assert!(QrdNetwork::build(config).is_err());
    }
}
