//! `qrd`: builds a QR decomposition network from CLI parameters, runs it, and
//! prints the tagged A/R/Q row stream for the offline accuracy checker.

use std::process::ExitCode;

use clap::Parser;
use qrflow::{report, QrdConfig, QrdNetwork};

#[derive(Debug, Parser)]
#[command(name = "qrd", about = "Fixed-point CORDIC systolic-array QR decomposition")]
struct Args {
    /// Matrix row count M.
    #[arg(long, default_value_t = 4)]
    rows: usize,

    /// Matrix column count N.
    #[arg(long, default_value_t = 4)]
    cols: usize,

    /// Fixed-point integer bits m, including sign.
    #[arg(long, default_value_t = 3)]
    int_bits: u32,

    /// Fixed-point fractional bits n.
    #[arg(long, default_value_t = 19)]
    frac_bits: u32,

    /// CORDIC iteration count.
    #[arg(long, default_value_t = 16)]
    iterations: usize,

    /// Base capacity of cell-to-cell edges.
    #[arg(long, default_value_t = 4)]
    fifo_depth: usize,

    /// Number of matrices to stream.
    #[arg(long, default_value_t = 1)]
    matrices: usize,
}

impl Args {
    fn config(&self) -> QrdConfig {
        QrdConfig {
            rows: self.rows,
            cols: self.cols,
            int_bits: self.int_bits,
            frac_bits: self.frac_bits,
            iterations: self.iterations,
            fifo_depth: self.fifo_depth,
            num_matrices: self.matrices,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let network = match QrdNetwork::build(args.config()) {
        Ok(network) => network,
        Err(error) => {
            eprintln!("qrd: {error}");
            return ExitCode::FAILURE;
        }
    };

    match network.run() {
        Ok(decompositions) => {
            print!("{}", report::render(&decompositions));
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("qrd: {error}");
            ExitCode::FAILURE
        }
    }
}
