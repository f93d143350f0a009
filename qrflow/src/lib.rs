//! qrflow: fixed-point CORDIC QR decomposition on a systolic array of dataflow cells.
//!
//! A matrix stream enters a triangular mesh of boundary and inner cells that
//! computes R with Givens rotations, while a rectangular field fed by identity
//! columns replays the same rotations to compute Q. Cells communicate over
//! bounded FIFO edges and fire whenever their inputs are available and their
//! outputs have room; no clocks, no locks.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::private_doc_tests)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

mod cell;
mod collect;
pub mod config;
pub mod cordic;
mod edge;
pub mod error;
pub mod fix;
mod graph;
mod grid;
pub mod network;
pub mod report;
mod stream;

pub use collect::Decomposition;
pub use config::QrdConfig;
pub use edge::PortKind;
pub use cordic::{AngleSeq, Cordic, MAX_ITERATIONS};
pub use error::{BuildError, RunError};
pub use fix::{Fix, FixFormat};
pub use network::QrdNetwork;
