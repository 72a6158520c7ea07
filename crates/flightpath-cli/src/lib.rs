//! Flightpath CLI library.
//!
//! Terminal styling and output formatting shared by the `flightpath` binary.

pub mod output;
pub mod terminal;
