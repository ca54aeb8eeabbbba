//! Command-line front end.

pub mod process;
