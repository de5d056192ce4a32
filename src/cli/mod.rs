//! Command-line front end: argument parsing and help text. The engine knows
//! nothing about files or processes; everything here is driver plumbing.

pub mod args;
pub mod help;
