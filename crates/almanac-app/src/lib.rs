//! Command-line front end: wires configuration into the holiday engine and
//! the recurrence expander and renders results as JSON.

pub mod command;
pub mod error;
