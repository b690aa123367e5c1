//! Holiday computation and the merged agenda built on top of the recurrence
//! expander.

pub mod agenda;
pub mod error;
pub mod holiday;
