//! Road route planner CLI library.
//!
//! Terminal styling and report formatting shared by the `roadroute-cli`
//! binary and its tests.

pub mod output;
pub mod terminal;
