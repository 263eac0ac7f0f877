//! Give-way bridge simulation library
//!
//! Queue and waiting-time simulation for a single-lane bridge with
//! alternating right-of-way, usable headless or behind a plotting front end.

pub mod simulation;
