//! Deposit vs short-pay insurance comparison over a fixed 10-year horizon.
//!
//! `core` holds the pure calculation engine and the closed-form inverse
//! solvers; `api` exposes them over HTTP and as a one-shot CLI.

pub mod api;
pub mod core;
