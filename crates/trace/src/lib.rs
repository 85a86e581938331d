// Copyright 2025 Irreducible Inc.

//! Columnar trace storage and the `lt` binary trace format.

mod column;
mod error;
pub mod lt;
mod trace;

pub use column::*;
pub use error::*;
pub use trace::*;
