// Copyright 2025 Irreducible Inc.

//! Gadgets lowering high-level register requirements into constraints, extra registers and the
//! assignments that fill them.

pub mod bitwidth;
pub mod decomposition;
pub mod lexicographic_sort;
pub mod normalise;

pub use bitwidth::*;
pub use decomposition::*;
pub use lexicographic_sort::*;
pub use normalise::*;
