// Copyright 2024-2025 Irreducible Inc.

//! Field abstraction used by the constraint compiler and trace engine.
//!
//! Gadgets, terms and the trace codec are written against the [`Field`] trait only; [`Fr`] is the
//! BN254 scalar field instantiation used by default.

mod bn254;
pub mod field;
pub mod word;

pub use bn254::Fr;
pub use field::Field;
