// Copyright 2024-2025 Irreducible Inc.

pub mod checked_arithmetics;
pub mod env;
pub mod rayon;
pub mod serialization;
pub mod tracing;
