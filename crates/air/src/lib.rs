// Copyright 2025 Irreducible Inc.

//! Compiles high-level register constraints into AIR constraints and computes the values of the
//! registers they introduce.
//!
//! A compilation pass owns a [`builder::SchemaBuilder`], declares modules and registers on it and
//! applies [`gadgets`] to lower requirements such as bit-widths or sortedness. The finished
//! [`builder::Schema`] drives trace expansion ([`expansion::expand_trace`]), bit-width validation
//! ([`validation::validate_trace`]) and constraint checking ([`validation::check_constraints`]).

pub mod builder;
pub mod expander;
pub mod expansion;
pub mod gadgets;
pub mod test_utils;
pub mod trace;
pub mod validation;
