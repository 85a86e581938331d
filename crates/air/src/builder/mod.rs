// Copyright 2025 Irreducible Inc.

pub mod assignment;
pub mod constraint;
pub mod error;
pub mod module;
pub mod register;
pub mod schema;
pub mod term;

pub use assignment::*;
pub use constraint::*;
pub use error::*;
pub use module::*;
pub use register::*;
pub use schema::*;
pub use term::*;
