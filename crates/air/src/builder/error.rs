// Copyright 2025 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown module {name}")]
	UnknownModule { name: String },
	#[error("unknown column {column}")]
	UnknownColumn { column: String },
	#[error("column {column} is computed and cannot be supplied by the input trace")]
	ComputedColumn { column: String },
	#[error("input column {column} is missing from the trace")]
	MissingColumn { column: String },
	#[error("column {column} has {actual} rows; expected {expected}")]
	InconsistentHeight {
		column: String,
		expected: usize,
		actual: usize,
	},
	#[error("column {column} has {height} rows, which is not a multiple of {multiplier}")]
	InvalidHeight {
		column: String,
		height: usize,
		multiplier: usize,
	},
	#[error("column {column} holds {value} on row {row}, which does not fit in u{bitwidth}")]
	ValueOutOfRange {
		column: String,
		row: usize,
		value: String,
		bitwidth: usize,
	},
	#[error("assignment {name} failed: {error}")]
	Assignment { name: String, error: anyhow::Error },
}
