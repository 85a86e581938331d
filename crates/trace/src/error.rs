// Copyright 2025 Irreducible Inc.

use corset_utils::serialization::Error as SerializationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("not a trace file: invalid identifier {0:?}")]
	InvalidMagic([u8; 8]),
	#[error(
		"incompatible trace file version {major}.{minor}, expected {expected_major}.{expected_minor}"
	)]
	IncompatibleVersion {
		expected_major: u16,
		expected_minor: u16,
		major: u16,
		minor: u16,
	},
	#[error("column {column} uses unknown encoding {encoding:#04x}")]
	UnknownEncoding { column: String, encoding: u8 },
	#[error("column {column} has {len} data bytes, not a multiple of its {width}-byte encoding")]
	MisalignedColumn {
		column: String,
		len: usize,
		width: usize,
	},
	#[error("column {column} references word {index} but the heap holds {size} words")]
	HeapIndexOutOfBounds {
		column: String,
		index: usize,
		size: usize,
	},
	#[error("word of {len} bytes cannot be stored in the word heap")]
	WordTooLong { len: usize },
	#[error("{what} of {value} does not fit the trace file encoding")]
	Overflow { what: &'static str, value: usize },
	#[error("{count} {what} cannot fit in the remaining {available} bytes")]
	CountExceedsData {
		what: &'static str,
		count: usize,
		available: usize,
	},
	#[error("cannot allocate {rows} rows for column {column}")]
	AllocationFailed { column: String, rows: usize },
	#[error("{0} trailing bytes after the last column")]
	TrailingBytes(usize),
	#[error("serialization error: {0}")]
	Serialization(#[from] SerializationError),
}
