// Copyright 2025 Irreducible Inc.

//! The `lt` binary trace format.
//!
//! A file starts with a [`Header`] (identifier, version and an opaque metadata blob), followed by
//! a body whose layout depends on the major version:
//!
//! * major 1: the legacy fixed-width layout, see [`legacy`];
//! * major 2: the heap layout, where wide words are deduplicated into a shared [`WordHeap`], see
//!   [`heap`].
//!
//! All integers are big-endian.

mod header;
pub mod heap;
pub mod legacy;
mod word_heap;

use corset_field::Field;
pub use header::*;
use tracing::instrument;
pub use word_heap::WordHeap;

use crate::Error;

/// One column of a trace file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn<F: Field> {
	pub name: String,
	/// Declared bit-width of the column values.
	pub bitwidth: usize,
	pub data: Vec<F>,
}

impl<F: Field> RawColumn<F> {
	pub fn new(name: impl ToString, bitwidth: usize, data: Vec<F>) -> Self {
		Self {
			name: name.to_string(),
			bitwidth,
			data,
		}
	}
}

/// A named group of columns. The unnamed module `""` is the prelude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModule<F: Field> {
	pub name: String,
	pub height: usize,
	pub columns: Vec<RawColumn<F>>,
}

impl<F: Field> RawModule<F> {
	/// Creates a module whose height is the length of its longest column.
	pub fn new(name: impl ToString, columns: Vec<RawColumn<F>>) -> Self {
		let height = columns.iter().map(|col| col.data.len()).max().unwrap_or(0);
		Self {
			name: name.to_string(),
			height,
			columns,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFile<F: Field> {
	pub header: Header,
	pub modules: Vec<RawModule<F>>,
}

impl<F: Field> TraceFile<F> {
	/// Creates a trace file using the current (heap) layout.
	pub fn new(modules: Vec<RawModule<F>>) -> Self {
		Self {
			header: Header::new(HEAP_MAJOR_VERSION, HEAP_MINOR_VERSION, Vec::new()),
			modules,
		}
	}

	/// Creates a trace file using the legacy fixed-width layout.
	pub fn legacy(modules: Vec<RawModule<F>>) -> Self {
		Self {
			header: Header::new(LEGACY_MAJOR_VERSION, LEGACY_MINOR_VERSION, Vec::new()),
			modules,
		}
	}

	pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
		self.header.metadata = metadata;
		self
	}

	/// Checks whether a byte buffer starts with the trace file identifier.
	pub fn is_trace_file(bytes: &[u8]) -> bool {
		bytes.starts_with(&MAGIC)
	}

	#[instrument("lt::to_bytes", skip_all, level = "debug")]
	pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
		self.header.check_compatible()?;
		let mut buf = Vec::new();
		self.header.write(&mut buf)?;
		match self.header.major {
			LEGACY_MAJOR_VERSION => legacy::write(&mut buf, &self.modules)?,
			_ => heap::write(&mut buf, &self.modules)?,
		}
		Ok(buf)
	}

	#[instrument("lt::from_bytes", skip_all, level = "debug")]
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
		let mut read_buf = bytes;
		let header = Header::read(&mut read_buf)?;
		header.check_compatible()?;
		let modules = match header.major {
			LEGACY_MAJOR_VERSION => legacy::read(read_buf)?,
			_ => heap::read(read_buf)?,
		};
		Ok(Self { header, modules })
	}
}

/// Checks that `count` entries of at least `min_len` bytes each can be read from `available`
/// bytes, so that counts taken from a file never size an allocation on their own.
fn checked_count(what: &'static str, count: u32, min_len: usize, available: usize) -> Result<usize, Error> {
	let count = count as usize;
	if count.saturating_mul(min_len) > available {
		return Err(Error::CountExceedsData {
			what,
			count,
			available,
		});
	}
	Ok(count)
}

/// A column of `rows` copies of `value`, failing instead of aborting when it cannot be allocated.
fn filled_column<F: Field>(column: &str, value: F, rows: usize) -> Result<Vec<F>, Error> {
	let mut data = Vec::new();
	data.try_reserve_exact(rows)
		.map_err(|_| Error::AllocationFailed {
			column: column.to_string(),
			rows,
		})?;
	data.resize(rows, value);
	Ok(data)
}

fn to_u32(what: &'static str, value: usize) -> Result<u32, Error> {
	u32::try_from(value).map_err(|_| Error::Overflow { what, value })
}
