// Copyright 2025 Irreducible Inc.

//! Heap (major version 2) layout.
//!
//! ```text
//! header_len:u32 heap_len:u32 header heap data
//!
//! header = nmodules:u32 { name height:u32 ncols:u32 { name length:u32 encoding:u8 bitwidth:u16 } * ncols } * nmodules
//! heap   = nwords:u32 { len:u8 bytes } * nwords
//! data   = the encoded bytes of every column, in header order
//! ```
//!
//! Names are `u16` length prefixed. `length` is the number of encoded bytes of the column, and
//! `encoding` is one of the [`Encoding`] tags.

use bytes::BufMut;
use corset_field::{word, Field};
use corset_utils::{
	checked_arithmetics::word_width_for_bytes,
	serialization::{put_bytes, take_bytes, DeserializeBytes, Error as SerializationError, SerializeBytes},
};
use itertools::Itertools;
use rayon::prelude::*;

use super::{checked_count, filled_column, to_u32, RawColumn, RawModule, WordHeap};
use crate::Error;

const POOLED_FLAG: u8 = 0x80;
const CONSTANT_TAG: u8 = 0x40;

/// `name_len:u16 height:u32 ncols:u32`, with an empty name.
const MIN_MODULE_LEN: usize = 10;
/// `name_len:u16 length:u32 encoding:u8 bitwidth:u16`, with an empty name.
const MIN_COLUMN_LEN: usize = 9;

/// How the rows of a column are laid out in the data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	/// Every row is stored inline as a big-endian value of the given byte width (1, 2, 4 or 8).
	Raw(usize),
	/// Every row is a big-endian heap index of the given byte width (1, 2 or 4).
	Pooled(usize),
	/// A single `u32` heap index, repeated for every row of the module.
	Constant,
}

impl Encoding {
	pub fn tag(self) -> u8 {
		match self {
			Self::Raw(width) => width as u8,
			Self::Pooled(width) => POOLED_FLAG | width as u8,
			Self::Constant => CONSTANT_TAG,
		}
	}

	pub fn from_tag(tag: u8) -> Option<Self> {
		match tag {
			CONSTANT_TAG => Some(Self::Constant),
			1 | 2 | 4 | 8 => Some(Self::Raw(tag as usize)),
			0x81 | 0x82 | 0x84 => Some(Self::Pooled((tag & !POOLED_FLAG) as usize)),
			_ => None,
		}
	}
}

struct ColumnDescriptor {
	module: usize,
	name: String,
	length: usize,
	encoding: u8,
	bitwidth: usize,
}

pub fn write<F: Field>(mut write_buf: impl BufMut, modules: &[RawModule<F>]) -> Result<(), Error> {
	let mut heap = WordHeap::new();
	let mut header = Vec::new();
	let mut data = Vec::new();

	to_u32("module count", modules.len())?.serialize(&mut header)?;
	for module in modules {
		module.name.serialize(&mut header)?;
		to_u32("module height", module.height)?.serialize(&mut header)?;
		to_u32("column count", module.columns.len())?.serialize(&mut header)?;
		for col in &module.columns {
			let (encoding, bytes) = encode_column(col, module.height, &mut heap);
			let bitwidth = u16::try_from(col.bitwidth).map_err(|_| Error::Overflow {
				what: "column bitwidth",
				value: col.bitwidth,
			})?;
			col.name.serialize(&mut header)?;
			to_u32("column length", bytes.len())?.serialize(&mut header)?;
			encoding.tag().serialize(&mut header)?;
			bitwidth.serialize(&mut header)?;
			data.extend_from_slice(&bytes);
		}
	}

	let mut heap_bytes = Vec::new();
	heap.write(&mut heap_bytes)?;
	tracing::debug!(
		header = header.len(),
		heap = heap_bytes.len(),
		words = heap.len(),
		data = data.len(),
		"encoded trace"
	);

	to_u32("header length", header.len())?.serialize(&mut write_buf)?;
	to_u32("heap length", heap_bytes.len())?.serialize(&mut write_buf)?;
	put_bytes(&mut write_buf, &header)?;
	put_bytes(&mut write_buf, &heap_bytes)?;
	put_bytes(&mut write_buf, &data)?;
	Ok(())
}

fn encode_column<F: Field>(col: &RawColumn<F>, height: usize, heap: &mut WordHeap) -> (Encoding, Vec<u8>) {
	let words = col.data.iter().map(F::to_be_bytes).collect::<Vec<_>>();

	if !words.is_empty() && words.len() == height && words.iter().all_equal() {
		let index = heap.insert(&words[0]);
		return (Encoding::Constant, index.to_be_bytes().to_vec());
	}

	let max_len = words.iter().map(Vec::len).max().unwrap_or(0);
	if let Some(width) = word_width_for_bytes(max_len) {
		let bytes = words.iter().flat_map(|w| word::pad(w, width)).collect();
		return (Encoding::Raw(width), bytes);
	}

	let indices = words.iter().map(|w| heap.insert(w)).collect::<Vec<_>>();
	let max_index = indices.iter().copied().max().unwrap_or(0);
	let width = word_width_for_bytes(word::trim(&max_index.to_be_bytes()).len())
		.expect("a u32 index fits in 4 bytes");
	let bytes = indices
		.iter()
		.flat_map(|index| word::pad(&index.to_be_bytes(), width))
		.collect();
	(Encoding::Pooled(width), bytes)
}

pub fn read<F: Field>(mut read_buf: &[u8]) -> Result<Vec<RawModule<F>>, Error> {
	let header_len = u32::deserialize(&mut read_buf)? as usize;
	let heap_len = u32::deserialize(&mut read_buf)? as usize;
	let header = take_bytes(&mut read_buf, header_len)?;
	let heap = WordHeap::read(take_bytes(&mut read_buf, heap_len)?.as_slice())?;
	let data = read_buf;

	let mut header = header.as_slice();
	let nmodules = u32::deserialize(&mut header)?;
	let nmodules = checked_count("module descriptors", nmodules, MIN_MODULE_LEN, header.len())?;
	let mut modules = Vec::with_capacity(nmodules);
	let mut descriptors = Vec::new();
	for module in 0..nmodules {
		let name = String::deserialize(&mut header)?;
		let height = u32::deserialize(&mut header)? as usize;
		let ncols = u32::deserialize(&mut header)?;
		let ncols = checked_count("column descriptors", ncols, MIN_COLUMN_LEN, header.len())?;
		for _ in 0..ncols {
			descriptors.push(ColumnDescriptor {
				module,
				name: String::deserialize(&mut header)?,
				length: u32::deserialize(&mut header)? as usize,
				encoding: u8::deserialize(&mut header)?,
				bitwidth: u16::deserialize(&mut header)? as usize,
			});
		}
		modules.push(RawModule {
			name,
			height,
			columns: Vec::with_capacity(ncols),
		});
	}

	let mut offsets = Vec::with_capacity(descriptors.len());
	let mut offset = 0;
	for desc in &descriptors {
		offsets.push(offset);
		offset += desc.length;
	}
	if offset > data.len() {
		return Err(SerializationError::NotEnoughBytes.into());
	}
	if offset < data.len() {
		return Err(Error::TrailingBytes(data.len() - offset));
	}

	let columns = descriptors
		.par_iter()
		.zip(offsets.par_iter())
		.map(|(desc, &offset)| {
			let bytes = &data[offset..offset + desc.length];
			decode_column(desc, bytes, modules[desc.module].height, &heap)
		})
		.collect::<Result<Vec<_>, _>>()?;

	for (desc, column) in descriptors.iter().zip(columns) {
		modules[desc.module].columns.push(column);
	}
	Ok(modules)
}

fn decode_column<F: Field>(
	desc: &ColumnDescriptor,
	bytes: &[u8],
	height: usize,
	heap: &WordHeap,
) -> Result<RawColumn<F>, Error> {
	let encoding = Encoding::from_tag(desc.encoding).ok_or_else(|| Error::UnknownEncoding {
		column: desc.name.clone(),
		encoding: desc.encoding,
	})?;
	let misaligned = |width| Error::MisalignedColumn {
		column: desc.name.clone(),
		len: bytes.len(),
		width,
	};
	let lookup = |chunk: &[u8]| {
		let index = chunk.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
		heap.get(index)
			.map(F::from_be_bytes)
			.ok_or_else(|| Error::HeapIndexOutOfBounds {
				column: desc.name.clone(),
				index,
				size: heap.len(),
			})
	};

	let data = match encoding {
		Encoding::Raw(width) => {
			if bytes.len() % width != 0 {
				return Err(misaligned(width));
			}
			bytes.chunks_exact(width).map(F::from_be_bytes).collect()
		}
		Encoding::Pooled(width) => {
			if bytes.len() % width != 0 {
				return Err(misaligned(width));
			}
			bytes.chunks_exact(width).map(lookup).collect::<Result<_, _>>()?
		}
		Encoding::Constant => {
			if bytes.len() != 4 {
				return Err(misaligned(4));
			}
			filled_column(&desc.name, lookup(bytes)?, height)?
		}
	};
	Ok(RawColumn::new(desc.name.clone(), desc.bitwidth, data))
}
