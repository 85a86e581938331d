// Copyright 2025 Irreducible Inc.

//! Legacy (major version 1) layout.
//!
//! ```text
//! ncols:u32
//! { name_len:u16 name byte_width:u8 length:u32 } * ncols
//! { length * byte_width bytes of fixed-width values } * ncols
//! ```
//!
//! Modules are not stored explicitly. Each column name is qualified as `module.column` and split
//! on the first `.` when reading; names without a `.` belong to the prelude module `""`.

/// `name_len:u16 byte_width:u8 length:u32`, with an empty name.
const MIN_DESCRIPTOR_LEN: usize = 7;

use std::collections::HashMap;

use bytes::BufMut;
use corset_field::{word, Field};
use corset_utils::serialization::{put_bytes, take_bytes, DeserializeBytes, SerializeBytes};

use super::{checked_count, filled_column, to_u32, RawColumn, RawModule};
use crate::{qualified_name, Error};

pub fn write<F: Field>(mut write_buf: impl BufMut, modules: &[RawModule<F>]) -> Result<(), Error> {
	let columns = modules
		.iter()
		.flat_map(|module| {
			module
				.columns
				.iter()
				.map(move |col| (qualified_name(&module.name, &col.name), col))
		})
		.collect::<Vec<_>>();

	to_u32("column count", columns.len())?.serialize(&mut write_buf)?;
	let mut widths = Vec::with_capacity(columns.len());
	for (name, col) in &columns {
		let byte_width = col
			.data
			.iter()
			.map(|value| value.to_be_bytes().len())
			.max()
			.unwrap_or(0)
			.max(1);
		let byte_width = u8::try_from(byte_width).map_err(|_| Error::WordTooLong { len: byte_width })?;
		name.serialize(&mut write_buf)?;
		byte_width.serialize(&mut write_buf)?;
		to_u32("column length", col.data.len())?.serialize(&mut write_buf)?;
		widths.push(byte_width as usize);
	}

	for ((_, col), width) in columns.iter().zip(widths) {
		for value in &col.data {
			put_bytes(&mut write_buf, &word::pad(&value.to_be_bytes(), width))?;
		}
	}
	Ok(())
}

pub fn read<F: Field>(mut read_buf: &[u8]) -> Result<Vec<RawModule<F>>, Error> {
	let ncols = u32::deserialize(&mut read_buf)?;
	let ncols = checked_count("column descriptors", ncols, MIN_DESCRIPTOR_LEN, read_buf.len())?;
	let mut descriptors = Vec::with_capacity(ncols);
	for _ in 0..ncols {
		let name = String::deserialize(&mut read_buf)?;
		let byte_width = u8::deserialize(&mut read_buf)? as usize;
		let length = u32::deserialize(&mut read_buf)? as usize;
		descriptors.push((name, byte_width, length));
	}

	let mut modules: Vec<(String, Vec<RawColumn<F>>)> = Vec::new();
	let mut module_index = HashMap::new();
	for (name, byte_width, length) in descriptors {
		let bytes = take_bytes(&mut read_buf, byte_width * length)?;
		let data = if byte_width == 0 {
			filled_column(&name, F::ZERO, length)?
		} else {
			bytes.chunks_exact(byte_width).map(F::from_be_bytes).collect()
		};
		let (module, column) = match name.split_once('.') {
			Some((module, column)) => (module.to_string(), column.to_string()),
			None => (String::new(), name),
		};
		let index = *module_index.entry(module.clone()).or_insert_with(|| {
			modules.push((module, Vec::new()));
			modules.len() - 1
		});
		modules[index]
			.1
			.push(RawColumn::new(column, 8 * byte_width, data));
	}

	if !read_buf.is_empty() {
		return Err(Error::TrailingBytes(read_buf.len()));
	}

	Ok(modules
		.into_iter()
		.map(|(name, columns)| RawModule::new(name, columns))
		.collect())
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use corset_field::Fr;

	use super::*;

	#[test]
	fn test_layout() {
		let modules = vec![RawModule::new(
			"m",
			vec![RawColumn::new("x", 16, vec![Fr::from(1u64), Fr::from(0x0203u64)])],
		)];
		let mut buf = Vec::new();
		write(&mut buf, &modules).unwrap();
		#[rustfmt::skip]
		let expected = vec![
			0, 0, 0, 1,
			0, 3, b'm', b'.', b'x',
			2,
			0, 0, 0, 2,
			0, 1, 2, 3,
		];
		assert_eq!(buf, expected);
	}

	#[test]
	fn test_grouping_by_prefix() {
		let modules = vec![
			RawModule::new("", vec![RawColumn::new("a", 8, vec![Fr::from(1u64)])]),
			RawModule::new(
				"bin",
				vec![
					RawColumn::new("x", 8, vec![Fr::from(2u64), Fr::from(3u64)]),
					RawColumn::new("y", 8, vec![Fr::from(4u64), Fr::from(5u64)]),
				],
			),
		];
		let mut buf = Vec::new();
		write(&mut buf, &modules).unwrap();
		let decoded = read::<Fr>(&buf).unwrap();
		assert_eq!(decoded, modules);
	}

	#[test]
	fn test_truncated_data() {
		let modules = vec![RawModule::new("m", vec![RawColumn::new("x", 8, vec![Fr::from(9u64)])])];
		let mut buf = Vec::new();
		write(&mut buf, &modules).unwrap();
		buf.pop();
		assert_matches!(read::<Fr>(&buf), Err(Error::Serialization(_)));
	}

	#[test]
	fn test_oversized_column_count() {
		let mut buf = Vec::new();
		u32::MAX.serialize(&mut buf).unwrap();
		put_bytes(&mut buf, &[0; 12]).unwrap();
		assert_matches!(
			read::<Fr>(&buf),
			Err(Error::CountExceedsData {
				count,
				available: 12,
				..
			}) if count == u32::MAX as usize
		);
	}

	#[test]
	fn test_zero_width_column_too_long() {
		let mut buf = Vec::new();
		1u32.serialize(&mut buf).unwrap();
		"m.x".to_string().serialize(&mut buf).unwrap();
		0u8.serialize(&mut buf).unwrap();
		u32::MAX.serialize(&mut buf).unwrap();
		assert_matches!(read::<Fr>(&buf), Err(Error::AllocationFailed { rows, .. }) if rows == u32::MAX as usize);
	}

	#[test]
	fn test_trailing_bytes() {
		let mut buf = Vec::new();
		write::<Fr>(&mut buf, &[]).unwrap();
		buf.push(0);
		assert_matches!(read::<Fr>(&buf), Err(Error::TrailingBytes(1)));
	}
}
