// Copyright 2025 Irreducible Inc.

use std::collections::HashMap;

use bytes::{Buf, BufMut};
use corset_field::word;
use corset_utils::serialization::{put_bytes, take_bytes, DeserializeBytes, SerializeBytes};

use super::to_u32;
use crate::Error;

/// A pool of distinct words referenced by index.
///
/// A heap is built by a single writer and belongs to one file. Once finalised it is only read,
/// possibly from several column decoders at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordHeap {
	words: Vec<Vec<u8>>,
	index: HashMap<Vec<u8>, u32>,
}

impl WordHeap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Adds a word, returning the index of its (possibly pre-existing) entry.
	pub fn insert(&mut self, bytes: &[u8]) -> u32 {
		let bytes = word::trim(bytes);
		if let Some(&index) = self.index.get(bytes) {
			return index;
		}
		let index = self.words.len() as u32;
		self.words.push(bytes.to_vec());
		self.index.insert(bytes.to_vec(), index);
		index
	}

	pub fn get(&self, index: usize) -> Option<&[u8]> {
		self.words.get(index).map(Vec::as_slice)
	}

	pub fn write(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		to_u32("heap size", self.words.len())?.serialize(&mut write_buf)?;
		for word in &self.words {
			let len = u8::try_from(word.len()).map_err(|_| Error::WordTooLong { len: word.len() })?;
			len.serialize(&mut write_buf)?;
			put_bytes(&mut write_buf, word)?;
		}
		Ok(())
	}

	pub fn read(mut read_buf: impl Buf) -> Result<Self, Error> {
		let count = u32::deserialize(&mut read_buf)?;
		let mut heap = Self::new();
		for _ in 0..count {
			let len = u8::deserialize(&mut read_buf)?;
			let bytes = take_bytes(&mut read_buf, len as usize)?;
			// duplicates written by other producers are kept so that indices stay stable
			let index = heap.words.len() as u32;
			heap.index.entry(word::trim(&bytes).to_vec()).or_insert(index);
			heap.words.push(bytes);
		}
		Ok(heap)
	}
}
