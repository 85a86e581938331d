// Copyright 2025 Irreducible Inc.

use bytes::{Buf, BufMut};
use corset_utils::serialization::{put_bytes, take_bytes, DeserializeBytes, SerializeBytes};

use super::to_u32;
use crate::Error;

/// Identifier at the start of every trace file.
pub const MAGIC: [u8; 8] = *b"zktracer";

pub const LEGACY_MAJOR_VERSION: u16 = 1;
pub const LEGACY_MINOR_VERSION: u16 = 0;
pub const HEAP_MAJOR_VERSION: u16 = 2;
pub const HEAP_MINOR_VERSION: u16 = 0;

/// Trace file header.
///
/// Minor version bumps may only append optional trailing data, so a reader accepts any file whose
/// major version it knows and whose minor version is not newer than its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	pub major: u16,
	pub minor: u16,
	/// Opaque metadata, carried through unchanged.
	pub metadata: Vec<u8>,
}

impl Header {
	pub fn new(major: u16, minor: u16, metadata: Vec<u8>) -> Self {
		Self {
			major,
			minor,
			metadata,
		}
	}

	pub fn check_compatible(&self) -> Result<(), Error> {
		let supported_minor = match self.major {
			LEGACY_MAJOR_VERSION => LEGACY_MINOR_VERSION,
			HEAP_MAJOR_VERSION => HEAP_MINOR_VERSION,
			_ => {
				return Err(self.incompatible(HEAP_MAJOR_VERSION, HEAP_MINOR_VERSION));
			}
		};
		if self.minor > supported_minor {
			return Err(self.incompatible(self.major, supported_minor));
		}
		Ok(())
	}

	fn incompatible(&self, expected_major: u16, expected_minor: u16) -> Error {
		Error::IncompatibleVersion {
			expected_major,
			expected_minor,
			major: self.major,
			minor: self.minor,
		}
	}

	pub fn write(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		put_bytes(&mut write_buf, &MAGIC)?;
		self.major.serialize(&mut write_buf)?;
		self.minor.serialize(&mut write_buf)?;
		to_u32("metadata length", self.metadata.len())?.serialize(&mut write_buf)?;
		put_bytes(&mut write_buf, &self.metadata)?;
		Ok(())
	}

	pub fn read(mut read_buf: impl Buf) -> Result<Self, Error> {
		let magic = take_bytes(&mut read_buf, MAGIC.len())?;
		if magic != MAGIC {
			let mut found = [0u8; 8];
			found.copy_from_slice(&magic);
			return Err(Error::InvalidMagic(found));
		}
		let major = u16::deserialize(&mut read_buf)?;
		let minor = u16::deserialize(&mut read_buf)?;
		let metadata_len = u32::deserialize(&mut read_buf)?;
		let metadata = take_bytes(&mut read_buf, metadata_len as usize)?;
		Ok(Self {
			major,
			minor,
			metadata,
		})
	}
}
