// Copyright 2024-2025 Irreducible Inc.

//! Big-endian byte (de)serialization over [`bytes::Buf`] and [`bytes::BufMut`].

use bytes::{Buf, BufMut};

#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
	#[error("Write buffer is full")]
	WriteBufferFull,
	#[error("Not enough data in read buffer to deserialize")]
	NotEnoughBytes,
	#[error("String of {len} bytes does not fit a u16 length prefix")]
	StringTooLong { len: usize },
	#[error("FromUtf8Error: {0}")]
	FromUtf8Error(#[from] std::string::FromUtf8Error),
}

/// Represents type that can be serialized to a byte buffer.
pub trait SerializeBytes {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), Error>;
}

/// Represents type that can be deserialized from a byte buffer.
pub trait DeserializeBytes {
	fn deserialize(read_buf: impl Buf) -> Result<Self, Error>
	where
		Self: Sized;
}

macro_rules! impl_serialize_int {
	($ty:ty, $put:ident, $get:ident) => {
		impl SerializeBytes for $ty {
			fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
				if write_buf.remaining_mut() < std::mem::size_of::<$ty>() {
					return Err(Error::WriteBufferFull);
				}
				write_buf.$put(*self);
				Ok(())
			}
		}

		impl DeserializeBytes for $ty {
			fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
				if read_buf.remaining() < std::mem::size_of::<$ty>() {
					return Err(Error::NotEnoughBytes);
				}
				Ok(read_buf.$get())
			}
		}
	};
}

impl_serialize_int!(u8, put_u8, get_u8);
impl_serialize_int!(u16, put_u16, get_u16);
impl_serialize_int!(u32, put_u32, get_u32);

/// Strings are written as a `u16` byte length followed by their UTF-8 bytes.
impl SerializeBytes for String {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		let len = u16::try_from(self.len()).map_err(|_| Error::StringTooLong { len: self.len() })?;
		len.serialize(&mut write_buf)?;
		put_bytes(&mut write_buf, self.as_bytes())
	}
}

impl DeserializeBytes for String {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		let len = u16::deserialize(&mut read_buf)?;
		let bytes = take_bytes(&mut read_buf, len as usize)?;
		Ok(String::from_utf8(bytes)?)
	}
}

/// Writes a raw byte slice with no length prefix.
pub fn put_bytes(mut write_buf: impl BufMut, bytes: &[u8]) -> Result<(), Error> {
	if write_buf.remaining_mut() < bytes.len() {
		return Err(Error::WriteBufferFull);
	}
	write_buf.put_slice(bytes);
	Ok(())
}

/// Reads exactly `n` raw bytes.
pub fn take_bytes(mut read_buf: impl Buf, n: usize) -> Result<Vec<u8>, Error> {
	if read_buf.remaining() < n {
		return Err(Error::NotEnoughBytes);
	}
	let mut bytes = vec![0u8; n];
	read_buf.copy_to_slice(&mut bytes);
	Ok(bytes)
}
