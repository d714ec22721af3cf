/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Strict Borsh encoding and decoding of everything the cache reads from or writes into its snapshot.
//!
//! All values that pass through the cache (the [location directory](crate::directory), and the values
//! of system variables themselves) are Borsh-serialized. Decoding is strict: a byte sequence that
//! contains more bytes than the expected type consumes is rejected with
//! [`DecodeError::TrailingData`] instead of being silently truncated. This prevents a node running an
//! older version of this library from accepting values written in a newer format that appends fields.

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

use borsh::{BorshDeserialize, BorshSerialize};

/// Serialize `value` into its Borsh encoding.
pub fn encode<T: BorshSerialize + ?Sized>(value: &T) -> Result<Vec<u8>, io::Error> {
    value.try_to_vec()
}

/// Deserialize a `T` from `bytes`, requiring that every byte in `bytes` is consumed.
pub fn decode_exact<T: BorshDeserialize>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut buf = bytes;
    let value = T::deserialize(&mut buf).map_err(DecodeError::Malformed)?;
    if !buf.is_empty() {
        return Err(DecodeError::TrailingData {
            remaining: buf.len(),
        });
    }
    Ok(value)
}

/// Error when decoding a Borsh-serialized value.
#[derive(Debug)]
pub enum DecodeError {
    /// The bytes could not be deserialized into the expected type.
    Malformed(io::Error),

    /// The bytes were deserialized into the expected type, but `remaining` bytes were left unconsumed.
    TrailingData { remaining: usize },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Malformed(err) => write!(f, "malformed value: {}", err),
            DecodeError::TrailingData { remaining } => {
                write!(f, "{} trailing bytes left after decoding", remaining)
            }
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Malformed(err) => Some(err),
            DecodeError::TrailingData { .. } => None,
        }
    }
}
