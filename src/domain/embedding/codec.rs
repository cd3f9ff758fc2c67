//! Binary vector codec
//!
//! Vectors are stored as consecutive big-endian IEEE-754 `f32` values with
//! no header. The dimension is persisted separately and is required to
//! decode.

use bytes::{Buf, BufMut, BytesMut};

use crate::domain::DomainError;

/// Bytes used by a single vector component
pub const BYTES_PER_COMPONENT: usize = std::mem::size_of::<f32>();

/// Encode a vector into its byte representation
pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(vector.len() * BYTES_PER_COMPONENT);

    for value in vector {
        buffer.put_f32(*value);
    }

    buffer.to_vec()
}

/// Decode a byte blob holding exactly `dimension` components
pub fn decode_vector(bytes: &[u8], dimension: usize) -> Result<Vec<f32>, DomainError> {
    let expected = dimension.checked_mul(BYTES_PER_COMPONENT).ok_or_else(|| {
        DomainError::corrupt_data(format!("Dimension {} is too large", dimension))
    })?;

    if bytes.len() != expected {
        return Err(DomainError::corrupt_data(format!(
            "Expected {} bytes for dimension {}, got {}",
            expected,
            dimension,
            bytes.len()
        )));
    }

    let mut buffer = bytes;
    let mut vector = Vec::with_capacity(dimension);

    while buffer.has_remaining() {
        vector.push(buffer.get_f32());
    }

    Ok(vector)
}
