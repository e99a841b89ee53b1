//! Vector codecs: how an embedding's values are turned into something a
//! database column can hold, and back.
//!
//! - [`JsonCodec`]: a JSON array of numbers, for semi-structured (`JSONB`) columns
//! - [`BinaryCodec`]: the standard `bincode` encoding of `Vec<f32>`, for opaque BLOBs

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("expected a JSON array, found {0}")]
    NotAnArray(&'static str),
    #[error("element {index} is not a number: {value}")]
    NotANumber { index: usize, value: String },
    #[error("invalid JSON text: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode vector: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode vector: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("{trailing} trailing bytes after encoded vector")]
    TrailingBytes { trailing: usize },
}

/// Converts a vector to a storable representation and back.
pub trait VectorCodec {
    type Encoded;

    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    fn encode(&self, vector: &[f32]) -> Result<Self::Encoded, CodecError>;

    fn decode(&self, encoded: &Self::Encoded) -> Result<Vec<f32>, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encode straight to JSON text, e.g. `[0.25,0.5]`.
    pub fn encode_text(&self, vector: &[f32]) -> Result<String, CodecError> {
        Ok(serde_json::to_string(vector)?)
    }

    pub fn decode_text(&self, text: &str) -> Result<Vec<f32>, CodecError> {
        let value: Value = serde_json::from_str(text)?;
        self.decode(&value)
    }
}

impl VectorCodec for JsonCodec {
    type Encoded = Value;

    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, vector: &[f32]) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(vector)?)
    }

    fn decode(&self, encoded: &Value) -> Result<Vec<f32>, CodecError> {
        let items = encoded
            .as_array()
            .ok_or_else(|| CodecError::NotAnArray(json_kind(encoded)))?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_f64()
                    .map(|v| v as f32)
                    .ok_or_else(|| CodecError::NotANumber {
                        index,
                        value: item.to_string(),
                    })
            })
            .collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl VectorCodec for BinaryCodec {
    type Encoded = Vec<u8>;

    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode(&self, vector: &[f32]) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::encode_to_vec(vector, bincode::config::standard())?)
    }

    fn decode(&self, encoded: &Vec<u8>) -> Result<Vec<f32>, CodecError> {
        let (vector, consumed): (Vec<f32>, usize) =
            bincode::decode_from_slice(encoded, bincode::config::standard())?;
        if consumed != encoded.len() {
            return Err(CodecError::TrailingBytes {
                trailing: encoded.len() - consumed,
            });
        }
        Ok(vector)
    }
}
