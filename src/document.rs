//! Conversion of corpus entries into Push API documents.
//!
//! The body text travels as zlib-compressed, base64-encoded bytes in
//! `compressedBinaryData`; every other field is sent as a metadata field.

use crate::config::FieldMapping;
use crate::corpus::Document;
use crate::error::{CoveoError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{Read, Write};

/// URI scheme used to build `documentId` from a corpus id.
pub const DOCUMENT_URI_PREFIX: &str = "corpus://";

/// File extension announced for every pushed document.
pub const FILE_EXTENSION: &str = ".txt";

/// Keys owned by the payload itself; corpus fields with these names are dropped.
const RESERVED_KEYS: [&str; 4] = [
    "documentId",
    "compressedBinaryData",
    "compressionType",
    "fileExtension",
];

/// Compression applied to `compressedBinaryData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    #[serde(rename = "ZLIB")]
    Zlib,
}

/// A document in the shape the Push API expects inside `addOrUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedDocument {
    /// `corpus://{id}`.
    pub document_id: String,
    /// Base64 of the zlib-compressed body.
    pub compressed_binary_data: String,
    pub compression_type: CompressionType,
    pub file_extension: String,
    /// Remaining corpus fields (title and friends), passed through as-is.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PreparedDocument {
    /// Corpus id this payload was built from.
    pub fn corpus_id(&self) -> &str {
        self.document_id
            .strip_prefix(DOCUMENT_URI_PREFIX)
            .unwrap_or(&self.document_id)
    }
}

/// Build the Push API payload for one corpus entry.
///
/// The corpus is left untouched; the body field is compressed into the
/// payload and absent from its pass-through fields.
pub fn prepare_document(
    id: &str,
    document: &Document,
    mapping: &FieldMapping,
) -> Result<PreparedDocument> {
    let body = match document.get(&mapping.body) {
        Some(Value::String(body)) => body,
        Some(_) => {
            return Err(CoveoError::invalid_document(
                id,
                format!("field '{}' is not text", mapping.body),
            ));
        }
        None => {
            return Err(CoveoError::invalid_document(
                id,
                format!("missing field '{}'", mapping.body),
            ));
        }
    };

    let compressed = compress(body.as_bytes())?;

    let fields = document
        .iter()
        .filter(|(key, _)| **key != mapping.body && !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(PreparedDocument {
        document_id: format!("{}{}", DOCUMENT_URI_PREFIX, id),
        compressed_binary_data: STANDARD.encode(compressed),
        compression_type: CompressionType::Zlib,
        file_extension: FILE_EXTENSION.to_string(),
        fields,
    })
}

/// Recover the body text from a prepared payload.
pub fn decode_body(document: &PreparedDocument) -> Result<String> {
    let compressed = STANDARD
        .decode(&document.compressed_binary_data)
        .map_err(|e| CoveoError::Serialization(format!("invalid base64 payload: {}", e)))?;

    let mut body = String::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_string(&mut body)
        .map_err(|e| CoveoError::Serialization(format!("invalid zlib payload: {}", e)))?;

    Ok(body)
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .and_then(|_| encoder.finish())
        .map_err(|e| CoveoError::Serialization(format!("zlib compression failed: {}", e)))
}
