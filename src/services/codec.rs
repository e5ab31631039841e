// src/services/codec.rs

//! Boundary to the TC string codec.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{GlobalVendorList, TcModel};

/// Encodes and decodes IAB TC strings.
///
/// The bit-level format belongs to the implementation; this crate only
/// hands models across.
pub trait ConsentStringCodec: Send + Sync {
    fn encode(&self, model: &TcModel) -> Result<String>;

    fn decode(&self, encoded: &str, gvl: Arc<GlobalVendorList>) -> Result<TcModel>;
}

/// Codec for deployments without a TC string implementation.
///
/// Encoding yields an empty string, so consent stays required; decoding
/// always fails, so flows start from a fresh model.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTcStringCodec;

impl ConsentStringCodec for NoTcStringCodec {
    fn encode(&self, _model: &TcModel) -> Result<String> {
        log::debug!("No TC string codec configured, storing an empty TC string");
        Ok(String::new())
    }

    fn decode(&self, _encoded: &str, _gvl: Arc<GlobalVendorList>) -> Result<TcModel> {
        Err(AppError::codec("no TC string codec configured"))
    }
}

/// Encode a model, degrading to an empty string on failure.
pub fn encode_or_empty(codec: &dyn ConsentStringCodec, model: &TcModel) -> String {
    codec.encode(model).unwrap_or_else(|e| {
        log::error!("Failed to encode TC string: {}", e);
        String::new()
    })
}
