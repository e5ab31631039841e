// src/lib.rs

//! TCF v2 and Google Additional Consent CMP library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;
