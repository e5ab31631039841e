// src/services/sources.rs

//! Retrieval of vendor list documents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{GlobalVendorList, HttpConfig};
use crate::utils::http;

/// Fetches a raw JSON document by location.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_text(&self, location: &str) -> Result<String>;
}

/// Where a configured source points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(Url),
    File(PathBuf),
}

impl SourceLocation {
    /// Interpret `http(s)://` and `file://` URLs; anything else is a path.
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::config("Empty source location"));
        }

        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|_| AppError::config(format!("Invalid file URL: {location}"))),
            Ok(url) if url.scheme().len() > 1 => Err(AppError::config(format!(
                "Unsupported source scheme '{}' in {location}",
                url.scheme()
            ))),
            // Relative paths and Windows drive letters
            _ => Ok(Self::File(Path::new(location).to_path_buf())),
        }
    }
}

/// Fetches remote sources over HTTP and local ones from disk.
#[derive(Clone)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
        })
    }
}

#[async_trait]
impl SourceFetcher for DefaultFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        match SourceLocation::parse(location)? {
            SourceLocation::Remote(url) => {
                log::debug!("Fetching {}", url);
                http::fetch_text_async(&self.client, url.as_str()).await
            }
            SourceLocation::File(path) => {
                log::debug!("Reading {}", path.display());
                Ok(tokio::fs::read_to_string(&path).await?)
            }
        }
    }
}

/// Fetch and parse the Global Vendor List.
pub async fn load_vendor_list(fetcher: &dyn SourceFetcher, location: &str) -> Result<GlobalVendorList> {
    let json = fetcher.fetch_text(location).await?;
    let gvl = GlobalVendorList::from_json(&json)?;
    log::info!(
        "Loaded vendor list version {} ({} purposes, {} vendors)",
        gvl.vendor_list_version,
        gvl.purposes.len(),
        gvl.vendors.len()
    );
    Ok(gvl)
}
