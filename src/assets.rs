//! Local cache for assets referenced by file tokens

use crate::error::{Result, TokenError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard};
use url::Url;

const IMAGES_FOLDER: &str = "images";
const FONTS_FOLDER: &str = "fonts";

/// Somewhere referenced assets can be materialized locally.
pub trait AssetCache: Send + Sync {
    /// Fetch `url` into the cache and return the local file.
    fn download(&self, url: &Url, mime: &str) -> Result<PathBuf>;

    /// Cancel pending downloads, optionally deleting everything cached so far.
    fn cleanup(&self, remove_files: bool) -> Result<()>;
}

/// MIME type for a file extension, for the formats design tokens reference.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => return None,
    };
    Some(mime)
}

#[derive(Debug, Default)]
struct Downloads {
    in_flight: HashSet<Url>,
    cancelled: bool,
}

/// Cache backed by a directory tree:
/// `<root>/<theme>/images`, `<root>/<theme>/fonts` and `<root>` for the rest.
///
/// Only `file://` sources are supported. Files are named after the md5 of
/// their source URL, keeping the original extension. `cleanup` waits for
/// fetches already running and fails the ones still queued.
#[derive(Debug)]
pub struct DirectoryAssetCache {
    root: PathBuf,
    theme: String,
    downloads: Mutex<Downloads>,
    finished: Condvar,
}

impl DirectoryAssetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_theme(root, "default")
    }

    pub fn with_theme(root: impl Into<PathBuf>, theme: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            theme: theme.into(),
            downloads: Mutex::new(Downloads::default()),
            finished: Condvar::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `url` lands in the cache.
    pub fn destination(&self, url: &Url, mime: &str) -> PathBuf {
        let directory = if mime.starts_with("image/") {
            self.root.join(&self.theme).join(IMAGES_FOLDER)
        } else if mime.starts_with("font/") {
            self.root.join(&self.theme).join(FONTS_FOLDER)
        } else {
            self.root.clone()
        };

        let digest = format!("{:x}", md5::compute(url.as_str()));
        let file_name = match Path::new(url.path()).extension().and_then(|e| e.to_str()) {
            Some(extension) => format!("{}.{}", digest, extension),
            None => digest,
        };
        directory.join(file_name)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Downloads>> {
        self.downloads.lock().map_err(|_| self.poisoned())
    }

    fn wait<'a>(&self, downloads: MutexGuard<'a, Downloads>) -> Result<MutexGuard<'a, Downloads>> {
        self.finished.wait(downloads).map_err(|_| self.poisoned())
    }

    fn poisoned(&self) -> TokenError {
        TokenError::asset(self.root.display().to_string(), "asset cache lock poisoned")
    }

    /// Block until nobody else is fetching `url`, then claim it.
    fn claim(&self, url: &Url) -> Result<()> {
        let mut downloads = self.lock()?;
        loop {
            if downloads.cancelled {
                return Err(TokenError::asset(url.as_str(), "download cancelled by cleanup"));
            }
            if !downloads.in_flight.contains(url) {
                break;
            }
            log::trace!("Waiting for in-flight download of {}", url);
            downloads = self.wait(downloads)?;
        }
        downloads.in_flight.insert(url.clone());
        Ok(())
    }

    fn release(&self, url: &Url) {
        if let Ok(mut downloads) = self.downloads.lock() {
            downloads.in_flight.remove(url);
        }
        self.finished.notify_all();
    }

    fn fetch(&self, url: &Url, destination: &Path) -> Result<()> {
        if url.scheme() != "file" {
            return Err(TokenError::asset(
                url.as_str(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        let source = url
            .to_file_path()
            .map_err(|_| TokenError::asset(url.as_str(), "not a local file path"))?;
        let data = fs::read(&source)?;
        if data.is_empty() {
            return Err(TokenError::asset(url.as_str(), "source file is empty"));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(destination, data)?;
        Ok(())
    }
}

impl AssetCache for DirectoryAssetCache {
    fn download(&self, url: &Url, mime: &str) -> Result<PathBuf> {
        let destination = self.destination(url, mime);

        self.claim(url)?;
        let result = if destination.exists() {
            log::debug!("Asset cache hit for {}", url);
            Ok(())
        } else {
            log::debug!("Asset cache miss for {}, copying to {}", url, destination.display());
            self.fetch(url, &destination)
        };
        self.release(url);

        result.map(|_| destination)
    }

    fn cleanup(&self, remove_files: bool) -> Result<()> {
        let mut downloads = self.lock()?;
        downloads.cancelled = true;
        self.finished.notify_all();

        // Running fetches are not interruptible; let them land before deleting.
        while !downloads.in_flight.is_empty() {
            log::debug!("Cleanup waiting for {} in-flight downloads", downloads.in_flight.len());
            downloads = self.wait(downloads)?;
        }

        let removed = if remove_files && self.root.exists() {
            log::info!("Removing asset cache at {}", self.root.display());
            fs::remove_dir_all(&self.root)
        } else {
            Ok(())
        };
        downloads.cancelled = false;
        drop(downloads);
        self.finished.notify_all();

        removed.map_err(Into::into)
    }
}
