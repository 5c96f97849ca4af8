/// Source resolution for the static JSON resources.
///
/// The plugin directory lives at `plugins.json` under a base location, which is
/// either an HTTP(S) URL or a local directory holding the same files. Stats
/// locators found in the directory may be absolute URLs or paths relative to
/// that base.
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::FetchError;

/// Base location of the static resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(Url),
    Dir(PathBuf),
}

/// A fully resolved resource location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(Url),
    File(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Url(url) => write!(f, "{}", url),
            Location::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    /// Parse a `--source` argument.
    ///
    /// `http://` and `https://` values become an HTTP base (a trailing slash is
    /// added so relative locators resolve beneath it), `file://` URLs and plain
    /// paths become a local directory.
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FetchError::InvalidLocator {
                locator: raw.to_string(),
                reason: "source must not be empty".to_string(),
            });
        }

        if let Ok(url) = Url::parse(raw) {
            match url.scheme() {
                "http" | "https" => return Ok(Source::Http(as_directory_url(url))),
                "file" => {
                    let path = url.to_file_path().map_err(|_| FetchError::InvalidLocator {
                        locator: raw.to_string(),
                        reason: "file URL has no local path".to_string(),
                    })?;
                    return Ok(Source::Dir(path));
                }
                // Windows drive letters parse as a one-letter scheme.
                scheme if scheme.len() == 1 => {}
                other => {
                    return Err(FetchError::InvalidLocator {
                        locator: raw.to_string(),
                        reason: format!("unsupported scheme '{}'", other),
                    })
                }
            }
        }

        Ok(Source::Dir(PathBuf::from(raw)))
    }

    /// Resolve a locator against this source.
    pub fn resolve(&self, locator: &str) -> Result<Location, FetchError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(FetchError::InvalidLocator {
                locator: locator.to_string(),
                reason: "locator must not be empty".to_string(),
            });
        }

        if let Ok(url) = Url::parse(locator) {
            match url.scheme() {
                "http" | "https" => return Ok(Location::Url(url)),
                "file" => {
                    return url
                        .to_file_path()
                        .map(Location::File)
                        .map_err(|_| FetchError::InvalidLocator {
                            locator: locator.to_string(),
                            reason: "file URL has no local path".to_string(),
                        })
                }
                _ => {}
            }
        }

        match self {
            Source::Http(base) => {
                base.join(locator)
                    .map(Location::Url)
                    .map_err(|e| FetchError::InvalidLocator {
                        locator: locator.to_string(),
                        reason: e.to_string(),
                    })
            }
            Source::Dir(dir) => Ok(Location::File(join_relative(dir, locator))),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Http(url) => write!(f, "{}", url),
            Source::Dir(path) => write!(f, "{}", path.display()),
        }
    }
}

fn as_directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn join_relative(dir: &Path, locator: &str) -> PathBuf {
    let candidate = Path::new(locator);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    dir.join(locator.trim_start_matches("./"))
}
