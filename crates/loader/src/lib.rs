//! # Loader Crate
//!
//! Document loader: takes a URL, a file path or stdin and drives the byte
//! stream through the tokenizer and tree builder. Transport and I/O failures
//! come back as [`LoadError`]; a document without any element is `Ok(None)`.

#![forbid(unsafe_code)]

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use dom::Dom;
use html::HtmlError;
use net::{FetchConfig, NetworkError, NetworkService};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Source
// ─────────────────────────────────────────────────────────────────────────────

/// Where a document comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
    Stdin,
}

impl Source {
    /// Classify a command-line style argument: `-` is stdin, anything with a
    /// `scheme://` prefix is a URL, everything else a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else if arg.contains("://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LoadError
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Html(#[from] HtmlError),
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceLoader
// ─────────────────────────────────────────────────────────────────────────────

/// Loads documents. The HTTP client is only built on the first URL load.
pub struct ResourceLoader {
    config: FetchConfig,
    network: Option<NetworkService>,
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl ResourceLoader {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            network: None,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Load and build the document behind `source`.
    pub fn load(&mut self, source: &Source) -> Result<Option<Dom>, LoadError> {
        debug!(%source, "loading document");
        match source {
            Source::Url(url) => self.load_url(url),
            Source::File(path) => load_file(path),
            Source::Stdin => Ok(html::parse_reader(io::stdin().lock())?),
        }
    }

    /// Fetch `url` and build a tree from the streamed body.
    pub fn load_url(&mut self, url: &str) -> Result<Option<Dom>, LoadError> {
        let network = match &mut self.network {
            Some(network) => network,
            slot => slot.insert(NetworkService::new(self.config.clone())?),
        };
        let body = network.fetch(url)?;
        Ok(html::parse_reader(body)?)
    }
}

/// Fetch `url` with `config` and build a tree from the body.
pub fn load_url(url: &str, config: &FetchConfig) -> Result<Option<Dom>, LoadError> {
    ResourceLoader::new(config.clone()).load_url(url)
}

/// Read and build the document stored at `path`.
pub fn load_file(path: &Path) -> Result<Option<Dom>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(html::parse_reader(BufReader::new(file))?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
