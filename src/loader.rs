//! Document loading
//!
//! Parses text from a file or from memory into a [`Document`], which owns
//! the node storage for everything derived from it.

use std::fs;
use std::path::Path;

use serde_json::error::Category;
use tracing::debug;

use crate::config::{LimitsConfig, LoaderConfig};
use crate::error::{JsonError, Result};
use crate::node::Store;
use crate::view::NodeView;

/// A fully parsed document
#[derive(Debug, Clone)]
pub struct Document {
    store: Store,
}

impl Document {
    /// The root view, named "root". Every other view derives from it.
    pub fn root(&self) -> NodeView<'_> {
        NodeView::new("root", &self.store, self.store.root())
    }

    /// Number of nodes in the document
    pub fn node_count(&self) -> usize {
        self.store.len()
    }
}

/// Loads documents under a given configuration
#[derive(Debug, Clone, Default)]
pub struct Loader {
    limits: LimitsConfig,
}

impl Loader {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            limits: config.limits.clone(),
        }
    }

    /// Parse an in-memory document
    pub fn load_from_str(&self, text: &str) -> Result<Document> {
        self.check_size(text.len() as u64)?;

        let store = Store::parse(text).map_err(|err| {
            let (offset, message) = locate_error(text, &err);
            debug!(offset, %message, "document parse failed");
            JsonError::Parse { offset, message }
        })?;

        debug!(bytes = text.len(), nodes = store.len(), "document loaded");
        Ok(Document { store })
    }

    /// Read a whole file and parse it
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        let io_error = |source| JsonError::Io {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(io_error)?;
        self.check_size(metadata.len())?;

        let bytes = fs::read(path).map_err(io_error)?;
        self.check_size(bytes.len() as u64)?;

        let text = String::from_utf8(bytes).map_err(|err| JsonError::Parse {
            offset: err.utf8_error().valid_up_to(),
            message: "Invalid encoding in string.".to_string(),
        })?;

        debug!(path = %path.display(), "loading document");
        self.load_from_str(&text)
    }

    fn check_size(&self, len: u64) -> Result<()> {
        match self.limits.max_input_bytes {
            Some(max) if len > max => Err(JsonError::Parse {
                offset: usize::try_from(max).unwrap_or(usize::MAX),
                message: format!("Document exceeds the limit of {max} bytes."),
            }),
            _ => Ok(()),
        }
    }
}

/// Parse an in-memory document with the default configuration
pub fn load_from_str(text: &str) -> Result<Document> {
    Loader::default().load_from_str(text)
}

/// Read and parse a file with the default configuration
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Document> {
    Loader::default().load_from_file(path)
}

/// Turn a parser error into a byte offset into `text` and a bare message
pub(crate) fn locate_error(text: &str, err: &serde_json::Error) -> (usize, String) {
    let full = err.to_string();
    let message = match full.rsplit_once(" at line ") {
        Some((message, _)) => message.to_string(),
        None => full.clone(),
    };

    if err.classify() == Category::Eof {
        return (text.len(), message);
    }
    if err.line() == 0 {
        return (0, message);
    }

    let line_start: usize = text
        .split_inclusive('\n')
        .take(err.line() - 1)
        .map(str::len)
        .sum();
    let offset = (line_start + err.column().saturating_sub(1)).min(text.len());
    (offset, message)
}
