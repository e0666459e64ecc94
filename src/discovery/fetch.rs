use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Why a single fetch attempt produced no payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The asset definitively does not exist.
    #[error("not found")]
    NotFound,
    /// The server answered with an error status.
    #[error("server error (status {0})")]
    Server(u16),
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Fetch capability used by discovery.
///
/// Implementations are not expected to time out on their own; the loader bounds every call.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reads assets from a directory tree.
#[derive(Clone, Debug)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PageFetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(e) => Err(FetchError::Network(format!("read '{}': {e}", full.display()))),
        }
    }
}

#[derive(Clone, Debug)]
enum MemoryEntry {
    Bytes(Vec<u8>),
    Delayed(Duration, Vec<u8>),
    Fail(FetchError),
    Stall,
}

/// In-memory asset table for tests and headless demos.
///
/// Unknown paths answer [`FetchError::NotFound`]. Every requested path is recorded in order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, MemoryEntry>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `path`.
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.entries.insert(path.into(), MemoryEntry::Bytes(bytes));
        self
    }

    /// Serve `bytes` at `path` after `latency`.
    pub fn insert_delayed(
        &mut self,
        path: impl Into<String>,
        latency: Duration,
        bytes: Vec<u8>,
    ) -> &mut Self {
        self.entries
            .insert(path.into(), MemoryEntry::Delayed(latency, bytes));
        self
    }

    /// Answer `path` with `err`.
    pub fn fail(&mut self, path: impl Into<String>, err: FetchError) -> &mut Self {
        self.entries.insert(path.into(), MemoryEntry::Fail(err));
        self
    }

    /// Never answer `path`.
    pub fn stall(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.insert(path.into(), MemoryEntry::Stall);
        self
    }

    /// Paths requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.borrow_mut().push(path.to_owned());
        match self.entries.get(path).cloned() {
            None => Err(FetchError::NotFound),
            Some(MemoryEntry::Bytes(b)) => Ok(b),
            Some(MemoryEntry::Delayed(latency, b)) => {
                tokio::time::sleep(latency).await;
                Ok(b)
            }
            Some(MemoryEntry::Fail(e)) => Err(e),
            Some(MemoryEntry::Stall) => std::future::pending().await,
        }
    }
}

impl<F: PageFetcher> PageFetcher for std::rc::Rc<F> {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(path).await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/discovery/fetch.rs"]
mod tests;
