//! Format-aware sequential page discovery.
//!
//! Pages are probed in strictly increasing order starting at 1. Each page is tried against the
//! configured encodings (the most recently successful one first) until one both fetches and
//! decodes. Discovery ends after a run of fully-absent pages once content was found, or at the
//! page ceiling.

pub mod decode;
pub mod fetch;
pub mod format;
pub mod loader;

pub use decode::{DecodedPage, ImageCrateDecoder, PageDecoder};
pub use fetch::{DirFetcher, FetchError, MemoryFetcher, PageFetcher};
pub use format::{AssetLayout, PageFormat};
pub use loader::{Discovery, DiscoveryLoader, DiscoveryStats, EndReason, ImageCandidate};
