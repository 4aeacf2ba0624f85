//! Access to the public GOES-16 archive.
//!
//! - [`SceneStore`]: thin wrapper over an `object_store` backend (anonymous
//!   S3 in production, in-memory in tests)
//! - [`ScenePath`]: deterministic key layout of ABI products
//! - [`Fetcher`]: locate a scene for a scan time and channel, reuse a local
//!   copy when present, otherwise download it atomically

pub mod error;
pub mod fetcher;
pub mod object_store;
pub mod paths;

pub use self::object_store::{ArchiveConfig, SceneStore};
pub use error::{FetchError, FetchResult};
pub use fetcher::{FetchOutcome, FetchedScene, Fetcher};
pub use paths::ScenePath;
