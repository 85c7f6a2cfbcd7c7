//! # filedeck
//!
//! Client-side core of a file-server browser.
//!
//! ## Features
//!
//! - **Navigation**: directory paths as validated segment lists, with
//!   breadcrumb helpers.
//! - **Listing cache**: one listing per directory, loading/error/ready status,
//!   invalidation, and stale results for directories no longer on screen are
//!   dropped.
//! - **Sort & filter**: directories-first default ordering, stable sorting by
//!   name, size or modification time, substring or `/regex/` search.
//! - **Uploads**: any number of files upload at once, each tracked by its own
//!   id through `Queued -> Uploading -> Done | Failed`, dismissable once finished.
//! - **Mutations**: move and delete, invalidating the affected listings on success.
//!
//! The remote server is reached through the [`FileApi`] trait; [`ApiClient`]
//! implements it over HTTP.
//!
//! ## Example
//!
//! ```no_run
//! use filedeck::{Browser, ClientConfig, PendingUpload, RemotePath};
//!
//! # async fn example() -> filedeck::Result<()> {
//! let mut browser = Browser::connect(ClientConfig::new("http://localhost:8080/file-server/api"))?;
//!
//! browser.navigate(RemotePath::parse("docs")?);
//! browser.run_until_idle().await;
//! for entry in browser.view().entries {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//!
//! browser.enqueue(vec![PendingUpload::from_path("report.pdf")?]);
//! browser.run_until_idle().await;
//! for task in browser.uploads() {
//!     println!("{} {:?}", task.file_name, task.state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod browser;
pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod path;
pub mod progress;
pub mod upload;
pub mod view;

// Re-export commonly used types
pub use api::{ApiClient, FileApi};
pub use browser::{Browser, BrowserEvent, Outcome};
pub use cache::{CacheStats, ListingCache, ListingStatus};
pub use config::ClientConfig;
pub use error::{BrowseError, Result};
pub use fs::{Entry, Listing};
pub use path::RemotePath;
pub use progress::{ProgressCallback, TransferProgress};
pub use upload::{
    ChunkStream, PendingUpload, UploadId, UploadQueue, UploadSource, UploadState, UploadTask,
};
pub use view::{SortDirection, SortKey, SortSpec, View, view};
