//! Per-request upload staging.
//!
//! Uploaded images are written to a private staging directory under a
//! timestamped, sanitized name ([`StagingArea::stage`]) and removed again by a
//! [`CleanupGuard`] when the request finishes, whichever way it finishes.
//!
//! ```rust,ignore
//! let mut guard = CleanupGuard::new();
//! let path = staging.stage(&upload).await?;
//! guard.track(path.clone());
//! // ... engine call ...
//! guard.finish();
//! ```

mod cleanup;
mod intake;

pub use cleanup::{cleanup_files, CleanupGuard};
pub use intake::{allowed_file, secure_filename, StagingArea, UploadedImage};
