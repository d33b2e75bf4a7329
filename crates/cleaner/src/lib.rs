//! certdedup library
//!
//! Finds TLS certificate bundles that contain the same PEM block more than
//! once and rewrites them keeping only the first occurrence of each block.
//!
//! - [`bundle`] - pure segmentation, classification, deduplication and
//!   serialization, plus the atomic file replacement
//! - [`io`] - the [`BundleIo`] seam and per-bundle operations
//! - [`batch`] - enumeration of a live directory, list files, `list`/`clean`
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use certdedup::{classify_bundle, clean_bundle, FsBundleIo};
//!
//! let path = Path::new("/etc/letsencrypt/live/example.com/fullchain.pem");
//! if classify_bundle(&FsBundleIo, path)?.duplicate_found {
//!     let outcome = clean_bundle(&FsBundleIo, path)?;
//!     println!("removed {} duplicate block(s)", outcome.removed());
//! }
//! # Ok::<(), certdedup::BundleError>(())
//! ```

pub mod batch;
pub mod bundle;
pub mod error;
pub mod io;

pub use batch::{
    clean, enumerate_bundles, list, read_list, write_list, BundleEntry, CleanReport, ListReport,
};
pub use bundle::{Bundle, CertificateBlock, Classification};
pub use error::{BatchError, BundleError, ItemError};
pub use io::{
    classify_bundle, clean_bundle, inspect_bundle, BundleIo, BundleReport, CleanOutcome, FsBundleIo,
};
