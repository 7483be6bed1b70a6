//! # Reinhardt Bundle
//!
//! Concatenated asset bundles served with HTTP cache validation.
//!
//! A [`BundleServer`] resolves a set of glob patterns once, concatenates the
//! matched files into an immutable [`Artifact`] on first use, and serves it
//! with:
//! - A strong `ETag` derived from the content's MD5 [`Fingerprint`]
//! - `Last-Modified` taken from the newest source file
//! - `304 Not Modified` for matching `If-None-Match` / `If-Modified-Since`
//! - A one-year `max-age` when the query string carries the fingerprint
//!
//! The artifact is rebuilt only when a source file's modification time moves
//! past the artifact's own timestamp. Rebuilds are serialized per server.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reinhardt_bundle::{BundleRequest, BundleServer};
//!
//! let javascripts = BundleServer::new(["public/javascripts/**/*.js"])?;
//! let stylesheets = BundleServer::new(["public/stylesheets/**/*.css"])?
//!     .with_content_type("text/css");
//!
//! let response = javascripts.handle(&BundleRequest::new("/javascripts/xall.js"))?;
//! ```
//!
//! ## Module Structure
//!
//! - [`artifact`] - Immutable concatenated snapshots
//! - [`fingerprint`] - Content hashing for ETags
//! - [`server`] - Cache coordination and conditional requests
//! - [`source`] - File system access seam
//! - [`message`] - Typed request/response records
//! - [`stats`] - Request and rebuild counters
//! - [`error`] - Error types

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod artifact;
pub mod error;
pub mod fingerprint;
pub mod message;
pub mod server;
pub mod source;
pub mod stats;

pub use artifact::{Artifact, SOURCE_SEPARATOR};
pub use error::{BundleError, BundleResult};
pub use fingerprint::Fingerprint;
pub use message::{BundleRequest, BundleResponse};
pub use server::{BundleServer, DEFAULT_CONTENT_TYPE, ONE_YEAR_IN_SECONDS};
pub use source::{AssetSource, FileSystemSource};
pub use stats::BundleStatistics;
