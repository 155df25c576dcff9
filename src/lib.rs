//! ## Read-only WebDAV server for local network shares.
//!
//! [`Webdav`] (RFC4918) is defined as HTTP (GET/HEAD/PUT/DELETE) plus
//! a bunch of extension methods (PROPFIND, etc). This crate implements
//! the read-only browsing subset of it: capability discovery
//! (OPTIONS), directory listing (PROPFIND, always with depth-1
//! semantics), and file retrieval (GET, with directory targets
//! answering a multistatus listing).
//!
//! A configuration file names a set of *shares*: mappings from a url
//! alias to a real directory. The synthetic root collection `/` lists
//! all shares; `/{alias}/...` resolves inside the matching share. The
//! share list is loaded once and never changes for the life of the
//! process.
//!
//! The core is [`DavHandler`]: a piece of code that takes an
//! `http::Request`, processes it, and generates an `http::Response`.
//! It works with the standard types from the `http` and `http_body`
//! crates, so it plugs straight into hyper; [`server::serve`] does
//! exactly that, with one tokio task per connection.
//!
//! There is no authentication, no locking, and no write support:
//! anything besides OPTIONS/GET/PROPFIND answers 501.
//!
//! ```no_run
//! use davshare::{Config, ShareRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load("/etc/davshare/config.json".as_ref()).unwrap();
//!     let registry = ShareRegistry::new(config.shares).unwrap();
//!     davshare::server::serve(registry, config.port).await.unwrap();
//! }
//! ```
//!
//! [`Webdav`]: https://datatracker.ietf.org/doc/html/rfc4918

#[macro_use]
extern crate log;

mod davhandler;
mod errors;
mod registry;
mod util;

pub mod body;
pub mod config;
pub mod davpath;
pub mod server;

pub use crate::config::{Config, ConfigError, Share};
pub use crate::davhandler::DavHandler;
pub use crate::errors::{DavError, DavResult};
pub use crate::registry::{ResolvedTarget, ShareRegistry};
pub use crate::util::{DavMethod, DavMethodSet};
