//! Remote data sources.
//!
//! All network access lives here: the package index client and the
//! memoized store for the remote mapping datasets. Everything is
//! blocking; a failed request propagates as an error to the caller.

pub mod pypi;
pub mod remote;

pub use pypi::{PyPiClient, SdistError};
pub use remote::RemoteStore;
