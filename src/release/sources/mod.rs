//! Source implementations for fetching release data

pub mod pypi;
pub mod simple;

pub use pypi::PypiJsonApi;
pub use simple::SimpleIndex;
