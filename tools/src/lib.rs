//! Challenge tooling: a weak-IV AES-CBC encryptor and the pieces needed to break it.

pub mod attack;
pub mod challenge;
pub mod encrypt;
pub mod error;
pub mod logger;
pub mod payload;
pub mod random;
pub mod store;

pub use error::{Error, Result};
