pub mod error_log;
pub mod hasher;

pub use error_log::ErrorLog;
pub use hasher::CredentialHasher;
