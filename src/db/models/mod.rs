//! Database models split into domain-specific modules.

pub mod paper;
pub mod review;
pub mod revision;
pub mod user;

pub use paper::*;
pub use review::*;
pub use revision::*;
pub use user::*;
