//! CLI output handling
//!
//! - [`framing`] - Splits raw child output into newline-delimited lines
//! - [`identity`] - Recovers the session identity from those lines

pub mod framing;
pub mod identity;

pub use framing::LineFramer;
pub use identity::{IdentityStrategy, is_canonical_uuid};
