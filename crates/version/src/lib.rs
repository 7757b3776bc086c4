//! Version identifiers for tool bundles.
//!
//! A bundle is addressed by a [`Binary`]: a release [`Number`] plus the
//! operating system and CPU architecture it was built for, serialized as
//! `major.minor.patch-os-arch`.
//!
//! Nothing in this crate reads process-wide state except
//! [`Platform::current`], which callers are expected to invoke once and then
//! pass around explicitly.

mod binary;
mod error;
mod number;
mod platform;

pub mod arch;

pub use binary::Binary;
pub use error::{ParseError, Result};
pub use number::Number;
pub use platform::Platform;
