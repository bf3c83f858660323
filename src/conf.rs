//! Layered settings.

#[cfg(feature = "conf")]
pub use formwire_conf::*;
