//! Message catalogs and the translator.

#[cfg(feature = "i18n")]
pub use formwire_i18n::*;
