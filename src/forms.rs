//! Field and form controllers, response interpretation and notifications.

#[cfg(feature = "forms")]
pub use formwire_forms::*;
