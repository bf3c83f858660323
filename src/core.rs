//! Shared building blocks: values, verbs, the event bus and clocks.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "core")]
//! # {
//! use formwire::core::{EventBus, FieldValue, names};
//!
//! let bus: EventBus<FieldValue> = EventBus::new();
//! bus.emit(&names::input_changed("email"), &FieldValue::from("a@b.co"));
//! # }
//! ```

#[cfg(feature = "core")]
pub use formwire_core::*;
