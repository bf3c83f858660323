//! Core building blocks shared by the formwire crates
//!
//! This crate provides:
//! - [`FieldValue`]: the value carried by a single form input
//! - [`HttpMethod`]: the verb a form submits with
//! - [`EventBus`]: an injectable, scoped publish/subscribe channel
//! - [`Clock`]: a time source that can be driven manually in tests
//! - [`text`]: placeholder interpolation and name humanizing helpers

pub mod clock;
pub mod events;
pub mod method;
pub mod text;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{EventBus, SubscriptionId, names};
pub use method::{HttpMethod, ParseMethodError};
pub use value::FieldValue;
