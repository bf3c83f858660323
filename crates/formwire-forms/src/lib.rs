//! Form handling for formwire
//!
//! - [`FormController`]: owns a form's fields, validates them and submits
//! - [`FieldHandle`]: the caller's side of one registered [`Field`]
//! - [`response`]: turns a JSON reply into alerts, field errors and navigation
//! - [`NotificationPresenter`]: alerts and dialogs over a [`DialogBackend`]
//! - [`FormRequest`]: standalone submissions without a controller
//!
//! The network, the page and the dialog widgets are seams: a form is built
//! with a [`Transport`], a [`PageHost`] and a [`DialogBackend`]. The `http`
//! feature adds a reqwest transport.
//!
//! ## Example
//!
//! ```
//! use formwire_core::HttpMethod;
//! use formwire_forms::notify::{Alert, ConfirmDialog, DialogBackend};
//! use formwire_forms::page::{InsertMode, PageHost};
//! use formwire_forms::{Field, FormController};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Headless;
//!
//! #[async_trait::async_trait]
//! impl DialogBackend for Headless {
//!     async fn alert(&self, _alert: &Alert) {}
//!     async fn confirm(&self, _dialog: &ConfirmDialog) -> bool { true }
//!     async fn prompt(&self, _dialog: &formwire_forms::notify::PromptDialog) -> Option<String> { None }
//!     async fn select(&self, _dialog: &formwire_forms::notify::SelectDialog) -> Option<String> { None }
//! }
//!
//! impl PageHost for Headless {
//!     fn current_url(&self) -> String { "/".into() }
//!     fn navigate(&self, _url: &str) {}
//!     fn reload(&self) {}
//!     fn insert_html(&self, _selector: &str, _mode: InsertMode, _html: &str) {}
//!     fn rebind(&self, _selector: &str) {}
//!     fn remove_element(&self, _selector: &str) {}
//!     fn meta_content(&self, _name: &str) -> Option<String> { None }
//! }
//!
//! let form = FormController::builder("/users", HttpMethod::Post)
//!     .dialogs(Arc::new(Headless))
//!     .page(Arc::new(Headless))
//!     .native(true)
//!     .build()
//!     .unwrap();
//!
//! let name = form.register(Field::new("name").parse_rules("required").unwrap()).unwrap();
//! assert!(!form.is_valid());
//! assert!(name.errors().is_empty());
//!
//! name.set_value("Ann");
//! form.flush();
//! assert!(form.is_valid());
//! ```

pub mod csrf;
pub mod debounce;
pub mod error;
pub mod events;
pub mod field;
pub mod form;
pub mod handle;
#[cfg(feature = "http")]
pub mod http;
pub mod notify;
pub mod page;
pub mod payload;
pub mod response;
pub mod transport;

pub use error::{RequestError, SubmitError, TransportError};
pub use events::{FormEvent, PreventReason};
pub use field::{Field, FieldError, FieldId, FieldKind, FieldState, SERVER_ERROR_KEY};
pub use form::{
	AfterSuccess, ConfirmPolicy, ConfirmText, FormBuilder, FormController, NativeSubmission,
	SubmitButton, SubmitOutcome, SubmitPhase,
};
pub use handle::FieldHandle;
pub use notify::{Alert, AlertKind, DialogBackend, NotificationPresenter, QuickAction};
pub use page::{InsertMode, PageHost, ResponseTarget};
pub use payload::Payload;
pub use response::{Interpretation, Navigation, ServerResponse, interpret};
pub use transport::{FormRequest, Reply, SubmitRequest, Transport};
