//! # formwire
//!
//! Ajax form handling for server-rendered web applications.
//!
//! formwire validates inputs while they are edited, submits forms
//! asynchronously and turns the server's JSON replies into alerts, field
//! errors, inserted markup and navigation. Messages come from localized
//! catalogs; global knobs from layered settings.
//!
//! ## Feature Flags
//!
//! - `full` (default) - everything below
//! - `minimal` - values and the validation engine only
//! - `core` - [`FieldValue`], [`HttpMethod`], [`EventBus`], clocks
//! - `validators` - rules, the rule-string parser and the evaluator
//! - `i18n` - message catalogs, bundled `en`/`de` locales
//! - `conf` - settings merged from defaults, TOML and `FORMWIRE_*` variables
//! - `forms` - field and form controllers, response interpretation,
//!   notifications
//! - `http` - a reqwest transport for forms
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use formwire::prelude::*;
//! use std::sync::Arc;
//!
//! let form = FormController::builder("/users", HttpMethod::Post)
//!     .transport(Arc::new(ReqwestTransport::new("https://app.test/")?))
//!     .dialogs(dialogs)
//!     .page(page)
//!     .build()?;
//!
//! let email = form.register(Field::new("email").parse_rules("required|email")?)?;
//! email.set_value("ann@example.com");
//! form.settle().await;
//!
//! match form.submit().await? {
//!     SubmitOutcome::Completed { success, .. } => println!("done: {success}"),
//!     other => println!("not sent: {other:?}"),
//! }
//! ```

pub mod conf;
pub mod core;
pub mod forms;
pub mod i18n;
pub mod validators;

#[cfg(feature = "core")]
pub use formwire_core::{Clock, EventBus, FieldValue, HttpMethod, ManualClock, SystemClock};

#[cfg(feature = "validators")]
pub use formwire_validators::{Rule, RuleKind, RuleParseError, Verdict, evaluate};

#[cfg(feature = "i18n")]
pub use formwire_i18n::{MessageCatalog, Translator};

#[cfg(feature = "conf")]
pub use formwire_conf::{FormsSettings, SettingsBuilder, SettingsError};

#[cfg(feature = "forms")]
pub use formwire_forms::{
	Field, FieldHandle, FormController, FormEvent, NotificationPresenter, ServerResponse,
	SubmitError, SubmitOutcome,
};

#[cfg(feature = "http")]
pub use formwire_forms::http::ReqwestTransport;

/// The types most applications need.
pub mod prelude {
	#[cfg(feature = "core")]
	pub use formwire_core::{EventBus, FieldValue, HttpMethod};

	#[cfg(feature = "validators")]
	pub use formwire_validators::{Rule, VerdictCallback};

	#[cfg(feature = "i18n")]
	pub use formwire_i18n::Translator;

	#[cfg(feature = "conf")]
	pub use formwire_conf::{FormsSettings, SettingsBuilder};

	#[cfg(feature = "forms")]
	pub use formwire_forms::{
		AfterSuccess, ConfirmPolicy, DialogBackend, Field, FieldHandle, FormController, FormEvent,
		PageHost, Payload, ResponseTarget, ServerResponse, SubmitOutcome, Transport,
	};

	#[cfg(feature = "http")]
	pub use formwire_forms::http::ReqwestTransport;
}
