//! The hosting page
//!
//! Forms never touch a document directly. Everything they need from the
//! page they are rendered on goes through [`PageHost`].

use std::fmt;

/// How returned markup is placed into its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
	Append,
	Prepend,
	Replace,
}

/// A selector plus the insert mode applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTarget {
	pub selector: String,
	pub mode: InsertMode,
}

impl ResponseTarget {
	pub fn append(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			mode: InsertMode::Append,
		}
	}

	pub fn prepend(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			mode: InsertMode::Prepend,
		}
	}

	pub fn replace(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			mode: InsertMode::Replace,
		}
	}
}

/// Operations on the page that hosts a form.
pub trait PageHost: Send + Sync + fmt::Debug {
	/// The address of the current page.
	fn current_url(&self) -> String;

	fn navigate(&self, url: &str);

	fn reload(&self);

	/// Places `html` into the element matching `selector`.
	fn insert_html(&self, selector: &str, mode: InsertMode, html: &str);

	/// Re-initializes component bindings below `selector` after an insert.
	fn rebind(&self, selector: &str);

	fn remove_element(&self, selector: &str);

	/// Content of `<meta name="{name}">`, if the page has one.
	fn meta_content(&self, name: &str) -> Option<String>;
}
