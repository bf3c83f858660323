//! Re-exports of the facade crate

#![cfg(feature = "full")]

use formwire::prelude::*;
use rstest::rstest;

#[rstest]
fn test_prelude_reaches_every_layer() {
	// Arrange
	let settings = FormsSettings::default();
	let translator = Translator::bundled();

	// Act
	let field = Field::new("email").parse_rules("required|email").unwrap();
	let label = translator.field_label(None, field.name(), field.is_required());

	// Assert
	assert_eq!(settings.event_name, "ajaxForm");
	assert_eq!(label, "Email *");
	assert_eq!(HttpMethod::Patch.message_verb(), Some("put"));
}

#[rstest]
fn test_modules_mirror_member_crates() {
	let response = formwire::forms::ServerResponse::from_value(serde_json::json!({
		"errors": {"email": ["Taken"]}
	}));

	assert_eq!(response.first_error(), Some("Taken"));
	assert!(formwire::validators::patterns::is_email("ann@example.com"));
	assert_eq!(formwire::core::text::humanize("first_name"), "first name");
}
