//! Submission flow of the form controller

mod common;

use common::Harness;
use formwire_core::{FieldValue, HttpMethod};
use formwire_forms::{
	AfterSuccess, AlertKind, ConfirmPolicy, ConfirmText, Field, PreventReason, ResponseTarget,
	SubmitOutcome, SubmitPhase,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test]
async fn test_invalid_form_does_not_dispatch() {
	// Arrange
	let h = Harness::new("/users/new");
	let form = h.form("/users", HttpMethod::Post);
	let _name = form.register(Field::new("name").parse_rules("required").unwrap()).unwrap();

	// Act
	let outcome = form.submit().await.unwrap();

	// Assert
	assert_eq!(outcome, SubmitOutcome::Prevented(PreventReason::Invalid));
	assert!(h.transport.requests().is_empty());
	assert!(h.events.contains("prevented_submit-ajaxForm"));
	assert!(!h.events.contains("submitting-ajaxForm"));
	assert_eq!(form.phase(), SubmitPhase::Idle);
}

#[rstest]
#[tokio::test]
async fn test_server_errors_attach_to_fields() {
	// Arrange
	let h = Harness::new("/users/new");
	h.transport.reply(422, json!({"errors": {"name": ["Name already taken"], "unknown": "x"}}));
	let form = h.form("/users", HttpMethod::Post);
	let name = form.register(Field::new("name").with_value("Ann")).unwrap();

	// Act
	let outcome = form.submit().await.unwrap();

	// Assert
	assert!(matches!(outcome, SubmitOutcome::Completed { success: false, .. }));
	assert_eq!(name.errors(), vec!["Name already taken"]);
	assert!(!form.is_valid());
	let alerts = h.dialogs.alerts();
	assert_eq!(alerts.len(), 1);
	assert_eq!(alerts[0].message, "Name already taken");
	assert_eq!(alerts[0].kind, AlertKind::Error);
	assert!(h.events.contains("error-ajaxForm"));
	assert!(h.events.contains("response-ajaxForm"));

	// Editing the field drops the server's error.
	name.set_value("Bob");
	assert!(name.errors().is_empty());
	assert!(form.is_valid());
}

#[rstest]
#[tokio::test]
async fn test_redirect_happens_after_alert() {
	// Arrange
	let h = Harness::new("/users/new");
	h.transport.reply(
		200,
		json!({"alert": {"title": "Done", "message": "User created"}, "redirect": "/users/7"}),
	);
	let form = h.form("/users", HttpMethod::Post);

	// Act
	form.submit().await.unwrap();

	// Assert
	assert_eq!(h.journal.entries(), vec!["alert:User created", "navigate:/users/7"]);
}

#[rstest]
#[tokio::test]
async fn test_redirect_to_same_page_reloads() {
	let h = Harness::new("/users");
	h.transport.reply(200, json!({"redirect": "/users?page=2"}));
	let form = h.form("/users", HttpMethod::Post);

	form.submit().await.unwrap();

	assert_eq!(h.journal.entries(), vec!["navigate:/users?page=2", "reload"]);
}

#[rstest]
#[tokio::test]
async fn test_reload_without_redirect() {
	let h = Harness::new("/users");
	h.transport.reply(200, json!({"reload": true}));
	let form = h.form("/users", HttpMethod::Post);

	form.submit().await.unwrap();

	assert_eq!(h.journal.entries(), vec!["reload"]);
}

#[rstest]
#[tokio::test]
async fn test_request_carries_payload_and_token_header() {
	// Arrange
	let h = Harness::new("/users/new");
	let mut data = formwire_forms::Payload::new();
	data.insert("source", "signup");
	data.insert("name", "overridden");
	let form = h.builder("/users", HttpMethod::Post).data(data).build().unwrap();
	let _name = form.register(Field::new("name").with_value("Ann")).unwrap();
	let _tag_a = form.register(Field::new("tags").with_value("a")).unwrap();
	let _tag_b = form.register(Field::new("tags").with_value("b")).unwrap();

	// Act
	form.submit().await.unwrap();

	// Assert
	let requests = h.transport.requests();
	assert_eq!(requests.len(), 1);
	let request = &requests[0];
	assert_eq!(request.method, HttpMethod::Post);
	assert_eq!(request.url, "/users");
	assert_eq!(request.header("x-csrf-token"), Some("secret-token"));
	assert_eq!(
		request.payload.to_pairs(),
		vec![
			("source".to_string(), "signup".to_string()),
			("name".to_string(), "Ann".to_string()),
			("tags[]".to_string(), "a".to_string()),
			("tags[]".to_string(), "b".to_string()),
		]
	);
	assert!(h.events.contains("submitting-ajaxForm"));
}

#[rstest]
#[tokio::test]
async fn test_missing_token_sends_no_header() {
	let h = Harness::new("/users/new").without_token();
	let form = h.form("/users", HttpMethod::Post);

	form.submit().await.unwrap();

	assert_eq!(h.transport.requests()[0].header("X-CSRF-TOKEN"), None);
}

#[rstest]
#[tokio::test]
async fn test_success_inserts_data_and_clears_fields() {
	// Arrange
	let h = Harness::new("/comments");
	h.transport.reply(200, json!({"data": "<li>Nice</li>"}));
	let form = h
		.builder("/comments", HttpMethod::Post)
		.response_target(ResponseTarget::append("#comments"))
		.after_success(AfterSuccess::Clear)
		.remove_on_success("#empty-note")
		.build()
		.unwrap();
	let body = form.register(Field::new("body").with_value("Nice")).unwrap();

	// Act
	let outcome = form.submit().await.unwrap();

	// Assert
	assert!(matches!(outcome, SubmitOutcome::Completed { success: true, .. }));
	assert_eq!(
		h.journal.entries(),
		vec![
			"insert:#comments:Append:<li>Nice</li>",
			"rebind:#comments",
			"remove:#empty-note",
		]
	);
	assert_eq!(body.value(), FieldValue::empty());
	assert!(h.events.contains("success-ajaxForm"));
	assert!(h.events.contains("body-input-changed"));
}

#[rstest]
#[tokio::test]
async fn test_transport_failure_shows_default_error() {
	// Arrange
	let h = Harness::new("/users/new");
	h.transport.fail("connection refused");
	let form = h.form("/users", HttpMethod::Post);

	// Act
	let outcome = form.submit().await.unwrap();

	// Assert
	assert!(matches!(outcome, SubmitOutcome::Completed { success: false, .. }));
	let alerts = h.dialogs.alerts();
	assert_eq!(alerts.len(), 1);
	assert_eq!(alerts[0].title, "Sorry!");
	assert_eq!(alerts[0].button.as_deref(), Some("Ok!"));
	assert!(!form.submit_button().loading);
}

#[rstest]
#[tokio::test]
async fn test_delete_confirmation_is_localized_and_can_be_declined() {
	// Arrange
	let h = Harness::new("/users");
	h.dialogs.decline();
	let form = h
		.builder("/users/7", HttpMethod::Delete)
		.object_name("Bob")
		.build()
		.unwrap();

	// Act
	let outcome = form.submit().await.unwrap();

	// Assert
	assert_eq!(outcome, SubmitOutcome::Cancelled);
	assert!(h.transport.requests().is_empty());
	let confirms = h.dialogs.confirms();
	assert_eq!(confirms[0].title, "Delete");
	assert_eq!(confirms[0].message, "Do you really want to delete Bob ?");
	assert_eq!(confirms[0].kind, AlertKind::Warning);
	assert_eq!(form.phase(), SubmitPhase::Idle);
}

#[rstest]
#[tokio::test]
async fn test_delete_error_alert_names_the_object() {
	let h = Harness::new("/users");
	h.transport.reply(500, json!({}));
	let form = h
		.builder("/users/7", HttpMethod::Delete)
		.object_name("Bob")
		.build()
		.unwrap();

	form.submit().await.unwrap();

	let alerts = h.dialogs.alerts();
	assert_eq!(alerts[0].title, "Sorry");
	assert_eq!(
		alerts[0].message,
		"An error occurred while trying to delete Bob. Please try again."
	);
}

#[rstest]
#[case(HttpMethod::Post, None, 0)]
#[case(HttpMethod::Put, None, 0)]
#[case(HttpMethod::Put, Some("Bob"), 1)]
#[case(HttpMethod::Patch, Some("Bob"), 1)]
#[tokio::test]
async fn test_destructive_verbs_confirm_named_objects(
	#[case] method: HttpMethod,
	#[case] object: Option<&str>,
	#[case] expected: usize,
) {
	let h = Harness::new("/users");
	let mut builder = h.builder("/users/7", method);
	if let Some(object) = object {
		builder = builder.object_name(object);
	}

	builder.build().unwrap().submit().await.unwrap();

	assert_eq!(h.dialogs.confirms().len(), expected);
}

#[rstest]
#[tokio::test]
async fn test_explicit_confirm_text_wins_over_catalog() {
	let h = Harness::new("/users");
	let text = ConfirmText {
		title: Some("Really?".to_string()),
		..ConfirmText::default()
	};
	let form = h
		.builder("/users", HttpMethod::Post)
		.confirm(ConfirmPolicy::Always(text))
		.build()
		.unwrap();

	form.submit().await.unwrap();

	let confirms = h.dialogs.confirms();
	assert_eq!(confirms[0].title, "Really?");
	assert_eq!(confirms[0].message, "Do you really want to save this data?");
	assert_eq!(h.transport.requests().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_success_alert_falls_back_to_catalog() {
	let h = Harness::new("/users");
	let form = h
		.builder("/users", HttpMethod::Post)
		.success_alert(true)
		.build()
		.unwrap();

	form.submit().await.unwrap();

	let alerts = h.dialogs.alerts();
	assert_eq!(alerts[0].title, "Saved");
	assert_eq!(alerts[0].kind, AlertKind::Success);
}

#[rstest]
#[tokio::test]
async fn test_second_submit_while_in_flight_is_prevented() {
	// Arrange
	let h = Harness::new("/users/new");
	let release = h.transport.hold();
	let form = h.form("/users", HttpMethod::Post);
	let first = tokio::spawn({
		let form = form.clone();
		async move { form.submit().await }
	});
	while h.transport.requests().is_empty() {
		tokio::task::yield_now().await;
	}

	// Act
	let second = form.submit().await.unwrap();
	let button = form.submit_button();
	release.send(()).unwrap();
	let first = first.await.unwrap().unwrap();

	// Assert
	assert_eq!(second, SubmitOutcome::Prevented(PreventReason::AlreadySubmitting));
	assert!(button.loading);
	assert!(button.disabled);
	assert!(matches!(first, SubmitOutcome::Completed { success: true, .. }));
	assert_eq!(h.transport.requests().len(), 1);
	assert!(!form.submit_button().loading);
}

#[rstest]
#[tokio::test]
async fn test_loader_stays_on_redirect_when_asked() {
	let h = Harness::new("/users/new");
	h.transport.reply(200, json!({"redirect": "/users/1"}));
	let form = h
		.builder("/users", HttpMethod::Post)
		.submit_content("Save")
		.keep_loading_on_redirect(true)
		.build()
		.unwrap();

	form.submit().await.unwrap();

	let button = form.submit_button();
	assert!(button.loading);
	assert_ne!(button.content, "Save");
}

#[rstest]
#[tokio::test]
async fn test_native_submission_prepends_token() {
	// Arrange
	let h = Harness::new("/login");
	let form = h
		.builder("/login", HttpMethod::Post)
		.native(true)
		.build()
		.unwrap();
	let _email = form.register(Field::new("email").with_value("a@b.co")).unwrap();

	// Act
	let outcome = form.submit().await.unwrap();

	// Assert
	let SubmitOutcome::Native(native) = outcome else {
		panic!("expected a native submission, got {outcome:?}");
	};
	assert_eq!(native.action, "/login");
	let names: Vec<&str> = native.payload.iter().map(|(name, _)| name).collect();
	assert_eq!(names, vec!["_token", "email"]);
	assert!(h.transport.requests().is_empty());
	assert!(form.submit_button().loading);
}

#[rstest]
#[tokio::test]
async fn test_native_submission_without_token_still_submits() {
	let h = Harness::new("/login").without_token();
	let form = h
		.builder("/login", HttpMethod::Post)
		.native(true)
		.build()
		.unwrap();

	let outcome = form.submit().await.unwrap();

	let SubmitOutcome::Native(native) = outcome else {
		panic!("expected a native submission");
	};
	assert!(!native.payload.contains("_token"));
}

#[rstest]
#[tokio::test]
async fn test_checkbox_values_in_payload() {
	let h = Harness::new("/settings");
	let form = h.form("/settings", HttpMethod::Put);
	let newsletter = form
		.register(Field::checkbox("newsletter").with_checked_value("yes"))
		.unwrap();
	let _terms = form.register(Field::checkbox("terms")).unwrap();

	newsletter.toggle();
	form.submit().await.unwrap();

	let payload = &h.transport.requests()[0].payload;
	assert_eq!(payload.get("newsletter"), Some(&FieldValue::from("yes")));
	assert_eq!(payload.get("terms"), Some(&FieldValue::Bool(false)));
}

#[rstest]
fn test_build_requires_services() {
	let h = Harness::new("/");
	let missing_transport = formwire_forms::FormController::builder("/", HttpMethod::Post)
		.dialogs(h.dialogs.clone())
		.page(std::sync::Arc::new(common::FakePage::new("/", None, h.journal.clone())))
		.build();

	assert!(matches!(
		missing_transport,
		Err(formwire_forms::SubmitError::MissingService("transport"))
	));
}

#[rstest]
#[tokio::test]
async fn test_destroyed_form_rejects_submit_and_registration() {
	let h = Harness::new("/");
	let form = h.form("/", HttpMethod::Post);
	let name = form.register(Field::new("name")).unwrap();

	form.destroy();

	assert!(matches!(form.submit().await, Err(formwire_forms::SubmitError::Destroyed)));
	assert!(form.register(Field::new("other")).is_err());
	assert!(!name.is_registered());
	name.set_value("ignored");
	assert_eq!(name.value(), FieldValue::Null);
}
