//! Message text helpers

/// Replaces `{name}` placeholders with the matching parameter.
///
/// Unknown placeholders are left untouched.
///
/// # Examples
///
/// ```
/// use formwire_core::text::interpolate;
///
/// let text = interpolate(
///     "The {attribute} must be at least {min} characters.",
///     &[("attribute", "name"), ("min", "3")],
/// );
/// assert_eq!(text, "The name must be at least 3 characters.");
/// ```
pub fn interpolate<K, V>(template: &str, params: &[(K, V)]) -> String
where
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut out = String::with_capacity(template.len());
	let mut rest = template;
	while let Some(start) = rest.find('{') {
		out.push_str(&rest[..start]);
		let after = &rest[start + 1..];
		match after.find('}') {
			Some(end) => {
				let name = &after[..end];
				match params.iter().find(|(k, _)| k.as_ref() == name) {
					Some((_, value)) => out.push_str(value.as_ref()),
					None => {
						out.push('{');
						out.push_str(name);
						out.push('}');
					}
				}
				rest = &after[end + 1..];
			}
			None => {
				out.push_str(&rest[start..]);
				rest = "";
			}
		}
	}
	out.push_str(rest);
	out
}

/// Turns an input name into words: `password_confirmation` becomes
/// `password confirmation`.
pub fn humanize(name: &str) -> String {
	name.replace(['_', '-'], " ").trim().to_string()
}

/// Upper-cases the first letter of each space-separated word and
/// lower-cases the rest.
///
/// # Examples
///
/// ```
/// use formwire_core::text::title_case;
///
/// assert_eq!(title_case("first name"), "First Name");
/// assert_eq!(title_case("EMAIL"), "Email");
/// ```
pub fn title_case(s: &str) -> String {
	s.to_lowercase()
		.split(' ')
		.map(|word| {
			let mut chars = word.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}
