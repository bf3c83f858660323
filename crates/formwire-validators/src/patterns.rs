//! Format patterns for `email`, `url` and `phone`

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?i)^(([^<>()\[\]\.,;:\s@"]+(\.[^<>()\[\]\.,;:\s@"]+)*)|(".+"))@(([^<>()\[\]\.,;:\s@"]+\.)+[^<>()\[\]\.,;:\s@"]{2,})$"#,
	)
	.expect("Invalid email regex")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^(?:https?|ftp)://(?:[^\s:@/]+(?::[^\s@/]*)?@)?(?P<host>[^\s/?#:@]+)(?::\d{2,5})?(?:[/?#]\S*)?$",
	)
	.expect("Invalid URL regex")
});

static HOSTNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^(?:[a-z0-9\x{00a1}-\x{ffff}](?:[a-z0-9\x{00a1}-\x{ffff}-]{0,62}[a-z0-9\x{00a1}-\x{ffff}])?\.)+[a-z\x{00a1}-\x{ffff}]{2,}\.?$",
	)
	.expect("Invalid hostname regex")
});

static PHONE_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[0-9+\- ]*[0-9][0-9+\- ]*$").expect("Invalid phone regex"));

pub fn is_email(value: &str) -> bool {
	EMAIL_REGEX.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
	PHONE_REGEX.is_match(value)
}

/// Accepts `http`, `https` and `ftp` URLs whose host is a public IPv4
/// address or a dotted hostname with an alphabetic top-level label.
pub fn is_url(value: &str) -> bool {
	let Some(caps) = URL_REGEX.captures(value) else {
		return false;
	};
	let host = &caps["host"];
	if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
		return host.parse::<Ipv4Addr>().is_ok_and(is_public_ipv4);
	}
	HOSTNAME_REGEX.is_match(host)
}

/// Unicast, non-private, non-loopback, non-link-local addresses whose
/// last octet is neither the network nor the broadcast address.
fn is_public_ipv4(ip: Ipv4Addr) -> bool {
	let [a, b, _, d] = ip.octets();
	if !(1..=223).contains(&a) || d == 0 || d == 255 {
		return false;
	}
	!(ip.is_private() || ip.is_loopback() || ip.is_link_local() || (a == 192 && b == 0))
}
