//! Link target validation.
//!
//! A link is a named route reference (`namespace:name`), optionally
//! followed by a single query string. It must resolve in the route table.

use regex::Regex;
use std::sync::LazyLock;

use crate::prelude::*;
use agora_types::content::ContentResolver;

static LINK_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
	Regex::new(r"^[\w-]+(?::[\w-]+)*(?:\?[^?#\s]*)?$")
});

fn invalid(link: &str) -> Error {
	debug!(link = %link, "Rejected link target");
	Error::ValidationError("This link is not valid.".into())
}

/// Syntax only: `name(:name)*` with at most one query string.
pub fn check_link_syntax(link: &str) -> AgResult<()> {
	let re = LINK_RE
		.as_ref()
		.map_err(|err| Error::Internal(format!("link pattern does not compile: {}", err)))?;
	if re.is_match(link) { Ok(()) } else { Err(invalid(link)) }
}

/// Syntax plus resolution through the route table.
pub fn validate_link(link: &str, content: &dyn ContentResolver) -> AgResult<()> {
	check_link_syntax(link)?;
	if content.route_url(link).is_none() {
		return Err(invalid(link));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use agora_core::routes::RouteTable;

	#[test]
	fn test_link_syntax() {
		assert!(check_link_syntax("minutes:list?groupid=7").is_ok());
		assert!(check_link_syntax("a:b:c").is_ok());
		assert!(check_link_syntax("polls:index?kekse?kekse2").is_err());
		assert!(check_link_syntax("https://example.com/").is_err());
	}

	#[test]
	fn test_link_validation() {
		let routes = RouteTable::new(
			[("index", "/"), ("polls:index", "/polls/"), ("minutes:list", "/minutes/")],
			"/documents/",
		);

		for link in ["polls:index", "minutes:list?groupid=7", "index"] {
			assert!(validate_link(link, &routes).is_ok(), "{} should be accepted", link);
		}
		for link in ["www.example.com", "polls:index?kekse?kekse2", "polls:unknown", ""] {
			assert!(
				matches!(validate_link(link, &routes), Err(Error::ValidationError(_))),
				"{} should be rejected",
				link
			);
		}
	}
}

// vim: ts=4
