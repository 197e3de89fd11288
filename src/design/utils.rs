use lazy_static::lazy_static;
use regex::Regex;

use super::DesignError;

lazy_static! {
	static ref VALID_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][0-9a-zA-Z_]*$").unwrap();
}

/// Checks whether a name can be used for a design item
pub(super) fn is_name_valid(name: &str) -> bool {
	VALID_NAME_REGEX.is_match(name)
}

pub(super) fn validate_name(name: &str) -> Result<(), DesignError> {
	if is_name_valid(name) {
		Ok(())
	}
	else {
		Err(DesignError::InvalidName)
	}
}
