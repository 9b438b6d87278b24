//! Input checks run before anything is fetched.

use crate::error::{ErrorKind, Result};
use regex::Regex;
use std::sync::LazyLock;

static PERMIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d+$").unwrap());

/// A two-letter state code, uppercased.
pub(crate) fn state(state: &str) -> Result<String> {
    let state = state.trim();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        exn::bail!(ErrorKind::InvalidInput(format!("state must be a two-letter code, got {state:?}")));
    }
    Ok(state.to_ascii_uppercase())
}

/// A four-digit year.
pub(crate) fn year(year: i32) -> Result<i32> {
    if !(1000..=9999).contains(&year) {
        exn::bail!(ErrorKind::InvalidInput(format!("year must have four digits, got {year}")));
    }
    Ok(year)
}

/// A permit number such as `2020-26`.
pub(crate) fn permit(permit: &str) -> Result<&str> {
    let permit = permit.trim();
    if !PERMIT_REGEX.is_match(permit) {
        exn::bail!(ErrorKind::InvalidInput(format!("permit must look like YYYY-N, got {permit:?}")));
    }
    Ok(permit)
}

/// A numeric site id (race id, load-info id).
pub(crate) fn numeric_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        exn::bail!(ErrorKind::InvalidInput(format!("{name} must be numeric, got {id:?}")));
    }
    Ok(id)
}
