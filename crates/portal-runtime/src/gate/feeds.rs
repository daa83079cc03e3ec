//! Whitelisted privileged operations.
//!
//! These are the site-wide aggregations with no single owning
//! principal. They are the only reads that go through the gate.
//!
//! | Operation | Collection | Order |
//! |-----------|------------|-------|
//! | [`list_terms`] | terms | `start_date` ascending |
//! | [`news_feed`] | news | `published_at` descending |
//! | [`spotlight_gallery`] | gallery (`spotlight = true`) | `created_at` descending |
//!
//! Rows without a parseable timestamp sort last.

use super::PrivilegedGate;
use crate::store::Record;
use crate::PortalError;
use chrono::{DateTime, NaiveDate, Utc};
use portal_auth::RowAttributes;
use portal_types::Collection;
use std::cmp::Ordering;

pub const START_DATE: &str = "start_date";
pub const PUBLISHED_AT: &str = "published_at";
pub const CREATED_AT: &str = "created_at";
pub const SPOTLIGHT: &str = "spotlight";

/// Returns every term, earliest first.
///
/// # Errors
///
/// [`PortalError::UpstreamUnavailable`] when the store fails.
pub fn list_terms(gate: &PrivilegedGate) -> Result<Vec<Record>, PortalError> {
    let mut terms = gate.with_privileged_access("list_terms", |access| {
        access.select_all(Collection::Terms)
    })?;
    terms.sort_by(|a, b| by_timestamp(a, b, START_DATE));
    Ok(terms)
}

/// Returns the `limit` most recently published news items.
///
/// # Errors
///
/// [`PortalError::UpstreamUnavailable`] when the store fails.
pub fn news_feed(gate: &PrivilegedGate, limit: usize) -> Result<Vec<Record>, PortalError> {
    let mut news = gate.with_privileged_access("news_feed", |access| {
        access.select_all(Collection::News)
    })?;
    news.sort_by(|a, b| newest_first(a, b, PUBLISHED_AT));
    news.truncate(limit);
    Ok(news)
}

/// Returns the `limit` newest spotlighted gallery photos.
///
/// # Errors
///
/// [`PortalError::UpstreamUnavailable`] when the store fails.
pub fn spotlight_gallery(gate: &PrivilegedGate, limit: usize) -> Result<Vec<Record>, PortalError> {
    let mut photos = gate.with_privileged_access("spotlight_gallery", |access| {
        access.select_all(Collection::Gallery)
    })?;
    photos.retain(is_spotlight);
    photos.sort_by(|a, b| newest_first(a, b, CREATED_AT));
    photos.truncate(limit);
    Ok(photos)
}

fn is_spotlight(row: &Record) -> bool {
    row.attribute(SPOTLIGHT)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Parses RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn timestamp(row: &Record, column: &str) -> Option<DateTime<Utc>> {
    let raw = row.attribute(column)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Ascending by `column`; rows without a timestamp after all others.
fn by_timestamp(a: &Record, b: &Record, column: &str) -> Ordering {
    match (timestamp(a, column), timestamp(b, column)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by `column`; rows without a timestamp still last.
fn newest_first(a: &Record, b: &Record, column: &str) -> Ordering {
    match (timestamp(a, column), timestamp(b, column)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
