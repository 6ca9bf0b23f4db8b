//! Route identifiers derived from the shape of a request.
//!
//! # Design
//! A page does not register paths. Instead every request is reduced to a
//! route identifier, and the template definition with that exact name
//! answers it. The identifier is built from:
//!
//! 1. the `hx` marker, only when the request carries `HX-Request: true`;
//! 2. the HTTP method;
//! 3. the distinct query parameter names, sorted. Values are ignored.
//!
//! joined with `-` and lowercased:
//!
//! | Request | Identifier |
//! |---|---|
//! | `GET /todos` | `get` |
//! | `GET /todos?nav=1&id=5` with `HX-Request: true` | `hx-get-id-nav` |
//! | `POST /todos` with `HX-Request: true` | `hx-post` |
//! | `DELETE /todos?ID=3` with `HX-Request: true` | `hx-delete-id` |
//!
//! Names are lowercased before they are deduplicated and sorted, so `?ID`
//! and `?id` land on the same route and the name list is always strictly
//! ascending.

use std::collections::BTreeSet;

use axum::http::{HeaderMap, Request};
use url::form_urlencoded;

/// Token prepended for partial-page (htmx) requests.
pub const PARTIAL_MARKER: &str = "hx";

/// Joins the parts of an identifier.
pub const SEPARATOR: &str = "-";

/// Header htmx sets on every request it issues.
pub const PARTIAL_HEADER: &str = "hx-request";

/// Build the route identifier from already extracted request properties.
pub fn route_id<I, S>(method: &str, partial: bool, names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: BTreeSet<String> = names
        .into_iter()
        .map(|name| name.as_ref().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut parts = Vec::with_capacity(names.len() + 2);
    if partial {
        parts.push(PARTIAL_MARKER);
    }
    parts.push(method);
    parts.extend(names.iter().map(String::as_str));
    parts.join(SEPARATOR).to_lowercase()
}

/// Distinct parameter names in a raw query string, percent-decoded.
pub fn query_names(query: Option<&str>) -> BTreeSet<String> {
    let Some(query) = query else {
        return BTreeSet::new();
    };
    form_urlencoded::parse(query.as_bytes())
        .map(|(name, _)| name.into_owned())
        .collect()
}

/// True when the client asked for a fragment instead of a full page.
pub fn is_partial(headers: &HeaderMap) -> bool {
    headers
        .get(PARTIAL_HEADER)
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Route identifier for a live request.
pub fn classify<B>(request: &Request<B>) -> String {
    route_id(
        request.method().as_str(),
        is_partial(request.headers()),
        query_names(request.uri().query()),
    )
}
