/*
 * Responsibility
 * - "source:name[,source:name...]" lookup spec parsing
 * - pull the raw token out of a request (header / query / path param / cookie)
 * - declaration order is significant: first non-empty hit wins
 */
use axum::body::Body;
use axum::extract::RawPathParams;
use axum::http::{HeaderMap, Request};

use super::config::AuthConfigError;

/// One place to look for a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Header(String),
    Query(String),
    Param(String),
    Cookie(String),
}

/// Parse a lookup spec such as `"header:Authorization,query:token"`.
///
/// Unknown sources and malformed entries are configuration errors, surfaced
/// at construction time.
pub fn parse_token_lookup(spec: &str) -> Result<Vec<TokenSource>, AuthConfigError> {
    let mut sources = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        let (source, name) = entry
            .split_once(':')
            .ok_or_else(|| AuthConfigError::InvalidTokenLookup(entry.to_string()))?;

        if name.is_empty() {
            return Err(AuthConfigError::InvalidTokenLookup(entry.to_string()));
        }

        let name = name.to_string();
        sources.push(match source {
            "header" => TokenSource::Header(name),
            "query" => TokenSource::Query(name),
            "param" => TokenSource::Param(name),
            "cookie" => TokenSource::Cookie(name),
            _ => return Err(AuthConfigError::InvalidTokenLookup(entry.to_string())),
        });
    }

    if sources.is_empty() {
        return Err(AuthConfigError::InvalidTokenLookup(spec.to_string()));
    }

    Ok(sources)
}

/// Run the configured sources in order; the first non-empty token wins.
pub fn extract(
    sources: &[TokenSource],
    scheme: &str,
    req: &Request<Body>,
    params: &RawPathParams,
) -> Option<String> {
    sources.iter().find_map(|source| match source {
        TokenSource::Header(name) => from_header(req.headers(), name, scheme),
        TokenSource::Query(name) => from_query(req.uri().query(), name),
        TokenSource::Param(name) => from_param(params, name),
        TokenSource::Cookie(name) => from_cookie(req.headers(), name),
    })
}

/// Header value must be `"{scheme} {token}"` with a non-empty token.
fn from_header(headers: &HeaderMap, name: &str, scheme: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?;
    let token = value.strip_prefix(scheme)?.strip_prefix(' ')?;
    (!token.is_empty()).then(|| token.to_string())
}

fn from_query(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn from_param(params: &RawPathParams, name: &str) -> Option<String> {
    params
        .iter()
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn from_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get("cookie")?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}
