// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token extraction from request headers.
//!
//! Clients are not consistent about the scheme marker in front of token
//! values (`Bearer <token>`, `Bearer<token>`, or a bare token), so how the
//! marker is handled is a configured [`SchemePolicy`].

use axum::http::{HeaderMap, HeaderName};

/// How a scheme marker in a token header is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemePolicy {
    /// Strip the marker when present, otherwise take the value as-is.
    #[default]
    Optional,
    /// Values without the marker are treated as absent.
    Required,
    /// Values are taken literally; nothing is stripped.
    Disabled,
}

impl SchemePolicy {
    /// Parse a policy name (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "optional" => Some(Self::Optional),
            "required" => Some(Self::Required),
            "disabled" | "none" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Read a token from `header`, applying the scheme policy.
///
/// Returns `None` for a missing, non-UTF-8 or empty value, and for a value
/// lacking the marker under [`SchemePolicy::Required`].
pub fn extract_token<'a>(
    headers: &'a HeaderMap,
    header: &HeaderName,
    scheme: &str,
    policy: SchemePolicy,
) -> Option<&'a str> {
    let raw = headers.get(header)?.to_str().ok()?.trim();

    let token = match policy {
        SchemePolicy::Disabled => raw,
        SchemePolicy::Optional => match strip_scheme(raw, scheme) {
            Some(rest) => rest,
            None => raw,
        },
        SchemePolicy::Required => strip_scheme(raw, scheme)?,
    };

    (!token.is_empty()).then_some(token)
}

fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    if scheme.is_empty() {
        return Some(value);
    }
    value.strip_prefix(scheme).map(str::trim_start)
}
