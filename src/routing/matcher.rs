//! Route matching logic.
//!
//! # Responsibilities
//! - Split request paths the same way patterns are split
//! - Compare segment-by-segment against a compiled pattern
//! - Bind captured values under their declared names
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Segment counts must be equal (no wildcards, no optional segments)
//! - Captured values are returned verbatim (no decoding)
//! - No regex to guarantee O(n) matching

use std::sync::Arc;

use crate::routing::pattern::{split_path, RoutePattern, SegmentMatch};
use crate::routing::route::{Route, RouteParams};

/// A successful match for one request. Owned by that request alone.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub route: Arc<Route>,
    pub params: RouteParams,
}

/// Request path pre-split into segments.
///
/// `None` segments means the path contains an empty segment and can match
/// nothing.
#[derive(Debug, Clone)]
pub struct RequestPath<'p> {
    segments: Option<Vec<&'p str>>,
}

impl<'p> RequestPath<'p> {
    pub fn parse(path: &'p str) -> Self {
        Self {
            segments: split_path(path),
        }
    }

    pub fn segments(&self) -> Option<&[&'p str]> {
        self.segments.as_deref()
    }
}

/// Match a pre-split path against a compiled pattern.
pub fn match_pattern(pattern: &RoutePattern, path: &RequestPath<'_>) -> Option<RouteParams> {
    let segments = path.segments()?;
    if segments.len() != pattern.segments().len() {
        return None;
    }

    let mut params = RouteParams::default();
    for (expected, actual) in pattern.segments().iter().zip(segments) {
        match expected.match_segment(actual) {
            SegmentMatch::Literal => {}
            SegmentMatch::Captured(value) => {
                // capture_name is always Some for capture segments
                if let Some(name) = expected.capture_name() {
                    params.push(name, value);
                }
            }
            SegmentMatch::Mismatch => return None,
        }
    }
    Some(params)
}

/// Try routes in order; the first full match wins.
pub fn first_match<'r, I>(routes: I, path: &RequestPath<'_>) -> Option<MatchResult>
where
    I: IntoIterator<Item = &'r Arc<Route>>,
{
    routes.into_iter().find_map(|route| {
        match_pattern(route.pattern(), path).map(|params| MatchResult {
            route: Arc::clone(route),
            params,
        })
    })
}
