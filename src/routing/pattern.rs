//! Route pattern compilation.
//!
//! # Responsibilities
//! - Split a declared pattern on `/` into segments
//! - Classify each segment as literal, capture (`{name}`) or prefixed
//!   capture (`@{name}`, `~{name}`, ...)
//! - Reject malformed patterns at registration time
//!
//! # Design Decisions
//! - Capture names are never interpreted as patterns (no regex surface)
//! - A single trailing separator is elided; any other empty segment is an error
//! - The empty pattern and `/` both compile to the root pattern

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

pub const SEPARATOR: char = '/';

/// Errors raised while compiling a route pattern.
///
/// These only occur during bootstrap and are fatal to startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unterminated capture brace in segment `{segment}` of pattern `{pattern}`")]
    UnterminatedCapture { pattern: String, segment: String },

    #[error("empty capture name in pattern `{pattern}`")]
    EmptyCaptureName { pattern: String },

    #[error("invalid capture name `{name}` in pattern `{pattern}`")]
    InvalidCaptureName { pattern: String, name: String },

    #[error("unexpected text after capture in segment `{segment}` of pattern `{pattern}`")]
    TrailingAfterCapture { pattern: String, segment: String },

    #[error("capture `{name}` declared more than once in pattern `{pattern}`")]
    DuplicateCapture { pattern: String, name: String },

    #[error("empty segment in pattern `{pattern}`")]
    EmptySegment { pattern: String },
}

/// One compiled segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact, case-sensitive text.
    Literal(String),
    /// Any non-empty segment, bound under the given name.
    Capture(String),
    /// A segment that starts with `prefix`; the remainder is bound.
    PrefixedCapture { prefix: char, name: String },
}

impl Segment {
    /// Capture name bound by this segment, if any.
    pub fn capture_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Capture(name) | Segment::PrefixedCapture { name, .. } => Some(name),
        }
    }

    /// Match a single path segment, returning the captured value if the
    /// segment binds one.
    pub(crate) fn match_segment<'p>(&self, actual: &'p str) -> SegmentMatch<'p> {
        match self {
            Segment::Literal(text) if text == actual => SegmentMatch::Literal,
            Segment::Literal(_) => SegmentMatch::Mismatch,
            Segment::Capture(_) if actual.is_empty() => SegmentMatch::Mismatch,
            Segment::Capture(_) => SegmentMatch::Captured(actual),
            Segment::PrefixedCapture { prefix, .. } => match actual.strip_prefix(*prefix) {
                Some(rest) if !rest.is_empty() => SegmentMatch::Captured(rest),
                _ => SegmentMatch::Mismatch,
            },
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "{}", text),
            Segment::Capture(name) => write!(f, "{{{}}}", name),
            Segment::PrefixedCapture { prefix, name } => write!(f, "{}{{{}}}", prefix, name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentMatch<'p> {
    Literal,
    Captured(&'p str),
    Mismatch,
}

/// A compiled route pattern: an ordered list of segment descriptors.
///
/// A pattern with no segments matches only the root path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern string such as `/post/{postId}/comment/{commentId}`.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        let parts = split_path(pattern).ok_or_else(|| PatternError::EmptySegment {
            pattern: pattern.to_string(),
        })?;

        for part in parts {
            let segment = classify(pattern, part)?;
            if let Some(name) = segment.capture_name() {
                if !seen.insert(name.to_string()) {
                    return Err(PatternError::DuplicateCapture {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Capture names in the order they appear in the pattern.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::capture_name)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Split a pattern or request path into segments.
///
/// One leading and one trailing separator are ignored. Returns `None` when
/// an empty segment remains (e.g. `/a//b` or `/user//`).
pub(crate) fn split_path(path: &str) -> Option<Vec<&str>> {
    let trimmed = path.strip_prefix(SEPARATOR).unwrap_or(path);
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    let trimmed = trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

fn classify(pattern: &str, segment: &str) -> Result<Segment, PatternError> {
    if segment.starts_with('{') {
        let name = capture_body(pattern, segment, &segment[1..])?;
        return Ok(Segment::Capture(name));
    }

    let mut chars = segment.chars();
    if let (Some(marker), Some('{')) = (chars.next(), chars.next()) {
        if is_marker(marker) {
            let body = &segment[marker.len_utf8() + 1..];
            let name = capture_body(pattern, segment, body)?;
            return Ok(Segment::PrefixedCapture {
                prefix: marker,
                name,
            });
        }
    }

    Ok(Segment::Literal(segment.to_string()))
}

/// Parse `name}` (the text after an opening brace) into a capture name.
fn capture_body(pattern: &str, segment: &str, body: &str) -> Result<String, PatternError> {
    let close = body.find('}').ok_or_else(|| PatternError::UnterminatedCapture {
        pattern: pattern.to_string(),
        segment: segment.to_string(),
    })?;

    let (name, rest) = (&body[..close], &body[close + 1..]);
    if !rest.is_empty() {
        return Err(PatternError::TrailingAfterCapture {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        });
    }
    if name.is_empty() {
        return Err(PatternError::EmptyCaptureName {
            pattern: pattern.to_string(),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PatternError::InvalidCaptureName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn is_marker(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '{' | '}' | SEPARATOR)
}
