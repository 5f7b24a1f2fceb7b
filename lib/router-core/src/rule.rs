//! Path matching and rewriting strategies for proxied routes

use crate::{CoreError, Result};
use serde::Serialize;

/// Rewrite pattern forwarding the unmatched remainder of the path
pub const DEFAULT_PATH_PATTERN: &str = "/{remainder}";

/// Catch-all segment appended to stripped prefixes
pub const CATCH_ALL: &str = "{**catch-all}";

/// Matching/rewriting strategy applied to incoming request paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathRule {
    /// Requests whose path starts with `match_path` are routed and rewritten
    /// with `path_pattern`
    PrefixMatch {
        match_path: String,
        path_pattern: String,
    },
    /// Requests under `prefix` are routed; the prefix is removed before
    /// forwarding when `strip_prefix` is set
    StripPrefix { prefix: String, strip_prefix: bool },
}

/// Transform applied to a route
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Transform {
    PathPattern(String),
    PathRemovePrefix(String),
}

impl Transform {
    /// Configuration key of the transform
    pub fn key(&self) -> &'static str {
        match self {
            Transform::PathPattern(_) => "PathPattern",
            Transform::PathRemovePrefix(_) => "PathRemovePrefix",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Transform::PathPattern(v) | Transform::PathRemovePrefix(v) => v,
        }
    }
}

impl PathRule {
    /// Prefix match forwarding the remainder with the default pattern
    pub fn prefix_match(match_path: &str) -> Result<Self> {
        Self::prefix_match_with_pattern(match_path, DEFAULT_PATH_PATTERN)
    }

    pub fn prefix_match_with_pattern(match_path: &str, path_pattern: &str) -> Result<Self> {
        validate_segment_chars(match_path)?;
        if !match_path.starts_with('/') {
            return Err(CoreError::invalid_rule(match_path, "match path must start with '/'"));
        }
        validate_segment_chars(path_pattern)?;
        if !path_pattern.starts_with('/') {
            return Err(CoreError::invalid_rule(path_pattern, "path pattern must start with '/'"));
        }

        Ok(PathRule::PrefixMatch {
            match_path: match_path.to_string(),
            path_pattern: path_pattern.to_string(),
        })
    }

    /// Prefix rule; `prefix` is normalized to a single leading `/` and no
    /// trailing `/`
    pub fn strip_prefix(prefix: &str, strip_prefix: bool) -> Result<Self> {
        validate_segment_chars(prefix)?;
        let trimmed = prefix.trim_matches('/');
        if trimmed.is_empty() {
            return Err(CoreError::invalid_rule(prefix, "prefix must contain a path segment"));
        }
        if trimmed.contains("//") {
            return Err(CoreError::invalid_rule(prefix, "prefix contains an empty segment"));
        }

        Ok(PathRule::StripPrefix {
            prefix: format!("/{}", trimmed),
            strip_prefix,
        })
    }

    /// Re-run validation and normalization on a rule built directly from its
    /// variants
    pub fn validated(self) -> Result<Self> {
        match self {
            PathRule::PrefixMatch {
                match_path,
                path_pattern,
            } => Self::prefix_match_with_pattern(&match_path, &path_pattern),
            PathRule::StripPrefix {
                prefix,
                strip_prefix,
            } => Self::strip_prefix(&prefix, strip_prefix),
        }
    }

    /// Path the route matches on
    pub fn match_path(&self) -> String {
        match self {
            PathRule::PrefixMatch { match_path, .. } => match_path.clone(),
            PathRule::StripPrefix { prefix, .. } => format!("{}/{}", prefix, CATCH_ALL),
        }
    }

    /// Transforms emitted for the route
    pub fn transforms(&self) -> Vec<Transform> {
        match self {
            PathRule::PrefixMatch { path_pattern, .. } => {
                vec![Transform::PathPattern(path_pattern.clone())]
            }
            PathRule::StripPrefix {
                prefix,
                strip_prefix: true,
            } => vec![Transform::PathRemovePrefix(prefix.clone())],
            PathRule::StripPrefix { .. } => Vec::new(),
        }
    }
}

fn validate_segment_chars(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(CoreError::invalid_rule(path, "path is empty"));
    }
    if let Some(c) = path
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || *c == '?' || *c == '#')
    {
        return Err(CoreError::invalid_rule(
            path,
            &format!("path contains invalid character {:?}", c),
        ));
    }
    Ok(())
}
