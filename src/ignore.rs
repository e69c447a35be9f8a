//! Path filters for tree digests.
//!
//! A filter decides whether a path, relative to the digest root, is left out
//! of the digest. Filters are immutable once built and hold no shared state,
//! so one filter may serve any number of concurrent digests.
//!
//! [`IgnorePatterns`] implements glob-style ignore rules:
//!
//! - `*` matches any run of characters except `/`
//! - `**` matches across segments; `**/` may match no segment at all
//! - `?` matches one character except `/`
//! - `[...]` is a character class, `[!...]` its negation
//! - `\` escapes the next character
//! - a leading `!` re-includes paths matched by earlier patterns
//!
//! A path is ignored when it, or any of its ancestor directories, matches.
//! When several patterns apply, the last one wins.

use crate::error::PatternError;
use crate::tree::walker::slash_path;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Decides whether a path is excluded from a digest.
pub trait PathFilter: Send + Sync {
    /// `relative` is the path below the digest root.
    fn is_excluded(&self, relative: &Path) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_excluded(&self, relative: &Path) -> bool {
        self(relative)
    }
}

/// Filters composed by OR-of-rejections: a path is excluded if any filter excludes it.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn PathFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl PathFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn with_boxed(mut self, filter: Box<dyn PathFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl PathFilter for FilterChain {
    fn is_excluded(&self, relative: &Path) -> bool {
        self.filters.iter().any(|f| f.is_excluded(relative))
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Pattern {
    exclusion: bool,
    regex: Regex,
}

impl Pattern {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Compiled glob-style ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Pattern>,
}

impl IgnorePatterns {
    /// Compile patterns. Blank patterns are skipped.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for raw in patterns {
            let trimmed = raw.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let (exclusion, body) = match trimmed.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, trimmed),
            };
            let cleaned = clean_pattern(body);
            if exclusion && cleaned.is_empty() {
                return Err(PatternError::IllegalExclusion(trimmed.to_string()));
            }
            let regex_src = glob_to_regex(&cleaned)?;
            let regex = Regex::new(&regex_src).map_err(|source| PatternError::Regex {
                pattern: trimmed.to_string(),
                source,
            })?;
            compiled.push(Pattern { exclusion, regex });
        }
        Ok(Self { patterns: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a `/`-separated relative path, or one of its ancestors, is ignored.
    pub fn matches(&self, path: &str) -> bool {
        let path = clean_pattern(path);
        let ancestors = ancestor_paths(&path);

        let mut matched = false;
        for pattern in &self.patterns {
            // An inclusion cannot change an already matched path, and an
            // exclusion cannot change an unmatched one.
            if pattern.exclusion != matched {
                continue;
            }
            let hit = pattern.matches(&path) || ancestors.iter().any(|a| pattern.matches(a));
            if hit {
                matched = !pattern.exclusion;
            }
        }
        matched
    }
}

impl PathFilter for IgnorePatterns {
    fn is_excluded(&self, relative: &Path) -> bool {
        self.matches(&slash_path(relative))
    }
}

/// `a/b/c` -> `["a", "a/b"]`
fn ancestor_paths(path: &str) -> Vec<&str> {
    path.match_indices('/').map(|(i, _)| &path[..i]).collect()
}

/// Lexical cleanup: drops empty and `.` segments and folds `..`.
fn clean_pattern(pattern: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in pattern.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn glob_to_regex(pattern: &str) -> Result<String, PatternError> {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                    }
                    if chars.peek().is_none() {
                        out.push_str(".*");
                    } else {
                        out.push_str("(.*/)?");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| PatternError::TrailingEscape(pattern.to_string()))?;
                out.push_str(&regex::escape(escaped.encode_utf8(&mut [0u8; 4])));
            }
            '[' => {
                let mut class = String::from("[");
                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    class.push('^');
                }
                let mut closed = false;
                let mut first = true;
                while let Some(c) = chars.next() {
                    match c {
                        ']' if !first => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            let escaped = chars
                                .next()
                                .ok_or_else(|| PatternError::TrailingEscape(pattern.to_string()))?;
                            class.push('\\');
                            class.push(escaped);
                        }
                        '[' | ']' | '&' | '~' => {
                            class.push('\\');
                            class.push(c);
                        }
                        _ => class.push(c),
                    }
                    first = false;
                }
                if !closed {
                    return Err(PatternError::UnterminatedClass(pattern.to_string()));
                }
                class.push(']');
                out.push_str(&class);
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }

    out.push('$');
    Ok(out)
}
