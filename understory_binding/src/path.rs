// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property paths into data sources, and prefix matching between them.
//!
//! A [`PropertyPath`] is an ordered list of [`PathPart`]s. Bindings resolve to
//! one path into their data source; sources that report explicit changes
//! report them as paths too. A change at `items` is relevant to a binding on
//! `items[3].label` because the former is a prefix of the latter
//! (see [`is_prefix`]).

use alloc::sync::Arc;
use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;

/// Paths deeper than this spill to the heap.
const INLINE_PARTS: usize = 4;

/// One step of a [`PropertyPath`].
///
/// Equality is kind-sensitive: `Name("0")`, `Index(0)` and `Key("0")` are all
/// distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathPart {
    /// A named member, such as a struct field.
    Name(Arc<str>),
    /// A position in a list.
    Index(usize),
    /// An entry in a keyed collection.
    Key(Arc<str>),
}

impl PathPart {
    /// Creates a [`PathPart::Name`].
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self::Name(Arc::from(name))
    }

    /// Creates a [`PathPart::Key`].
    #[must_use]
    pub fn key(key: &str) -> Self {
        Self::Key(Arc::from(key))
    }

    /// Returns `true` if both parts are of the same kind and carry the same value.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Name(a), Self::Name(b)) => a == b,
            (Self::Index(a), Self::Index(b)) => a == b,
            (Self::Key(a), Self::Key(b)) => a == b,
            _ => false,
        }
    }
}

/// An immutable, ordered path into a data source.
///
/// # Example
///
/// ```rust
/// use understory_binding::PropertyPath;
///
/// let items = PropertyPath::new().with_name("items");
/// let label: PropertyPath = "items[3].label".parse().unwrap();
///
/// assert!(items.is_prefix_of(&label));
/// assert!(!label.is_prefix_of(&items));
/// assert_eq!(label.to_string(), "items[3].label");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    parts: SmallVec<[PathPart; INLINE_PARTS]>,
}

impl PropertyPath {
    /// Creates the empty path, which addresses the whole source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path from its parts.
    #[must_use]
    pub fn from_parts(parts: impl IntoIterator<Item = PathPart>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }

    /// Returns this path extended by a [`PathPart::Name`].
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.parts.push(PathPart::name(name));
        self
    }

    /// Returns this path extended by a [`PathPart::Index`].
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.parts.push(PathPart::Index(index));
        self
    }

    /// Returns this path extended by a [`PathPart::Key`].
    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        self.parts.push(PathPart::key(key));
        self
    }

    /// Returns the parts of this path, outermost first.
    #[must_use]
    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns `true` if `path` begins with every part of `self`.
    ///
    /// Equivalent to [`is_prefix(self, path)`](is_prefix).
    #[must_use]
    pub fn is_prefix_of(&self, path: &Self) -> bool {
        is_prefix(self, path)
    }

    /// Parses a path such as `items[2].label` or `lookup["key"].value`.
    ///
    /// Names are separated by `.`, indices are written `[n]` and keys
    /// `["key"]`. Keys may not contain `"`. The empty string parses to the
    /// empty path.
    ///
    /// # Errors
    ///
    /// Returns a [`PathParseError`] carrying the byte offset of the problem.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        let bytes = input.as_bytes();
        let mut path = Self::new();
        let mut pos = 0;
        // Set right after a `.`, which must be followed by a name.
        let mut expect_name = false;

        while pos < bytes.len() {
            match bytes[pos] {
                b'.' => {
                    if path.is_empty() || expect_name {
                        return Err(PathParseError::EmptyName { offset: pos });
                    }
                    expect_name = true;
                    pos += 1;
                }
                b'[' => {
                    if expect_name {
                        return Err(PathParseError::EmptyName { offset: pos });
                    }
                    pos = parse_bracket(input, pos, &mut path)?;
                }
                b']' | b'"' => return Err(unexpected(input, pos)),
                _ => {
                    if !expect_name && !path.is_empty() {
                        return Err(unexpected(input, pos));
                    }
                    let end = input[pos..]
                        .find(['.', '[', ']', '"'])
                        .map_or(input.len(), |len| pos + len);
                    path.parts.push(PathPart::name(&input[pos..end]));
                    expect_name = false;
                    pos = end;
                }
            }
        }

        if expect_name {
            return Err(PathParseError::EmptyName {
                offset: input.len(),
            });
        }
        Ok(path)
    }
}

/// Parses the bracket starting at `open`, returning the offset just past `]`.
fn parse_bracket(
    input: &str,
    open: usize,
    path: &mut PropertyPath,
) -> Result<usize, PathParseError> {
    let rest = &input[open + 1..];
    let unterminated = PathParseError::UnterminatedBracket { offset: open };

    if let Some(quoted) = rest.strip_prefix('"') {
        let key_len = quoted.find('"').ok_or_else(|| unterminated.clone())?;
        // `[` `"` key `"`
        let after_quote = open + 2 + key_len + 1;
        if input.as_bytes().get(after_quote) != Some(&b']') {
            return Err(unterminated);
        }
        path.parts.push(PathPart::key(&quoted[..key_len]));
        return Ok(after_quote + 1);
    }

    let close = rest.find(']').ok_or(unterminated)?;
    let digits = &rest[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PathParseError::InvalidIndex { offset: open + 1 });
    }
    let index = digits
        .parse::<usize>()
        .map_err(|_| PathParseError::InvalidIndex { offset: open + 1 })?;
    path.parts.push(PathPart::Index(index));
    Ok(open + 1 + close + 1)
}

fn unexpected(input: &str, offset: usize) -> PathParseError {
    PathParseError::UnexpectedCharacter {
        offset,
        found: input[offset..].chars().next().unwrap_or_default(),
    }
}

impl FromStr for PropertyPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            match part {
                PathPart::Name(name) if i == 0 => f.write_str(name)?,
                PathPart::Name(name) => write!(f, ".{name}")?,
                PathPart::Index(index) => write!(f, "[{index}]")?,
                PathPart::Key(key) => write!(f, "[\"{key}\"]")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<PathPart> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = PathPart>>(iter: I) -> Self {
        Self::from_parts(iter)
    }
}

/// Returns `true` if `path` begins with every part of `prefix`.
///
/// Parts must agree in kind and value at every position; the first mismatch
/// ends the comparison. The empty path is a prefix of every path, and every
/// path is a prefix of itself.
///
/// ```rust
/// use understory_binding::{PropertyPath, is_prefix};
///
/// let a_b = PropertyPath::new().with_name("A").with_name("B");
/// let a_b_c = a_b.clone().with_name("C");
/// let a_c = PropertyPath::new().with_name("A").with_name("C");
///
/// assert!(is_prefix(&a_b, &a_b_c));
/// assert!(!is_prefix(&a_b, &a_c));
/// ```
#[must_use]
pub fn is_prefix(prefix: &PropertyPath, path: &PropertyPath) -> bool {
    if prefix.len() > path.len() {
        return false;
    }
    prefix
        .parts
        .iter()
        .zip(path.parts.iter())
        .all(|(want, have)| want.matches(have))
}

/// Error returned by [`PropertyPath::parse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathParseError {
    /// A `.` was not followed by a name, or the path started with `.`.
    EmptyName {
        /// Byte offset of the missing name.
        offset: usize,
    },
    /// A `[` had no matching `]`, or a quoted key had no closing quote.
    UnterminatedBracket {
        /// Byte offset of the opening `[`.
        offset: usize,
    },
    /// The contents of `[...]` were neither digits nor a quoted key.
    InvalidIndex {
        /// Byte offset of the bracket contents.
        offset: usize,
    },
    /// A character appeared where it cannot start a part.
    UnexpectedCharacter {
        /// Byte offset of the character.
        offset: usize,
        /// The offending character.
        found: char,
    },
}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { offset } => write!(f, "expected a name at offset {offset}"),
            Self::UnterminatedBracket { offset } => {
                write!(f, "unterminated bracket opened at offset {offset}")
            }
            Self::InvalidIndex { offset } => write!(f, "invalid index at offset {offset}"),
            Self::UnexpectedCharacter { offset, found } => {
                write!(f, "unexpected character {found:?} at offset {offset}")
            }
        }
    }
}

impl core::error::Error for PathParseError {}
