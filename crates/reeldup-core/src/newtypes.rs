//! Validated newtype wrappers for catalog identifiers and genre codes.
//!
//! Each newtype enforces a shape constraint at construction time via
//! [`TryFrom<&str>`]. Once constructed, the inner value is immutable (no
//! `DerefMut`). Serde `Deserialize` impls re-run validation so invalid data
//! cannot enter the type system from untrusted input.
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// The literal token used by catalog exports for "unknown / not applicable".
pub const UNKNOWN_TOKEN: &str = "\\N";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    #[error("invalid {type_name}: expected {expected}, got {got:?}")]
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

// ---------------------------------------------------------------------------
// Regex statics
//
// The patterns are literals, so compilation cannot fail; `None` only exists
// because the workspace bans `expect()` and would reject every input.
// ---------------------------------------------------------------------------

/// One or more non-whitespace characters.
static MOVIE_ID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\S+$").ok());

/// A genre code: no whitespace and no list separator.
static GENRE_CODE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[^\s,]+$").ok());

fn shape_ok(re: &LazyLock<Option<Regex>>, s: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(s))
}

// ---------------------------------------------------------------------------
// MovieId
// ---------------------------------------------------------------------------

/// Catalog-unique identifier of a movie record (e.g. `tt0111161`).
///
/// Ordering is plain lexicographic string ordering. The representative of an
/// equivalence class is the minimum id under this ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovieId(String);

impl TryFrom<&str> for MovieId {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if shape_ok(&MOVIE_ID_RE, s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "MovieId",
                expected: "non-empty string without whitespace",
                got: s.to_owned(),
            })
        }
    }
}

impl MovieId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for MovieId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MovieId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// GenreCode
// ---------------------------------------------------------------------------

/// A genre bucket key.
///
/// [`GenreCode::Unknown`] is the wildcard bucket: its members are eligible to
/// match records of every genre. It sorts before every known code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenreCode {
    /// Genre not recorded (`\N` in catalog exports).
    Unknown,
    /// A concrete genre such as `Drama`.
    Known(String),
}

impl GenreCode {
    /// Returns `true` for the wildcard bucket.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl TryFrom<&str> for GenreCode {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s == UNKNOWN_TOKEN {
            return Ok(Self::Unknown);
        }
        if shape_ok(&GENRE_CODE_RE, s) {
            Ok(Self::Known(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "GenreCode",
                expected: "non-empty token without whitespace or commas",
                got: s.to_owned(),
            })
        }
    }
}

impl fmt::Display for GenreCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str(UNKNOWN_TOKEN),
            Self::Known(code) => f.write_str(code),
        }
    }
}

impl Serialize for GenreCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GenreCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    // -- MovieId -------------------------------------------------------------

    #[test]
    fn movie_id_accepts_imdb_style() {
        let id = MovieId::try_from("tt0111161").expect("valid id");
        assert_eq!(&*id, "tt0111161");
        assert_eq!(id.to_string(), "tt0111161");
    }

    #[test]
    fn movie_id_rejects_empty() {
        let err = MovieId::try_from("").expect_err("empty id must be rejected");
        assert!(err.to_string().contains("MovieId"));
    }

    #[test]
    fn movie_id_rejects_embedded_whitespace() {
        assert!(MovieId::try_from("tt 01").is_err());
        assert!(MovieId::try_from("tt\t01").is_err());
        assert!(MovieId::try_from(" tt01").is_err());
    }

    #[test]
    fn movie_id_orders_lexicographically() {
        let a = MovieId::try_from("tt0000009").expect("valid");
        let b = MovieId::try_from("tt0000010").expect("valid");
        assert!(a < b);
    }

    #[test]
    fn movie_id_serde_revalidates() {
        let ok: MovieId = serde_json::from_str("\"tt1\"").expect("valid id");
        assert_eq!(ok.as_str(), "tt1");
        let bad: Result<MovieId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }

    // -- GenreCode -----------------------------------------------------------

    #[test]
    fn genre_unknown_token_parses_to_wildcard() {
        let g = GenreCode::try_from("\\N").expect("valid");
        assert!(g.is_unknown());
        assert_eq!(g.to_string(), "\\N");
    }

    #[test]
    fn genre_known_code_round_trips_display() {
        let g = GenreCode::try_from("Drama").expect("valid");
        assert_eq!(g, GenreCode::Known("Drama".to_owned()));
        assert_eq!(g.to_string(), "Drama");
    }

    #[test]
    fn genre_rejects_list_separator() {
        assert!(GenreCode::try_from("Drama,Comedy").is_err());
        assert!(GenreCode::try_from("").is_err());
    }

    #[test]
    fn genre_unknown_sorts_first() {
        let unknown = GenreCode::Unknown;
        let action = GenreCode::Known("Action".to_owned());
        assert!(unknown < action);
    }
}
