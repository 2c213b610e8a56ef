use serde::{Deserialize, Serialize};
use std::fmt;

/// A coin variety search term, e.g. `1909-S VDB`.
///
/// Never blank. The text is kept exactly as given, surrounding whitespace
/// included, so queries and output match the caller's cell. Duplicates are
/// allowed and each one is searched independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Variety(String);

impl Variety {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Keep the usable entries of a raw list, preserving input order.
    pub fn collect_valid<I, S>(raw: I) -> Vec<Variety>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .filter_map(|value| Variety::parse(value.as_ref()))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Variety {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Variety::parse(&value).ok_or_else(|| "variety must not be empty".to_string())
    }
}

impl From<Variety> for String {
    fn from(variety: Variety) -> Self {
        variety.0
    }
}

impl AsRef<str> for Variety {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
