use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// Content and storage identifiers are opaque strings (`"adab-1"`, `"user_…"`).
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }
    };
}

string_id!(
    /// Unique identifier for a question within the content set.
    QuestionId
);
string_id!(
    /// Unique identifier for a quiz category.
    CategoryId
);
string_id!(
    /// Unique identifier for a study topic.
    TopicId
);
string_id!(
    /// Unique identifier for a user.
    UserId
);
string_id!(
    /// Unique identifier for a persisted score record.
    ScoreId
);
string_id!(
    /// Identifies what a score was earned on: a category id, or `"test"`.
    SessionId
);

impl UserId {
    /// Generates a fresh `user_<uuid>` identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("user_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl ScoreId {
    /// Generates a fresh `score_<uuid>` identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("score_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl SessionId {
    /// Session id shared by every cross-category test run.
    pub const TEST: &'static str = "test";

    #[must_use]
    pub fn test() -> Self {
        Self(Self::TEST.to_owned())
    }

    #[must_use]
    pub fn is_test(&self) -> bool {
        self.0 == Self::TEST
    }
}

impl From<&CategoryId> for SessionId {
    fn from(id: &CategoryId) -> Self {
        Self(id.0.clone())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
