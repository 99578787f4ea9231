use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new instance without validation; callers are responsible for conformity.
            pub fn new(value: String) -> Self {
                Self(value)
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype!(
    UserId,
    "Stable identifier for the user whose location is audited (non-empty, up to 128 chars).",
    r"^\S[\S ]{0,127}$"
);
newtype!(
    ServiceId,
    "Identifier for a registered emergency service (non-empty, up to 128 chars).",
    r"^\S[\S ]{0,127}$"
);
newtype!(
    OperatorId,
    "Identifier for the operator acting on behalf of a service (non-empty, up to 128 chars).",
    r"^\S[\S ]{0,127}$"
);
newtype!(
    IncidentId,
    "Identifier correlating an access with an incident (non-empty, up to 128 chars).",
    r"^\S[\S ]{0,127}$"
);
newtype!(
    ApiKey,
    "Emergency-service API key (10 to 256 chars).",
    r"^\S{10,256}$"
);
