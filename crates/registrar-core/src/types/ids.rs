use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct EventId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct RegistrationId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct SessionId(String);

/// Caller identity as issued by the external auth provider. Opaque on
/// purpose: we never mint or parse these, only require non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct UserId(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    InvalidPrefix { expected: &'static str, got: String },
    InvalidUlid { value: String },
    InvalidFormat { value: String },
    Empty,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrefix { expected, got } => {
                write!(f, "invalid prefix: expected {expected}, got {got}")
            }
            Self::InvalidUlid { value } => write!(f, "invalid ulid: {value}"),
            Self::InvalidFormat { value } => write!(f, "invalid id format: {value}"),
            Self::Empty => write!(f, "id must not be empty"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate_prefixed(value: &str, prefix: &'static str) -> Result<(), IdError> {
    let Some(rest) = value.strip_prefix(prefix) else {
        let got = value.split('_').next().unwrap_or("").to_string();
        return Err(IdError::InvalidPrefix {
            expected: prefix,
            got,
        });
    };
    if rest.len() != 26 {
        return Err(IdError::InvalidFormat {
            value: value.to_string(),
        });
    }
    Ulid::from_str(rest).map_err(|_| IdError::InvalidUlid {
        value: value.to_string(),
    })?;
    Ok(())
}

macro_rules! id_type {
    ($name:ident, $prefix:expr) => {
        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(value: String) -> Result<Self, IdError> {
                validate_prefixed(&value, Self::PREFIX)?;
                Ok(Self(value))
            }

            pub fn generate() -> Self {
                Self(format!("{}{}", Self::PREFIX, Ulid::new()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

id_type!(EventId, "evt_");
id_type!(RegistrationId, "reg_");
id_type!(SessionId, "sess_");

impl UserId {
    pub fn new(value: String) -> Result<Self, IdError> {
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_round_trip() {
        let id = EventId::generate();
        assert!(id.as_str().starts_with("evt_"));
        let parsed = EventId::from_str(id.as_str()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_wrong_prefix() {
        let err = RegistrationId::from_str("evt_01ARZ3NDEKTSV4RRFFQ69G5FAV").unwrap_err();
        assert!(matches!(err, IdError::InvalidPrefix { .. }));
    }

    #[test]
    fn rejects_short_ulid() {
        let err = EventId::from_str("evt_abc").unwrap_err();
        assert!(matches!(err, IdError::InvalidFormat { .. }));
    }

    #[test]
    fn user_id_must_not_be_blank() {
        assert!(UserId::new("  ".to_string()).is_err());
        assert!(UserId::new("auth0|12345".to_string()).is_ok());
    }
}
