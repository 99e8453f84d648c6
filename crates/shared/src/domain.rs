use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MatterId);

/// Workflow stage of a matter. Declaration order is the board column order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatterStatus {
    #[default]
    Collection,
    Culling,
    Review,
    Production,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown matter status '{0}'")]
pub struct UnknownStatus(pub String);

impl MatterStatus {
    pub const ALL: [MatterStatus; 5] = [
        MatterStatus::Collection,
        MatterStatus::Culling,
        MatterStatus::Review,
        MatterStatus::Production,
        MatterStatus::Inactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MatterStatus::Collection => "COLLECTION",
            MatterStatus::Culling => "CULLING",
            MatterStatus::Review => "REVIEW",
            MatterStatus::Production => "PRODUCTION",
            MatterStatus::Inactive => "INACTIVE",
        }
    }

    /// Column heading shown on the board.
    pub fn label(self) -> &'static str {
        match self {
            MatterStatus::Collection => "Collection",
            MatterStatus::Culling => "Culling",
            MatterStatus::Review => "Review",
            MatterStatus::Production => "Production",
            MatterStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for MatterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatterStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatterStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matter {
    pub id: MatterId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: MatterStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Matter {
    pub fn new(id: MatterId, name: impl Into<String>, status: MatterStatus) -> Self {
        Self {
            id,
            name: name.into(),
            number: None,
            client_name: None,
            status,
            created_at: None,
            updated_at: None,
        }
    }
}

/// A `null` status is treated like a missing one.
fn status_or_default<'de, D>(deserializer: D) -> Result<MatterStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MatterStatus>::deserialize(deserializer)?.unwrap_or_default())
}
