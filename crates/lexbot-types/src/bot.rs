use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::status::BotStatus;

/// Identifier the bot service assigns to a bot (e.g. "X1VYHNVBJV").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(pub String);

impl BotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a bot alias (e.g. "C7PGMSD1KT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasId(pub String);

impl AliasId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bot version.
///
/// `Draft` is the mutable working copy every edit lands in. It is never
/// servable through an alias. `Numbered` versions are immutable snapshots
/// produced by publishing the draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BotVersion {
    Draft,
    Numbered(String),
}

impl BotVersion {
    /// Wire value of the draft version.
    pub const DRAFT: &'static str = "DRAFT";

    pub fn as_str(&self) -> &str {
        match self {
            BotVersion::Draft => Self::DRAFT,
            BotVersion::Numbered(n) => n,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, BotVersion::Draft)
    }
}

impl fmt::Display for BotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("bot version cannot be empty".to_string());
        }
        if s.eq_ignore_ascii_case(Self::DRAFT) {
            Ok(BotVersion::Draft)
        } else {
            Ok(BotVersion::Numbered(s.to_string()))
        }
    }
}

impl Serialize for BotVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BotVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Locale identifier such as `pt_BR` or `en_US`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleId(pub String);

impl LocaleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert the service's epoch-seconds timestamps into UTC datetimes.
fn epoch_to_datetime(secs: Option<f64>) -> Option<DateTime<Utc>> {
    let secs = secs?;
    DateTime::from_timestamp(secs.trunc() as i64, (secs.fract() * 1e9) as u32)
}

/// A bot as returned by the listing and describe operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSummary {
    pub bot_id: BotId,
    pub bot_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub bot_status: BotStatus,
    #[serde(default)]
    pub latest_bot_version: Option<String>,
    #[serde(default)]
    pub last_updated_date_time: Option<f64>,
}

impl BotSummary {
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.last_updated_date_time)
    }
}

/// An immutable bot version snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub bot_version: BotVersion,
    #[serde(default)]
    pub description: Option<String>,
    pub bot_status: BotStatus,
    #[serde(default)]
    pub creation_date_time: Option<f64>,
}

impl VersionSummary {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.creation_date_time)
    }
}

/// A named pointer to exactly one bot version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotAlias {
    pub bot_alias_id: AliasId,
    pub bot_alias_name: String,
    #[serde(default)]
    pub bot_version: Option<BotVersion>,
    #[serde(default)]
    pub bot_alias_status: Option<BotStatus>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Everything needed to address one locale of one alias of a bot.
///
/// The alias is addressed by id for management calls and by name for
/// runtime calls, so both are carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotTarget {
    pub bot_id: BotId,
    pub bot_name: String,
    pub alias_id: AliasId,
    pub alias_name: String,
    pub locale: LocaleId,
}

/// The draft (or a version) of one locale of a bot: the parent scope of
/// intents and slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleScope {
    pub bot_id: BotId,
    pub version: BotVersion,
    pub locale: LocaleId,
}

impl LocaleScope {
    pub fn draft(bot_id: BotId, locale: LocaleId) -> Self {
        Self {
            bot_id,
            version: BotVersion::Draft,
            locale,
        }
    }
}

/// Request to create a bot from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBotRequest {
    pub bot_name: String,
    pub alias_name: String,
    pub locale: LocaleId,
    pub role_arn: String,
    /// Seconds the service retains conversation context for an idle session.
    pub idle_session_ttl_secs: u32,
    /// Minimum NLU confidence before the fallback intent is inserted.
    pub nlu_confidence_threshold: f64,
}
