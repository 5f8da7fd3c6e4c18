//! Remote bot status as reported by the bot service.
//!
//! The same eight-state enum is used for bots, bot versions and aliases
//! (aliases only ever report a subset of it).

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Status of a bot, version or alias in the bot service.
///
/// - Transient: `Creating`, `Versioning`, `Importing`, `Updating` -- keep polling
/// - Stable: `Available`, `Inactive`, `Deleting` -- stop polling, fine
/// - Terminal failure: `Failed` -- stop polling, report an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotStatus {
    Creating,
    Available,
    Inactive,
    Deleting,
    Failed,
    Versioning,
    Importing,
    Updating,
}

impl BotStatus {
    pub const ALL: [BotStatus; 8] = [
        BotStatus::Creating,
        BotStatus::Available,
        BotStatus::Inactive,
        BotStatus::Deleting,
        BotStatus::Failed,
        BotStatus::Versioning,
        BotStatus::Importing,
        BotStatus::Updating,
    ];

    /// Whether the remote side is still working and the status will change
    /// without further input.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            BotStatus::Creating | BotStatus::Versioning | BotStatus::Importing | BotStatus::Updating
        )
    }

    pub fn is_failed(self) -> bool {
        self == BotStatus::Failed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BotStatus::Creating => "Creating",
            BotStatus::Available => "Available",
            BotStatus::Inactive => "Inactive",
            BotStatus::Deleting => "Deleting",
            BotStatus::Failed => "Failed",
            BotStatus::Versioning => "Versioning",
            BotStatus::Importing => "Importing",
            BotStatus::Updating => "Updating",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BotStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid bot status: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_set() {
        let transient: Vec<_> = BotStatus::ALL
            .into_iter()
            .filter(|s| s.is_transient())
            .collect();
        assert_eq!(
            transient,
            vec![
                BotStatus::Creating,
                BotStatus::Versioning,
                BotStatus::Importing,
                BotStatus::Updating
            ]
        );
    }

    #[test]
    fn test_failed_is_not_transient() {
        assert!(!BotStatus::Failed.is_transient());
        assert!(BotStatus::Failed.is_failed());
    }

    #[test]
    fn test_wire_format_is_pascal_case() {
        let json = serde_json::to_string(&BotStatus::Versioning).unwrap();
        assert_eq!(json, "\"Versioning\"");
        let parsed: BotStatus = serde_json::from_str("\"Available\"").unwrap();
        assert_eq!(parsed, BotStatus::Available);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("updating".parse::<BotStatus>().unwrap(), BotStatus::Updating);
        assert!("Building".parse::<BotStatus>().is_err());
    }
}
