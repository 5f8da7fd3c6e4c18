//! Intent and slot definitions, and the intent-definition file format.
//!
//! File format (JSON):
//!
//! ```json
//! {
//!   "OrderFlowers": {
//!     "description": "Order a bouquet",
//!     "sampleUtterances": ["I would like to order flowers"],
//!     "slots": [
//!       {
//!         "name": "FlowerType",
//!         "slotType": "FlowerTypes",
//!         "description": "Kind of flower",
//!         "valueElicitationSetting": { "slotConstraint": "Required" }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Slot order in the file is the elicitation priority (0-based).

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BotError;

/// Desired definition of one intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDefinition {
    pub description: String,
    pub sample_utterances: Vec<String>,
    pub slots: Vec<SlotDefinition>,
}

/// Desired definition of one slot of an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    pub name: String,
    /// Slot type reference (built-in such as `AMAZON.Date` or a custom type id).
    pub slot_type: String,
    pub description: String,
    /// How the bot asks for the value. Passed through to the service untouched.
    pub value_elicitation_setting: serde_json::Value,
}

/// Elicitation order of one slot within its intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPriority {
    pub priority: u32,
    pub slot_id: String,
}

/// Payload for creating or updating an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentInput {
    pub name: String,
    pub description: String,
    pub sample_utterances: Vec<String>,
    /// Empty on the first pass; filled once the slot ids are known.
    pub slot_priorities: Vec<SlotPriority>,
}

impl IntentInput {
    pub fn from_definition(name: &str, definition: &IntentDefinition) -> Self {
        Self {
            name: name.to_string(),
            description: definition.description.clone(),
            sample_utterances: definition.sample_utterances.clone(),
            slot_priorities: Vec::new(),
        }
    }
}

/// An intent as returned by the listing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSummary {
    pub intent_id: String,
    pub intent_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A slot as returned by the listing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub slot_id: String,
    pub slot_name: String,
    #[serde(default)]
    pub slot_type_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A parsed and validated intent-definition file.
///
/// Intents are kept in name order so uploads are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentFile {
    pub intents: BTreeMap<String, IntentDefinition>,
}

impl IntentFile {
    /// Parse and validate an intent-definition file.
    ///
    /// Every intent is checked before anything is returned, so a file with
    /// one bad entry is rejected as a whole and nothing is uploaded.
    pub fn parse(content: &str) -> Result<Self, BotError> {
        let RawEntries(raw) = serde_json::from_str(content)
            .map_err(|e| BotError::MalformedInput(format!("intent file is not a JSON object: {e}")))?;

        let mut intents = BTreeMap::new();
        for (name, value) in raw {
            if name.trim().is_empty() {
                return Err(BotError::MalformedInput(
                    "intent name cannot be empty".to_string(),
                ));
            }
            if intents.contains_key(&name) {
                return Err(BotError::MalformedInput(format!(
                    "intent '{name}' is defined more than once"
                )));
            }
            let definition: IntentDefinition = serde_json::from_value(value)
                .map_err(|e| BotError::MalformedInput(format!("intent '{name}': {e}")))?;
            definition.validate(&name)?;
            intents.insert(name, definition);
        }

        Ok(Self { intents })
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Top-level entries of the file in document order, duplicates included.
struct RawEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping intent names to definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl IntentDefinition {
    /// Presence checks the schema alone cannot express.
    fn validate(&self, intent_name: &str) -> Result<(), BotError> {
        let mut seen = HashSet::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.name.trim().is_empty() {
                return Err(BotError::MalformedInput(format!(
                    "intent '{intent_name}': slot #{index} has an empty name"
                )));
            }
            if slot.slot_type.trim().is_empty() {
                return Err(BotError::MalformedInput(format!(
                    "intent '{intent_name}': slot '{}' has an empty slotType",
                    slot.name
                )));
            }
            if !seen.insert(slot.name.as_str()) {
                return Err(BotError::MalformedInput(format!(
                    "intent '{intent_name}': slot '{}' is defined more than once",
                    slot.name
                )));
            }
        }
        Ok(())
    }
}
