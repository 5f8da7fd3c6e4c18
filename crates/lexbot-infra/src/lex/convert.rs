//! Conversions between AWS SDK shapes and lexbot domain types.
//!
//! Intent files carry slot elicitation settings as Lex JSON, and the
//! conversation session state travels as opaque JSON between turns. Both
//! are mapped through serde mirrors of the JSON layout onto the SDK's
//! typed builders and back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use aws_sdk_lexmodelsv2::operation::create_bot_alias::CreateBotAliasOutput;
use aws_sdk_lexmodelsv2::operation::create_bot_version::CreateBotVersionOutput;
use aws_sdk_lexmodelsv2::operation::describe_bot::DescribeBotOutput;
use aws_sdk_lexmodelsv2::operation::describe_bot_alias::DescribeBotAliasOutput;
use aws_sdk_lexmodelsv2::operation::describe_bot_version::DescribeBotVersionOutput;
use aws_sdk_lexmodelsv2::operation::update_bot_alias::UpdateBotAliasOutput;
use aws_sdk_lexmodelsv2::primitives::DateTime;
use aws_sdk_lexmodelsv2::types as models;
use aws_sdk_lexruntimev2::operation::recognize_text::RecognizeTextOutput;
use aws_sdk_lexruntimev2::types as runtime;

use lexbot_types::bot::{AliasId, BotAlias, BotId, BotSummary, BotVersion, VersionSummary};
use lexbot_types::conversation::{
    BotMessage, DialogActionType, Interpretation, RecognizedTurn, SessionState,
};
use lexbot_types::error::RemoteError;
use lexbot_types::intent::{IntentInput, IntentSummary, SlotPriority, SlotSummary};
use lexbot_types::status::BotStatus;

use super::error::{invalid_request, missing};

// ----- models: responses -----

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, RemoteError> {
    value.ok_or_else(|| missing(field))
}

pub(crate) fn bot_status(raw: Option<&str>) -> Result<BotStatus, RemoteError> {
    required(raw, "botStatus")?
        .parse()
        .map_err(RemoteError::Deserialization)
}

fn bot_version(raw: Option<&str>) -> Result<BotVersion, RemoteError> {
    required(raw, "botVersion")?
        .parse()
        .map_err(RemoteError::Deserialization)
}

fn seconds(time: Option<&DateTime>) -> Option<f64> {
    time.map(|t| t.as_secs_f64())
}

pub(crate) fn bot_summary(summary: &models::BotSummary) -> Result<BotSummary, RemoteError> {
    Ok(BotSummary {
        bot_id: BotId::new(required(summary.bot_id(), "botId")?),
        bot_name: required(summary.bot_name(), "botName")?.to_string(),
        description: summary.description().map(str::to_string),
        bot_status: bot_status(summary.bot_status().map(|s| s.as_str()))?,
        latest_bot_version: summary.latest_bot_version().map(str::to_string),
        last_updated_date_time: seconds(summary.last_updated_date_time()),
    })
}

pub(crate) fn described_bot(output: &DescribeBotOutput) -> Result<BotSummary, RemoteError> {
    Ok(BotSummary {
        bot_id: BotId::new(required(output.bot_id(), "botId")?),
        bot_name: required(output.bot_name(), "botName")?.to_string(),
        description: output.description().map(str::to_string),
        bot_status: bot_status(output.bot_status().map(|s| s.as_str()))?,
        latest_bot_version: None,
        last_updated_date_time: seconds(output.last_updated_date_time()),
    })
}

/// Version summaries come from create, describe and list responses, which
/// share accessor names but not a type.
macro_rules! version_summary {
    ($source:expr) => {{
        let source = $source;
        Ok::<_, RemoteError>(VersionSummary {
            bot_version: bot_version(source.bot_version())?,
            description: source.description().map(str::to_string),
            bot_status: bot_status(source.bot_status().map(|s| s.as_str()))?,
            creation_date_time: seconds(source.creation_date_time()),
        })
    }};
}

/// Same as [`version_summary!`] for the four alias response shapes.
macro_rules! bot_alias {
    ($source:expr) => {{
        let source = $source;
        Ok::<_, RemoteError>(BotAlias {
            bot_alias_id: AliasId::new(required(source.bot_alias_id(), "botAliasId")?),
            bot_alias_name: required(source.bot_alias_name(), "botAliasName")?.to_string(),
            bot_version: source
                .bot_version()
                .map(|v| v.parse().map_err(RemoteError::Deserialization))
                .transpose()?,
            bot_alias_status: source
                .bot_alias_status()
                .map(|s| s.as_str().parse().map_err(RemoteError::Deserialization))
                .transpose()?,
            description: source.description().map(str::to_string),
        })
    }};
}

pub(crate) fn created_version(
    output: &CreateBotVersionOutput,
) -> Result<VersionSummary, RemoteError> {
    version_summary!(output)
}

pub(crate) fn described_version(
    output: &DescribeBotVersionOutput,
) -> Result<VersionSummary, RemoteError> {
    version_summary!(output)
}

pub(crate) fn version_listing(
    summary: &models::BotVersionSummary,
) -> Result<VersionSummary, RemoteError> {
    version_summary!(summary)
}

pub(crate) fn created_alias(output: &CreateBotAliasOutput) -> Result<BotAlias, RemoteError> {
    bot_alias!(output)
}

pub(crate) fn updated_alias(output: &UpdateBotAliasOutput) -> Result<BotAlias, RemoteError> {
    bot_alias!(output)
}

pub(crate) fn described_alias(output: &DescribeBotAliasOutput) -> Result<BotAlias, RemoteError> {
    bot_alias!(output)
}

pub(crate) fn alias_listing(summary: &models::BotAliasSummary) -> Result<BotAlias, RemoteError> {
    bot_alias!(summary)
}

pub(crate) fn intent_summary(
    summary: &models::IntentSummary,
) -> Result<IntentSummary, RemoteError> {
    Ok(IntentSummary {
        intent_id: required(summary.intent_id(), "intentId")?.to_string(),
        intent_name: required(summary.intent_name(), "intentName")?.to_string(),
        description: summary.description().map(str::to_string),
    })
}

pub(crate) fn slot_summary(summary: &models::SlotSummary) -> Result<SlotSummary, RemoteError> {
    Ok(SlotSummary {
        slot_id: required(summary.slot_id(), "slotId")?.to_string(),
        slot_name: required(summary.slot_name(), "slotName")?.to_string(),
        slot_type_id: summary.slot_type_id().map(str::to_string),
        description: summary.description().map(str::to_string),
    })
}

// ----- models: requests -----

pub(crate) fn sample_utterances(
    intent: &IntentInput,
) -> Result<Vec<models::SampleUtterance>, RemoteError> {
    intent
        .sample_utterances
        .iter()
        .map(|u| {
            models::SampleUtterance::builder()
                .utterance(u)
                .build()
                .map_err(invalid_request)
        })
        .collect()
}

/// `None` when the intent has no slots, so the field is left out.
pub(crate) fn slot_priorities(
    priorities: &[SlotPriority],
) -> Result<Option<Vec<models::SlotPriority>>, RemoteError> {
    if priorities.is_empty() {
        return Ok(None);
    }
    priorities
        .iter()
        .map(|p| {
            models::SlotPriority::builder()
                .priority(i32::try_from(p.priority).map_err(invalid_request)?)
                .slot_id(&p.slot_id)
                .build()
                .map_err(invalid_request)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ElicitationJson {
    slot_constraint: String,
    #[serde(default)]
    prompt_specification: Option<PromptJson>,
    #[serde(default)]
    sample_utterances: Vec<UtteranceJson>,
    #[serde(default)]
    default_value_specification: Option<DefaultsJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptJson {
    message_groups: Vec<MessageGroupJson>,
    max_retries: i32,
    #[serde(default)]
    allow_interrupt: Option<bool>,
    #[serde(default)]
    message_selection_strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageGroupJson {
    message: MessageJson,
    #[serde(default)]
    variations: Vec<MessageJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageJson {
    #[serde(default)]
    plain_text_message: Option<TextJson>,
    #[serde(default)]
    ssml_message: Option<TextJson>,
    #[serde(default)]
    custom_payload: Option<TextJson>,
}

#[derive(Debug, Deserialize)]
struct TextJson {
    value: String,
}

#[derive(Debug, Deserialize)]
struct UtteranceJson {
    utterance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsJson {
    default_value_list: Vec<DefaultJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefaultJson {
    default_value: String,
}

fn prompt_message(message: MessageJson) -> Result<models::Message, RemoteError> {
    let mut builder = models::Message::builder();
    if let Some(text) = message.plain_text_message {
        builder = builder.plain_text_message(
            models::PlainTextMessage::builder()
                .value(text.value)
                .build()
                .map_err(invalid_request)?,
        );
    }
    if let Some(ssml) = message.ssml_message {
        builder = builder.ssml_message(
            models::SsmlMessage::builder()
                .value(ssml.value)
                .build()
                .map_err(invalid_request)?,
        );
    }
    if let Some(payload) = message.custom_payload {
        builder = builder.custom_payload(
            models::CustomPayload::builder()
                .value(payload.value)
                .build()
                .map_err(invalid_request)?,
        );
    }
    Ok(builder.build())
}

fn prompt(spec: PromptJson) -> Result<models::PromptSpecification, RemoteError> {
    let mut builder = models::PromptSpecification::builder()
        .max_retries(spec.max_retries)
        .set_allow_interrupt(spec.allow_interrupt)
        .set_message_selection_strategy(
            spec.message_selection_strategy
                .as_deref()
                .map(models::MessageSelectionStrategy::from),
        );
    for group in spec.message_groups {
        let mut group_builder =
            models::MessageGroup::builder().message(prompt_message(group.message)?);
        for variation in group.variations {
            group_builder = group_builder.variations(prompt_message(variation)?);
        }
        builder = builder.message_groups(group_builder.build());
    }
    builder.build().map_err(invalid_request)
}

/// Type the `valueElicitationSetting` JSON of an intent file.
pub(crate) fn elicitation_setting(
    raw: &serde_json::Value,
) -> Result<models::SlotValueElicitationSetting, RemoteError> {
    let setting: ElicitationJson = serde_json::from_value(raw.clone())
        .map_err(|e| invalid_request(format!("invalid valueElicitationSetting: {e}")))?;

    let mut builder = models::SlotValueElicitationSetting::builder()
        .slot_constraint(models::SlotConstraint::from(setting.slot_constraint.as_str()));
    if let Some(spec) = setting.prompt_specification {
        builder = builder.prompt_specification(prompt(spec)?);
    }
    for sample in setting.sample_utterances {
        builder = builder.sample_utterances(
            models::SampleUtterance::builder()
                .utterance(sample.utterance)
                .build()
                .map_err(invalid_request)?,
        );
    }
    if let Some(defaults) = setting.default_value_specification {
        let mut spec = models::SlotDefaultValueSpecification::builder();
        for value in defaults.default_value_list {
            spec = spec.default_value_list(
                models::SlotDefaultValue::builder()
                    .default_value(value.default_value)
                    .build()
                    .map_err(invalid_request)?,
            );
        }
        builder = builder.default_value_specification(spec.build().map_err(invalid_request)?);
    }
    builder.build().map_err(invalid_request)
}

// ----- runtime: session state -----

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dialog_action: Option<DialogActionJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intent: Option<IntentJson>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    session_attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    originating_request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DialogActionJson {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slot_to_elicit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentJson {
    name: String,
    /// Unfilled slots are `null`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    slots: BTreeMap<String, Option<SlotJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirmation_state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SlotJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<SlotValueJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotValueJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_value: Option<String>,
    interpreted_value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    resolved_values: Vec<String>,
}

/// Type the opaque state of the previous turn for a runtime request.
/// `None` on the first turn.
pub(crate) fn session_state_in(
    state: &SessionState,
) -> Result<Option<runtime::SessionState>, RemoteError> {
    let Some(raw) = state.as_value() else {
        return Ok(None);
    };
    let session: SessionJson = serde_json::from_value(raw.clone())
        .map_err(|e| invalid_request(format!("invalid session state: {e}")))?;

    let mut builder = runtime::SessionState::builder();
    if let Some(action) = session.dialog_action {
        builder = builder.dialog_action(
            runtime::DialogAction::builder()
                .r#type(runtime::DialogActionType::from(action.kind.as_str()))
                .set_slot_to_elicit(action.slot_to_elicit)
                .build()
                .map_err(invalid_request)?,
        );
    }
    if let Some(intent) = session.intent {
        let mut intent_builder = runtime::Intent::builder()
            .name(intent.name)
            .set_state(intent.state.as_deref().map(runtime::IntentState::from))
            .set_confirmation_state(
                intent
                    .confirmation_state
                    .as_deref()
                    .map(runtime::ConfirmationState::from),
            );
        for (name, slot) in intent.slots {
            let Some(value) = slot.and_then(|s| s.value) else {
                continue;
            };
            let value = runtime::Value::builder()
                .set_original_value(value.original_value)
                .interpreted_value(value.interpreted_value)
                .set_resolved_values(Some(value.resolved_values))
                .build()
                .map_err(invalid_request)?;
            intent_builder =
                intent_builder.slots(name, runtime::Slot::builder().value(value).build());
        }
        builder = builder.intent(intent_builder.build().map_err(invalid_request)?);
    }
    if !session.session_attributes.is_empty() {
        builder = builder.set_session_attributes(Some(
            session.session_attributes.into_iter().collect(),
        ));
    }
    Ok(Some(
        builder
            .set_originating_request_id(session.originating_request_id)
            .build(),
    ))
}

fn session_state_out(state: &runtime::SessionState) -> Result<serde_json::Value, RemoteError> {
    let session = SessionJson {
        dialog_action: state.dialog_action().map(|action| DialogActionJson {
            kind: action.r#type().as_str().to_string(),
            slot_to_elicit: action.slot_to_elicit().map(str::to_string),
        }),
        intent: state.intent().map(|intent| IntentJson {
            name: intent.name().to_string(),
            slots: intent
                .slots()
                .map(|slots| {
                    slots
                        .iter()
                        .map(|(name, slot)| {
                            let value = slot.value().map(|v| SlotValueJson {
                                original_value: v.original_value().map(str::to_string),
                                interpreted_value: v.interpreted_value().to_string(),
                                resolved_values: v.resolved_values().to_vec(),
                            });
                            (name.clone(), value.map(|value| SlotJson { value: Some(value) }))
                        })
                        .collect()
                })
                .unwrap_or_default(),
            state: intent.state().map(|s| s.as_str().to_string()),
            confirmation_state: intent.confirmation_state().map(|s| s.as_str().to_string()),
        }),
        session_attributes: state
            .session_attributes()
            .map(|attrs| attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
        originating_request_id: state.originating_request_id().map(str::to_string),
    };
    serde_json::to_value(session).map_err(|e| RemoteError::Deserialization(e.to_string()))
}

// ----- runtime: turns -----

/// Interpretations and messages keep their positions: an interpretation
/// without an intent or a card without text is still an entry.
pub(crate) fn recognized_turn(output: &RecognizeTextOutput) -> Result<RecognizedTurn, RemoteError> {
    let dialog_action = output
        .session_state()
        .and_then(|s| s.dialog_action())
        .map(|a| {
            let Ok(action) = a.r#type().as_str().parse::<DialogActionType>();
            action
        });

    Ok(RecognizedTurn {
        interpretations: output
            .interpretations()
            .iter()
            .map(|i| Interpretation {
                intent_name: i.intent().map(|intent| intent.name().to_string()),
                confidence: i.nlu_confidence().map(|c| c.score()),
            })
            .collect(),
        dialog_action,
        messages: output
            .messages()
            .iter()
            .map(|m| BotMessage {
                content: m.content().map(str::to_string),
                content_type: Some(m.content_type().as_str().to_string()),
            })
            .collect(),
        session_state: SessionState(
            output.session_state().map(session_state_out).transpose()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intent(name: &str) -> runtime::Intent {
        runtime::Intent::builder().name(name).build().unwrap()
    }

    fn text(content: &str) -> runtime::Message {
        runtime::Message::builder()
            .content(content)
            .content_type(runtime::MessageContentType::PlainText)
            .build()
            .unwrap()
    }

    #[test]
    fn test_turn_keeps_interpretation_positions() {
        let output = RecognizeTextOutput::builder()
            .interpretations(runtime::Interpretation::builder().build())
            .interpretations(
                runtime::Interpretation::builder()
                    .intent(intent("GreetIntent"))
                    .nlu_confidence(runtime::ConfidenceScore::builder().score(0.91).build())
                    .build(),
            )
            .build();

        let turn = recognized_turn(&output).unwrap();

        assert_eq!(turn.interpretations.len(), 2);
        assert_eq!(turn.interpretations[0].intent_name, None);
        assert_eq!(
            turn.interpretations[1].intent_name.as_deref(),
            Some("GreetIntent")
        );
        assert_eq!(turn.interpretations[1].confidence, Some(0.91));
    }

    #[test]
    fn test_turn_keeps_textless_messages() {
        let card = runtime::Message::builder()
            .content_type(runtime::MessageContentType::ImageResponseCard)
            .build()
            .unwrap();
        let output = RecognizeTextOutput::builder()
            .messages(card)
            .messages(text("Escolha uma opção"))
            .build();

        let turn = recognized_turn(&output).unwrap();

        assert_eq!(turn.messages.len(), 2);
        assert_eq!(turn.messages[0].content, None);
        assert_eq!(
            turn.messages[0].content_type.as_deref(),
            Some("ImageResponseCard")
        );
        assert_eq!(
            turn.messages[1].content.as_deref(),
            Some("Escolha uma opção")
        );
    }

    #[test]
    fn test_session_state_survives_a_turn() {
        let prior = json!({
            "dialogAction": {"type": "ElicitSlot", "slotToElicit": "date"},
            "intent": {
                "name": "BookIntent",
                "state": "InProgress",
                "slots": {
                    "city": {"value": {"originalValue": "rio", "interpretedValue": "Rio de Janeiro", "resolvedValues": ["Rio de Janeiro"]}},
                    "date": null
                }
            },
            "sessionAttributes": {"channel": "web"}
        });

        let typed = session_state_in(&SessionState(Some(prior)))
            .unwrap()
            .unwrap();
        assert_eq!(
            typed.dialog_action().unwrap().r#type(),
            &runtime::DialogActionType::ElicitSlot
        );
        let slots = typed.intent().unwrap().slots().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(
            slots["city"].value().unwrap().interpreted_value(),
            "Rio de Janeiro"
        );

        let back = session_state_out(&typed).unwrap();
        assert_eq!(back["dialogAction"]["slotToElicit"], "date");
        assert_eq!(back["intent"]["state"], "InProgress");
        assert_eq!(back["intent"]["slots"]["city"]["value"]["originalValue"], "rio");
        assert_eq!(back["sessionAttributes"]["channel"], "web");
    }

    #[test]
    fn test_first_turn_has_no_session_state() {
        assert!(session_state_in(&SessionState::empty()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_session_state_is_rejected() {
        let state = SessionState(Some(json!({"intent": {"state": "InProgress"}})));
        let err = session_state_in(&state).unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { ref code, .. } if code == "InvalidRequest"));
    }

    #[test]
    fn test_elicitation_setting_is_typed() {
        let setting = elicitation_setting(&json!({
            "slotConstraint": "Required",
            "promptSpecification": {
                "messageGroups": [
                    {"message": {"plainTextMessage": {"value": "Para qual data?"}}}
                ],
                "maxRetries": 2,
                "allowInterrupt": true
            }
        }))
        .unwrap();

        assert_eq!(setting.slot_constraint(), &models::SlotConstraint::Required);
        let prompt = setting.prompt_specification().unwrap();
        assert_eq!(prompt.max_retries(), 2);
        assert_eq!(prompt.allow_interrupt(), Some(true));
        let message = prompt.message_groups()[0].message().unwrap();
        assert_eq!(
            message.plain_text_message().unwrap().value(),
            "Para qual data?"
        );
    }

    #[test]
    fn test_elicitation_setting_rejects_unknown_fields() {
        let err = elicitation_setting(&json!({
            "slotConstraint": "Optional",
            "promptSpecfication": {}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("promptSpecfication"));
    }

    #[test]
    fn test_empty_priorities_are_omitted() {
        assert!(slot_priorities(&[]).unwrap().is_none());
        let typed = slot_priorities(&[SlotPriority {
            priority: 1,
            slot_id: "S1".into(),
        }])
        .unwrap()
        .unwrap();
        assert_eq!(typed[0].priority(), 1);
        assert_eq!(typed[0].slot_id(), "S1");
    }
}
