//! Upsert of named resources within a parent scope.
//!
//! Intents are unique by name within a bot locale; slots are unique by name
//! within an intent. [`upsert`] lists the scope, matches the name exactly
//! (case-sensitive, first match in listing order wins) and then updates the
//! match or creates a new resource. Failures are neither retried nor
//! swallowed here: they come back with operation, name and parent attached.

use lexbot_types::bot::LocaleScope;
use lexbot_types::error::{BotError, RemoteError, ResourceKind, ResourceRef};
use lexbot_types::intent::{IntentInput, SlotDefinition};
use lexbot_types::report::UpsertAction;

use crate::client::BotModelsClient;

/// A resource found by listing its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingResource {
    pub id: String,
    pub name: String,
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub id: String,
    pub action: UpsertAction,
}

/// One parent scope of named resources.
pub trait ResourceScope: Send + Sync {
    type Definition: Send + Sync;

    fn kind(&self) -> ResourceKind;

    /// Id of the parent (bot id for intents, intent id for slots).
    fn parent_id(&self) -> String;

    /// Name the resource is matched by.
    fn name_of(definition: &Self::Definition) -> &str;

    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ExistingResource>, RemoteError>> + Send;

    fn create(
        &self,
        definition: &Self::Definition,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;

    fn update(
        &self,
        id: &str,
        definition: &Self::Definition,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}

/// Create the resource named by `definition`, or update it if the scope
/// already has one with that name. Returns the resource id.
pub async fn upsert<S: ResourceScope>(
    scope: &S,
    definition: &S::Definition,
) -> Result<Upserted, BotError> {
    let name = S::name_of(definition);
    let resource = ResourceRef::new(scope.kind(), name).in_parent(scope.parent_id());
    let list_op = list_operation(scope.kind());

    let existing = scope
        .list()
        .await
        .map_err(|e| BotError::from_remote(list_op, resource.clone(), e))?;

    match existing.into_iter().find(|r| r.name == name) {
        Some(found) => {
            let op = update_operation(scope.kind());
            scope
                .update(&found.id, definition)
                .await
                .map_err(|e| BotError::from_remote(op, resource.clone(), e))?;
            tracing::info!(kind = %scope.kind(), name, id = %found.id, "updated existing resource");
            Ok(Upserted {
                id: found.id,
                action: UpsertAction::Updated,
            })
        }
        None => {
            let op = create_operation(scope.kind());
            let id = scope
                .create(definition)
                .await
                .map_err(|e| BotError::from_remote(op, resource.clone(), e))?;
            tracing::info!(kind = %scope.kind(), name, id = %id, "created resource");
            Ok(Upserted {
                id,
                action: UpsertAction::Created,
            })
        }
    }
}

fn list_operation(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Intent => "list_intents",
        ResourceKind::Slot => "list_slots",
        _ => "list",
    }
}

fn create_operation(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Intent => "create_intent",
        ResourceKind::Slot => "create_slot",
        _ => "create",
    }
}

fn update_operation(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Intent => "update_intent",
        ResourceKind::Slot => "update_slot",
        _ => "update",
    }
}

/// Intents of one bot locale.
pub struct IntentScope<'a, C: BotModelsClient> {
    client: &'a C,
    scope: &'a LocaleScope,
}

impl<'a, C: BotModelsClient> IntentScope<'a, C> {
    pub fn new(client: &'a C, scope: &'a LocaleScope) -> Self {
        Self { client, scope }
    }
}

impl<C: BotModelsClient> ResourceScope for IntentScope<'_, C> {
    type Definition = IntentInput;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Intent
    }

    fn parent_id(&self) -> String {
        self.scope.bot_id.to_string()
    }

    fn name_of(definition: &IntentInput) -> &str {
        &definition.name
    }

    async fn list(&self) -> Result<Vec<ExistingResource>, RemoteError> {
        let intents = self.client.list_intents(self.scope).await?;
        Ok(intents
            .into_iter()
            .map(|i| ExistingResource {
                id: i.intent_id,
                name: i.intent_name,
            })
            .collect())
    }

    async fn create(&self, definition: &IntentInput) -> Result<String, RemoteError> {
        self.client.create_intent(self.scope, definition).await
    }

    async fn update(&self, id: &str, definition: &IntentInput) -> Result<(), RemoteError> {
        self.client.update_intent(self.scope, id, definition).await
    }
}

/// Slots of one intent.
pub struct SlotScope<'a, C: BotModelsClient> {
    client: &'a C,
    scope: &'a LocaleScope,
    intent_id: &'a str,
}

impl<'a, C: BotModelsClient> SlotScope<'a, C> {
    pub fn new(client: &'a C, scope: &'a LocaleScope, intent_id: &'a str) -> Self {
        Self {
            client,
            scope,
            intent_id,
        }
    }
}

impl<C: BotModelsClient> ResourceScope for SlotScope<'_, C> {
    type Definition = SlotDefinition;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Slot
    }

    fn parent_id(&self) -> String {
        self.intent_id.to_string()
    }

    fn name_of(definition: &SlotDefinition) -> &str {
        &definition.name
    }

    async fn list(&self) -> Result<Vec<ExistingResource>, RemoteError> {
        let slots = self.client.list_slots(self.scope, self.intent_id).await?;
        Ok(slots
            .into_iter()
            .map(|s| ExistingResource {
                id: s.slot_id,
                name: s.slot_name,
            })
            .collect())
    }

    async fn create(&self, definition: &SlotDefinition) -> Result<String, RemoteError> {
        self.client
            .create_slot(self.scope, self.intent_id, definition)
            .await
    }

    async fn update(&self, id: &str, definition: &SlotDefinition) -> Result<(), RemoteError> {
        self.client
            .update_slot(self.scope, self.intent_id, id, definition)
            .await
    }
}
