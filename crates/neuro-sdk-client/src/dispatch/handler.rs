use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::value::RawValue;

use neuro_sdk_core::protocol::{ActionDefinition, ActionSchema, ExecutionResult};

/// Host-supplied action. The engine only ever talks to this capability set.
///
/// `validate` runs on every invocation and must tolerate malformed data: the
/// peer's schema enforcement is best-effort. It must not talk to the peer
/// itself; the engine sends the result. `execute` runs only after a
/// successful validation, with exactly the state `validate` produced, and
/// only after the result has been sent.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    /// Validated arguments handed from `validate` to `execute`.
    type State: Send + 'static;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn schema(&self) -> Option<ActionSchema> {
        None
    }

    fn validate(&self, data: Option<&RawValue>) -> Validation<Self::State>;

    async fn execute(&self, state: Self::State);
}

/// Outcome of `ActionHandler::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<S> {
    Success { state: S, message: String },
    Failure { message: String },
}

impl<S> Validation<S> {
    pub fn success(state: S, message: impl Into<String>) -> Self {
        Validation::Success {
            state,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Validation::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Validation::Success { .. })
    }

    /// The wire result for this outcome.
    pub fn result(&self) -> ExecutionResult {
        match self {
            Validation::Success { message, .. } => ExecutionResult::success(message.clone()),
            Validation::Failure { message } => ExecutionResult::failure(message.clone()),
        }
    }
}

/// Deferred `execute` call carrying the handler's concrete state.
pub(crate) type Execution = BoxFuture<'static, ()>;

trait ErasedHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Option<ActionSchema>;
    fn validate(self: Arc<Self>, data: Option<&RawValue>) -> (ExecutionResult, Option<Execution>);
}

impl<H: ActionHandler> ErasedHandler for H {
    fn name(&self) -> &str {
        ActionHandler::name(self)
    }

    fn description(&self) -> &str {
        ActionHandler::description(self)
    }

    fn schema(&self) -> Option<ActionSchema> {
        ActionHandler::schema(self)
    }

    fn validate(self: Arc<Self>, data: Option<&RawValue>) -> (ExecutionResult, Option<Execution>) {
        match ActionHandler::validate(&*self, data) {
            Validation::Success { state, message } => {
                let execution: Execution = Box::pin(async move { self.execute(state).await });
                (ExecutionResult::success(message), Some(execution))
            }
            Validation::Failure { message } => (ExecutionResult::failure(message), None),
        }
    }
}

/// Registry entry: a cheaply cloneable, type-erased handler.
#[derive(Clone)]
pub struct SharedHandler {
    inner: Arc<dyn ErasedHandler>,
}

impl SharedHandler {
    pub fn new<H: ActionHandler>(handler: H) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    /// Share a handler the host keeps its own reference to.
    pub fn from_arc<H: ActionHandler>(handler: Arc<H>) -> Self {
        Self { inner: handler }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn description(&self) -> &str {
        self.inner.description()
    }

    pub fn schema(&self) -> Option<ActionSchema> {
        self.inner.schema()
    }

    pub fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            schema: self.schema(),
        }
    }

    /// Same underlying handler instance.
    pub fn ptr_eq(&self, other: &SharedHandler) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Run validation; on success also hand back the pending execution.
    pub(crate) fn validate(&self, data: Option<&RawValue>) -> (ExecutionResult, Option<Execution>) {
        Arc::clone(&self.inner).validate(data)
    }
}

impl<H: ActionHandler> From<H> for SharedHandler {
    fn from(handler: H) -> Self {
        SharedHandler::new(handler)
    }
}

impl fmt::Debug for SharedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandler")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
