use super::unexpected_response;
use crate::kind::{Counter, DatatypeKind, GSet, Hll, Map, Set};
use crate::options::{UpdateOption, UpdateOptions};
use riak_core::{
    BinaryValue, CausalContext, CoreOperation, CoreResponse, DtUpdateRequest, DtUpdateResponse,
    Location, Namespace, RiakCluster, RiakResult,
};
use tracing::debug;

/// Update a counter
pub type UpdateCounter = UpdateDatatype<Counter>;
/// Update a set
pub type UpdateSet = UpdateDatatype<Set>;
/// Update a grow-only set
pub type UpdateGSet = UpdateDatatype<GSet>;
/// Update a map
pub type UpdateMap = UpdateDatatype<Map>;
/// Update a HyperLogLog
pub type UpdateHll = UpdateDatatype<Hll>;

/// Where an update is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    /// An existing or new object with a known key
    Location(Location),
    /// A new object whose key the server generates
    Namespace(Namespace),
}

impl UpdateTarget {
    /// Namespace of the target
    pub fn namespace(&self) -> &Namespace {
        match self {
            Self::Location(location) => location.namespace(),
            Self::Namespace(namespace) => namespace,
        }
    }

    /// Key of the target, when one was given
    pub fn key(&self) -> Option<&BinaryValue> {
        match self {
            Self::Location(location) => Some(location.key()),
            Self::Namespace(_) => None,
        }
    }
}

impl From<Location> for UpdateTarget {
    fn from(location: Location) -> Self {
        Self::Location(location)
    }
}

impl From<Namespace> for UpdateTarget {
    fn from(namespace: Namespace) -> Self {
        Self::Namespace(namespace)
    }
}

/// Apply an update to a datatype
///
/// The update descriptor is kept as-is and compiled on every execution, so a
/// command can be resubmitted without rebuilding it.
#[derive(Debug, Clone)]
pub struct UpdateDatatype<K: DatatypeKind> {
    target: UpdateTarget,
    update: K::Update,
    context: Option<CausalContext>,
    options: UpdateOptions,
}

/// Builder for [`UpdateDatatype`]
#[derive(Debug, Clone)]
pub struct UpdateDatatypeBuilder<K: DatatypeKind> {
    target: UpdateTarget,
    update: K::Update,
    context: Option<CausalContext>,
    options: UpdateOptions,
}

impl<K: DatatypeKind> UpdateDatatypeBuilder<K> {
    /// Attach the context from a previous fetch
    ///
    /// HyperLogLogs carry no context; for them the context is dropped.
    pub fn with_context(mut self, context: impl Into<Option<CausalContext>>) -> Self {
        let context = context.into();
        if K::CARRIES_CONTEXT {
            self.context = context;
        } else if context.is_some() {
            debug!(kind = K::NAME, "Discarding causal context for context-free datatype");
        }
        self
    }

    /// Set an option; a later value of the same option replaces this one
    pub fn with_option(mut self, option: UpdateOption) -> Self {
        self.options.set(option);
        self
    }

    /// Finish the command
    pub fn build(self) -> UpdateDatatype<K> {
        UpdateDatatype {
            target: self.target,
            update: self.update,
            context: self.context,
            options: self.options,
        }
    }
}

impl<K: DatatypeKind> UpdateDatatype<K> {
    /// Start building an update of `target`, a [`Location`] or a bare [`Namespace`]
    pub fn builder(target: impl Into<UpdateTarget>, update: K::Update) -> UpdateDatatypeBuilder<K> {
        UpdateDatatypeBuilder {
            target: target.into(),
            update,
            context: None,
            options: UpdateOptions::default(),
        }
    }

    /// Object being updated
    pub fn target(&self) -> &UpdateTarget {
        &self.target
    }

    /// The update descriptor
    pub fn update(&self) -> &K::Update {
        &self.update
    }

    /// Context sent with the update
    pub fn context(&self) -> Option<&CausalContext> {
        self.context.as_ref()
    }

    /// Options set on this command
    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    /// The core operation this command submits, with a freshly compiled op
    pub fn to_operation(&self) -> CoreOperation {
        let mut request = DtUpdateRequest::new(
            self.target.namespace().clone(),
            self.target.key().cloned(),
            K::to_op(&self.update),
        );
        request.context = self.context.clone();
        self.options.apply_to(&mut request);
        CoreOperation::DtUpdate(request)
    }

    /// Submit the update and decode the typed response
    pub async fn execute(&self, cluster: &dyn RiakCluster) -> RiakResult<UpdateResponse<K::View>> {
        debug!(
            kind = K::NAME,
            namespace = %self.target.namespace(),
            has_key = self.target.key().is_some(),
            has_context = self.context.is_some(),
            "Submitting datatype update"
        );
        match cluster.submit(self.to_operation()).await? {
            CoreResponse::DtUpdate(response) => self.decode(response),
            other => Err(unexpected_response("dt_update", &other)),
        }
    }

    /// Blocking form of [`execute`](Self::execute)
    pub fn execute_blocking(
        &self,
        cluster: &dyn RiakCluster,
    ) -> RiakResult<UpdateResponse<K::View>> {
        futures::executor::block_on(self.execute(cluster))
    }

    fn decode(&self, response: DtUpdateResponse) -> RiakResult<UpdateResponse<K::View>> {
        let datatype = response.element.map(K::view_from_element).transpose()?;
        let context = if K::CARRIES_CONTEXT {
            response.context
        } else {
            None
        };
        let generated_key = match self.target {
            UpdateTarget::Namespace(_) => response.generated_key,
            UpdateTarget::Location(_) => None,
        };
        debug!(
            kind = K::NAME,
            has_body = datatype.is_some(),
            generated_key = generated_key.is_some(),
            "Decoded datatype update"
        );
        Ok(UpdateResponse {
            datatype,
            context,
            generated_key,
        })
    }
}

/// Result of a datatype update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResponse<V> {
    datatype: Option<V>,
    context: Option<CausalContext>,
    generated_key: Option<BinaryValue>,
}

impl<V> UpdateResponse<V> {
    /// The merged value, present only when the body was requested
    pub fn datatype(&self) -> Option<&V> {
        self.datatype.as_ref()
    }

    /// Consume the response, keeping the value
    pub fn into_datatype(self) -> Option<V> {
        self.datatype
    }

    /// Context after the update
    pub fn context(&self) -> Option<&CausalContext> {
        self.context.as_ref()
    }

    /// Whether a context was returned
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Key chosen by the server for a namespace-only update
    pub fn generated_key(&self) -> Option<&BinaryValue> {
        self.generated_key.as_ref()
    }
}
