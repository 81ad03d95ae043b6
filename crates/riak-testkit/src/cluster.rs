//! In-memory cluster
//!
//! `MockCluster` implements [`RiakCluster`] on top of a simulated single
//! node. Every request and response is pushed through the wire codec, so
//! anything that fails to encode fails here too.

use crate::datatypes::DatatypeStore;
use crate::indexes::IndexStore;
use crate::producer::{script_for, ProducerTracker, ScriptedProducer, StreamBehavior};
use async_trait::async_trait;
use parking_lot::Mutex;
use riak_core::codec::{decode_operation, decode_response, encode_operation, encode_response};
use riak_core::{
    BinaryValue, CausalContext, ClientConfig, CoreOperation, CoreResponse, CrdtElement,
    DtFetchRequest, DtFetchResponse, DtOp, DtUpdateRequest, DtUpdateResponse, IndexChunk,
    IndexQueryRequest, Location, RiakCluster, RiakError, RiakResult, StreamingConfig,
    StreamingFuture,
};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct ClusterState {
    datatypes: DatatypeStore,
    indexes: IndexStore,
    failures: VecDeque<RiakError>,
    scripted: VecDeque<CoreResponse>,
    submitted: Vec<CoreOperation>,
    contexts: Vec<Option<CausalContext>>,
    behavior: StreamBehavior,
    generated: u64,
}

/// Simulated Riak node
#[derive(Debug, Clone, Default)]
pub struct MockCluster {
    state: Arc<Mutex<ClusterState>>,
    config: StreamingConfig,
    producers: ProducerTracker,
}

impl MockCluster {
    /// A cluster with default streaming configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster reporting the given streaming configuration
    pub fn with_config(config: StreamingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A cluster configured from a loaded client configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_config(config.streaming)
    }

    /// Set how streaming queries are delivered
    pub fn set_stream_behavior(&self, behavior: StreamBehavior) {
        self.state.lock().behavior = behavior;
    }

    /// Fail the next submission with `error`
    pub fn fail_next(&self, error: RiakError) {
        self.state.lock().failures.push_back(error);
    }

    /// Answer the next submission with `response` instead of simulating it
    pub fn respond_next(&self, response: CoreResponse) {
        self.state.lock().scripted.push_back(response);
    }

    /// Store a value directly, bypassing the operation path
    pub fn put_element(&self, location: Location, element: CrdtElement) {
        self.state.lock().datatypes.put(location, element);
    }

    /// Add an index posting for `location`
    pub fn index(
        &self,
        location: &Location,
        index_name: impl Into<BinaryValue>,
        term: impl Into<BinaryValue>,
    ) {
        self.state
            .lock()
            .indexes
            .insert(location, index_name.into(), term.into());
    }

    /// Contexts carried by every update received so far, in order
    pub fn received_contexts(&self) -> Vec<Option<CausalContext>> {
        self.state.lock().contexts.clone()
    }

    /// Every operation received so far, as decoded from the wire
    pub fn submitted_operations(&self) -> Vec<CoreOperation> {
        self.state.lock().submitted.clone()
    }

    /// Tracker for streaming producer threads
    pub fn producers(&self) -> &ProducerTracker {
        &self.producers
    }

    fn receive(&self, operation: &CoreOperation) -> RiakResult<CoreOperation> {
        let bytes = encode_operation(operation)?;
        let decoded = decode_operation(&bytes)?;
        debug!(operation = decoded.name(), bytes = bytes.len(), "Mock cluster received operation");
        Ok(decoded)
    }

    fn handle(&self, operation: CoreOperation) -> RiakResult<CoreResponse> {
        let mut state = self.state.lock();
        state.submitted.push(operation.clone());
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        if let Some(response) = state.scripted.pop_front() {
            return Ok(response);
        }
        match operation {
            CoreOperation::DtFetch(request) => Ok(CoreResponse::DtFetch(fetch(&state, &request))),
            CoreOperation::DtUpdate(request) => {
                update(&mut state, request).map(CoreResponse::DtUpdate)
            }
            CoreOperation::IndexQuery(request) => {
                query(&state, &request).map(CoreResponse::IndexQuery)
            }
        }
    }
}

fn fetch(state: &ClusterState, request: &DtFetchRequest) -> DtFetchResponse {
    match state.datatypes.fetch(&request.location) {
        Some((element, context)) => {
            let include_context = request.include_context.unwrap_or(true);
            DtFetchResponse {
                context: (include_context && carries_context(&element)).then_some(context),
                element: Some(element),
            }
        }
        None => DtFetchResponse::default(),
    }
}

fn update(state: &mut ClusterState, request: DtUpdateRequest) -> RiakResult<DtUpdateResponse> {
    state.contexts.push(request.context.clone());
    let generated_key = match request.key {
        Some(_) => None,
        None => {
            state.generated += 1;
            Some(BinaryValue::from(format!("generated-{:06}", state.generated)))
        }
    };
    let key = request
        .key
        .clone()
        .or_else(|| generated_key.clone())
        .ok_or_else(|| RiakError::transport("no key to update"))?;
    let location = Location::new(request.namespace.clone(), key)?;

    let (element, context) = state.datatypes.apply(&location, &request.op)?;
    let with_context = !matches!(request.op, DtOp::Hll(_));
    let return_body = request.return_body.unwrap_or(false);
    Ok(DtUpdateResponse {
        context: with_context.then_some(context),
        element: return_body.then_some(element),
        generated_key,
    })
}

fn query(state: &ClusterState, request: &IndexQueryRequest) -> RiakResult<IndexChunk> {
    let datatype_keys: BTreeSet<BinaryValue> = state
        .datatypes
        .locations()
        .filter(|location| location.namespace() == &request.namespace)
        .map(|location| location.key().clone())
        .collect();
    state.indexes.query(request, &datatype_keys)
}

fn carries_context(element: &CrdtElement) -> bool {
    !matches!(element, CrdtElement::Hll(_))
}

fn split_into_chunks(page: IndexChunk, chunk_size: usize) -> Vec<IndexChunk> {
    let IndexChunk {
        entries,
        continuation,
    } = page;
    let mut chunks: Vec<IndexChunk> = entries
        .chunks(chunk_size)
        .map(|entries| IndexChunk {
            entries: entries.to_vec(),
            continuation: None,
        })
        .collect();
    match chunks.last_mut() {
        Some(last) => last.continuation = continuation,
        None if continuation.is_some() => chunks.push(IndexChunk {
            entries: Vec::new(),
            continuation,
        }),
        None => {}
    }
    chunks
}

#[async_trait]
impl RiakCluster for MockCluster {
    async fn submit(&self, operation: CoreOperation) -> RiakResult<CoreResponse> {
        let operation = self.receive(&operation)?;
        let response = self.handle(operation)?;
        let bytes = encode_response(&response)?;
        decode_response(&bytes)
    }

    fn submit_streaming(
        &self,
        operation: CoreOperation,
    ) -> RiakResult<StreamingFuture<IndexChunk>> {
        let operation = self.receive(&operation)?;
        if !matches!(operation, CoreOperation::IndexQuery(_)) {
            return Err(RiakError::unsupported(format!(
                "streaming {}",
                operation.name()
            )));
        }
        let behavior = self.state.lock().behavior.clone();
        let page = match self.handle(operation)? {
            CoreResponse::IndexQuery(page) => page,
            other => {
                return Err(RiakError::malformed(format!(
                    "expected index_query response, got {}",
                    other.name()
                )))
            }
        };
        let chunks = split_into_chunks(page, behavior.chunk_size());
        debug!(chunks = chunks.len(), ?behavior, "Mock cluster starting stream");
        let script = script_for(chunks, &behavior);
        let (_producer, receiver) = ScriptedProducer::spawn_tracked(
            self.config.chunk_queue_capacity,
            script,
            &self.producers,
        );
        Ok(StreamingFuture::new(receiver))
    }

    fn streaming_config(&self) -> StreamingConfig {
        self.config
    }
}
