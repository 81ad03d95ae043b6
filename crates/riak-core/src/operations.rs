//! Core operations and responses
//!
//! The request/response shapes exchanged with the cluster. Every optional
//! request parameter is an `Option`; `None` means the parameter is omitted and
//! the server applies its own default.

use crate::binary::BinaryValue;
use crate::context::CausalContext;
use crate::crdt::{CrdtElement, DtOp};
use crate::location::{Location, Namespace};
use crate::quorum::Quorum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Datatype fetch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtFetchRequest {
    /// Object to fetch
    pub location: Location,
    /// Read quorum
    pub r: Option<Quorum>,
    /// Primary read quorum
    pub pr: Option<Quorum>,
    /// Return early once a quorum of not-found answers is reached
    pub basic_quorum: Option<bool>,
    /// Treat not-found as a successful read
    pub notfound_ok: Option<bool>,
    /// Server-side timeout
    pub timeout: Option<Duration>,
    /// Allow fallback replicas
    pub sloppy_quorum: Option<bool>,
    /// Replica count
    pub n_val: Option<u32>,
    /// Return the causal context with the value
    pub include_context: Option<bool>,
}

impl DtFetchRequest {
    /// A request with every option omitted
    pub fn new(location: Location) -> Self {
        Self {
            location,
            r: None,
            pr: None,
            basic_quorum: None,
            notfound_ok: None,
            timeout: None,
            sloppy_quorum: None,
            n_val: None,
            include_context: None,
        }
    }
}

/// Datatype update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtUpdateRequest {
    /// Target namespace
    pub namespace: Namespace,
    /// Target key; `None` asks the server to generate one
    pub key: Option<BinaryValue>,
    /// Context from a previous fetch
    pub context: Option<CausalContext>,
    /// The operation tree
    pub op: DtOp,
    /// Durable write quorum
    pub dw: Option<Quorum>,
    /// Replica count
    pub n_val: Option<u32>,
    /// Primary write quorum
    pub pw: Option<Quorum>,
    /// Return the merged value
    pub return_body: Option<bool>,
    /// Allow fallback replicas
    pub sloppy_quorum: Option<bool>,
    /// Server-side timeout
    pub timeout: Option<Duration>,
    /// Write quorum
    pub w: Option<Quorum>,
}

impl DtUpdateRequest {
    /// A request with every option omitted
    pub fn new(namespace: Namespace, key: Option<BinaryValue>, op: DtOp) -> Self {
        Self {
            namespace,
            key,
            context: None,
            op,
            dw: None,
            n_val: None,
            pw: None,
            return_body: None,
            sloppy_quorum: None,
            timeout: None,
            w: None,
        }
    }
}

/// Selection criterion of an index query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexCriteria {
    /// Exact match on an index term
    Match(BinaryValue),
    /// Inclusive range of index terms
    Range {
        /// Lower bound
        start: BinaryValue,
        /// Upper bound
        end: BinaryValue,
    },
    /// Opaque coverage context for a partition-local read
    CoverageContext(BinaryValue),
}

/// Secondary index query request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexQueryRequest {
    /// Namespace to query
    pub namespace: Namespace,
    /// Full index name, including any `_bin`/`_int` suffix
    pub index_name: BinaryValue,
    /// Selection criterion
    pub criteria: IndexCriteria,
    /// Return the matched index term with each key
    pub return_terms: bool,
    /// Ask for results sorted for pagination
    pub pagination_sort: Option<bool>,
    /// Cap on the number of results
    pub max_results: Option<u32>,
    /// Regular expression applied to terms
    pub term_filter: Option<BinaryValue>,
    /// Continuation from a previous page
    pub continuation: Option<BinaryValue>,
    /// Server-side timeout
    pub timeout: Option<Duration>,
    /// Deliver results as a series of chunks
    pub streaming: bool,
}

/// Core operation submitted to the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreOperation {
    /// Fetch a datatype
    DtFetch(DtFetchRequest),
    /// Update a datatype
    DtUpdate(DtUpdateRequest),
    /// Query a secondary index
    IndexQuery(IndexQueryRequest),
}

impl CoreOperation {
    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::DtFetch(_) => "dt_fetch",
            Self::DtUpdate(_) => "dt_update",
            Self::IndexQuery(_) => "index_query",
        }
    }
}

/// Datatype fetch response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtFetchResponse {
    /// Context for a subsequent update
    pub context: Option<CausalContext>,
    /// The value; absent when the object was not found
    pub element: Option<CrdtElement>,
}

/// Datatype update response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtUpdateResponse {
    /// Context after the update
    pub context: Option<CausalContext>,
    /// Merged value, when return-body was requested
    pub element: Option<CrdtElement>,
    /// Key chosen by the server for namespace-only updates
    pub generated_key: Option<BinaryValue>,
}

/// One index query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Key of the matched object
    pub object_key: BinaryValue,
    /// Matched index term, present when terms were requested
    pub index_key: Option<BinaryValue>,
}

impl IndexEntry {
    /// Create an entry
    pub fn new(object_key: impl Into<BinaryValue>, index_key: Option<BinaryValue>) -> Self {
        Self {
            object_key: object_key.into(),
            index_key,
        }
    }
}

/// A batch of index results; a single-shot response is one chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexChunk {
    /// Results in server order
    pub entries: Vec<IndexEntry>,
    /// Continuation for the next page
    pub continuation: Option<BinaryValue>,
}

/// Core response returned by the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreResponse {
    /// Fetch result
    DtFetch(DtFetchResponse),
    /// Update result
    DtUpdate(DtUpdateResponse),
    /// Index query result
    IndexQuery(IndexChunk),
}

impl CoreResponse {
    /// Short response name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::DtFetch(_) => "dt_fetch",
            Self::DtUpdate(_) => "dt_update",
            Self::IndexQuery(_) => "index_query",
        }
    }
}
