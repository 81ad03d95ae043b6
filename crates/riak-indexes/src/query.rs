//! Secondary index queries
//!
//! A query selects objects in one namespace by exactly one criterion: an
//! exact term, an inclusive term range, or an opaque coverage context. The
//! converter type parameter fixes the term type and the index name suffix.

use crate::converter::{
    BigIntConverter, IndexConverter, IntConverter, RawConverter, StringConverter,
};
use crate::response::{EntrySplitter, IndexEntryIterator, IndexResponse};
use riak_core::{
    BinaryValue, CoreOperation, CoreResponse, IndexCriteria, IndexQueryRequest, Namespace,
    RiakCluster, RiakError, RiakResult,
};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;

/// Query over raw byte terms of a caller-named index
pub type RawIndexQuery = IndexQuery<RawConverter>;
/// Query over a `_bin` index
pub type BinIndexQuery = IndexQuery<StringConverter>;
/// Query over an `_int` index with 64-bit terms
pub type IntIndexQuery = IndexQuery<IntConverter>;
/// Query over an `_int` index with arbitrary-precision terms
pub type BigIntIndexQuery = IndexQuery<BigIntConverter>;

/// Name of the index holding every key of a bucket
pub const BUCKET_INDEX: &str = "$bucket";
/// Name of the index over object keys
pub const KEY_INDEX: &str = "$key";

/// A validated secondary index query
pub struct IndexQuery<C: IndexConverter> {
    namespace: Namespace,
    index_name: BinaryValue,
    criteria: IndexCriteria,
    return_terms: bool,
    pagination_sort: Option<bool>,
    max_results: Option<u32>,
    term_filter: Option<BinaryValue>,
    continuation: Option<BinaryValue>,
    timeout: Option<Duration>,
    _converter: PhantomData<C>,
}

/// Builder for [`IndexQuery`]
pub struct IndexQueryBuilder<C: IndexConverter> {
    namespace: Namespace,
    index_name: BinaryValue,
    criteria: Vec<IndexCriteria>,
    return_terms: bool,
    pagination_sort: Option<bool>,
    max_results: Option<u32>,
    term_filter: Option<BinaryValue>,
    continuation: Option<BinaryValue>,
    timeout: Option<Duration>,
    _converter: PhantomData<C>,
}

impl<C: IndexConverter> IndexQueryBuilder<C> {
    /// Select objects whose term equals `value`
    pub fn match_value(mut self, value: C::Value) -> Self {
        self.criteria.push(IndexCriteria::Match(C::to_bytes(&value)));
        self
    }

    /// Select objects whose term lies in `start..=end`
    pub fn range(mut self, start: C::Value, end: C::Value) -> Self {
        self.criteria.push(IndexCriteria::Range {
            start: C::to_bytes(&start),
            end: C::to_bytes(&end),
        });
        self
    }

    /// Read the partition identified by an opaque coverage context
    pub fn coverage_context(mut self, context: impl Into<BinaryValue>) -> Self {
        self.criteria.push(IndexCriteria::CoverageContext(context.into()));
        self
    }

    /// Return the matched term with each key
    pub fn return_terms(mut self, return_terms: bool) -> Self {
        self.return_terms = return_terms;
        self
    }

    /// Ask the server to sort results for pagination
    pub fn pagination_sort(mut self, sort: bool) -> Self {
        self.pagination_sort = Some(sort);
        self
    }

    /// Cap the number of results in one page
    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Keep only terms matching a regular expression
    ///
    /// Only string-like indexes accept a filter.
    pub fn regex_term_filter(mut self, pattern: impl Into<BinaryValue>) -> Self {
        self.term_filter = Some(pattern.into());
        self
    }

    /// Resume after a previous page
    pub fn continuation(mut self, token: impl Into<BinaryValue>) -> Self {
        self.continuation = Some(token.into());
        self
    }

    /// Server-side timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and finish the query
    pub fn build(self) -> RiakResult<IndexQuery<C>> {
        if self.index_name.is_empty() {
            return Err(RiakError::invalid("index name must not be empty"));
        }
        if self.term_filter.is_some() && !C::SUPPORTS_TERM_FILTER {
            return Err(RiakError::invalid(format!(
                "term filters are not supported on integer index {}",
                self.index_name
            )));
        }
        if self.max_results == Some(0) {
            return Err(RiakError::invalid("max_results must be greater than zero"));
        }

        let mut criteria = self.criteria.into_iter();
        let (Some(criterion), None) = (criteria.next(), criteria.next()) else {
            return Err(RiakError::invalid(
                "an index query needs exactly one of match_value, range or coverage_context",
            ));
        };

        if matches!(criterion, IndexCriteria::CoverageContext(_)) {
            if self.continuation.is_some() {
                return Err(RiakError::invalid(
                    "continuation cannot be combined with a coverage context",
                ));
            }
            if self.max_results.is_some() {
                return Err(RiakError::invalid(
                    "max_results cannot be combined with a coverage context",
                ));
            }
        }

        Ok(IndexQuery {
            namespace: self.namespace,
            index_name: self.index_name,
            criteria: criterion,
            return_terms: self.return_terms,
            pagination_sort: self.pagination_sort,
            max_results: self.max_results,
            term_filter: self.term_filter,
            continuation: self.continuation,
            timeout: self.timeout,
            _converter: PhantomData,
        })
    }
}

impl<C: IndexConverter> IndexQuery<C> {
    /// Start a query on `index_name` in `namespace`
    ///
    /// The converter's suffix is appended unless the name already ends with it.
    pub fn builder(namespace: Namespace, index_name: &str) -> IndexQueryBuilder<C> {
        IndexQueryBuilder {
            namespace,
            index_name: C::index_name(index_name),
            criteria: Vec::new(),
            return_terms: false,
            pagination_sort: None,
            max_results: None,
            term_filter: None,
            continuation: None,
            timeout: None,
            _converter: PhantomData,
        }
    }

    /// Namespace being queried
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Full index name sent to the server
    pub fn index_name(&self) -> &BinaryValue {
        &self.index_name
    }

    /// Selection criterion
    pub fn criteria(&self) -> &IndexCriteria {
        &self.criteria
    }

    /// The same query resuming at `token`
    pub fn with_continuation(&self, token: impl Into<BinaryValue>) -> RiakResult<Self> {
        if matches!(self.criteria, IndexCriteria::CoverageContext(_)) {
            return Err(RiakError::invalid(
                "continuation cannot be combined with a coverage context",
            ));
        }
        let mut next = self.clone();
        next.continuation = Some(token.into());
        Ok(next)
    }

    /// The wire request for this query
    pub fn to_request(&self, streaming: bool) -> IndexQueryRequest {
        IndexQueryRequest {
            namespace: self.namespace.clone(),
            index_name: self.index_name.clone(),
            criteria: self.criteria.clone(),
            return_terms: self.return_terms,
            pagination_sort: self.pagination_sort,
            max_results: self.max_results,
            term_filter: self.term_filter.clone(),
            continuation: self.continuation.clone(),
            timeout: self.timeout,
            streaming,
        }
    }

    /// Run the query and collect every result of the page
    pub async fn execute(&self, cluster: &dyn RiakCluster) -> RiakResult<IndexResponse<C>> {
        debug!(
            namespace = %self.namespace,
            index = %self.index_name,
            "Submitting index query"
        );
        match cluster.submit(CoreOperation::IndexQuery(self.to_request(false))).await? {
            CoreResponse::IndexQuery(chunk) => {
                debug!(entries = chunk.entries.len(), "Decoded index query");
                Ok(IndexResponse::materialized(self.namespace.clone(), chunk))
            }
            other => Err(RiakError::malformed(format!(
                "expected index_query response, got {}",
                other.name()
            ))),
        }
    }

    /// Blocking form of [`execute`](Self::execute)
    pub fn execute_blocking(&self, cluster: &dyn RiakCluster) -> RiakResult<IndexResponse<C>> {
        futures::executor::block_on(self.execute(cluster))
    }

    /// Run the query as a stream of chunks
    ///
    /// Each wait for more results is bounded by `chunk_timeout`, or by the
    /// cluster's configured chunk timeout when `None`.
    pub fn execute_streaming(
        &self,
        cluster: &dyn RiakCluster,
        chunk_timeout: Option<Duration>,
    ) -> RiakResult<IndexResponse<C>> {
        let timeout = chunk_timeout.unwrap_or_else(|| cluster.streaming_config().chunk_timeout());
        debug!(
            namespace = %self.namespace,
            index = %self.index_name,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Submitting streaming index query"
        );
        let future = cluster.submit_streaming(CoreOperation::IndexQuery(self.to_request(true)))?;
        let iterator = IndexEntryIterator::new(
            future.into_receiver(),
            timeout,
            EntrySplitter::new(self.namespace.clone()),
        );
        Ok(IndexResponse::streaming(iterator))
    }
}

impl<C: IndexConverter> Clone for IndexQuery<C> {
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            index_name: self.index_name.clone(),
            criteria: self.criteria.clone(),
            return_terms: self.return_terms,
            pagination_sort: self.pagination_sort,
            max_results: self.max_results,
            term_filter: self.term_filter.clone(),
            continuation: self.continuation.clone(),
            timeout: self.timeout,
            _converter: PhantomData,
        }
    }
}

impl<C: IndexConverter> fmt::Debug for IndexQuery<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexQuery")
            .field("namespace", &self.namespace)
            .field("index_name", &self.index_name)
            .field("criteria", &self.criteria)
            .field("return_terms", &self.return_terms)
            .field("max_results", &self.max_results)
            .field("continuation", &self.continuation)
            .finish_non_exhaustive()
    }
}

/// Every key in a bucket, via the `$bucket` index
#[derive(Debug, Clone, Copy)]
pub struct BucketIndexQuery;

impl BucketIndexQuery {
    /// Start a query listing the keys of `namespace`
    pub fn builder(namespace: Namespace) -> IndexQueryBuilder<RawConverter> {
        let bucket = namespace.bucket().clone();
        RawIndexQuery::builder(namespace, BUCKET_INDEX).match_value(bucket)
    }
}

/// Keys in an inclusive range, via the `$key` index
#[derive(Debug, Clone, Copy)]
pub struct KeyIndexQuery;

impl KeyIndexQuery {
    /// Start a query for keys of `namespace` in `start..=end`
    pub fn builder(
        namespace: Namespace,
        start: impl Into<BinaryValue>,
        end: impl Into<BinaryValue>,
    ) -> IndexQueryBuilder<RawConverter> {
        RawIndexQuery::builder(namespace, KEY_INDEX).range(start.into(), end.into())
    }
}
