use super::unexpected_response;
use crate::kind::{Counter, DatatypeKind, GSet, Hll, Map, Set};
use crate::options::{FetchOption, FetchOptions};
use riak_core::{
    CausalContext, CoreOperation, CoreResponse, DtFetchRequest, DtFetchResponse, Location,
    RiakCluster, RiakResult,
};
use std::marker::PhantomData;
use tracing::debug;

/// Fetch a counter
pub type FetchCounter = FetchDatatype<Counter>;
/// Fetch a set
pub type FetchSet = FetchDatatype<Set>;
/// Fetch a grow-only set
pub type FetchGSet = FetchDatatype<GSet>;
/// Fetch a map
pub type FetchMap = FetchDatatype<Map>;
/// Fetch a HyperLogLog
pub type FetchHll = FetchDatatype<Hll>;

/// Fetch the current value of a datatype
#[derive(Debug, Clone)]
pub struct FetchDatatype<K> {
    location: Location,
    options: FetchOptions,
    _kind: PhantomData<K>,
}

/// Builder for [`FetchDatatype`]
#[derive(Debug, Clone)]
pub struct FetchDatatypeBuilder<K> {
    location: Location,
    options: FetchOptions,
    _kind: PhantomData<K>,
}

impl<K: DatatypeKind> FetchDatatypeBuilder<K> {
    /// Set an option; a later value of the same option replaces this one
    pub fn with_option(mut self, option: FetchOption) -> Self {
        self.options.set(option);
        self
    }

    /// Finish the command
    pub fn build(self) -> FetchDatatype<K> {
        FetchDatatype {
            location: self.location,
            options: self.options,
            _kind: PhantomData,
        }
    }
}

impl<K: DatatypeKind> FetchDatatype<K> {
    /// Start building a fetch of `location`
    pub fn builder(location: Location) -> FetchDatatypeBuilder<K> {
        FetchDatatypeBuilder {
            location,
            options: FetchOptions::default(),
            _kind: PhantomData,
        }
    }

    /// Object being fetched
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Options set on this command
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// The core operation this command submits
    pub fn to_operation(&self) -> CoreOperation {
        let mut request = DtFetchRequest::new(self.location.clone());
        self.options.apply_to(&mut request);
        CoreOperation::DtFetch(request)
    }

    /// Submit the fetch and decode the typed response
    pub async fn execute(&self, cluster: &dyn RiakCluster) -> RiakResult<FetchResponse<K::View>> {
        debug!(
            kind = K::NAME,
            namespace = %self.location.namespace(),
            key = %self.location.key(),
            "Submitting datatype fetch"
        );
        match cluster.submit(self.to_operation()).await? {
            CoreResponse::DtFetch(response) => self.decode(response),
            other => Err(unexpected_response("dt_fetch", &other)),
        }
    }

    /// Blocking form of [`execute`](Self::execute)
    pub fn execute_blocking(
        &self,
        cluster: &dyn RiakCluster,
    ) -> RiakResult<FetchResponse<K::View>> {
        futures::executor::block_on(self.execute(cluster))
    }

    fn decode(&self, response: DtFetchResponse) -> RiakResult<FetchResponse<K::View>> {
        let context = if K::CARRIES_CONTEXT {
            response.context
        } else {
            None
        };
        let (datatype, not_found) = match response.element {
            Some(element) => (K::view_from_element(element)?, false),
            None => (K::empty_view(), true),
        };
        debug!(kind = K::NAME, not_found, "Decoded datatype fetch");
        Ok(FetchResponse {
            datatype,
            context,
            not_found,
        })
    }
}

/// Result of a datatype fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse<V> {
    datatype: V,
    context: Option<CausalContext>,
    not_found: bool,
}

impl<V> FetchResponse<V> {
    /// The fetched value; the empty value when nothing is stored
    pub fn datatype(&self) -> &V {
        &self.datatype
    }

    /// Consume the response, keeping the value
    pub fn into_datatype(self) -> V {
        self.datatype
    }

    /// Context to pass to the next update of this object
    pub fn context(&self) -> Option<&CausalContext> {
        self.context.as_ref()
    }

    /// Whether a context was returned
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Whether the object did not exist
    pub fn not_found(&self) -> bool {
        self.not_found
    }
}
