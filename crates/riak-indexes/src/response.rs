//! Index query responses

use crate::converter::IndexConverter;
use crate::streaming::{ChunkSplitter, ChunkedResponseIterator};
use riak_core::{
    BinaryValue, IndexChunk, IndexEntry, Location, Namespace, RiakError, RiakResult,
};
use std::fmt;
use std::marker::PhantomData;

/// One query result
pub struct Entry<C: IndexConverter> {
    location: Location,
    raw_index_key: Option<BinaryValue>,
    _converter: PhantomData<C>,
}

impl<C: IndexConverter> Entry<C> {
    pub(crate) fn new(location: Location, raw_index_key: Option<BinaryValue>) -> Self {
        Self {
            location,
            raw_index_key,
            _converter: PhantomData,
        }
    }

    /// Location of the matched object
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Key of the matched object
    pub fn object_key(&self) -> &BinaryValue {
        self.location.key()
    }

    /// Index term as received, present when terms were requested
    pub fn raw_index_key(&self) -> Option<&BinaryValue> {
        self.raw_index_key.as_ref()
    }

    /// Index term converted to the query's key type
    ///
    /// Conversion happens on each call; a term the converter cannot read is
    /// reported here rather than failing the whole response.
    pub fn index_key(&self) -> Option<RiakResult<C::Value>> {
        self.raw_index_key.as_ref().map(C::from_bytes)
    }
}

impl<C: IndexConverter> Clone for Entry<C> {
    fn clone(&self) -> Self {
        Self::new(self.location.clone(), self.raw_index_key.clone())
    }
}

impl<C: IndexConverter> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.raw_index_key == other.raw_index_key
    }
}

impl<C: IndexConverter> Eq for Entry<C> {}

impl<C: IndexConverter> fmt::Debug for Entry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("location", &self.location)
            .field("raw_index_key", &self.raw_index_key)
            .finish()
    }
}

/// Turns wire chunks into entries of one namespace
pub struct EntrySplitter<C: IndexConverter> {
    namespace: Namespace,
    _converter: PhantomData<C>,
}

impl<C: IndexConverter> EntrySplitter<C> {
    /// Splitter for results of a query over `namespace`
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            _converter: PhantomData,
        }
    }

    fn entry(&self, entry: IndexEntry) -> Option<Entry<C>> {
        match Location::new(self.namespace.clone(), entry.object_key) {
            Ok(location) => Some(Entry::new(location, entry.index_key)),
            Err(error) => {
                tracing::warn!(%error, "Skipping index entry with an unusable key");
                None
            }
        }
    }
}

impl<C: IndexConverter> fmt::Debug for EntrySplitter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrySplitter")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl<C: IndexConverter> ChunkSplitter<IndexChunk, Entry<C>> for EntrySplitter<C> {
    fn split(&mut self, chunk: IndexChunk) -> (Vec<Entry<C>>, Option<BinaryValue>) {
        let entries = chunk
            .entries
            .into_iter()
            .filter_map(|entry| self.entry(entry))
            .collect();
        (entries, chunk.continuation)
    }
}

/// Streaming iterator over typed index entries
pub type IndexEntryIterator<C> = ChunkedResponseIterator<IndexChunk, EntrySplitter<C>, Entry<C>>;

enum Body<C: IndexConverter> {
    Materialized {
        entries: Vec<Entry<C>>,
        continuation: Option<BinaryValue>,
    },
    Streaming {
        iterator: IndexEntryIterator<C>,
        handed_out: bool,
    },
}

/// Result of an index query
///
/// A single-shot response holds every entry; a streaming response hands out
/// an iterator exactly once.
pub struct IndexResponse<C: IndexConverter> {
    body: Body<C>,
}

impl<C: IndexConverter> IndexResponse<C> {
    pub(crate) fn materialized(namespace: Namespace, chunk: IndexChunk) -> Self {
        let (entries, continuation) = EntrySplitter::<C>::new(namespace).split(chunk);
        Self {
            body: Body::Materialized {
                entries,
                continuation,
            },
        }
    }

    pub(crate) fn streaming(iterator: IndexEntryIterator<C>) -> Self {
        Self {
            body: Body::Streaming {
                iterator,
                handed_out: false,
            },
        }
    }

    /// Whether results are delivered as a stream
    pub fn is_streaming(&self) -> bool {
        matches!(self.body, Body::Streaming { .. })
    }

    /// Every entry of a single-shot response
    pub fn entries(&self) -> RiakResult<&[Entry<C>]> {
        match &self.body {
            Body::Materialized { entries, .. } => Ok(entries),
            Body::Streaming { .. } => Err(RiakError::unsupported(
                "entries() on a streaming response; use iterator()",
            )),
        }
    }

    /// Consume a single-shot response into its entries
    pub fn into_entries(self) -> RiakResult<Vec<Entry<C>>> {
        match self.body {
            Body::Materialized { entries, .. } => Ok(entries),
            Body::Streaming { .. } => Err(RiakError::unsupported(
                "into_entries() on a streaming response; use iterator()",
            )),
        }
    }

    /// The streaming iterator; available once
    pub fn iterator(&mut self) -> RiakResult<&mut IndexEntryIterator<C>> {
        match &mut self.body {
            Body::Materialized { .. } => Err(RiakError::unsupported(
                "iterator() on a non-streaming response; use entries()",
            )),
            Body::Streaming { handed_out: true, .. } => {
                Err(RiakError::unsupported("iterator() called twice"))
            }
            Body::Streaming {
                iterator,
                handed_out,
            } => {
                *handed_out = true;
                Ok(iterator)
            }
        }
    }

    /// Whether a continuation is available; see [`continuation`](Self::continuation)
    pub fn has_continuation(&self) -> bool {
        self.continuation().is_some()
    }

    /// Continuation for the next page
    ///
    /// For a streaming response this is `None` until the iterator has been
    /// drained.
    pub fn continuation(&self) -> Option<&BinaryValue> {
        match &self.body {
            Body::Materialized { continuation, .. } => continuation.as_ref(),
            Body::Streaming { iterator, .. } => iterator.continuation(),
        }
    }
}

impl<C: IndexConverter> fmt::Debug for IndexResponse<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Materialized {
                entries,
                continuation,
            } => f
                .debug_struct("IndexResponse")
                .field("entries", entries)
                .field("continuation", continuation)
                .finish(),
            Body::Streaming { handed_out, .. } => f
                .debug_struct("IndexResponse")
                .field("streaming", &true)
                .field("handed_out", handed_out)
                .field("continuation", &self.continuation())
                .finish(),
        }
    }
}
