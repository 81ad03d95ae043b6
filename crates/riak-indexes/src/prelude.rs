//! Riak indexes prelude.

pub use crate::{
    BigIntIndexQuery, BinIndexQuery, BucketIndexQuery, ChunkedResponseIterator, Entry,
    IndexConverter, IndexEntryIterator, IndexQuery, IndexResponse, IntIndexQuery, KeyIndexQuery,
    RawIndexQuery,
};
pub use riak_core::prelude::*;
