//! Simulated secondary index storage and query evaluation
//!
//! Terms of `_int` indexes are compared as arbitrary-precision integers, all
//! other terms byte-wise. Results are ordered by (term, key) and paged with
//! continuations that only resume the query they were issued for.

use num_bigint::BigInt;
use regex::bytes::Regex;
use riak_core::{
    BinaryValue, IndexChunk, IndexCriteria, IndexEntry, IndexQueryRequest, Location, Namespace,
    RiakError, RiakResult,
};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

/// Special index matching every key of a bucket
pub const BUCKET_INDEX: &str = "$bucket";
/// Special index over the object keys themselves
pub const KEY_INDEX: &str = "$key";

const INT_SUFFIX: &[u8] = b"_int";

/// Index postings keyed by (namespace, index name)
#[derive(Debug, Default)]
pub struct IndexStore {
    postings: BTreeMap<(Namespace, BinaryValue), BTreeSet<(BinaryValue, BinaryValue)>>,
}

impl IndexStore {
    /// Record that `location` carries `term` in `index_name`
    pub fn insert(&mut self, location: &Location, index_name: BinaryValue, term: BinaryValue) {
        self.postings
            .entry((location.namespace().clone(), index_name))
            .or_default()
            .insert((term, location.key().clone()));
    }

    /// Keys known in a namespace from index postings
    pub fn keys_in(&self, namespace: &Namespace) -> BTreeSet<BinaryValue> {
        self.postings
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .flat_map(|(_, postings)| postings.iter().map(|(_, key)| key.clone()))
            .collect()
    }

    /// Evaluate a query, returning one page of results
    ///
    /// `extra_keys` are keys stored outside the index (datatype objects) that
    /// the `$bucket` and `$key` indexes also see.
    pub fn query(
        &self,
        request: &IndexQueryRequest,
        extra_keys: &BTreeSet<BinaryValue>,
    ) -> RiakResult<IndexChunk> {
        let filter = request
            .term_filter
            .as_ref()
            .map(|pattern| {
                Regex::new(&pattern.to_string_lossy())
                    .map_err(|e| RiakError::transport(format!("invalid term filter: {e}")))
            })
            .transpose()?;

        let mut matched = self.candidates(request, extra_keys)?;
        if let Some(filter) = &filter {
            matched.retain(|(term, _)| filter.is_match(term.as_bytes()));
        }
        let numeric = is_int_index(&request.index_name);
        matched.sort_by(|a, b| compare_terms(&a.0, &b.0, numeric).then_with(|| a.1.cmp(&b.1)));

        let offset = match &request.continuation {
            Some(token) => decode_continuation(token, fingerprint(request))?,
            None => 0,
        };
        let start = offset.min(matched.len());
        let remaining = matched.len() - start;
        let take = request
            .max_results
            .map_or(remaining, |max| remaining.min(max as usize));
        let end = start + take;

        let entries = matched[start..end]
            .iter()
            .map(|(term, key)| {
                let term = request.return_terms.then(|| term.clone());
                IndexEntry::new(key.clone(), term)
            })
            .collect();
        let continuation = (request.max_results.is_some() && end < matched.len())
            .then(|| encode_continuation(fingerprint(request), end));

        Ok(IndexChunk {
            entries,
            continuation,
        })
    }

    fn candidates(
        &self,
        request: &IndexQueryRequest,
        extra_keys: &BTreeSet<BinaryValue>,
    ) -> RiakResult<Vec<(BinaryValue, BinaryValue)>> {
        let index = request.index_name.as_bytes();
        if index == BUCKET_INDEX.as_bytes() || index == KEY_INDEX.as_bytes() {
            let mut keys = self.keys_in(&request.namespace);
            keys.extend(extra_keys.iter().cloned());
            let postings = keys.into_iter().map(|key| {
                let term = if index == BUCKET_INDEX.as_bytes() {
                    request.namespace.bucket().clone()
                } else {
                    key.clone()
                };
                (term, key)
            });
            return Ok(select(postings, &request.criteria, false));
        }

        let postings = self
            .postings
            .get(&(request.namespace.clone(), request.index_name.clone()))
            .into_iter()
            .flat_map(|postings| postings.iter().cloned());
        Ok(select(postings, &request.criteria, is_int_index(&request.index_name)))
    }
}

fn select(
    postings: impl Iterator<Item = (BinaryValue, BinaryValue)>,
    criteria: &IndexCriteria,
    numeric: bool,
) -> Vec<(BinaryValue, BinaryValue)> {
    postings
        .filter(|(term, _)| match criteria {
            IndexCriteria::Match(value) => compare_terms(term, value, numeric) == Ordering::Equal,
            IndexCriteria::Range { start, end } => {
                compare_terms(term, start, numeric) != Ordering::Less
                    && compare_terms(term, end, numeric) != Ordering::Greater
            }
            // A coverage read returns everything on the covered partition.
            IndexCriteria::CoverageContext(_) => true,
        })
        .collect()
}

fn is_int_index(name: &BinaryValue) -> bool {
    name.as_bytes().ends_with(INT_SUFFIX)
}

fn parse_int(term: &BinaryValue) -> Option<BigInt> {
    term.as_str().and_then(|s| s.parse().ok())
}

fn compare_terms(a: &BinaryValue, b: &BinaryValue, numeric: bool) -> Ordering {
    if numeric {
        if let (Some(a), Some(b)) = (parse_int(a), parse_int(b)) {
            return a.cmp(&b);
        }
    }
    a.cmp(b)
}

fn fingerprint(request: &IndexQueryRequest) -> u64 {
    let mut hasher = DefaultHasher::new();
    request.namespace.hash(&mut hasher);
    request.index_name.hash(&mut hasher);
    request.criteria.hash(&mut hasher);
    request.return_terms.hash(&mut hasher);
    request.term_filter.hash(&mut hasher);
    hasher.finish()
}

fn encode_continuation(fingerprint: u64, offset: usize) -> BinaryValue {
    BinaryValue::from(format!("{fingerprint:016x}:{offset}"))
}

fn decode_continuation(token: &BinaryValue, expected: u64) -> RiakResult<usize> {
    let invalid = || RiakError::transport("continuation does not belong to this query");
    let text = token.as_str().ok_or_else(invalid)?;
    let (print, offset) = text.split_once(':').ok_or_else(invalid)?;
    let print = u64::from_str_radix(print, 16).map_err(|_| invalid())?;
    if print != expected {
        return Err(invalid());
    }
    offset.parse().map_err(|_| invalid())
}
