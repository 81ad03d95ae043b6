//! Index query tests against the simulated cluster
//!
//! - Match and range queries over `_bin` and `_int` indexes
//! - `$bucket` and `$key` queries
//! - Regex term filters, return terms
//! - Manual pagination with continuations
//! - Integer term encoding properties

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use num_bigint::BigInt;
use proptest::prelude::*;
use riak_core::{BinaryValue, CoreOperation, IndexCriteria, Location, Namespace, RiakError};
use riak_indexes::prelude::*;
use riak_indexes::{BigIntConverter, IntConverter};
use riak_testkit::{init_test_tracing, MockCluster};

// ========== Test Utilities ==========

fn people() -> Namespace {
    Namespace::new("default", "people").unwrap()
}

fn seeded_cluster() -> MockCluster {
    init_test_tracing();
    let cluster = MockCluster::new();
    let rows = [
        ("alice", "alice@example.com", "34"),
        ("bob", "bob@example.org", "-7"),
        ("carol", "carol@example.com", "0"),
        ("dave", "dave@example.net", "120"),
        ("erin", "erin@example.com", "34"),
    ];
    for (key, email, age) in rows {
        let location = Location::new(people(), key).unwrap();
        cluster.index(&location, "email_bin", email);
        cluster.index(&location, "age_int", age);
    }
    cluster
}

fn keys<C: IndexConverter>(response: &IndexResponse<C>) -> Vec<String> {
    response
        .entries()
        .unwrap()
        .iter()
        .map(|entry| entry.object_key().to_string())
        .collect()
}

// ========== Single-shot queries ==========

#[tokio::test]
async fn int_match_returns_all_holders() {
    let cluster = seeded_cluster();
    let response = IntIndexQuery::builder(people(), "age")
        .match_value(34)
        .return_terms(true)
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();

    assert!(!response.is_streaming());
    assert_eq!(keys(&response), vec!["alice", "erin"]);
    for entry in response.entries().unwrap() {
        assert_eq!(entry.index_key(), Some(Ok(34)));
        assert_eq!(entry.location().namespace(), &people());
    }
}

#[tokio::test]
async fn int_range_orders_numerically() {
    let cluster = seeded_cluster();
    let response = IntIndexQuery::builder(people(), "age")
        .range(-10, 100)
        .return_terms(true)
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();

    let terms: Vec<i64> = response
        .entries()
        .unwrap()
        .iter()
        .map(|e| e.index_key().unwrap().unwrap())
        .collect();
    assert_eq!(terms, vec![-7, 0, 34, 34]);
}

#[tokio::test]
async fn terms_are_omitted_unless_requested() {
    let cluster = seeded_cluster();
    let response = BinIndexQuery::builder(people(), "email")
        .range("a".to_string(), "c".to_string())
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();
    assert_eq!(keys(&response), vec!["alice", "bob"]);
    assert!(response.entries().unwrap().iter().all(|e| e.index_key().is_none()));
}

#[tokio::test]
async fn regex_filter_narrows_string_results() {
    let cluster = seeded_cluster();
    let response = BinIndexQuery::builder(people(), "email")
        .range("a".to_string(), "z".to_string())
        .regex_term_filter("\\.com$")
        .return_terms(true)
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();
    assert_eq!(keys(&response), vec!["alice", "carol", "erin"]);
    assert_eq!(
        response.entries().unwrap()[0].index_key(),
        Some(Ok("alice@example.com".to_string()))
    );
}

#[tokio::test]
async fn bucket_and_key_indexes() {
    let cluster = seeded_cluster();
    let all = BucketIndexQuery::builder(people())
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();
    assert_eq!(keys(&all), vec!["alice", "bob", "carol", "dave", "erin"]);

    let some = KeyIndexQuery::builder(people(), "b", "d")
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();
    assert_eq!(keys(&some), vec!["bob", "carol"]);
}

#[test]
fn blocking_execution() {
    let cluster = seeded_cluster();
    let response = BigIntIndexQuery::builder(people(), "age")
        .range(BigInt::from(100), BigInt::from(1000))
        .return_terms(true)
        .build()
        .unwrap()
        .execute_blocking(&cluster)
        .unwrap();
    let entries = response.into_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index_key(), Some(Ok(BigInt::from(120))));
}

// ========== Pagination ==========

#[tokio::test]
async fn manual_pagination_walks_every_page() {
    let cluster = seeded_cluster();
    let first = BucketIndexQuery::builder(people())
        .max_results(2)
        .build()
        .unwrap();

    let mut query = first.clone();
    let mut seen = Vec::new();
    loop {
        let response = query.execute(&cluster).await.unwrap();
        seen.extend(keys(&response));
        match response.continuation() {
            Some(token) => query = first.with_continuation(token.clone()).unwrap(),
            None => break,
        }
    }
    assert_eq!(seen, vec!["alice", "bob", "carol", "dave", "erin"]);

    let requests: Vec<_> = cluster
        .submitted_operations()
        .into_iter()
        .filter_map(|op| match op {
            CoreOperation::IndexQuery(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].continuation.is_none());
    assert!(requests.iter().all(|r| r.max_results == Some(2) && !r.streaming));
}

#[tokio::test]
async fn continuation_from_another_query_is_refused() {
    let cluster = seeded_cluster();
    let page = BucketIndexQuery::builder(people())
        .max_results(1)
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();
    let token = page.continuation().cloned().unwrap();

    let err = IntIndexQuery::builder(people(), "age")
        .range(0, 200)
        .continuation(token)
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap_err();
    assert_matches!(err, RiakError::Transport { .. });
}

// ========== Wire shape ==========

#[tokio::test]
async fn coverage_context_reaches_the_wire() {
    let cluster = seeded_cluster();
    RawIndexQuery::builder(people(), "email_bin")
        .coverage_context(BinaryValue::from("partition-7"))
        .build()
        .unwrap()
        .execute(&cluster)
        .await
        .unwrap();

    let Some(CoreOperation::IndexQuery(request)) = cluster.submitted_operations().pop() else {
        panic!("expected index query");
    };
    assert_eq!(
        request.criteria,
        IndexCriteria::CoverageContext("partition-7".into())
    );
    assert_eq!(request.max_results, None);
    assert_eq!(request.continuation, None);
}

// ========== Integer encoding properties ==========

proptest! {
    /// i64 terms are their decimal string and decode back exactly
    #[test]
    fn int_terms_round_trip(v in any::<i64>()) {
        let bytes = IntConverter::to_bytes(&v);
        let expected = v.to_string();
        prop_assert_eq!(bytes.as_bytes(), expected.as_bytes());
        prop_assert_eq!(IntConverter::from_bytes(&bytes).unwrap(), v);
    }

    /// Big integer terms agree with i64 terms wherever both apply
    #[test]
    fn big_int_terms_agree_with_i64(v in any::<i64>()) {
        let big = BigInt::from(v);
        prop_assert_eq!(BigIntConverter::to_bytes(&big), IntConverter::to_bytes(&v));
        let decoded = BigIntConverter::from_bytes(&BigIntConverter::to_bytes(&big)).unwrap();
        prop_assert_eq!(decoded, big);
    }

    /// Integer queries put the decimal form on the wire
    #[test]
    fn int_query_criteria_are_decimal(a in any::<i64>(), b in any::<i64>()) {
        let query = IntIndexQuery::builder(people(), "n").range(a, b).build().unwrap();
        prop_assert_eq!(
            query.criteria(),
            &IndexCriteria::Range {
                start: a.to_string().into(),
                end: b.to_string().into(),
            }
        );
    }
}
