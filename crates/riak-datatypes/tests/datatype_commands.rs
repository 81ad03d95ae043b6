//! Datatype command tests against the simulated cluster
//!
//! - Fetch/update round trips for every top-level kind
//! - Context handling, including HLL suppression
//! - Server-generated keys
//! - Option omission on the wire
//! - Error propagation

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use riak_core::crdt::{CounterOp, FieldOp, SetOp};
use riak_core::{
    CausalContext, CoreOperation, CoreResponse, CrdtElement, DtFetchResponse, DtOp,
    DtUpdateResponse, FieldRef, FieldType, Location, Namespace, Quorum, RiakError,
};
use riak_datatypes::prelude::*;
use riak_testkit::{init_test_tracing, MockCluster};
use std::collections::BTreeSet;
use std::time::Duration;

// ========== Test Utilities ==========

fn location(bucket_type: &str, key: &str) -> Location {
    Location::new(Namespace::new(bucket_type, "test").unwrap(), key).unwrap()
}

fn last_update(cluster: &MockCluster) -> riak_core::DtUpdateRequest {
    match cluster.submitted_operations().pop() {
        Some(CoreOperation::DtUpdate(request)) => request,
        other => panic!("expected update operation, got {other:?}"),
    }
}

// ========== Counters ==========

#[tokio::test]
async fn counter_update_then_fetch() {
    init_test_tracing();
    let cluster = MockCluster::new();
    let loc = location("counters", "visits");

    for delta in [5, -2, 10] {
        UpdateCounter::builder(loc.clone(), CounterUpdate::new(delta))
            .build()
            .execute(&cluster)
            .await
            .unwrap();
    }

    let response = FetchCounter::builder(loc).build().execute(&cluster).await.unwrap();
    assert_eq!(response.datatype().value(), 13);
    assert!(!response.not_found());
    assert!(response.has_context());
}

#[tokio::test]
async fn missing_object_fetches_as_empty_view() {
    let cluster = MockCluster::new();
    let response = FetchSet::builder(location("sets", "nothing"))
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    assert!(response.not_found());
    assert!(response.datatype().is_empty());
    assert!(response.context().is_none());
}

#[test]
fn blocking_execution_matches_async() {
    let cluster = MockCluster::new();
    let loc = location("counters", "blocking");
    let response = UpdateCounter::builder(loc.clone(), CounterUpdate::new(3))
        .with_option(UpdateOption::ReturnBody(true))
        .build()
        .execute_blocking(&cluster)
        .unwrap();
    assert_eq!(response.datatype().map(RiakCounter::value), Some(3));

    let fetched = FetchCounter::builder(loc).build().execute_blocking(&cluster).unwrap();
    assert_eq!(fetched.datatype().value(), 3);
}

// ========== Contexts ==========

#[tokio::test]
async fn fetched_context_reaches_the_server_unchanged() {
    let cluster = MockCluster::new();
    let loc = location("sets", "cart");
    UpdateSet::builder(loc.clone(), SetUpdate::new().add("apple"))
        .build()
        .execute(&cluster)
        .await
        .unwrap();

    let fetched = FetchSet::builder(loc.clone()).build().execute(&cluster).await.unwrap();
    let context = fetched.context().cloned();
    assert!(context.is_some());

    UpdateSet::builder(loc, SetUpdate::new().remove("apple"))
        .with_context(context.clone())
        .build()
        .execute(&cluster)
        .await
        .unwrap();

    let received = cluster.received_contexts();
    assert_eq!(received, vec![None, context]);
}

#[tokio::test]
async fn include_context_false_omits_context() {
    let cluster = MockCluster::new();
    let loc = location("counters", "quiet");
    cluster.put_element(loc.clone(), CrdtElement::Counter(1));

    let response = FetchCounter::builder(loc)
        .with_option(FetchOption::IncludeContext(false))
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    assert_eq!(response.datatype().value(), 1);
    assert!(!response.has_context());
}

#[tokio::test]
async fn hll_never_sends_a_context() {
    let cluster = MockCluster::new();
    let loc = location("hlls", "visitors");
    UpdateHll::builder(loc.clone(), HllUpdate::new().add("alice").add("bob"))
        .with_context(CausalContext::new("stale-context"))
        .build()
        .execute(&cluster)
        .await
        .unwrap();

    assert_eq!(cluster.received_contexts(), vec![None]);
    assert!(last_update(&cluster).context.is_none());
}

#[tokio::test]
async fn hll_response_never_reports_a_context() {
    let cluster = MockCluster::new();
    let loc = location("hlls", "visitors");
    // A server answer that, against expectations, carries a context.
    cluster.respond_next(CoreResponse::DtUpdate(DtUpdateResponse {
        context: Some(CausalContext::new("unexpected")),
        element: Some(CrdtElement::Hll(2)),
        generated_key: None,
    }));

    let response = UpdateHll::builder(loc.clone(), HllUpdate::new().add("carol"))
        .with_context(CausalContext::new("ignored"))
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    assert!(!response.has_context());
    assert!(response.context().is_none());
    assert_eq!(response.datatype().map(RiakHll::cardinality), Some(2));

    cluster.respond_next(CoreResponse::DtFetch(DtFetchResponse {
        context: Some(CausalContext::new("unexpected")),
        element: Some(CrdtElement::Hll(2)),
    }));
    let fetched = FetchHll::builder(loc).build().execute(&cluster).await.unwrap();
    assert!(!fetched.has_context());
}

#[tokio::test]
async fn hll_counts_distinct_elements() {
    let cluster = MockCluster::new();
    let loc = location("hlls", "distinct");
    for batch in [vec!["a", "b"], vec!["b", "c"], vec!["a"]] {
        UpdateHll::builder(loc.clone(), HllUpdate::new().add_all(batch))
            .build()
            .execute(&cluster)
            .await
            .unwrap();
    }
    let fetched = FetchHll::builder(loc).build().execute(&cluster).await.unwrap();
    assert_eq!(fetched.datatype().cardinality(), 3);
}

// ========== Keys ==========

#[tokio::test]
async fn namespace_update_returns_generated_key() {
    let cluster = MockCluster::new();
    let ns = Namespace::new("sets", "generated").unwrap();
    let response = UpdateSet::builder(ns.clone(), SetUpdate::new().add("x"))
        .build()
        .execute(&cluster)
        .await
        .unwrap();

    let key = response.generated_key().cloned().expect("server generated a key");
    assert!(response.datatype().is_none());

    let fetched = FetchSet::builder(Location::new(ns, key).unwrap())
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    assert!(fetched.datatype().contains("x"));
}

#[tokio::test]
async fn keyed_update_reports_no_generated_key() {
    let cluster = MockCluster::new();
    let response = UpdateGSet::builder(location("gsets", "g"), GSetUpdate::new().add("x"))
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    assert!(response.generated_key().is_none());
}

// ========== Options ==========

#[tokio::test]
async fn unset_options_are_omitted_from_the_request() {
    let cluster = MockCluster::new();
    UpdateCounter::builder(location("counters", "opts"), CounterUpdate::new(1))
        .with_option(UpdateOption::W(Quorum::Count(2)))
        .with_option(UpdateOption::W(Quorum::All))
        .with_option(UpdateOption::Timeout(Duration::from_secs(2)))
        .build()
        .execute(&cluster)
        .await
        .unwrap();

    let request = last_update(&cluster);
    assert_eq!(request.w, Some(Quorum::All));
    assert_eq!(request.timeout, Some(Duration::from_secs(2)));
    assert_eq!(request.dw, None);
    assert_eq!(request.pw, None);
    assert_eq!(request.n_val, None);
    assert_eq!(request.return_body, None);
    assert_eq!(request.sloppy_quorum, None);
}

#[tokio::test]
async fn fetch_options_reach_the_wire() {
    let cluster = MockCluster::new();
    FetchMap::builder(location("maps", "opts"))
        .with_option(FetchOption::R(Quorum::Quorum))
        .with_option(FetchOption::NotFoundOk(true))
        .build()
        .execute(&cluster)
        .await
        .unwrap();

    let Some(CoreOperation::DtFetch(request)) = cluster.submitted_operations().pop() else {
        panic!("expected fetch operation");
    };
    assert_eq!(request.r, Some(Quorum::Quorum));
    assert_eq!(request.notfound_ok, Some(true));
    assert_eq!(request.pr, None);
    assert_eq!(request.basic_quorum, None);
}

// ========== Maps ==========

#[tokio::test]
async fn map_scenario_compiles_and_applies() {
    let update = MapUpdate::new()
        .update("logins", CounterUpdate::new(1))
        .update("cart", SetUpdate::new().add("apple"));

    let op = update.to_op();
    let logins = FieldRef::new("logins", FieldType::Counter);
    let cart = FieldRef::new("cart", FieldType::Set);
    assert_eq!(op.updates.len(), 2);
    assert_eq!(
        op.updates_for(&logins).collect::<Vec<_>>(),
        vec![&FieldOp::Counter(CounterOp { delta: 1 })]
    );
    assert_eq!(
        op.updates_for(&cart).collect::<Vec<_>>(),
        vec![&FieldOp::Set(SetOp {
            adds: BTreeSet::from(["apple".into()]),
            removes: BTreeSet::new(),
        })]
    );

    let cluster = MockCluster::new();
    let response = UpdateMap::builder(location("maps", "user"), update)
        .with_option(UpdateOption::ReturnBody(true))
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    let map = response.datatype().expect("return body requested");
    assert_eq!(map.counter("logins").map(RiakCounter::value), Some(1));
    assert!(map.set("cart").is_some_and(|set| set.contains("apple")));
}

#[tokio::test]
async fn nested_map_round_trip() {
    let cluster = MockCluster::new();
    let loc = location("maps", "profile");
    let update = MapUpdate::new()
        .update("name", RegisterUpdate::new("Ada"))
        .update(
            "prefs",
            MapUpdate::new()
                .update("dark_mode", FlagUpdate::new(true))
                .update("visits", CounterUpdate::new(2)),
        );
    UpdateMap::builder(loc.clone(), update).build().execute(&cluster).await.unwrap();

    let fetched = FetchMap::builder(loc.clone()).build().execute(&cluster).await.unwrap();
    let map = fetched.datatype();
    assert_eq!(map.register("name").map(|r| r.value().to_string()), Some("Ada".into()));
    let prefs = map.map("prefs").expect("nested map present");
    assert_eq!(prefs.flag("dark_mode").map(RiakFlag::enabled), Some(true));
    assert_eq!(prefs.counter("visits").map(RiakCounter::value), Some(2));

    // Removing the nested map drops every field beneath it.
    UpdateMap::builder(loc.clone(), MapUpdate::new().remove_map("prefs"))
        .with_context(fetched.context().cloned())
        .build()
        .execute(&cluster)
        .await
        .unwrap();
    let fetched = FetchMap::builder(loc).build().execute(&cluster).await.unwrap();
    assert!(fetched.datatype().map("prefs").is_none());
    assert_eq!(fetched.datatype().len(), 1);
}

// ========== Errors ==========

#[tokio::test]
async fn wrong_datatype_fails_with_mismatch() {
    let cluster = MockCluster::new();
    let loc = location("counters", "typed");
    cluster.put_element(loc.clone(), CrdtElement::Set(BTreeSet::new()));

    let err = FetchCounter::builder(loc).build().execute(&cluster).await.unwrap_err();
    assert_matches!(err, RiakError::DatatypeMismatch { ref expected, ref actual } => {
        assert_eq!(expected, "counter");
        assert_eq!(actual, "set");
    });
}

#[tokio::test]
async fn transport_failure_passes_through() {
    let cluster = MockCluster::new();
    cluster.fail_next(RiakError::transport("connection refused"));
    let err = UpdateCounter::builder(location("counters", "down"), CounterUpdate::new(1))
        .build()
        .execute(&cluster)
        .await
        .unwrap_err();
    assert_eq!(err, RiakError::transport("connection refused"));
}

#[tokio::test]
async fn unexpected_response_shape_is_malformed() {
    let cluster = MockCluster::new();
    cluster.respond_next(CoreResponse::DtFetch(DtFetchResponse::default()));
    let err = UpdateCounter::builder(location("counters", "odd"), CounterUpdate::new(1))
        .build()
        .execute(&cluster)
        .await
        .unwrap_err();
    assert_matches!(err, RiakError::MalformedResponse { .. });
}

// ========== Resubmission ==========

#[tokio::test]
async fn command_can_be_executed_twice() {
    let cluster = MockCluster::new();
    let loc = location("counters", "twice");
    let command = UpdateCounter::builder(loc.clone(), CounterUpdate::new(4)).build();
    command.execute(&cluster).await.unwrap();
    command.execute(&cluster).await.unwrap();

    let ops = cluster.submitted_operations();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], ops[1]);
    let CoreOperation::DtUpdate(request) = &ops[0] else {
        panic!("expected update operation");
    };
    assert_eq!(request.op, DtOp::Counter(CounterOp { delta: 4 }));

    let fetched = FetchCounter::builder(loc).build().execute(&cluster).await.unwrap();
    assert_eq!(fetched.datatype().value(), 8);
}
