//! Streaming index query tests
//!
//! Drives `execute_streaming` against the simulated cluster and
//! `ChunkedResponseIterator` against scripted producers:
//! - complete delivery across several chunks
//! - stalls surface as timeouts, never as exhaustion
//! - producer failures and aborts are terminal
//! - continuations appear once the stream is drained
//! - abandoning a stream releases its producer

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use riak_core::{
    ClientConfig, IndexChunk, IndexEntry, Location, Namespace, RiakError, StreamingConfig,
};
use riak_indexes::prelude::*;
use riak_indexes::{EntrySplitter, RawConverter};
use riak_testkit::{
    init_test_tracing, MockCluster, ScriptStep, ScriptedProducer, StreamBehavior,
};
use std::thread;
use std::time::{Duration, Instant};

const SHORT: Duration = Duration::from_millis(50);
const LONG: Duration = Duration::from_secs(5);

// ========== Test Utilities ==========

fn sensors() -> Namespace {
    Namespace::new("default", "sensors").unwrap()
}

/// Five objects `s0`..`s4` with `reading_int` terms 10, 20, .., 50
fn seeded_cluster() -> MockCluster {
    init_test_tracing();
    let cluster = MockCluster::new();
    for i in 0..5 {
        let location = Location::new(sensors(), format!("s{i}")).unwrap();
        cluster.index(&location, "reading_int", ((i + 1) * 10).to_string());
    }
    cluster
}

fn all_readings() -> IntIndexQuery {
    IntIndexQuery::builder(sensors(), "reading")
        .range(0, 100)
        .return_terms(true)
        .build()
        .unwrap()
}

fn chunk(keys: &[&str]) -> IndexChunk {
    IndexChunk {
        entries: keys.iter().map(|k| IndexEntry::new(*k, None)).collect(),
        continuation: None,
    }
}

// ========== Complete delivery ==========

#[test]
fn every_entry_arrives_then_has_next_is_false() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::Deliver { chunk_size: 2 });

    let mut response = all_readings().execute_streaming(&cluster, Some(LONG)).unwrap();
    assert!(response.is_streaming());
    assert_matches!(response.entries(), Err(RiakError::Unsupported { .. }));

    let iterator = response.iterator().unwrap();
    let mut readings = Vec::new();
    while iterator.has_next().unwrap() {
        let entry = iterator.next_entry().unwrap();
        readings.push(entry.index_key().unwrap().unwrap());
    }
    assert_eq!(readings, vec![10, 20, 30, 40, 50]);
    assert!(iterator.is_exhausted());
    assert!(!iterator.has_next().unwrap());
    assert_eq!(iterator.next_entry().unwrap_err(), RiakError::NoSuchElement);
    assert!(!response.has_continuation());

    assert!(cluster.producers().wait_idle(LONG));
}

#[test]
fn iterator_adapter_collects_entries() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::Deliver { chunk_size: 3 });

    let mut response = all_readings().execute_streaming(&cluster, Some(LONG)).unwrap();
    let keys: Vec<String> = response
        .iterator()
        .unwrap()
        .map(|entry| entry.unwrap().object_key().to_string())
        .collect();
    assert_eq!(keys, vec!["s0", "s1", "s2", "s3", "s4"]);
}

#[test]
fn default_timeout_comes_from_cluster_config() {
    init_test_tracing();
    let cluster = MockCluster::with_config(StreamingConfig {
        chunk_timeout_ms: 40,
        chunk_queue_capacity: 4,
    });
    let mut response = all_readings().execute_streaming(&cluster, None).unwrap();
    let iterator = response.iterator().unwrap();
    assert_eq!(iterator.timeout(), Duration::from_millis(40));
    assert!(!iterator.has_next().unwrap());
}

#[test]
fn configured_timeout_reaches_streaming_queries() {
    init_test_tracing();
    let mut config = ClientConfig::from_toml_str(
        "default_bucket_type = \"telemetry\"\n[streaming]\nchunk_timeout_ms = 60\n",
    )
    .unwrap();
    let cluster = MockCluster::from_config(&config);
    assert_eq!(cluster.streaming_config(), config.streaming);

    let namespace = config.namespace("sensors").unwrap();
    assert_eq!(namespace.bucket_type().as_bytes(), b"telemetry");
    let query = IntIndexQuery::builder(namespace, "reading")
        .range(0, 100)
        .build()
        .unwrap();
    let mut response = query.execute_streaming(&cluster, None).unwrap();
    assert_eq!(response.iterator().unwrap().timeout(), Duration::from_millis(60));

    config
        .merge_with_vars(vec![(
            "RIAK_STREAM_CHUNK_TIMEOUT_MS".to_string(),
            "90".to_string(),
        )])
        .unwrap();
    let cluster = MockCluster::from_config(&config);
    let mut response = query.execute_streaming(&cluster, None).unwrap();
    assert_eq!(response.iterator().unwrap().timeout(), Duration::from_millis(90));
}

#[test]
fn unbounded_chunk_timeout_streams_normally() {
    let cluster = seeded_cluster();
    let mut response = all_readings()
        .execute_streaming(&cluster, Some(Duration::MAX))
        .unwrap();
    let iterator = response.iterator().unwrap();
    assert_eq!(iterator.timeout(), Duration::MAX);
    assert_eq!(iterator.by_ref().filter(Result::is_ok).count(), 5);
    assert!(iterator.is_exhausted());
}

// ========== Stalls and timeouts ==========

#[test]
fn stalled_producer_times_out_instead_of_ending() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::StallAfter {
        chunks: 1,
        chunk_size: 2,
    });

    let mut response = all_readings().execute_streaming(&cluster, Some(SHORT)).unwrap();
    let iterator = response.iterator().unwrap();
    assert_eq!(iterator.next_entry().unwrap().object_key().to_string(), "s0");
    assert_eq!(iterator.next_entry().unwrap().object_key().to_string(), "s1");

    let started = Instant::now();
    let err = iterator.has_next().unwrap_err();
    assert!(err.is_timeout());
    assert!(err.is_retryable());
    assert!(started.elapsed() >= SHORT);
    assert_eq!(err, RiakError::stream_timeout(SHORT));

    // Still not exhausted; a second wait times out the same way.
    assert!(!iterator.is_exhausted());
    assert!(iterator.has_next().unwrap_err().is_timeout());
    assert!(!response.has_continuation());

    drop(response);
    assert!(cluster.producers().wait_idle(LONG));
}

#[test]
fn abandoning_a_fast_stream_releases_the_producer() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::Deliver { chunk_size: 1 });

    let mut response = all_readings().execute_streaming(&cluster, Some(LONG)).unwrap();
    assert!(response.iterator().unwrap().next_entry().is_ok());
    drop(response);
    assert!(cluster.producers().wait_idle(LONG));
    assert_eq!(cluster.producers().active(), 0);
}

#[test]
fn late_chunk_is_picked_up_after_a_timeout() {
    let (_producer, receiver) = ScriptedProducer::spawn(
        2,
        vec![
            ScriptStep::Sleep(Duration::from_millis(150)),
            ScriptStep::Chunk(chunk(&["late"])),
            ScriptStep::Complete,
        ],
    );
    let mut iterator = IndexEntryIterator::<RawConverter>::new(
        receiver,
        SHORT,
        EntrySplitter::new(sensors()),
    );

    assert!(iterator.has_next().unwrap_err().is_timeout());
    iterator.set_timeout(LONG);
    assert!(iterator.has_next().unwrap());
    assert_eq!(iterator.next_entry().unwrap().object_key().to_string(), "late");
    assert!(!iterator.has_next().unwrap());
}

#[test]
fn interrupt_releases_a_blocked_wait() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::StallAfter {
        chunks: 0,
        chunk_size: 2,
    });

    let mut response = all_readings().execute_streaming(&cluster, Some(LONG)).unwrap();
    let iterator = response.iterator().unwrap();
    let handle = iterator.interrupt_handle();
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        handle.interrupt();
    });

    let started = Instant::now();
    assert_eq!(iterator.has_next(), Err(RiakError::Interrupted));
    assert!(started.elapsed() < LONG);
    assert!(!iterator.is_exhausted());
    interrupter.join().unwrap();
}

// ========== Failures ==========

#[test]
fn producer_failure_is_reported_once_by_the_iterator() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::FailAfter {
        chunks: 1,
        chunk_size: 2,
        error: RiakError::transport("vnode crashed"),
    });

    let mut response = all_readings().execute_streaming(&cluster, Some(LONG)).unwrap();
    let results: Vec<_> = response.iterator().unwrap().collect();
    assert_eq!(results.len(), 3);
    assert!(results[..2].iter().all(Result::is_ok));
    assert_eq!(results[2], Err(RiakError::transport("vnode crashed")));

    let iterator = response.iterator();
    assert_matches!(iterator, Err(RiakError::Unsupported { .. }));
}

#[test]
fn failure_is_terminal_for_has_next() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::FailAfter {
        chunks: 0,
        chunk_size: 2,
        error: RiakError::transport("overload"),
    });

    let mut response = all_readings().execute_streaming(&cluster, Some(LONG)).unwrap();
    let iterator = response.iterator().unwrap();
    assert_eq!(iterator.has_next(), Err(RiakError::transport("overload")));
    assert_eq!(iterator.has_next(), Err(RiakError::transport("overload")));
    assert!(!iterator.is_exhausted());
}

#[test]
fn vanished_producer_is_an_abort() {
    let (_producer, receiver) = ScriptedProducer::spawn(
        2,
        vec![ScriptStep::Chunk(chunk(&["only"])), ScriptStep::Abort],
    );
    let mut iterator = IndexEntryIterator::<RawConverter>::new(
        receiver,
        LONG,
        EntrySplitter::new(sensors()),
    );

    assert!(iterator.next_entry().is_ok());
    assert_matches!(iterator.has_next(), Err(RiakError::StreamAborted { .. }));
    // The iterator adapter reports the terminal error once, then ends.
    assert_matches!(iterator.next(), Some(Err(RiakError::StreamAborted { .. })));
    assert!(iterator.next().is_none());
}

#[test]
fn streaming_non_index_operations_is_unsupported() {
    let cluster = seeded_cluster();
    let location = Location::new(sensors(), "s0").unwrap();
    let operation = riak_core::CoreOperation::DtFetch(riak_core::DtFetchRequest::new(location));
    let err = riak_core::RiakCluster::submit_streaming(&cluster, operation).unwrap_err();
    assert_matches!(err, RiakError::Unsupported { .. });
}

// ========== Continuations ==========

#[test]
fn continuation_is_available_after_drain() {
    let cluster = seeded_cluster();
    cluster.set_stream_behavior(StreamBehavior::Deliver { chunk_size: 2 });
    let query = IntIndexQuery::builder(sensors(), "reading")
        .range(0, 100)
        .max_results(3)
        .build()
        .unwrap();

    let mut first = query.execute_streaming(&cluster, Some(LONG)).unwrap();
    assert!(!first.has_continuation());
    {
        let iterator = first.iterator().unwrap();
        assert_eq!(iterator.next_entry().unwrap().object_key().to_string(), "s0");
        assert!(!iterator.has_continuation());
        assert_eq!(iterator.by_ref().count(), 2);
    }
    let token = first.continuation().cloned().unwrap();

    let mut second = query
        .with_continuation(token)
        .unwrap()
        .execute_streaming(&cluster, Some(LONG))
        .unwrap();
    let rest: Vec<String> = second
        .iterator()
        .unwrap()
        .map(|entry| entry.unwrap().object_key().to_string())
        .collect();
    assert_eq!(rest, vec!["s3", "s4"]);
    assert!(!second.has_continuation());
}
