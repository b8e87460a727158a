//! Log records emitted by sequence operations.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Metadata, Record};
use nexus_seq::{Arena, Error, LinkedSequence};

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Keeps this crate's records on the thread that produced them, so parallel
/// tests do not see each other's output.
struct Capture;

impl log::Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("nexus_seq")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            RECORDS.with(|records| {
                records
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture;

/// Runs `f` and returns what it logged.
fn captured<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });

    RECORDS.with(|records| records.borrow_mut().clear());
    let out = f();
    let records = RECORDS.with(|records| records.borrow_mut().drain(..).collect());
    (out, records)
}

fn at(records: &[(Level, String)], level: Level) -> Vec<&str> {
    records
        .iter()
        .filter(|(l, _)| *l == level)
        .map(|(_, msg)| msg.as_str())
        .collect()
}

// =============================================================================
// Successful operations
// =============================================================================

#[test]
fn draining_iteration_logs_no_rejection() {
    let seq: LinkedSequence<u64> = [1, 2].into();

    let (drained, records) = captured(|| seq.into_iter().collect::<Vec<_>>());

    assert_eq!(drained, vec![1, 2]);
    assert!(at(&records, Level::Debug).is_empty(), "{records:?}");
}

#[test]
fn for_loop_and_positional_edits_log_no_rejection() {
    let mut seq: LinkedSequence<u64> = [1, 2, 3].into();

    let (sum, records) = captured(|| {
        let first = seq.begin();
        seq.insert_after(first, 10).unwrap();
        seq.erase_after(first).unwrap();
        seq.push_front(0).unwrap();
        for value in seq.iter_mut() {
            *value += 1;
        }
        let mut sum = 0;
        for value in seq.clone() {
            sum += value;
        }
        sum
    });

    assert_eq!(sum, 1 + 2 + 3 + 4);
    assert!(at(&records, Level::Debug).is_empty(), "{records:?}");
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn each_rejected_call_logs_once() {
    let mut seq: LinkedSequence<u64> = LinkedSequence::new();

    let (_, records) = captured(|| {
        assert_eq!(seq.pop_front(), Err(Error::Empty));

        let anchor = seq.before_begin();
        let end = seq.end();
        assert_eq!(seq.erase_after(anchor), Err(Error::NothingAfter));
        assert_eq!(seq.insert_after(end, 1), Err(Error::EndPosition));
        assert_eq!(seq.get(anchor), Err(Error::NotDereferenceable));
        assert_eq!(seq.advance(end), Err(Error::PastEnd));
    });

    let debug = at(&records, Level::Debug);
    assert_eq!(debug.len(), 5, "{records:?}");
    assert!(debug[0].starts_with("pop_front rejected"));
    assert!(debug[1].starts_with("erase_after rejected"));
    assert!(debug[2].starts_with("insert_after rejected"));
    assert!(debug[3].starts_with("get rejected"));
    assert!(debug[4].starts_with("advance rejected"));
}

#[test]
fn stale_and_full_rejections_name_the_error() {
    let mut seq: LinkedSequence<u64> = LinkedSequence::with_storage(Arena::with_limit(1));
    let only = seq.push_front(1).unwrap();

    let (_, records) = captured(|| {
        assert_eq!(seq.push_front(2), Err(Error::StorageFull));
        seq.pop_front().unwrap();
        assert_eq!(seq.get(only), Err(Error::StalePosition));
    });

    let debug = at(&records, Level::Debug);
    assert_eq!(
        debug,
        vec![
            format!("push_front rejected: {}", Error::StorageFull),
            format!("get rejected: {}", Error::StalePosition),
        ]
    );
}

#[test]
fn refused_build_logs_once() {
    let mut seq: LinkedSequence<u64> = LinkedSequence::with_storage(Arena::with_limit(2));

    let (result, records) = captured(|| seq.assign([1, 2, 3]));

    assert_eq!(result, Err(Error::StorageFull));
    assert_eq!(at(&records, Level::Debug).len(), 1, "{records:?}");
    assert!(at(&records, Level::Trace).is_empty(), "{records:?}");
}

// =============================================================================
// Bulk operations
// =============================================================================

#[test]
fn bulk_build_and_clear_trace() {
    let (mut seq, records) = captured(|| (0..4).collect::<LinkedSequence<u64>>());
    assert_eq!(at(&records, Level::Trace), vec!["built sequence of 4 elements"]);

    let (_, records) = captured(|| seq.clear());
    assert_eq!(at(&records, Level::Trace), vec!["cleared 4 elements"]);
    assert!(at(&records, Level::Debug).is_empty());
}
