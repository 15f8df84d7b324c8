/*!
 * Daemon Tests
 * Concurrency, payload exclusion and daemon resilience
 */

use super::common::{cleaner, Counter, Owner};
use phantom_cleanup::{CleanupFailure, HandleState, Tracked};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_concurrent_registration_fires_every_handle() {
    let cleaner = Arc::new(cleaner());
    let runs = Counter::default();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let cleaner = Arc::clone(&cleaner);
            let runs = runs.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    let owner = Owner::new("worker");
                    let counter = runs.clone();
                    cleaner
                        .register_action(&owner, move || counter.hit())
                        .unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(cleaner.run_cleanup_now());
    assert_eq!(runs.get(), 1000);

    let stats = cleaner.stats();
    assert_eq!(stats.registered, 1000);
    assert_eq!(stats.fired, 1000);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.backlog(), 0);
}

#[test]
fn test_shared_payload_cleanups_never_overlap() {
    // Several flushing threads consume concurrently when there is no daemon
    let cleaner = Arc::new(super::common::detached());
    let shared = Arc::new(Mutex::new(0u32));
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let owners: Vec<_> = (0..16).map(|_| Owner::new("shared")).collect();
    for owner in &owners {
        let inside = Arc::clone(&inside);
        let max_inside = Arc::clone(&max_inside);
        cleaner
            .register(
                owner,
                move |state: Arc<Mutex<u32>>| {
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(1));
                    *state.lock() += 1;
                    inside.fetch_sub(1, Ordering::SeqCst);
                },
                Arc::clone(&shared),
            )
            .unwrap();
    }
    drop(owners);

    let flushers: Vec<_> = (0..4)
        .map(|_| {
            let cleaner = Arc::clone(&cleaner);
            thread::spawn(move || cleaner.run_cleanup_now())
        })
        .collect();
    for flusher in flushers {
        assert!(flusher.join().unwrap());
    }

    assert_eq!(*shared.lock(), 16);
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
}

#[test]
fn test_interrupt_is_reported_and_daemon_survives() {
    let cleaner = cleaner();
    let interrupts = Counter::default();
    let counter = interrupts.clone();
    cleaner.add_exception_handler(move |failure| {
        if matches!(failure, CleanupFailure::Interrupted) {
            counter.hit();
        }
    });

    let runs = Counter::default();
    let owner = Owner::new("after-interrupt");
    let counter = runs.clone();
    cleaner.register_action(&owner, move || counter.hit()).unwrap();

    cleaner.interrupt();
    drop(owner);
    assert!(cleaner.run_cleanup_now());

    assert_eq!(interrupts.get(), 1);
    assert_eq!(runs.get(), 1);
    assert!(cleaner.has_daemon());
}

#[test]
fn test_handle_state_transitions() {
    // No daemon, so the ready state can be observed before firing
    let cleaner = super::common::detached();
    let owner = Tracked::new(vec![1u8, 2, 3]);
    let id = cleaner.register_action(&owner, || {}).unwrap();

    assert_eq!(cleaner.state_of(id), HandleState::Pending);
    drop(owner);
    assert_eq!(cleaner.state_of(id), HandleState::Ready);
    assert_eq!(cleaner.stats().ready, 1);

    assert!(cleaner.run_cleanup_now());
    assert_eq!(cleaner.state_of(id), HandleState::Fired);
}

#[test]
fn test_priority_changes_apply_to_running_daemon() {
    let cleaner = cleaner();
    // The OS may refuse a raise without privileges; only validation fails the call
    cleaner.set_priority(2).unwrap();
    cleaner.set_priority(1).unwrap();
    assert_eq!(cleaner.priority(), 1);
    assert!(cleaner.set_priority(11).is_err());
}

#[test]
fn test_dropping_cleaner_stops_daemon() {
    let runs = Counter::default();
    {
        let cleaner = cleaner();
        let owner = Owner::new("late");
        let counter = runs.clone();
        cleaner.register_action(&owner, move || counter.hit()).unwrap();
        drop(owner);
        assert!(cleaner.run_cleanup_now());
    }
    assert_eq!(runs.get(), 1);
}
