/*!
 * Global API Tests
 * Free functions and trait helpers backed by the process-wide cleaner
 */

use super::common::{Counter, Owner, Probe};
use phantom_cleanup::{
    add_exception_handler, register, register_action, register_auto_close, run_cleanup_now,
    set_priority, set_run_on_exit, Cleaner, Cleanup, CleanupError, CleanupFailure, HandleState,
    Tracked,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_free_functions_use_global_cleaner() {
    let runs = Counter::default();
    let owner = Owner::new("global");

    let counter = runs.clone();
    let with_payload = register(&owner, move |n: u32| assert_eq!(n, 7), 7u32).unwrap();
    let plain = register_action(&owner, move || counter.hit()).unwrap();

    let global = Cleaner::global();
    assert_eq!(global.state_of(with_payload), HandleState::Pending);

    drop(owner);
    assert!(run_cleanup_now());
    assert_eq!(runs.get(), 1);
    assert_eq!(global.state_of(with_payload), HandleState::Fired);
    assert_eq!(global.state_of(plain), HandleState::Fired);
}

#[test]
#[serial]
fn test_trait_helpers_register_on_global_cleaner() {
    let runs = Counter::default();
    let buffer = Tracked::new(vec![0u8; 64]);

    let counter = runs.clone();
    buffer
        .register_cleanup(move |label: String| {
            assert_eq!(label, "scratch");
            counter.hit();
        }, String::from("scratch"))
        .unwrap();
    let counter = runs.clone();
    buffer.register_cleanup_action(move || counter.hit()).unwrap();

    drop(buffer);
    assert!(run_cleanup_now());
    assert_eq!(runs.get(), 2);
}

#[test]
#[serial]
fn test_global_auto_close_and_handlers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    add_exception_handler(move |failure| {
        if let CleanupFailure::CloseFailed { source, .. } = failure {
            sink.lock().push(source.to_string());
        }
    });

    let owner = Owner::new("global-close");
    let resources = vec![
        Probe {
            name: "global-a",
            fail: true,
            log: Arc::clone(&log),
        },
        Probe {
            name: "global-b",
            fail: false,
            log: Arc::clone(&log),
        },
    ];
    register_auto_close(&owner, resources).unwrap();

    drop(owner);
    assert!(run_cleanup_now());
    assert_eq!(*log.lock(), vec!["global-a", "global-b"]);
    assert_eq!(*failures.lock(), vec!["global-a failed".to_string()]);
}

#[test]
#[serial]
fn test_global_priority_validation() {
    assert_eq!(set_priority(0), Err(CleanupError::InvalidPriority(0)));
    assert_eq!(set_priority(11), Err(CleanupError::InvalidPriority(11)));
    assert!(set_priority(phantom_cleanup::MIN_PRIORITY as i32).is_ok());
    assert_eq!(Cleaner::global().priority(), phantom_cleanup::MIN_PRIORITY);
}

#[test]
#[serial]
fn test_global_run_on_exit_toggle() {
    set_run_on_exit(true);
    assert!(Cleaner::global().runs_on_exit());
    set_run_on_exit(false);
    assert!(!Cleaner::global().runs_on_exit());
}

#[cfg(unix)]
#[test]
#[serial]
fn test_global_run_on_exit_installs_exit_hook() {
    set_run_on_exit(true);
    let global = Cleaner::global();
    assert!(global.exit_hook_installed());

    // Disabling keeps the hook but it no longer drains
    set_run_on_exit(false);
    assert!(global.exit_hook_installed());
    assert!(!global.runs_on_exit());
}

#[test]
#[serial]
fn test_independent_cleaners_never_install_exit_hook() {
    let cleaner = super::common::detached();
    cleaner.set_run_on_exit(true);
    assert!(cleaner.runs_on_exit());
    assert!(!cleaner.exit_hook_installed());
}

#[test]
#[serial]
fn test_global_cleaner_is_a_singleton() {
    let first = Cleaner::global();
    let second = Cleaner::try_global().unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(first.has_daemon());
}
