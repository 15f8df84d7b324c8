/*!
 * Auto-Close Tests
 * Ordered closing of resources after the owner is dropped
 */

use super::common::{cleaner, Owner, Probe};
use phantom_cleanup::{Anchor, Cleanup, CleanupError, CleanupFailure, Close};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::io;
use std::sync::Arc;

fn probes(
    log: &Arc<Mutex<Vec<&'static str>>>,
    entries: &[(&'static str, bool)],
) -> Vec<Probe> {
    entries.iter()
        .map(|&(name, fail)| Probe {
            name,
            fail,
            log: Arc::clone(log),
        })
        .collect()
}

#[test]
fn test_resources_close_in_order_despite_failures() {
    let cleaner = cleaner();
    let log = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    cleaner.add_exception_handler(move |failure| {
        if let CleanupFailure::CloseFailed { index, source } = failure {
            sink.lock().push((*index, source.to_string()));
        }
    });

    let owner = Owner::new("connection");
    // Reverse creation order: statement, then session, then socket
    let resources = probes(
        &log,
        &[("statement", false), ("session", true), ("socket", false)],
    );
    cleaner.register_auto_close(&owner, resources).unwrap();

    assert!(cleaner.run_cleanup_now());
    assert!(log.lock().is_empty());

    drop(owner);
    assert!(cleaner.run_cleanup_now());

    assert_eq!(*log.lock(), vec!["statement", "session", "socket"]);
    assert_eq!(
        *failures.lock(),
        vec![(1, "session failed".to_string())]
    );
    // Close failures are not action failures
    assert_eq!(cleaner.stats().action_failures, 0);
}

#[test]
fn test_empty_resource_list_is_rejected() {
    let cleaner = cleaner();
    let owner = Owner::new("empty");

    let err = cleaner
        .register_auto_close(&owner, Vec::<Probe>::new())
        .unwrap_err();

    assert_eq!(err, CleanupError::NullArgument("resources".to_string()));
    assert_eq!(cleaner.pending(), 0);
}

/// Owner that is itself closeable
struct Session {
    anchor: Anchor,
}

impl Cleanup for Session {
    fn anchor(&self) -> &Anchor {
        &self.anchor
    }
}

impl Close for Session {
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_owner_in_resource_list_is_rejected() {
    let cleaner = cleaner();
    let session = || Session {
        anchor: Anchor::new(),
    };
    let owner = Arc::new(session());
    let other = Arc::new(session());

    let resources = vec![other, Arc::clone(&owner)];
    let err = cleaner.register_auto_close(&*owner, resources).unwrap_err();

    assert_eq!(
        err,
        CleanupError::SelfReference {
            owner: Arc::as_ptr(&owner) as usize
        }
    );
    assert_eq!(cleaner.pending(), 0);
}

#[test]
fn test_mixed_boxed_resources() {
    let cleaner = cleaner();
    let log = Arc::new(Mutex::new(Vec::new()));
    let owner = Owner::new("mixed");

    let shared = Arc::new(Probe {
        name: "shared",
        fail: false,
        log: Arc::clone(&log),
    });
    let resources: Vec<Box<dyn Close>> = vec![
        Box::new(Probe {
            name: "owned",
            fail: false,
            log: Arc::clone(&log),
        }),
        Box::new(Arc::clone(&shared)),
    ];
    cleaner.register_auto_close(&owner, resources).unwrap();

    drop(owner);
    assert!(cleaner.run_cleanup_now());
    assert_eq!(*log.lock(), vec!["owned", "shared"]);
}
