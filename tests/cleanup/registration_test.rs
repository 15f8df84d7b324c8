/*!
 * Registration Tests
 * Exactly-once delivery and payload validation
 */

use super::common::{cleaner, AnonymousState, Counter, DetachedState, InnerState, Owner};
use phantom_cleanup::{
    CleanupError, HandleState, LeakReason, Nesting, Payload, Tracked, TypeShape,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[test]
fn test_cleanup_runs_once_with_registered_payload() {
    let cleaner = cleaner();
    let seen = Arc::new(AtomicU64::new(0));
    let runs = Counter::default();

    let owner = Owner::new("exact");
    let sink = Arc::clone(&seen);
    let counter = runs.clone();
    let id = cleaner
        .register(
            &owner,
            move |value: u64| {
                sink.store(value, Ordering::SeqCst);
                counter.hit();
            },
            4242u64,
        )
        .unwrap();

    assert_eq!(cleaner.state_of(id), HandleState::Pending);
    assert!(cleaner.run_cleanup_now());
    assert_eq!(runs.get(), 0, "cleanup ran while the owner was alive");

    drop(owner);
    assert!(cleaner.run_cleanup_now());

    assert_eq!(runs.get(), 1);
    assert_eq!(seen.load(Ordering::SeqCst), 4242);
    assert_eq!(cleaner.state_of(id), HandleState::Fired);

    // Nothing left to fire a second time
    assert!(cleaner.run_cleanup_now());
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_multiple_registrations_are_independent() {
    let cleaner = cleaner();
    let runs = Counter::default();
    let owner = Owner::new("multi");

    let ids: Vec<_> = (0..3)
        .map(|_| {
            let counter = runs.clone();
            cleaner.register_action(&owner, move || counter.hit()).unwrap()
        })
        .collect();

    assert_eq!(owner_watch_count(&owner), 3);
    assert_eq!(cleaner.pending(), 3);
    drop(owner);
    assert!(cleaner.run_cleanup_now());

    assert_eq!(runs.get(), 3);
    for id in ids {
        assert_eq!(cleaner.state_of(id), HandleState::Fired);
    }
}

fn owner_watch_count(owner: &Owner) -> usize {
    use phantom_cleanup::Cleanup;
    owner.anchor().watched()
}

#[test]
fn test_owner_as_payload_is_rejected() {
    let cleaner = cleaner();
    let owner = Arc::new(Tracked::new(String::from("self")));

    let err = cleaner
        .register(&*owner, |_: Arc<Tracked<String>>| {}, Arc::clone(&owner))
        .unwrap_err();

    assert_eq!(
        err,
        CleanupError::SelfReference {
            owner: Arc::as_ptr(&owner) as usize
        }
    );
    assert_eq!(cleaner.pending(), 0);
    assert_eq!(cleaner.stats().registered, 0);
}

#[test]
fn test_inner_type_of_owner_is_rejected() {
    let cleaner = cleaner();
    let owner = Owner::new("inner");

    let err = cleaner
        .register(&owner, |_: InnerState| {}, InnerState(1))
        .unwrap_err();

    match err {
        CleanupError::LeakSuspected { reason, owner, payload } => {
            assert_eq!(reason, LeakReason::InnerOfOwner);
            assert!(owner.ends_with("Owner"));
            assert!(payload.ends_with("InnerState"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(cleaner.pending(), 0);
}

#[test]
fn test_anonymous_type_in_owner_is_rejected() {
    let cleaner = cleaner();
    let owner = Owner::new("anonymous");

    let err = cleaner
        .register(&owner, |_: AnonymousState| {}, AnonymousState)
        .unwrap_err();

    assert!(matches!(
        err,
        CleanupError::LeakSuspected {
            reason: LeakReason::AnonymousInOwner,
            ..
        }
    ));
}

#[test]
fn test_static_nested_payload_is_accepted() {
    let cleaner = cleaner();
    let runs = Counter::default();
    let owner = Owner::new("static");

    let counter = runs.clone();
    cleaner
        .register(
            &owner,
            move |state: DetachedState| {
                assert_eq!(state.0, 9);
                counter.hit();
            },
            DetachedState(9),
        )
        .unwrap();

    drop(owner);
    assert!(cleaner.run_cleanup_now());
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_inner_type_of_unrelated_owner_is_accepted() {
    let cleaner = cleaner();
    let owner = Tracked::new(0u32);

    // InnerState is nested in `Owner`, not in `u32`
    assert!(cleaner
        .register(&owner, |_: InnerState| {}, InnerState(2))
        .is_ok());
}

#[test]
fn test_boxed_closure_payload_is_rejected() {
    let cleaner = cleaner();
    let owner = Owner::new("closure");
    let payload: Box<dyn Fn() + Send + Sync> = Box::new(|| {});

    let err = cleaner
        .register(&owner, |f: Box<dyn Fn() + Send + Sync>| f(), payload)
        .unwrap_err();

    assert!(matches!(
        err,
        CleanupError::LeakSuspected {
            reason: LeakReason::Synthetic,
            ..
        }
    ));
}

#[test]
fn test_action_without_payload_skips_leak_check() {
    let cleaner = cleaner();
    let runs = Counter::default();
    let owner = Owner::new("action");

    let counter = runs.clone();
    cleaner.register_action(&owner, move || counter.hit()).unwrap();

    drop(owner);
    assert!(cleaner.run_cleanup_now());
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_repeated_registration_with_custom_shape() {
    struct Counted;
    impl Payload for Counted {
        fn shape() -> TypeShape {
            TypeShape::nested_in::<Self, Owner>(Nesting::StaticNested)
        }
    }

    let cleaner = cleaner();
    let owner = Owner::new("cached");
    for _ in 0..10 {
        cleaner.register(&owner, |_: Counted| {}, Counted).unwrap();
    }
    assert_eq!(cleaner.pending(), 10);
}

#[test]
fn test_suspect_elements_inside_composites_are_rejected() {
    let cleaner = cleaner();
    let owner = Owner::new("composite");

    let in_vec = cleaner
        .register(&owner, |_: Vec<InnerState>| {}, vec![InnerState(1)])
        .unwrap_err();
    let in_option = cleaner
        .register(&owner, |_: Option<InnerState>| {}, Some(InnerState(2)))
        .unwrap_err();
    let in_tuple = cleaner
        .register(&owner, |_: (u32, AnonymousState)| {}, (3u32, AnonymousState))
        .unwrap_err();

    for (err, expected) in [
        (in_vec, LeakReason::InnerOfOwner),
        (in_option, LeakReason::InnerOfOwner),
        (in_tuple, LeakReason::AnonymousInOwner),
    ] {
        match err {
            CleanupError::LeakSuspected { reason, .. } => assert_eq!(reason, expected),
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(cleaner.pending(), 0);

    // Accepted components keep composites registrable
    assert!(cleaner
        .register(&owner, |_: (u32, Vec<DetachedState>)| {}, (4u32, vec![DetachedState(5)]))
        .is_ok());
}
