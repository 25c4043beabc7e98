//! Subscribing, unsubscribing and wrapper subscriptions.

use ramify::{Event, EventError, EventSpace, HookRef, Payload, testing::CountingHook};

mod common;
use common::{CallLog, ep};

fn fire(space: &EventSpace, name: &str, path: &str) {
    space.spawn_event(name).unwrap().trigger_sync_at(ep(path)).unwrap();
}

#[test]
fn test_unsubscribed_hook_is_not_called() {
    let space = EventSpace::isolated();
    let removed = CountingHook::new();
    let kept = CountingHook::new();
    space
        .subscribe_to("e", ep("p"), removed.hook())
        .unwrap()
        .subscribe_to("e", ep("p"), kept.hook())
        .unwrap();

    space.unsubscribe_from(Some("e"), Some(&ep("p")), Some(&removed.hook()));
    fire(&space, "e", "p");

    assert_eq!(removed.count(), 0);
    assert_eq!(kept.count(), 1);
}

#[test]
fn test_unsubscribing_unknown_things_is_a_no_op() {
    let space = EventSpace::isolated();
    let kept = CountingHook::new();
    let stranger = CountingHook::new();
    space.subscribe_to("e", ep("p"), kept.hook()).unwrap();

    space
        .unsubscribe_from(Some("e"), Some(&ep("p")), Some(&stranger.hook()))
        .unsubscribe_from(Some("other"), Some(&ep("p")), None)
        .unsubscribe_from(None, Some(&ep("nowhere")), None)
        .unsubscribe_from(Some("missing"), None, None);
    fire(&space, "e", "p");

    assert_eq!(kept.count(), 1);
    assert_eq!(space.handler_count("e", &ep("p")), 1);
}

#[test]
fn test_exact_unsubscribe_removes_one_instance() {
    let space = EventSpace::isolated();
    let counter = CountingHook::new();
    space
        .subscribe_to("e", ep("p"), counter.hook())
        .unwrap()
        .subscribe_to("e", ep("p"), counter.hook())
        .unwrap();

    fire(&space, "e", "p");
    assert_eq!(counter.count(), 2);

    space.unsubscribe_from(Some("e"), Some(&ep("p")), Some(&counter.hook()));
    counter.reset();
    fire(&space, "e", "p");
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_unsubscribe_scopes() {
    let space = EventSpace::isolated();
    let counter = CountingHook::new();
    for (name, path) in [("e", "p"), ("f", "p"), ("e", "q"), ("f", "q")] {
        space.subscribe_to(name, ep(path), counter.hook()).unwrap();
    }

    // (name, path): one list
    space.unsubscribe_from(Some("e"), Some(&ep("p")), None);
    assert_eq!(space.subscribed_paths("e"), vec![ep("q")]);

    // path only: every name at the path
    space.unsubscribe_from(None, Some(&ep("q")), None);
    assert!(space.subscribed_paths("e").is_empty());
    assert_eq!(space.subscribed_paths("f"), vec![ep("p")]);

    // nothing: everything
    space.unsubscribe_from(None, None, None);
    assert!(space.is_empty());
}

#[test]
fn test_snapshot_isolation_during_dispatch() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    let second = log.hook("second");
    let added = log.hook("added");

    let (s, second_ref, added_ref) = (space.clone(), second.clone(), added.clone());
    space
        .subscribe_to(
            "e",
            ep("p"),
            HookRef::from_fn(move |_: &Event, _: &Payload| {
                s.unsubscribe_from(Some("e"), Some(&ep("p")), Some(&second_ref));
                s.subscribe_to("e", ep("p"), added_ref.clone()).map(|_| ())
            }),
        )
        .unwrap()
        .subscribe_to("e", ep("p"), second.clone())
        .unwrap();

    fire(&space, "e", "p");
    assert_eq!(log.entries(), ["second"]);
    assert!(space.is_subscribed("e", &ep("p"), &added));
    assert!(!space.is_subscribed("e", &ep("p"), &second));
}

#[test]
fn test_nested_dispatch_from_a_hook() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space.subscribe_to("inner", ep("b"), log.hook("inner")).unwrap();
    let l = log.clone();
    space
        .subscribe_to(
            "outer",
            ep("a"),
            HookRef::from_fn(move |event: &Event, _: &Payload| {
                l.push("outer");
                event
                    .space()
                    .spawn_event("inner")?
                    .trigger_sync_at(ep("b"))
                    .map(|_| ())
                    .map_err(ramify::BoxError::from)
            }),
        )
        .unwrap();

    fire(&space, "outer", "a");
    assert_eq!(log.entries(), ["outer", "inner"]);
}

#[test]
fn test_until_triggered_fires_once_even_while_bubbling() {
    let space = EventSpace::isolated();
    let counter = CountingHook::new();
    space
        .subscribe_to_until_triggered("e", ep("a"), counter.hook())
        .unwrap();

    fire(&space, "e", "a>b");
    fire(&space, "e", "a");
    assert_eq!(counter.count(), 1);
    assert!(space.is_empty());
}

#[test]
fn test_until_triggered_unsubscribes_before_running() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    let l = log.clone();
    space
        .subscribe_to_until_triggered(
            "e",
            ep("p"),
            HookRef::from_fn(move |event: &Event, _: &Payload| {
                let remaining = event.space().handler_count("e", &ep("p"));
                l.push(format!("remaining={remaining}"));
            }),
        )
        .unwrap();

    fire(&space, "e", "p");
    assert_eq!(log.entries(), ["remaining=0"]);
}

#[test]
fn test_delegate_reacts_to_its_branch_only() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space
        .delegate_subscription_to("e", ep("app"), ep("app>users"), log.path_hook("users"))
        .unwrap();

    fire(&space, "e", "app>users>42");
    fire(&space, "e", "app>users");
    fire(&space, "e", "app>groups>1");
    fire(&space, "e", "app");

    assert_eq!(log.entries(), ["users@app>users", "users@app>users"]);
}

#[test]
fn test_delegate_sees_broadcasts_on_its_branch() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space
        .delegate_subscription_to("e", ep("app"), ep("app>users"), log.path_hook("users"))
        .unwrap();

    space.spawn_event("e").unwrap().broadcast_sync_at(ep("app")).unwrap();
    space
        .spawn_event("e")
        .unwrap()
        .broadcast_sync_at(ep("app>users>42"))
        .unwrap();
    space
        .spawn_event("e")
        .unwrap()
        .broadcast_sync_at(ep("app>groups"))
        .unwrap();

    assert_eq!(log.entries(), ["users@app>users", "users@app>users"]);
}

#[test]
fn test_delegate_wrapper_can_be_unsubscribed() {
    let space = EventSpace::isolated();
    let counter = CountingHook::new();
    let wrapper = space
        .delegate_subscription_to("e", ep("app"), ep("app>users"), counter.hook())
        .unwrap();
    assert!(space.is_subscribed("e", &ep("app"), &wrapper));
    assert!(!space.is_subscribed("e", &ep("app"), &counter.hook()));

    space.unsubscribe_from(Some("e"), Some(&ep("app")), Some(&wrapper));
    fire(&space, "e", "app>users");
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_delegate_outside_capture_is_rejected() {
    let space = EventSpace::isolated();
    let err = space
        .delegate_subscription_to("e", ep("app>users"), ep("app"), CountingHook::new().hook())
        .unwrap_err();
    assert_eq!(
        err,
        EventError::DelegateNotRelative {
            capture: "app>users".into(),
            delegate: "app".into(),
        }
    );
    assert!(space.is_empty());
}
