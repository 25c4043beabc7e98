//! Bubbling dispatch from a target path toward its top-level segment.

use ramify::{CallResult, DispatchError, EventError, EventSpace, HookResult};

mod common;
use common::{CallLog, ep};

#[test]
fn test_hooks_run_from_target_to_top_level() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    for path in ["a", "a>b", "a>b>c", "a>b>c>d", "x"] {
        space.subscribe_to("e", ep(path), log.path_hook("h")).unwrap();
    }

    let result = space
        .spawn_event("e")
        .unwrap()
        .trigger_sync_at(ep("a>b>c"))
        .unwrap();

    assert_eq!(result, CallResult::continued(3));
    assert_eq!(log.entries(), ["h@a>b>c", "h@a>b", "h@a"]);
}

#[test]
fn test_hooks_at_one_path_run_in_subscription_order() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space
        .subscribe_to("e", ep("a"), log.hook("first"))
        .unwrap()
        .subscribe_to("e", ep("a"), log.hook("second"))
        .unwrap()
        .subscribe_to("e", ep("a>b"), log.hook("deeper"))
        .unwrap();

    space.spawn_event("e").unwrap().trigger_sync_at(ep("a>b")).unwrap();
    assert_eq!(log.entries(), ["deeper", "first", "second"]);
}

#[test]
fn test_stop_truncates_bubbling() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space.subscribe_to("e", ep("a"), log.hook("top")).unwrap();
    space
        .subscribe_to("e", ep("a>b"), log.hook_with("stopper", HookResult::Stop))
        .unwrap();
    space.subscribe_to("e", ep("a>b"), log.hook("skipped")).unwrap();
    space.subscribe_to("e", ep("a>b>c"), log.hook("target")).unwrap();

    let event = space.spawn_event("e").unwrap();
    let result = event.trigger_sync_at(ep("a>b>c")).unwrap();

    assert_eq!(result, CallResult::stopped(2));
    assert_eq!(log.entries(), ["target", "stopper"]);
    assert_eq!(event.current_path(), Some(ep("a>b")));
}

#[test]
fn test_non_bubbling_event_dispatches_once() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space.subscribe_to("e", ep("a"), log.hook("top")).unwrap();
    space.subscribe_to("e", ep("a>b"), log.hook("target")).unwrap();

    let event = space.spawn_event("e").unwrap();
    event.allow_bubbling(false);
    event.trigger_sync_at(ep("a>b")).unwrap();

    assert_eq!(log.entries(), ["target"]);
    assert!(event.is_handled());
}

#[test]
fn test_handled_only_when_a_hook_ran() {
    let space = EventSpace::isolated();
    let event = space.spawn_event("e").unwrap();
    event.trigger_sync_at(ep("a>b")).unwrap();
    assert!(!event.is_handled());

    let log = CallLog::new();
    space.subscribe_to("e", ep("a"), log.hook("top")).unwrap();
    let event = space.spawn_event("e").unwrap();
    event.trigger_sync_at(ep("a>b")).unwrap();
    assert!(event.is_handled());
}

#[test]
fn test_original_path_is_kept_while_bubbling() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    let l = log.clone();
    space
        .subscribe_to(
            "e",
            ep("a"),
            ramify::HookRef::from_fn(move |event: &ramify::Event, _: &ramify::Payload| {
                l.push(event.original_path().unwrap().to_string());
            }),
        )
        .unwrap();

    space.spawn_event("e").unwrap().trigger_sync_at(ep("a>b>c")).unwrap();
    assert_eq!(log.entries(), ["a>b>c"]);
}

#[test]
fn test_hook_error_aborts_bubbling() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space.subscribe_to("e", ep("a"), log.hook("top")).unwrap();
    space
        .subscribe_to(
            "e",
            ep("a>b"),
            ramify::HookRef::new(ramify::testing::FailingHook::new("disk full")),
        )
        .unwrap();

    let err = space
        .spawn_event("e")
        .unwrap()
        .trigger_sync_at(ep("a>b"))
        .unwrap_err();

    match err {
        DispatchError::Hook { event, path, source } => {
            assert_eq!(event, "e");
            assert_eq!(path, "a>b");
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(log.entries().is_empty());
}

#[test]
fn test_untargeted_event_is_rejected() {
    let space = EventSpace::isolated();
    let err = space.spawn_event("e").unwrap().trigger_sync().unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Event(EventError::Untargeted(ref name)) if name == "e"
    ));
}

#[test]
fn test_retargeting_restarts_from_new_path() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    space.subscribe_to("e", ep("a"), log.path_hook("h")).unwrap();
    space.subscribe_to("e", ep("b>c"), log.path_hook("h")).unwrap();

    let event = space.spawn_event("e").unwrap();
    event.trigger_sync_at(ep("a>x")).unwrap();
    event.trigger_sync_at(ep("b>c")).unwrap();

    assert_eq!(log.entries(), ["h@a", "h@b>c"]);
    assert_eq!(event.original_path(), Some(ep("b>c")));
}

#[test]
fn test_each_ancestor_level_runs_once() {
    let space = EventSpace::isolated();
    let log = CallLog::new();
    for path in ["", "a", "a>b"] {
        space.subscribe_to("e", ep(path), log.path_hook("h")).unwrap();
    }

    let event = space.spawn_event("e").unwrap();
    event.trigger_sync_at(ep("a>b")).unwrap();
    event.trigger_sync().unwrap();
    space.spawn_event("e").unwrap().trigger_sync_at(ep("")).unwrap();

    assert_eq!(log.entries(), ["h@a>b", "h@a"]);
}
