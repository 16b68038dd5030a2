mod support;

use std::cell::Cell;
use std::rc::Rc;

use live_motion_core::{ElementId, EngineHandle, MotionEvent, RuntimeStats, Variant};
use support::{EngineCall, Harness};

fn mounts_of(h: &Harness, el: ElementId) -> usize {
    h.engine
        .calls()
        .iter()
        .filter(|c| matches!(c, EngineCall::Mount(e, _) if *e == el))
        .count()
}

/// Slot with one admitted occupant.
fn occupied(h: &Harness) -> (ElementId, ElementId) {
    let slot = h.element();
    h.rt.mount_presence(slot);
    let first = h.element_with("fade");
    h.dom.nest(first, slot);
    h.rt.on_mount(first).unwrap();
    (slot, first)
}

#[test]
fn first_member_is_admitted_immediately() {
    let h = Harness::new();
    let (_, first) = occupied(&h);

    assert_eq!(mounts_of(&h, first), 1);
    assert_eq!(
        *h.dom.display_log.borrow(),
        vec![(first, Some("none".to_string())), (first, None)]
    );
    assert!(h.engine.animated());
}

#[test]
fn queued_mount_fires_once_after_exit_completes() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    let first_handle = h.engine.handle_of(first).unwrap();

    h.rt.on_destroy(first);
    let second = h.element_with("fade");
    h.dom.nest(second, slot);
    h.rt.on_mount(second).unwrap();

    assert_eq!(mounts_of(&h, second), 0, "waits for the exit");
    assert_eq!(h.dom.display(second).as_deref(), Some("none"));
    assert_eq!(*h.host.deferred_durations.borrow(), vec![400]);

    h.host.run_deferred();
    assert_eq!(
        h.engine.calls().last(),
        Some(&EngineCall::SetActive(first_handle, Variant::Exit, true))
    );
    assert_eq!(mounts_of(&h, second), 0, "exit still animating");

    assert!(h.rt.is_tracked(first), "exit still owes a completion");

    h.rt.dispatch(first, MotionEvent::Complete);
    assert!(!h.rt.is_tracked(first));
    assert_eq!(mounts_of(&h, second), 1);
    assert_eq!(h.dom.display(second), None);
    assert_eq!(h.dom.display(first).as_deref(), Some("none"));
    assert!(h
        .engine
        .calls()
        .contains(&EngineCall::Release(first_handle)));

    h.rt.dispatch(first, MotionEvent::Complete);
    assert_eq!(mounts_of(&h, second), 1, "admitted exactly once");
    assert_eq!(
        h.rt.stats(),
        RuntimeStats {
            elements: 1,
            parent_links: 1,
            presence_slots: 1,
            pending_waiters: 0,
        }
    );
}

#[test]
fn interrupted_exit_still_admits_the_next_member() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    h.rt.on_destroy(first);
    let second = h.element_with("fade");
    h.dom.nest(second, slot);
    h.rt.on_mount(second).unwrap();

    h.host.run_deferred();
    h.rt.dispatch(first, MotionEvent::Interrupted);

    assert_eq!(mounts_of(&h, second), 1);
    assert_eq!(h.dom.display(first), None, "interrupted exit is not hidden");
}

#[test]
fn queued_member_destroyed_before_admission_never_mounts() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    h.rt.on_destroy(first);
    let second = h.element_with("fade");
    h.dom.nest(second, slot);
    h.rt.on_mount(second).unwrap();

    h.rt.on_destroy(second);
    h.host.run_deferred();
    h.rt.dispatch(first, MotionEvent::Complete);

    assert_eq!(mounts_of(&h, second), 0);
    assert!(h.engine.live.borrow().is_empty());
}

#[test]
fn second_exit_is_ignored_while_one_is_in_flight() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);

    assert!(h.rt.begin_exit(slot, first, None).unwrap());
    assert!(!h.rt.begin_exit(slot, first, None).unwrap());
    assert_eq!(h.host.pending_deferred(), 1);
}

#[test]
fn exit_completion_runs_the_done_callback() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    let done = Rc::new(Cell::new(0));
    let seen = done.clone();

    h.rt
        .begin_exit(slot, first, Some(Box::new(move || seen.set(seen.get() + 1))))
        .unwrap();
    h.host.run_deferred();
    assert_eq!(done.get(), 0);

    h.rt.dispatch(first, MotionEvent::Complete);
    assert_eq!(done.get(), 1);
}

#[test]
fn member_mounted_before_its_marker_creates_the_slot() {
    let h = Harness::new();
    let slot = h.element();
    let first = h.element_with("fade");
    h.dom.nest(first, slot);
    h.rt.on_mount(first).unwrap();
    h.rt.mount_presence(slot);

    assert_eq!(mounts_of(&h, first), 1);
    assert_eq!(h.rt.stats().presence_slots, 1);
}

#[test]
fn destroying_the_marker_clears_slot_state() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    let handle = h.engine.handle_of(first).unwrap();

    h.rt.destroy_presence(slot);
    assert_eq!(h.rt.stats().presence_slots, 0);
    assert_eq!(h.rt.stats().parent_links, 0);
    assert!(h.engine.live.borrow().contains(&handle));

    // The surviving member now tears down like any other element.
    h.rt.on_destroy(first);
    let releases = h
        .engine
        .calls()
        .iter()
        .filter(|c| matches!(c, EngineCall::Release(hd) if *hd == handle))
        .count();
    assert_eq!(releases, 1);
    assert_eq!(h.rt.stats(), RuntimeStats::default());
    assert_eq!(h.host.pending_deferred(), 0);
}

#[test]
fn updates_of_queued_members_wait_for_admission() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    h.rt.on_destroy(first);
    let second = h.element_with("fade");
    h.dom.nest(second, slot);
    h.rt.on_mount(second).unwrap();
    h.engine.clear();

    h.set_config(second, "spring");
    h.rt.on_update(second).unwrap();
    assert!(h.engine.calls().is_empty());
}

fn releases_of(h: &Harness, handle: EngineHandle) -> usize {
    h.engine
        .calls()
        .iter()
        .filter(|c| matches!(c, EngineCall::Release(hd) if *hd == handle))
        .count()
}

#[test]
fn marker_destroyed_before_the_exit_starts_abandons_it() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    let handle = h.engine.handle_of(first).unwrap();

    h.rt.on_destroy(first);
    h.rt.destroy_presence(slot);
    h.host.run_deferred();

    assert_eq!(releases_of(&h, handle), 1);
    assert!(!h
        .engine
        .calls()
        .iter()
        .any(|c| matches!(c, EngineCall::SetActive(hd, Variant::Exit, _) if *hd == handle)));
    assert!(!h.rt.is_tracked(first));
    assert_eq!(h.rt.stats(), RuntimeStats::default());
}

#[test]
fn marker_destroyed_mid_exit_drops_the_waiter() {
    let h = Harness::new();
    let (slot, first) = occupied(&h);
    let handle = h.engine.handle_of(first).unwrap();
    let done = Rc::new(Cell::new(0));
    let seen = done.clone();

    h.rt
        .begin_exit(slot, first, Some(Box::new(move || seen.set(seen.get() + 1))))
        .unwrap();
    h.host.run_deferred();
    assert_eq!(h.rt.stats().pending_waiters, 1);

    h.rt.destroy_presence(slot);
    assert_eq!(done.get(), 1, "host removal is not held back");
    assert_eq!(h.rt.stats().pending_waiters, 0);

    h.rt.on_destroy(first);
    h.rt.dispatch(first, MotionEvent::Complete);
    assert_eq!(done.get(), 1);
    assert_eq!(releases_of(&h, handle), 1);
    assert!(!h.rt.is_tracked(first));
    assert_eq!(h.rt.stats(), RuntimeStats::default());
}

#[test]
fn member_configured_after_mount_still_occupies_the_slot() {
    let h = Harness::new();
    let slot = h.element();
    h.rt.mount_presence(slot);
    let first = h.element();
    h.dom.nest(first, slot);
    h.rt.on_mount(first).unwrap();
    assert_eq!(mounts_of(&h, first), 0);

    h.set_config(first, "fade");
    h.rt.on_update(first).unwrap();
    assert_eq!(mounts_of(&h, first), 1);
    let handle = h.engine.handle_of(first).unwrap();

    let second = h.element_with("fade");
    h.dom.nest(second, slot);
    h.rt.on_mount(second).unwrap();
    assert_eq!(mounts_of(&h, second), 0, "queued behind the first member");

    h.rt.on_destroy(first);
    h.host.run_deferred();
    assert_eq!(
        h.engine.calls().last(),
        Some(&EngineCall::SetActive(handle, Variant::Exit, true))
    );
    h.rt.dispatch(first, MotionEvent::Complete);

    assert_eq!(releases_of(&h, handle), 1);
    assert_eq!(mounts_of(&h, second), 1);
    assert!(!h.engine.live.borrow().contains(&handle));
}
