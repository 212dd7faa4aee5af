extern crate tg_share;

mod common;

use std::mem;
use std::ptr::NonNull;
use tg_share::alloc::TallyHold;
use tg_share::share::StrongPtr;
use common::{DropTally, Tracked};

#[derive(Debug)]
#[repr(C)]
struct Pair {
    head: u64,
    tail: Tracked<&'static str>,
}

#[test]
fn test_project_field_outlives_owner() {
    common::init_logger();
    let tally = DropTally::new();
    let hold = TallyHold::new();

    let owner = StrongPtr::hold_new(&hold, Pair { head: 1, tail: tally.track("tail") });
    let tail = owner.project(|pair| &pair.tail);
    assert_eq!(tail.value, "tail");
    assert_eq!(tail.use_count(), 2);
    assert_eq!(tail.use_count(), owner.use_count());
    assert!(tail.same_group(&owner));
    assert_ne!(tail, owner);

    mem::drop(owner);
    assert_eq!(tally.drops(), 0);
    assert_eq!(tail.use_count(), 1);
    assert_eq!(tail.value, "tail");
    assert_eq!(hold.live(), 1);

    mem::drop(tail);
    assert_eq!(tally.drops(), 1);
    assert_eq!(hold.live(), 0);
}

#[test]
fn test_project_compares_observed_address() {
    let tally = DropTally::new();
    let owner = StrongPtr::new(Pair { head: 2, tail: tally.track("") });
    let head = owner.project(|pair| &pair.head);
    assert_eq!(*head, 2);
    assert!(head == owner);

    let other = StrongPtr::new(2u64);
    assert_eq!(*other, *head);
    assert_ne!(other, head);
    assert!(!other.same_group(&head));
}

#[test]
fn test_alias_raw_address() {
    let tally = DropTally::new();
    let owner = StrongPtr::new(vec![tally.track(1), tally.track(2), tally.track(3)]);
    let second = unsafe { StrongPtr::alias(&owner, NonNull::from(&owner[1])) };
    assert_eq!(second.value, 2);
    assert_eq!(second.as_ptr(), Some(NonNull::from(&owner[1])));
    assert_eq!(owner.use_count(), 2);

    mem::drop(owner);
    assert_eq!(tally.drops(), 0);
    assert_eq!(second.value, 2);
    mem::drop(second);
    assert_eq!(tally.drops(), 3);
}

#[test]
fn test_alias_of_empty_is_empty() {
    let owner = StrongPtr::<Pair>::empty();
    let value = 7u32;
    let alias = unsafe { StrongPtr::alias(&owner, NonNull::from(&value)) };
    assert!(alias.is_empty());
    assert_eq!(alias.use_count(), 0);
    assert!(owner.project(|pair| &pair.head).is_empty());
}

#[test]
fn test_map_transfers_ownership() {
    let tally = DropTally::new();
    let owner = StrongPtr::new(Pair { head: 3, tail: tally.track("moved") });
    let weak = owner.to_weak();
    let tail = owner.map(|pair| &pair.tail);
    assert_eq!(tail.use_count(), 1);
    assert_eq!(tail.value, "moved");
    assert!(!weak.expired());

    mem::drop(tail);
    assert!(weak.expired());
    assert_eq!(tally.drops(), 1);
}

#[test]
fn test_alias_weak_observes_alias() {
    let tally = DropTally::new();
    let owner = StrongPtr::new(Pair { head: 4, tail: tally.track("weak") });
    let tail = owner.project(|pair| &pair.tail).to_weak();
    mem::drop(owner);
    assert!(tail.expired());
    assert_eq!(tally.drops(), 1);
    assert!(tail.lock().is_empty());
}
