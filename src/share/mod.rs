//! Shared ownership model.
//!
//! # Ownership groups
//!
//! Every shared object is governed by a _control block_, which holds a
//! strong reference count, a weak reference count, and the knowledge of how
//! to release the object and itself. All references derived from one control
//! block, by cloning, demotion, promotion, or aliasing, form an _ownership
//! group_. A control block is only ever created by wrapping a new object:
//! cloning a reference never creates one.
//!
//! - __[`StrongPtr`]__: a dereferenceable strong reference. The object lives
//!   as long as any `StrongPtr` in its group.
//! - __[`WeakPtr`]__: an undereferenceable weak reference. Keeps the control
//!   block, but not the object, alive; can be promoted back into a
//!   `StrongPtr` while the object is still live.
//!
//! ## Control block shapes
//!
//! Control blocks come in two shapes, counted by one protocol:
//!
//! - A _pointer block_ wraps an object allocated elsewhere, such as a
//!   `Box`, and releases it by invoking a [`Destroy`] implementation. Created
//!   by [`StrongPtr::from_box`] and [`StrongPtr::from_raw`], at the cost of a
//!   second allocation.
//! - An _inline block_ constructs the object inside the control block, and
//!   releases it by dropping it in place. Created by [`StrongPtr::new`] and
//!   [`StrongPtr::new_with`], with a single allocation.
//!
//! ## Group lifecycle
//!
//! A group is _live_ while its strong count is non-zero. When the last
//! strong reference drops, the object is released, and the group is
//! _expired_: weak references can still observe that the object is gone,
//! but can never revive it. When the last weak reference also drops, the
//! control block is released. Transitions only ever move forward.
//!
//! ## Aliasing
//!
//! A reference stores the address it observes separately from the control
//! block that governs its lifetime. [`StrongPtr::project`] and
//! [`StrongPtr::map`] create references that observe a part of an object,
//! such as a field, while keeping the whole object alive. Equality compares
//! observed addresses, so aliases of different parts of one object are not
//! equal.
//!
//! ## Threads
//!
//! Reference counts are plain cells. `StrongPtr` and `WeakPtr` are neither
//! `Send` nor `Sync`.

mod control;
mod pointer;
mod inline;
mod strong;
mod weak;

pub use self::control::{ShareError, STRONG_COUNT_MAX, WEAK_COUNT_MAX};
pub use self::pointer::{Destroy, BoxDestroy};
pub use self::strong::StrongPtr;
pub use self::weak::WeakPtr;
