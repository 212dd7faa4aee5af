//! # Shared Ownership Model
//!
//! Reference counted shared ownership of heap allocated objects, without a
//! garbage collector.
//!
//! ## Design goals
//!
//! __Two allocation shapes, one protocol__
//! Wrap an object allocated elsewhere, or construct the object inside its
//! own control block with a single allocation. Both shapes are counted by
//! the same strong/weak protocol.
//!
//! __Exact release__
//! Release a managed object exactly once, when its last strong reference
//! drops; release its control block exactly once, after the object, when
//! the last reference of any kind drops.
//!
//! __Observable liveness__
//! Let weak observers detect that an object has been released, and
//! conditionally re-acquire ownership while it is still live.
//!
//! __Aliasing__
//! Let a strong reference observe part of an object, such as a field, while
//! its counts govern the lifetime of the whole object.
//!
//! __Scoped allocation__
//! Allocate control blocks from an explicit `Hold`, whose lifetime statically
//! bounds every reference into it.
//!
//! Counts are plain cells, not atomics: references are neither `Send` nor
//! `Sync`, and every operation runs to completion on the calling thread.
//!
//! ## Terminology
//!
//! - _Control block_: the shared node holding the strong and weak counts,
//!   which knows how to release its object and itself.
//! - _Ownership group_: every reference sharing one control block.
//! - _Strong reference_: a reference whose existence keeps the object alive.
//! - _Weak reference_: a reference that keeps only the control block alive.
//! - _Promotion_: converting a weak reference into a strong reference,
//!   conditional on the object still being live.
//! - _Demotion_: converting a strong reference into a weak reference.
//!
//! ## Components
//!
//! __Allocation contexts__
//!
//! - __[`Hold`]__: an abstract allocator of control blocks.
//! - __[`GlobalHold`]__: a `Hold` backed by the global allocator.
//! - __[`TallyHold`]__: a `Hold` that counts its allocations.
//!
//! __Shared ownership__
//!
//! - __[`StrongPtr`]__: a dereferenceable, strong reference.
//! - __[`WeakPtr`]__: an undereferenceable, weak reference.
//! - __[`Destroy`]__: releases an object wrapped from a raw pointer.
//!
//! [`Hold`]: alloc::Hold
//! [`GlobalHold`]: alloc::GlobalHold
//! [`TallyHold`]: alloc::TallyHold
//!
//! [`StrongPtr`]: share::StrongPtr
//! [`WeakPtr`]: share::WeakPtr
//! [`Destroy`]: share::Destroy

#![no_std]

extern crate alloc as heap;

pub mod alloc;
pub mod share;
