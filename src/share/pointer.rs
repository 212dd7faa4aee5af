use core::cell::Cell;
use core::ptr::NonNull;
use heap::boxed::Box;
use crate::alloc::{Hold, HoldError};
use crate::share::control::{BlockHeader, BlockRef, ControlBlock};

/// Releases an object that was allocated outside of its control block.
///
/// Closures taking the object pointer implement `Destroy`, so any
/// deallocation routine can be paired with a raw pointer:
///
/// ```
/// # use core::ptr::NonNull;
/// # use tg_share::share::StrongPtr;
/// let ptr = NonNull::from(Box::leak(Box::new(5)));
/// let x = unsafe {
///     StrongPtr::from_raw(ptr, |ptr: NonNull<i32>| drop(Box::from_raw(ptr.as_ptr())))
/// };
/// # assert_eq!(*x, 5);
/// ```
pub trait Destroy<T: ?Sized> {
    /// Releases the object at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be the pointer this destroyer was paired with, and must
    /// not be dereferenced after this call.
    unsafe fn destroy(self, ptr: NonNull<T>);
}

/// Default `Destroy` implementation: releases pointers obtained from
/// `Box::into_raw`, including boxed slices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxDestroy;

impl<T: ?Sized> Destroy<T> for BoxDestroy {
    #[inline]
    unsafe fn destroy(self, ptr: NonNull<T>) {
        drop(Box::from_raw(ptr.as_ptr()));
    }
}

impl<T: ?Sized, F: FnOnce(NonNull<T>)> Destroy<T> for F {
    #[inline]
    unsafe fn destroy(self, ptr: NonNull<T>) {
        self(ptr)
    }
}

/// Control block for an object allocated outside of the block.
pub(crate) struct PointerBlock<'a, T: ?Sized, D> {
    header: BlockHeader<'a>,
    /// The managed object; cleared once released.
    ptr: Cell<Option<NonNull<T>>>,
    /// The object's destroyer; consumed once the object is released.
    destroy: Cell<Option<D>>,
}

impl<'a, T: ?Sized + 'a, D: Destroy<T> + 'a> PointerBlock<'a, T, D> {
    /// Allocates a pointer block in `hold` that owns `ptr`. Destroys `ptr`
    /// before returning an error if the block can't be allocated.
    pub(crate) unsafe fn alloc(hold: &'a dyn Hold<'a>, ptr: NonNull<T>, destroy: D)
        -> Result<BlockRef<'a>, HoldError>
    {
        let block = PointerBlock {
            header: BlockHeader::new(hold),
            ptr: Cell::new(Some(ptr)),
            destroy: Cell::new(Some(destroy)),
        };
        match BlockRef::alloc(block) {
            Ok(block) => Ok(block),
            Err((block, error)) => {
                block.release_object();
                Err(error)
            },
        }
    }
}

unsafe impl<'a, T: ?Sized, D: Destroy<T>> ControlBlock<'a> for PointerBlock<'a, T, D> {
    #[inline]
    fn header(&self) -> &BlockHeader<'a> {
        &self.header
    }

    unsafe fn release_object(&self) {
        let ptr = self.ptr.take();
        let destroy = self.destroy.take();
        if let (Some(ptr), Some(destroy)) = (ptr, destroy) {
            destroy.destroy(ptr);
        }
    }
}
