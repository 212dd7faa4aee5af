use core::alloc::Layout;
use core::cell::UnsafeCell;
use core::mem::{self, MaybeUninit};
use core::ptr::{self, NonNull};
use log::trace;
use crate::alloc::{Hold, HoldError};
use crate::share::control::{BlockHeader, BlockRef, ControlBlock};

/// Control block that stores its object inline, so that the counts and the
/// object share a single allocation.
#[repr(C)]
pub(crate) struct InlineBlock<'a, T> {
    header: BlockHeader<'a>,
    /// Storage for the object; initialized until the object is released.
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<'a, T: 'a> InlineBlock<'a, T> {
    /// Allocates an inline block in `hold`, and constructs its object in
    /// place with `init`. Returns the block, and a pointer to the object.
    ///
    /// If `init` panics, the block is deallocated without releasing an object.
    pub(crate) fn alloc_with<F>(hold: &'a dyn Hold<'a>, init: F)
        -> Result<(BlockRef<'a>, NonNull<T>), HoldError>
        where F: FnOnce() -> T
    {
        let layout = Layout::new::<InlineBlock<'a, T>>();
        unsafe {
            let memory = hold.alloc(layout)?;
            let block = memory.cast::<InlineBlock<'a, T>>().as_ptr();
            ptr::write(ptr::addr_of_mut!((*block).header), BlockHeader::new(hold));
            let value = UnsafeCell::raw_get(ptr::addr_of!((*block).value)) as *mut T;
            let guard = ReleaseOnUnwind { hold, memory, layout };
            ptr::write(value, init());
            mem::forget(guard);
            trace!("allocated inline control block {:p} ({} bytes)", block, layout.size());
            Ok((BlockRef::from_raw(NonNull::new_unchecked(block)), NonNull::new_unchecked(value)))
        }
    }
}

unsafe impl<'a, T> ControlBlock<'a> for InlineBlock<'a, T> {
    #[inline]
    fn header(&self) -> &BlockHeader<'a> {
        &self.header
    }

    unsafe fn release_object(&self) {
        ptr::drop_in_place((*self.value.get()).as_mut_ptr());
    }
}

/// Returns an inline block's memory to its hold if construction unwinds.
struct ReleaseOnUnwind<'a> {
    hold: &'a dyn Hold<'a>,
    memory: NonNull<u8>,
    layout: Layout,
}

impl<'a> Drop for ReleaseOnUnwind<'a> {
    fn drop(&mut self) {
        trace!("releasing unconstructed control block {:p}", self.memory);
        unsafe { self.hold.dealloc(self.memory, self.layout); }
    }
}
