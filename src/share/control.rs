use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::ptr::{self, NonNull};
use log::trace;
use crate::alloc::{Hold, HoldError};

/// Maximum number of strong references per control block.
pub const STRONG_COUNT_MAX: usize = isize::MAX as usize;

/// Maximum number of weak references per control block. A `WeakPtr` holds a
/// weak reference to its control block. The last `StrongPtr` of a group
/// temporarily acquires a weak reference while it releases the object.
pub const WEAK_COUNT_MAX: usize = isize::MAX as usize;

/// Reference counting metadata at the head of every control block.
pub(crate) struct BlockHeader<'a> {
    /// Number of strong references to the block.
    strong: Cell<usize>,
    /// Number of weak references to the block.
    weak: Cell<usize>,
    /// The hold that allocated the block.
    hold: &'a dyn Hold<'a>,
}

impl<'a> BlockHeader<'a> {
    /// Returns a header with zero counts for a block allocated by `hold`.
    #[inline]
    pub(crate) fn new(hold: &'a dyn Hold<'a>) -> BlockHeader<'a> {
        BlockHeader {
            strong: Cell::new(0),
            weak: Cell::new(0),
            hold,
        }
    }
}

/// A reference counted node that knows how to release its managed object.
///
/// Implementations differ only in how the object is stored and released;
/// the counting protocol is implemented once, by `BlockRef`.
///
/// # Safety
///
/// `header` must always return the same header. `release_object` is called
/// at most once, when the strong count drops to zero, and the block must
/// not touch the object afterwards.
pub(crate) unsafe trait ControlBlock<'a> {
    /// Returns the counting header of this block.
    fn header(&self) -> &BlockHeader<'a>;

    /// Releases the managed object, leaving the block itself allocated.
    unsafe fn release_object(&self);
}

/// Type-erased pointer to a control block, through which all reference
/// counting happens.
#[derive(Clone, Copy)]
pub(crate) struct BlockRef<'a> {
    block: NonNull<dyn ControlBlock<'a> + 'a>,
}

impl<'a> BlockRef<'a> {
    /// Constructs a `BlockRef` from a pointer to an initialized control block.
    #[inline]
    pub(crate) unsafe fn from_raw(block: NonNull<dyn ControlBlock<'a> + 'a>) -> BlockRef<'a> {
        BlockRef { block }
    }

    /// Moves `block` into memory allocated from the hold recorded in its
    /// header. Hands `block` back on failure.
    pub(crate) fn alloc<B>(block: B) -> Result<BlockRef<'a>, (B, HoldError)>
        where B: ControlBlock<'a> + 'a
    {
        let layout = Layout::new::<B>();
        let hold = block.header().hold;
        unsafe {
            match hold.alloc(layout) {
                Ok(memory) => {
                    let data = memory.cast::<B>().as_ptr();
                    ptr::write(data, block);
                    trace!("allocated control block {:p} ({} bytes)", data, layout.size());
                    Ok(BlockRef::from_raw(NonNull::new_unchecked(data)))
                },
                Err(error) => Err((block, error)),
            }
        }
    }

    #[inline]
    fn header(&self) -> &BlockHeader<'a> {
        unsafe { self.block.as_ref().header() }
    }

    /// Returns the number of strong references to the block.
    #[inline]
    pub(crate) fn strong_count(&self) -> usize {
        self.header().strong.get()
    }

    /// Returns the number of weak references to the block.
    #[inline]
    pub(crate) fn weak_count(&self) -> usize {
        self.header().weak.get()
    }

    /// Returns `true` if both refs point to the same control block.
    #[inline]
    pub(crate) fn ptr_eq(&self, other: &BlockRef<'a>) -> bool {
        self.block.cast::<u8>() == other.block.cast::<u8>()
    }

    /// Acquires a strong reference.
    ///
    /// # Panics
    ///
    /// Panics if the strong count would exceed `STRONG_COUNT_MAX`.
    #[inline]
    pub(crate) fn increment_strong(&self) {
        let header = self.header();
        let strong = header.strong.get();
        if strong >= STRONG_COUNT_MAX {
            panic!("strong count overflow");
        }
        header.strong.set(strong + 1);
    }

    /// Releases a strong reference. Releases the object if this was the last
    /// strong reference, and then the block if no weak references remain.
    ///
    /// # Safety
    ///
    /// The caller must own the strong reference being released, and must not
    /// use this `BlockRef` afterwards.
    pub(crate) unsafe fn decrement_strong(self) {
        let header = self.header();
        let strong = header.strong.get();
        debug_assert!(strong != 0, "strong count underflow");
        let strong = strong.wrapping_sub(1);
        header.strong.set(strong);
        if strong == 0 {
            // The object's destructor may drop weak references into this block.
            self.increment_weak();
            trace!("releasing object of control block {:p}", self.block);
            self.block.as_ref().release_object();
            self.decrement_weak();
        }
    }

    /// Acquires a weak reference.
    ///
    /// # Panics
    ///
    /// Panics if the weak count would exceed `WEAK_COUNT_MAX`.
    #[inline]
    pub(crate) fn increment_weak(&self) {
        let header = self.header();
        let weak = header.weak.get();
        if weak >= WEAK_COUNT_MAX {
            panic!("weak count overflow");
        }
        header.weak.set(weak + 1);
    }

    /// Releases a weak reference. Releases the block if this was the last
    /// reference of any kind.
    ///
    /// # Safety
    ///
    /// The caller must own the weak reference being released, and must not
    /// use this `BlockRef` afterwards.
    pub(crate) unsafe fn decrement_weak(self) {
        let header = self.header();
        let weak = header.weak.get();
        debug_assert!(weak != 0, "weak count underflow");
        let weak = weak.wrapping_sub(1);
        header.weak.set(weak);
        if weak == 0 && header.strong.get() == 0 {
            self.release_block();
        }
    }

    /// Drops the control block and returns its memory to its hold.
    unsafe fn release_block(self) {
        let block = self.block.as_ptr();
        let layout = Layout::for_value(&*block);
        let hold = (*block).header().hold;
        trace!("releasing control block {:p}", block);
        ptr::drop_in_place(block);
        hold.dealloc(self.block.cast::<u8>(), layout);
    }
}

impl<'a> fmt::Pointer for BlockRef<'a> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Pointer::fmt(&self.block.cast::<u8>(), f)
    }
}

/// Shared ownership error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareError {
    /// Promotion of a weak reference whose object has already been released.
    ExpiredOwnership,
    /// The control block couldn't be allocated.
    OutOfMemory,
    /// The hold can never allocate the control block.
    Unsupported(&'static str),
}

impl From<HoldError> for ShareError {
    fn from(error: HoldError) -> ShareError {
        match error {
            HoldError::OutOfMemory => ShareError::OutOfMemory,
            HoldError::Unsupported(reason) => ShareError::Unsupported(reason),
        }
    }
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShareError::ExpiredOwnership => f.write_str("expired ownership"),
            ShareError::OutOfMemory => f.write_str("out of memory"),
            ShareError::Unsupported(reason) => write!(f, "unsupported: {}", reason),
        }
    }
}

impl core::error::Error for ShareError {
}
