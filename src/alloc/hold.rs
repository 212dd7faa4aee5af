use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;
use heap::alloc as global;

/// Allocator of control blocks, bounded by the lifetime `'a`.
///
/// Every control block records the `Hold` that allocated it, and returns its
/// memory to that same `Hold` when its last reference drops. Every reference
/// into a block carries `'a`, so no reference outlives its `Hold`.
///
/// # Safety
///
/// Memory returned by `alloc` must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and must remain valid
/// until passed back to `dealloc` with the same `layout`.
pub unsafe trait Hold<'a> {
    /// Returns a pointer to uninitialized memory fitting `layout`, or an
    /// `Err` if the allocation fails.
    ///
    /// # Safety
    ///
    /// The returned memory must eventually be passed to `dealloc`, or leaked.
    unsafe fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, HoldError>;

    /// Releases memory previously returned by `alloc` for `layout`.
    ///
    /// # Safety
    ///
    /// `data` must have been allocated by this `Hold` with the same `layout`,
    /// and must not be used after this call.
    unsafe fn dealloc(&self, data: NonNull<u8>, layout: Layout);
}

/// `Hold` that allocates from the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalHold;

static GLOBAL_HOLD: GlobalHold = GlobalHold;

/// Returns the process-wide `Hold` backed by the global allocator.
#[inline]
pub fn global_hold<'a>() -> &'a dyn Hold<'a> {
    &GLOBAL_HOLD
}

unsafe impl<'a> Hold<'a> for GlobalHold {
    unsafe fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, HoldError> {
        if layout.size() == 0 {
            return Err(HoldError::Unsupported("zero-sized block"));
        }
        NonNull::new(global::alloc(layout)).ok_or(HoldError::OutOfMemory)
    }

    #[inline]
    unsafe fn dealloc(&self, data: NonNull<u8>, layout: Layout) {
        global::dealloc(data.as_ptr(), layout);
    }
}

/// Control block allocation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoldError {
    /// The hold has no memory left for the block.
    OutOfMemory,
    /// The hold can never satisfy the request.
    Unsupported(&'static str),
}

impl fmt::Display for HoldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HoldError::OutOfMemory => f.write_str("out of memory"),
            HoldError::Unsupported(reason) => write!(f, "unsupported allocation: {}", reason),
        }
    }
}
