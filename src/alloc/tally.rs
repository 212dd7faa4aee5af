use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::ptr::NonNull;
use crate::alloc::{GlobalHold, Hold, HoldError};

/// `Hold` that forwards to the global allocator, keeping a tally of the
/// control blocks it hands out.
///
/// Makes the allocation behavior of shared references observable: how many
/// control blocks are live, how many bytes they occupy, and how many have
/// ever been allocated. Like the references it serves, a `TallyHold`
/// belongs to a single thread.
#[derive(Default)]
pub struct TallyHold {
    live: Cell<usize>,
    used: Cell<usize>,
    allocs: Cell<usize>,
}

impl TallyHold {
    pub const fn new() -> TallyHold {
        TallyHold {
            live: Cell::new(0),
            used: Cell::new(0),
            allocs: Cell::new(0),
        }
    }

    /// Returns the number of control blocks currently allocated.
    #[inline]
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Returns the number of bytes occupied by live control blocks.
    #[inline]
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Returns the number of control blocks ever allocated, live or not.
    #[inline]
    pub fn allocs(&self) -> usize {
        self.allocs.get()
    }
}

unsafe impl<'a> Hold<'a> for TallyHold {
    unsafe fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, HoldError> {
        let data = Hold::<'a>::alloc(&GlobalHold, layout)?;
        self.live.set(self.live.get() + 1);
        self.used.set(self.used.get() + layout.size());
        self.allocs.set(self.allocs.get() + 1);
        Ok(data)
    }

    unsafe fn dealloc(&self, data: NonNull<u8>, layout: Layout) {
        Hold::<'a>::dealloc(&GlobalHold, data, layout);
        debug_assert!(self.live.get() != 0, "dealloc without a live block");
        self.live.set(self.live.get() - 1);
        self.used.set(self.used.get() - layout.size());
    }
}

impl fmt::Debug for TallyHold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TallyHold")
            .field("live", &self.live.get())
            .field("used", &self.used.get())
            .field("allocs", &self.allocs.get())
            .finish()
    }
}
