use core::fmt::{self, Debug, Pointer, Formatter};
use core::mem;
use core::ptr::NonNull;
use log::debug;
use crate::share::control::{BlockRef, ShareError};
use crate::share::StrongPtr;

/// An undereferenceable, weak reference to an object in an ownership group.
///
/// A `WeakPtr` keeps the control block of its group allocated, but not the
/// object itself. It can be promoted back into a [`StrongPtr`] for as long
/// as the group is live.
///
/// ```
/// # use tg_share::share::StrongPtr;
/// let strong = StrongPtr::new(5);
/// let weak = strong.to_weak();
/// assert_eq!(*weak.lock(), 5);
///
/// drop(strong);
/// assert!(weak.expired());
/// assert!(weak.lock().is_empty());
/// ```
pub struct WeakPtr<'a, T: ?Sized> {
    /// Address of the observed object, or `None` if empty.
    observed: Option<NonNull<T>>,
    /// Control block of the ownership group, or `None` if empty.
    block: Option<BlockRef<'a>>,
}

impl<'a, T: ?Sized> WeakPtr<'a, T> {
    /// Returns an empty `WeakPtr`, belonging to no ownership group.
    #[inline]
    pub const fn empty() -> WeakPtr<'a, T> {
        WeakPtr {
            observed: None,
            block: None,
        }
    }

    /// Returns the number of strong references in this reference's ownership
    /// group, or zero if empty.
    #[inline]
    pub fn use_count(&self) -> usize {
        match self.block {
            Some(block) => block.strong_count(),
            None => 0,
        }
    }

    /// Returns the number of weak references in this reference's ownership
    /// group, or zero if empty.
    #[inline]
    pub fn weak_count(&self) -> usize {
        match self.block {
            Some(block) => block.weak_count(),
            None => 0,
        }
    }

    /// Returns `true` if the object of this reference's group has been
    /// released, or if this reference is empty.
    #[inline]
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// Acquires a strong reference to the observed object, if it's still live.
    fn acquire(&self) -> Option<StrongPtr<'a, T>> {
        match (self.observed, self.block) {
            (Some(observed), Some(block)) if block.strong_count() != 0 => {
                block.increment_strong();
                Some(unsafe { StrongPtr::from_parts(observed, block) })
            },
            _ => None,
        }
    }

    /// Returns a new strong reference to the observed object, or an empty
    /// `StrongPtr` if the object has been released.
    #[inline]
    pub fn lock(&self) -> StrongPtr<'a, T> {
        match self.acquire() {
            Some(strong) => strong,
            None => StrongPtr::empty(),
        }
    }

    /// Returns a new strong reference to the observed object, or
    /// `ShareError::ExpiredOwnership` if the object has been released.
    pub fn try_to_strong(&self) -> Result<StrongPtr<'a, T>, ShareError> {
        match self.acquire() {
            Some(strong) => Ok(strong),
            None => {
                debug!("promotion of expired weak reference {:p}", *self);
                Err(ShareError::ExpiredOwnership)
            },
        }
    }

    /// Converts this weak reference into a strong reference, or returns
    /// `ShareError::ExpiredOwnership` if the object has been released.
    #[inline]
    pub fn try_into_strong(self) -> Result<StrongPtr<'a, T>, ShareError> {
        self.try_to_strong()
    }

    /// Returns the address of the observed object, or `None` if empty.
    /// The address may dangle once the group has expired.
    #[inline]
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.observed
    }

    /// Returns `true` if both references observe the same address.
    #[inline]
    pub fn ptr_eq<U: ?Sized>(&self, other: &WeakPtr<'a, U>) -> bool {
        self.addr() == other.addr()
    }

    #[inline]
    fn addr(&self) -> Option<NonNull<u8>> {
        self.observed.map(NonNull::cast::<u8>)
    }

    /// Releases this reference's weak reference, leaving it empty.
    #[inline]
    pub fn reset(&mut self) {
        *self = WeakPtr::empty();
    }

    #[inline]
    pub fn swap(&mut self, other: &mut WeakPtr<'a, T>) {
        mem::swap(self, other);
    }

    /// Converts this reference into one that observes the address returned
    /// by `f`, within the same ownership group.
    ///
    /// # Safety
    ///
    /// `f` must not dereference its argument, which may dangle, and the
    /// returned address must remain valid for reads for as long as the
    /// group is live.
    pub unsafe fn cast<U: ?Sized, F>(self, f: F) -> WeakPtr<'a, U>
        where F: FnOnce(NonNull<T>) -> NonNull<U>
    {
        let observed = self.observed.map(f);
        let block = self.block;
        // The weak reference transfers to the cast.
        mem::forget(self);
        WeakPtr { observed, block }
    }
}

impl<'a, 'b, T: ?Sized> From<&'b StrongPtr<'a, T>> for WeakPtr<'a, T> {
    #[inline]
    fn from(strong: &'b StrongPtr<'a, T>) -> WeakPtr<'a, T> {
        let block = strong.block();
        if let Some(block) = block {
            block.increment_weak();
        }
        WeakPtr {
            observed: strong.as_ptr(),
            block,
        }
    }
}

impl<'a, T: ?Sized> Clone for WeakPtr<'a, T> {
    fn clone(&self) -> WeakPtr<'a, T> {
        if let Some(block) = self.block {
            block.increment_weak();
        }
        WeakPtr {
            observed: self.observed,
            block: self.block,
        }
    }

    /// Does nothing if `source` observes the same address as `self`.
    fn clone_from(&mut self, source: &WeakPtr<'a, T>) {
        if self.addr() != source.addr() {
            *self = source.clone();
        }
    }
}

impl<'a, T: ?Sized> Drop for WeakPtr<'a, T> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            unsafe { block.decrement_weak(); }
        }
    }
}

impl<'a, T: ?Sized> Default for WeakPtr<'a, T> {
    #[inline]
    fn default() -> WeakPtr<'a, T> {
        WeakPtr::empty()
    }
}

impl<'a, T: ?Sized> Debug for WeakPtr<'a, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.observed.is_none() {
            f.write_str("WeakPtr(empty)")
        } else if self.expired() {
            f.write_str("WeakPtr(expired)")
        } else {
            f.write_str("WeakPtr(..)")
        }
    }
}

impl<'a, T: ?Sized> Pointer for WeakPtr<'a, T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.addr() {
            Some(addr) => Pointer::fmt(&addr, f),
            None => Pointer::fmt(&core::ptr::null::<u8>(), f),
        }
    }
}
