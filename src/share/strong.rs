use core::fmt::{self, Debug, Display, Pointer, Formatter};
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem;
use core::ops::Deref;
use core::ptr::NonNull;
use heap::boxed::Box;
use crate::alloc::{Hold, global_hold};
use crate::share::control::{BlockRef, ShareError};
use crate::share::inline::InlineBlock;
use crate::share::pointer::{BoxDestroy, Destroy, PointerBlock};
use crate::share::WeakPtr;

/// A dereferenceable, strong reference to an object whose lifetime is
/// shared by every `StrongPtr` in its ownership group.
///
/// A `StrongPtr` is either empty, or holds a strong reference to the control
/// block of its group along with the address of the object it observes. The
/// observed address is usually the group's object itself, but can be any
/// part of it; see [`StrongPtr::project`].
///
/// # Examples
///
/// Construct an object inside its control block with a single allocation:
///
/// ```
/// # use tg_share::share::StrongPtr;
/// let x = StrongPtr::new(5);
/// let y = x.clone();
/// assert_eq!(*y, 5);
/// assert_eq!(x.use_count(), 2);
/// ```
///
/// Take shared ownership of a boxed object:
///
/// ```
/// # use tg_share::share::StrongPtr;
/// let x = StrongPtr::from_box(Box::new([1, 2, 3]));
/// assert_eq!(x.len(), 3);
/// ```
pub struct StrongPtr<'a, T: ?Sized> {
    /// Address of the observed object, or `None` if empty.
    observed: Option<NonNull<T>>,
    /// Control block of the ownership group, or `None` if empty.
    block: Option<BlockRef<'a>>,
    /// Owns a T, with drop check.
    data_lifetime: PhantomData<T>,
}

impl<'a, T: 'a> StrongPtr<'a, T> {
    /// Allocates an inline control block in `hold`, and constructs its object
    /// in place with `init`, returning an error on allocation failure.
    pub fn try_hold_new_with<F>(hold: &'a dyn Hold<'a>, init: F) -> Result<StrongPtr<'a, T>, ShareError>
        where F: FnOnce() -> T
    {
        let (block, value) = InlineBlock::alloc_with(hold, init)?;
        block.increment_strong();
        Ok(unsafe { StrongPtr::from_parts(value, block) })
    }

    #[inline]
    pub fn try_hold_new(hold: &'a dyn Hold<'a>, value: T) -> Result<StrongPtr<'a, T>, ShareError> {
        StrongPtr::try_hold_new_with(hold, move || value)
    }

    #[inline]
    pub fn hold_new_with<F>(hold: &'a dyn Hold<'a>, init: F) -> StrongPtr<'a, T>
        where F: FnOnce() -> T
    {
        match StrongPtr::try_hold_new_with(hold, init) {
            Ok(strong) => strong,
            Err(error) => alloc_failed(error),
        }
    }

    #[inline]
    pub fn hold_new(hold: &'a dyn Hold<'a>, value: T) -> StrongPtr<'a, T> {
        StrongPtr::hold_new_with(hold, move || value)
    }

    #[inline]
    pub fn new_with<F>(init: F) -> StrongPtr<'a, T>
        where F: FnOnce() -> T
    {
        StrongPtr::hold_new_with(global_hold(), init)
    }

    /// Moves `value` into a new inline control block in the global hold.
    #[inline]
    pub fn new(value: T) -> StrongPtr<'a, T> {
        StrongPtr::hold_new(global_hold(), value)
    }
}

impl<'a, T: ?Sized + 'a> StrongPtr<'a, T> {
    /// Allocates a pointer control block in `hold` that releases `ptr` with
    /// `destroy` when the last strong reference drops. If the block can't
    /// be allocated, `ptr` is destroyed and an error is returned.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads until `destroy` is invoked, and must
    /// not be owned by any other ownership group.
    pub unsafe fn try_hold_from_raw<D>(hold: &'a dyn Hold<'a>, ptr: NonNull<T>, destroy: D)
        -> Result<StrongPtr<'a, T>, ShareError>
        where D: Destroy<T> + 'a
    {
        let block = PointerBlock::alloc(hold, ptr, destroy)?;
        block.increment_strong();
        Ok(StrongPtr::from_parts(ptr, block))
    }

    /// # Safety
    ///
    /// See [`StrongPtr::try_hold_from_raw`].
    #[inline]
    pub unsafe fn hold_from_raw<D>(hold: &'a dyn Hold<'a>, ptr: NonNull<T>, destroy: D) -> StrongPtr<'a, T>
        where D: Destroy<T> + 'a
    {
        match StrongPtr::try_hold_from_raw(hold, ptr, destroy) {
            Ok(strong) => strong,
            Err(error) => alloc_failed(error),
        }
    }

    /// Takes shared ownership of `ptr`, allocating its control block in the
    /// global hold.
    ///
    /// # Safety
    ///
    /// See [`StrongPtr::try_hold_from_raw`].
    #[inline]
    pub unsafe fn from_raw<D>(ptr: NonNull<T>, destroy: D) -> StrongPtr<'a, T>
        where D: Destroy<T> + 'a
    {
        StrongPtr::hold_from_raw(global_hold(), ptr, destroy)
    }

    #[inline]
    pub fn try_hold_from_box(hold: &'a dyn Hold<'a>, value: Box<T>) -> Result<StrongPtr<'a, T>, ShareError> {
        unsafe {
            let ptr = NonNull::new_unchecked(Box::into_raw(value));
            StrongPtr::try_hold_from_raw(hold, ptr, BoxDestroy)
        }
    }

    #[inline]
    pub fn hold_from_box(hold: &'a dyn Hold<'a>, value: Box<T>) -> StrongPtr<'a, T> {
        match StrongPtr::try_hold_from_box(hold, value) {
            Ok(strong) => strong,
            Err(error) => alloc_failed(error),
        }
    }

    /// Takes shared ownership of a boxed object, allocating its control block
    /// separately in the global hold.
    #[inline]
    pub fn from_box(value: Box<T>) -> StrongPtr<'a, T> {
        StrongPtr::hold_from_box(global_hold(), value)
    }

    /// Releases this reference's ownership group, and takes shared ownership
    /// of a boxed object in a new group.
    pub fn reset_box(&mut self, value: Box<T>) {
        self.reset();
        *self = StrongPtr::from_box(value);
    }

    /// Releases this reference's ownership group, and takes shared ownership
    /// of `ptr` in a new group.
    ///
    /// # Safety
    ///
    /// See [`StrongPtr::try_hold_from_raw`].
    pub unsafe fn reset_raw<D>(&mut self, ptr: NonNull<T>, destroy: D)
        where D: Destroy<T> + 'a
    {
        self.reset();
        *self = StrongPtr::from_raw(ptr, destroy);
    }

    /// Returns a new strong reference in this reference's ownership group
    /// that observes the part of the object selected by `f`. Returns an empty
    /// reference if this reference is empty.
    ///
    /// ```
    /// # use tg_share::share::StrongPtr;
    /// let pair = StrongPtr::new((1, String::from("two")));
    /// let second = pair.project(|pair| &pair.1);
    /// drop(pair);
    /// assert_eq!(*second, "two");
    /// ```
    pub fn project<U, F>(&self, f: F) -> StrongPtr<'a, U>
        where U: ?Sized + 'a,
              F: FnOnce(&T) -> &U,
    {
        match (self.observed, self.block) {
            (Some(observed), Some(block)) => {
                let projected = NonNull::from(f(unsafe { observed.as_ref() }));
                block.increment_strong();
                unsafe { StrongPtr::from_parts(projected, block) }
            },
            _ => StrongPtr::empty(),
        }
    }

    /// Converts this reference into one that observes the part of the object
    /// selected by `f`, without changing the strong count. Converts to a
    /// trait object with `|x| x as &dyn Trait`.
    pub fn map<U, F>(self, f: F) -> StrongPtr<'a, U>
        where U: ?Sized + 'a,
              F: FnOnce(&T) -> &U,
    {
        let projected = match self.observed {
            Some(observed) => NonNull::from(f(unsafe { observed.as_ref() })),
            None => return StrongPtr::empty(),
        };
        let block = self.block;
        // The strong reference transfers to the projection.
        mem::forget(self);
        match block {
            Some(block) => unsafe { StrongPtr::from_parts(projected, block) },
            None => StrongPtr::empty(),
        }
    }
}

impl<'a, T: ?Sized> StrongPtr<'a, T> {
    /// Returns an empty `StrongPtr`, belonging to no ownership group.
    #[inline]
    pub const fn empty() -> StrongPtr<'a, T> {
        StrongPtr {
            observed: None,
            block: None,
            data_lifetime: PhantomData,
        }
    }

    /// Constructs a `StrongPtr` that adopts a strong reference to `block`
    /// already acquired by the caller.
    #[inline]
    pub(crate) unsafe fn from_parts(observed: NonNull<T>, block: BlockRef<'a>) -> StrongPtr<'a, T> {
        StrongPtr {
            observed: Some(observed),
            block: Some(block),
            data_lifetime: PhantomData,
        }
    }

    /// Returns a new strong reference in `owner`'s ownership group that
    /// observes `observed`. Returns an empty reference if `owner` is empty.
    ///
    /// # Safety
    ///
    /// `observed` must remain valid for reads for as long as `owner`'s group
    /// is live, typically by pointing into `owner`'s object.
    pub unsafe fn alias<U: ?Sized>(owner: &StrongPtr<'a, U>, observed: NonNull<T>) -> StrongPtr<'a, T> {
        match owner.block {
            Some(block) => {
                block.increment_strong();
                StrongPtr::from_parts(observed, block)
            },
            None => StrongPtr::empty(),
        }
    }

    /// Returns the control block of this reference's ownership group.
    #[inline]
    pub(crate) fn block(&self) -> Option<BlockRef<'a>> {
        self.block
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

    /// Returns `true` if this reference belongs to no ownership group.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observed.is_none()
    }

    /// Returns a reference to the observed object, or `None` if empty.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.observed.map(|observed| unsafe { &*observed.as_ptr() })
    }

    /// Returns the address of the observed object, or `None` if empty.
    #[inline]
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.observed
    }

    /// Returns `true` if both references belong to the same ownership group,
    /// regardless of which addresses they observe.
    #[inline]
    pub fn same_group<U: ?Sized>(&self, other: &StrongPtr<'a, U>) -> bool {
        match (self.block, other.block) {
            (Some(block), Some(other)) => block.ptr_eq(&other),
            _ => false,
        }
    }

    /// Returns the thin address of the observed object.
    #[inline]
    fn addr(&self) -> Option<NonNull<u8>> {
        self.observed.map(NonNull::cast::<u8>)
    }

    /// Releases this reference's strong reference, leaving it empty.
    #[inline]
    pub fn reset(&mut self) {
        *self = StrongPtr::empty();
    }

    #[inline]
    pub fn swap(&mut self, other: &mut StrongPtr<'a, T>) {
        mem::swap(self, other);
    }

    /// Returns a new weak reference in this reference's ownership group.
    #[inline]
    pub fn to_weak(&self) -> WeakPtr<'a, T> {
        WeakPtr::from(self)
    }

    /// Converts this strong reference into a weak reference. Releases the
    /// object if this was the last strong reference.
    #[inline]
    pub fn into_weak(self) -> WeakPtr<'a, T> {
        WeakPtr::from(&self)
    }
}

#[cold]
fn alloc_failed(error: ShareError) -> ! {
    panic!("failed to allocate control block: {}", error);
}

impl<'a, T: ?Sized> Clone for StrongPtr<'a, T> {
    fn clone(&self) -> StrongPtr<'a, T> {
        if let Some(block) = self.block {
            block.increment_strong();
        }
        StrongPtr {
            observed: self.observed,
            block: self.block,
            data_lifetime: PhantomData,
        }
    }

    /// Does nothing if `source` observes the same address as `self`.
    fn clone_from(&mut self, source: &StrongPtr<'a, T>) {
        if self.addr() != source.addr() {
            *self = source.clone();
        }
    }
}

impl<'a, T: ?Sized> Drop for StrongPtr<'a, T> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            unsafe { block.decrement_strong(); }
        }
    }
}

impl<'a, T: ?Sized> Default for StrongPtr<'a, T> {
    #[inline]
    fn default() -> StrongPtr<'a, T> {
        StrongPtr::empty()
    }
}

impl<'a, T: ?Sized> Deref for StrongPtr<'a, T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if this reference is empty.
    #[inline]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an empty StrongPtr"),
        }
    }
}

impl<'a, T: ?Sized + 'a> From<Box<T>> for StrongPtr<'a, T> {
    #[inline]
    fn from(value: Box<T>) -> StrongPtr<'a, T> {
        StrongPtr::from_box(value)
    }
}

impl<'a, 'b, T: ?Sized> TryFrom<&'b WeakPtr<'a, T>> for StrongPtr<'a, T> {
    type Error = ShareError;

    #[inline]
    fn try_from(weak: &'b WeakPtr<'a, T>) -> Result<StrongPtr<'a, T>, ShareError> {
        weak.try_to_strong()
    }
}

impl<'a, 'b, T: ?Sized, U: ?Sized> PartialEq<StrongPtr<'b, U>> for StrongPtr<'a, T> {
    /// Compares observed addresses, not ownership groups.
    #[inline]
    fn eq(&self, other: &StrongPtr<'b, U>) -> bool {
        self.addr() == other.addr()
    }
}

impl<'a, T: ?Sized> Eq for StrongPtr<'a, T> {
}

impl<'a, T: ?Sized> Hash for StrongPtr<'a, T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<'a, T: ?Sized + Display> Display for StrongPtr<'a, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.get() {
            Some(value) => Display::fmt(value, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<'a, T: ?Sized + Debug> Debug for StrongPtr<'a, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("StrongPtr").field(&value).finish(),
            None => f.write_str("StrongPtr(empty)"),
        }
    }
}

impl<'a, T: ?Sized> Pointer for StrongPtr<'a, T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.addr() {
            Some(addr) => Pointer::fmt(&addr, f),
            None => Pointer::fmt(&core::ptr::null::<u8>(), f),
        }
    }
}
