//! Shared ownership of heap objects through intrusive atomic reference counting.
//!
//! Every object handed out by [`RefPtr::new`] lives in a single heap block
//! starting with a [`Referenced`] header. The header holds the reference count
//! and a type-erased destructor for the whole block, so handles can be
//! re-targeted to a different view of the object (a trait object, a field,
//! a downcast concrete type) while still sharing the same count.

use std::{
    any::{self, Any},
    fmt,
    marker::PhantomData,
    mem,
    ops::Deref,
    ptr::{self, NonNull},
    sync::atomic::{self, AtomicUsize, Ordering},
};

/// Header of a reference counted heap object.
pub struct Referenced {
    reference_count: AtomicUsize,
    type_name: &'static str,
    destroy: unsafe fn(NonNull<Referenced>),
}

#[repr(C)]
struct RefBlock<T> {
    header: Referenced,
    value: T,
}

impl Referenced {
    fn for_type<T>() -> Self {
        Self {
            reference_count: AtomicUsize::new(0),
            type_name: any::type_name::<T>(),
            destroy: destroy_block::<T>,
        }
    }

    /// Adds a reference to the object and returns the new reference count.
    pub fn add_reference(&self) -> usize {
        self.reference_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Removes a reference from the object, destroying the object if no
    /// references remain. Returns the new reference count.
    ///
    /// # Safety
    ///
    /// `this` must point to the header of a live object created by
    /// [`RefPtr::new`], and the caller must give up one reference it owns.
    /// If the returned count is zero the object may have been destroyed,
    /// so `this` must not be used again.
    pub unsafe fn remove_reference(this: NonNull<Self>) -> usize {
        let header = this.as_ref();
        let previous_count = header.reference_count.fetch_sub(1, Ordering::Release);
        match previous_count {
            0 => {
                header.restore_after_underflow();
                0
            }
            1 => {
                atomic::fence(Ordering::Acquire);
                (header.destroy)(this);
                0
            }
            _ => previous_count - 1,
        }
    }

    /// Removes a reference from the object without ever destroying it.
    /// Returns the new reference count.
    ///
    /// # Safety
    ///
    /// The caller must give up one reference it owns. Removing a reference
    /// held by a live `RefPtr` would let another handle believe it has
    /// exclusive access to the object.
    pub unsafe fn remove_reference_no_delete(&self) -> usize {
        let previous_count = self.reference_count.fetch_sub(1, Ordering::Release);
        if previous_count == 0 {
            self.restore_after_underflow();
            0
        } else {
            previous_count - 1
        }
    }

    /// Returns the current reference count.
    pub fn reference_count(&self) -> usize {
        self.reference_count.load(Ordering::Acquire)
    }

    /// Returns the name of the type of the referenced object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn restore_after_underflow(&self) {
        self.reference_count.fetch_add(1, Ordering::Relaxed);
        warn_lifetime(format!(
            "Remove reference from object with no references: {}",
            self.type_name
        ));
    }
}

impl fmt::Debug for Referenced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Referenced")
            .field("type_name", &self.type_name)
            .field("reference_count", &self.reference_count())
            .finish()
    }
}

unsafe fn destroy_block<T>(header: NonNull<Referenced>) {
    let block = header.cast::<RefBlock<T>>();
    let remaining_count = block.as_ref().header.reference_count.load(Ordering::Relaxed);
    if remaining_count != 0 {
        warn_lifetime(format!(
            "Deleting object with references: {}",
            block.as_ref().header.type_name
        ));
    }
    drop(Box::from_raw(block.as_ptr()));
}

fn warn_lifetime(message: String) {
    if cfg!(debug_assertions) {
        eprintln!("Warning: {}", message);
    }
}

struct RefTarget<T: ?Sized> {
    header: NonNull<Referenced>,
    value: NonNull<T>,
}

impl<T: ?Sized> Clone for RefTarget<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for RefTarget<T> {}

impl<T: ?Sized> RefTarget<T> {
    fn header(&self) -> &Referenced {
        // The header outlives every handle holding a reference.
        unsafe { self.header.as_ref() }
    }
}

/// Handle owning zero or one reference to a reference counted object.
///
/// Cloning the handle adds a reference and dropping it removes one. The
/// object is destroyed on whichever thread removes the last reference.
pub struct RefPtr<T: ?Sized> {
    target: Option<RefTarget<T>>,
    _owned: PhantomData<T>,
}

unsafe impl<T: ?Sized + Send + Sync> Send for RefPtr<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for RefPtr<T> {}

impl<T: Send + Sync + 'static> RefPtr<T> {
    /// Moves the given value to the heap and returns the first handle to it.
    pub fn new(value: T) -> Self {
        let block = NonNull::from(Box::leak(Box::new(RefBlock {
            header: Referenced::for_type::<T>(),
            value,
        })));
        let header = block.cast::<Referenced>();
        let value = unsafe { NonNull::new_unchecked(ptr::addr_of_mut!((*block.as_ptr()).value)) };
        let target = RefTarget { header, value };
        target.header().add_reference();
        Self::from_target(Some(target))
    }

    /// Creates a type-erased handle to the same object.
    pub fn into_any(self) -> RefPtr<dyn Any + Send + Sync> {
        self.map(erase_type::<T>)
    }
}

fn erase_type<T: Any + Send + Sync>(value: &T) -> &(dyn Any + Send + Sync + 'static) {
    value
}

impl<T: ?Sized> RefPtr<T> {
    fn from_target(target: Option<RefTarget<T>>) -> Self {
        Self {
            target,
            _owned: PhantomData,
        }
    }

    /// Creates a handle not referring to any object.
    pub fn null() -> Self {
        Self::from_target(None)
    }

    /// Whether the handle refers to an object.
    pub fn is_valid(&self) -> bool {
        self.target.is_some()
    }

    /// Returns a reference to the object, or `None` if the handle is empty.
    pub fn get(&self) -> Option<&T> {
        self.target
            .as_ref()
            .map(|target| unsafe { target.value.as_ref() })
    }

    /// Returns a mutable reference to the object if this handle holds
    /// the only reference to it.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self.target {
            Some(target) if target.header().reference_count() == 1 => {
                Some(unsafe { &mut *target.value.as_ptr() })
            }
            _ => None,
        }
    }

    /// Returns the header of the referenced object, or `None` if the handle is empty.
    pub fn referenced(&self) -> Option<&Referenced> {
        self.target.as_ref().map(RefTarget::header)
    }

    /// Returns the reference count of the object, or zero if the handle is empty.
    pub fn reference_count(&self) -> usize {
        self.referenced().map_or(0, Referenced::reference_count)
    }

    /// Removes this handle's reference, leaving the handle empty.
    pub fn reset(&mut self) {
        drop(self.take());
    }

    /// Makes this handle refer to the same object as the given handle.
    ///
    /// The reference to the new object is added before the reference to the
    /// old one is removed, so assigning a handle to itself or to an alias of
    /// the same object never destroys the object.
    pub fn assign(&mut self, other: &Self) {
        if Self::ptr_eq(self, other) {
            return;
        }
        let new_target = other.target;
        if let Some(target) = new_target.as_ref() {
            target.header().add_reference();
        }
        let old = mem::replace(self, Self::from_target(new_target));
        drop(old);
    }

    /// Exchanges the objects referred to by the two handles.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.target, &mut other.target);
    }

    /// Whether the two handles refer to the same object (or are both empty).
    pub fn ptr_eq<U: ?Sized>(a: &Self, b: &RefPtr<U>) -> bool {
        match (a.target.as_ref(), b.target.as_ref()) {
            (Some(a), Some(b)) => a.header == b.header,
            (None, None) => true,
            _ => false,
        }
    }

    /// Converts the handle into a handle for a different view of the same
    /// object, keeping its reference. Typically used for up-casting to a trait
    /// object or projecting onto a part of the object.
    pub fn map<U, M>(self, projection: M) -> RefPtr<U>
    where
        U: ?Sized,
        M: for<'a> FnOnce(&'a T) -> &'a U,
    {
        let target = self.take_ownership();
        RefPtr::from_target(target.map(|target| RefTarget {
            header: target.header,
            value: NonNull::from(projection(unsafe { target.value.as_ref() })),
        }))
    }

    /// Like `map`, but the projection may fail, in which case the reference
    /// is removed and an empty handle is returned. Typically used for
    /// down-casting.
    pub fn try_map<U, M>(self, projection: M) -> RefPtr<U>
    where
        U: ?Sized,
        M: for<'a> FnOnce(&'a T) -> Option<&'a U>,
    {
        let value = match self.get() {
            Some(value) => projection(value).map(NonNull::from),
            None => None,
        };
        match value {
            Some(value) => {
                let target = self.take_ownership();
                RefPtr::from_target(target.map(|target| RefTarget {
                    header: target.header,
                    value,
                }))
            }
            None => RefPtr::null(),
        }
    }

    /// Gives up the handle's ownership bookkeeping without ever destroying
    /// the object, returning a raw reference to it.
    ///
    /// If no other handles remain the object stays alive until a handle is
    /// recreated with [`RefPtr::from_raw`] and dropped.
    pub fn release(self) -> Option<RawRef<T>> {
        self.take_ownership().map(|target| {
            unsafe { target.header().remove_reference_no_delete() };
            RawRef { target }
        })
    }

    /// Creates a new handle from a raw reference, adding a reference.
    ///
    /// # Safety
    ///
    /// The object behind the raw reference must not have been destroyed.
    pub unsafe fn from_raw(raw: RawRef<T>) -> Self {
        raw.target.header().add_reference();
        Self::from_target(Some(raw.target))
    }

    fn take(&mut self) -> Option<Self> {
        self.target.take().map(|target| Self::from_target(Some(target)))
    }

    fn take_ownership(mut self) -> Option<RefTarget<T>> {
        let target = self.target.take();
        mem::forget(self);
        target
    }
}

impl RefPtr<dyn Any + Send + Sync> {
    /// Creates a handle to the object as the given concrete type, or an empty
    /// handle if the object has a different type.
    pub fn downcast<T: Any + Send + Sync>(self) -> RefPtr<T> {
        self.try_map(|value| value.downcast_ref::<T>())
    }
}

impl<T: ?Sized> Drop for RefPtr<T> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            unsafe {
                Referenced::remove_reference(target.header);
            }
        }
    }
}

impl<T: ?Sized> Clone for RefPtr<T> {
    fn clone(&self) -> Self {
        if let Some(target) = self.target.as_ref() {
            target.header().add_reference();
        }
        Self::from_target(self.target)
    }
}

impl<T: ?Sized> Default for RefPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
            .unwrap_or_else(|| panic!("Dereferenced an empty RefPtr"))
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for RefPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f
                .debug_struct("RefPtr")
                .field("reference_count", &self.reference_count())
                .field("value", &value)
                .finish(),
            None => f.write_str("RefPtr(null)"),
        }
    }
}

/// Raw reference to an object whose handle has been released.
pub struct RawRef<T: ?Sized> {
    target: RefTarget<T>,
}

impl<T: ?Sized> RawRef<T> {
    /// Returns a pointer to the object.
    pub fn as_ptr(&self) -> *const T {
        self.target.value.as_ptr()
    }

    /// Returns the header of the object.
    ///
    /// # Safety
    ///
    /// The object must not have been destroyed.
    pub unsafe fn referenced(&self) -> &Referenced {
        self.target.header.as_ref()
    }
}

unsafe impl<T: ?Sized + Send + Sync> Send for RawRef<T> {}
