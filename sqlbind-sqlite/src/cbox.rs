use std::ops::{Deref, DerefMut};

pub(crate) trait NullCheck {
    fn is_null(&self) -> bool;
}

impl<T> NullCheck for *const T {
    fn is_null(&self) -> bool {
        (*self as *const T).is_null()
    }
}

impl<T> NullCheck for *mut T {
    fn is_null(&self) -> bool {
        (*self as *const T).is_null()
    }
}

/// Owns a raw SQLite pointer and releases it with `dealloc` unless null.
#[derive(Debug)]
pub(crate) struct CBox<T: NullCheck> {
    pub(crate) ptr: T,
    dealloc: fn(T),
}

impl<T: NullCheck> CBox<T> {
    pub fn new(ptr: T, dealloc: fn(T)) -> Self {
        Self { ptr, dealloc }
    }
}

impl<T: NullCheck> Drop for CBox<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                (self.dealloc)(std::ptr::read(&self.ptr as *const T));
            }
        }
    }
}

impl<T: NullCheck> Deref for CBox<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.ptr
    }
}

impl<T: NullCheck> DerefMut for CBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ptr
    }
}

unsafe impl<T: NullCheck> Send for CBox<T> {}

#[cfg(test)]
mod tests {
    use crate::cbox::CBox;
    use std::{cell::Cell, ptr};

    thread_local! {
        static RELEASED: Cell<u32> = const { Cell::new(0) };
    }

    #[test]
    fn releases_once_unless_null() {
        let v = 123;
        {
            let ptr = CBox::new(ptr::null::<i32>(), |_| RELEASED.with(|v| v.set(v.get() + 1)));
            assert!(ptr.is_null());
        }
        assert_eq!(RELEASED.with(Cell::get), 0);
        {
            let ptr = CBox::new(&v as *const i32, |_| RELEASED.with(|v| v.set(v.get() + 1)));
            assert_eq!(unsafe { **ptr }, 123);
        }
        assert_eq!(RELEASED.with(Cell::get), 1);
    }
}
