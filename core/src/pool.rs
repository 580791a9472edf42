//! Reusable object pool with scoped acquire and guaranteed release.
//!
//! # Design
//! `Pool::acquire` hands out a `Pooled` guard that owns the value exclusively.
//! Values are reset on the way out of the pool, so a caller never sees state
//! left by a previous call, and again on release so large bodies are not kept
//! alive while idle. Release happens in `Drop`; there is no other way to
//! return a value, and the guard's borrow stops it from being used afterwards.
//!
//! The pool only trades allocations for a mutex; nothing depends on a value
//! actually being reused. It keeps at most `capacity` idle values and drops
//! the rest.

use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Restore a value to its freshly-constructed state.
pub trait Reset {
    fn reset(&mut self);
}

#[derive(Debug)]
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T> Pool<T> {
    pub const fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Number of values currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    // A panic while the lock is held cannot leave a half-reset value behind:
    // values are only pushed or popped whole.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Default + Reset> Pool<T> {
    pub fn acquire(&self) -> Pooled<'_, T> {
        let mut value = self.lock().pop().unwrap_or_default();
        value.reset();
        Pooled { pool: self, value }
    }

    fn release(&self, mut value: T) {
        value.reset();
        let mut idle = self.lock();
        if idle.len() < self.capacity {
            idle.push(value);
        }
    }
}

/// Exclusive handle to a pooled value. Returns the value on drop.
#[derive(Debug)]
pub struct Pooled<'a, T: Default + Reset> {
    pool: &'a Pool<T>,
    value: T,
}

impl<T: Default + Reset> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Default + Reset> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Default + Reset> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        let value = mem::take(&mut self.value);
        self.pool.release(value);
    }
}
