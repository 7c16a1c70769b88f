//! Object pool for reusing commands and option bags
//!
//! Unlike a process-wide pool, a [`Pool`] is an ordinary value owned by
//! whoever needs it (normally an [`Ipset`](crate::Ipset) client). Objects
//! are handed out as [`Pooled`] guards; dropping the guard resets the object
//! and puts it back, so a released object can never carry state into its
//! next use.
//!
//! # Usage
//!
//! ```rust
//! use nxset_ipset::{Options, Pool};
//!
//! let pool: Pool<Options> = Pool::new();
//!
//! let mut opts = pool.acquire();
//! opts.comment = true;
//! drop(opts);
//!
//! // Reacquiring may reuse the same bag, always zeroed
//! let opts = pool.acquire();
//! assert!(!opts.comment);
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of idle objects kept per pool
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Objects that can be returned to a zero state in place
pub trait Reset {
    /// Zero every field, keeping allocations where possible
    fn reset(&mut self);
}

/// Thread-safe free list of reusable objects
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    max_idle: usize,
}

impl<T: Reset + Default> Pool<T> {
    /// Create a pool keeping up to [`DEFAULT_POOL_CAPACITY`] idle objects
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Create a pool keeping up to `max_idle` idle objects
    pub fn with_capacity(max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_idle.min(DEFAULT_POOL_CAPACITY))),
            max_idle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        // a panic while holding the lock cannot leave a half-reset object in
        // the list, since objects are reset before the lock is taken
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take an object out of the pool, or create one
    #[inline]
    pub fn acquire(&self) -> Pooled<'_, T> {
        let item = self.lock().pop().unwrap_or_default();
        Pooled {
            pool: self,
            inner: Some(item),
        }
    }

    /// Reset `item` and keep it for reuse if there is room
    pub fn release(&self, mut item: T) {
        item.reset();
        let mut free = self.lock();
        if free.len() < self.max_idle {
            free.push(item);
        }
    }

    /// Pre-fill the pool so the first acquisitions do not allocate
    pub fn prewarm(&self, count: usize) {
        let mut free = self.lock();
        let to_add = count.min(self.max_idle.saturating_sub(free.len()));
        for _ in 0..to_add {
            free.push(T::default());
        }
    }

    /// Drop every idle object
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of idle objects
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }
}

impl<T: Reset + Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("max_idle", &self.max_idle)
            .finish_non_exhaustive()
    }
}

/// An object borrowed from a [`Pool`], returned when dropped
pub struct Pooled<'a, T: Reset + Default> {
    pool: &'a Pool<T>,
    inner: Option<T>,
}

impl<T: Reset + Default> Pooled<'_, T> {
    /// Detach the object; it will not go back to the pool
    pub fn into_inner(mut self) -> T {
        self.inner.take().unwrap_or_default()
    }
}

impl<T: Reset + Default> Deref for Pooled<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // inner is only None after into_inner, which consumes the guard
        match &self.inner {
            Some(item) => item,
            None => unreachable!("pooled object already taken"),
        }
    }
}

impl<T: Reset + Default> DerefMut for Pooled<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some(item) => item,
            None => unreachable!("pooled object already taken"),
        }
    }
}

impl<T: Reset + Default + fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: Reset + Default> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.inner.take() {
            self.pool.release(item);
        }
    }
}
