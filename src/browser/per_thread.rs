// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Values owned by the thread that created them
//!
//! An entry lives until its thread exits. Thread ids are never reused, so
//! entries are released from a thread-local destructor instead of waiting
//! for a lookup that will never come.

use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use dashmap::DashMap;

trait Release {
    fn release(&self, thread: ThreadId);
    fn is_live(&self) -> bool;
}

impl<T> Release for Weak<DashMap<ThreadId, T>> {
    fn release(&self, thread: ThreadId) {
        if let Some(slots) = self.upgrade() {
            slots.remove(&thread);
        }
    }

    fn is_live(&self) -> bool {
        self.strong_count() > 0
    }
}

struct ThreadExit {
    // thread::current() is unavailable while thread locals are destroyed
    thread: ThreadId,
    owners: RefCell<Vec<Box<dyn Release>>>,
}

impl Drop for ThreadExit {
    fn drop(&mut self) {
        for owner in self.owners.get_mut().drain(..) {
            owner.release(self.thread);
        }
    }
}

thread_local! {
    static THREAD_EXIT: ThreadExit = ThreadExit {
        thread: thread::current().id(),
        owners: RefCell::new(Vec::new()),
    };
}

/// Map from thread to value, pruned as threads exit
pub(crate) struct PerThread<T> {
    slots: Arc<DashMap<ThreadId, T>>,
}

impl<T: fmt::Debug> fmt::Debug for PerThread<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|e| (*e.key(), format!("{:?}", e.value()))))
            .finish()
    }
}

impl<T> Default for PerThread<T> {
    fn default() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
        }
    }
}

impl<T: Clone + 'static> PerThread<T> {
    /// Value of the calling thread, created with `init` on first use
    pub(crate) fn get_or_insert_with(&self, init: impl FnOnce() -> T) -> T {
        let id = thread::current().id();
        if let Some(value) = self.slots.get(&id) {
            return value.value().clone();
        }

        let mut created = false;
        let value = self
            .slots
            .entry(id)
            .or_insert_with(|| {
                created = true;
                init()
            })
            .value()
            .clone();

        if created {
            self.release_on_exit();
        }
        value
    }

    fn release_on_exit(&self) {
        let owner: Box<dyn Release> = Box::new(Arc::downgrade(&self.slots));
        // Nothing to register once the thread is already tearing down
        let _ = THREAD_EXIT.try_with(|exit| {
            let mut owners = exit.owners.borrow_mut();
            owners.retain(|o| o.is_live());
            owners.push(owner);
        });
    }

    /// Run `f` on the value of every live thread
    pub(crate) fn for_each(&self, f: impl Fn(&T)) {
        for entry in self.slots.iter() {
            f(entry.value());
        }
    }

    /// Number of threads holding a value
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_per_thread() {
        let values: Arc<PerThread<u32>> = Arc::new(PerThread::default());
        assert_eq!(values.get_or_insert_with(|| 1), 1);
        assert_eq!(values.get_or_insert_with(|| 2), 1);

        let other = values.clone();
        let seen = thread::spawn(move || {
            let seen = other.get_or_insert_with(|| 7);
            assert_eq!(other.len(), 2);
            seen
        })
        .join()
        .unwrap();

        assert_eq!(seen, 7);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_released_when_thread_exits() {
        let values: Arc<PerThread<Arc<String>>> = Arc::new(PerThread::default());
        for i in 0..64 {
            let values = values.clone();
            thread::spawn(move || {
                values.get_or_insert_with(|| Arc::new(i.to_string()));
            })
            .join()
            .unwrap();
        }
        assert_eq!(values.len(), 0);
    }

    #[test]
    fn test_dropped_owner_is_skipped() {
        thread::spawn(|| {
            let first: PerThread<u8> = PerThread::default();
            first.get_or_insert_with(|| 1);
            drop(first);

            let second: PerThread<u8> = PerThread::default();
            second.get_or_insert_with(|| 2);
            THREAD_EXIT.with(|exit| assert_eq!(exit.owners.borrow().len(), 1));
        })
        .join()
        .unwrap();
    }
}
