//! Typed key/value attachments bound to an endpoint's lifetime.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

static NEXT_KEY: AtomicU64 = AtomicU64::new(0);

/// Identity of one attachment slot. Two keys never collide, even when
/// they carry the same value type.
pub struct AttachmentKey<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttachmentKey<T> {
    /// Allocates a fresh key.
    pub fn new() -> Self {
        Self {
            id: NEXT_KEY.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for AttachmentKey<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AttachmentKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttachmentKey<T> {}

impl<T> fmt::Debug for AttachmentKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentKey").field("id", &self.id).finish()
    }
}

type Value = Arc<dyn Any + Send + Sync>;

/// Values attached to one side of a channel, keyed by [`AttachmentKey`].
#[derive(Default)]
pub struct Attachments {
    values: Mutex<HashMap<u64, Value>>,
}

fn downcast<T: Send + Sync + 'static>(value: Value) -> Option<Arc<T>> {
    value.downcast::<T>().ok()
}

impl Attachments {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, returning whatever was attached under `key` before.
    pub fn attach<T: Send + Sync + 'static>(&self, key: &AttachmentKey<T>, value: T) -> Option<Arc<T>> {
        self.values
            .lock()
            .insert(key.id, Arc::new(value))
            .and_then(downcast)
    }

    /// Stores `value` only if `key` is vacant; otherwise returns the existing value.
    pub fn attach_if_absent<T: Send + Sync + 'static>(&self, key: &AttachmentKey<T>, value: T) -> Option<Arc<T>> {
        let mut values = self.values.lock();
        if let Some(existing) = values.get(&key.id) {
            return downcast(existing.clone());
        }
        values.insert(key.id, Arc::new(value));
        None
    }

    /// The value attached under `key`, if any.
    pub fn get<T: Send + Sync + 'static>(&self, key: &AttachmentKey<T>) -> Option<Arc<T>> {
        self.values.lock().get(&key.id).cloned().and_then(downcast)
    }

    /// Detaches and returns the value under `key`.
    pub fn remove<T: Send + Sync + 'static>(&self, key: &AttachmentKey<T>) -> Option<Arc<T>> {
        self.values.lock().remove(&key.id).and_then(downcast)
    }
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachments")
            .field("len", &self.values.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_get_remove() {
        let attachments = Attachments::new();
        let key: AttachmentKey<String> = AttachmentKey::new();

        assert!(attachments.get(&key).is_none());
        assert!(attachments.attach(&key, "first".to_string()).is_none());
        assert_eq!(attachments.get(&key).as_deref().map(String::as_str), Some("first"));

        let previous = attachments.attach(&key, "second".to_string());
        assert_eq!(previous.as_deref().map(String::as_str), Some("first"));

        let removed = attachments.remove(&key);
        assert_eq!(removed.as_deref().map(String::as_str), Some("second"));
        assert!(attachments.get(&key).is_none());
    }

    #[test]
    fn test_attach_if_absent_keeps_existing() {
        let attachments = Attachments::new();
        let key = AttachmentKey::<u32>::new();

        assert!(attachments.attach_if_absent(&key, 1).is_none());
        assert_eq!(attachments.attach_if_absent(&key, 2).as_deref(), Some(&1));
        assert_eq!(attachments.get(&key).as_deref(), Some(&1));
    }

    #[test]
    fn test_keys_of_same_type_are_distinct() {
        let attachments = Attachments::new();
        let a = AttachmentKey::<u8>::new();
        let b = AttachmentKey::<u8>::new();

        attachments.attach(&a, 1);
        attachments.attach(&b, 2);
        assert_eq!(attachments.get(&a).as_deref(), Some(&1));
        assert_eq!(attachments.get(&b).as_deref(), Some(&2));
    }
}
