use std::{cmp::Ordering, fmt, hash::Hash, sync::Arc};

use static_assertions::assert_impl_all;

use super::{IdError, IdPool, WindowId, ID_NONE};

assert_impl_all!(IdPool: Send, Sync);
assert_impl_all!(IdRef: Send, Sync);

/// Wraps a reserved window ID and keeps it reserved until every clone of the
/// handle is gone.
///
/// Cloning shares the reservation instead of making a new one. The handle
/// compares, orders and hashes by ID value only, and converts into a plain
/// [`WindowId`] wherever the toolkit expects one.
pub struct IdRef {
    value: WindowId,
    pool: Option<Arc<IdPool>>,
}

impl IdRef {
    /// Wraps an ID returned by [`IdPool::reserve_id`]. The handle takes over
    /// the raw share that reservation created; the pool count is left
    /// untouched. Fails when `id` has no raw share, which covers IDs that were
    /// never reserved, already unreserved, or already adopted.
    pub fn from_reserved(pool: &Arc<IdPool>, id: WindowId) -> Result<Self, IdError> {
        if !pool.adopt(id) {
            return Err(IdError::NotReserved { id });
        }

        Ok(Self::adopted(pool, id))
    }

    /// Wraps an ID whose handle share the pool has already counted.
    #[inline]
    pub(crate) fn adopted(pool: &Arc<IdPool>, id: WindowId) -> Self {
        Self {
            value: id,
            pool: Some(Arc::clone(pool)),
        }
    }

    #[inline]
    pub fn value(&self) -> WindowId {
        self.value
    }

    /// Same as [`IdRef::value`], for event binding call sites that ask for
    /// the source ID.
    #[inline]
    pub fn id(&self) -> WindowId {
        self.value
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.pool.is_none()
    }
}

impl Clone for IdRef {
    fn clone(&self) -> Self {
        match &self.pool {
            Some(pool) if pool.retain(self.value) => Self::adopted(pool, self.value),
            _ => Self::default(),
        }
    }
}

impl Drop for IdRef {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(self.value);
        }
    }
}

impl Default for IdRef {
    fn default() -> Self {
        Self {
            value: ID_NONE,
            pool: None,
        }
    }
}

impl PartialEq for IdRef {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for IdRef {}

impl PartialOrd for IdRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IdRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for IdRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialEq<WindowId> for IdRef {
    fn eq(&self, other: &WindowId) -> bool {
        self.value == *other
    }
}

impl PartialEq<IdRef> for WindowId {
    fn eq(&self, other: &IdRef) -> bool {
        *self == other.value
    }
}

impl PartialOrd<WindowId> for IdRef {
    fn partial_cmp(&self, other: &WindowId) -> Option<Ordering> {
        self.value.partial_cmp(other)
    }
}

impl PartialOrd<IdRef> for WindowId {
    fn partial_cmp(&self, other: &IdRef) -> Option<Ordering> {
        self.partial_cmp(&other.value)
    }
}

impl From<&IdRef> for WindowId {
    fn from(value: &IdRef) -> Self {
        value.value
    }
}

impl From<IdRef> for WindowId {
    fn from(value: IdRef) -> Self {
        value.value
    }
}

impl fmt::Debug for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdRef")
            .field("value", &self.value)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowIDRef: {}", self.value)
    }
}

/// Result of [`IdPool::new_id_ref`].
#[derive(Debug)]
pub enum NewIdRef {
    One(IdRef),
    Many(Vec<IdRef>),
}

impl NewIdRef {
    pub fn into_vec(self) -> Vec<IdRef> {
        match self {
            NewIdRef::One(id) => vec![id],
            NewIdRef::Many(refs) => refs,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{Arc, Barrier},
        thread,
    };

    use super::*;

    fn pool() -> Arc<IdPool> {
        IdPool::with_range(1..=5).unwrap()
    }

    fn values(refs: &[IdRef]) -> Vec<WindowId> {
        refs.iter().map(IdRef::value).collect()
    }

    #[test]
    fn test_clone_shares_reservation() {
        let pool = pool();
        let NewIdRef::One(original) = pool.new_id_ref(1).unwrap() else {
            panic!("expected a single handle");
        };
        let id = original.value();

        let copy = original.clone();
        assert_eq!(pool.ref_count(id), 2);
        assert_eq!(pool.reserved_len(), 1);

        drop(original);
        assert!(!pool.is_free(id));
        assert_eq!(pool.ref_count(id), 1);

        drop(copy);
        assert!(pool.is_free(id));
    }

    #[test]
    fn test_range_handles_are_independent() {
        let pool = pool();
        let NewIdRef::Many(mut refs) = pool.new_id_ref(3).unwrap() else {
            panic!("expected a sequence of handles");
        };
        assert_eq!(values(&refs), [1, 2, 3]);

        let middle = refs.remove(1);
        drop(middle);

        assert!(pool.is_free(2));
        assert!(!pool.is_free(1));
        assert!(!pool.is_free(3));
    }

    #[test]
    fn test_default_handle_is_inert() {
        let pool = pool();
        let none = IdRef::default();

        assert!(none.is_none());
        assert_eq!(none, ID_NONE);

        let copy = none.clone();
        drop(none);
        drop(copy);
        assert_eq!(pool.reserved_len(), 0);
    }

    #[test]
    fn test_value_surface() {
        let pool = pool();
        let first = pool.new_id_refs(2).unwrap();
        let (a, b) = (&first[0], &first[1]);

        let (one, two): (WindowId, WindowId) = (1, 2);

        assert_eq!(a.value(), one);
        assert_eq!(a.id(), one);
        assert!(a < b);
        assert!(*a < two);
        assert!(two > *a);
        assert!(one == *a);
        assert!(*b != one);
        assert_eq!(WindowId::from(a), one);
        assert_eq!(a.to_string(), "WindowIDRef: 1");

        let copy = a.clone();
        let mut set = HashSet::new();
        set.insert(copy);
        assert!(set.contains(a));
        assert!(!set.contains(b));
    }

    #[test]
    fn test_into_vec() {
        let pool = pool();
        let one = pool.new_id_ref(1).unwrap();
        assert!(matches!(one, NewIdRef::One(_)));
        assert_eq!(values(&one.into_vec()), [1]);

        let many = pool.new_id_ref(2).unwrap();
        assert!(matches!(&many, NewIdRef::Many(refs) if refs.len() == 2));
        assert_eq!(values(&many.into_vec()), [1, 2]);
    }

    #[test]
    fn test_concurrent_clone_and_drop() {
        let pool = IdPool::with_range(1..=64).unwrap();
        let handle = pool.new_id_refs(1).unwrap().remove(0);
        let id = handle.value();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let copy = handle.clone();
                        drop(copy);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(pool.ref_count(id), 1);
        drop(handle);
        assert!(pool.is_free(id));
    }

    #[test]
    fn test_last_shares_dropped_concurrently() {
        let pool = IdPool::with_range(1..=4).unwrap();

        for _ in 0..300 {
            let handle = pool.new_id_refs(1).unwrap().remove(0);
            let id = handle.value();
            let barrier = Arc::new(Barrier::new(4));

            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let copy = handle.clone();
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        drop(copy);
                    })
                })
                .collect();

            drop(handle);

            for worker in workers {
                worker.join().unwrap();
            }

            assert!(pool.is_free(id));
            assert_eq!(pool.reserved_len(), 0);
        }
    }

    #[test]
    fn test_from_reserved_rejects_unreserved_ids() {
        let pool = pool();

        assert_eq!(
            IdRef::from_reserved(&pool, 100).unwrap_err(),
            IdError::NotReserved { id: 100 }
        );
        assert_eq!(
            IdRef::from_reserved(&pool, 2).unwrap_err(),
            IdError::NotReserved { id: 2 }
        );
        assert_eq!(pool.reserved_len(), 0);

        let start = pool.reserve_id(1).unwrap();
        let handle = IdRef::from_reserved(&pool, start).unwrap();
        let copy = handle.clone();
        assert_eq!(pool.ref_count(start), 2);

        drop(handle);
        drop(copy);
        assert!(pool.is_free(start));
    }

    #[test]
    fn test_clone_never_recreates_a_reservation() {
        let pool = pool();
        let stray = IdRef::adopted(&pool, 3);

        let copy = stray.clone();
        assert!(copy.is_none());
        assert_eq!(pool.reserved_len(), 0);

        drop(copy);
        drop(stray);
        assert!(pool.is_free(3));
    }
}
