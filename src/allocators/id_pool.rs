use std::{
    collections::{BTreeMap, BTreeSet},
    ops::RangeInclusive,
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::{free_range::find_free_run, IdError, IdRef, NewIdRef, WindowId};
use super::{ID_AUTO_HIGHEST, ID_AUTO_LOWEST};

#[derive(Clone, Debug)]
pub struct IdPoolDesc {
    /// Inclusive namespace the pool allocates from.
    pub range: RangeInclusive<WindowId>,
    /// IDs claimed by literal constants or legacy allocations before the pool
    /// existed. They are registered as externally in use at construction.
    pub preregistered: Vec<WindowId>,
}

impl Default for IdPoolDesc {
    fn default() -> Self {
        Self {
            range: ID_AUTO_LOWEST..=ID_AUTO_HIGHEST,
            preregistered: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Share {
    /// Taken by [`IdPool::reserve_id`], not yet wrapped in a handle.
    Raw,
    /// Owned by a live [`IdRef`].
    Handle,
}

#[derive(Clone, Copy, Debug)]
struct Shares {
    handles: usize,
    raw: bool,
}

impl Shares {
    fn new(share: Share) -> Self {
        match share {
            Share::Raw => Self {
                handles: 0,
                raw: true,
            },
            Share::Handle => Self {
                handles: 1,
                raw: false,
            },
        }
    }

    fn total(&self) -> usize {
        self.handles + usize::from(self.raw)
    }
}

#[derive(Debug)]
struct PoolState {
    /// Shares per reserved ID. A key never maps to zero shares.
    reserved: BTreeMap<WindowId, Shares>,
    external: BTreeSet<WindowId>,
    /// Every ID of the namespace below the hint is occupied.
    hint: i64,
}

impl PoolState {
    fn is_occupied(&self, id: WindowId) -> bool {
        self.reserved.contains_key(&id) || self.external.contains(&id)
    }

    fn find(&self, range: &RangeInclusive<WindowId>, count: usize) -> Option<WindowId> {
        let end = *range.end();
        if self.hint > i64::from(end) {
            return None;
        }

        let from = self.hint.max(i64::from(*range.start())) as WindowId;
        find_free_run(&self.reserved, &self.external, from..=end, count)
    }

    fn occupy(&mut self, start: WindowId, count: usize) {
        if i64::from(start) == self.hint {
            self.hint += count as i64;
        }
    }

    fn vacate(&mut self, id: WindowId) {
        self.hint = self.hint.min(i64::from(id));
    }

    fn reserve(
        &mut self,
        range: &RangeInclusive<WindowId>,
        count: usize,
        share: Share,
    ) -> Result<WindowId, IdError> {
        if count == 0 {
            return Err(IdError::InvalidArgument { count });
        }

        let Some(start) = self.find(range, count) else {
            warn!("Id pool exhausted, no run of {} free id(s)", count);
            return Err(IdError::Exhausted { count });
        };

        for id in (i64::from(start)..i64::from(start) + count as i64).map(|id| id as WindowId) {
            self.reserved.insert(id, Shares::new(share));
        }
        self.occupy(start, count);

        debug!("Reserved {} id(s) starting at {}", count, start);

        Ok(start)
    }

    fn release(&mut self, id: WindowId, share: Share) {
        let Some(shares) = self.reserved.get_mut(&id) else {
            return;
        };

        match share {
            Share::Handle if shares.handles > 0 => shares.handles -= 1,
            Share::Raw if shares.raw => shares.raw = false,
            Share::Raw => {
                warn!("Id {} is owned by handles, raw release skipped", id);
                return;
            }
            Share::Handle => return,
        }

        let left = shares.total();
        trace!("Released share of id {}, {} left", id, left);

        if left == 0 {
            self.reserved.remove(&id);
            self.vacate(id);
            debug!("Id {} returned to the free set", id);
        }
    }
}

/// Bounded pool of window IDs shared between the automatic allocator and IDs
/// that callers pick themselves.
///
/// All state sits behind one lock, so a pool can be shared freely between
/// threads through the `Arc` returned by [`IdPool::new`]. Reserved IDs are
/// normally wrapped in [`IdRef`] handles, which give their share back when
/// dropped. Shares taken with [`IdPool::reserve_id`] are tracked apart from
/// handle shares, so raw releases can never free an ID a handle still owns.
#[derive(Debug)]
pub struct IdPool {
    range: RangeInclusive<WindowId>,
    state: Mutex<PoolState>,
}

impl IdPool {
    pub fn new(desc: IdPoolDesc) -> Result<Arc<Self>, IdError> {
        if desc.range.is_empty() {
            return Err(IdError::InvalidRange {
                start: *desc.range.start(),
                end: *desc.range.end(),
            });
        }

        let state = PoolState {
            reserved: BTreeMap::new(),
            external: desc.preregistered.into_iter().collect(),
            hint: i64::from(*desc.range.start()),
        };

        debug!(
            "Created id pool [{}, {}] with {} preregistered id(s)",
            desc.range.start(),
            desc.range.end(),
            state.external.len()
        );

        Ok(Arc::new(Self {
            range: desc.range,
            state: Mutex::new(state),
        }))
    }

    pub fn with_range(range: RangeInclusive<WindowId>) -> Result<Arc<Self>, IdError> {
        Self::new(IdPoolDesc {
            range,
            ..Default::default()
        })
    }

    pub fn range(&self) -> RangeInclusive<WindowId> {
        self.range.clone()
    }

    /// Reserves the lowest run of `count` consecutive free IDs and returns its
    /// start. Each ID of the run carries one raw share; hand the IDs to
    /// [`IdRef::from_reserved`] or give them back with [`IdPool::unreserve_id`].
    pub fn reserve_id(&self, count: usize) -> Result<WindowId, IdError> {
        self.state.lock().reserve(&self.range, count, Share::Raw)
    }

    /// Drops the raw share of every ID in `[start, start + count)`. IDs that
    /// are not reserved, or whose share already went to a handle, are skipped.
    pub fn unreserve_id(&self, start: WindowId, count: usize) {
        let mut state = self.state.lock();

        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let end = i64::from(start)
            .saturating_add(count)
            .min(i64::from(WindowId::MAX) + 1);
        for id in i64::from(start)..end {
            state.release(id as WindowId, Share::Raw);
        }
    }

    /// Marks `id` as claimed outside the allocator. Registering twice is
    /// harmless; registering an ID that the pool holds is a collision.
    pub fn register_external_id(&self, id: WindowId) -> Result<(), IdError> {
        let mut state = self.state.lock();

        if state.reserved.contains_key(&id) {
            warn!("Id {} registered externally while reserved by the pool", id);
            return Err(IdError::Conflict { id });
        }

        if state.external.insert(id) {
            trace!("Registered external id {}", id);
        }

        Ok(())
    }

    pub fn unregister_external_id(&self, id: WindowId) {
        let mut state = self.state.lock();

        if state.external.remove(&id) {
            if self.range.contains(&id) {
                state.vacate(id);
            }
            trace!("Unregistered external id {}", id);
        }
    }

    /// Allocates an ID the old way: the lowest free ID is taken and registered
    /// as externally in use. Nothing counts references to it, so it stays
    /// taken until [`IdPool::unregister_external_id`] is called.
    pub fn new_legacy_id(&self) -> Result<WindowId, IdError> {
        let mut state = self.state.lock();

        let Some(id) = state.find(&self.range, 1) else {
            warn!("Id pool exhausted, no legacy id left");
            return Err(IdError::Exhausted { count: 1 });
        };

        state.external.insert(id);
        state.occupy(id, 1);

        debug!("Allocated legacy id {}", id);

        Ok(id)
    }

    pub fn is_free(&self, id: WindowId) -> bool {
        self.range.contains(&id) && !self.state.lock().is_occupied(id)
    }

    pub fn is_externally_registered(&self, id: WindowId) -> bool {
        self.state.lock().external.contains(&id)
    }

    /// Number of live shares of `id`, raw and handle-owned together; zero
    /// when it is not reserved.
    pub fn ref_count(&self, id: WindowId) -> usize {
        self.state
            .lock()
            .reserved
            .get(&id)
            .map_or(0, Shares::total)
    }

    /// Number of distinct IDs currently reserved.
    pub fn reserved_len(&self) -> usize {
        self.state.lock().reserved.len()
    }

    /// Reserves `count` IDs and wraps them in handles: a single handle when
    /// one ID is asked for, a sequence mirroring `[start, start + count)`
    /// otherwise.
    pub fn new_id_ref(self: &Arc<Self>, count: usize) -> Result<NewIdRef, IdError> {
        let refs = self.new_id_refs(count)?;

        Ok(match <[IdRef; 1]>::try_from(refs) {
            Ok([id]) => NewIdRef::One(id),
            Err(refs) => NewIdRef::Many(refs),
        })
    }

    /// Reserves `count` IDs already owned by handles, so no raw share is ever
    /// visible to other callers.
    pub fn new_id_refs(self: &Arc<Self>, count: usize) -> Result<Vec<IdRef>, IdError> {
        let start = self.state.lock().reserve(&self.range, count, Share::Handle)?;

        Ok((0..count)
            .map(|offset| IdRef::adopted(self, start + offset as WindowId))
            .collect())
    }

    /// Moves the raw share of `id` to a new handle.
    pub(crate) fn adopt(&self, id: WindowId) -> bool {
        let mut state = self.state.lock();

        match state.reserved.get_mut(&id) {
            Some(shares) if shares.raw => {
                shares.raw = false;
                shares.handles += 1;
                trace!("Handle adopted id {}", id);
                true
            }
            _ => {
                warn!("Id {} has no raw reservation to adopt", id);
                false
            }
        }
    }

    /// Adds a handle share to `id`. Fails when no handle owns it, which only
    /// happens for handles that never held a share.
    pub(crate) fn retain(&self, id: WindowId) -> bool {
        let mut state = self.state.lock();

        match state.reserved.get_mut(&id) {
            Some(shares) if shares.handles > 0 => {
                shares.handles += 1;
                trace!("Retained id {}, {} share(s)", id, shares.total());
                true
            }
            _ => {
                warn!("Handle for id {} cloned without a live reservation", id);
                false
            }
        }
    }

    pub(crate) fn release(&self, id: WindowId) {
        self.state.lock().release(id, Share::Handle);
    }
}
