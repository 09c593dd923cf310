use std::{
    collections::{BTreeMap, BTreeSet},
    iter::Peekable,
    ops::RangeInclusive,
};

use super::WindowId;

/// Ascending walk over every ID that is either reserved or externally in use.
/// The two sources are disjoint, so the merge never has to deduplicate.
struct Occupied<A: Iterator, B: Iterator> {
    reserved: Peekable<A>,
    external: Peekable<B>,
}

impl<A, B> Iterator for Occupied<A, B>
where
    A: Iterator<Item = WindowId>,
    B: Iterator<Item = WindowId>,
{
    type Item = WindowId;

    fn next(&mut self) -> Option<Self::Item> {
        let reserved = self.reserved.peek().copied();
        let external = self.external.peek().copied();

        match (reserved, external) {
            (Some(r), Some(e)) if r <= e => self.reserved.next(),
            (Some(_), Some(_)) => self.external.next(),
            (Some(_), None) => self.reserved.next(),
            (None, _) => self.external.next(),
        }
    }
}

/// Returns the lowest start of `count` consecutive IDs inside `range` that are
/// neither in `reserved` nor in `external`. Read-only: nothing is marked.
pub(super) fn find_free_run<V>(
    reserved: &BTreeMap<WindowId, V>,
    external: &BTreeSet<WindowId>,
    range: RangeInclusive<WindowId>,
    count: usize,
) -> Option<WindowId> {
    if range.is_empty() {
        return None;
    }

    let need = i64::try_from(count).ok()?;
    let end = i64::from(*range.end());
    let mut start = i64::from(*range.start());

    let occupied = Occupied {
        reserved: reserved.range(range.clone()).map(|(id, _)| *id).peekable(),
        external: external.range(range).copied().peekable(),
    };

    for id in occupied {
        let id = i64::from(id);

        if id - start >= need {
            return Some(start as WindowId);
        }

        start = id + 1;
    }

    (end - start + 1 >= need).then_some(start as WindowId)
}
