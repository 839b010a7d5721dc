//! Helpers to maintain the shuffle cycle.
//!
//! While shuffle is on the controller keeps `order`, a permutation of playlist
//! indices, and `pos`, the position in `order` of the track playing now.
//! Entries up to and including `pos` have been played in this cycle; the rest
//! have not. These helpers keep that split intact as the playlist changes.

use rand::Rng;
use rand::seq::SliceRandom;

/// A fresh random permutation of `0..len`, with `first` pinned to the front.
pub(crate) fn shuffled_order<R: Rng + ?Sized>(
    len: usize,
    first: Option<usize>,
    rng: &mut R,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    if let Some(f) = first {
        if let Some(p) = order.iter().position(|&i| i == f) {
            order.swap(0, p);
        }
    }
    order
}

/// Mark `index` as the track playing now and return its new position.
///
/// An unplayed track is moved to just after `pos`; an already played one is
/// moved to `pos` so the played prefix keeps the same members.
pub(crate) fn promote(order: &mut Vec<usize>, pos: Option<usize>, index: usize) -> Option<usize> {
    let p = order.iter().position(|&i| i == index)?;
    let target = match pos {
        None => 0,
        Some(cur) if p > cur => cur + 1,
        Some(cur) => cur,
    };
    let v = order.remove(p);
    order.insert(target, v);
    Some(target)
}

/// Drop playlist index `removed` from `order` and shift higher indices down.
pub(crate) fn remove_index(order: &mut Vec<usize>, pos: &mut Option<usize>, removed: usize) {
    if let Some(p) = order.iter().position(|&i| i == removed) {
        order.remove(p);
        *pos = match *pos {
            Some(cur) if p <= cur => cur.checked_sub(1),
            other => other,
        };
    }
    for i in order.iter_mut() {
        if *i > removed {
            *i -= 1;
        }
    }
}

/// Where index `i` ends up after the playlist moves `from` to `to`.
pub(crate) fn remap_moved(i: usize, from: usize, to: usize) -> usize {
    if i == from {
        to
    } else if from < to && i > from && i <= to {
        i - 1
    } else if to < from && i >= to && i < from {
        i + 1
    } else {
        i
    }
}

/// Rewrite `order` after the playlist moved `from` to `to`.
pub(crate) fn apply_move(order: &mut [usize], from: usize, to: usize) {
    for i in order.iter_mut() {
        *i = remap_moved(*i, from, to);
    }
}

/// Scatter the new playlist indices `added` among the unplayed part of `order`.
pub(crate) fn insert_unplayed<R: Rng + ?Sized>(
    order: &mut Vec<usize>,
    pos: Option<usize>,
    added: std::ops::Range<usize>,
    rng: &mut R,
) {
    let first_unplayed = pos.map_or(0, |p| p + 1);
    for index in added {
        let at = rng.random_range(first_unplayed..=order.len());
        order.insert(at, index);
    }
}
