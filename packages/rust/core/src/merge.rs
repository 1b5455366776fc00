//! Deduplication against the persisted set, and the rank-ordered merge.

use std::collections::{HashMap, HashSet};

use storyfeed_shared::{Story, StoryId};

/// Ranked ids not in `known`, in ranking order. Repeated ids are kept once.
pub fn new_ids(ranked: &[StoryId], known: &HashSet<StoryId>) -> Vec<StoryId> {
    let mut seen = HashSet::with_capacity(ranked.len());
    ranked
        .iter()
        .copied()
        .filter(|id| !known.contains(id) && seen.insert(*id))
        .collect()
}

/// The record set to persist: one story per ranked id, in ranking order.
///
/// Freshly processed stories win over persisted ones with the same id.
/// Persisted stories whose id is no longer ranked are dropped.
pub fn merge_latest(ranked: &[StoryId], fresh: Vec<Story>, persisted: Vec<Story>) -> Vec<Story> {
    let mut by_id: HashMap<StoryId, Story> = HashMap::with_capacity(fresh.len() + persisted.len());
    for story in fresh.into_iter().chain(persisted) {
        by_id.entry(story.id).or_insert(story);
    }

    ranked.iter().filter_map(|id| by_id.remove(id)).collect()
}
