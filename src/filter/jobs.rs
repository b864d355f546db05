//! Job-based checks: jobs-limit exclusion and slot joinability.

use std::collections::BTreeSet;

use crate::domain::Job;
use crate::model::Listing;

/// Minimum party size the jobs-limit check applies to. Smaller listings are
/// rejected outright when a limit is set.
pub const JOBS_LIMIT_MIN_SLOTS: usize = 8;

/// Returns `true` if any occupied slot holds a job whose bit is set in
/// `mask`. Unknown class-job rows never match.
pub fn jobs_limit_present(mask: u32, listing: &Listing) -> bool {
    listing
        .jobs_present
        .iter()
        .filter_map(|&row| Job::from_row_id(row))
        .any(|job| mask & job.bit() != 0)
}

/// Decides whether every wanted job group can take a distinct empty slot.
///
/// This is a conservative approximation rather than a full matching:
///
/// 1. every group needs at least one candidate slot (empty, accepting one of
///    its jobs, and under one-player-per-job, at least one of its jobs not
///    already in the party);
/// 2. the union of candidate slots must be at least as large as the number
///    of groups;
/// 3. for every pair of groups, if they share exactly one candidate slot and
///    the first has no other candidate, the party is not joinable.
///
/// Some infeasible compositions pass these checks; they are not tightened.
pub fn can_join(wanted: &[u32], listing: &Listing, one_player_per_job: bool) -> bool {
    if wanted.is_empty() {
        return true;
    }

    let mut candidates: Vec<BTreeSet<usize>> = Vec::with_capacity(wanted.len());
    for &group in wanted {
        let slots = candidate_slots(group, listing, one_player_per_job);
        if slots.is_empty() {
            return false;
        }
        candidates.push(slots);
    }

    let reachable: BTreeSet<usize> = candidates.iter().flatten().copied().collect();
    if reachable.len() < candidates.len() {
        return false;
    }

    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            if a.intersection(b).count() != 1 {
                continue;
            }
            if a.difference(b).next().is_none() {
                return false;
            }
        }
    }

    true
}

/// Indices of the empty slots one recruit of `group` could take.
fn candidate_slots(group: u32, listing: &Listing, one_player_per_job: bool) -> BTreeSet<usize> {
    if one_player_per_job && !has_untaken_job(group, listing) {
        return BTreeSet::new();
    }
    listing
        .slots
        .iter()
        .enumerate()
        .filter(|&(idx, _)| listing.present_at(idx) == 0)
        .filter(|(_, slot)| slot.accepts_any(group))
        .map(|(idx, _)| idx)
        .collect()
}

fn has_untaken_job(group: u32, listing: &Listing) -> bool {
    Job::in_mask(group).any(|job| !listing.jobs_present.contains(&job.row_id()))
}
