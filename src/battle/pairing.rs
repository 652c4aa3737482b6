//! Battle queue construction
//!
//! Two strategies, selected by item count. Small collections get exhaustive
//! round-robin coverage; larger ones get a rating-aware pass that prefers
//! close matchups under a per-item ceiling, topped up with random pairs to
//! a coverage target. The finished queue is shuffled so construction order
//! never leaks into what the user sees.

use crate::config::PairingConfig;
use crate::rating::RatingStore;
use crate::types::{Matchup, RankableItem};
use crate::utils::{ratings_within_tolerance, unordered_pair_key};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Build the full, shuffled battle queue for one session.
///
/// Requires `items.len() >= 2`; the engine enforces that precondition.
pub fn build_battle_queue(
    items: &[RankableItem],
    context: &str,
    store: &RatingStore,
    config: &PairingConfig,
) -> Vec<Matchup> {
    let mut rng = rand::rng();

    let mut queue = if items.len() <= config.exhaustive_threshold {
        exhaustive_pairs(items, context)
    } else {
        let mut queue = rating_aware_pairs(items, context, store, config);
        top_up_with_random_pairs(&mut queue, items, context, config, &mut rng);
        queue
    };

    queue.shuffle(&mut rng);

    debug!(
        context,
        items = items.len(),
        matchups = queue.len(),
        "Built battle queue"
    );

    queue
}

/// Every unordered pair exactly once, pair members in original item order
fn exhaustive_pairs(items: &[RankableItem], context: &str) -> Vec<Matchup> {
    let mut queue = Vec::with_capacity(items.len() * (items.len().saturating_sub(1)) / 2);

    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            queue.push(Matchup {
                first: items[i].clone(),
                second: items[j].clone(),
                context: context.to_string(),
            });
        }
    }

    queue
}

/// Rating-aware pass: walk items in rating order and greedily pair each with
/// its closest-rated opponents, subject to the per-item matchup ceiling and
/// the maximum rating spread.
///
/// Ratings are snapshotted once up front; the pass never re-sorts after
/// partial pairing. The hard guarantees are the spread and ceiling bounds,
/// not closeness optimality.
fn rating_aware_pairs(
    items: &[RankableItem],
    context: &str,
    store: &RatingStore,
    config: &PairingConfig,
) -> Vec<Matchup> {
    let target = config.target_battles_per_item;

    let mut rated: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .map(|(index, item)| (index, store.get_rating(context, item).rating))
        .collect();
    rated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut matchups_per_item = vec![0usize; items.len()];
    let mut queue = Vec::new();

    for &(index, rating) in &rated {
        let already = matchups_per_item[index];
        if already >= target {
            continue;
        }

        // Opponents still under their own ceiling and close enough in rating.
        let mut candidates: Vec<(usize, f64)> = rated
            .iter()
            .filter(|&&(other, other_rating)| {
                other != index
                    && matchups_per_item[other] < target
                    && ratings_within_tolerance(other_rating, rating, config.max_rating_spread)
            })
            .map(|&(other, other_rating)| (other, (other_rating - rating).abs()))
            .collect();

        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        for (opponent, _) in candidates.into_iter().take(target - already) {
            queue.push(Matchup {
                first: items[index].clone(),
                second: items[opponent].clone(),
                context: context.to_string(),
            });
            matchups_per_item[index] += 1;
            matchups_per_item[opponent] += 1;
        }
    }

    queue
}

/// Fill the queue with uniformly random distinct pairs until it reaches the
/// coverage target, rejecting pairs already queued (compared unordered).
/// Sampling is attempt-bounded so pathological collections cannot spin.
fn top_up_with_random_pairs<R: Rng>(
    queue: &mut Vec<Matchup>,
    items: &[RankableItem],
    context: &str,
    config: &PairingConfig,
    rng: &mut R,
) {
    let target_len = config.coverage_target(items.len());
    if queue.len() >= target_len {
        return;
    }

    let mut queued: HashSet<(String, String)> = queue
        .iter()
        .map(|m| unordered_pair_key(&m.first.id, &m.second.id))
        .collect();

    let mut attempts = (target_len - queue.len()) * config.top_up_attempt_factor;

    while queue.len() < target_len && attempts > 0 {
        attempts -= 1;

        let first = rng.random_range(0..items.len());
        let second = rng.random_range(0..items.len());
        if first == second {
            continue;
        }

        let key = unordered_pair_key(&items[first].id, &items[second].id);
        if !queued.insert(key) {
            continue;
        }

        queue.push(Matchup {
            first: items[first].clone(),
            second: items[second].clone(),
            context: context.to_string(),
        });
    }
}
