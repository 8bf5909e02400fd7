//! Iterative seed pruning.
//!
//! At step `n` every remaining seed position picks the seed imposing the finest
//! spacing within the step-`n` search radius; seeds nobody picks are dropped.
//! The radius grows with `n`, so local redundancy disappears first and coarse
//! seeds get shadowed by fine ones further away as the steps advance.

use super::{FieldParams, Seed, influence, positions};
use crate::float_types::Real;
use crate::spatial::PointIndex;
use hashbrown::HashSet;

pub(super) fn prune(
    seeds: Vec<Seed>,
    params: &FieldParams,
    stride: usize,
    chunk_size: usize,
    mut progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Vec<Seed> {
    let mut seeds = dedup_rounded(seeds);
    let envelope = params.envelope();
    let last = envelope.step_at_density(params.max_density_simplify);
    let total = last.floor() as usize;

    log::debug!("pruning {} seeds over {} steps", seeds.len(), total);

    let mut step = 1usize;
    while (step as Real) <= last && seeds.len() > 1 {
        let radius = envelope.distance_at_step(step as Real);
        seeds = prune_step(seeds, radius, chunk_size);

        log::trace!("step {}/{}: {} seeds remain", step, total, seeds.len());
        if let Some(observer) = progress.as_mut() {
            observer(step, total);
        }
        step += stride;
    }
    seeds
}

/// One pruning step: every seed position votes for its winning neighbor and
/// only voted-for seeds stay.
fn prune_step(seeds: Vec<Seed>, radius: Real, chunk_size: usize) -> Vec<Seed> {
    let points = positions(&seeds);
    let index = PointIndex::new(&points);

    let mut keep = vec![false; seeds.len()];
    for (winner, _) in influence(&seeds, &index, &points, radius, chunk_size)
        .into_iter()
        .flatten()
    {
        keep[winner] = true;
    }

    seeds
        .into_iter()
        .zip(keep)
        .filter_map(|(seed, kept)| kept.then_some(seed))
        .collect()
}

/// Drops seeds whose position rounds to an integer coordinate already taken.
/// The first occurrence wins and the order is preserved.
fn dedup_rounded(seeds: Vec<Seed>) -> Vec<Seed> {
    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(seeds.len());
    seeds
        .into_iter()
        .filter(|s| seen.insert((s.position[0].round() as i64, s.position[1].round() as i64)))
        .collect()
}
