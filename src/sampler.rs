//! Move samplers built on a [`Distribution`].
//!
//! Every sampler produces exactly one move (or pass) per call:
//! - [`RandomWeighted`] - rejection sampling, i.i.d. draws proportional to weight
//! - [`Greedy`] - the single heaviest move
//! - [`PrioritySampler`] - an exhaustive, weight-biased ordering of all moves

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fastrand::Rng;

use crate::policy::Distribution;
use crate::position::Move;

/// Something that yields moves.
pub trait MoveSampler {
    fn next_move(&mut self, rng: &mut Rng) -> Move;
}

/// Rejection sampler.
///
/// Proposes a uniformly random point, replaced by a pass with probability
/// `1 / (xdim * ydim)`, and accepts it with probability
/// `weight / max_weight`. There is no retry limit: a distribution that is
/// zero almost everywhere makes this slow, and one that is zero everywhere
/// (pass included) never returns.
#[derive(Debug, Clone)]
pub struct RandomWeighted<D> {
    dist: D,
}

impl<D: Distribution> RandomWeighted<D> {
    pub fn new(dist: D) -> Self {
        Self { dist }
    }
}

impl<D: Distribution> MoveSampler for RandomWeighted<D> {
    fn next_move(&mut self, rng: &mut Rng) -> Move {
        let (xdim, ydim) = self.dist.dims();
        let max = self.dist.max_weight();
        let pass_chance = 1.0 / (xdim * ydim) as f64;

        loop {
            let mut mv = Move::at(rng.usize(1..=xdim), rng.usize(1..=ydim));
            if rng.f64() < pass_chance {
                mv = Move::Pass;
            }

            let weight = self.dist.weight(mv);
            if weight <= 0.0 {
                continue;
            }
            if rng.f64() < weight / max {
                return mv;
            }
        }
    }
}

/// Returns the move with the strictly greatest weight.
///
/// Pass is the starting candidate; points are then scanned column-major and
/// only a strictly heavier point replaces the current best, so ties go to
/// whichever came first.
#[derive(Debug, Clone)]
pub struct Greedy<D> {
    dist: D,
}

impl<D: Distribution> Greedy<D> {
    pub fn new(dist: D) -> Self {
        Self { dist }
    }

    pub fn best(&self) -> Move {
        let (xdim, ydim) = self.dist.dims();
        let mut best = Move::Pass;
        let mut best_weight = self.dist.weight(Move::Pass);
        for x in 1..=xdim {
            for y in 1..=ydim {
                let mv = Move::at(x, y);
                let weight = self.dist.weight(mv);
                if weight > best_weight {
                    best = mv;
                    best_weight = weight;
                }
            }
        }
        best
    }
}

impl<D: Distribution> MoveSampler for Greedy<D> {
    fn next_move(&mut self, _rng: &mut Rng) -> Move {
        self.best()
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    weight: f64,
    tiebreak: u64,
    mv: Move,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Heavier first; among equals, the smaller tie-break first.
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| other.tiebreak.cmp(&self.tiebreak))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Heap-ordered sampler.
///
/// Every move with positive weight is loaded into a max-heap. Each call
/// pops the heaviest move, returns it, and pushes it back at half its
/// weight, so every candidate comes up eventually and heavy moves come up
/// more often. Ties are broken by scan order ([`PrioritySampler::new`]) or
/// by a random value drawn once per move ([`PrioritySampler::randomized`]).
/// With no positive-weight move at all, the sampler passes.
#[derive(Debug, Clone)]
pub struct PrioritySampler {
    heap: BinaryHeap<Entry>,
}

impl PrioritySampler {
    pub fn new<D: Distribution + ?Sized>(dist: &D) -> Self {
        Self::build(dist, |seq| seq as u64)
    }

    pub fn randomized<D: Distribution + ?Sized>(dist: &D, rng: &mut Rng) -> Self {
        Self::build(dist, |_| rng.u64(..))
    }

    fn build<D: Distribution + ?Sized>(dist: &D, mut tiebreak: impl FnMut(usize) -> u64) -> Self {
        let (xdim, ydim) = dist.dims();
        let mut heap = BinaryHeap::with_capacity(xdim * ydim + 1);
        let points = (1..=xdim).flat_map(|x| (1..=ydim).map(move |y| Move::at(x, y)));

        for (seq, mv) in points.chain(std::iter::once(Move::Pass)).enumerate() {
            let weight = dist.weight(mv);
            if weight > 0.0 {
                heap.push(Entry {
                    weight,
                    tiebreak: tiebreak(seq),
                    mv,
                });
            }
        }
        Self { heap }
    }

    /// Number of distinct moves the sampler cycles through.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl MoveSampler for PrioritySampler {
    fn next_move(&mut self, _rng: &mut Rng) -> Move {
        let Some(mut top) = self.heap.pop() else {
            return Move::Pass;
        };
        let mv = top.mv;
        top.weight /= 2.0;
        self.heap.push(top);
        mv
    }
}
