//! Karger and Karger-Stein randomized global minimum cut.
//!
//! A trial contracts randomly chosen edges of a shared read-only graph until
//! only a few super-nodes remain; the edges still crossing between groups are
//! a cut of the original graph. Contraction is logical: each trial carries a
//! label per node plus the member list of every group representative, merged
//! union-by-size, while the graph itself is never touched. The Karger-Stein
//! recursion contracts to `order / sqrt(2) + 1` twice independently and keeps
//! the lighter of the two recursive results, which preserves the true
//! minimum cut with much higher probability than contracting straight to 2.
//!
//! All drivers take an explicit seed; a trial, a recursion branch, and a
//! pool worker each own a generator split from it, so results for a given
//! seed are reproducible and concurrent trials share no hidden state.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::graphlib::{Edge, Undirected};
use crate::select::Selector;

/// Below this residual order a trial contracts straight to 2 instead of
/// recursing; the cut-survival probability in this regime is high enough
/// that further branching buys nothing.
const BRUTE_FORCE_ORDER: usize = 6;

/// One contracted group: the representative label for the node at this
/// slot, plus (when the slot is itself the representative of a materialized
/// group) the ids of every original node merged into it.
#[derive(Debug, Clone, Default)]
struct SuperNode {
    label: usize,
    nodes: Vec<usize>,
}

/// Per-trial contraction state over a shared read-only graph.
struct Karger<'a> {
    g: &'a Undirected,
    order: usize,
    ind: Vec<SuperNode>,
    sel: Selector,
    rng: StdRng,
}

impl<'a> Karger<'a> {
    fn new(g: &'a Undirected, rng: StdRng) -> Self {
        Self {
            g,
            order: g.order(),
            ind: vec![SuperNode::default(); g.next_node_id()],
            sel: Selector::default(),
            rng,
        }
    }

    /// Resets every node to a singleton group and reseeds the selector from
    /// the current edge set. Called before every top-level trial.
    fn init(&mut self) {
        self.order = self.g.order();
        for (i, s) in self.ind.iter_mut().enumerate() {
            s.label = i;
            s.nodes.clear();
        }
        self.sel = self.g.edges().map(|e| (e.id(), e.weight())).collect();
        self.sel.init();
    }

    /// Whether both endpoints already share a label, making the edge
    /// internal to one super-node.
    fn is_loop(&self, e: &Edge) -> bool {
        self.ind[e.head()].label == self.ind[e.tail()].label
    }

    /// Contracts randomly selected edges until `target` super-nodes remain
    /// or the selector runs dry (the graph was already disconnected; the
    /// remaining cut stands as-is). Selected self-loops are discarded; the
    /// selector never hands them back, so the discard loop terminates.
    fn contract(&mut self, target: usize) {
        while self.order > target {
            let Ok(eid) = self.sel.select(&mut self.rng) else {
                break;
            };

            let e = self.g.edge(eid).expect("selector entries refer to live edges");
            if self.is_loop(e) {
                continue;
            }

            let (mut hid, mut tid) = (e.head(), e.tail());
            let (mut hl, mut tl) = (self.ind[hid].label, self.ind[tid].label);
            // Union by size: absorb the smaller member list into the larger.
            if self.ind[hl].nodes.len() < self.ind[tl].nodes.len() {
                std::mem::swap(&mut hid, &mut tid);
                std::mem::swap(&mut hl, &mut tl);
            }

            if self.ind[hl].nodes.is_empty() {
                self.ind[hl].nodes.push(hid);
            }
            if self.ind[tl].nodes.is_empty() {
                self.ind[tid].label = hl;
                self.ind[hl].nodes.push(tid);
            } else {
                let moved = std::mem::take(&mut self.ind[tl].nodes);
                for &m in &moved {
                    self.ind[m].label = hl;
                }
                self.ind[hl].nodes.extend(moved);
            }

            self.order -= 1;
        }
    }

    /// Contracts down to `target` groups and collects the edges not internal
    /// to a single group: the cut and its total weight.
    fn compact(&mut self, target: usize) -> (Vec<usize>, f64) {
        self.contract(target);

        let mut cut = Vec::new();
        let mut w = 0.0;
        for e in self.g.edges() {
            if self.is_loop(e) {
                continue;
            }
            cut.push(e.id());
            w += e.weight();
        }
        (cut, w)
    }

    /// A second trial state continuing from this one: same graph, deep
    /// copies of partition and selector, and a generator split off this
    /// trial's stream so the two halves draw independent randomness.
    fn branch(&mut self) -> Karger<'a> {
        let seed = self.rng.next_u64();
        Karger {
            g: self.g,
            order: self.order,
            ind: self.ind.clone(),
            sel: self.sel.clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn fast_min_cut(&mut self) -> (Vec<usize>, f64) {
        if self.order <= BRUTE_FORCE_ORDER {
            return self.compact(2);
        }

        let target = (self.order as f64 / std::f64::consts::SQRT_2 + 1.0).ceil() as usize;

        let mut half = self.branch();
        self.contract(target);
        let a = self.fast_min_cut();
        half.contract(target);
        let b = half.fast_min_cut();
        if b.1 < a.1 { b } else { a }
    }

    /// Same recursion as [`fast_min_cut`](Karger::fast_min_cut), with the
    /// two halves of a branch point running as a joined task pair while
    /// `depth < split`; past the budget the recursion stays on the calling
    /// thread.
    fn fast_min_cut_split(&mut self, depth: usize, split: usize) -> (Vec<usize>, f64) {
        if self.order <= BRUTE_FORCE_ORDER {
            return self.compact(2);
        }

        let target = (self.order as f64 / std::f64::consts::SQRT_2 + 1.0).ceil() as usize;

        let mut half = self.branch();
        let (a, b) = if depth < split {
            rayon::join(
                || {
                    self.contract(target);
                    self.fast_min_cut_split(depth + 1, split)
                },
                || {
                    half.contract(target);
                    half.fast_min_cut_split(depth + 1, split)
                },
            )
        } else {
            self.contract(target);
            let a = self.fast_min_cut_split(depth + 1, split);
            half.contract(target);
            let b = half.fast_min_cut_split(depth + 1, split);
            (a, b)
        };
        if b.1 < a.1 { b } else { a }
    }
}

/// Estimates the global minimum cut of `g` with `iter` independent
/// contraction trials, returning the lightest cut found as edge ids plus
/// its total weight (`f64::INFINITY` when `iter == 0`). The graph is not
/// mutated; equal seeds give equal results.
pub fn rand_min_cut(g: &Undirected, iter: usize, seed: u64) -> (Vec<usize>, f64) {
    let mut ka = Karger::new(g, StdRng::seed_from_u64(seed));
    let mut best = (Vec::new(), f64::INFINITY);
    for trial in 0..iter {
        ka.init();
        let (c, w) = ka.compact(2);
        if w < best.1 {
            debug!(trial, weight = w, "new lightest cut");
            best = (c, w);
        }
    }
    best
}

/// [`rand_min_cut`] with an early stop: remaining trials are skipped once
/// the best weight reaches `target` or less. The check runs between trials;
/// a trial always completes once started.
pub fn rand_min_cut_with_target(
    g: &Undirected,
    iter: usize,
    target: f64,
    seed: u64,
) -> (Vec<usize>, f64) {
    let mut ka = Karger::new(g, StdRng::seed_from_u64(seed));
    let mut best = (Vec::new(), f64::INFINITY);
    for trial in 0..iter {
        ka.init();
        let (c, w) = ka.compact(2);
        if w < best.1 {
            debug!(trial, weight = w, "new lightest cut");
            best = (c, w);
        }
        if best.1 <= target {
            break;
        }
    }
    best
}

/// Estimates the global minimum cut with `iter` runs of the Karger-Stein
/// recursion, each starting from a fresh partition and selector. Far fewer
/// runs are needed than with [`rand_min_cut`] for the same confidence.
pub fn fast_min_cut(g: &Undirected, iter: usize, seed: u64) -> (Vec<usize>, f64) {
    let mut ka = Karger::new(g, StdRng::seed_from_u64(seed));
    let mut best = (Vec::new(), f64::INFINITY);
    for trial in 0..iter {
        ka.init();
        let (c, w) = ka.fast_min_cut();
        if w < best.1 {
            debug!(trial, weight = w, "new lightest cut");
            best = (c, w);
        }
    }
    best
}

/// [`fast_min_cut`] with an early stop: remaining runs are skipped once the
/// best weight reaches `target` or less. The check runs between runs; a run
/// always completes once started.
pub fn fast_min_cut_with_target(
    g: &Undirected,
    iter: usize,
    target: f64,
    seed: u64,
) -> (Vec<usize>, f64) {
    let mut ka = Karger::new(g, StdRng::seed_from_u64(seed));
    let mut best = (Vec::new(), f64::INFINITY);
    for trial in 0..iter {
        ka.init();
        let (c, w) = ka.fast_min_cut();
        if w < best.1 {
            debug!(trial, weight = w, "new lightest cut");
            best = (c, w);
        }
        if best.1 <= target {
            break;
        }
    }
    best
}

/// [`fast_min_cut`] with the recursion tree parallelized: each branch point
/// within the first `log2(threads)` levels runs its two halves as a joined
/// task pair, after which recursion continues sequentially.
pub fn fast_min_cut_par(g: &Undirected, iter: usize, threads: usize, seed: u64) -> (Vec<usize>, f64) {
    let split = bits(threads);
    let mut ka = Karger::new(g, StdRng::seed_from_u64(seed));
    let mut best = (Vec::new(), f64::INFINITY);
    for trial in 0..iter {
        ka.init();
        let (c, w) = ka.fast_min_cut_split(0, split);
        if w < best.1 {
            debug!(trial, weight = w, "new lightest cut");
            best = (c, w);
        }
    }
    best
}

/// [`fast_min_cut`] with the iteration count sharded across a pool of
/// `workers` independent workers (capped by `iter`), each running the
/// sequential recursion with its own generator. Workers' local bests reduce
/// by minimum weight; ordering among workers is irrelevant to the result.
pub fn fast_min_cut_sharded(
    g: &Undirected,
    iter: usize,
    workers: usize,
    seed: u64,
) -> (Vec<usize>, f64) {
    let workers = workers.clamp(1, iter.max(1));
    let results: Vec<(Vec<usize>, f64)> = (0..workers)
        .into_par_iter()
        .map(|j| {
            let share = iter / workers + usize::from(j < iter % workers);
            let mut ka = Karger::new(g, StdRng::seed_from_u64(worker_seed(seed, j)));
            let mut best = (Vec::new(), f64::INFINITY);
            for _ in 0..share {
                ka.init();
                let (c, w) = ka.fast_min_cut();
                if w < best.1 {
                    best = (c, w);
                }
            }
            best
        })
        .collect();

    results
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((Vec::new(), f64::INFINITY))
}

/// Floor of log2, clamped to zero: the recursion depth down to which a
/// thread budget of `n` supports spawning both halves of a branch point.
fn bits(mut n: usize) -> usize {
    let mut b = 0;
    while n > 1 {
        n >>= 1;
        b += 1;
    }
    b
}

fn worker_seed(seed: u64, worker: usize) -> u64 {
    seed ^ (worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
