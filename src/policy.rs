//! Move-weighting policies ("distributions") for playouts.
//!
//! A [`Distribution`] assigns every candidate move a non-negative weight
//! and publishes an upper bound on those weights so samplers can use
//! rejection sampling. Weights are relative: only their ratio to
//! [`Distribution::max_weight`] matters.

use crate::board::Board;
use crate::position::{Move, Point};

/// A weighting over the moves of one board position.
pub trait Distribution {
    /// Weight of a move (or pass). Never negative.
    fn weight(&self, mv: Move) -> f64;

    /// Upper bound on [`Distribution::weight`].
    fn max_weight(&self) -> f64;

    /// Board dimensions `(xdim, ydim)` the weights range over.
    fn dims(&self) -> (usize, usize);
}

/// Every move, including pass, weighs 1.0.
#[derive(Debug, Clone, Copy)]
pub struct Uniform {
    xdim: usize,
    ydim: usize,
}

impl Uniform {
    pub fn new(board: &Board) -> Self {
        Self {
            xdim: board.xdim(),
            ydim: board.ydim(),
        }
    }
}

impl Distribution for Uniform {
    fn weight(&self, _mv: Move) -> f64 {
        1.0
    }

    fn max_weight(&self) -> f64 {
        1.0
    }

    fn dims(&self) -> (usize, usize) {
        (self.xdim, self.ydim)
    }
}

/// Weighs sane moves 1.0 and everything else 0.0.
///
/// A move is sane when it passes [`Board::check_fast`] for the player to
/// move and does not fill a point whose four neighbors are all the mover's
/// own stones. Filling such a point is still sane when one of those groups
/// is down to a single liberty. Pass is always sane.
#[derive(Debug, Clone, Copy)]
pub struct Light<'a> {
    board: &'a Board,
}

impl<'a> Light<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    pub fn is_sane(&self, mv: Move) -> bool {
        let player = self.board.player();
        if !self.board.check_fast(mv, player) {
            return false;
        }
        let Move::Play(p) = mv else {
            return true;
        };

        let mut friendly = 0;
        for n in self.board.adjacent(p).into_iter().flatten() {
            if self.board.color(n) == Some(player) {
                if self.board.liberties(n) == Some(1) {
                    return true;
                }
                friendly += 1;
            }
        }
        friendly < 4
    }
}

impl Distribution for Light<'_> {
    fn weight(&self, mv: Move) -> f64 {
        if self.is_sane(mv) { 1.0 } else { 0.0 }
    }

    fn max_weight(&self) -> f64 {
        1.0
    }

    fn dims(&self) -> (usize, usize) {
        (self.board.xdim(), self.board.ydim())
    }
}

/// A snapshot of another distribution with O(1) lookups.
///
/// The snapshot does not follow later changes to the board the source was
/// built from; call [`Cached::rebuild`] after the board changes.
#[derive(Debug, Clone)]
pub struct Cached {
    xdim: usize,
    ydim: usize,
    max: f64,
    pass: f64,
    /// Column-major, same layout as the board arena.
    grid: Vec<f64>,
}

impl Cached {
    pub fn new<D: Distribution + ?Sized>(source: &D) -> Self {
        let mut cached = Self {
            xdim: 0,
            ydim: 0,
            max: 0.0,
            pass: 0.0,
            grid: Vec::new(),
        };
        cached.rebuild(source);
        cached
    }

    /// Recompute every cached weight from `source`.
    pub fn rebuild<D: Distribution + ?Sized>(&mut self, source: &D) {
        let (xdim, ydim) = source.dims();
        self.xdim = xdim;
        self.ydim = ydim;
        self.max = source.max_weight();
        self.pass = source.weight(Move::Pass);
        self.grid.clear();
        self.grid.reserve(xdim * ydim);
        for x in 1..=xdim {
            for y in 1..=ydim {
                self.grid.push(source.weight(Move::at(x, y)));
            }
        }
    }
}

impl Distribution for Cached {
    fn weight(&self, mv: Move) -> f64 {
        match mv {
            Move::Pass => self.pass,
            Move::Play(Point { x, y }) => {
                if x < 1 || y < 1 || x > self.xdim || y > self.ydim {
                    return 0.0;
                }
                self.grid[(x - 1) * self.ydim + (y - 1)]
            }
        }
    }

    fn max_weight(&self) -> f64 {
        self.max
    }

    fn dims(&self) -> (usize, usize) {
        (self.xdim, self.ydim)
    }
}
