//! UCT search tree.
//!
//! The tree is grown one node per iteration. Each iteration descends from
//! the root with [`Tree::select_for_expansion`], expands the first untried
//! move it meets into a new node, evaluates that node with a single playout,
//! and propagates the result back up to the root.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by
//! [`NodeId`]. Every node keeps one [`Slot`] per candidate move, pass
//! included, indexed the same way as [`Board::move_index`].
//!
//! Win counters are kept from the point of view of the node's own player to
//! move. A parent therefore likes children whose counters look bad: the
//! parent's mover wins exactly when the child's mover loses.

use fastrand::Rng;

use crate::board::{Board, Color};
use crate::constants::{
    DEFAULT_ITERATIONS, EXPLORATION, PASS_BASELINE, PRIOR_PLAYS, PRIOR_WINS, REPORT_PERIOD,
};
use crate::playout::{PlayoutPolicy, PolicyKind, playout_winner};
use crate::position::Move;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// The root is always the first node.
pub const ROOT: NodeId = 0;

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Iterations (one playout each) per [`Tree::search`].
    pub iterations: usize,
    /// Exploration constant `c` in [`Tree::confidence_bound`].
    pub exploration: f64,
    /// Seed for the search's random number generator. `None` seeds from
    /// the system.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            exploration: EXPLORATION,
            seed: None,
        }
    }
}

/// What a node knows about one candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Never selected.
    Untried,
    /// Expanded into a child node.
    Child(NodeId),
    /// Rejected by the fast legality check; never selected again.
    Illegal,
}

/// A search tree node.
#[derive(Debug, Clone)]
pub struct Node {
    board: Board,
    wins: u32,
    plays: u32,
    parent: Option<NodeId>,
    slots: Vec<Slot>,
}

impl Node {
    fn new(board: Board, parent: Option<NodeId>) -> Self {
        let slots = vec![Slot::Untried; board.area() + 1];
        Self {
            board,
            wins: PRIOR_WINS,
            plays: PRIOR_PLAYS,
            parent,
            slots,
        }
    }

    /// Position at this node.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move at this node; the one `wins` are counted for.
    pub fn player(&self) -> Color {
        self.board.player()
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn plays(&self) -> u32 {
        self.plays
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn winrate(&self) -> f64 {
        self.wins as f64 / self.plays as f64
    }

    /// Slot for a move, or `None` if the move is not on this board.
    pub fn slot(&self, mv: Move) -> Option<Slot> {
        self.board.move_index(mv).map(|i| self.slots[i])
    }

    /// Expanded moves and their child nodes.
    pub fn children(&self) -> impl Iterator<Item = (Move, NodeId)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Child(child) => Some((self.board.move_at(i), *child)),
            _ => None,
        })
    }
}

/// A UCT search tree rooted at one position.
///
/// A tree serves one decision: build it for the position to move from,
/// call [`Tree::search`], and throw it away once the move is played.
pub struct Tree<P = PolicyKind> {
    nodes: Vec<Node>,
    config: SearchConfig,
    policy: P,
    rng: Rng,
}

impl Tree {
    /// Create a tree using the default light playout policy.
    pub fn new(board: Board, config: SearchConfig) -> Self {
        Self::with_policy(board, config, PolicyKind::default())
    }
}

impl<P: PlayoutPolicy> Tree<P> {
    pub fn with_policy(board: Board, config: SearchConfig, policy: P) -> Self {
        let rng = config.seed.map_or_else(Rng::new, Rng::with_seed);
        Self {
            nodes: vec![Node::new(board, None)],
            config,
            policy,
            rng,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of nodes grown so far, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Bounds and selection
    // =========================================================================

    /// Win rate of a node widened by its exploration term.
    ///
    /// `wins/plays ± c * sqrt(ln(parent_plays + 1) / area) * sqrt(1/plays)`,
    /// where `parent_plays` is the node's own play count at the root.
    pub fn confidence_bound(&self, id: NodeId, upper: bool) -> f64 {
        let node = &self.nodes[id];
        let rate = node.winrate();
        let spread = self.exploration_term(id);
        if upper { rate + spread } else { rate - spread }
    }

    fn exploration_term(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        let parent_plays = node.parent.map_or(node.plays, |p| self.nodes[p].plays) as f64;
        let area = node.board.area() as f64;
        self.config.exploration
            * ((parent_plays + 1.0).ln() / area).sqrt()
            * (1.0 / node.plays as f64).sqrt()
    }

    /// Move to follow or expand next from `id`.
    ///
    /// Untried moves come first, picked uniformly at random. Once none are
    /// left, the child with the smallest lower bound wins, which is the
    /// child whose mover looks weakest and so the best reply for `id`'s
    /// mover. Illegal slots are never chosen.
    pub fn select_for_expansion(&mut self, id: NodeId) -> Move {
        let slot = self.pick_slot(id);
        self.nodes[id].board.move_at(slot)
    }

    fn pick_slot(&mut self, id: NodeId) -> usize {
        let node = &self.nodes[id];
        let untried = node.slots.iter().filter(|s| **s == Slot::Untried).count();
        if untried > 0 {
            let pick = self.rng.usize(..untried);
            if let Some((i, _)) = node
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| **s == Slot::Untried)
                .nth(pick)
            {
                return i;
            }
        }

        node.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Child(child) => Some((i, self.confidence_bound(*child, false))),
                _ => None,
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(node.board.area(), |(i, _)| i)
    }

    /// Move to actually play from `id` once searching is done.
    ///
    /// Only expanded children whose move passes the strict (ko-aware) check
    /// on `id`'s board are considered. Each is scored by the upper bound of
    /// `id`'s mover, `1 - lcb(child)`, and must beat [`PASS_BASELINE`];
    /// otherwise the answer is pass.
    pub fn select_for_play(&self, id: NodeId) -> Move {
        let node = &self.nodes[id];
        let player = node.player();
        let mut best = Move::Pass;
        let mut best_score = PASS_BASELINE;

        for (mv, child) in node.children() {
            if node.board.check(mv, player).is_err() {
                continue;
            }
            let score = 1.0 - self.confidence_bound(child, false);
            if score > best_score {
                best = mv;
                best_score = score;
            }
        }
        best
    }

    /// Expanded move with the best observed win rate for `id`'s mover.
    pub fn best_rate(&self, id: NodeId) -> Option<(Move, f64)> {
        self.nodes[id]
            .children()
            .map(|(mv, child)| (mv, 1.0 - self.nodes[child].winrate()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    // =========================================================================
    // Growth
    // =========================================================================

    /// Grow the tree by one node and evaluate it with one playout.
    ///
    /// Returns the winner of that playout.
    pub fn run_one_iteration(&mut self) -> Color {
        let mut id = ROOT;
        let leaf = loop {
            let slot = self.pick_slot(id);
            match self.nodes[id].slots[slot] {
                Slot::Child(child) => id = child,
                Slot::Illegal => unreachable!("illegal slots are never picked"),
                Slot::Untried => {
                    let node = &self.nodes[id];
                    let mv = node.board.move_at(slot);
                    let player = node.player();
                    if !node.board.check_fast(mv, player) {
                        log::trace!("node {id}: {mv} is illegal for {player}");
                        self.nodes[id].slots[slot] = Slot::Illegal;
                        continue;
                    }

                    let mut board = node.board.clone();
                    board.place_unchecked(mv, player);
                    board.set_player(-player);

                    let child = self.nodes.len();
                    self.nodes.push(Node::new(board, Some(id)));
                    self.nodes[id].slots[slot] = Slot::Child(child);
                    break child;
                }
            }
        };

        let winner = playout_winner(&self.nodes[leaf].board, &mut self.policy, &mut self.rng);
        self.backpropagate(leaf, winner);
        winner
    }

    fn backpropagate(&mut self, leaf: NodeId, winner: Color) {
        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            node.plays += 1;
            if node.player() == winner {
                node.wins += 1;
            }
            cursor = node.parent;
        }
    }

    /// Run the configured number of iterations and pick a move for the root.
    pub fn search(&mut self) -> Move {
        for i in 1..=self.config.iterations {
            self.run_one_iteration();
            if i % REPORT_PERIOD == 0 {
                let best = self.best_rate(ROOT);
                log::debug!(
                    "{i} iterations, {} nodes, best {}",
                    self.nodes.len(),
                    best.map_or_else(|| "-".to_string(), |(mv, r)| format!("{mv} {r:.3}")),
                );
            }
        }

        self.dump_children(ROOT);
        self.select_for_play(ROOT)
    }

    /// Log per-child statistics of a node at debug level.
    pub fn dump_children(&self, id: NodeId) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for (mv, child) in self.nodes[id].children() {
            let node = &self.nodes[child];
            log::debug!(
                "move {mv}: plays {} wins {} rate {:.3} CI [{:.3}, {:.3}]",
                node.plays,
                node.wins,
                node.winrate(),
                self.confidence_bound(child, false),
                self.confidence_bound(child, true),
            );
        }
    }
}
