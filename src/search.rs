use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::{
    error::{EngineError, EngineResult},
    evaluate::relative_eval,
    game::Game,
    move_sorting::{order_captures, order_moves},
    moves::Move,
    options::SearchOptions,
    transposition_table::{EvictionPolicy, NodeType::*, TranspositionTable},
    types::*,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub beta_cutoffs: u64,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    /// from the point of view of the side to move at the root
    pub score: i32,
    /// deepest fully searched depth, 0 when only the fallback move is known
    pub depth: usize,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// A search session. Owns the transposition table, which is cleared at the
/// start of every [`Search::find_best_move`].
#[derive(Clone, Debug)]
pub struct Search {
    transposition_table: TranspositionTable,
    options: SearchOptions,
    stats: SearchStats,
}

impl Search {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            transposition_table: TranspositionTable::new(options.tt_size_mb, options.eviction),
            options,
            stats: SearchStats::default(),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_tt_size_mb(&mut self, tt_size_mb: usize) {
        self.options.tt_size_mb = tt_size_mb;
        self.transposition_table.set_size(tt_size_mb);
    }

    pub fn set_quiescence_depth(&mut self, depth: i32) {
        self.options.quiescence_depth = depth;
    }

    pub fn set_eviction(&mut self, eviction: EvictionPolicy) {
        self.options.eviction = eviction;
        self.transposition_table.set_eviction(eviction);
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.transposition_table
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// [`Search::find_best_move`] with the configured depth and time budget
    pub fn go(&mut self, game: &mut Game) -> EngineResult<SearchResult> {
        let SearchOptions {
            max_depth,
            time_limit_ms,
            ..
        } = self.options;
        self.find_best_move(game, max_depth, time_limit_ms)
    }

    /// Iterative deepening from depth 1 up to `max_depth`.
    ///
    /// The clock is only looked at before each root move, so a search may run
    /// past `time_limit_ms` by at most one root move's subtree. An unfinished
    /// depth is discarded and the previous depth's answer is returned; if not
    /// even depth 1 finished the first legal move is returned with depth 0.
    pub fn find_best_move(
        &mut self,
        game: &mut Game,
        max_depth: usize,
        time_limit_ms: u64,
    ) -> EngineResult<SearchResult> {
        let start = Instant::now();
        let time_limit = Duration::from_millis(time_limit_ms);
        self.transposition_table.clear();
        self.stats = SearchStats::default();

        let root_moves = game.legal_moves();
        let Some(first_move) = root_moves.first() else {
            return Err(EngineError::NoLegalMoves);
        };
        let root_key = game.fingerprint();

        let mut best_move = first_move.clone();
        let mut best_score = relative_eval(game);
        let mut completed_depth = 0;

        'deepening: for depth in 1..=max_depth {
            let mut moves = root_moves.clone();
            let tt_move = self
                .transposition_table
                .get(root_key)
                .and_then(|entry| entry.best_move.clone());
            order_moves(&mut moves, tt_move.as_ref());

            let mut depth_best: Option<(Move, i32)> = None;
            for mv in &moves {
                if start.elapsed() > time_limit {
                    trace!(
                        "depth {depth} aborted after {} ms",
                        start.elapsed().as_millis()
                    );
                    break 'deepening;
                }

                let score = {
                    let mut child = game.play(mv)?;
                    -self.negamax(&mut child, depth as i32 - 1, MINUS_INF, INF)?
                };

                if depth_best.as_ref().map_or(true, |(_, best)| score > *best) {
                    depth_best = Some((mv.clone(), score));
                }
            }

            let Some((depth_move, depth_score)) = depth_best else {
                break;
            };
            best_move = depth_move;
            best_score = depth_score;
            completed_depth = depth;

            self.transposition_table.store(
                root_key,
                depth as i32,
                best_score,
                Exact,
                Some(best_move.clone()),
            );

            let elapsed = start.elapsed();
            self.report(depth, best_score, &best_move, elapsed);

            // forced mate found, deeper search won't change the answer
            if best_score.abs() > MATE_THRESHOLD {
                break;
            }

            // next depth is expected to cost branching_factor times this one
            let predicted = elapsed.checked_mul(self.options.branching_factor);
            if predicted.map_or(true, |next| next > time_limit.saturating_sub(elapsed)) {
                break;
            }
        }

        if completed_depth == 0 {
            warn!("no depth completed in {time_limit_ms} ms, playing first legal move {best_move}");
        }

        Ok(SearchResult {
            best_move,
            score: best_score,
            depth: completed_depth,
            stats: self.stats,
            elapsed: start.elapsed(),
        })
    }

    fn report(&self, depth: usize, score: i32, best_move: &Move, elapsed: Duration) {
        debug!(
            "depth {depth} score {score} best {best_move} nodes {} qnodes {} tt hits {} tt entries {}",
            self.stats.nodes,
            self.stats.qnodes,
            self.stats.tt_hits,
            self.transposition_table.len(),
        );

        if self.options.output {
            println!(
                "info depth {depth} score {} nodes {} time {} pv {best_move}",
                score_string(score, depth),
                self.stats.nodes + self.stats.qnodes,
                elapsed.as_millis(),
            );
        }
    }

    pub(crate) fn negamax(
        &mut self,
        game: &mut Game,
        depth: i32,
        mut alpha: i32,
        beta: i32,
    ) -> EngineResult<i32> {
        self.stats.nodes += 1;
        let key = game.fingerprint();

        let probe = self.transposition_table.probe(key, depth, alpha, beta);
        if let Some(score) = probe.score {
            self.stats.tt_hits += 1;
            return Ok(score);
        }

        if depth <= 0 {
            return self.quiesce(game, alpha, beta, 0);
        }

        let mut moves = game.legal_moves();
        if moves.is_empty() {
            if game.is_in_check() {
                // mates found with more depth left are nearer, prefer them
                return Ok(-(CHECKMATE_SCORE + depth));
            }
            return Ok(DRAW_SCORE);
        }
        if game.is_draw() {
            return Ok(DRAW_SCORE);
        }

        order_moves(&mut moves, probe.best_move.as_ref());

        let original_alpha = alpha;
        let mut best_score = MINUS_INF;
        let mut best_move = None;
        for mv in moves {
            let score = {
                let mut child = game.play(&mv)?;
                -self.negamax(&mut child, depth - 1, -beta, -alpha)?
            };

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(best_score);
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                break;
            }
        }

        let node_type = if best_score <= original_alpha {
            UpperBound
        } else if best_score >= beta {
            LowerBound
        } else {
            Exact
        };
        self.transposition_table
            .store(key, depth, best_score, node_type, best_move);

        Ok(best_score)
    }

    /// Captures-only search below the horizon, capped at `quiescence_depth`
    /// extra plies
    pub(crate) fn quiesce(
        &mut self,
        game: &mut Game,
        mut alpha: i32,
        beta: i32,
        extra_depth: i32,
    ) -> EngineResult<i32> {
        self.stats.qnodes += 1;

        let stand_pat = relative_eval(game);
        if stand_pat >= beta {
            return Ok(beta);
        }
        alpha = alpha.max(stand_pat);

        if extra_depth >= self.options.quiescence_depth {
            return Ok(alpha);
        }

        let mut captures = game.capture_moves();
        order_captures(&mut captures);

        for mv in &captures {
            let score = {
                let mut child = game.play(mv)?;
                -self.quiesce(&mut child, -beta, -alpha, extra_depth + 1)?
            };

            alpha = alpha.max(score);
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                break;
            }
        }

        Ok(alpha)
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

/// UCI score field: `cp N`, or `mate N` in moves (negative when being mated).
///
/// A mate seen by the evaluator below the horizon scores a flat
/// `CHECKMATE_SCORE` whatever the number of capture plies that led to it, so
/// for those the reported distance counts the main search plies only and can
/// be shorter than the real one.
pub fn score_string(score: i32, depth: usize) -> String {
    if score.abs() > MATE_THRESHOLD {
        // the checkmate score carries the depth that was left when mate was seen
        let plies = (depth as i32 - (score.abs() - CHECKMATE_SCORE)).max(1);
        format!("mate {}", score.signum() * ((plies + 1) / 2))
    } else {
        format!("cp {score}")
    }
}
