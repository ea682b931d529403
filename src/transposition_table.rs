use std::{
    collections::{HashMap, VecDeque},
    fmt::Display,
    str::FromStr,
};

use crate::moves::Move;

// budgeted size of one entry; capacity is derived from the memory budget with this
pub const ENTRY_SIZE_BYTES: usize = 32;

// how many of the oldest entries are considered when picking a victim
const EVICTION_WINDOW: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    UpperBound,
    LowerBound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub depth: i32,
    pub score: i32,
    pub node_type: NodeType,
    pub best_move: Option<Move>,
}

/// Outcome of a probe: a score that can be returned as-is, and the stored move
/// whenever an entry exists, even one too shallow to trust
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Probe {
    pub score: Option<i32>,
    pub best_move: Option<Move>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// drop the entry inserted first
    Oldest,
    /// drop the shallowest of the few oldest entries
    #[default]
    ShallowestOfOldest,
}

impl Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Oldest => write!(f, "Oldest"),
            EvictionPolicy::ShallowestOfOldest => write!(f, "ShallowestOfOldest"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    /// Case-insensitive, `-` and `_` are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match name.as_str() {
            "oldest" => Ok(EvictionPolicy::Oldest),
            "shallowestofoldest" => Ok(EvictionPolicy::ShallowestOfOldest),
            _ => Err(format!(
                "unknown eviction policy '{s}', expected Oldest or ShallowestOfOldest"
            )),
        }
    }
}

/// Bounded fingerprint -> search result cache.
///
/// Keys are bare fingerprints, so two positions that hash alike share an entry.
/// That is accepted: a stored move is only ever used after it has been found in
/// the current legal move list.
#[derive(Clone, Debug)]
pub struct TranspositionTable {
    table: HashMap<u64, TTEntry>,
    insertion_order: VecDeque<u64>,
    capacity: usize,
    eviction: EvictionPolicy,
}

impl TranspositionTable {
    pub fn new(size_mb: usize, eviction: EvictionPolicy) -> Self {
        Self::with_capacity(Self::capacity_for(size_mb), eviction)
    }

    pub fn with_capacity(capacity: usize, eviction: EvictionPolicy) -> Self {
        Self {
            table: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
            eviction,
        }
    }

    fn capacity_for(size_mb: usize) -> usize {
        size_mb * 1024 * 1024 / ENTRY_SIZE_BYTES
    }

    pub fn set_size(&mut self, size_mb: usize) {
        self.capacity = Self::capacity_for(size_mb).max(1);
        self.clear();
    }

    pub fn set_eviction(&mut self, eviction: EvictionPolicy) {
        self.eviction = eviction;
    }

    pub fn eviction(&self) -> EvictionPolicy {
        self.eviction
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.insertion_order.clear();
    }

    pub fn get(&self, key: u64) -> Option<&TTEntry> {
        self.table.get(&key)
    }

    pub fn probe(&self, key: u64, depth: i32, alpha: i32, beta: i32) -> Probe {
        let Some(entry) = self.table.get(&key) else {
            return Probe::default();
        };
        let best_move = entry.best_move.clone();

        // a shallower search is only good for move ordering
        if entry.depth < depth {
            return Probe {
                score: None,
                best_move,
            };
        }

        let score = match entry.node_type {
            NodeType::Exact => Some(entry.score),
            NodeType::UpperBound if entry.score <= alpha => Some(alpha),
            NodeType::LowerBound if entry.score >= beta => Some(beta),
            _ => None,
        };

        Probe { score, best_move }
    }

    pub fn store(
        &mut self,
        key: u64,
        depth: i32,
        score: i32,
        node_type: NodeType,
        best_move: Option<Move>,
    ) {
        let entry = TTEntry {
            depth,
            score,
            node_type,
            best_move,
        };

        match self.table.get_mut(&key) {
            Some(existing) => {
                // depth-preferred replacement
                if existing.depth > depth {
                    return;
                }
                *existing = entry;
            }
            None => {
                self.table.insert(key, entry);
                self.insertion_order.push_back(key);
            }
        }

        if self.table.len() > self.capacity {
            self.evict();
        }
    }

    fn evict(&mut self) {
        let victim = match self.eviction {
            EvictionPolicy::Oldest => 0,
            EvictionPolicy::ShallowestOfOldest => {
                // the newest key sits at the back and is never a candidate
                let window = (self.insertion_order.len() - 1).clamp(1, EVICTION_WINDOW);
                self.insertion_order
                    .iter()
                    .take(window)
                    .enumerate()
                    .min_by_key(|(_, &key)| self.table.get(&key).map_or(i32::MIN, |e| e.depth))
                    .map_or(0, |(index, _)| index)
            }
        };

        if let Some(key) = self.insertion_order.remove(victim) {
            self.table.remove(&key);
        }
    }
}
