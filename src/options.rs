use crate::transposition_table::EvictionPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub tt_size_mb: usize,
    pub max_depth: usize,
    pub time_limit_ms: u64,
    pub quiescence_depth: i32,
    pub branching_factor: u32,
    pub eviction: EvictionPolicy,
    pub output: bool,
}

pub const TT_SIZE_MB: usize = 64;
pub const MAX_DEPTH: usize = 6;
pub const TIME_LIMIT_MS: u64 = 15_000;
pub const QUIESCENCE_DEPTH: i32 = 6;
// assumed cost ratio between one depth and the next
pub const BRANCHING_FACTOR: u32 = 5;

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            tt_size_mb: TT_SIZE_MB,
            max_depth: MAX_DEPTH,
            time_limit_ms: TIME_LIMIT_MS,
            quiescence_depth: QUIESCENCE_DEPTH,
            branching_factor: BRANCHING_FACTOR,
            eviction: EvictionPolicy::default(),
            output: false,
        }
    }
}

impl SearchOptions {
    pub fn tt_size_mb(mut self, tt_size_mb: usize) -> Self {
        self.tt_size_mb = tt_size_mb;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    pub fn branching_factor(mut self, factor: u32) -> Self {
        self.branching_factor = factor;
        self
    }

    pub fn quiescence_depth(mut self, depth: i32) -> Self {
        self.quiescence_depth = depth;
        self
    }

    pub fn eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn output(mut self, output: bool) -> Self {
        self.output = output;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let options = SearchOptions::default()
            .tt_size_mb(8)
            .quiescence_depth(0)
            .eviction(EvictionPolicy::Oldest)
            .output(true);

        assert_eq!(options.tt_size_mb, 8);
        assert_eq!(options.quiescence_depth, 0);
        assert_eq!(options.eviction, EvictionPolicy::Oldest);
        assert!(options.output);
        assert_eq!(options.max_depth, MAX_DEPTH);
        assert_eq!(options.time_limit_ms, TIME_LIMIT_MS);
    }
}
