//! `Random` seam: abstracts the three places the planner/filter need
//! nondeterminism so tests can force deterministic outcomes.

use rand::seq::SliceRandom;

/// Random choices needed by the planner (`choose_two`, `choose_page`) and
/// the candidate filter (`choose_index`).
pub trait Random: Send + Sync {
    /// Pick 2 distinct indices into `0..len` uniformly without replacement,
    /// used by the "two random genres" strategy.
    fn choose_two(&self, len: usize) -> (usize, usize);

    /// Pick one page uniformly from `1..=max_page`.
    fn choose_page(&self, max_page: u32) -> u32;

    /// Pick one index uniformly from `0..len`, used to choose uniformly
    /// from the leading sample window of a results page.
    fn choose_index(&self, len: usize) -> usize;
}

/// Production implementation backed by `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl Random for ThreadRandom {
    fn choose_two(&self, len: usize) -> (usize, usize) {
        assert!(len >= 2, "choose_two requires at least 2 items");
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(&mut rand::rng());
        (indices[0], indices[1])
    }

    fn choose_page(&self, max_page: u32) -> u32 {
        rand::random_range(1..=max_page)
    }

    fn choose_index(&self, len: usize) -> usize {
        assert!(len > 0, "choose_index requires at least 1 item");
        rand::random_range(0..len)
    }
}

/// Deterministic test double: returns fixed values regardless of input.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub two: (usize, usize),
    pub page: u32,
    pub index: usize,
}

impl Default for FixedRandom {
    fn default() -> Self {
        Self {
            two: (0, 1),
            page: 1,
            index: 0,
        }
    }
}

impl Random for FixedRandom {
    fn choose_two(&self, _len: usize) -> (usize, usize) {
        self.two
    }

    fn choose_page(&self, _max_page: u32) -> u32 {
        self.page
    }

    fn choose_index(&self, _len: usize) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_choose_two_distinct() {
        let random = ThreadRandom;
        let (a, b) = random.choose_two(5);
        assert_ne!(a, b);
        assert!(a < 5 && b < 5);
    }

    #[test]
    fn test_thread_random_choose_page_in_range() {
        let random = ThreadRandom;
        for _ in 0..20 {
            let page = random.choose_page(5);
            assert!((1..=5).contains(&page));
        }
    }

    #[test]
    fn test_fixed_random_deterministic() {
        let random = FixedRandom::default();
        assert_eq!(random.choose_two(10), (0, 1));
        assert_eq!(random.choose_page(5), 1);
        assert_eq!(random.choose_index(20), 0);
    }
}
