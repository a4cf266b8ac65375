//! Range-server membership (C3): deciding, for a given `server_factor` and
//! `num_ranks`, which ranks serve an index and what dense `rangesrv_num`
//! each gets.

use rustc_hash::FxHashMap;

use rangekv_core::{Rank, RangeSrvNum};

/// Mapping from rank to `{rank, rangesrv_num}` for one index's range
/// servers, plus the derived `num_rangesrvs` and `master_rank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeServerMap {
    by_rank: FxHashMap<Rank, RangeSrvNum>,
    num_rangesrvs: u32,
    master_rank: Rank,
}

impl RangeServerMap {
    /// Single-server map for a local index: the creating rank is its sole
    /// server with `rangesrv_num = 1`.
    pub fn local(creating_rank: Rank) -> Self {
        let mut by_rank = FxHashMap::default();
        by_rank.insert(creating_rank, 1);
        RangeServerMap {
            by_rank,
            num_rangesrvs: 1,
            master_rank: creating_rank,
        }
    }

    /// `true` if `rank` is a range server of this index.
    pub fn is_server(&self, rank: Rank) -> bool {
        self.by_rank.contains_key(&rank)
    }

    /// The server's dense `rangesrv_num`, if `rank` is a server.
    pub fn rangesrv_num(&self, rank: Rank) -> Option<RangeSrvNum> {
        self.by_rank.get(&rank).copied()
    }

    /// Number of range servers for this index. Equals `|RangeServerMap|`
    /// (P2).
    pub fn num_rangesrvs(&self) -> u32 {
        self.num_rangesrvs
    }

    /// The range server with the largest rank among this index's servers;
    /// it alone owns the manifest (invariant 3).
    pub fn master_rank(&self) -> Rank {
        self.master_rank
    }

    /// Iterate `(rank, rangesrv_num)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, RangeSrvNum)> + '_ {
        self.by_rank.iter().map(|(&r, &n)| (r, n))
    }
}

/// Compute the [`RangeServerMap`] for a remote (primary/secondary) index
/// given `server_factor` and `num_ranks` (§4.3).
pub fn compute_membership(server_factor: u32, num_ranks: u32) -> RangeServerMap {
    assert!(server_factor > 0, "server_factor must be positive");
    assert!(num_ranks > 0, "num_ranks must be positive");

    if num_ranks - 1 < server_factor {
        let sole = num_ranks - 1;
        let mut by_rank = FxHashMap::default();
        by_rank.insert(sole, 1);
        return RangeServerMap {
            by_rank,
            num_rangesrvs: 1,
            master_rank: sole,
        };
    }

    let mut by_rank = FxHashMap::default();
    let mut master_rank = 0;
    for r in 0..num_ranks {
        if r % server_factor == 0 {
            let rangesrv_num = r / server_factor + 1;
            by_rank.insert(r, rangesrv_num);
            master_rank = r;
        }
    }
    let num_rangesrvs = by_rank.len() as u32;

    // Defensive clamp (see module docs on the source's rank/factor+1
    // formula): a rank whose computed number would exceed num_rangesrvs is
    // never a server. With the `r % server_factor == 0` construction above
    // this can't actually happen, but callers that recompute a single
    // rank's number directly (rather than scanning) must apply it.
    by_rank.retain(|_, num| *num <= num_rangesrvs);

    RangeServerMap {
        by_rank,
        num_rangesrvs,
        master_rank,
    }
}

/// Recompute a single rank's membership directly, applying the defensive
/// clamp described in the source: `rangesrv_num = rank / server_factor + 1`,
/// and the rank is a server only if that number does not exceed
/// `num_rangesrvs`. Exposed so callers that already know `num_rangesrvs`
/// (e.g. from a manifest) can test one rank without building the whole map.
pub fn is_server_clamped(rank: Rank, server_factor: u32, num_rangesrvs: u32) -> Option<RangeSrvNum> {
    if server_factor == 0 {
        return None;
    }
    if rank % server_factor != 0 {
        return None;
    }
    let num = rank / server_factor + 1;
    if num <= num_rangesrvs {
        Some(num)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f_equals_1_makes_every_rank_a_server() {
        let map = compute_membership(1, 4);
        assert_eq!(map.num_rangesrvs(), 4);
        for r in 0..4 {
            assert!(map.is_server(r));
        }
        assert_eq!(map.master_rank(), 3);
    }

    #[test]
    fn n_equals_1_makes_rank_0_sole_server_regardless_of_factor() {
        for f in [1, 2, 100] {
            let map = compute_membership(f, 1);
            assert_eq!(map.num_rangesrvs(), 1);
            assert!(map.is_server(0));
            assert_eq!(map.rangesrv_num(0), Some(1));
            assert_eq!(map.master_rank(), 0);
        }
    }

    #[test]
    fn four_ranks_factor_two_scenario() {
        // S3: num_rangesrvs = 2 (ranks 0 and 2), master = rank 2.
        let map = compute_membership(2, 4);
        assert_eq!(map.num_rangesrvs(), 2);
        assert!(map.is_server(0));
        assert!(!map.is_server(1));
        assert!(map.is_server(2));
        assert!(!map.is_server(3));
        assert_eq!(map.rangesrv_num(0), Some(1));
        assert_eq!(map.rangesrv_num(2), Some(2));
        assert_eq!(map.master_rank(), 2);
    }

    #[test]
    fn num_ranks_less_than_factor_yields_single_last_rank_server() {
        let map = compute_membership(8, 3);
        assert_eq!(map.num_rangesrvs(), 1);
        assert!(map.is_server(2));
        assert_eq!(map.rangesrv_num(2), Some(1));
        assert_eq!(map.master_rank(), 2);
    }

    #[test]
    fn rangesrv_num_is_dense_from_one() {
        let map = compute_membership(3, 10);
        let mut nums: Vec<_> = map.iter().map(|(_, n)| n).collect();
        nums.sort();
        let expected: Vec<u32> = (1..=nums.len() as u32).collect();
        assert_eq!(nums, expected);
    }

    #[test]
    fn local_index_creator_is_sole_server() {
        let map = RangeServerMap::local(5);
        assert!(map.is_server(5));
        assert_eq!(map.rangesrv_num(5), Some(1));
        assert_eq!(map.num_rangesrvs(), 1);
        assert_eq!(map.master_rank(), 5);
    }

    #[test]
    fn is_server_clamped_matches_compute_membership() {
        let map = compute_membership(3, 10);
        for r in 0..10 {
            assert_eq!(
                is_server_clamped(r, 3, map.num_rangesrvs()),
                map.rangesrv_num(r)
            );
        }
    }
}
