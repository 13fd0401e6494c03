//! Segmentation of contiguous nonce runs ("combo groups").
//!
//! Each account's contiguous nonce run, starting at its lowest tracked
//! nonce, is partitioned into ordered segments of at most
//! [`PoolConfig::seq_max`](super::PoolConfig) transactions. A full segment
//! is immutable until its transactions leave the pool; shorter segments are
//! rebuilt whenever the account's nonce map changes. Nonces beyond a gap
//! stay in the nonce map but are excluded from segmentation until the gap
//! fills.

use super::account::AccountState;
use super::fee_index::FeePriorityIndex;
use chain_types::{Hash, U256};
use tracing::trace;

/// Fee-index membership of a segment.
///
/// `Unindexed -> Indexed` when the fee builder inserts the segment's
/// dependency group; the head key is kept here so the segment can be
/// removed from its bucket without consulting the (possibly already
/// pruned) nonce map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexState {
    /// Not yet in the fee-priority index.
    #[default]
    Unindexed,
    /// In the fee bucket for the segment's average fee, under `head`.
    Indexed {
        /// Head record key of the segment's dependency group.
        head: Hash,
    },
}

/// A maximal contiguous nonce run (or prefix thereof) of one account.
///
/// Segments of one account are disjoint, their start nonces strictly
/// increasing, and together they cover a prefix of the account's
/// contiguous run from its lowest tracked nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// First nonce covered.
    pub start_nonce: U256,
    /// Number of consecutive nonces covered (1..=seq_max).
    pub len: usize,
    /// Average fee over the run (ranking key in the fee index).
    pub avg_fee: U256,
    state: IndexState,
}

impl Segment {
    /// A freshly built, not-yet-indexed segment.
    pub fn new(start_nonce: U256, len: usize, avg_fee: U256) -> Self {
        Self {
            start_nonce,
            len,
            avg_fee,
            state: IndexState::Unindexed,
        }
    }

    /// One past the last covered nonce.
    pub fn end_nonce(&self) -> U256 {
        self.start_nonce + U256::from(self.len)
    }

    /// True once the segment covers `seq_max` nonces.
    pub fn is_full(&self, seq_max: usize) -> bool {
        self.len == seq_max
    }

    /// True if the segment's group sits in the fee-priority index.
    pub fn is_indexed(&self) -> bool {
        matches!(self.state, IndexState::Indexed { .. })
    }

    /// Head key stored at indexing time, if indexed.
    pub fn indexed_head(&self) -> Option<Hash> {
        match self.state {
            IndexState::Indexed { head } => Some(head),
            IndexState::Unindexed => None,
        }
    }

    /// Records fee-index membership under `head`.
    pub fn mark_indexed(&mut self, head: Hash) {
        self.state = IndexState::Indexed { head };
    }
}

/// Reconciles an account's prior segments and rebuilds the rest.
///
/// Step A walks `prior` from the account's lowest tracked nonce: a segment
/// is kept only while it starts exactly at the expected nonce, is full, and
/// none of its nonces were superseded or removed since the last pass. Any
/// of those would leave its indexed group referencing retired record keys.
/// The first non-keep drops that segment and every later one, evicting
/// indexed groups from their fee buckets.
///
/// Step B rebuilds forward from the first un-kept nonce and returns the
/// replacement list: kept segments followed by rebuilt ones. The caller
/// clears the account's dirty tag afterwards.
pub fn resegment(
    account: &AccountState,
    prior: Vec<Segment>,
    fee_index: &mut FeePriorityIndex,
    seq_max: usize,
) -> Vec<Segment> {
    let Some(lowest) = account.first_nonce() else {
        for seg in prior {
            drop_segment(&seg, fee_index);
        }
        return Vec::new();
    };

    let mut kept: Vec<Segment> = Vec::new();
    let mut expected = lowest;
    let mut broken = false;

    for seg in prior {
        if !broken
            && seg.start_nonce == expected
            && seg.is_full(seq_max)
            && !account.range_touched(seg.start_nonce, seg.end_nonce())
        {
            expected = seg.end_nonce();
            kept.push(seg);
        } else {
            broken = true;
            drop_segment(&seg, fee_index);
        }
    }

    trace!(
        kept = kept.len(),
        expected = %expected,
        "segment reconcile done, rebuilding forward"
    );

    kept.extend(build_segments(account, expected, seq_max));
    kept
}

/// Removes a dropped segment's group from its fee bucket, if indexed.
fn drop_segment(seg: &Segment, fee_index: &mut FeePriorityIndex) {
    if let Some(head) = seg.indexed_head() {
        if fee_index.remove_group(&seg.avg_fee, &head).is_none() {
            // Cleanup race: the bucket was already pruned.
            trace!(fee = %seg.avg_fee, "fee bucket already gone for dropped segment");
        }
    }
}

/// Walks the nonce map ascending from `from`, cutting segments.
///
/// A segment grows while fees stay at or above its running floor; a fee
/// below the floor closes the open segment and anchors a new one. A nonce
/// gap ends segmentation entirely. The recorded average is the mean of the
/// floor values applied at each acceptance.
pub fn build_segments(account: &AccountState, from: U256, seq_max: usize) -> Vec<Segment> {
    let mut segments = Vec::new();

    let mut start = from;
    let mut next = from;
    let mut floor = U256::zero();
    let mut sum = U256::zero();
    let mut count = 0usize;

    for (&nonce, &(_, fee)) in account.iter_from(from) {
        if nonce != next {
            // Gap: later nonces stay tracked but unsegmented.
            break;
        }

        if fee >= floor {
            floor = fee;
            sum += floor;
            count += 1;
            next += U256::one();
            if count == seq_max {
                segments.push(Segment::new(start, count, sum / U256::from(count)));
                start = next;
                floor = U256::zero();
                sum = U256::zero();
                count = 0;
            }
        } else {
            // Fee dropped below the floor: close and re-anchor.
            if count > 0 {
                segments.push(Segment::new(start, count, sum / U256::from(count)));
            }
            start = nonce;
            floor = fee;
            sum = fee;
            count = 1;
            next = nonce + U256::one();
        }
    }

    if count > 0 {
        segments.push(Segment::new(start, count, sum / U256::from(count)));
    }

    segments
}
