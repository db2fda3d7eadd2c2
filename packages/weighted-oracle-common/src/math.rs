use cosmwasm_std::{OverflowError, Uint128, Uint64};

use crate::params::{WEIGHT_REPUTATION_SHARE, WEIGHT_STAKE_SHARE};

/// Compute an oracle's influence weight on a 0..=100 scale.
///
/// `weight = floor(reputation * 60 / max_reputation) + floor(stake * 40 / max_stake)`
///
/// The two terms are truncated independently and then summed. Weights are
/// frozen into submissions and later drive reward shares, so this order is
/// part of the replayable state and must not become a single truncation.
///
/// `max_reputation` and `max_stake` must be non-zero; the contract rejects a
/// config that violates this.
pub fn weight_of(reputation: u64, stake: Uint128, max_reputation: u64, max_stake: Uint128) -> u64 {
    let reputation_term = (reputation as u128) * WEIGHT_REPUTATION_SHARE / (max_reputation as u128);
    let stake_term = stake.multiply_ratio(WEIGHT_STAKE_SHARE, max_stake).u128();
    (reputation_term + stake_term) as u64
}

/// Median of the given values, or `None` for an empty slice.
///
/// Odd count: the middle element after sorting ascending.
/// Even count: `floor((lo + hi) / 2)` of the two central elements, computed
/// as `lo + (hi - lo) / 2` so it cannot overflow.
pub fn median(values: &[Uint128]) -> Option<Uint128> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let lo = sorted[mid - 1];
        let hi = sorted[mid];
        Some(lo + (hi - lo) / Uint128::new(2))
    } else {
        Some(sorted[mid])
    }
}

/// Absolute distance between a submitted value and the consensus value.
#[inline]
pub fn deviation(value: Uint128, consensus: Uint128) -> Uint128 {
    if value >= consensus {
        value - consensus
    } else {
        consensus - value
    }
}

/// Apply one accuracy event to a reputation score.
///
/// Accurate: `+reward`, capped at `max`. Inaccurate: `-decay`, floored at 0.
pub fn next_reputation(current: u64, accurate: bool, reward: u64, decay: u64, max: u64) -> u64 {
    if accurate {
        current.saturating_add(reward).min(max)
    } else {
        current.saturating_sub(decay)
    }
}

/// Requested penalty for an inaccurate submission: `stake * percentage / 100`.
/// The slashing controller still caps the effective amount at the current stake.
#[inline]
pub fn slash_amount(stake: Uint128, percentage: u8) -> Uint128 {
    stake.multiply_ratio(percentage as u128, 100u128)
}

/// Height `blocks` after `height`. Errors instead of wrapping.
pub fn height_after(height: u64, blocks: u64) -> Result<u64, OverflowError> {
    Uint64::new(height)
        .checked_add(Uint64::new(blocks))
        .map(|h| h.u64())
}

/// Split `pool` across recipients pro rata to their weights.
///
/// Each share is `floor(pool * weight / total_weight)`. Returns the non-zero
/// shares and whatever is left undistributed (rounding dust, or the whole
/// pool when no recipient carries weight).
pub fn split_rewards<K: Clone>(pool: Uint128, recipients: &[(K, u64)]) -> (Vec<(K, Uint128)>, Uint128) {
    let total_weight: u128 = recipients.iter().map(|(_, w)| *w as u128).sum();
    if pool.is_zero() || total_weight == 0 {
        return (vec![], pool);
    }

    let mut shares = Vec::with_capacity(recipients.len());
    let mut distributed = Uint128::zero();
    for (key, weight) in recipients {
        let share = pool.multiply_ratio(*weight as u128, total_weight);
        if !share.is_zero() {
            distributed += share;
            shares.push((key.clone(), share));
        }
    }

    (shares, pool - distributed)
}
