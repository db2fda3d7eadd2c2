use cosmwasm_schema::cw_serde;

/// Lifecycle of a submission round.
///
/// Only `Finalized` is ever stored; the other two are derived from the
/// current block height and the round's `end_height`.
#[cw_serde]
pub enum RoundStatus {
    /// `height < end_height` and not finalized: submissions accepted.
    Open,
    /// `height >= end_height` and not finalized. A round that never reaches
    /// its feed's `min_submissions` stays here for good.
    AwaitingFinalization,
    Finalized,
}

impl RoundStatus {
    pub fn at_height(height: u64, end_height: u64, is_finalized: bool) -> Self {
        if is_finalized {
            RoundStatus::Finalized
        } else if height < end_height {
            RoundStatus::Open
        } else {
            RoundStatus::AwaitingFinalization
        }
    }
}
