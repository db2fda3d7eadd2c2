use cosmwasm_std::{
    coins, Addr, BankMsg, DepsMut, Env, Event, MessageInfo, Order, Response, StdResult, Uint128,
};
use weighted_oracle_common::math::{deviation, height_after, median, slash_amount};

use crate::error::ContractError;
use crate::feeds::load_feed;
use crate::registry::load_oracle;
use crate::reputation::update_reputation;
use crate::rounds::round_not_active;
use crate::slashing::{distribute_slashed, slash};
use crate::state::{
    LatestValue, Submission, CONFIG, LATEST_VALUES, PERFORMANCE, ROUNDS, SUBMISSIONS,
    SUBSCRIBER_COUNT, UNSETTLED,
};

/// Finalize a closed round. Anyone can call.
///
/// The consensus value is the plain median of every submitted value. Each
/// submission's deviation from it is stored; deviations above the feed's
/// threshold are inaccurate. Every participant gets a reputation update and
/// a performance update; inaccurate ones are also slashed by
/// `slash_percentage` of their current stake. `reward_percentage` of the
/// round's slashed stake is credited to the accurate participants by frozen
/// weight and the rest is sent to the treasury.
///
/// A round finalizes exactly once; later calls fail with `RoundNotActive`.
pub fn finalize(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    feed_id: u64,
    round_number: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let height = env.block.height;

    let feed = load_feed(deps.storage, feed_id)?;
    let mut round = ROUNDS
        .may_load(deps.storage, (feed_id, round_number))?
        .ok_or_else(|| round_not_active(feed_id, round_number, "round not found"))?;
    if round.is_finalized {
        return Err(round_not_active(
            feed_id,
            round_number,
            "round already finalized",
        ));
    }
    if height < round.end_height {
        return Err(round_not_active(
            feed_id,
            round_number,
            "submission window still open",
        ));
    }
    if round.submission_count < feed.min_submissions {
        return Err(ContractError::BelowThreshold {
            reason: format!(
                "round has {} submissions, feed requires {}",
                round.submission_count, feed.min_submissions
            ),
        });
    }

    let submissions: Vec<(Addr, Submission)> = SUBMISSIONS
        .prefix((feed_id, round_number))
        .range(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;

    let values: Vec<Uint128> = submissions.iter().map(|(_, s)| s.value).collect();
    let consensus = median(&values).ok_or_else(|| ContractError::BelowThreshold {
        reason: "round has no submissions".to_string(),
    })?;

    let cooldown_until = height_after(height, config.cooldown_blocks)?;

    let mut events = Vec::with_capacity(submissions.len() * 2 + 1);
    let mut accurate_weights: Vec<(Addr, u64)> = Vec::new();
    let mut round_slashed = Uint128::zero();
    let mut inaccurate_count = 0u32;

    for (address, mut submission) in submissions {
        let distance = deviation(submission.value, consensus);
        let accurate = distance <= feed.deviation_threshold;

        submission.deviation = Some(distance);
        SUBMISSIONS.save(
            deps.storage,
            (feed_id, round_number, &address),
            &submission,
        )?;
        UNSETTLED.remove(deps.storage, (&address, feed_id, round_number));

        let (_, reputation_event) = update_reputation(deps.storage, &config, &address, accurate)?;
        events.push(reputation_event);

        let mut performance = PERFORMANCE
            .may_load(deps.storage, (&address, feed_id))?
            .unwrap_or_default();
        performance.total_submissions += 1;
        if accurate {
            performance.accurate_submissions += 1;
        }
        performance.cumulative_deviation =
            performance.cumulative_deviation.checked_add(distance)?;
        performance.last_submission_height = performance
            .last_submission_height
            .max(submission.submitted_at);
        PERFORMANCE.save(deps.storage, (&address, feed_id), &performance)?;

        if accurate {
            accurate_weights.push((address, submission.weight_at_submission));
        } else {
            inaccurate_count += 1;
            let stake = load_oracle(deps.storage, &address)?.stake;
            let requested = slash_amount(stake, config.slash_percentage);
            let (slashed, slash_event) = slash(deps.storage, &address, requested, cooldown_until)?;
            round_slashed = round_slashed.checked_add(slashed)?;
            events.push(slash_event);
        }
    }

    let distribution = distribute_slashed(deps.storage, &config, round_slashed, &accurate_weights)?;

    round.final_value = Some(consensus);
    round.is_finalized = true;
    round.finalized_at = Some(height);
    ROUNDS.save(deps.storage, (feed_id, round_number), &round)?;

    // Rounds may finalize out of order; the latest value tracks the highest round.
    let is_newest = LATEST_VALUES
        .may_load(deps.storage, feed_id)?
        .map(|latest| latest.round < round_number)
        .unwrap_or(true);
    if is_newest {
        LATEST_VALUES.save(
            deps.storage,
            feed_id,
            &LatestValue {
                round: round_number,
                value: consensus,
                finalized_at: height,
            },
        )?;
    }

    let subscribers = SUBSCRIBER_COUNT
        .may_load(deps.storage, feed_id)?
        .unwrap_or(0);
    let credited_total: Uint128 = distribution.credited.iter().map(|(_, share)| *share).sum();

    let mut response = Response::new()
        .add_attribute("action", "finalize")
        .add_attribute("feed_id", feed_id.to_string())
        .add_attribute("round", round_number.to_string())
        .add_attribute("final_value", consensus.to_string())
        .add_event(
            Event::new("oracle_round_finalized")
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("round", round_number.to_string())
                .add_attribute("final_value", consensus.to_string())
                .add_attribute("submissions", round.submission_count.to_string())
                .add_attribute("inaccurate", inaccurate_count.to_string())
                .add_attribute("total_slashed", round_slashed.to_string())
                .add_attribute("rewards_credited", credited_total.to_string())
                .add_attribute("treasury_amount", distribution.treasury.to_string())
                .add_attribute("subscribers", subscribers.to_string()),
        )
        .add_events(events);

    if !distribution.treasury.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: config.treasury.to_string(),
            amount: coins(distribution.treasury.u128(), config.stake_denom),
        });
    }

    Ok(response)
}

