//! Round rule engine
//!
//! Turns post-collision overlaps into score, immunity and outcome changes.
//! Steps run in a fixed order each tick:
//!
//! 1. timer
//! 2. fruit (both players)
//! 3. hazard damage, then an immediate loss check
//! 4. hazard neutralize (champion, immune only)
//! 5. power-ups (champion)
//! 6. fall-out line
//! 7. win goal
//!
//! Each scan freezes the ids it will visit before looking at any of them
//! and applies its removals only after the scan, so nothing is skipped or
//! counted twice. Player one is always checked before player two.

use super::level::PlayerSlot;
use super::state::{LossReason, Outcome, Round, RoundEvent};
use super::world::{Consumable, Entity, EntityId};

/// Ids of live entities of one kind that `slots` overlap, first toucher
/// first. An entity is listed once even when both players touch it.
fn touched_by(
    round: &Round,
    slots: &[PlayerSlot],
    pred: impl Fn(&Entity) -> bool,
) -> Vec<(EntityId, PlayerSlot)> {
    let candidates = round.registry.snapshot(pred);
    let mut hits: Vec<(EntityId, PlayerSlot)> = Vec::new();
    for &slot in slots {
        for &id in &candidates {
            if hits.iter().any(|(hit, _)| *hit == id) {
                continue;
            }
            let Some(entity) = round.registry.get(id) else {
                continue;
            };
            if round.touches(slot, entity) {
                hits.push((id, slot));
            }
        }
    }
    hits
}

/// Step 1. Returns true when time ran out.
pub fn timer_check(round: &mut Round) -> bool {
    if round.stats.elapsed_ticks >= round.time_limit_ticks() {
        round.finish(Outcome::Lost(LossReason::TimeUp));
        return true;
    }
    false
}

/// Step 2: either player eats fruit on contact
pub fn collect_scan(round: &mut Round) {
    let hits = touched_by(round, &PlayerSlot::BOTH, |e| {
        e.on_consumed() == Some(Consumable::Score)
    });
    for (id, slot) in hits {
        if round.registry.remove(id) {
            round.stats.collected += 1;
            round.events.push(RoundEvent::Collected { slot, id });
            log::debug!("{slot:?} collected {id:?} ({} total)", round.stats.collected);
        }
    }
}

/// Step 3: unprotected hazard contact. Hazards stay in place.
pub fn hazard_damage_scan(round: &mut Round) {
    if round.stats.immunity {
        return;
    }
    let ids = round.registry.snapshot(|e| e.is_hazard());
    for id in ids {
        let Some(entity) = round.registry.get(id) else {
            continue;
        };
        let touching: Vec<PlayerSlot> = PlayerSlot::BOTH
            .into_iter()
            .filter(|&slot| round.touches(slot, entity))
            .collect();
        if touching.is_empty() {
            continue;
        }
        round.stats.hazard_contacts += 1;
        for slot in touching {
            round.actor_mut(slot).make_hit();
            round.events.push(RoundEvent::Damaged { slot, id });
            log::debug!("{slot:?} touched hazard {id:?}");
        }
    }
}

/// Step 3, continued: any hazard contact loses the round. Also run at the
/// top of every tick in case a contact slipped past.
pub fn hazard_loss_check(round: &mut Round) -> bool {
    if round.stats.hazard_contacts >= 1 {
        round.finish(Outcome::Lost(LossReason::HazardContact));
        return true;
    }
    false
}

/// Step 4: an immune champion removes hazards it touches
pub fn neutralize_scan(round: &mut Round) {
    if !round.stats.immunity {
        return;
    }
    let champion = round.level.champion;
    let hits = touched_by(round, &[champion], |e| e.is_hazard());
    for (id, slot) in hits {
        if round.registry.remove(id) {
            round.stats.neutralized += 1;
            round.events.push(RoundEvent::Neutralized { slot, id });
            log::debug!("{slot:?} neutralized {id:?} ({} total)", round.stats.neutralized);
        }
    }
}

/// Step 5: the champion eats power-ups, granting immunity for the rest of
/// the round
pub fn power_up_scan(round: &mut Round) {
    let champion = round.level.champion;
    let hits = touched_by(round, &[champion], |e| {
        e.on_consumed() == Some(Consumable::Immunity)
    });
    for (id, slot) in hits {
        if round.registry.remove(id) {
            round.stats.power_ups += 1;
            round.stats.immunity = true;
            round.events.push(RoundEvent::PoweredUp { slot, id });
            log::debug!("{slot:?} powered up with {id:?}");
        }
    }
}

/// Step 6: a player whose bottom edge passes the fall-out line loses
pub fn boundary_check(round: &mut Round) -> bool {
    let line = round.level.fall_out_y;
    if round.actors.iter().any(|a| a.bounds().bottom() > line) {
        round.finish(Outcome::Lost(LossReason::FellOut));
        return true;
    }
    false
}

/// Step 7
pub fn win_check(round: &mut Round) -> bool {
    if round.stats.collected >= round.level.required_items
        && round.stats.neutralized >= round.level.required_hazards
    {
        round.finish(Outcome::Won);
        return true;
    }
    false
}

/// Steps 2 through 7. The timer (step 1) runs earlier in the tick, before
/// any motion.
pub fn evaluate(round: &mut Round) {
    if round.is_over() {
        return;
    }
    collect_scan(round);
    hazard_damage_scan(round);
    if hazard_loss_check(round) {
        return;
    }
    neutralize_scan(round);
    power_up_scan(round);
    if boundary_check(round) {
        return;
    }
    win_check(round);
}
