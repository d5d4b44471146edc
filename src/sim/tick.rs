//! Fixed timestep simulation tick
//!
//! Core game loop that advances a round deterministically. Every stage
//! handles player one before player two.

use serde::{Deserialize, Serialize};

use super::collision::{probe_horizontal, resolve_vertical};
use super::level::PlayerSlot;
use super::rules;
use super::state::{Round, RoundEvent};
use crate::consts::PROBE_FACTOR;
use crate::settings::{ControlScheme, Key};

/// One player's commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Run left (held)
    pub left: bool,
    /// Run right (held)
    pub right: bool,
    /// Jump (pressed this tick, not held)
    pub jump: bool,
}

impl PlayerInput {
    /// Read a player's commands from the keys held down and the keys newly
    /// pressed this tick
    pub fn from_keys(held: &[Key], pressed: &[Key], scheme: &ControlScheme) -> Self {
        Self {
            left: held.contains(&scheme.left),
            right: held.contains(&scheme.right),
            jump: pressed.contains(&scheme.jump),
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Player one, then player two
    pub players: [PlayerInput; 2],
}

impl TickInput {
    pub fn new(one: PlayerInput, two: PlayerInput) -> Self {
        Self { players: [one, two] }
    }

    /// Both players' commands from one keyboard
    pub fn from_keys(held: &[Key], pressed: &[Key], controls: &[ControlScheme; 2]) -> Self {
        Self::new(
            PlayerInput::from_keys(held, pressed, &controls[0]),
            PlayerInput::from_keys(held, pressed, &controls[1]),
        )
    }

    pub fn player(&self, slot: PlayerSlot) -> PlayerInput {
        self.players[slot.index()]
    }
}

/// Advance the round by one fixed timestep
pub fn tick(round: &mut Round, input: &TickInput) {
    // Finished rounds are frozen
    if round.is_over() {
        return;
    }
    round.events.clear();
    for contacts in round.contacts.iter_mut() {
        contacts.clear();
    }
    if rules::hazard_loss_check(round) {
        return;
    }

    round.stats.elapsed_ticks += 1;
    if rules::timer_check(round) {
        return;
    }

    for slot in PlayerSlot::BOTH {
        apply_input(round, slot, input.player(slot));
    }

    let fps = round.fps();
    for actor in round.actors.iter_mut() {
        actor.step(fps);
    }

    let policy = round.settings.contact_policy;
    let blocking = round.settings.blocking;
    for slot in PlayerSlot::BOTH {
        let dy = round.actor(slot).vel.y;
        let touched = resolve_vertical(
            &mut round.actors[slot.index()],
            &round.registry,
            dy,
            policy,
            blocking,
        );
        if !touched.is_empty() {
            if dy > 0.0 {
                round.events.push(RoundEvent::Landed { slot });
            } else if dy < 0.0 {
                round.events.push(RoundEvent::HeadBump { slot });
            }
        }
        round.contacts[slot.index()] = touched;
    }

    rules::evaluate(round);

    round.camera.follow(&round.actors[PlayerSlot::One.index()]);
}

/// Jump, then run unless something blocking sits in the way. Right wins when both
/// directions are held.
fn apply_input(round: &mut Round, slot: PlayerSlot, cmd: PlayerInput) {
    let speed = round.settings.player_speed;
    let reach = speed * PROBE_FACTOR;
    let blocking = round.settings.blocking;

    if cmd.jump && round.actor(slot).can_jump() {
        round.actor_mut(slot).jump();
        round.events.push(RoundEvent::Jumped { slot });
    }

    let actor = round.actor(slot);
    let blocked_left = probe_horizontal(actor, &round.registry, -reach, blocking).is_some();
    let blocked_right = probe_horizontal(actor, &round.registry, reach, blocking).is_some();

    let actor = round.actor_mut(slot);
    actor.stop_horizontal();
    if cmd.left && !blocked_left {
        actor.move_left(speed);
    }
    if cmd.right && !blocked_right {
        actor.move_right(speed);
    }
}
