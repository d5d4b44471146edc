//! Duo Dash headless runner
//!
//! Plays one round with two seeded pilots and prints the final frame as
//! JSON. Usage: `duo-dash [level-number|level.json] [seed]`

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use duo_dash::{Settings, ticks_to_secs};
use duo_dash::sim::{
    BUILTIN_LEVELS, Level, Mask, MaskLibrary, Pilot, Round, SpriteSet, TickInput, builtin, tick,
};

/// Sprite size used when no sprite sheets are loaded
const DEFAULT_SPRITE_SIZE: u32 = 32;
const DEFAULT_SEED: u64 = 12345;
const SETTINGS_FILE: &str = "duo-dash.json";

fn load_level(arg: Option<&str>, masks: &MaskLibrary) -> Result<Level, Box<dyn Error>> {
    let arg = arg.unwrap_or("1");
    if let Ok(n) = arg.parse::<u32>() {
        let config = builtin(n).ok_or_else(|| format!("no level {n} (1..={BUILTIN_LEVELS})"))?;
        return Ok(Level::build(config, masks)?);
    }
    let json = std::fs::read_to_string(arg)?;
    Ok(Level::from_json(&json, masks)?)
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match args.get(1) {
        Some(s) => s.parse::<u64>()?,
        None => DEFAULT_SEED,
    };

    let settings = Settings::load(Path::new(SETTINGS_FILE));
    let masks = MaskLibrary::new();
    let level = load_level(args.first().map(String::as_str), &masks)?;

    let body = Mask::filled(DEFAULT_SPRITE_SIZE, DEFAULT_SPRITE_SIZE)?;
    let sprites = Arc::new(SpriteSet::uniform(body));
    let mut round = Round::new(level, settings, [sprites.clone(), sprites]);
    log::info!("Pilots seeded with {seed}");

    let mut pilots = [Pilot::new(seed), Pilot::new(seed.wrapping_add(1))];
    let frame_cap = round.time_limit_ticks() + 1;
    while !round.is_over() && round.stats.elapsed_ticks < frame_cap {
        let input = TickInput::new(pilots[0].next_input(), pilots[1].next_input());
        tick(&mut round, &input);
        for event in &round.events {
            log::debug!("tick {}: {:?}", round.stats.elapsed_ticks, event);
        }
    }

    log::info!(
        "{:?} after {:.1}s",
        round.outcome,
        ticks_to_secs(round.stats.elapsed_ticks, round.fps())
    );
    println!("{}", serde_json::to_string_pretty(&round.snapshot())?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Duo Dash (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
