//! Level setup: configuration data, validation and built-in stages
//!
//! A level is plain data (entity boxes, goals, limits). [`Level::build`]
//! checks it and turns it into a populated [`Registry`]. Malformed data is
//! rejected here, before a round ever starts.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::mask::{Mask, MaskError};
use super::world::{Consumable, EntityKind, Registry};
use crate::consts::*;

/// Which of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    #[default]
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(&self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }
}

/// Entity kinds as written in level data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityDefKind {
    Block,
    Fruit,
    PowerUp,
    Hazard,
}

impl EntityDefKind {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDefKind::Block => EntityKind::Static,
            EntityDefKind::Fruit => EntityKind::Collectible(Consumable::Score),
            EntityDefKind::PowerUp => EntityKind::Collectible(Consumable::Immunity),
            EntityDefKind::Hazard => EntityKind::Hazard,
        }
    }
}

/// One placed entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub kind: EntityDefKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Mask key in the [`MaskLibrary`]; a solid box when absent
    #[serde(default)]
    pub sprite: Option<String>,
}

/// Complete description of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    /// Round countdown in seconds
    pub time_limit_secs: u32,
    /// An actor whose bottom edge passes this line has fallen out
    pub fall_out_y: f32,
    /// Fruit needed to win
    pub required_items: u32,
    /// Hazards that must be neutralized to win
    pub required_hazards: u32,
    /// The player who can eat power-ups and neutralize hazards
    #[serde(default)]
    pub champion: PlayerSlot,
    /// Start positions (top-left) for player one and player two
    pub spawns: [Vec2; 2],
    /// World x at the left edge of the view when the round starts
    #[serde(default = "default_camera_x")]
    pub camera_x: f32,
    pub entities: Vec<EntityDef>,
}

fn default_camera_x() -> f32 {
    DEFAULT_CAMERA_X
}

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("time limit must be positive")]
    NoTimeLimit,
    #[error("fall-out line must be finite, got {0}")]
    BadFallOut(f32),
    #[error("entity #{index} ({kind:?}) has degenerate size {w}x{h}")]
    DegenerateEntity {
        index: usize,
        kind: EntityDefKind,
        w: f32,
        h: f32,
    },
    #[error("entity #{index} ({kind:?}) is {w}x{h}, larger than {max} on a side", max = MAX_ENTITY_SIZE)]
    OversizedEntity {
        index: usize,
        kind: EntityDefKind,
        w: f32,
        h: f32,
    },
    #[error("entity #{index} ({kind:?}) has non-finite position ({x}, {y})")]
    BadPosition {
        index: usize,
        kind: EntityDefKind,
        x: f32,
        y: f32,
    },
    #[error("spawn for {slot:?} must be finite, got ({x}, {y})")]
    BadSpawn { slot: PlayerSlot, x: f32, y: f32 },
    #[error("camera start must be finite, got {0}")]
    BadCamera(f32),
    #[error("level needs {required} fruit but only places {available}")]
    UnreachableItems { required: u32, available: u32 },
    #[error("level needs {required} hazards neutralized but only places {available}")]
    UnreachableHazards { required: u32, available: u32 },
    #[error("hazards must be neutralized but the level has no power-up")]
    NoPowerUp,
    #[error("level requires nothing to win")]
    NoGoal,
    #[error("unknown sprite mask {0:?}")]
    UnknownSprite(String),
    #[error("sprite {key:?} is {mask_w}x{mask_h}, entity #{index} is {w}x{h}")]
    SpriteSizeMismatch {
        index: usize,
        key: String,
        mask_w: u32,
        mask_h: u32,
        w: f32,
        h: f32,
    },
    #[error(transparent)]
    Mask(#[from] MaskError),
}

/// Masks supplied by the asset layer, keyed by sprite name
#[derive(Debug, Clone, Default)]
pub struct MaskLibrary {
    masks: HashMap<String, Arc<Mask>>,
}

impl MaskLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, mask: Mask) {
        self.masks.insert(key.into(), Arc::new(mask));
    }

    pub fn get(&self, key: &str) -> Option<Arc<Mask>> {
        self.masks.get(key).cloned()
    }
}

/// A validated level with its populated registry
#[derive(Debug, Clone)]
pub struct Level {
    pub config: LevelConfig,
    pub registry: Registry,
}

impl Level {
    pub fn from_json(json: &str, masks: &MaskLibrary) -> Result<Self, LevelError> {
        let config: LevelConfig = serde_json::from_str(json)?;
        Self::build(config, masks)
    }

    /// Validate the configuration and spawn every entity
    pub fn build(config: LevelConfig, masks: &MaskLibrary) -> Result<Self, LevelError> {
        validate(&config)?;

        let mut registry = Registry::new();
        let mut boxes: HashMap<(u32, u32), Arc<Mask>> = HashMap::new();
        for (index, def) in config.entities.iter().enumerate() {
            let mask = match &def.sprite {
                Some(key) => {
                    let mask = masks
                        .get(key)
                        .ok_or_else(|| LevelError::UnknownSprite(key.clone()))?;
                    if mask.width() as f32 != def.w || mask.height() as f32 != def.h {
                        return Err(LevelError::SpriteSizeMismatch {
                            index,
                            key: key.clone(),
                            mask_w: mask.width(),
                            mask_h: mask.height(),
                            w: def.w,
                            h: def.h,
                        });
                    }
                    mask
                }
                None => {
                    let size = (def.w.ceil() as u32, def.h.ceil() as u32);
                    match boxes.get(&size) {
                        Some(mask) => mask.clone(),
                        None => {
                            let mask = Arc::new(Mask::filled(size.0, size.1)?);
                            boxes.insert(size, mask.clone());
                            mask
                        }
                    }
                }
            };
            registry.spawn(def.kind.kind(), Rect::new(def.x, def.y, def.w, def.h), mask);
        }

        log::info!(
            "Level {:?}: {} entities, goal {} fruit / {} hazards, {}s",
            config.name,
            registry.len(),
            config.required_items,
            config.required_hazards,
            config.time_limit_secs
        );
        Ok(Self { config, registry })
    }
}

fn validate(config: &LevelConfig) -> Result<(), LevelError> {
    if config.time_limit_secs == 0 {
        return Err(LevelError::NoTimeLimit);
    }
    if !config.fall_out_y.is_finite() {
        return Err(LevelError::BadFallOut(config.fall_out_y));
    }
    if !config.camera_x.is_finite() {
        return Err(LevelError::BadCamera(config.camera_x));
    }
    if config.required_items == 0 && config.required_hazards == 0 {
        return Err(LevelError::NoGoal);
    }
    for slot in PlayerSlot::BOTH {
        let spawn = config.spawns[slot.index()];
        if !spawn.is_finite() {
            return Err(LevelError::BadSpawn {
                slot,
                x: spawn.x,
                y: spawn.y,
            });
        }
    }
    for (index, def) in config.entities.iter().enumerate() {
        let finite = def.w.is_finite() && def.h.is_finite();
        if !finite || def.w < 1.0 || def.h < 1.0 {
            return Err(LevelError::DegenerateEntity {
                index,
                kind: def.kind,
                w: def.w,
                h: def.h,
            });
        }
        if def.w > MAX_ENTITY_SIZE || def.h > MAX_ENTITY_SIZE {
            return Err(LevelError::OversizedEntity {
                index,
                kind: def.kind,
                w: def.w,
                h: def.h,
            });
        }
        if !(def.x.is_finite() && def.y.is_finite()) {
            return Err(LevelError::BadPosition {
                index,
                kind: def.kind,
                x: def.x,
                y: def.y,
            });
        }
    }

    let count = |kind: EntityDefKind| config.entities.iter().filter(|d| d.kind == kind).count() as u32;
    let fruit = count(EntityDefKind::Fruit);
    if config.required_items > fruit {
        return Err(LevelError::UnreachableItems {
            required: config.required_items,
            available: fruit,
        });
    }
    let hazards = count(EntityDefKind::Hazard);
    if config.required_hazards > hazards {
        return Err(LevelError::UnreachableHazards {
            required: config.required_hazards,
            available: hazards,
        });
    }
    if config.required_hazards > 0 && count(EntityDefKind::PowerUp) == 0 {
        return Err(LevelError::NoPowerUp);
    }
    Ok(())
}

/// Fluent helper for laying out levels in block units
#[derive(Debug, Clone)]
pub struct LevelBuilder {
    config: LevelConfig,
    block_size: f32,
}

impl LevelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: LevelConfig {
                name: name.into(),
                time_limit_secs: DEFAULT_ROUND_SECS,
                fall_out_y: DEFAULT_FALL_OUT_Y,
                required_items: 0,
                required_hazards: 0,
                champion: PlayerSlot::Two,
                spawns: [Vec2::ZERO, Vec2::ZERO],
                camera_x: DEFAULT_CAMERA_X,
                entities: Vec::new(),
            },
            block_size: BLOCK_SIZE,
        }
    }

    pub fn block_size(mut self, size: f32) -> Self {
        self.block_size = size;
        self
    }

    pub fn time_limit(mut self, secs: u32) -> Self {
        self.config.time_limit_secs = secs;
        self
    }

    pub fn fall_out(mut self, y: f32) -> Self {
        self.config.fall_out_y = y;
        self
    }

    pub fn goal(mut self, items: u32, hazards: u32) -> Self {
        self.config.required_items = items;
        self.config.required_hazards = hazards;
        self
    }

    pub fn champion(mut self, slot: PlayerSlot) -> Self {
        self.config.champion = slot;
        self
    }

    pub fn spawns(mut self, one: Vec2, two: Vec2) -> Self {
        self.config.spawns = [one, two];
        self
    }

    pub fn camera(mut self, x: f32) -> Self {
        self.config.camera_x = x;
        self
    }

    fn push(mut self, kind: EntityDefKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.config.entities.push(EntityDef {
            kind,
            x,
            y,
            w,
            h,
            sprite: None,
        });
        self
    }

    /// A row of tiles at `ground_y`; tiles whose column falls in a gap
    /// drop to `pit_y` instead
    pub fn floor(mut self, columns: RangeInclusive<i32>, gaps: &[RangeInclusive<i32>], ground_y: f32, pit_y: f32) -> Self {
        let size = self.block_size;
        for i in columns {
            let y = if gaps.iter().any(|g| g.contains(&i)) { pit_y } else { ground_y };
            self = self.push(EntityDefKind::Block, i as f32 * size, y, size, size);
        }
        self
    }

    /// One tile at grid column `col`, `rows` tiles above the view bottom
    pub fn tile(self, col: f32, rows: f32) -> Self {
        let size = self.block_size;
        self.push(EntityDefKind::Block, col * size, VIEW_HEIGHT - size * rows, size, size)
    }

    /// A vertical stack of tiles
    pub fn column(mut self, col: f32, rows: RangeInclusive<i32>) -> Self {
        for r in rows {
            self = self.tile(col, r as f32);
        }
        self
    }

    pub fn block(self, x: f32, y: f32, size: f32) -> Self {
        self.push(EntityDefKind::Block, x, y, size, size)
    }

    pub fn fruit(self, x: f32, y: f32, size: f32) -> Self {
        self.push(EntityDefKind::Fruit, x, y, size, size)
    }

    pub fn hazard(self, x: f32, y: f32, size: f32) -> Self {
        self.push(EntityDefKind::Hazard, x, y, size, size)
    }

    pub fn power_up(self, x: f32, y: f32, size: f32) -> Self {
        self.push(EntityDefKind::PowerUp, x, y, size, size)
    }

    /// Attach a mask key to the most recently added entity
    pub fn sprite(mut self, key: impl Into<String>) -> Self {
        if let Some(def) = self.config.entities.last_mut() {
            def.sprite = Some(key.into());
        }
        self
    }

    pub fn config(self) -> LevelConfig {
        self.config
    }
}

/// Number of built-in stages
pub const BUILTIN_LEVELS: u32 = 3;

/// Built-in stage `n` (1-based)
pub fn builtin(n: u32) -> Option<LevelConfig> {
    let bs = BLOCK_SIZE;
    let h = VIEW_HEIGHT;
    let ground = h - bs;
    let left_edge = (-VIEW_WIDTH / bs).floor() as i32;
    let config = match n {
        1 => LevelBuilder::new("Pink Hills")
            .goal(3, 1)
            .spawns(Vec2::new(-1000.0, 300.0), Vec2::new(-900.0, 300.0))
            .floor(left_edge..=30, &[-1..=1, 10..=15, 16..=22], ground, h)
            .tile(2.0, 2.0)
            .tile(2.0, 5.0)
            .tile(-2.0, 5.0)
            .tile(5.0, 4.0)
            .column(9.0, 2..=5)
            .tile(13.0, 4.0)
            .tile(16.0, 2.0)
            .tile(10.0, 2.0)
            .tile(19.0, 3.0)
            .tile(22.0, 5.0)
            .fruit(bs * 10.4, h - bs * 1.8 - 48.0, 32.0)
            .fruit(bs * 22.5, h - bs * 4.8 - 48.0, 32.0)
            .fruit(bs * 7.0, h - bs * 0.85 - 48.0, 32.0)
            .hazard(bs * 9.3, h - bs * 5.5 - 32.0, 64.0)
            .power_up(bs * -1.8, h - bs * 5.0 - 48.0, 64.0),
        2 => LevelBuilder::new("Green Valley")
            .goal(3, 2)
            .spawns(Vec2::new(-900.0, 500.0), Vec2::new(-800.0, 500.0))
            .floor(
                left_edge..=30,
                &[-1..=1, 6..=8, 10..=15, 21..=23, 25..=26, 27..=28],
                ground,
                h,
            )
            .tile(-10.0, 3.0)
            .tile(-8.0, 5.0)
            .column(-11.0, 2..=7)
            .tile(2.0, 2.0)
            .tile(5.0, 4.0)
            .tile(9.0, 6.0)
            .tile(13.0, 4.0)
            .tile(16.0, 2.0)
            .tile(19.0, 6.0)
            .tile(20.0, 4.0)
            .column(30.0, 1..=7)
            .fruit(bs * 9.0, h - bs * 0.85 - 48.0, 32.0)
            .fruit(bs * 19.0, h - bs * 5.85 - 48.0, 32.0)
            .fruit(bs * 29.0, h - bs * 0.85 - 48.0, 32.0)
            .hazard(bs * -4.0, h - bs * 0.85 - 82.0, 64.0)
            .hazard(bs * 5.0, h - bs * 0.85 - 82.0, 64.0)
            .power_up(bs * -8.0 + 16.0, h - bs * 4.85 - 82.0, 64.0),
        3 => LevelBuilder::new("Gray Ruins")
            .goal(3, 3)
            .fall_out(645.0)
            .spawns(Vec2::new(-920.0, 500.0), Vec2::new(-960.0, 500.0))
            .floor(
                left_edge..=40,
                &[-9..=-8, -6..=-5, 0..=3, 12..=14, 16..=18, 27..=30, 32..=35],
                ground,
                h,
            )
            .tile(23.0, 3.0)
            .tile(21.0, 5.0)
            .tile(9.0, 3.0)
            .column(-11.0, 2..=7)
            .column(40.0, 2..=7)
            .fruit(bs * 31.0 + 32.0, h - bs - 32.0, 32.0)
            .fruit(bs * 9.0 + 32.0, h - bs * 3.0 - 32.0, 32.0)
            .fruit(bs * 23.0 + 32.0, h - bs * 3.0 - 32.0, 32.0)
            .hazard(bs * 7.0, h - bs - 64.0, 64.0)
            .hazard(bs * 21.0, h - bs - 64.0, 64.0)
            .hazard(bs * 39.0, h - bs - 64.0, 64.0)
            .power_up(bs * 21.0 + 16.0, h - bs * 6.0 - 64.0, 64.0),
        _ => return None,
    };
    Some(config.config())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LevelBuilder {
        LevelBuilder::new("test")
            .block_size(32.0)
            .goal(1, 1)
            .floor(0..=3, &[], 200.0, 300.0)
            .fruit(10.0, 100.0, 16.0)
            .hazard(60.0, 100.0, 16.0)
            .power_up(90.0, 100.0, 16.0)
    }

    #[test]
    fn test_builtin_levels_validate() {
        for n in 1..=BUILTIN_LEVELS {
            let config = builtin(n).unwrap();
            let level = Level::build(config, &MaskLibrary::new()).unwrap();
            assert_eq!(level.registry.count_consumable(Consumable::Score), 3);
            assert_eq!(level.registry.count_consumable(Consumable::Immunity), 1);
            assert_eq!(level.config.camera_x, -1500.0);
        }
        assert!(builtin(0).is_none());
        assert!(builtin(BUILTIN_LEVELS + 1).is_none());
    }

    #[test]
    fn test_floor_gaps_drop_to_pit() {
        let config = LevelBuilder::new("gaps")
            .block_size(10.0)
            .floor(0..=4, &[1..=2], 50.0, 90.0)
            .config();
        let ys: Vec<f32> = config.entities.iter().map(|e| e.y).collect();
        assert_eq!(ys, vec![50.0, 90.0, 90.0, 50.0, 50.0]);
    }

    #[test]
    fn test_zero_size_entity_rejected() {
        let config = small().block(0.0, 0.0, 0.0).config();
        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::DegenerateEntity { index: 7, .. }));
    }

    #[test]
    fn test_unreachable_goals_rejected() {
        let err = Level::build(small().goal(2, 1).config(), &MaskLibrary::new()).unwrap_err();
        assert!(matches!(
            err,
            LevelError::UnreachableItems {
                required: 2,
                available: 1
            }
        ));
        let err = Level::build(small().goal(1, 5).config(), &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::UnreachableHazards { .. }));
    }

    #[test]
    fn test_hazard_goal_needs_power_up() {
        let config = LevelBuilder::new("no buff")
            .goal(0, 1)
            .hazard(0.0, 0.0, 16.0)
            .config();
        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::NoPowerUp));
    }

    #[test]
    fn test_zero_time_rejected() {
        let err = Level::build(small().time_limit(0).config(), &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::NoTimeLimit));
    }

    #[test]
    fn test_missing_required_field_is_parse_error() {
        let err = Level::from_json(r#"{ "name": "x" }"#, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip_builds() {
        let json = serde_json::to_string(&small().config()).unwrap();
        let level = Level::from_json(&json, &MaskLibrary::new()).unwrap();
        assert_eq!(level.registry.len(), 7);
        assert_eq!(level.config.champion, PlayerSlot::Two);
    }

    #[test]
    fn test_sprite_masks_resolved() {
        let mut masks = MaskLibrary::new();
        masks.insert("mushroom", Mask::from_ascii(&[".##.", "####", ".##.", ".##."]).unwrap());
        let config = small().fruit(0.0, 0.0, 4.0).sprite("mushroom").config();
        let level = Level::build(config.clone(), &masks).unwrap();
        let last = level.registry.iter().last().unwrap();
        assert_eq!(last.mask.count(), 10);

        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::UnknownSprite(k) if k == "mushroom"));
    }

    #[test]
    fn test_oversized_entity_rejected() {
        let json = serde_json::json!({
            "name": "huge",
            "time_limit_secs": 10,
            "fall_out_y": 630.0,
            "required_items": 1,
            "required_hazards": 0,
            "spawns": [[0.0, 0.0], [10.0, 0.0]],
            "entities": [{ "kind": "fruit", "x": 0.0, "y": 0.0, "w": 1e10, "h": 1e10 }]
        });
        let err = Level::from_json(&json.to_string(), &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::OversizedEntity { index: 0, .. }));

        let err = Level::build(small().block(0.0, 0.0, MAX_ENTITY_SIZE + 1.0).config(), &MaskLibrary::new())
            .unwrap_err();
        assert!(matches!(err, LevelError::OversizedEntity { index: 7, .. }));
        assert!(Level::build(small().block(0.0, 0.0, MAX_ENTITY_SIZE).config(), &MaskLibrary::new()).is_ok());
    }

    #[test]
    fn test_non_finite_size_rejected() {
        let config = small().fruit(0.0, 0.0, f32::INFINITY).config();
        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::DegenerateEntity { index: 7, .. }));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let config = small().block(f32::NAN, 0.0, 32.0).config();
        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::BadPosition { index: 7, .. }));

        let config = small().hazard(0.0, f32::NEG_INFINITY, 16.0).config();
        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::BadPosition { index: 7, .. }));
    }

    #[test]
    fn test_non_finite_spawn_rejected() {
        let config = small()
            .spawns(Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0))
            .config();
        let err = Level::build(config, &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::BadSpawn { slot: PlayerSlot::Two, .. }));
    }

    #[test]
    fn test_camera_start_defaults_and_validates() {
        let json = serde_json::to_value(small().config()).unwrap();
        let mut json = json.as_object().unwrap().clone();
        json.remove("camera_x");
        let level = Level::from_json(&serde_json::Value::Object(json).to_string(), &MaskLibrary::new()).unwrap();
        assert_eq!(level.config.camera_x, DEFAULT_CAMERA_X);

        let err = Level::build(small().camera(f32::NAN).config(), &MaskLibrary::new()).unwrap_err();
        assert!(matches!(err, LevelError::BadCamera(_)));
    }

    #[test]
    fn test_sprite_size_mismatch_rejected() {
        let mut masks = MaskLibrary::new();
        masks.insert("tiny", Mask::filled(2, 2).unwrap());
        let config = small().fruit(0.0, 0.0, 4.0).sprite("tiny").config();
        let err = Level::build(config, &masks).unwrap_err();
        assert!(matches!(err, LevelError::SpriteSizeMismatch { .. }));
    }
}
