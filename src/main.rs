//! Paper-doll compositor inspection tool.
//!
//! Builds a synthetic layer catalog, resolves one character appearance
//! against it, composes the sprite sheet through the composite cache inside
//! a bevy_ecs world and prints a JSON report: the composite hash, the sheet
//! size, the frame rectangles for every state/direction and the cache
//! statistics.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --standard --random --seed 42
//! cargo run --release -- --config paperdoll.ini --appearance doll.json
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use clap::Parser;
use log::info;
use serde::Serialize;

use paperdoll::components::appearance::{Appearance, AppearancePatch, OutfitShape};
use paperdoll::components::paperdoll::PaperDoll;
use paperdoll::demo::demo_layer_store;
use paperdoll::events::paperdoll::PaperDollRefreshedEvent;
use paperdoll::resources::cacheconfig::CacheConfig;
use paperdoll::resources::compositecache::{CacheStats, CompositeCache};
use paperdoll::resources::spritegrid::FrameRect;
use paperdoll::selection::{AnimState, CharacterSelection, Direction};
use paperdoll::systems::paperdoll::refresh_paperdolls;

const DEFAULT_FPS: f32 = 8.0;

#[derive(Parser)]
#[command(version, about = "Compose a paper-doll sprite sheet and report its layout")]
struct Cli {
    /// INI file with a [cache] section.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON appearance patch applied on top of the starting appearance.
    #[arg(long, value_name = "PATH")]
    appearance: Option<PathBuf>,

    /// Use the standard (nine clothing slots) outfit shape.
    #[arg(long)]
    standard: bool,

    /// Start from a random appearance instead of the default one.
    #[arg(long)]
    random: bool,

    /// Seed for --random.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct DirectionFrames {
    state: &'static str,
    direction: &'static str,
    frames: Vec<FrameRect>,
}

#[derive(Serialize)]
struct Report {
    hash: String,
    width: u32,
    height: u32,
    pixel_format: &'static str,
    pixels_per_unit: f32,
    frames: Vec<DirectionFrames>,
    stats: CacheStats,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = CacheConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                fail(e);
            }
            config
        }
        None => CacheConfig::new(),
    };
    if config.pixels_per_unit <= 0.0 {
        config.pixels_per_unit = CacheConfig::new().pixels_per_unit;
    }

    let store = demo_layer_store();
    let shape = if cli.standard {
        OutfitShape::Standard
    } else {
        OutfitShape::Simple
    };

    let mut appearance = if cli.random {
        let mut rng = match cli.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Appearance::random(&mut rng, &store, shape)
    } else {
        let mut appearance = Appearance::default();
        appearance.apply(&AppearancePatch {
            shape: Some(shape),
            ..Default::default()
        });
        appearance
    };

    if let Some(path) = &cli.appearance {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("Failed to read {}: {}", path.display(), e)));
        let patch: AppearancePatch = serde_json::from_str(&text)
            .unwrap_or_else(|e| fail(format!("Invalid appearance {}: {}", path.display(), e)));
        appearance.apply(&patch);
    }

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(CompositeCache::from_config(&config));
    world.insert_resource(store);
    world.insert_resource(config);

    let refreshed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let refreshed_clone = refreshed.clone();
    world.add_observer(move |trigger: On<PaperDollRefreshedEvent>| {
        if let Ok(mut hashes) = refreshed_clone.lock() {
            hashes.push(trigger.event().hash.clone());
        }
    });
    world.flush();

    let entity = world
        .spawn((appearance, PaperDoll::character(DEFAULT_FPS)))
        .id();

    let mut schedule = Schedule::default();
    schedule.add_systems(refresh_paperdolls);
    schedule.run(&mut world);

    if let Ok(hashes) = refreshed.lock() {
        info!("Refreshed {} paper doll(s)", hashes.len());
    }

    let report = {
        let Some(doll) = world.get::<PaperDoll>(entity) else {
            fail("paper doll entity vanished");
        };
        let Some(grid) = doll.grid.as_ref() else {
            fail("paper doll has no sprite grid");
        };
        let selection = CharacterSelection::new(DEFAULT_FPS);
        let mut frames = Vec::new();
        for state in AnimState::ALL {
            for direction in Direction::ALL {
                frames.push(DirectionFrames {
                    state: state.name(),
                    direction: direction.name(),
                    frames: selection
                        .frames(state, direction)
                        .into_iter()
                        .map(|cell| grid.frame_rect(cell))
                        .collect(),
                });
            }
        }
        let cache = world.resource::<CompositeCache>();
        Report {
            hash: grid.key().to_string(),
            width: grid.bitmap().width(),
            height: grid.bitmap().height(),
            pixel_format: grid.bitmap().format().name(),
            pixels_per_unit: grid.pixels_per_unit(),
            frames,
            stats: cache.stats(),
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }

    world.despawn(entity);
    world.resource::<CompositeCache>().shutdown();
}
