//! Composite cache configuration resource.
//!
//! Holds the settings the [`CompositeCache`] is built from. Provides safe
//! defaults and methods to load/save them from an INI file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [cache]
//! grace_queue_size = 20
//! pixels_per_unit = 32
//! hardware_acceleration = false
//! output_format = rgba32
//! ```
//!
//! [`CompositeCache`]: crate::resources::compositecache::CompositeCache

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::bitmap::PixelFormat;
use crate::compose::ComposePath;

/// Default safe values for startup
const DEFAULT_GRACE_QUEUE_SIZE: i32 = 20;
const DEFAULT_PIXELS_PER_UNIT: f32 = 32.0;
const DEFAULT_HARDWARE_ACCELERATION: bool = false;
const DEFAULT_CONFIG_PATH: &str = "./paperdoll.ini";

/// Cache configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Number of unreferenced composites kept around before the oldest is
    /// destroyed. Negative values behave like 0.
    pub grace_queue_size: i32,
    /// Pixels-per-unit reported by every sprite grid.
    pub pixels_per_unit: f32,
    /// Compose through a scratch render target instead of directly.
    pub use_hardware_acceleration: bool,
    /// Byte layout of composed bitmaps.
    pub output_format: PixelFormat,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            grace_queue_size: DEFAULT_GRACE_QUEUE_SIZE,
            pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
            use_hardware_acceleration: DEFAULT_HARDWARE_ACCELERATION,
            output_format: PixelFormat::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Grace queue capacity with negative sizes clamped to 0.
    pub fn grace_capacity(&self) -> usize {
        self.grace_queue_size.max(0) as usize
    }

    pub fn compose_path(&self) -> ComposePath {
        ComposePath::from_hardware_flag(self.use_hardware_acceleration)
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config)
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), String> {
        if let Some(size) = config.getint("cache", "grace_queue_size").ok().flatten() {
            self.grace_queue_size = size.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        }
        if let Some(ppu) = config.getfloat("cache", "pixels_per_unit").ok().flatten() {
            self.pixels_per_unit = ppu as f32;
        }
        if let Some(hw) = config.getbool("cache", "hardware_acceleration").ok().flatten() {
            self.use_hardware_acceleration = hw;
        }
        if let Some(name) = config.get("cache", "output_format") {
            self.output_format = PixelFormat::from_name(&name)
                .ok_or_else(|| format!("Unknown output_format '{}'", name))?;
        }

        info!(
            "Loaded cache config: grace={}, ppu={}, hardware_acceleration={}, format={}",
            self.grace_queue_size,
            self.pixels_per_unit,
            self.use_hardware_acceleration,
            self.output_format.name()
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set(
            "cache",
            "grace_queue_size",
            Some(self.grace_queue_size.to_string()),
        );
        config.set(
            "cache",
            "pixels_per_unit",
            Some(self.pixels_per_unit.to_string()),
        );
        config.set(
            "cache",
            "hardware_acceleration",
            Some(self.use_hardware_acceleration.to_string()),
        );
        config.set(
            "cache",
            "output_format",
            Some(self.output_format.name().to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved cache config to {:?}", self.config_path);

        Ok(())
    }
}
