//! Gallery configuration.
//!
//! Resolution order: built-in defaults, then `PAWSPHERE_*` environment
//! variables, then CLI flags. Also owns the platform config-directory
//! lookup used for the persisted UI state file.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::Args;
use crate::core::orbit;
use crate::core::sampler::DISPLAY_CAPACITY;

/// Default sphere radius in world units.
pub const DEFAULT_RADIUS: f32 = 6.0;
/// Default seconds between display-set resamples.
pub const DEFAULT_RESAMPLE_SECS: f64 = 20.0;

/// Resolved runtime configuration for the gallery.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Diary list JSON file (host stand-in for the REST fetch).
    pub diary_path: Option<PathBuf>,
    /// Display-set size.
    pub capacity: usize,
    /// Sphere radius.
    pub radius: f32,
    /// Seconds between resamples.
    pub resample_secs: f64,
    pub fullscreen: bool,
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            diary_path: None,
            capacity: DISPLAY_CAPACITY,
            radius: DEFAULT_RADIUS,
            resample_secs: DEFAULT_RESAMPLE_SECS,
            fullscreen: false,
            config_dir: None,
        }
    }
}

impl GalleryConfig {
    /// Resolve configuration: defaults, then environment, then CLI flags.
    pub fn from_env_and_cli(args: &Args) -> Self {
        let mut cfg = Self::default();

        if let Some(capacity) = env_parse::<usize>("PAWSPHERE_CAPACITY") {
            cfg.capacity = capacity;
        }
        if let Some(radius) = env_parse::<f32>("PAWSPHERE_RADIUS") {
            cfg.radius = radius;
        }
        if let Some(secs) = env_parse::<f64>("PAWSPHERE_RESAMPLE_SECS") {
            cfg.resample_secs = secs;
        }
        if let Ok(dir) = std::env::var("PAWSPHERE_CONFIG_DIR") {
            cfg.config_dir = Some(PathBuf::from(dir));
        }

        if let Some(path) = &args.diary {
            cfg.diary_path = Some(path.clone());
        }
        if let Some(capacity) = args.capacity {
            cfg.capacity = capacity;
        }
        if let Some(radius) = args.radius {
            cfg.radius = radius;
        }
        if let Some(secs) = args.resample {
            cfg.resample_secs = secs;
        }
        if args.fullscreen {
            cfg.fullscreen = true;
        }
        if let Some(dir) = &args.config_dir {
            cfg.config_dir = Some(dir.clone());
        }

        // A zoomed-out camera must still see the whole sphere.
        if cfg.radius >= orbit::MIN_DISTANCE {
            log::warn!(
                "Radius {} exceeds minimum camera distance, clamping",
                cfg.radius
            );
            cfg.radius = orbit::MIN_DISTANCE - 1.0;
        }

        cfg
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. PAWSPHERE_CONFIG_DIR environment variable
/// 3. Platform-specific config directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.config/pawsphere/{name}
/// - macOS: ~/Library/Application Support/pawsphere/{name}
/// - Windows: %APPDATA%\pawsphere\{name}
pub fn config_file(name: &str, config: &GalleryConfig) -> PathBuf {
    config_dir(config).join(name)
}

/// Ensure the configuration directory exists.
pub fn ensure_dirs(config: &GalleryConfig) -> Result<()> {
    let dir = config_dir(config);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    }
    Ok(())
}

fn config_dir(config: &GalleryConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("pawsphere");
    }
    // Fallback: "." if everything else fails
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cfg = GalleryConfig::default();
        assert_eq!(cfg.capacity, DISPLAY_CAPACITY);
        assert_eq!(cfg.radius, DEFAULT_RADIUS);
        assert_eq!(cfg.resample_secs, DEFAULT_RESAMPLE_SECS);
        assert!(!cfg.fullscreen);
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::parse_from([
            "pawsphere",
            "diaries.json",
            "--capacity",
            "12",
            "--radius",
            "4.5",
            "--resample",
            "5",
            "--fullscreen",
        ]);
        let cfg = GalleryConfig::from_env_and_cli(&args);
        assert_eq!(cfg.diary_path, Some(PathBuf::from("diaries.json")));
        assert_eq!(cfg.capacity, 12);
        assert_eq!(cfg.radius, 4.5);
        assert_eq!(cfg.resample_secs, 5.0);
        assert!(cfg.fullscreen);
    }

    #[test]
    fn test_oversized_radius_clamped() {
        let args = Args::parse_from(["pawsphere", "--radius", "50"]);
        let cfg = GalleryConfig::from_env_and_cli(&args);
        assert!(cfg.radius < crate::core::orbit::MIN_DISTANCE);
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let cfg = GalleryConfig {
            config_dir: Some(PathBuf::from("/custom")),
            ..GalleryConfig::default()
        };
        assert_eq!(
            config_file("pawsphere.json", &cfg),
            PathBuf::from("/custom/pawsphere.json")
        );
    }

    #[test]
    fn test_config_file_uses_platform_defaults() {
        let cfg = GalleryConfig::default();
        let path = config_file("pawsphere.json", &cfg);
        assert!(path.to_string_lossy().contains("pawsphere.json"));
    }
}
