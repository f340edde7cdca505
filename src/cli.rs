use clap::Parser;
use std::path::PathBuf;

/// Spatial pet-diary gallery
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Diary list JSON file to display - optional, starts all-placeholder without it
    #[arg(value_name = "FILE")]
    pub diary: Option<PathBuf>,

    /// Number of cards in the display set
    #[arg(short = 'n', long = "capacity", value_name = "N")]
    pub capacity: Option<usize>,

    /// Sphere radius in world units
    #[arg(short = 'r', long = "radius", value_name = "R")]
    pub radius: Option<f32>,

    /// Seconds between display-set resamples
    #[arg(long = "resample", value_name = "SECS")]
    pub resample: Option<f64>,

    /// Start in fullscreen mode
    #[arg(short = 'F', long = "fullscreen")]
    pub fullscreen: bool,

    /// Enable debug logging to file (default: pawsphere.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
