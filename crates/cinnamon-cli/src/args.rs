use std::path::PathBuf;

use clap::Parser;
use cinnamon_core::CinnamonConfig;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Script file to run on the first frame (can be repeated)
    #[arg(long = "script")]
    pub scripts: Vec<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Frames per second, overriding the config
    #[arg(long)]
    pub tick_rate: Option<u32>,
}

impl Cli {
    /// Fold command line overrides into the loaded config
    pub fn apply(&self, config: &mut CinnamonConfig) {
        if self.debug > 0 {
            config.logging.debug = true;
        }
        if let Some(hz) = self.tick_rate {
            config.frame.tick_rate_hz = hz;
        }
    }
}
