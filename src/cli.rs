// Command line interface module
// Handles parsing of command line arguments

use crate::config::ConfigRecord;
use crate::overlay::{Offset, DEFAULT_OPACITY};
use clap::Parser;
use std::path::PathBuf;

/// pixlay - A click-through image overlay for Wayland
#[derive(Parser, Debug)]
#[command(name = "pixlay")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the image file (a file dialog is shown when omitted)
    #[arg(value_name = "IMAGE")]
    pub image_path: Option<PathBuf>,

    /// Config file to apply on startup
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Opacity of the overlay (0.0 - 1.0)
    #[arg(short, long, default_value_t = DEFAULT_OPACITY, value_parser = parse_opacity)]
    pub opacity: f64,

    /// Scale factor for the image (e.g., 0.5 for half size, 2.0 for double)
    #[arg(short, long, default_value_t = 1.0, value_parser = parse_scale)]
    pub scale: f64,

    /// Horizontal offset of the image's top-left corner
    #[arg(short = 'x', long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset_x: i32,

    /// Vertical offset of the image's top-left corner
    #[arg(short = 'y', long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset_y: i32,

    /// Disable GPU rendering and use CPU rendering only
    #[arg(long, default_value = "false")]
    pub cpu: bool,
}

impl Args {
    /// Initial placement requested on the command line
    pub fn initial_placement(&self) -> ConfigRecord {
        ConfigRecord {
            offset: Offset::new(self.offset_x, self.offset_y),
            scale_factor: self.scale,
            opacity: self.opacity,
        }
    }
}

/// Parse opacity value and ensure it's within valid range
fn parse_opacity(s: &str) -> Result<f64, String> {
    let opacity: f64 = s.parse().map_err(|_| "Invalid opacity value")?;
    if !(0.0..=1.0).contains(&opacity) {
        return Err("Opacity must be between 0.0 and 1.0".to_string());
    }
    Ok(opacity)
}

/// Parse scale value and ensure it's a usable multiplier
fn parse_scale(s: &str) -> Result<f64, String> {
    let scale: f64 = s.parse().map_err(|_| "Invalid scale value")?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err("Scale must be a positive number".to_string());
    }
    Ok(scale)
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fresh_overlay() {
        let args = Args::try_parse_from(["pixlay", "cat.png"]).unwrap();
        assert_eq!(args.image_path, Some(PathBuf::from("cat.png")));
        assert_eq!(
            args.initial_placement(),
            ConfigRecord {
                offset: Offset::new(0, 0),
                scale_factor: 1.0,
                opacity: 0.5,
            }
        );
        assert!(!args.cpu);
        assert!(args.config.is_none());
    }

    #[test]
    fn image_is_optional() {
        let args = Args::try_parse_from(["pixlay"]).unwrap();
        assert!(args.image_path.is_none());
    }

    #[test]
    fn placement_flags_are_parsed() {
        let args = Args::try_parse_from([
            "pixlay", "map.jpg", "-o", "0.8", "-s", "2.5", "-x", "-40", "-y", "15", "--cpu",
            "--config", "config_map.jpg.json",
        ])
        .unwrap();
        assert_eq!(
            args.initial_placement(),
            ConfigRecord {
                offset: Offset::new(-40, 15),
                scale_factor: 2.5,
                opacity: 0.8,
            }
        );
        assert!(args.cpu);
        assert_eq!(args.config, Some(PathBuf::from("config_map.jpg.json")));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Args::try_parse_from(["pixlay", "a.png", "-o", "1.5"]).is_err());
        assert!(Args::try_parse_from(["pixlay", "a.png", "-o", "half"]).is_err());
        assert!(Args::try_parse_from(["pixlay", "a.png", "-s", "0"]).is_err());
        assert!(Args::try_parse_from(["pixlay", "a.png", "-s", "-2"]).is_err());
    }
}
