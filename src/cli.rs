//! Command-line interface definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CliOverrides;
use crate::selection::{Rect, SelectionSet};

/// Region redaction and object extraction for still images
#[derive(Debug, Parser)]
#[command(name = "investigator", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: <config_dir>/investigator/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Keep only the first rectangle
    Crop(RedactArgs),
    /// Paint every rectangle opaque black
    Blackout(RedactArgs),
    /// Gaussian-blur every rectangle
    Blur(RedactArgs),
    /// Extract the foreground object inside the first rectangle
    SelectObject(SelectObjectArgs),
    /// Show environment and configuration
    Info,
    /// Start the HTTP server
    #[cfg(feature = "web")]
    Serve(ServeArgs),
}

/// Arguments shared by crop, blackout and blur
#[derive(Debug, Args)]
pub struct RedactArgs {
    /// Input image
    pub input: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Selection as x,y,width,height (repeatable, applied in order)
    #[arg(short, long = "rect", value_parser = parse_rect, allow_hyphen_values = true)]
    pub rects: Vec<Rect>,

    /// Blur radius in pixels
    #[arg(long)]
    pub blur_radius: Option<f32>,
}

impl RedactArgs {
    pub fn selections(&self) -> SelectionSet {
        self.rects.iter().copied().collect()
    }

    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            blur_radius: self.blur_radius,
            ..CliOverrides::new()
        }
    }
}

/// Arguments for select-object
#[derive(Debug, Args)]
pub struct SelectObjectArgs {
    /// Input image
    pub input: PathBuf,

    /// Output image; PNG keeps the transparency
    #[arg(short, long)]
    pub output: PathBuf,

    /// Region to search as x,y,width,height (whole image when omitted)
    #[arg(short, long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub rect: Option<Rect>,

    /// Skip the external matting model
    #[arg(long)]
    pub no_matting: bool,

    /// Seed graph-cut from the whole region instead of a saliency map
    #[arg(long)]
    pub no_saliency: bool,

    /// Graph-cut iterations
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Matting executable
    #[arg(long, value_name = "COMMAND")]
    pub matting_command: Option<String>,
}

impl SelectObjectArgs {
    pub fn selections(&self) -> SelectionSet {
        self.rect.into_iter().collect()
    }

    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            matting_command: self.matting_command.clone(),
            no_matting: self.no_matting,
            no_saliency: self.no_saliency,
            graph_cut_iterations: self.iterations,
            ..CliOverrides::new()
        }
    }
}

/// Arguments for serve
#[cfg(feature = "web")]
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Request body limit in megabytes
    #[arg(long)]
    pub upload_limit: Option<usize>,

    /// Skip the external matting model
    #[arg(long)]
    pub no_matting: bool,
}

#[cfg(feature = "web")]
impl ServeArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            port: self.port,
            bind: self.bind.clone(),
            upload_limit_mb: self.upload_limit,
            no_matting: self.no_matting,
            ..CliOverrides::new()
        }
    }
}

/// Parse `x,y,width,height`
pub fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,width,height but got '{}'", s));
    }

    let mut values = [0i32; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid number '{}': {}", part, e))?;
    }

    Ok(Rect::new(values[0], values[1], values[2], values[3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rect() {
        assert_eq!(parse_rect("1,2,3,4").unwrap(), Rect::new(1, 2, 3, 4));
        assert_eq!(parse_rect(" -5, 0 ,10,-1").unwrap(), Rect::new(-5, 0, 10, -1));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("1,2,3,x").is_err());
    }

    #[test]
    fn test_parse_blackout() {
        let cli = Cli::parse_from([
            "investigator",
            "-vv",
            "blackout",
            "in.png",
            "-o",
            "out.png",
            "--rect",
            "0,0,5,5",
            "--rect",
            "-2,3,4,4",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Blackout(args) => {
                let selections = args.selections();
                assert_eq!(selections.len(), 2);
                assert_eq!(selections.as_slice()[1], Rect::new(-2, 3, 4, 4));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_select_object() {
        let cli = Cli::parse_from([
            "investigator",
            "select-object",
            "in.jpg",
            "-o",
            "out.png",
            "--no-matting",
            "--iterations",
            "5",
        ]);
        match cli.command {
            Commands::SelectObject(args) => {
                assert!(args.selections().is_empty());
                let overrides = args.overrides();
                assert!(overrides.no_matting);
                assert_eq!(overrides.graph_cut_iterations, Some(5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
