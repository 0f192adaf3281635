use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::CategoryFilter;
use crate::session::DEFAULT_PREVIEW_CAPACITY;

/// Browse the campus color catalog and extract new colors from photographs.
#[derive(Parser, Debug)]
#[command(name = "campus-palette", version, about)]
pub struct Args {
    /// Number of recent extracted colors kept in the preview (at least 6)
    #[arg(long, global = true, default_value_t = DEFAULT_PREVIEW_CAPACITY, value_parser = parse_preview_capacity)]
    pub preview_capacity: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalog colors
    List {
        /// all, official, campus, nature or architecture
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
    },

    /// Show hex, RGB, CMYK and provenance for one color
    Show {
        /// Catalog id of the color
        id: String,
    },

    /// Sample one pixel of an image as a new catalog color
    Sample {
        /// Path to the input image
        image: PathBuf,

        /// Click position in display pixels
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Displayed width (defaults to the image's natural width)
        #[arg(long)]
        width: Option<f64>,

        /// Displayed height (defaults to the image's natural height)
        #[arg(long)]
        height: Option<f64>,
    },

    /// Extract dominant colors from an image into the catalog
    Extract {
        /// Path to the input image
        image: PathBuf,

        /// Replay a saved analysis response instead of clustering locally
        #[arg(short, long)]
        response: Option<PathBuf>,

        /// Number of colors to request
        #[arg(short = 'k', long = "colors", default_value_t = crate::analysis::DEFAULT_TARGET_COUNT, value_parser = parse_color_count)]
        colors: usize,
    },

    /// Launch the interactive terminal browser
    Browse {
        /// Image to load for extraction and sampling
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

fn parse_count(s: &str) -> Result<usize, String> {
    s.parse::<usize>()
        .map_err(|_| format!("'{s}' is not a non-negative integer"))
}

fn parse_preview_capacity(s: &str) -> Result<usize, String> {
    let n = parse_count(s)?;
    if n < DEFAULT_PREVIEW_CAPACITY {
        return Err(format!(
            "preview must keep at least {DEFAULT_PREVIEW_CAPACITY} colors, got {n}"
        ));
    }
    Ok(n)
}

fn parse_color_count(s: &str) -> Result<usize, String> {
    match parse_count(s)? {
        0 => Err("at least one color must be requested".to_string()),
        n => Ok(n),
    }
}
