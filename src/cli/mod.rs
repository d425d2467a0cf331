//! CLI Module
//!
//! Command-line analysis tools for the envelope filter.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::DEFAULT_SAMPLE_RATE;

/// Envelope filter analysis tools
#[derive(Parser, Debug)]
#[command(name = "envfilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List parameters with ranges and defaults
    #[command(name = "params")]
    Params,

    /// Show the center frequency and peak gain as the envelope sweeps 0 to 1
    #[command(name = "sweep")]
    Sweep {
        /// Number of envelope steps
        #[arg(short, long, default_value_t = 10)]
        steps: usize,

        /// Sample rate in Hz
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: f64,

        /// Parameter preset (JSON)
        #[arg(short, long)]
        preset: Option<PathBuf>,
    },

    /// Print the filter's magnitude response at a fixed envelope value
    #[command(name = "response")]
    Response {
        /// Envelope value driving the center frequency
        #[arg(short, long, default_value_t = 0.0)]
        envelope: f32,

        /// Sample rate in Hz
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: f64,

        /// Number of log-spaced frequency points
        #[arg(short = 'n', long, default_value_t = 24)]
        points: usize,

        /// Parameter preset (JSON)
        #[arg(short, long)]
        preset: Option<PathBuf>,
    },

    /// Report the follower's step response for given attack/release times
    #[command(name = "envelope")]
    Envelope {
        /// Attack time in seconds
        #[arg(short, long, default_value_t = 0.001)]
        attack: f32,

        /// Release time in seconds
        #[arg(short, long, default_value_t = 0.080)]
        release: f32,

        /// Step amplitude
        #[arg(long, default_value_t = 1.0)]
        amplitude: f32,

        /// Sample rate in Hz
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: f64,
    },
}
