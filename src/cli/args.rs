//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::error::{Result, StepgateError};
use crate::plan::DEFAULT_PLAN_FILE;

/// Stepgate - Run a plan of named steps, optionally resuming part-way.
#[derive(Debug, Parser)]
#[command(name = "stepgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a plan (default if no command specified)
    Run(RunArgs),

    /// List the steps of a plan
    List(ListArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Plan file, relative to the project root
    #[arg(short = 'f', long, default_value = DEFAULT_PLAN_FILE)]
    pub plan: PathBuf,

    /// Suppress every step before this one
    #[arg(long, value_name = "STEP", env = "STEPGATE_START_AT_STEP")]
    pub start_at_step: Option<String>,

    /// Set a plan parameter (repeatable); values are parsed as JSON when possible
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            plan: PathBuf::from(DEFAULT_PLAN_FILE),
            start_at_step: None,
            params: Vec::new(),
        }
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// Plan file, relative to the project root
    #[arg(short = 'f', long, default_value = DEFAULT_PLAN_FILE)]
    pub plan: PathBuf,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            plan: PathBuf::from(DEFAULT_PLAN_FILE),
        }
    }
}

/// Parse a `KEY=VALUE` parameter.
///
/// The value is read as JSON when it parses (`3`, `true`, `["a"]`) and as a
/// plain string otherwise.
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| StepgateError::InvalidParameter {
            message: format!("expected KEY=VALUE, got '{}'", raw),
        })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(StepgateError::InvalidParameter {
            message: format!("missing name in '{}'", raw),
        });
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}
