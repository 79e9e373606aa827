//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use crate::core::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Find images with identical pixel content, whatever their name or format
#[derive(Parser, Debug)]
#[command(name = "dupe")]
#[command(version)]
#[command(about = "Find images with identical pixel content across folders", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path(s) to folder(s) of images (can be specified multiple times)
    #[arg(short = 'f', long = "folders", value_name = "FOLDER")]
    pub folders: Vec<PathBuf>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Decode and fingerprint files on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Stop the whole run if a folder cannot be listed
    #[arg(long)]
    pub abort_on_list_error: bool,

    /// Seed for the run identifier (overrides config)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the fingerprint of each file
    Fingerprint {
        /// Image files to fingerprint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show where the configuration file is read from
    ConfigPath,
}

impl Args {
    /// Apply command-line overrides on top of file configuration
    pub fn apply_to(&self, config: &mut Config) {
        if !self.folders.is_empty() {
            config.scan.folders = self.folders.clone();
        }
        if self.json {
            config.output.json = true;
        }
        if self.parallel {
            config.scan.parallel = true;
        }
        if self.abort_on_list_error {
            config.scan.abort_on_list_error = true;
        }
        if let Some(seed) = self.seed {
            config.scan.seed = seed;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_folders() {
        let args = Args::parse_from(["dupe", "-f", "/photos", "--folders", "/backup"]);

        assert!(args.command.is_none());
        assert_eq!(
            args.folders,
            vec![PathBuf::from("/photos"), PathBuf::from("/backup")]
        );
    }

    #[test]
    fn test_parse_fingerprint_subcommand() {
        let args = Args::parse_from(["dupe", "fingerprint", "a.png", "b.bmp"]);

        match args.command {
            Some(Commands::Fingerprint { files }) => {
                assert_eq!(files, vec![PathBuf::from("a.png"), PathBuf::from("b.bmp")]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fingerprint_requires_files() {
        assert!(Args::try_parse_from(["dupe", "fingerprint"]).is_err());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = Args::parse_from([
            "dupe",
            "-f",
            "/photos",
            "--json",
            "--parallel",
            "--abort-on-list-error",
            "--seed",
            "7",
            "-l",
            "debug",
        ]);

        let mut config = Config::default();
        config.scan.folders.push(PathBuf::from("/from/config"));
        args.apply_to(&mut config);

        assert_eq!(config.scan.folders, vec![PathBuf::from("/photos")]);
        assert!(config.output.json);
        assert!(config.scan.parallel);
        assert!(config.scan.abort_on_list_error);
        assert_eq!(config.scan.seed, 7);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["dupe"]);

        let mut config = Config::default();
        config.scan.folders.push(PathBuf::from("/from/config"));
        config.scan.parallel = true;
        let before = config.clone();
        args.apply_to(&mut config);

        assert_eq!(config, before);
    }
}
