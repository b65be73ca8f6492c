//! CLI argument parsing for the roundtrip-worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::services::matching::GapModel;

#[derive(Parser)]
#[command(name = "roundtrip-worker", about = "Triangulation matching worker for container trucking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one optimization batch over an unload and a load job file
    Optimize {
        /// Unload (destination-side) job file, JSON or CSV
        #[arg(long)]
        dest: PathBuf,

        /// Load (origin-side) job file, JSON or CSV
        #[arg(long)]
        orig: PathBuf,

        /// Where to write the result JSON (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// How the unload-to-load time gap is estimated
        #[arg(long, value_enum, default_value = "duration-aware")]
        gap_model: GapModel,
    },
    /// List the branch codes the registry knows
    Branches,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_optimize_command_parses() {
        let cli = Cli::parse_from([
            "roundtrip-worker",
            "optimize",
            "--dest",
            "dest.json",
            "--orig",
            "orig.csv",
        ]);
        match cli.command {
            Command::Optimize { dest, orig, output, gap_model } => {
                assert_eq!(dest, PathBuf::from("dest.json"));
                assert_eq!(orig, PathBuf::from("orig.csv"));
                assert!(output.is_none());
                assert_eq!(gap_model, GapModel::DurationAware);
            }
            _ => panic!("expected optimize command"),
        }
    }

    #[test]
    fn test_cli_gap_model_flag_parses() {
        let cli = Cli::parse_from([
            "roundtrip-worker",
            "optimize",
            "--dest",
            "d.json",
            "--orig",
            "o.json",
            "--gap-model",
            "schedule-only",
        ]);
        match cli.command {
            Command::Optimize { gap_model, .. } => {
                assert_eq!(gap_model, GapModel::ScheduleOnly);
            }
            _ => panic!("expected optimize command"),
        }
    }

    #[test]
    fn test_cli_branches_command_parses() {
        let cli = Cli::parse_from(["roundtrip-worker", "branches"]);
        assert!(matches!(cli.command, Command::Branches));
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["roundtrip-worker"]).is_err());
    }
}
