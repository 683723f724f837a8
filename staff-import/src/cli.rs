//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Import staff accounts, profile photos and weekly timetables from a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "staff-import", version, about)]
pub struct Cli {
    /// Workbook to import [default: college.xlsx]
    pub file: Option<PathBuf>,

    /// Worksheet to read (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// TOML file with import settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase service-role key
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_role_key: Option<String>,

    /// Storage bucket for profile photos [default: avatars]
    #[arg(long)]
    pub bucket: Option<String>,

    /// Directory that file names in the `Photo` column are relative to [default: photos]
    #[arg(long)]
    pub photo_dir: Option<PathBuf>,

    /// Lookups made while waiting for a new account's staff row [default: 10]
    #[arg(long)]
    pub poll_attempts: Option<u32>,

    /// Milliseconds between staff row lookups [default: 500]
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Stop at the first backend error instead of skipping to the next row
    #[arg(long)]
    pub fail_fast: bool,

    /// Read and transform the sheet without calling the backend
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "staff-import",
            "staff.xlsx",
            "--sheet",
            "Sheet1",
            "--poll-attempts",
            "3",
            "--fail-fast",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("staff.xlsx")));
        assert_eq!(cli.sheet.as_deref(), Some("Sheet1"));
        assert_eq!(cli.poll_attempts, Some(3));
        assert!(cli.fail_fast);
        assert!(!cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["staff-import", "--bogus"]).is_err());
    }
}
