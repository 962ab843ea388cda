use std::path::PathBuf;

use clap::{ArgAction, Parser};
use monetizer_core::DisclosureStyle;

/// Rewrite affiliate links in HTML documents.
#[derive(Debug, Parser)]
#[command(name = "monetize", version, about)]
pub struct Cli {
    /// HTML files to monetize. A single `-` reads stdin and writes stdout.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory that receives monetized documents and the ledger.
    #[arg(short, long, default_value = "monetized")]
    pub out_dir: PathBuf,

    /// RON router settings; missing values fall back to the environment.
    #[arg(short, long, env = "MONETIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Brand key selecting a brand-specific Amazon tag.
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Worker threads (defaults to available parallelism).
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Monetize documents the ledger marks as already processed.
    #[arg(long)]
    pub force: bool,

    /// Prepend an affiliate disclosure (`short` or `long`) to monetized documents.
    #[arg(long)]
    pub disclosure: Option<DisclosureStyle>,

    /// Print per-document stats as JSON instead of the text summary.
    #[arg(long)]
    pub stats_json: bool,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn reads_stdin(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_options() {
        let cli = Cli::try_parse_from([
            "monetize",
            "--disclosure",
            "long",
            "-j",
            "3",
            "-vv",
            "a.html",
            "b.html",
        ])
        .unwrap();
        assert_eq!(cli.disclosure, Some(DisclosureStyle::Long));
        assert_eq!(cli.jobs, Some(3));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.inputs.len(), 2);
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn dash_means_stdin() {
        let cli = Cli::try_parse_from(["monetize", "-"]).unwrap();
        assert!(cli.reads_stdin());
        assert!(Cli::try_parse_from(["monetize", "--disclosure", "tiny", "x.html"]).is_err());
    }
}
