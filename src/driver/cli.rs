//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::Parser;

use crate::adapter::config::DEFAULT_CONFIG_PATH;

/// アセンブリファイルをバッチにアップロードしてプロファイリングを起動するCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "contigsync")]
#[command(about = "Upload genome assemblies to a profiling batch and start profiling", long_about = None)]
pub struct Args {
    /// Assembly files or directories to stage (.fasta, .fa, .fna)
    pub paths: Vec<String>,

    /// Reference database to profile against
    #[arg(short, long)]
    pub database: Option<String>,

    /// Occurrence threshold sent with the profiling request
    #[arg(long)]
    pub occurrence: Option<String>,

    /// Look up an existing batch by id instead of starting a session
    #[arg(long, value_name = "BATCH_ID")]
    pub lookup: Option<String>,

    /// Wait for every upload to finish before submitting profiling
    #[arg(long)]
    pub wait: bool,

    /// Dry run mode - don't contact the server
    #[arg(long)]
    pub dry_run: bool,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["contigsync"]);
        assert_eq!(args.config, "./.contigsync/config.json");
        assert!(args.paths.is_empty());
        assert!(args.database.is_none());
        assert!(args.occurrence.is_none());
        assert!(!args.dry_run);
        assert!(!args.wait);
    }

    #[test]
    fn test_args_session() {
        let args = Args::parse_from([
            "contigsync",
            "-d",
            "salmonella",
            "--occurrence",
            "90",
            "contigs/",
            "extra.fna",
        ]);
        assert_eq!(args.paths, vec!["contigs/", "extra.fna"]);
        assert_eq!(args.database.as_deref(), Some("salmonella"));
        assert_eq!(args.occurrence.as_deref(), Some("90"));
    }

    #[test]
    fn test_args_lookup() {
        let args = Args::parse_from(["contigsync", "--lookup", "b-42", "--dry-run"]);
        assert_eq!(args.lookup.as_deref(), Some("b-42"));
        assert!(args.dry_run);
    }

    #[test]
    fn test_args_custom_config() {
        let args = Args::parse_from(["contigsync", "-c", "/custom/config.json", "--wait"]);
        assert_eq!(args.config, "/custom/config.json");
        assert!(args.wait);
    }
}
