//! Command line [`Args`] of the host dashboard server.

use clap::Parser;

/// Server of the parking host dashboard.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    ///
    /// Missing file is fine: defaults and `CONF.*` environment variables
    /// are used then.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Applies pending database migrations and exits without serving.
    #[arg(long)]
    pub migrate_only: bool,
}

impl Args {
    /// Parses [`Args`] of the current process.
    ///
    /// # Errors
    ///
    /// Errors if the provided arguments are unknown or malformed.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults_to_serving_with_local_config() {
        let args = Args::try_parse_from(["host-dashboard"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(!args.migrate_only);
    }

    #[test]
    fn accepts_config_path_and_migrate_only() {
        let args = Args::try_parse_from([
            "host-dashboard",
            "-c",
            "/etc/dashboard.toml",
            "--migrate-only",
        ])
        .unwrap();

        assert_eq!(args.config, "/etc/dashboard.toml");
        assert!(args.migrate_only);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["host-dashboard", "--serve"]).is_err());
    }
}
