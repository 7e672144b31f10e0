use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::ffi::OsString;
use std::path::PathBuf;

/// CLI arguments for lila-server
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub memory: bool,
}

impl CliArgs {
    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Self::command().get_matches();

        // Handle special help for environment variables
        if matches.get_flag("help_env") {
            Self::print_env_help();
            std::process::exit(0);
        }

        Self::from_matches(&matches)
    }

    /// Parse from an explicit argument list
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            host: matches.get_one::<String>("host").cloned(),
            port: matches.get_one::<u16>("port").copied(),
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            log_level: matches.get_one::<String>("log_level").cloned(),
            log_format: matches.get_one::<String>("log_format").cloned(),
            memory: matches.get_flag("memory"),
        }
    }

    pub fn command() -> Command {
        Command::new("lila-server")
            .version(lila::VERSION)
            .author("Lila Contributors")
            .about("MCP server for the Lila persona relationship graph")
            .long_about(
                r#"Lila Server exposes personas, relationships, interactions and goals as
MCP resources, tools and prompts over JSON-RPC (POST /mcp).

Storage is SurrealDB when reachable. When the database cannot be reached at
startup the server continues on an in-memory store seeded with demo data,
unless storage.fallback_on_unavailable is disabled.

Command line arguments take precedence over environment variables, which
take precedence over configuration files.

Examples:
  lila-server --port 9000
  lila-server --config lila.toml --log-level debug
  lila-server --memory --log-format pretty"#,
            )
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("HOST")
                    .help("Address to bind")
                    .long_help(
                        "Host name or address for the HTTP server to bind.
Environment variable: LILA_HOST",
                    )
                    .value_hint(ValueHint::Hostname),
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .long_help(
                        "Port number for the HTTP server to listen on.
Environment variable: LILA_PORT",
                    )
                    .value_hint(ValueHint::Other)
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .long_help(
                        "Path to a TOML, YAML or JSON configuration file. It is layered
over lila.toml/lila.yaml/lila.json in the working directory and under
LILA_* environment variables.
Environment variable: LILA_CONFIG_FILE",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Logging level")
                    .long_help(
                        "Set the logging level. Valid values: error, warn, info, debug, trace
RUST_LOG, when set, takes precedence.",
                    )
                    .value_parser(["error", "warn", "info", "debug", "trace"]),
            )
            .arg(
                Arg::new("log_format")
                    .long("log-format")
                    .value_name("FORMAT")
                    .help("Log output format")
                    .value_parser(["compact", "pretty", "json"]),
            )
            .arg(
                Arg::new("memory")
                    .long("memory")
                    .help("Serve from the in-memory store")
                    .long_help(
                        "Skip SurrealDB and serve from the in-memory store seeded with the
demo personas. Data is lost on exit.",
                    )
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("help_env")
                    .long("help-env")
                    .help("Show all environment variables")
                    .action(ArgAction::SetTrue),
            )
    }

    /// Print environment variable help
    fn print_env_help() {
        println!("Lila Server Environment Variables");
        println!("=================================");
        println!();
        println!("Server:");
        println!("  LILA_HOST                          - Bind address (default: localhost)");
        println!("  LILA_PORT                          - Server port (default: 8765)");
        println!("  LILA_CONFIG_FILE                   - Path to config file");
        println!();
        println!("Storage (nested keys are separated by __):");
        println!("  LILA_STORAGE__BACKEND              - surrealdb or memory (default: surrealdb)");
        println!("  LILA_STORAGE__FALLBACK_ON_UNAVAILABLE - Continue in memory if SurrealDB is down (default: true)");
        println!("  LILA_STORAGE__SEED_DEMO_DATA       - Seed the in-memory store (default: true)");
        println!("  LILA_STORAGE__MISSING_RELATIONSHIP - reject or create_default");
        println!("  LILA_STORAGE__SURREALDB__MAX_CONNECT_ATTEMPTS - Connection attempts (default: 30)");
        println!("  LILA_STORAGE__SURREALDB__RETRY_DELAY - Delay between attempts (default: 2s)");
        println!();
        println!("SurrealDB shortcuts:");
        println!("  SURREALDB_URL                      - Endpoint (default: ws://localhost:8000)");
        println!("  SURREALDB_NAMESPACE                - Namespace (default: lila)");
        println!("  SURREALDB_DATABASE                 - Database (default: relationships)");
        println!("  SURREALDB_USERNAME                 - Root username");
        println!("  SURREALDB_PASSWORD                 - Root password");
        println!();
        println!("Logging:");
        println!("  LILA_LOGGING__LEVEL                - error, warn, info, debug, trace");
        println!("  LILA_LOGGING__FORMAT               - compact, pretty, json");
        println!("  LILA_LOGGING__FILE                 - Also write logs to this file");
        println!("  RUST_LOG                           - Filter directives; overrides the level");
        println!();
        println!("Note: Command line arguments take precedence over environment variables.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::try_parse_from([
            "lila-server",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--config",
            "lila.toml",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--memory",
        ])
        .unwrap();

        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.config_file, Some(PathBuf::from("lila.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert!(args.memory);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(CliArgs::try_parse_from(["lila-server", "--log-level", "loud"]).is_err());
        let args = CliArgs::try_parse_from(["lila-server"]).unwrap();
        assert!(!args.memory);
        assert!(args.port.is_none());
    }
}
