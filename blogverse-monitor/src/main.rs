//! Blogverse storage monitor.
//!
//! Inspects and maintains a RocksDB-backed Blogverse store from the shell.
//!
//! ```text
//! blogverse-monitor [--data-dir DIR] [--config FILE] [--quota BYTES] <COMMAND>
//!
//!   usage          used / total, status level, warning
//!   cleanup        sweep transient keys (_temp_, _cache_, _backup)
//!   keys           resident keys with sizes and flags
//!   get <KEY>      print the decoded JSON value
//!   remove <KEY>   delete one key
//! ```
//!
//! Set `RUST_LOG=debug` to see policy decisions made by the store.

mod report;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use blogverse_store::codec;
use blogverse_store::policy::is_sweep_eligible;
use blogverse_store::{format_bytes, BoundedStore, RocksMedium, StorageMedium};
use clap::{Parser, Subcommand};
use serde_json::Value;

use report::KeyRow;
use settings::MonitorSettings;

#[derive(Parser, Debug)]
#[command(name = "blogverse-monitor", version, about = "Inspect and maintain Blogverse storage")]
struct Cli {
    /// RocksDB data directory (overrides the settings file)
    #[arg(long, env = "BLOGVERSE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, short = 'c', env = "BLOGVERSE_CONFIG")]
    config: Option<PathBuf>,

    /// Quota in bytes, enforced by the medium and used as the usage total
    /// (overrides the settings file)
    #[arg(long)]
    quota: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show storage usage
    Usage,
    /// Remove transient keys
    Cleanup,
    /// List resident keys
    Keys,
    /// Print the value stored under a key
    Get { key: String },
    /// Delete a key
    Remove { key: String },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => MonitorSettings::load(path)?,
        None => MonitorSettings::default(),
    };
    if let Some(dir) = cli.data_dir {
        settings.medium.data_dir = dir;
    }
    if let Some(quota) = cli.quota {
        settings.set_quota(quota);
    }

    let medium = RocksMedium::open(settings.rocks_config())?;
    log::info!(
        "Opened store at {} (quota {})",
        medium.path().display(),
        format_bytes(medium.quota())
    );
    let store = BoundedStore::new(medium, settings.store);

    let output = execute(&store, cli.command)?;
    print!("{output}");
    Ok(())
}

/// Run one command against the store and render its output.
fn execute<M: StorageMedium>(
    store: &BoundedStore<M>,
    command: Command,
) -> Result<String, Box<dyn std::error::Error>> {
    match command {
        Command::Usage => Ok(report::usage_report(&store.usage_info())),
        Command::Cleanup => {
            let before = store.usage_info();
            let removed = store.cleanup();
            let after = store.usage_info();
            Ok(report::cleanup_report(removed, &before, &after))
        }
        Command::Keys => Ok(report::keys_report(&key_rows(store)?)),
        Command::Get { key } => match store.load::<Option<Value>>(&key, None) {
            Some(value) => Ok(format!("{}\n", serde_json::to_string_pretty(&value)?)),
            None => Ok(format!("No readable entry for key {key}\n")),
        },
        Command::Remove { key } => {
            store.remove(&key);
            Ok(format!("Removed {key}\n"))
        }
    }
}

fn key_rows<M: StorageMedium>(store: &BoundedStore<M>) -> Result<Vec<KeyRow>, Box<dyn std::error::Error>> {
    let medium = store.medium();
    let mut keys = medium.keys()?;
    keys.sort();

    let mut rows = Vec::with_capacity(keys.len());
    for key in keys {
        // Raced with a concurrent remove
        let Some(entry) = medium.get(&key)? else {
            continue;
        };
        rows.push(KeyRow {
            size: (key.len() + entry.len()) as u64,
            compressed: codec::is_compressed(&entry),
            transient: is_sweep_eligible(&key, &store.config().sweep_markers),
            key,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogverse_store::{MemoryMedium, RocksConfig, SaveOptions, StoreConfig};
    use serde_json::json;

    fn seeded_store() -> BoundedStore<MemoryMedium> {
        let store = BoundedStore::new(MemoryMedium::default(), StoreConfig::for_testing());
        let blogs: Vec<Value> = (0..20)
            .map(|i| json!({ "id": i, "content": "lorem ipsum ".repeat(50) }))
            .collect();
        assert!(store.save_primary("blogverse_blogs", &blogs));
        assert!(store.save("blogverse_user", &json!({ "name": "Ada" }), &SaveOptions::plain()));
        assert!(store.save("blogverse_temp_draft", &json!("scratch"), &SaveOptions::plain()));
        store
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["blogverse-monitor", "--quota", "1024", "get", "blogverse_user"]).unwrap();
        assert_eq!(cli.quota, Some(1024));
        assert!(matches!(cli.command, Command::Get { ref key } if key == "blogverse_user"));

        assert!(Cli::try_parse_from(["blogverse-monitor"]).is_err());
    }

    #[test]
    fn test_key_rows_flags() {
        let store = seeded_store();
        let rows = key_rows(&store).unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(names, ["blogverse_blogs", "blogverse_temp_draft", "blogverse_user"]);
        assert!(rows[0].compressed);
        assert!(!rows[0].transient);
        assert!(rows[1].transient);
        assert!(!rows[2].compressed);

        let total: u64 = rows.iter().map(|r| r.size).sum();
        assert_eq!(total, store.usage_info().used);
    }

    #[test]
    fn test_cleanup_command() {
        let store = seeded_store();
        let output = execute(&store, Command::Cleanup).unwrap();
        assert!(output.starts_with("Removed 1 transient key"));
        assert_eq!(store.medium().len(), 2);
    }

    #[test]
    fn test_get_and_remove_commands() {
        let store = seeded_store();

        let output = execute(&store, Command::Get { key: "blogverse_user".into() }).unwrap();
        assert!(output.contains("\"name\": \"Ada\""));

        execute(&store, Command::Remove { key: "blogverse_user".into() }).unwrap();
        let output = execute(&store, Command::Get { key: "blogverse_user".into() }).unwrap();
        assert_eq!(output, "No readable entry for key blogverse_user\n");
    }

    #[test]
    fn test_usage_on_rocks_medium() {
        let dir = tempfile::tempdir().unwrap();
        let medium = RocksMedium::open(RocksConfig::for_testing(dir.path())).unwrap();
        let store = BoundedStore::new(medium, StoreConfig::for_testing());
        assert!(store.save_primary("blogverse_user", &json!({ "name": "Ada" })));

        let output = execute(&store, Command::Usage).unwrap();
        assert!(output.starts_with("Storage used: "));
        assert!(output.contains("Good"));
    }

    #[test]
    fn test_quota_flag_drives_reported_total() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = MonitorSettings::default();
        settings.medium.data_dir = dir.path().join("db");
        settings.set_quota(4096);

        let medium = RocksMedium::open(settings.rocks_config()).unwrap();
        assert_eq!(medium.quota(), 4096);
        let store = BoundedStore::new(medium, settings.store);
        assert!(store.save("blogverse_user", &json!({ "bio": "x".repeat(3800) }), &SaveOptions::plain()));

        let output = execute(&store, Command::Usage).unwrap();
        assert!(output.starts_with("Storage used: "));
        assert!(output.contains(" / 4 KB ("));
        assert!(output.contains("Critical"));
    }
}
