use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use no_nonsense::toggles::{FEATURE_TOGGLES, RecordingHookRegistry};
use no_nonsense::{
    FileSettingsStore, Host, NoNonsense, PluginConfig, RequestContext, RequestOutcome,
    SettingsStore, core::is_truthy,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "no-nonsense")]
#[command(about = "Inspect and drive the No Nonsense settings lifecycle against a settings file")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Settings file, overrides the configured location
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Running plugin version, overrides the configured one
    #[arg(long, global = true)]
    running_version: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the activation callback
    Activate,
    /// Simulate a request: XML-RPC check, gated update pass and feature toggles
    Load {
        /// Treat the request as a public page view
        #[arg(long, conflicts_with = "xmlrpc")]
        public: bool,
        /// Treat the request as an XML-RPC call
        #[arg(long)]
        xmlrpc: bool,
    },
    /// Force an update pass regardless of the stored version
    Migrate {
        /// Also run when the stored version is newer than the running one
        #[arg(long)]
        force: bool,
    },
    /// Render and clear queued admin notices
    Notices,
    /// Print stored and running versions
    Version,
    /// List feature toggles and whether they are enabled
    Toggles,
    /// Print every stored option
    List,
    /// Print one option (full key)
    Get { key: String },
    /// Store one option, the value is parsed as JSON
    Set { key: String, value: String },
    /// Remove one option
    Delete { key: String },
}

/// Host stand-in for the command line: effects are only logged.
struct CliHost;

impl Host for CliHost {
    fn flush_rewrite_rules(&self) {
        tracing::info!("host asked to flush rewrite rules");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let store = Arc::new(
        FileSettingsStore::open_with_format(&config.store_path, config.resolved_store_format())
            .with_context(|| format!("Failed to open settings file '{}'", config.store_path.display()))?,
    );
    let plugin = NoNonsense::new(config, store.clone(), Arc::new(CliHost))
        .context("Failed to initialize plugin")?;

    match cli.command {
        Command::Activate => {
            plugin.on_activation()?;
            println!("Activated {}", plugin.migrator().running_version());
            Ok(())
        }
        Command::Load { public, xmlrpc } => load(&plugin, public, xmlrpc),
        Command::Migrate { force } => {
            if plugin.migrator().stored_is_newer()? {
                if !force {
                    bail!(
                        "Stored settings were written by a newer version than {}, pass --force to downgrade the record",
                        plugin.migrator().running_version()
                    );
                }
                tracing::warn!(
                    running_version = %plugin.migrator().running_version(),
                    "forcing an update pass over settings from a newer version"
                );
            }
            let report = plugin.migrator().run_migration()?;
            println!(
                "Migrated {} -> {}",
                report
                    .previous_version
                    .as_ref()
                    .map(|v| v.as_str())
                    .unwrap_or("(none)"),
                report.current_version
            );
            for rule in report.applied_rules {
                println!("  applied: {}", rule);
            }
            Ok(())
        }
        Command::Notices => {
            let mut stdout = io::stdout().lock();
            let count = plugin.on_admin_notices(&mut stdout)?;
            println!();
            eprintln!("{} notice(s) rendered", count);
            Ok(())
        }
        Command::Version => {
            let stored = plugin.migrator().stored_version()?;
            println!("running: {}", plugin.migrator().running_version());
            println!(
                "stored:  {}",
                stored.as_ref().map(|v| v.as_str()).unwrap_or("(none)")
            );
            Ok(())
        }
        Command::Toggles => {
            let keys = plugin.config().keys();
            for toggle in FEATURE_TOGGLES {
                let enabled = store
                    .get(&keys.option(toggle.key))?
                    .map(|value| is_truthy(&value))
                    .unwrap_or(false);
                println!(
                    "[{}] {:<28} {}",
                    if enabled { "x" } else { " " },
                    toggle.key,
                    toggle.label
                );
            }
            Ok(())
        }
        Command::List => {
            for key in store.keys()? {
                let value = store.get(&key)?.unwrap_or_default();
                println!("{} = {}", key, value);
            }
            Ok(())
        }
        Command::Get { key } => {
            let value = store
                .get(&key)?
                .ok_or_else(|| anyhow!("Option '{}' is not set", key))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Command::Set { key, value } => {
            let parsed = serde_json::from_str(&value)
                .with_context(|| format!("Value for '{}' is not valid JSON", key))?;
            store.set(&key, parsed)?;
            Ok(())
        }
        Command::Delete { key } => {
            if !store.delete(&key)? {
                eprintln!("Option '{}' was not set", key);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<PluginConfig> {
    let mut config = match &cli.config {
        Some(path) => PluginConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => PluginConfig::new(),
    };
    if let Some(store) = &cli.store {
        config = config.store_path(store.clone());
    }
    if let Some(version) = &cli.running_version {
        config = config.running_version(version);
    }
    config.validate()?;
    Ok(config)
}

fn load(plugin: &NoNonsense, public: bool, xmlrpc: bool) -> Result<()> {
    let ctx = if xmlrpc {
        RequestContext::xmlrpc()
    } else if public {
        RequestContext::public()
    } else {
        RequestContext::admin()
    };

    if let RequestOutcome::Reject(status) = plugin.on_request_start(&ctx)? {
        println!("Request rejected with HTTP {}", status);
        return Ok(());
    }

    let mut registry = RecordingHookRegistry::new();
    let state = plugin.on_plugins_loaded(&ctx, &mut registry)?;
    match state.migration {
        Some(report) => println!(
            "Update pass ran ({} rule(s) applied), now at {}",
            report.applied_rules.len(),
            report.current_version
        ),
        None => println!("No update pass needed"),
    }
    for change in registry.changes() {
        println!("  {:?}", change);
    }
    Ok(())
}
