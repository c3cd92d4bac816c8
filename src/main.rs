//! paycond - manage and test payment method rules from the terminal

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paycond::admin::{NewRule, RuleAdmin};
use paycond::config::{Settings, ENV_LOG};
use paycond::observer::TracingObserver;
use paycond::store::FileRuleStore;
use paycond::{AdminSignal, PaymentFilter, Request};

/// Country-based payment method rules
#[derive(Parser)]
#[command(name = "paycond", version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, env = "PAYCOND_CONFIG")]
    config: Option<PathBuf>,

    /// Option file holding the rule list
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Option key the rule list is stored under
    #[arg(long, global = true)]
    option_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored rules
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a rule
    Create {
        /// Rule title
        title: String,
        /// Action to apply (enable/disable)
        #[arg(long)]
        action: Option<String>,
        /// Comma-separated payment method ids
        #[arg(long, default_value = "")]
        payment_methods: String,
        /// Comma-separated billing countries
        #[arg(long, default_value = "")]
        countries: String,
    },

    /// Delete a rule by id
    Delete {
        /// Rule id
        id: String,
    },

    /// Run the stored rules against a sample request
    Check {
        /// Available payment method ids
        #[arg(long, value_delimiter = ',', required = true)]
        gateways: Vec<String>,
        /// Request body file, or '-' for stdin
        #[arg(long)]
        body: Option<PathBuf>,
        /// Form field as key=value (repeatable)
        #[arg(long, value_parser = parse_key_val)]
        form: Vec<(String, String)>,
        /// Last known customer billing country
        #[arg(long)]
        customer_country: Option<String>,
        /// Treat as an admin page render
        #[arg(long)]
        admin: bool,
        /// Treat as an asynchronous call
        #[arg(long = "async")]
        is_async: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((key.to_owned(), value.to_owned()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        settings.store_path = store;
    }
    if let Some(key) = cli.option_key {
        settings.option_key = key;
    }
    init_tracing(&settings.log_level);

    let store = settings.rule_store();
    tracing::debug!(path = %store.path().display(), key = store.option_key(), "using rule store");

    match cli.command {
        Commands::List { json } => list(store, json),
        Commands::Create {
            title,
            action,
            payment_methods,
            countries,
        } => {
            let rule = RuleAdmin::new(store).create(NewRule {
                title,
                action,
                payment_methods,
                countries,
            })?;
            println!("Rule created with id: {}", rule.id);
            Ok(())
        }
        Commands::Delete { id } => {
            RuleAdmin::new(store).delete(&id)?;
            println!("Rule deleted.");
            Ok(())
        }
        Commands::Check {
            gateways,
            body,
            form,
            customer_country,
            admin,
            is_async,
            json,
        } => {
            let mut request = match body {
                Some(path) => Request::new().body(read_body(&path)?),
                None => Request::new(),
            };
            for (key, value) in form {
                request = request.form_field(key, value);
            }
            if let Some(country) = customer_country {
                request = request.customer(move || Some(country.clone()));
            }
            check(
                store,
                gateways,
                &request,
                AdminSignal {
                    is_admin: admin,
                    is_async,
                },
                json,
            )
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn read_body(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn list(store: FileRuleStore, json: bool) -> Result<()> {
    let rules = RuleAdmin::new(store).list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }
    if rules.is_empty() {
        bail!("No rules found.");
    }
    println!("{:<34} {:<8} {:<8} TITLE", "ID", "ENABLED", "ACTION");
    for rule in &rules {
        println!(
            "{:<34} {:<8} {:<8} {}",
            rule.id.as_str(),
            rule.enabled,
            rule.action.as_str(),
            rule.title
        );
    }
    Ok(())
}

fn check(
    store: FileRuleStore,
    gateways: Vec<String>,
    request: &Request,
    signal: AdminSignal,
    json: bool,
) -> Result<()> {
    let registry: BTreeMap<String, ()> = gateways.into_iter().map(|g| (g, ())).collect();
    let engine = PaymentFilter::new(store).with_observer(TracingObserver);
    let (available, report) = engine.filter_gateways_detailed(registry, request, signal);
    let available: Vec<&str> = available.keys().map(String::as_str).collect();

    if json {
        let removed: Vec<&str> = report
            .as_ref()
            .map(|r| r.removed_methods())
            .unwrap_or_default();
        let out = serde_json::json!({
            "available": available,
            "removed": removed,
            "country": report.as_ref().and_then(|r| r.country()).map(|c| c.as_str()),
            "filtered": report.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &report {
        Some(report) => println!("{report}"),
        None => println!("filtering skipped"),
    }
    println!("available: {}", available.join(", "));
    Ok(())
}
