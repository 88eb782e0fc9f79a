use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use colored::Colorize;
use tracing::info;

use dlink_ledger::Account;
use dlink_sdk::{handler_fn, telemetry, Bridge, BridgeConfig, InMemoryLedger, LedgerEvent};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Check(args) => cmd_check(&args, cli.verbose),
        Command::Addresses(args) => cmd_addresses(&args, cli.verbose),
        Command::Simulate(args) => cmd_simulate(args, cli.verbose),
    }
}

/// Load, validate, and install logging for a configuration file.
fn load_config(args: &ConfigArgs, verbose: bool) -> anyhow::Result<BridgeConfig> {
    let mut config = BridgeConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if verbose {
        config.logging.level = "debug".into();
    }
    config.validate()?;
    telemetry::init(&config.logging)?;
    Ok(config)
}

fn cmd_check(args: &ConfigArgs, verbose: bool) -> anyhow::Result<()> {
    let config = match load_config(args, verbose) {
        Ok(config) => config,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), args.config.display());
            return Err(e);
        }
    };
    let (owner, admin) = config.identities()?;
    Account::from_identity(&owner).context("owner seed")?;
    Account::from_identity(&admin).context("admin seed")?;

    let lanes = config.lanes.to_lane_config();
    info!(path = %args.config.display(), "configuration valid");
    println!("{} {} is valid", "✓".green().bold(), args.config.display());
    println!("  Owner curve: {}", owner.curve().as_str().cyan());
    println!("  Admin curve: {}", admin.curve().as_str().cyan());
    println!(
        "  Lanes: poll {:?}, settle {:?}, cooldown {:?}",
        lanes.poll_interval, lanes.settle_delay, lanes.cooldown
    );
    println!(
        "  Subscription retry: {}s, blocking workers: {}",
        config.subscription.retry_delay_secs, config.worker.max_blocking
    );
    Ok(())
}

fn cmd_addresses(args: &ConfigArgs, verbose: bool) -> anyhow::Result<()> {
    let config = load_config(args, verbose)?;
    let (owner, admin) = config.identities()?;
    let owner_account = Account::from_identity(&owner).context("owner seed")?;
    let admin_account = Account::from_identity(&admin).context("admin seed")?;
    println!("owner  {}  ({})", owner_account.address().as_str().yellow(), owner.curve().as_str());
    println!("admin  {}  ({})", admin_account.address().as_str().yellow(), admin.curve().as_str());
    Ok(())
}

fn cmd_simulate(args: SimulateArgs, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(&args.config, verbose)?;
    if args.fast {
        config.lanes.poll_interval_secs = 1;
        config.lanes.settle_delay_secs = 1;
        config.lanes.credential_cooldown_secs = 1;
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(simulate(config, args.states, args.creds))
}

async fn simulate(config: BridgeConfig, states: usize, creds: usize) -> anyhow::Result<()> {
    let ledger = Arc::new(InMemoryLedger::new());
    let bridge = Arc::new(Bridge::from_config(&config, ledger.clone())?);
    let addresses = bridge.addresses().await?;
    info!(
        owner = %addresses.owner.short(),
        admin = %addresses.admin.short(),
        states,
        creds,
        "starting simulation"
    );

    let launch = handler_fn(|event: LedgerEvent| async move {
        println!("{} launch command from {}", "→".cyan(), event.source);
    });
    let users = handler_fn(|event: LedgerEvent| async move {
        let devices = event.payload.as_list().map(<[String]>::len).unwrap_or(0);
        println!("{} device list update: {} device(s)", "→".cyan(), devices);
    });
    let subscription = bridge.subscribe(launch, users);

    let opened = tokio::time::timeout(Duration::from_secs(5), async {
        while ledger.subscriber_count() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    if opened.is_err() {
        subscription.abort();
        bail!("ledger subscription did not open");
    }
    info!("simulated ledger subscription open");
    println!("{} subscription open", "✓".green());

    ledger.grant_devices(&addresses.owner, vec![addresses.admin.clone()]);
    ledger.launch(&addresses.owner, &addresses.admin);

    if creds > 1 {
        let cooldown = config.lanes.credential_cooldown_secs;
        println!("credential lane waits {cooldown}s between queued submissions");
    }

    let state_tasks: Vec<_> = (0..states)
        .map(|i| {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move {
                bridge
                    .send_datalog_states(format!("{{\"state\":{i}}}").into_bytes())
                    .await
            })
        })
        .collect();
    let cred_tasks: Vec<_> = (0..creds)
        .map(|i| {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move {
                bridge
                    .send_datalog_creds(format!("{{\"cred\":{i}}}").into_bytes())
                    .await
            })
        })
        .collect();

    for (label, tasks) in [("state", state_tasks), ("cred", cred_tasks)] {
        for (i, task) in tasks.into_iter().enumerate() {
            match task.await? {
                Some(receipt) => println!("  {label} #{i}: {}", receipt.to_hex().yellow()),
                None => println!("  {label} #{i}: {}", "not submitted".dimmed()),
            }
        }
    }

    match bridge.get_devices_list().await {
        Some(devices) => println!("{} delegated devices: {}", "✓".green(), devices.len()),
        None => println!("{} device list unavailable", "✗".red()),
    }
    println!("ledger holds {} datalog(s)", ledger.record_count().to_string().bold());

    subscription.abort();
    info!(records = ledger.record_count(), "simulation finished");
    Ok(())
}
