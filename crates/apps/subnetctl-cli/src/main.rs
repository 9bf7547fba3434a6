//! subnetctl binary entry point.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use subnetctl_cli::{
    cli::{Cli, Commands, KeyCommands, TransactionCommands},
    commands::{self, DeployArgs, JoinArgs, TransformArgs},
    config::{default_config_path, CliConfig},
    context::SubnetContext,
    error::{CliError, CliResult},
    output::OutputFormat,
};

fn main() {
    // Parse CLI arguments BEFORE creating tokio runtime
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let e = CliError::from(e);
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    };
    rt.block_on(async_main(cli));
}

async fn async_main(cli: Cli) {
    // Initialize logging based on --verbose flag or RUST_LOG env var
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if cli.verbose || has_rust_log {
        let mut filter = EnvFilter::from_default_env();
        if cli.verbose {
            if let Ok(directive) = "subnetctl=debug".parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<String> {
    let format: OutputFormat = cli.format.into();
    let simulate = cli.simulate_public;

    // Completions need neither config nor store.
    if let Commands::Completions { shell } = cli.command {
        return commands::completions(shell);
    }

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = CliConfig::load(&config_path)?;
    let ctx = SubnetContext::open(config)?;

    match cli.command {
        // Subnet configuration
        Commands::Create {
            name,
            genesis,
            vm_version,
            custom_vm,
            token_name,
            force,
        } => {
            commands::create(
                &ctx, format, &name, &genesis, vm_version, custom_vm, token_name, force,
            )
            .await
        }
        Commands::Configure {
            name,
            chain_config,
            per_node_chain_config,
        } => commands::configure(
            &ctx,
            format,
            &name,
            chain_config.as_deref(),
            per_node_chain_config.as_deref(),
        ),
        Commands::Delete { name, force } => commands::delete(&ctx, format, &name, force),
        Commands::Import { source, name } => {
            commands::import(&ctx, format, &source, name.as_deref()).await
        }
        Commands::Describe { name } => commands::describe(&ctx, format, &name),
        Commands::List => commands::list(&ctx, format),

        // Deployment
        Commands::Deploy {
            name,
            network,
            control_keys,
            threshold,
            runtime_version,
            mainnet_chain_id,
            key,
            auth,
        } => {
            let args = DeployArgs {
                control_keys,
                threshold,
                subnet_auth_keys: auth.subnet_auth_keys,
                runtime_version,
                mainnet_chain_id,
                key,
                output_tx_path: auth.output_tx_path,
            };
            commands::deploy(&ctx, format, &name, network.selection(simulate), args).await
        }
        Commands::Join {
            name,
            network,
            node_config,
            plugin_dir,
            force_write,
            elastic,
            node_id,
            stake,
            key,
        } => {
            let args = JoinArgs {
                node_config,
                plugin_dir,
                force_write,
                elastic,
                node_id,
                stake,
                key,
            };
            commands::join(&ctx, format, &name, network.selection(simulate), args).await
        }
        Commands::AddValidator {
            name,
            network,
            node_id,
            weight,
            start_time,
            duration,
            auth,
        } => {
            commands::add_validator(
                &ctx,
                format,
                &name,
                network.selection(simulate),
                node_id,
                weight,
                start_time,
                duration,
                auth,
            )
            .await
        }
        Commands::RemoveValidator {
            name,
            network,
            node_id,
            auth,
        } => {
            commands::remove_validator(
                &ctx,
                format,
                &name,
                network.selection(simulate),
                node_id,
                auth,
            )
            .await
        }
        Commands::Transform {
            name,
            network,
            token_name,
            token_symbol,
            denomination,
            elastic_config,
            transform_validators,
            key,
            auth,
        } => {
            let args = TransformArgs {
                token_name,
                token_symbol,
                denomination,
                elastic_config,
                transform_validators,
                key,
                auth,
            };
            commands::transform(&ctx, format, &name, network.selection(simulate), args).await
        }
        Commands::Delegate {
            name,
            network,
            node_id,
            stake_amount,
            duration,
            start_time,
            key,
        } => {
            commands::delegate(
                &ctx,
                format,
                &name,
                network.selection(simulate),
                node_id,
                stake_amount,
                duration,
                start_time,
                key,
            )
            .await
        }
        Commands::Register {
            name,
            network,
            subnet_id,
            chain_id,
            control_keys,
            threshold,
            force,
        } => commands::register(
            &ctx,
            format,
            &name,
            network.selection(simulate),
            &subnet_id,
            chain_id.as_deref(),
            control_keys,
            threshold,
            force,
        ),

        // Network queries
        Commands::Validators { name, network } => {
            commands::validators(&ctx, format, &name, network.selection(simulate)).await
        }
        Commands::Stats { name, network } => {
            commands::stats(&ctx, format, &name, network.selection(simulate)).await
        }

        // Transactions and keys
        Commands::Transaction(TransactionCommands::Sign { path, key }) => {
            commands::sign(&ctx, format, &path, &key)
        }
        Commands::Transaction(TransactionCommands::Commit { path }) => {
            commands::commit(&ctx, format, &path).await
        }
        Commands::Key(KeyCommands::Import { name, file, force }) => {
            commands::key_import(&ctx, format, &name, &file, force)
        }
        Commands::Key(KeyCommands::List) => commands::key_list(&ctx, format),
        Commands::Key(KeyCommands::Delete { name, force }) => {
            commands::key_delete(&ctx, format, &name, force)
        }

        Commands::Completions { .. } => Ok(String::new()),
    }
}

/// Print a user-friendly error message with error code and recovery hint.
fn print_error(e: &CliError) {
    let code = e.error_code();

    // Error line with code
    eprintln!(
        "{} [{}]: {}",
        "Error".red().bold(),
        code.to_string().yellow(),
        e
    );

    // Output captured from the node
    if let Some(diagnostics) = e.diagnostics() {
        eprintln!("{}\n{}", "Node output:".dimmed(), diagnostics);
    }

    // Suggestion if available
    if let Some(suggestion) = code.suggestion() {
        eprintln!("{}: {}", "Hint".cyan(), suggestion);
    }
}
