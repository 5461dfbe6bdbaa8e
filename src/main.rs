use anyhow::Context;
use clap::Parser;
use docker_cr::cli::Cli;
use docker_cr::config::Config;
use docker_cr::engine::criu::CriuEngine;
use docker_cr::engine::CheckpointEngine;
use docker_cr::error::CrError;
use docker_cr::facts::extract_running;
use docker_cr::lifecycle::{checkpoint_with_facts, Recreation, RestoreManager};
use docker_cr::runtime::docker::DockerRuntime;
use docker_cr::snapshot::SnapshotOrchestrator;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .init();

    let config = Config::from_env();
    let runtime = DockerRuntime::connect().context("Failed to connect to Docker")?;
    let engine = CriuEngine::new(config.criu_binary.clone());
    if !engine.is_available() {
        tracing::warn!(
            engine = engine.engine_name(),
            binary = %config.criu_binary,
            "Engine check failed; checkpoint/restore will likely fail"
        );
    }
    let orchestrator = SnapshotOrchestrator::new(engine);

    let result = if cli.restore {
        run_restore(&cli, &config, &runtime, &orchestrator).await
    } else {
        run_checkpoint(&cli, &config, &runtime, &orchestrator).await
    };

    if let Err(e) = result {
        if let Some(log) = e.engine_log() {
            eprintln!("CRIU log:\n{}", log);
        }
        return Err(e.into());
    }
    Ok(())
}

async fn run_checkpoint(
    cli: &Cli,
    config: &Config,
    runtime: &DockerRuntime,
    orchestrator: &SnapshotOrchestrator<CriuEngine>,
) -> Result<(), CrError> {
    let request = cli.checkpoint_request(config);
    let facts = extract_running(runtime, &request.container).await?;
    println!("{}\n", facts);

    let outcome = checkpoint_with_facts(orchestrator, facts, &request).await?;
    println!("Checkpoint stored in {}", outcome.directory.path().display());
    println!("Checkpoint contents:");
    for image in &outcome.images {
        println!("  {} ({} bytes)", image.name, image.size);
    }
    Ok(())
}

async fn run_restore(
    cli: &Cli,
    config: &Config,
    runtime: &DockerRuntime,
    orchestrator: &SnapshotOrchestrator<CriuEngine>,
) -> Result<(), CrError> {
    let request = cli.restore_request(config);
    let manager = RestoreManager::new(runtime, orchestrator, config.placeholder_image.clone());
    let report = manager.restore(&request).await?;

    if let Some(metadata) = &report.metadata {
        println!("{}\n", metadata);
    }

    match &report.recreation {
        Recreation::Cloned { from } => {
            println!("Created {} from the configuration of {}", request.new_name, from)
        }
        Recreation::Placeholder => println!(
            "Created {} from placeholder image {}",
            request.new_name, config.placeholder_image
        ),
    }
    if let Some((recorded, recreated)) = &report.cgroup_divergence {
        println!(
            "Cgroup path changed: checkpoint {}, restored container {}",
            recorded, recreated
        );
    }
    println!("Restore completed from {}\n", report.directory.display());

    match &report.verification {
        Ok(verification) => println!("{}", verification),
        Err(e) => println!("Warning: {}", e),
    }
    Ok(())
}
