mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use nbspace_core::config::{CredentialConfig, PathsConfig, PortConfig};
use nbspace_core::{observability, NotebookBasic, RequestContext};
use nbspace_space::credential::KeyedTokenCodec;
use nbspace_space::layout::PathLayout;
use nbspace_space::EnvironmentPreparer;

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    let paths = match cli.root.as_deref() {
        Some(root) => PathsConfig::under(root),
        None => PathsConfig::from_env(),
    };
    let credentials = CredentialConfig::from_env();
    tracing::debug!(
        "Roots: containers={} notebooks={} store={}",
        paths.container_root.display(),
        paths.container_nb_root.display(),
        paths.store_root.display()
    );

    match cli.command {
        Commands::Prepare {
            name,
            version,
            request_id,
            token,
            view,
            json,
        } => {
            let preparer =
                EnvironmentPreparer::from_config(&paths, &credentials, &PortConfig::from_env())
                    .context("Invalid directory configuration")?;
            let notebook = NotebookBasic::new(name, version);
            let ctx = RequestContext::new(request_id, token, view);
            let env = preparer
                .prepare(&notebook, &ctx)
                .with_context(|| format!("Failed to prepare {}", notebook.fqn()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&env)?);
            } else {
                println!("build_dir:   {}", env.build_dir.display());
                println!("content_dir: {}", env.content_dir.display());
                println!("port:        {}", env.port);
            }
        }
        Commands::Layout {
            name,
            version,
            request_id,
        } => {
            let layout =
                PathLayout::from_config(&paths).context("Invalid directory configuration")?;
            let notebook = NotebookBasic::new(name, version);
            let pair = layout.resolve(&request_id, &notebook)?;
            println!("build_dir:   {}", pair.build_dir.display());
            println!("content_dir: {}", pair.content_dir.display());
        }
        Commands::Verify => {
            let preparer =
                EnvironmentPreparer::from_config(&paths, &credentials, &PortConfig::from_env())
                    .context("Invalid directory configuration")?;
            if preparer.verify_integrity() {
                println!("docker and docker-compose are available");
            } else {
                eprintln!("docker and/or docker-compose are missing");
                std::process::exit(1);
            }
        }
        Commands::EncodeToken { token } => {
            let codec = KeyedTokenCodec::from_config(&credentials);
            println!("{}", codec.encode(&token).context("Failed to encode token")?);
        }
    }

    Ok(())
}
