//! cmai - CLI entry point.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cmai::commit::{DiffPayload, generate_commit_message};
use cmai::config::{ConfigStore, Settings, request_timeout};
use cmai::error::ConfigError;
use cmai::git::{GitStagedChanges, commit_staged, format_dry_run, push_origin};
use cmai::llm::{HttpTransport, Provider, check_ollama_ready};
use cmai::templates::TemplateStore;

/// Generate a conventional commit message for your changes using an LLM.
#[derive(Parser, Debug)]
#[command(name = "cmai")]
#[command(about = "Generate conventional commit messages for staged changes using AI")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Push to origin after committing
    #[arg(short = 'p', long)]
    push: bool,

    /// Do not run the equivalent of `git add .` first
    #[arg(long)]
    no_stage: bool,

    /// Preview the commit message without committing
    #[arg(long)]
    dry_run: bool,

    /// Use (and remember) a specific model
    #[arg(long)]
    model: Option<String>,

    /// Set (and remember) the provider base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Set (and remember) the API key
    #[arg(long)]
    api_key: Option<String>,

    /// Use Ollama as provider
    #[arg(long, group = "provider")]
    use_ollama: bool,

    /// Use OpenRouter as provider
    #[arg(long, group = "provider")]
    use_openrouter: bool,

    /// Use LM Studio as provider
    #[arg(long, group = "provider")]
    use_lmstudio: bool,

    /// Use a custom OpenAI-compatible provider at this base URL
    #[arg(long, group = "provider", value_name = "URL")]
    use_custom: Option<String>,
}

impl Cli {
    /// The provider switch given on the command line, with its base URL.
    fn provider_switch(&self) -> Option<(Provider, String)> {
        let preset = |p: Provider| Some((p, p.profile().default_base_url.to_string()));

        if self.use_ollama {
            preset(Provider::Ollama)
        } else if self.use_openrouter {
            preset(Provider::OpenRouter)
        } else if self.use_lmstudio {
            preset(Provider::LmStudio)
        } else {
            self.use_custom
                .as_ref()
                .map(|url| (Provider::Custom, url.clone()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    // Step 1: Apply and persist configuration changes
    let store = ConfigStore::open_default().context("Failed to open config directory")?;
    apply_config_flags(&cli, &store)?;

    let settings = Settings::load(&store).context("Failed to load configuration")?;
    debug!(
        "Provider: {}, base URL: {}, model: {}",
        settings.provider, settings.base_url, settings.model
    );

    // Step 2: Check provider prerequisites
    let profile = settings.provider.profile();
    if !profile.has_required_key(settings.api_key.as_deref()) {
        return Err(ConfigError::MissingApiKey.into());
    }
    if settings.provider == Provider::Ollama {
        check_ollama_ready(&settings.model)
            .await
            .context("Ollama is not ready")?;
    }

    // Step 3: Stage and collect changes
    let staged = GitStagedChanges::open(".")
        .context("Not a git repository. Run cmai from within a git repository.")?;
    if !cli.no_stage {
        staged.stage_all().context("Failed to stage changes")?;
    }
    let payload = DiffPayload::collect(&staged)?;
    debug!("Changes:\n{}", payload.file_changes);

    // Step 4: Generate the message
    let templates = TemplateStore::discover(&store);
    let transport = HttpTransport::new(request_timeout());
    let message = generate_commit_message(&templates, &settings, &payload, &transport)
        .await
        .context("Failed to generate commit message")?;

    // Step 5: Commit (or preview)
    if cli.dry_run {
        println!("{}", format_dry_run(&message));
        return Ok(());
    }

    commit_staged(staged.repo(), &message).context("Failed to commit changes")?;

    if cli.push {
        let workdir = staged.repo().workdir().unwrap_or(Path::new("."));
        push_origin(workdir).context("Failed to push changes")?;
        println!("Successfully pushed changes to origin");
    }

    println!("Successfully committed changes with message:");
    println!("{message}");

    Ok(())
}

/// Persist provider switches and individual overrides, in that order.
fn apply_config_flags(cli: &Cli, store: &ConfigStore) -> Result<()> {
    if let Some((provider, base_url)) = cli.provider_switch() {
        let model = provider.profile().default_model.unwrap_or_default();
        store
            .switch_provider(provider, &base_url, model)
            .with_context(|| format!("Failed to switch provider to {provider}"))?;
        info!("Switched to {provider} provider");
    }

    if let Some(model) = &cli.model {
        store.save_model(model).context("Failed to save model")?;
    }
    if let Some(base_url) = &cli.base_url {
        store.save_base_url(base_url).context("Failed to save base URL")?;
    }
    if let Some(api_key) = &cli.api_key {
        store.save_api_key(api_key).context("Failed to save API key")?;
    }

    Ok(())
}

/// Log to stderr; `--debug` lowers the default level, `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
