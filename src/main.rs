use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use privatar::application::{
    GravatarValidator, IconDispatcher, ProviderRegistry, PurgeCachesUseCase, ValidationMemo,
};
use privatar::domain::entities::{IconArgs, IdentityHasher, ValidationResult};
use privatar::domain::ports::{IconGenerator, StoreScope, TransientStorePort};
use privatar::domain::services::CachingPolicy;
use privatar::infrastructure::{
    AppConfig, CliArgs, Command, ConfigLoader, FileCache, FileTransientStore, FsBlobStore,
    GeneratingIconProvider, GravatarClient, MonsterIdGenerator, PartCatalog, RetroGenerator,
    StaticIconProvider,
};
use privatar::infrastructure::image::ImageCompositor;

const MONSTER_PARTS_DIR: &str = "monster-id";

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let loader = ConfigLoader::new()?;
    let mut config = loader.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn monster_generator(dir: &Path) -> MonsterIdGenerator {
    let known = PartCatalog::monster_id();
    let categories: Vec<&str> = known.categories().iter().map(|c| c.name.as_str()).collect();

    match PartCatalog::discover(dir, &categories, &known) {
        Ok(catalog) => {
            debug!(dir = %dir.display(), "Using discovered monster parts");
            MonsterIdGenerator::with_catalog(dir, catalog, ImageCompositor::new())
        }
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Falling back to built-in monster catalog");
            MonsterIdGenerator::with_catalog(dir, known, ImageCompositor::new())
        }
    }
}

fn build_registry(config: &AppConfig, file_cache: &Arc<FileCache>) -> ProviderRegistry {
    let assets_url = config.assets_base_url();
    let monster: Arc<dyn IconGenerator> =
        Arc::new(monster_generator(&config.assets_dir().join(MONSTER_PARTS_DIR)));
    let retro: Arc<dyn IconGenerator> = Arc::new(RetroGenerator::new());

    ProviderRegistry::new()
        .with(Arc::new(GeneratingIconProvider::new(
            monster,
            Arc::clone(file_cache),
            &["monsterid"],
            "Monsters",
        )))
        .with(Arc::new(GeneratingIconProvider::new(
            retro,
            Arc::clone(file_cache),
            &["retro"],
            "Retro",
        )))
        .with(Arc::new(StaticIconProvider::silhouette(&assets_url)))
        .with(Arc::new(StaticIconProvider::bubble(&assets_url)))
}

fn transient_stores(config: &AppConfig) -> Vec<Arc<dyn TransientStorePort>> {
    let dir = config.transients_dir();
    [StoreScope::Site, StoreScope::Network]
        .into_iter()
        .map(|scope| Arc::new(FileTransientStore::new(&dir, scope)) as Arc<dyn TransientStorePort>)
        .collect()
}

async fn run(config: AppConfig, command: Command) -> Result<()> {
    let file_cache = Arc::new(FileCache::new(
        Arc::new(FsBlobStore::new(config.cache_dir())),
        config.cache_base_url(),
    ));

    match command {
        Command::Generate {
            email,
            icon_type,
            size,
            force,
        } => {
            let hasher = config
                .salt
                .as_ref()
                .map_or(IdentityHasher::Remote, IdentityHasher::salted);
            let hash = hasher.hash(&email);
            let dispatcher = IconDispatcher::new(Arc::new(build_registry(&config, &file_cache)));
            let fallback = format!("{}/mystery.svg", config.assets_base_url());

            let mut args = IconArgs::with_type(icon_type.unwrap_or_else(|| config.default_icon.clone()));
            args.force = force;

            let url = dispatcher.get_url(&fallback, &hash, size, &args).await;
            println!("{url}");
        }
        Command::Validate {
            email,
            age_secs,
            save,
        } => {
            let client = Arc::new(
                GravatarClient::new(
                    config.gravatar.host.clone(),
                    config.gravatar.rating,
                    config.gravatar.size,
                    config.gravatar.timeout(),
                )
                .wrap_err("Failed to create avatar service client")?,
            );
            let store = Arc::new(FileTransientStore::new(
                &config.transients_dir(),
                config.transients.scope,
            ));
            let validator = GravatarValidator::new(client.clone(), store, CachingPolicy::new());

            let mut memo = ValidationMemo::new();
            let result = validator
                .validate(&mut memo, &email, Duration::from_secs(age_secs))
                .await;
            println!("{result}");

            if let (Some(path), ValidationResult::Found(_)) = (save, &result) {
                let hash = IdentityHasher::Remote.hash(&email);
                let bytes = client
                    .fetch_image(&hash, config.gravatar.size, config.gravatar.rating)
                    .await
                    .wrap_err("Failed to download remote avatar")?;
                tokio::fs::write(&path, &bytes)
                    .await
                    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), bytes = bytes.len(), "Saved remote avatar");
            }
        }
        Command::Purge => {
            let report = PurgeCachesUseCase::new(file_cache, transient_stores(&config))
                .execute()
                .await
                .wrap_err("Failed to purge caches")?;
            println!("removed {} stored results", report.keys_deleted);
        }
        Command::Types => {
            let dispatcher = IconDispatcher::new(Arc::new(build_registry(&config, &file_cache)));
            for option in dispatcher.avatar_defaults(Vec::new()) {
                println!("{}\t{}", option.value, option.name);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = privatar::VERSION, "Starting Privatar");
    if config.salt.is_none() {
        debug!("No salt configured, cache file names use the remote service hash");
    }

    run(config, args.command).await
}
