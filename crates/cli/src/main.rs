use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use frontpage_core::types::{DbId, JsonMap};
use frontpage_core::{
    section_catalog, CategoryRestrictionIndex, ComposerConfig, LayoutStore, SectionTypeRegistry,
};
use frontpage_db::{PgLayoutPersistence, PgRestrictionStore};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "frontpage", about = "Manage page layouts and section category restrictions")]
struct Cli {
    /// Page key to operate on (defaults to FRONTPAGE_HOMEPAGE_KEY)
    #[arg(long, global = true)]
    page: Option<String>,

    /// User id recorded as `updatedBy` on saves
    #[arg(long, global = true)]
    user: Option<DbId>,

    /// Also register the feature-1 / feature-2 section types
    #[arg(long, global = true)]
    extensions: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the section type catalog as JSON
    Catalog,
    /// Print the page's current layout configuration
    Show,
    /// Add a section built from its type's defaults
    Add {
        /// Section type (e.g. recipe)
        #[arg(long = "type")]
        section_type: String,
        /// Zero-based position; appends when omitted or out of range
        #[arg(long)]
        position: Option<usize>,
        /// JSON object merged over the default config
        #[arg(long)]
        config: Option<String>,
    },
    /// Remove a section
    Remove {
        #[arg(long)]
        id: Uuid,
    },
    /// Reorder sections; ids not listed are dropped
    Reorder {
        /// Comma-separated section ids in their new order
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<Uuid>,
    },
    /// Enable or disable a section
    Toggle {
        #[arg(long)]
        id: Uuid,
        #[arg(long, action = ArgAction::Set)]
        enabled: bool,
    },
    /// Replace the page with the starter layout
    Reset,
    /// Replace the allowed categories of a section type
    Restrict {
        #[arg(long = "type")]
        section_type: String,
        /// Comma-separated category ids; omit to remove the restriction
        #[arg(long, value_delimiter = ',')]
        categories: Vec<DbId>,
    },
    /// Check a config object against a section type's schema
    Validate {
        #[arg(long = "type")]
        section_type: String,
        #[arg(long)]
        config: String,
    },
}

fn parse_object(raw: &str) -> anyhow::Result<JsonMap> {
    match serde_json::from_str::<Value>(raw).context("config is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("config must be a JSON object, got {other}"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_registry(extensions: bool) -> SectionTypeRegistry {
    let mut registry = SectionTypeRegistry::with_builtin_types();
    if extensions {
        registry.register_extensions();
    }
    registry
}

fn validate(registry: &SectionTypeRegistry, section_type: &str, raw: &str) -> anyhow::Result<()> {
    registry.require(section_type)?;
    if !registry.validate_config(section_type, &parse_object(raw)?) {
        bail!("config does not match the '{section_type}' schema");
    }
    println!("valid");
    Ok(())
}

async fn run(cli: Cli, config: ComposerConfig) -> anyhow::Result<()> {
    let registry = Arc::new(build_registry(cli.extensions));

    // Validation needs no database.
    if let Command::Validate {
        section_type,
        config: raw,
    } = &cli.command
    {
        return validate(&registry, section_type, raw);
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = frontpage_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    frontpage_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    frontpage_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::debug!("Database ready");

    let layouts = LayoutStore::new(
        Arc::new(PgLayoutPersistence::new(pool.clone())),
        Arc::clone(&registry),
    );
    let restrictions = CategoryRestrictionIndex::new(
        Arc::new(PgRestrictionStore::new(pool)),
        config.restriction_cache_ttl,
    );

    let page = cli.page.unwrap_or(config.homepage_key);
    let user = cli.user;

    match cli.command {
        Command::Catalog => print_json(&section_catalog(&registry, &restrictions).await?)?,
        Command::Show => print_json(&layouts.get_configuration(&page).await?)?,
        Command::Add {
            section_type,
            position,
            config,
        } => {
            let overrides = match config {
                Some(raw) => parse_object(&raw)?,
                None => JsonMap::new(),
            };
            let section = layouts
                .add_section(&page, &section_type, position, &overrides, user)
                .await?;
            print_json(&section)?;
        }
        Command::Remove { id } => print_json(&layouts.remove_section(&page, id, user).await?)?,
        Command::Reorder { ids } => {
            print_json(&layouts.reorder_sections(&page, &ids, user).await?)?
        }
        Command::Toggle { id, enabled } => {
            print_json(&layouts.toggle_section(&page, id, enabled, user).await?)?
        }
        Command::Reset => print_json(&layouts.reset_configuration(&page, user).await?)?,
        Command::Restrict {
            section_type,
            categories,
        } => {
            registry.require(&section_type)?;
            restrictions
                .set_allowed_categories(&section_type, &categories)
                .await?;
            let allowed = restrictions.allowed_category_ids(&section_type).await?;
            match allowed {
                Some(ids) => {
                    let mut ids: Vec<DbId> = ids.into_iter().collect();
                    ids.sort_unstable();
                    println!("{section_type}: {ids:?}");
                }
                None => println!("{section_type}: unrestricted"),
            }
        }
        Command::Validate {
            section_type,
            config: raw,
        } => validate(&registry, &section_type, &raw)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontpage_cli=info,frontpage_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ComposerConfig::from_env()?;
    run(Cli::parse(), config).await
}
