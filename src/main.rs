use anyhow::Result;
use clap::Parser;
use modportal::application::RemovePattern;
use modportal::auth::Credentials;
use modportal::commands;
use modportal::config::{Config, ConfigOverrides};
use modportal::domain::model::ModRequest;
use modportal::portal::SearchQuery;
use std::path::PathBuf;

/// modportal - Factorio mod manager
///
/// Install, update and remove mods from the Factorio mod portal, and show
/// which mods a save file was played with.
///
/// Downloads need a portal account: pass --username with either --token or
/// --password (also via FACTORIO_USERNAME, FACTORIO_TOKEN, FACTORIO_PASSWORD).
///
/// Examples:
///   modportal install Foreman          # Install the latest release
///   modportal install Foreman@1.1.0    # Install an exact version
///   modportal check                    # Show available updates
#[derive(Parser, Debug)]
#[command(author, version = env!("MODPORTAL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mod directory (defaults to ~/.factorio/mods)
    #[arg(long, env = "MODPORTAL_MOD_DIR", value_name = "PATH", global = true)]
    pub mod_dir: Option<PathBuf>,

    /// Save directory (defaults to ~/.factorio/saves)
    #[arg(long, env = "MODPORTAL_SAVE_DIR", value_name = "PATH", global = true)]
    pub save_dir: Option<PathBuf>,

    /// Game version releases must be compatible with (0.0.0 accepts any)
    #[arg(
        long,
        env = "MODPORTAL_GAME_VERSION",
        value_name = "VERSION",
        global = true
    )]
    pub game_version: Option<String>,

    /// Keep older versions of a package when installing a new one
    #[arg(long, global = true)]
    pub allow_multiple: bool,

    /// Mod portal URL (defaults to https://mods.factorio.com)
    #[arg(long, env = "MODPORTAL_PORTAL_URL", value_name = "URL", global = true)]
    pub portal_url: Option<String>,

    /// Authentication service URL
    #[arg(long, value_name = "URL", global = true)]
    pub auth_url: Option<String>,

    /// Multiplayer matchmaking URL
    #[arg(long, value_name = "URL", global = true)]
    pub matchmaking_url: Option<String>,

    #[arg(long, env = "FACTORIO_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "FACTORIO_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "FACTORIO_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Ask the auth service to check game ownership on login
    #[arg(long, global = true)]
    pub require_ownership: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show which installed mods have a newer compatible release
    Check(CheckArgs),

    /// Download newer compatible releases of installed mods
    Update(CheckArgs),

    /// Install mods from the portal
    Install(InstallArgs),

    /// Remove mod files
    Remove(RemoveArgs),

    /// Show the dependencies of a mod release
    Deps(DepsArgs),

    /// List installed mods
    List,

    /// Enable mods in mod-list.json
    Enable(NamesArgs),

    /// Disable mods in mod-list.json
    Disable(NamesArgs),

    /// Show the mods a save was played with
    SaveMods(SaveModsArgs),

    /// Search the mod portal
    Search(SearchArgs),

    /// List public multiplayer games, or show one game
    Games(GamesArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Installed mods to check (all when omitted)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Mods as `name` or `name@version`
    #[arg(value_name = "MOD", required = true)]
    pub mods: Vec<ModRequest>,

    /// Also install required dependencies
    #[arg(long)]
    pub with_deps: bool,

    /// Include optional dependencies (with --with-deps)
    #[arg(long)]
    pub optional: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Glob patterns as `name` or `name@version`
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<RemovePattern>,
}

#[derive(clap::Args, Debug)]
pub struct DepsArgs {
    /// Mod as `name` or `name@version`
    #[arg(value_name = "MOD")]
    pub request: ModRequest,

    /// Include optional dependencies
    #[arg(long)]
    pub optional: bool,
}

#[derive(clap::Args, Debug)]
pub struct NamesArgs {
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct SaveModsArgs {
    /// Save name without `.zip` (all saves when omitted)
    #[arg(value_name = "SAVE")]
    pub save: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Sort order: top, alpha or updated
    #[arg(long)]
    pub order: Option<String>,

    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct GamesArgs {
    /// Game id to show details for
    #[arg(value_name = "ID")]
    pub game_id: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mod_dir: self.mod_dir.clone(),
            save_dir: self.save_dir.clone(),
            game_version: self.game_version.clone(),
            allow_multiple: self.allow_multiple,
            portal_url: self.portal_url.clone(),
            auth_url: self.auth_url.clone(),
            matchmaking_url: self.matchmaking_url.clone(),
            credentials: Credentials {
                username: self.username.clone(),
                token: self.token.clone(),
                password: self.password.clone(),
                require_ownership: self.require_ownership,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = modportal::runtime::RealRuntime;
    let config = Config::load(&runtime, cli.overrides())?;
    let json = cli.json;

    match cli.command {
        Commands::Check(args) => {
            commands::check(runtime, config, &args.names, false, json).await?
        }
        Commands::Update(args) => commands::check(runtime, config, &args.names, true, json).await?,
        Commands::Install(args) => {
            commands::install(
                runtime,
                config,
                &args.mods,
                args.with_deps,
                args.optional,
                json,
            )
            .await?
        }
        Commands::Remove(args) => commands::remove(runtime, config, &args.patterns)?,
        Commands::Deps(args) => {
            commands::deps(runtime, config, &args.request, args.optional, json).await?
        }
        Commands::List => commands::list(runtime, config, json)?,
        Commands::Enable(args) => commands::set_enabled(runtime, config, &args.names, true)?,
        Commands::Disable(args) => commands::set_enabled(runtime, config, &args.names, false)?,
        Commands::SaveMods(args) => {
            commands::save_mods(runtime, config, args.save.as_deref(), json)?
        }
        Commands::Search(args) => {
            let query = SearchQuery {
                q: Some(args.query),
                order: args.order,
                page_size: args.page_size,
                page: args.page,
            };
            commands::search(config, query, json).await?
        }
        Commands::Games(args) => commands::games(config, args.game_id.as_deref()).await?,
    }
    Ok(())
}
