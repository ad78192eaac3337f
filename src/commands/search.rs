use anyhow::{Result, bail};

use crate::{
    config::Config,
    domain::model::Package,
    portal::{ModPortal, SearchQuery},
};

use super::{print_json, services};

/// Search the portal's package listing
#[tracing::instrument(skip(config))]
pub async fn search(config: Config, query: SearchQuery, json: bool) -> Result<()> {
    let http_client = services::build_http_client()?;
    let portal = services::build_portal(&config, &http_client);
    let packages = portal.search_packages(&query).await?;

    if json {
        return print_json(&packages);
    }
    if packages.is_empty() {
        println!("No mods found.");
    }
    for package in &packages {
        println!("{}", describe(package));
    }
    Ok(())
}

/// List public multiplayer games, or show one game's details
#[tracing::instrument(skip(config))]
pub async fn games(config: Config, game_id: Option<&str>) -> Result<()> {
    let http_client = services::build_http_client()?;
    let matchmaking = services::build_matchmaking(&config, &http_client);

    let value = match game_id {
        Some(id) => matchmaking.game_details(id).await?,
        None => {
            let Some(session) = services::build_session(&config, &http_client).await? else {
                bail!("Listing games requires --username with --token or --password");
            };
            serde_json::Value::Array(matchmaking.games(&session).await?)
        }
    };
    print_json(&value)
}

fn describe(package: &Package) -> String {
    let mut line = package.name.clone();
    if let Some(title) = &package.title
        && title != &package.name
    {
        line.push_str(&format!(" - {}", title));
    }
    if let Some(owner) = &package.owner {
        line.push_str(&format!(" by {}", owner));
    }
    if let Some(release) = package.releases.first() {
        line.push_str(&format!(" [{}]", release.version));
    }
    line
}
