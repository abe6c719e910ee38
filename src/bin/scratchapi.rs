//! Scratch API CLI binary.
//!
//! A command-line interface for browsing the Scratch API.

use clap::Parser;
use scratchapi::cli::{Cli, Command, EntityKind, Listing};
use scratchapi::{
    Classroom, Entity, GenericRecord, Hydrate, ListParams, Meta, PagedListing, PrettyPrint,
    Project, ScratchClient, ScratchError, Studio, Translate, User,
};
use serde::Serialize;
use std::process::ExitCode;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "scratchapi=debug" } else { "scratchapi=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let client = match ScratchClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check the SCRATCH_*_URL environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &ScratchClient, cli: Cli) -> scratchapi::Result<()> {
    match cli.command {
        Command::Get { entity, key } => handle_get(client, entity, &key, cli.json).await,
        Command::List {
            listing,
            target,
            limit,
            offset,
            max,
        } => {
            let params = ListParams::with_limit(limit).offset(offset);
            handle_list(client, listing, &target, params, max, cli.json).await
        }
        Command::Search {
            query,
            studios,
            limit,
        } => handle_search(client, &query, studios, limit, cli.json).await,
        Command::Translate { locale, text } => {
            let translated = Translate::new(client).translate(&locale, &text).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&translated)?);
            } else {
                println!("{translated}");
            }
            Ok(())
        }
    }
}

fn parse_id(key: &str) -> scratchapi::Result<u64> {
    key.parse()
        .map_err(|_| ScratchError::Validation(format!("expected a numeric ID, got {key:?}")))
}

async fn handle_get(
    client: &ScratchClient,
    entity: EntityKind,
    key: &str,
    json: bool,
) -> scratchapi::Result<()> {
    match entity {
        EntityKind::Project => {
            let project = Project::fetch(client, parse_id(key)?).await?;
            output_single(&project, json)?;
        }
        EntityKind::User => {
            let user = User::fetch(client, key.into()).await?;
            output_single(&user, json)?;
        }
        EntityKind::Studio => {
            let studio = Studio::fetch(client, parse_id(key)?).await?;
            output_single(&studio, json)?;
        }
        EntityKind::Classroom => {
            let classroom = Classroom::fetch(client, parse_id(key)?).await?;
            output_single(&classroom, json)?;
        }
    }
    Ok(())
}

async fn handle_list(
    client: &ScratchClient,
    listing: Listing,
    target: &str,
    params: ListParams,
    max: usize,
    json: bool,
) -> scratchapi::Result<()> {
    match listing {
        Listing::Remixes => {
            let project = Project::shallow(parse_id(target)?);
            output_listing(project.remixes(client, params), max, json).await
        }
        Listing::Projects => {
            let user = User::shallow(target.into());
            output_listing(user.projects(client, params), max, json).await
        }
        Listing::StudioProjects => {
            let studio = Studio::shallow(parse_id(target)?);
            output_listing(studio.projects(client, params), max, json).await
        }
        Listing::Followers => {
            let user = User::shallow(target.into());
            output_listing(user.followers(client, params), max, json).await
        }
        Listing::Following => {
            let user = User::shallow(target.into());
            output_listing(user.following(client, params), max, json).await
        }
        Listing::Favorites => {
            let user = User::shallow(target.into());
            output_listing(user.favorites(client, params), max, json).await
        }
        Listing::Curators => {
            let studio = Studio::shallow(parse_id(target)?);
            output_listing(studio.curators(client, params), max, json).await
        }
        Listing::StudioComments => {
            let studio = Studio::shallow(parse_id(target)?);
            output_listing(studio.comments(client, params), max, json).await
        }
    }
}

async fn handle_search(
    client: &ScratchClient,
    query: &str,
    studios: bool,
    limit: u32,
    json: bool,
) -> scratchapi::Result<()> {
    let meta = Meta::new(client);
    let params = ListParams::with_limit(limit);
    let max = limit as usize;

    if studios {
        let results = meta.search_studios(query, params)?.collect_up_to(max).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            let rows: Vec<StudioResultRow> = results.iter().map(StudioResultRow::from).collect();
            println!("{}", Table::new(rows));
        }
        Ok(())
    } else {
        output_listing(meta.search_projects(Some(query), params), max, json).await
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> scratchapi::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

async fn output_listing<T>(listing: PagedListing<T>, max: usize, json: bool) -> scratchapi::Result<()>
where
    T: Entity + Serialize + Send + 'static,
{
    let start = listing.next_offset();
    let items = listing.collect_up_to(max).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let rows: Vec<EntityRow> = items
            .iter()
            .enumerate()
            .map(|(i, item)| EntityRow {
                offset: start as usize + i,
                kind: T::KIND,
                key: item.key().to_string(),
            })
            .collect();
        println!("{}", Table::new(rows));
        if items.len() == max {
            println!("\n{} items (more may be available)", items.len());
        } else {
            println!("\n{} items (end)", items.len());
        }
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct EntityRow {
    offset: usize,
    kind: &'static str,
    key: String,
}

#[derive(Tabled)]
struct StudioResultRow {
    id: String,
    title: String,
    followers: String,
}

impl From<&GenericRecord> for StudioResultRow {
    fn from(r: &GenericRecord) -> Self {
        Self {
            id: r.get_u64("studio_id").map(|id| id.to_string()).unwrap_or_default(),
            title: r.get_str("title").unwrap_or_default().to_string(),
            followers: r.get_u64("followers").map(|n| n.to_string()).unwrap_or_default(),
        }
    }
}
