//! Basic example demonstrating the Scratch API client.
//!
//! Run with:
//! ```
//! cargo run --example basic
//! ```

use scratchapi::{Entity, FrontPage, Hydrate, ListParams, Meta, Project, ScratchClient, User};

#[tokio::main]
async fn main() -> scratchapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let client = ScratchClient::from_env()?;

    println!("--- Site Statistics ---");
    let meta = Meta::new(&client);
    println!("Shared projects: {}", meta.project_count().await?);

    println!("\n--- Hydrating a Project ---");
    let project = Project::fetch(&client, 104).await?;
    if let Some(detail) = project.detail() {
        println!("{}: {}", project, detail.title);
        println!("  Author: {}", detail.author);
        println!("  Loves: {}", detail.stats.loves);
        println!("  Embed: {}", detail.links.embed_url);
    }

    println!("\n--- First Remixes ---");
    let remixes = project
        .remixes(&client, ListParams::with_limit(5))
        .collect_up_to(5)
        .await?;
    for remix in &remixes {
        println!("  - {remix}");
    }

    println!("\n--- Followers (lazy) ---");
    let user = User::shallow("griffpatch".into());
    let mut followers = user.followers(&client, ListParams::with_limit(10));
    while let Some(follower) = followers.next().await? {
        println!("  - {}", follower.username());
        if followers.pages_fetched() >= 2 {
            break;
        }
    }

    println!("\n--- Front Page ---");
    let rows = FrontPage::new(&client).rows().await?;
    for project in rows.featured_projects.iter().take(5) {
        println!("  - featured {project}");
    }

    Ok(())
}
