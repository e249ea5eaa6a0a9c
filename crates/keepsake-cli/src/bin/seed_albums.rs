use anyhow::{Context, Result};
use clap::Parser;
use keepsake_cli::{connect, init_tracing, sample_albums};
use keepsake_core::models::Album;
use keepsake_db::{AlbumStore, PgAlbumRepository};

#[derive(Parser, Debug)]
#[command(name = "seed_albums")]
#[command(about = "Insert the sample wedding albums")]
struct Args {
    /// Postgres connection string (defaults to DATABASE_URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Print the albums that would be created without touching the database
    #[arg(long)]
    dry_run: bool,

    /// Insert even when an album with the same title exists
    #[arg(long)]
    allow_duplicates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let samples = sample_albums();

    if args.dry_run {
        for request in samples {
            let album = Album::new(request);
            println!("{}", serde_json::to_string_pretty(&album)?);
        }
        return Ok(());
    }

    let database_url = args
        .database_url
        .context("DATABASE_URL must be set (or pass --database-url)")?;
    let pool = connect(&database_url).await?;
    let repo = PgAlbumRepository::new(pool);

    let existing: Vec<String> = if !args.allow_duplicates {
        repo.list().await?.into_iter().map(|a| a.title).collect()
    } else {
        Vec::new()
    };

    let mut created = 0;
    for request in samples {
        if existing.iter().any(|title| title == request.title.trim()) {
            tracing::info!(title = %request.title, "Album already present, skipping");
            continue;
        }
        let album = repo.create(Album::new(request)).await?;
        tracing::info!(album_id = %album.id, title = %album.title, "Album seeded");
        created += 1;
    }

    println!("Seeded {} album(s)", created);
    Ok(())
}
