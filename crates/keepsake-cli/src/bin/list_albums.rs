use anyhow::{Context, Result};
use clap::Parser;
use keepsake_cli::{connect, init_tracing, truncate_string};
use keepsake_db::{AlbumStore, MediaStore, PgAlbumRepository, PgMediaRepository};

#[derive(Parser, Debug)]
#[command(name = "list_albums")]
#[command(about = "List albums with their media counts")]
struct Args {
    /// Postgres connection string (defaults to DATABASE_URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let database_url = args
        .database_url
        .context("DATABASE_URL must be set (or pass --database-url)")?;
    let pool = connect(&database_url).await?;
    let albums = PgAlbumRepository::new(pool.clone());
    let media = PgMediaRepository::new(pool);

    let mut rows = Vec::new();
    for album in albums.list().await? {
        let count = media.list_by_album(album.id).await?.len();
        rows.push((album, count));
    }

    match args.format.as_str() {
        "json" => {
            let out: Vec<_> = rows
                .iter()
                .map(|(album, count)| {
                    serde_json::json!({
                        "album": album,
                        "mediaCount": count,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        "table" => {
            if rows.is_empty() {
                println!("No albums found.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<32}  {:<16}  {:>5}  {}",
                "ID", "TITLE", "DATE", "MEDIA", "CREATED"
            );
            println!("{}", "-".repeat(110));
            for (album, count) in &rows {
                println!(
                    "{:<36}  {:<32}  {:<16}  {:>5}  {}",
                    album.id,
                    truncate_string(&album.title, 32),
                    truncate_string(&album.event_date, 16),
                    count,
                    album.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!("\nTotal: {} album(s)", rows.len());
        }
        other => anyhow::bail!("Invalid format '{}'. Must be: json or table", other),
    }

    Ok(())
}
