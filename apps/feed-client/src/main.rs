//! # Feed Client
//!
//! Command-line dashboard for the Mini Social API.

mod api;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api::{Attachment, ClientError, FeedClient};
use render::Stats;

#[derive(Parser, Debug)]
#[command(name = "feed-client", about = "Browse and post to the Mini Social feed")]
struct Cli {
    /// API root URL
    #[arg(long, env = "SOCIAL_API_URL", default_value = "http://localhost:8000/api")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the server is running
    Status,
    /// Show every post, newest first
    Feed,
    /// Count posts and images
    Stats,
    /// Create a post
    Post {
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "admin")]
        username: String,
        /// Image file to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a post
    Delete { id: i64 },
    /// Comment on a post
    Comment {
        id: i64,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "Anonymous")]
        username: String,
    },
    /// List a post's comments
    Comments { id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = FeedClient::new(&cli.base_url);

    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &FeedClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Status => {
            if client.is_running().await {
                println!("Server is running at {}", client.base_url());
            } else {
                anyhow::bail!(ClientError::Connection);
            }
        }
        Command::Feed => {
            let list = client.get_posts().await?;
            println!("{}", render::feed(&list.posts));
        }
        Command::Stats => {
            let list = client.get_posts().await?;
            println!("{}", render::stats(Stats::of(&list.posts)));
        }
        Command::Post {
            content,
            username,
            image,
        } => {
            if content.trim().is_empty() {
                anyhow::bail!("Write something first!");
            }
            if username.trim().is_empty() {
                anyhow::bail!("Enter your name!");
            }
            let image = match image {
                Some(path) => Some(read_attachment(path).await?),
                None => None,
            };

            let created = client.create_post(&content, &username, image).await?;
            println!("{}", created.message);
            println!("{}", render::post_card(&created.post));
        }
        Command::Delete { id } => {
            let deleted = client.delete_post(id).await?;
            println!("{}", deleted.message);
        }
        Command::Comment {
            id,
            content,
            username,
        } => {
            if content.trim().is_empty() {
                anyhow::bail!("Please write a comment first!");
            }
            let created = client.add_comment(id, &content, Some(&username)).await?;
            println!("{}", created.message);
            println!("{}", render::comment_line(&created.comment));
        }
        Command::Comments { id } => {
            let list = client.get_comments(id).await?;
            println!("Comments ({})", list.count);
            for comment in &list.comments {
                println!("  {}", render::comment_line(comment));
            }
        }
    }
    Ok(())
}

async fn read_attachment(path: PathBuf) -> anyhow::Result<Attachment> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(Attachment { filename, bytes })
}
