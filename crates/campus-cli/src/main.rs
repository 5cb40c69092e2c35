//! Campus CLI: command-line client for the university portal.
//!
//! Set CAMPUS_API_URL (or API_URL) and CAMPUS_ACCESS_TOKEN. Uses Bearer auth.

mod upload;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use campus_api_client::ApiClient;
use campus_cli::{error_report, format_post_table, init_tracing};
use campus_core::models::{normalize_hashtag, BoardKind, CourseFilter, NewPost, PageQuery, PostUpdate};
use campus_core::{ffprobe_path_from_env, AppError, Config};
use campus_processing::{sanitize_duration, FfprobeDurationProbe, VideoMetadata};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "campus", about = "University portal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Board posts (notice, department, career, student, professor)
    Board {
        #[command(subcommand)]
        sub: BoardCommands,
    },
    /// Search courses
    Courses {
        /// Matches course name, code or professor
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        grade: Option<u8>,
        #[arg(long)]
        credits: Option<u8>,
    },
    /// List the lecture weeks of a course
    Weeks {
        /// Course ID
        course_id: i64,
    },
    /// Print a video's duration
    Probe {
        /// Path to the video file, or `-` to read it from stdin
        file: PathBuf,
    },
    /// Upload a lecture video to a course week
    Upload {
        /// Path to the video file
        file: PathBuf,
        /// Target week ID
        #[arg(long)]
        week: i64,
        /// Video title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// Upload URL of an interrupted upload to continue
        #[arg(long)]
        resume: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum BoardCommands {
    /// List posts with pagination, search and hashtag filter
    List {
        #[arg(value_parser = parse_board)]
        kind: BoardKind,
        /// Zero-based page number
        #[arg(long, default_value = "0")]
        page: u32,
        #[arg(long, default_value = "10")]
        size: u32,
        #[arg(long)]
        search: Option<String>,
        /// Keep only posts with this hashtag
        #[arg(long)]
        hashtag: Option<String>,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Get a single post
    Get {
        #[arg(value_parser = parse_board)]
        kind: BoardKind,
        id: i64,
    },
    /// Create a post
    Create {
        #[arg(value_parser = parse_board)]
        kind: BoardKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,
    },
    /// Update a post
    Update {
        #[arg(value_parser = parse_board)]
        kind: BoardKind,
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,
    },
    /// Delete a post
    Delete {
        #[arg(value_parser = parse_board)]
        kind: BoardKind,
        id: i64,
    },
    /// Toggle the like on a post
    Like {
        #[arg(value_parser = parse_board)]
        kind: BoardKind,
        id: i64,
    },
}

fn parse_board(s: &str) -> Result<BoardKind, String> {
    s.parse::<BoardKind>().map_err(|e| e.to_string())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run_board(client: &ApiClient, sub: BoardCommands) -> anyhow::Result<()> {
    match sub {
        BoardCommands::List {
            kind,
            page,
            size,
            search,
            hashtag,
            format,
        } => {
            let mut query = PageQuery::new(page, size);
            if let Some(search) = search {
                query = query.with_search(search);
            }
            let response = client
                .list_posts_tagged(kind, &query, hashtag.as_deref())
                .await?;
            match format {
                OutputFormat::Json => print_json(&response)?,
                OutputFormat::Table => {
                    println!("\n=== {} ===\n", kind.config().title);
                    print!("{}", format_post_table(&response));
                }
            }
        }
        BoardCommands::Get { kind, id } => {
            let response = client.get_post(kind, id).await?;
            print_json(&response)?;
        }
        BoardCommands::Create {
            kind,
            title,
            content,
            hashtags,
        } => {
            let post = NewPost::new(title, content).with_hashtags(hashtags);
            let response = client.create_post(kind, &post).await?;
            print_json(&response)?;
        }
        BoardCommands::Update {
            kind,
            id,
            title,
            content,
            hashtags,
        } => {
            let update = PostUpdate {
                title,
                content,
                hashtags: if hashtags.is_empty() {
                    None
                } else {
                    Some(
                        hashtags
                            .iter()
                            .map(|t| normalize_hashtag(t))
                            .filter(|t| !t.is_empty())
                            .collect(),
                    )
                },
            };
            let response = client.update_post(kind, id, &update).await?;
            print_json(&response)?;
        }
        BoardCommands::Delete { kind, id } => {
            client.delete_post(kind, id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Post {} deleted", id) }),
            )?;
        }
        BoardCommands::Like { kind, id } => {
            let response = client.like_post(kind, id).await?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().map_err(|e| {
        anyhow::Error::new(AppError::Config(e.to_string())).context(
            "Failed to load configuration. Set CAMPUS_API_URL (or API_URL) and CAMPUS_ACCESS_TOKEN",
        )
    })
}

fn api_client() -> anyhow::Result<ApiClient> {
    let config = load_config()?;
    ApiClient::from_config(&config).context("Failed to create API client")
}

async fn probe_metadata(file: &Path) -> anyhow::Result<VideoMetadata> {
    let probe = FfprobeDurationProbe::new(ffprobe_path_from_env());
    if file.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read video from stdin")?;
        return probe
            .metadata_from_bytes(&data)
            .await
            .context("Failed to probe stdin");
    }
    probe
        .metadata_from_path(file)
        .await
        .with_context(|| format!("Failed to probe {}", file.display()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Board { sub } => {
            let client = api_client()?;
            run_board(&client, sub).await?;
        }
        Commands::Courses {
            keyword,
            department,
            grade,
            credits,
        } => {
            let client = api_client()?;
            let filter = CourseFilter {
                keyword,
                department,
                grade,
                credits,
            };
            let response = client.search_courses(&filter).await?;
            print_json(&response)?;
        }
        Commands::Weeks { course_id } => {
            let client = api_client()?;
            let response = client.list_weeks(course_id).await?;
            print_json(&response)?;
        }
        Commands::Probe { file } => {
            let metadata = probe_metadata(&file).await?;
            let duration = sanitize_duration(metadata.duration);
            print_json(&serde_json::json!({
                "file": file.display().to_string(),
                "duration_seconds": duration,
                "formatted_duration": duration.map(campus_core::format_duration),
                "width": metadata.width,
                "height": metadata.height,
                "codec": metadata.codec,
            }))?;
        }
        Commands::Upload {
            file,
            week,
            title,
            resume,
        } => {
            let config = load_config()?;
            let summary = upload::run(&config, &file, week, title, resume).await?;
            print_json(&summary)?;
            summary.ensure_succeeded()?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    dotenvy::dotenv().ok();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", error_report(&err));
            ExitCode::FAILURE
        }
    }
}
