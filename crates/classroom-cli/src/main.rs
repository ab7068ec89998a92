use std::io::Read;
use std::path::PathBuf;

use classroom_renderer::assistant::{LearnMoreRequest, SummaryRequest};
use classroom_renderer::embed::{AttachmentIcon, is_embeddable};
use classroom_renderer::markup::{Flavor, Renderer};
use classroom_renderer::types::{Attachment, AttachmentType, CardViewMode};
use classroom_renderer::{Feed, Resolver, ViewerConfig, render_week_page};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(version, about = "Classroom - readable archive of a classroom stream", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Card layout for week pages
    #[arg(long, global = true, env = "CLASSROOM_CARD_VIEW")]
    view: Option<CardViewMode>,

    /// Link out instead of guessing an iframe for declared videos
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide how an attachment URL would be previewed
    Resolve {
        url: String,

        /// Attachment title (defaults to the URL)
        #[arg(long)]
        title: Option<String>,

        /// Declared attachment type
        #[arg(long = "type", default_value = "LINK")]
        kind: AttachmentType,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render post markup to HTML (reads stdin when no file is given)
    Render {
        file: Option<PathBuf>,

        /// Use the assistant flavor
        #[arg(long)]
        assistant: bool,
    },
    /// List the weeks in a feed
    Weeks { feed: PathBuf },
    /// Write one HTML page per week
    Export {
        feed: PathBuf,
        dest: PathBuf,

        /// Only export this week
        #[arg(long)]
        week: Option<String>,
    },
    /// Print the request the summary service would receive for a week
    Prompt {
        feed: PathBuf,
        week: String,

        /// Ask about a topic instead of summarizing the week
        #[arg(long)]
        topic: Option<String>,
    },
}

fn main() -> Result<()> {
    init_miette();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ViewerConfig::from_env()?;
    if let Some(view) = cli.view {
        config.card_view = view;
    }
    if cli.strict {
        config.strict_embeds = true;
    }

    match cli.command {
        Commands::Resolve {
            url,
            title,
            kind,
            json,
        } => resolve(&config.resolver(), url, title, kind, json),
        Commands::Render { file, assistant } => {
            let flavor = if assistant {
                Flavor::Assistant
            } else {
                Flavor::Content
            };
            render(file, flavor, &config)
        }
        Commands::Weeks { feed } => list_weeks(feed),
        Commands::Export { feed, dest, week } => export(feed, dest, week, &config),
        Commands::Prompt { feed, week, topic } => prompt(feed, &week, topic),
    }
}

fn resolve(
    resolver: &Resolver,
    url: String,
    title: Option<String>,
    kind: AttachmentType,
    json: bool,
) -> Result<()> {
    let title = title.unwrap_or_else(|| url.clone());
    let attachment = Attachment::new(kind, title, url);
    let decision = resolver.resolve(&attachment);

    if json {
        let out = serde_json::json!({
            "kind": decision.kind,
            "resolvedUrl": decision.resolved_url,
            "icon": AttachmentIcon::for_attachment(&attachment).as_str(),
            "embeddable": is_embeddable(attachment.kind),
        });
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        println!("{} {}", decision.kind, decision.resolved_url);
    }
    Ok(())
}

fn render(file: Option<PathBuf>, flavor: Flavor, config: &ViewerConfig) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path).into_diagnostic()?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            buf
        }
    };
    let classes = match flavor {
        Flavor::Content => config.content_classes.clone(),
        Flavor::Assistant => config.assistant_classes.clone(),
    };
    println!("{}", Renderer::new(flavor).with_classes(classes).render(&text));
    Ok(())
}

fn list_weeks(path: PathBuf) -> Result<()> {
    let feed = Feed::load(&path)?;
    if feed.is_empty() {
        println!("No weeks in {}", path.display());
        return Ok(());
    }
    for week in feed.weeks() {
        println!(
            "{}  {}  ({} items, {} assignments)",
            week.key,
            week.title(),
            week.items.len(),
            week.assignments().count()
        );
    }
    Ok(())
}

fn export(path: PathBuf, dest: PathBuf, only: Option<String>, config: &ViewerConfig) -> Result<()> {
    let feed = Feed::load(&path)?;
    let weeks = match only {
        Some(key) => vec![feed.require_week(&key)?],
        None => feed.weeks().collect(),
    };

    std::fs::create_dir_all(&dest).into_diagnostic()?;
    let start = std::time::Instant::now();
    for week in &weeks {
        let _span = tracing::info_span!("export_week", week = week.key).entered();
        let html = render_week_page(week, None, config).into_diagnostic()?;
        let out = dest.join(format!("{}.html", week.key));
        std::fs::write(&out, html).into_diagnostic()?;
        tracing::debug!(path = %out.display(), items = week.items.len(), "wrote week page");
    }

    println!(
        "✓ Exported {} week(s) in {:.2}s",
        weeks.len(),
        start.elapsed().as_secs_f64()
    );
    println!("✓ Output: {}", dest.display());
    Ok(())
}

fn prompt(path: PathBuf, key: &str, topic: Option<String>) -> Result<()> {
    let feed = Feed::load(&path)?;
    let week = feed.require_week(key)?;

    match topic {
        Some(topic) => {
            let request = LearnMoreRequest::new(&topic, week.items.iter().copied())?;
            print!("{}", request.prompt());
        }
        None => {
            let request = SummaryRequest::for_week(&week);
            println!("{}", request.prompt());
            println!("Response schema:");
            println!(
                "{}",
                serde_json::to_string_pretty(&SummaryRequest::response_schema())
                    .into_diagnostic()?
            );
        }
    }
    Ok(())
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
