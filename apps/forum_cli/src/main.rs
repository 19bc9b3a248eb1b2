use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings,
    page::ControlDataset,
    ClickOutcome, HeadlessNavigator, HttpReactionApi, PageController, PageModel, ReactionClient,
    UiAction, UiEvent,
};
use shared::{
    domain::{CommentId, PostFilter, ReactionChoice},
    protocol::BodyEncoding,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "forum", about = "Drive forum page interactions from the terminal")]
struct Args {
    /// Forum base url; overrides settings file and environment.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    session_token: Option<String>,
    /// Request body encoding: json or form.
    #[arg(long, global = true)]
    encoding: Option<BodyEncoding>,
    /// Saved HTML of the page the action happens on.
    #[arg(long, global = true)]
    page: Option<PathBuf>,
    /// Address of the page; defaults to the forum base url.
    #[arg(long, global = true)]
    location: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Click a like or dislike control.
    React {
        #[arg(long)]
        post_id: Option<String>,
        #[arg(long)]
        comment_id: Option<String>,
        #[arg(long)]
        choice: String,
    },
    /// Show only the posts a filter admits.
    Filter {
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Switch a comment between its content and its edit form.
    ToggleEdit {
        #[arg(long)]
        comment_id: i64,
    },
    Back,
    Share {
        #[arg(long, default_value = "")]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(token) = args.session_token {
        settings.session_token = Some(token);
    }
    if let Some(encoding) = args.encoding {
        settings.body_encoding = encoding;
    }

    let mut page = match &args.page {
        Some(path) => {
            let html = fs::read_to_string(path)
                .with_context(|| format!("reading page {}", path.display()))?;
            PageModel::from_html(&html)?
        }
        None => PageModel::new(),
    };

    let action = match args.command {
        Command::React {
            post_id,
            comment_id,
            choice,
        } => {
            let dataset = ControlDataset {
                post_id,
                comment_id,
                choice: Some(choice),
            };
            if let Ok((target, _)) = dataset.resolve() {
                if page.reaction(target).is_none() {
                    page.insert_reaction(target, Default::default());
                }
            }
            UiAction::React { dataset }
        }
        Command::Filter { filter } => UiAction::FilterPosts {
            filter: filter.parse::<PostFilter>()?,
        },
        Command::ToggleEdit { comment_id } => UiAction::ToggleCommentEdit {
            comment_id: CommentId(comment_id),
        },
        Command::Back => UiAction::Back,
        Command::Share { title } => UiAction::Share { title },
    };

    let location = match args.location {
        Some(raw) => Url::parse(&raw).with_context(|| format!("invalid location '{raw}'"))?,
        None => settings.base_url()?,
    };
    let navigator = Arc::new(HeadlessNavigator::new(location));
    let api = HttpReactionApi::from_settings(&settings)?;
    let client = ReactionClient::new(Arc::new(api));
    let controller =
        PageController::init(page, client, navigator.clone(), settings.login_url()?).await;

    info!(?action, "dispatching page action");
    let outcome = controller.dispatch(action).await;
    info!(
        default_prevented = outcome.default_prevented,
        event = ?outcome.event,
        "page action handled"
    );
    report(&controller, &outcome).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if let Some(copied) = navigator.clipboard() {
        println!("clipboard: {copied}");
    }

    Ok(())
}

async fn report(controller: &PageController, outcome: &ClickOutcome) {
    match &outcome.event {
        UiEvent::ReactionApplied { target, .. } | UiEvent::StaleReactionIgnored { target, .. } => {
            if let Some(controls) = controller.page().await.reaction(*target) {
                println!(
                    "{target}: {}  {}",
                    controls.label(ReactionChoice::Like),
                    controls.label(ReactionChoice::Dislike)
                );
            }
        }
        UiEvent::ReactionNotRendered { target, state, .. } => {
            println!(
                "{target}: 👍 {}  👎 {} (not on page)",
                state.counts.likes, state.counts.dislikes
            );
        }
        UiEvent::Notice(notice) => eprintln!("{}", notice.message),
        UiEvent::RedirectedToLogin { url } => eprintln!("sign in at {url}"),
        _ => {}
    }
}
