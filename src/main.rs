mod api;
mod app;
mod auth;
mod config;
mod export;
mod input;
mod lyrics;
mod selection;
mod server;
mod spotify;
mod tui;

use anyhow::{Context, bail};
use api::{ApiClient, LyricsOutcome};
use api::models::Track;
use auth::{BearerToken, Credential};
use clap::{Parser, Subcommand};
use export::{Background, CaptureOptions, CardRasterizer, ExportSession, SnippetFont, export_image};
use lyrics::LyricsDocument;
use selection::{MAX_SELECTED_LINES, Selection};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lyricsnap", version, about = "Search songs, pick lyric lines, export them as an image")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bearer token to start with (skips the login screen).
    #[arg(long, env = "LYRICSNAP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Run the lyrics proxy.
    Serve {
        /// Listen address, overrides [server].bind.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print a login URL, read the redirect back and print the token.
    Login,
    /// Search tracks and print to stdout (headless).
    Search { query: String },
    /// Print numbered lyrics of the n-th search hit (headless).
    Lyrics {
        /// 1-based position in the search results.
        n: usize,
        query: String,
    },
    /// Render selected lines of the n-th search hit to an image (headless).
    Export {
        query: String,
        /// 1-based position in the search results.
        #[arg(long, default_value_t = 1)]
        pick: usize,
        /// Line numbers (0-based) clicked in order, e.g. `--click 2 --click 3`.
        #[arg(long = "click", required = true)]
        clicks: Vec<usize>,
        #[arg(long, value_parser = parse_font, default_value = "sans")]
        font: SnippetFont,
        #[arg(long, value_parser = parse_background, default_value = "sunset")]
        background: Background,
        /// Output directory, overrides [export].output_dir.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let command = cli.command.unwrap_or(Command::Tui);

    init_logging(&cfg, matches!(command, Command::Tui))?;
    let credential = Credential::new(cli.token.filter(|t| !t.trim().is_empty()).map(BearerToken::new));

    match command {
        Command::Tui => {
            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            let mut app = app::App::new(cfg, credential)?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Serve { bind } => {
            let mut server_cfg = cfg.server.clone();
            if let Some(bind) = bind {
                server_cfg.bind = bind;
            }
            server::serve(&server_cfg).await?;
        }
        Command::Login => {
            let request = auth::implicit::AuthorizeRequest::new(&cfg.auth)?;
            eprintln!("Open this URL and approve access:\n\n{}\n", request.url);
            eprintln!("Paste the address your browser landed on:");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).context("read redirect URL")?;
            let callback = request.complete(&line)?;
            if let Some(secs) = callback.expires_in {
                eprintln!("Token valid for {secs}s. Use it with --token or LYRICSNAP_TOKEN.");
            }
            println!("{}", callback.token.as_str());
        }
        Command::Search { query } => {
            let (api, token) = headless_client(&cfg, &credential)?;
            let tracks = api.search(token, &query).await.map_err(user_error)?;
            print_tracks(&tracks);
        }
        Command::Lyrics { n, query } => {
            let (api, token) = headless_client(&cfg, &credential)?;
            let track = pick_track(&api, token, &query, n).await?;
            let doc = fetch_lyrics(&api, token, &track).await?;
            println!("{} - {}\n", track.title, track.artist);
            for (i, line) in doc.lines.iter().enumerate() {
                println!("{:3}  {}", i, line);
            }
            println!("\n{}", doc.source);
        }
        Command::Export {
            query,
            pick,
            clicks,
            font,
            background,
            out,
        } => {
            let (api, token) = headless_client(&cfg, &credential)?;
            let track = pick_track(&api, token, &query, pick).await?;
            let doc = fetch_lyrics(&api, token, &track).await?;

            let selection = replay_clicks(doc.len(), &clicks)?;
            let mut session = ExportSession::open(&track, &doc, &selection)?;
            session.set_font(font);
            session.set_background(background);
            if let Some(req) = session.cover_request() {
                let http = reqwest::Client::new();
                let cover = match app::fetch_cover(&http, &req.url).await {
                    Ok(img) => Some(Arc::new(img)),
                    Err(e) => {
                        tracing::warn!("cover unavailable, exporting without it: {e:#}");
                        None
                    }
                };
                session.cover_loaded(req.key, cover);
            }

            let target = session.begin_capture()?;
            let rasterizer = CardRasterizer::new(export::fonts::FontBook::new(
                cfg.export.font_files.clone(),
                cfg.export.font_dirs.clone(),
            ));
            let out_dir = out.unwrap_or_else(|| cfg.export.output_dir.clone());
            let image = tokio::task::spawn_blocking(move || {
                export_image(&rasterizer, Some(&target), &CaptureOptions::default(), &out_dir)
            })
            .await
            .context("export task")??;
            println!("{} ({}x{})", image.path.display(), image.width, image.height);
        }
    }

    Ok(())
}

/// TUI output goes to a log file so it does not tear the alternate screen.
fn init_logging(cfg: &config::Config, tui: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if tui {
        std::fs::create_dir_all(&cfg.paths.data_dir)
            .with_context(|| format!("create {}", cfg.paths.data_dir.display()))?;
        let path = cfg.paths.data_dir.join("lyricsnap.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn headless_client<'a>(cfg: &config::Config, credential: &'a Credential) -> anyhow::Result<(ApiClient, &'a BearerToken)> {
    let Some(token) = credential.token() else {
        bail!("no token: run `lyricsnap login` and pass it with --token or LYRICSNAP_TOKEN");
    };
    Ok((ApiClient::new(&cfg.proxy.base_url)?, token))
}

fn user_error(e: api::ApiError) -> anyhow::Error {
    tracing::debug!(error = ?e, "request failed");
    anyhow::anyhow!(e.user_message())
}

async fn pick_track(api: &ApiClient, token: &BearerToken, query: &str, n: usize) -> anyhow::Result<Track> {
    let tracks = api.search(token, query).await.map_err(user_error)?;
    if tracks.is_empty() {
        bail!("no tracks found for {query:?}");
    }
    let Some(track) = n.checked_sub(1).and_then(|i| tracks.get(i)) else {
        bail!("pick must be between 1 and {}", tracks.len());
    };
    Ok(track.clone())
}

async fn fetch_lyrics(api: &ApiClient, token: &BearerToken, track: &Track) -> anyhow::Result<LyricsDocument> {
    match api.lyrics(token, track).await.map_err(user_error)? {
        LyricsOutcome::Found(doc) => Ok(doc),
        LyricsOutcome::NotFound { message } => bail!("{}: {message}", track.title),
    }
}

/// Apply `--click` values in order. A rejected click leaves the selection
/// as it was, same as in the TUI.
fn replay_clicks(line_count: usize, clicks: &[usize]) -> anyhow::Result<Selection> {
    let mut selection = Selection::empty();
    for &click in clicks {
        if click >= line_count {
            bail!("line {click} is out of range (song has {line_count} lines)");
        }
        match selection.apply_click(click, MAX_SELECTED_LINES) {
            Ok(next) => selection = next,
            Err(e) => tracing::warn!(line = click, "click ignored: {e}"),
        }
    }
    Ok(selection)
}

fn print_tracks(tracks: &[Track]) {
    for (i, t) in tracks.iter().enumerate() {
        let artist = if t.artist.is_empty() {
            String::new()
        } else {
            format!(" - {}", t.artist)
        };
        println!("{:02}. {}{}  (id={})", i + 1, t.title, artist, t.id);
    }
}

fn parse_font(s: &str) -> Result<SnippetFont, String> {
    SnippetFont::ALL
        .into_iter()
        .find(|f| f.label().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown font {s:?}, expected one of: sans, serif, mono, condensed"))
}

fn parse_background(s: &str) -> Result<Background, String> {
    Background::ALL
        .into_iter()
        .find(|b| b.label().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown background {s:?}, expected one of: sunset, ocean, forest, midnight, candy"))
}
