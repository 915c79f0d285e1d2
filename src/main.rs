use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use podplayer::embed::Dimension;
use podplayer::format::{episode_count_label, format_date, format_duration};
use podplayer::{
    App, DEFAULT_MASTER_FEED, DeepLink, EmbedSettings, LoadEvent, LoadReporter, LoaderOptions,
    MediaElement, NoopReporter, PlayerConfig, ReqwestClient, SharedLoadReporter,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PLAYING: Emoji<'_, '_> = Emoji("▶ ", "> ");
static LINK: Emoji<'_, '_> = Emoji("🔗 ", "[#] ");

/// Load a podcast master feed and resolve a player deep link
#[derive(Parser, Debug)]
#[command(name = "podplayer")]
#[command(about = "Load a podcast master feed, resolve a deep link and print embed code")]
#[command(version)]
struct Args {
    /// Master feed URL listing the podcast feeds
    #[arg(default_value = DEFAULT_MASTER_FEED)]
    feed: String,

    /// Self-hosted relay endpoint, e.g. https://host/proxy.php; tried before the public proxies
    #[arg(long)]
    relay: Option<String>,

    /// Pause between background feed requests, in milliseconds
    #[arg(long, default_value = "500")]
    pause_ms: u64,

    /// Attempts before a failing podcast feed is given up on
    #[arg(long, default_value = "2")]
    max_attempts: u32,

    /// Podcast to select (position in the master feed)
    #[arg(short, long)]
    podcast: Option<usize>,

    /// Episode to load (position in the podcast feed)
    #[arg(short, long, requires = "podcast")]
    episode: Option<usize>,

    /// Deep link URL or query string, e.g. "?podcast=1&episode=2"
    #[arg(long, conflicts_with_all = ["podcast", "episode"])]
    link: Option<String>,

    /// Page URL used in the generated embed code
    #[arg(long, default_value = "index.html")]
    page_url: String,

    /// Iframe width (px, %, em, rem, vh or vw)
    #[arg(long, default_value = "100%")]
    width: Dimension,

    /// Iframe height (px, %, em, rem, vh or vw)
    #[arg(long, default_value = "600px")]
    height: Dimension,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Load reporter using indicatif for terminal output
struct IndicatifReporter {
    multi: MultiProgress,
    spinner: Mutex<Option<ProgressBar>>,
}

impl IndicatifReporter {
    fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            spinner: Mutex::new(None),
        }
    }

    fn spinner(&self) -> Option<ProgressBar> {
        let mut slot = self.spinner.lock().ok()?;
        if let Some(bar) = slot.as_ref() {
            return Some(bar.clone());
        }

        let style = ProgressStyle::with_template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        *slot = Some(bar.clone());
        Some(bar)
    }

    fn finish_spinner(&self) {
        if let Some(bar) = self.spinner.lock().ok().and_then(|mut slot| slot.take()) {
            bar.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        // Only fails when the terminal is gone
        let _ = self.multi.println(line);
    }
}

impl LoadReporter for IndicatifReporter {
    fn report(&self, event: LoadEvent) {
        match event {
            LoadEvent::LoadingStarted { message } => {
                if let Some(bar) = self.spinner() {
                    bar.set_message(message);
                }
            }

            LoadEvent::FetchingMasterFeed { url } => {
                if let Some(bar) = self.spinner() {
                    bar.set_message(format!("{SEARCH}Fetching master feed: {}", url.cyan()));
                }
            }

            LoadEvent::IndexReady { podcast_count } => {
                self.println(format!(
                    "{HEADPHONES}Found {} podcasts",
                    podcast_count.to_string().cyan()
                ));
            }

            LoadEvent::Hydrating { title, .. } => {
                if let Some(bar) = self.spinner() {
                    bar.set_message(format!("Loading {}...", title.bold()));
                }
            }

            LoadEvent::Hydrated {
                title,
                episode_count,
                ..
            } => {
                self.println(format!(
                    "  {SUCCESS}{} {}",
                    truncate_title(&title, 40).green(),
                    format!("({})", episode_count_label(episode_count)).dimmed()
                ));
            }

            LoadEvent::HydrationFailed { title, error, .. } => {
                self.println(format!(
                    "  {FAILURE}{} - {}",
                    truncate_title(&title, 30).red(),
                    error.dimmed()
                ));
            }

            LoadEvent::BackgroundCompleted { loaded, total } => {
                self.finish_spinner();
                self.println(format!(
                    "{} {}/{} podcasts loaded",
                    "Catalog ready:".bold().green(),
                    loaded.to_string().green().bold(),
                    total.to_string().cyan()
                ));
            }

            LoadEvent::LoadingFinished => self.finish_spinner(),

            LoadEvent::Error { message } => {
                self.println(format!("{FAILURE}{}", message.red().bold()));
            }
        }
    }
}

/// Media element with no audio output; it only tracks position and volume
#[derive(Debug)]
struct HeadlessMedia {
    position: f64,
    volume: f64,
}

impl Default for HeadlessMedia {
    fn default() -> Self {
        Self {
            position: 0.0,
            volume: 1.0,
        }
    }
}

impl MediaElement for HeadlessMedia {
    fn set_source(&mut self, _url: &str) {
        self.position = 0.0;
    }

    fn load(&mut self) {
        self.position = 0.0;
    }

    fn play(&mut self) -> Result<(), String> {
        Err("no audio output available".to_string())
    }

    fn pause(&mut self) {}

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds.max(0.0);
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn buffered_end(&self) -> Option<f64> {
        None
    }

    fn set_playback_rate(&mut self, _rate: f64) {}

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let kept: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn deep_link(args: &Args) -> DeepLink {
    match &args.link {
        Some(link) if link.contains("://") => DeepLink::from_url(link),
        Some(query) => DeepLink::from_query(query),
        None => DeepLink {
            podcast: args.podcast,
            episode: args.episode,
            ..DeepLink::default()
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podplayer".bold().magenta(),
            "- Podcast Player".dimmed()
        );
    }

    let link = deep_link(&args);
    let config = PlayerConfig {
        master_feed_url: args.feed.clone(),
        local_relay: args.relay.clone(),
        loader: LoaderOptions {
            hydration_pause: Duration::from_millis(args.pause_ms),
            max_hydration_attempts: args.max_attempts,
        },
        embed: EmbedSettings {
            page_url: args.page_url.clone(),
            width: args.width,
            height: args.height,
            options: link.options.clone(),
        },
    };

    let reporter: SharedLoadReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let mut app = App::new(&config, ReqwestClient::new(), HeadlessMedia::default(), reporter);

    app.start(&config.master_feed_url)
        .await
        .context("Failed to load podcasts")?;
    app.apply_deep_link(&link)
        .await
        .context("Failed to apply deep link")?;
    app.wait_for_background().await;

    let state = app.player().snapshot();
    let options = app.display_options().clone();
    let catalog = app.catalog().read().await;

    println!("\n{}", "Podcasts".bold());
    for podcast in options.ordered_podcasts(catalog.podcasts()) {
        let selected = state.current_podcast == Some(podcast.id);
        let count = podcast
            .display_episode_count()
            .map(episode_count_label)
            .unwrap_or_default();
        let marker = if selected { "*".green().bold() } else { " ".normal() };
        let title = if selected {
            podcast.title.bold()
        } else {
            podcast.title.normal()
        };
        println!(" {marker} [{}] {} {}", podcast.id, title, count.dimmed());
    }

    let Some(podcast) = state.current_podcast.and_then(|id| catalog.get(id)) else {
        return Ok(());
    };

    println!("\n{}", podcast.title.bold().magenta());
    let episodes = options.visible_episodes(&podcast.episodes);
    if episodes.is_empty() {
        println!("  {}", "No episodes available".dimmed());
    }
    for episode in episodes {
        let marker = if state.current_episode == Some(episode.id) {
            format!("{PLAYING}").green()
        } else {
            "  ".normal()
        };
        let duration = if episode.duration.is_empty() {
            String::new()
        } else {
            format_duration(&episode.duration)
        };
        println!(
            " {marker}[{}] {} {} {}",
            episode.id,
            truncate_title(&episode.title, 60),
            format_date(&episode.pub_date).dimmed(),
            duration.cyan()
        );
    }

    if let Some(code) = app.embed_code() {
        println!("\n{LINK}{}\n{}", "Embed code".bold(), code);
    }
    if let Some(download) = app.player().download_link(podcast) {
        println!(
            "\n{} {} {}",
            "Download:".bold(),
            download.url.cyan(),
            format!("({})", download.filename).dimmed()
        );
    }

    println!();
    Ok(())
}
