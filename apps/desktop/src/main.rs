use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_server_url},
    projection::{derive_filename, ImagePane},
    ChannelFile, ColorizeSession, HttpServiceClient, ProcessingService, SubmissionState, Theme,
    ThemeSurface,
};
use shared::domain::{ColorChannel, Palette};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "astro-colorizer", about = "Compose red/green/blue FITS layers into a color image")]
struct Cli {
    /// Processing service base address; overrides colorizer.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Render headings for a dark terminal.
    #[arg(long, global = true)]
    dark: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit three channel files and show the composite.
    Colorize {
        #[arg(long)]
        red: Option<PathBuf>,
        #[arg(long)]
        green: Option<PathBuf>,
        #[arg(long)]
        blue: Option<PathBuf>,
        #[arg(long, default_value_t = Palette::Natural)]
        palette: Palette,
        /// Save the composite locally after a successful run.
        #[arg(long)]
        export: bool,
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Show recent processing attempts.
    History {
        /// Print every entry instead of the latest five.
        #[arg(long)]
        all: bool,
    },
    /// List available palettes.
    Palettes,
}

/// Heading color follows the active theme.
#[derive(Clone, Default)]
struct TerminalTheme(Arc<Mutex<Theme>>);

impl TerminalTheme {
    fn heading(&self, text: &str) -> String {
        let theme = self.0.lock().map(|theme| *theme).unwrap_or_default();
        let color = match theme {
            Theme::Light => "34",
            Theme::Dark => "96",
        };
        format!("\x1b[1;{color}m{text}\x1b[0m")
    }
}

impl ThemeSurface for TerminalTheme {
    fn apply(&mut self, theme: Theme) {
        if let Ok(mut current) = self.0.lock() {
            *current = theme;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(server_url) = &cli.server_url {
        settings.server_url = normalize_server_url(server_url);
    }
    info!(server_url = %settings.server_url, "using processing service");

    let terminal = TerminalTheme::default();
    let mut session = ColorizeSession::from_http(HttpServiceClient::new(&settings.server_url))
        .with_theme_surface(Box::new(terminal.clone()));

    match cli.command {
        Command::Palettes => {
            println!("{}", terminal.heading("Palettes"));
            for palette in Palette::ALL {
                let mapping = palette.mapping();
                println!(
                    "  {:<8} {:<22} R<-{} G<-{} B<-{}",
                    palette.id(),
                    palette.label(),
                    mapping.red_channel,
                    mapping.green_channel,
                    mapping.blue_channel
                );
            }
            return Ok(());
        }
        Command::History { all } => {
            session.mount().await;
            if cli.dark {
                session.toggle_theme();
            }
            print_history(&session, &terminal, all);
        }
        Command::Colorize {
            red,
            green,
            blue,
            palette,
            export,
            export_dir,
        } => {
            session.mount().await;
            if cli.dark {
                session.toggle_theme();
            }
            for (channel, path) in [
                (ColorChannel::Red, red),
                (ColorChannel::Green, green),
                (ColorChannel::Blue, blue),
            ] {
                if let Some(path) = path {
                    session.set_channel(channel, ChannelFile::load(&path).await?);
                }
            }
            session.set_palette(palette);

            run_colorize(&mut session).await;
            print_result(&session, &terminal);
            print_history(&session, &terminal, false);

            if export && session.state() == SubmissionState::Succeeded {
                let dir = export_dir.unwrap_or(settings.export_dir);
                match session.export(&dir).await {
                    Ok(path) => println!("Exported image to {}", path.display()),
                    Err(err) => warn!("export failed: {err}"),
                }
            }
        }
    }

    Ok(())
}

/// Submits through the split API so progress keeps ticking while the request
/// is outstanding.
async fn run_colorize(session: &mut ColorizeSession) {
    let pending = match session.begin_colorize() {
        Ok(pending) => pending,
        Err(err) => {
            warn!("not submitted: {err}");
            return;
        }
    };
    println!("Processing...");

    let processing = session.processing();
    let request = processing.colorize(pending.request);
    tokio::pin!(request);
    let mut ticker = tokio::time::interval(Duration::from_secs(2));
    ticker.tick().await;
    let outcome = loop {
        tokio::select! {
            outcome = &mut request => break outcome,
            _ = ticker.tick() => info!("still processing"),
        }
    };
    session.finish_colorize(pending.attempt, outcome).await;
}

fn print_result(session: &ColorizeSession, terminal: &TerminalTheme) {
    println!("{}", terminal.heading("Visualize & Export"));
    if let Some(message) = session.error_message() {
        println!("  error: {message}");
    }

    let view = session.view();
    match view.pane {
        ImagePane::Loading => println!("  Loading image..."),
        ImagePane::Image(image) => {
            println!("  image: {image}");
            println!("  export name: {}", derive_filename(image));
        }
        ImagePane::Placeholder => println!("  Your colorized image will appear here."),
    }

    if let Some(preview) = view.metadata {
        println!("{}", terminal.heading("FITS Metadata"));
        for (key, value) in &preview.entries {
            println!("  {key:<10} = {value}");
        }
        if preview.truncated() {
            println!("  ...and {} more", preview.total - preview.entries.len());
        }
    }
}

fn print_history(session: &ColorizeSession, terminal: &TerminalTheme, all: bool) {
    println!("{}", terminal.heading("Processing History"));
    let entries = if all {
        session.history().entries()
    } else {
        session.history().visible()
    };
    if entries.is_empty() {
        println!("  No processing history yet.");
        return;
    }
    for entry in entries {
        println!(
            "  {}  [{}]  {}",
            entry.time_of_day(),
            entry.status_class(),
            entry.filename
        );
    }
}
