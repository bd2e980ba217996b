use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use scoreshare::platform::{
    DirectoryShareTarget, Platform, PlatformCapabilities, PromptPermission, Services,
    StaticPermission,
};
use scoreshare::{
    BackgroundImage, CaptureOptions, CardContent, ImageFormat, ResultKind, ScoreCard, ShareConfig,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "scoreshare", version, about = "Render a score card and share it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct CardArgs {
    /// Player name shown above the score
    #[arg(long)]
    player: String,
    /// Score shown in large type
    #[arg(long)]
    score: String,
    /// Background image (cover-fitted); a flat fill when omitted
    #[arg(long)]
    background: Option<PathBuf>,
}

impl CardArgs {
    fn content(&self) -> CardContent {
        let content = CardContent::new(&self.player, &self.score);
        match &self.background {
            Some(path) => content.with_background(BackgroundImage::Path(path.clone())),
            None => content,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Capture the card to an image file
    Render {
        #[command(flatten)]
        card: CardArgs,
        /// Output file
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value = "png")]
        format: FormatArg,
        /// 0.0..=1.0, only used for JPEG
        #[arg(long, default_value_t = 1.0)]
        quality: f32,
    },
    /// Run the full share workflow into an outbox directory
    Share {
        #[command(flatten)]
        card: CardArgs,
        /// Directory that receives shared images
        #[arg(long)]
        outbox: PathBuf,
        /// android, ios or desktop (defaults to the host)
        #[arg(long)]
        platform: Option<Platform>,
        /// Answer the storage permission request with "no"
        #[arg(long, conflicts_with = "prompt")]
        deny_permission: bool,
        /// Ask for storage permission on the terminal
        #[arg(long)]
        prompt: bool,
        /// JSON config file (see ShareConfig)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for ImageFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Returns whether the file was removed. Failures are logged, not raised.
fn remove_temp_capture(tmp: &Path) -> bool {
    match std::fs::remove_file(tmp) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to remove temporary capture {}: {}", tmp.display(), e);
            false
        }
    }
}

async fn render(
    card: CardArgs,
    out: PathBuf,
    format: FormatArg,
    quality: f32,
) -> anyhow::Result<()> {
    let share = Arc::new(DirectoryShareTarget::new(std::env::temp_dir()));
    let cfg = ShareConfig {
        temp_dir: Some(std::env::temp_dir()),
        ..Default::default()
    };
    let card = ScoreCard::mount(card.content(), Services::new(share), cfg)
        .await
        .context("failed to mount score card")?;
    let options = CaptureOptions {
        format: format.into(),
        quality,
        result: ResultKind::TmpFile,
    };
    let capture = card.capture(&options).await.context("capture failed")?;
    let Some(tmp) = capture.path else {
        bail!("capture did not produce a file");
    };
    std::fs::copy(&tmp, &out).with_context(|| format!("failed to write {}", out.display()))?;
    remove_temp_capture(&tmp);
    println!("{} ({}x{})", out.display(), capture.width, capture.height);
    Ok(())
}

async fn share(
    card: CardArgs,
    outbox: PathBuf,
    platform: Option<Platform>,
    deny_permission: bool,
    prompt: bool,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cfg = match config {
        Some(path) => ShareConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ShareConfig::default(),
    };
    let capabilities =
        PlatformCapabilities::for_platform(platform.unwrap_or_else(Platform::current));
    let mut services =
        Services::new(Arc::new(DirectoryShareTarget::new(outbox))).with_capabilities(capabilities);
    if deny_permission {
        services = services.with_permissions(Arc::new(StaticPermission::denied()));
    } else if prompt {
        services = services.with_permissions(Arc::new(PromptPermission));
    }

    let status = Arc::new(Mutex::new(None));
    let seen = status.clone();
    let card = ScoreCard::mount(card.content(), services, cfg)
        .await
        .context("failed to mount score card")?
        .on_share(move |outcome| {
            if let Ok(mut s) = seen.lock() {
                *s = Some(outcome.status);
            }
        });

    card.share_score().await;

    let reported = status.lock().ok().and_then(|s| *s);
    match reported {
        Some(s) => println!("Share status: {}", s),
        None => println!("Share status: none ({:?})", card.state()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Render {
            card,
            out,
            format,
            quality,
        } => render(card, out, format, quality).await,
        Command::Share {
            card,
            outbox,
            platform,
            deny_permission,
            prompt,
            config,
        } => share(card, outbox, platform, deny_permission, prompt, config).await,
    }
}
