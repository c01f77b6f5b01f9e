use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use fcdesign::platform::FontsReady;
use fcdesign::rendering::pixmap::Pixmap;
use fcdesign::rendering::text::{HeadlessRasterizer, TextRasterizer};
use fcdesign::scene::{CoverInputs, CoverScene, PostInputs, PostScene, Scene};
use fcdesign::{RenderConfig, RenderOutcome, RenderSession};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "fcdesign", about = "Render contest cover and post images")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Font file to register, as FILE or FILE:WEIGHT (repeatable)
    #[arg(long = "font", global = true)]
    fonts: Vec<String>,

    /// Family name the font files are registered under
    #[arg(long, global = true, default_value = "CA Saygon Text")]
    family: String,

    /// Override the scene's supersampling factor
    #[arg(long, global = true)]
    supersample: Option<u32>,

    /// Output PNG path
    #[arg(long, global = true, default_value = "out.png")]
    out: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 820x360 cover with the contest schedule
    Cover {
        /// Source text file (title line, then one line per contest)
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        background: Option<PathBuf>,
        #[arg(long)]
        logo: Option<PathBuf>,
    },
    /// 1080x1080 post with a duotone photo
    Post {
        /// JSON file with the post fields; missing fields keep their defaults
        #[arg(long)]
        inputs: Option<PathBuf>,
        #[arg(long)]
        photo: Option<PathBuf>,
        /// White-to-black backdrop used without a photo
        #[arg(long)]
        fallback: Option<PathBuf>,
        #[arg(long)]
        badge: Option<PathBuf>,
        #[arg(long)]
        logo: Option<PathBuf>,
    },
}

/// `FILE[:WEIGHT]`; a suffix that is not a number belongs to the path.
fn parse_font_arg(arg: &str) -> (PathBuf, u16) {
    match arg.rsplit_once(':') {
        Some((path, weight)) if !path.is_empty() => match weight.parse::<u16>() {
            Ok(w) => (PathBuf::from(path), w),
            Err(_) => (PathBuf::from(arg), 400),
        },
        _ => (PathBuf::from(arg), 400),
    }
}

#[cfg(feature = "glyph")]
fn rasterizer(fonts: &[String], family: &str) -> anyhow::Result<Arc<dyn TextRasterizer>> {
    use fcdesign::rendering::fonts::{FontBook, GlyphRasterizer};

    if fonts.is_empty() {
        warn!("no --font given; text is drawn with placeholder blocks");
        return Ok(Arc::new(HeadlessRasterizer::new()));
    }
    let mut book = FontBook::new();
    for arg in fonts {
        let (path, weight) = parse_font_arg(arg);
        book.load_file(family, weight, &path)
            .with_context(|| format!("loading font {}", path.display()))?;
    }
    Ok(Arc::new(GlyphRasterizer::new(book)))
}

#[cfg(not(feature = "glyph"))]
fn rasterizer(fonts: &[String], _family: &str) -> anyhow::Result<Arc<dyn TextRasterizer>> {
    if !fonts.is_empty() {
        bail!("--font needs the `glyph` feature");
    }
    Ok(Arc::new(HeadlessRasterizer::new()))
}

async fn optional_image(session: &RenderSession, path: Option<&Path>) -> Option<Arc<Pixmap>> {
    let path = path?;
    match session.load_image(path).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            None
        }
    }
}

async fn build_scene(session: &RenderSession, command: &Command) -> anyhow::Result<Arc<dyn Scene>> {
    match command {
        Command::Cover { source, background, logo } => {
            let inputs = match source {
                Some(path) => CoverInputs {
                    source: std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?,
                },
                None => CoverInputs::default(),
            };
            let scene = CoverScene {
                inputs,
                background: optional_image(session, background.as_deref()).await,
                logo: optional_image(session, logo.as_deref()).await,
            };
            Ok(Arc::new(scene))
        }
        Command::Post { inputs, photo, fallback, badge, logo } => {
            let inputs: PostInputs = match inputs {
                Some(path) => {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?
                }
                None => PostInputs::default(),
            };
            // A photo the user asked for must load; decorations may be missing.
            let photo = match photo {
                Some(path) => Some(
                    session
                        .load_image(path.clone())
                        .await
                        .with_context(|| format!("decoding {}", path.display()))?,
                ),
                None => None,
            };
            let scene = PostScene {
                inputs,
                photo,
                fallback: optional_image(session, fallback.as_deref()).await,
                badge: optional_image(session, badge.as_deref()).await,
                logo: optional_image(session, logo.as_deref()).await,
            };
            Ok(Arc::new(scene))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let rasterizer = rasterizer(&cli.fonts, &cli.family)?;
    let config = RenderConfig { supersample: cli.supersample, debounce_ms: 0, ..Default::default() };
    let session = RenderSession::new(FontsReady::ready(rasterizer), config);

    let scene = build_scene(&session, &cli.command).await?;
    let shot = match session.render(scene).await? {
        RenderOutcome::Presented(shot) => shot,
        RenderOutcome::Superseded => bail!("render was superseded"),
    };
    session.close().await?;

    std::fs::write(&cli.out, shot.to_png()?).with_context(|| format!("writing {}", cli.out.display()))?;
    info!("wrote {} ({}x{})", cli.out.display(), shot.width, shot.height);
    println!("{}", shot.digest());
    Ok(())
}
