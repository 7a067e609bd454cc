use clap::{Args, Parser, Subcommand};
use exif_frame::config::{self, FrameConfig};
use exif_frame::exif::{ExifDecoder, NomExifDecoder, read_exif_segment};
use exif_frame::imaging::{Compositor, ExportFormat, Quality, RasterSurface};
use exif_frame::output;
use exif_frame::session::{EditorSession, LoadOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "exif-frame")]
#[command(about = "Frame photos with a border, a logo and EXIF captions")]
#[command(long_about = "\
Frame photos with a border, a logo and EXIF captions

The photo is placed on a larger canvas. A brand logo is centred in the band
below it and text lines are filled from the photo's EXIF data:

  +------------------------------+
  |                              |
  |            photo             |
  |                   (c)houkunlin|
  +------------------------------+
  | SONY ILCE-7RM3A  [logo]  lens|
  | 2021-07-24 19:50  f/4 1/40s  |
  +------------------------------+

Every length is a fraction of the photo width, so a layout looks the same
at any resolution. JPEG output keeps the photo's original EXIF block.

Text placeholders: {{brand}} {{model}} {{lens}} {{copyright}}
{{captureTime}} {{aperture}} {{shutterSpeed}} {{focalLength}} {{iso}}

Run 'exif-frame gen-config' to generate a documented exif-frame.toml.")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Stock defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in layout to start from, overriding the config file
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Log debug detail (render timings, decode sizes)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// A photo plus the optional logo to frame it with.
#[derive(Args, Clone)]
struct PhotoArgs {
    /// Photo to frame (JPEG or PNG)
    photo: PathBuf,

    /// Logo image; defaults to the config's [logos] entry for the photo's brand
    #[arg(long)]
    logo: Option<PathBuf>,

    /// TrueType font file, overriding font.path
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render a framed photo and write it to disk
    Render {
        #[command(flatten)]
        input: PhotoArgs,

        /// Output file or directory (default: next to the photo)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// jpg or png, overriding export.format
        #[arg(long)]
        format: Option<ExportFormat>,

        /// JPEG quality 1-100, overriding export.quality
        #[arg(long)]
        quality: Option<u32>,

        /// Do not copy the photo's EXIF into the output
        #[arg(long)]
        no_exif: bool,
    },
    /// Print the resolved frame geometry without rendering
    Resolve {
        #[command(flatten)]
        input: PhotoArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the EXIF display fields of a photo
    Exif {
        photo: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in layouts
    Presets,
    /// Print a stock exif-frame.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render {
            input,
            output,
            format,
            quality,
            no_exif,
        } => {
            let config = config::load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            let mut options = config.export.options();
            if let Some(format) = format {
                options.format = format;
            }
            if let Some(quality) = quality {
                options.quality = Quality::new(quality);
            }
            if no_exif {
                options.keep_exif = false;
            }

            let session = open_session(&config, &input).await?;
            let resolved = session
                .render_now()
                .await?
                .ok_or("no photo to render")?;
            let bytes = session.export(options).await?;

            let name = session.photo_name().unwrap_or_default();
            let file_name = output::watermark_file_name(&name, options.format);
            let target = output_path(output.as_deref(), &input.photo, &file_name);
            tokio::fs::write(&target, &bytes).await?;

            let exif_bytes = if options.keep_exif && options.format.carries_exif() {
                session.exif_segment_len()
            } else {
                0
            };
            output::print_export(
                &file_name,
                &target,
                &resolved,
                options.format,
                bytes.len(),
                exif_bytes,
            );
        }
        Command::Resolve { input, json } => {
            let config = config::load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            let session = open_session(&config, &input).await?;
            let Some(resolved) = session.snapshot().resolve() else {
                return Err("no photo to resolve".into());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                output::print_resolved(&resolved, &config.layout.border, &session.fields());
            }
        }
        Command::Exif { photo, json } => {
            let bytes = tokio::fs::read(&photo).await?;
            let (fields, segment_len) = tokio::task::spawn_blocking(move || {
                let segment_len = if bytes.starts_with(&[0xFF, 0xD8]) {
                    read_exif_segment(&bytes).len()
                } else {
                    0
                };
                (NomExifDecoder::new().decode(&bytes), segment_len)
            })
            .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                output::print_fields(&fields);
                println!("APP1 segment: {} bytes", segment_len);
            }
        }
        Command::Presets => output::print_presets(),
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `-v` turns on debug logging; `RUST_LOG` still wins when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Build a session and load the photo plus its logo into it.
async fn open_session(
    config: &FrameConfig,
    input: &PhotoArgs,
) -> Result<EditorSession<RasterSurface>, Box<dyn std::error::Error>> {
    let font = input.font.as_deref().or(config.font.path.as_deref());
    let surface = RasterSurface::with_font_file(font)?;
    let compositor = Compositor::new(surface).with_font_family(config.font.family.clone());
    let session = EditorSession::new(
        compositor,
        Arc::new(NomExifDecoder::new()),
        config.layout.clone(),
        config.debounce(),
    );

    let name = input
        .photo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = tokio::fs::read(&input.photo).await?;
    session.load_photo(bytes, name).await?;

    let brand = session.fields().brand;
    let logo = input
        .logo
        .as_deref()
        .or_else(|| config.logo_for_brand(&brand));
    if let Some(logo) = logo {
        log::debug!("Using logo {}", logo.display());
        let bytes = tokio::fs::read(logo).await?;
        if session.load_logo(bytes).await? == LoadOutcome::Superseded {
            log::warn!("Logo load was superseded");
        }
    }
    Ok(session)
}

/// Where to write the export: an explicit file, a file inside an existing
/// directory, or next to the source photo.
fn output_path(output: Option<&Path>, photo: &Path, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => photo
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}
