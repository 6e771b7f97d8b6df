#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, bail, Context};
use bratgen_rs::bratgen_canvas2d::{FontConfig, ResolvedFontConfig};
use bratgen_rs::export::{encode_with_quality, export_surface, thumbnail_data_uri, write_to_path};
use bratgen_rs::gallery::{FileStore, Gallery};
use bratgen_rs::image_loading::load_image_file;
use bratgen_rs::presets;
use bratgen_rs::{EngineConfig, ExportFormat, FastRandom, StyleState, Tool};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use std::path::PathBuf;
use std::str::FromStr;

/// bratgen: render brat style album covers, memes and text images from JSON states
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a style state to an image file
    Render {
        /// Path to input state JSON. Missing fields take the tool defaults
        #[arg(short, long)]
        input: String,

        /// Path to output image file to be created
        #[arg(short, long)]
        output: String,

        /// Tool: album-cover, meme or brat-pro. Defaults to the "tool" field of the input
        #[arg(short, long)]
        tool: Option<String>,

        /// Image format: png, jpeg or webp. Defaults to the output file extension
        #[arg(short, long)]
        format: Option<String>,

        /// Export width in pixels
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Export height in pixels
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Export size preset such as 1080x1080 or 1920x1080
        #[arg(long, conflicts_with_all = ["width", "height"])]
        size: Option<String>,

        /// Background image drawn with cover fit
        #[arg(long)]
        background_image: Option<String>,

        /// JPEG quality, 1 to 100
        #[arg(long, default_value = "90")]
        quality: u8,

        /// Seed for decoration placement
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        fonts: FontArgs,
    },

    /// Print the default state of a tool as JSON
    Defaults {
        /// Tool: album-cover, meme or brat-pro
        #[arg(short, long, default_value = "album-cover")]
        tool: String,

        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Manage saved designs
    Gallery {
        #[command(subcommand)]
        command: GalleryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum GalleryCommands {
    /// List saved designs, newest first
    List {
        #[command(flatten)]
        gallery: GalleryArgs,
    },

    /// Save a state JSON file as a new design
    Add {
        #[command(flatten)]
        gallery: GalleryArgs,

        /// Path to input state JSON
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        fonts: FontArgs,
    },

    /// Delete a design
    Remove {
        #[command(flatten)]
        gallery: GalleryArgs,

        /// Id of the design to delete
        #[arg(long)]
        id: String,
    },

    /// Write the state of one design, or the whole gallery export document
    Export {
        #[command(flatten)]
        gallery: GalleryArgs,

        /// Id of a single design. Without it the whole gallery is exported
        #[arg(long)]
        id: Option<String>,

        /// Output file. Defaults to stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Merge a gallery export document into the gallery
    Import {
        #[command(flatten)]
        gallery: GalleryArgs,

        /// Path to a gallery export document
        #[arg(short, long)]
        input: String,
    },

    /// Delete every design
    Clear {
        #[command(flatten)]
        gallery: GalleryArgs,
    },
}

#[derive(Args, Debug)]
struct GalleryArgs {
    /// Tool whose gallery to use: album-cover, meme or brat-pro
    #[arg(short, long, default_value = "album-cover")]
    tool: String,

    /// Gallery JSON file. Defaults to a per-tool file under ~/.bratgen
    #[arg(short, long)]
    gallery: Option<String>,

    /// Fill an empty gallery with sample designs
    #[arg(long)]
    samples: bool,
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Additional directory to search for fonts
    #[arg(long)]
    font_dir: Vec<String>,

    /// Do not load system fonts
    #[arg(long)]
    no_system_fonts: bool,
}

impl FontArgs {
    fn font_config(&self) -> FontConfig {
        FontConfig {
            load_system_fonts: !self.no_system_fonts,
            font_dirs: self.font_dir.iter().map(|dir| expand_path(dir)).collect(),
            ..FontConfig::default()
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).to_string())
}

fn parse_tool(tool: &str) -> anyhow::Result<Tool> {
    Tool::from_str(tool).map_err(|err| anyhow!(err))
}

fn read_state(input: &str, tool: Option<&str>) -> anyhow::Result<StyleState> {
    let path = expand_path(input);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let snapshot: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    let tool = match tool.or_else(|| snapshot.get("tool").and_then(|t| t.as_str())) {
        Some(tool) => parse_tool(tool)?,
        None => Tool::default(),
    };
    log::debug!("Read {} state from {}", tool, path.display());
    Ok(StyleState::merge_over_defaults(tool, &snapshot))
}

fn write_output(output: Option<&str>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(output) => {
            let path = expand_path(output);
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            println!("{}", contents);
            Ok(())
        }
    }
}

fn open_gallery(args: &GalleryArgs) -> anyhow::Result<Gallery> {
    let tool = parse_tool(&args.tool)?;
    let store = match &args.gallery {
        Some(path) => FileStore::new(expand_path(path)),
        None => FileStore::in_dir(&expand_path("~/.bratgen"), tool),
    };
    log::info!("Using gallery {}", store.path().display());
    let config = EngineConfig {
        seed_gallery: args.samples,
        ..EngineConfig::default()
    };
    Ok(Gallery::open(tool, Box::new(store), &config))
}

#[allow(clippy::too_many_arguments)]
fn render_command(
    input: &str,
    output: &str,
    tool: Option<&str>,
    format: Option<&str>,
    size: Option<(u32, u32)>,
    background_image: Option<&str>,
    quality: u8,
    seed: Option<u64>,
    fonts: &FontArgs,
) -> anyhow::Result<()> {
    let mut state = read_state(input, tool)?;
    if let Some(image) = background_image {
        let handle = load_image_file(&expand_path(image))?;
        state.set_background_image(handle);
    }

    let output_path = expand_path(output);
    let format = match format {
        Some(format) => ExportFormat::from_str(format).map_err(|err| anyhow!(err))?,
        None => ExportFormat::from_path(&output_path).unwrap_or_default(),
    };
    let (width, height) = size.unwrap_or((state.export_width, state.export_height));

    let fonts = ResolvedFontConfig::new(&fonts.font_config());
    let mut rng = match seed {
        Some(seed) => FastRandom::with_seed(seed),
        None => FastRandom::new(),
    };
    let surface = export_surface(&state, width, height, &fonts, &mut rng)?;
    let bytes = encode_with_quality(&surface, format, quality)?;
    write_to_path(&bytes, &output_path)
        .with_context(|| format!("Failed to write output to {}", output_path.display()))?;
    log::info!(
        "Wrote {}x{} {} to {}",
        width,
        height,
        format,
        output_path.display()
    );
    Ok(())
}

fn gallery_command(command: GalleryCommands) -> anyhow::Result<()> {
    match command {
        GalleryCommands::List { gallery } => {
            let gallery = open_gallery(&gallery)?;
            let listing = gallery
                .items()
                .iter()
                .map(|item| {
                    let when = chrono::DateTime::from_timestamp_millis(item.timestamp)
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    format!("{}\t{}\t{}", item.id, when, item.title)
                })
                .join("\n");
            if !listing.is_empty() {
                println!("{}", listing);
            }
        }
        GalleryCommands::Add {
            gallery,
            input,
            fonts,
        } => {
            let mut gallery = open_gallery(&gallery)?;
            let state = read_state(&input, Some(gallery.tool().name()))?;
            let fonts = ResolvedFontConfig::new(&fonts.font_config());
            let thumbnail = thumbnail_data_uri(
                &state,
                EngineConfig::default().thumbnail_size,
                &fonts,
                &mut FastRandom::new(),
            )?;
            println!("{}", gallery.save_item(thumbnail, &state)?);
        }
        GalleryCommands::Remove { gallery, id } => {
            let mut gallery = open_gallery(&gallery)?;
            if !gallery.delete(&id)? {
                bail!("Gallery item not found: {}", id);
            }
        }
        GalleryCommands::Export {
            gallery,
            id,
            output,
        } => {
            let gallery = open_gallery(&gallery)?;
            let contents = match id {
                Some(id) => serde_json::to_string_pretty(&gallery.load_state(&id)?)?,
                None => gallery.export_json()?,
            };
            write_output(output.as_deref(), &contents)?;
        }
        GalleryCommands::Import { gallery, input } => {
            let mut gallery = open_gallery(&gallery)?;
            let path = expand_path(&input);
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            println!("Imported {} items", gallery.import_json(&data)?);
        }
        GalleryCommands::Clear { gallery } => {
            open_gallery(&gallery)?.clear()?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            tool,
            format,
            width,
            height,
            size,
            background_image,
            quality,
            seed,
            fonts,
        } => {
            let size = match (size, width, height) {
                (Some(size), _, _) => Some(presets::parse_size(&size).ok_or_else(|| {
                    anyhow!("Invalid size {:?}, expected WIDTHxHEIGHT", size)
                })?),
                (None, Some(width), Some(height)) => Some((width, height)),
                _ => None,
            };
            render_command(
                &input,
                &output,
                tool.as_deref(),
                format.as_deref(),
                size,
                background_image.as_deref(),
                quality,
                seed,
                &fonts,
            )?;
        }
        Commands::Defaults { tool, pretty } => {
            let state = StyleState::defaults_for(parse_tool(&tool)?);
            let json = if pretty {
                serde_json::to_string_pretty(&state)?
            } else {
                serde_json::to_string(&state)?
            };
            println!("{}", json);
        }
        Commands::Gallery { command } => gallery_command(command)?,
    }
    Ok(())
}
