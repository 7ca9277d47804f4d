use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use atelier_common::types::{ImageStyle, LpSection, LpTone, StyleKind};
use atelier_common::{AspectRatio, AspectSelection, ImageArtifact};
use atelier_core::features::{
    EditorWorkflow, GeneratorWorkflow, LandingWorkflow, PortraitWorkflow, StyleWorkflow,
};
use atelier_core::{media, Config, StudioContext};
use atelier_gemini::{CredentialStore, GeminiClient};

mod slides;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "AI image studio: portraits, landing pages, edits, and slide decks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Override the image model
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },
    /// Generate a styled portrait from reference photos
    Portrait {
        /// Photo of the person to preserve
        #[arg(long)]
        person: Option<PathBuf>,
        /// Photo of the environment to place them in
        #[arg(long)]
        background: Option<PathBuf>,
        /// Rendering style (realistic, cinematic, anime, digital-art,
        /// oil-painting, cyberpunk, studio-headshot, fantasy)
        #[arg(long, default_value = "realistic")]
        style: String,
        /// Extra instructions appended to the prompt
        #[arg(long, default_value = "")]
        extra: String,
        /// Output aspect ratio (16:9, 4:3, 1:1, 9:16, 3:4)
        #[arg(long, default_value = "3:4")]
        aspect: String,
        /// Where to write the result
        #[arg(short, long, default_value = "portrait.png")]
        output: PathBuf,
    },
    /// Generate a landing-page section mock
    Landing {
        /// Section kind (hero, features, cta, pricing, ...)
        #[arg(long, default_value = "hero")]
        section: String,
        /// Visual tone (professional, casual, luxury, playful, minimal, bold)
        #[arg(long, default_value = "professional")]
        tone: String,
        /// What the section is about
        brief: String,
        /// Image whose palette and mood the section should match
        #[arg(long)]
        tone_image: Option<PathBuf>,
        #[arg(long, default_value = "16:9")]
        aspect: String,
        #[arg(short, long, default_value = "landing.png")]
        output: PathBuf,
    },
    /// Apply an edit instruction to an image
    Edit {
        /// Image to edit
        source: PathBuf,
        /// What to change
        instruction: String,
        /// Aspect ratio, or "original" to keep the source shape
        #[arg(long, default_value = "original")]
        aspect: String,
        #[arg(short, long, default_value = "edited.png")]
        output: PathBuf,
    },
    /// Redraw an image in a different rendering style
    Style {
        /// Image to convert
        source: PathBuf,
        /// Target style (anime, cg, hand-drawn, whiteboard, realistic,
        /// watercolor, pixel-art, oil-painting)
        kind: String,
        /// Extra instructions appended to the prompt
        #[arg(long, default_value = "")]
        extra: String,
        /// Aspect ratio, or "original" to keep the source shape
        #[arg(long, default_value = "original")]
        aspect: String,
        #[arg(short, long, default_value = "styled.png")]
        output: PathBuf,
    },
    /// Generate an image from a description
    Generate {
        /// What to generate
        brief: String,
        /// Reference images, in the order the description mentions them
        #[arg(short, long)]
        reference: Vec<PathBuf>,
        #[arg(long, default_value = "1:1")]
        aspect: String,
        #[arg(short, long, default_value = "generated.png")]
        output: PathBuf,
    },
    /// Refine a previously saved result with feedback
    Refine {
        /// The image to refine
        source: PathBuf,
        /// What to change
        feedback: String,
        /// Optional reference image guiding the change
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Aspect ratio, or "original" to keep the source shape
        #[arg(long, default_value = "original")]
        aspect: String,
        #[arg(short, long, default_value = "refined.png")]
        output: PathBuf,
    },
    /// Build a slide deck interactively
    Slides {
        /// Deck theme
        theme: String,
        #[arg(long, default_value = "16:9")]
        aspect: String,
        /// Directory for exported slides and deck.json
        #[arg(short, long, default_value = "deck")]
        output: PathBuf,
    },
    /// Preview an exported deck.json
    Preview {
        /// Path to deck.json
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Store an API key
    Set { value: String },
    /// Report whether a key is available
    Show,
    /// Remove the stored key
    Clear,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Some(model) = &cli.model {
        std::env::set_var("ATELIER_MODEL", model);
    }
    let config = Config::from_env();

    match cli.command {
        Commands::Key { action } => run_key(&config, action),
        Commands::Portrait {
            person,
            background,
            style,
            extra,
            aspect,
            output,
        } => run_portrait(&config, person, background, &style, &extra, &aspect, &output).await,
        Commands::Landing {
            section,
            tone,
            brief,
            tone_image,
            aspect,
            output,
        } => run_landing(&config, &section, &tone, &brief, tone_image, &aspect, &output).await,
        Commands::Edit {
            source,
            instruction,
            aspect,
            output,
        } => run_edit(&config, &source, &instruction, &aspect, &output).await,
        Commands::Style {
            source,
            kind,
            extra,
            aspect,
            output,
        } => run_style(&config, &source, &kind, &extra, &aspect, &output).await,
        Commands::Generate {
            brief,
            reference,
            aspect,
            output,
        } => run_generate(&config, &brief, &reference, &aspect, &output).await,
        Commands::Refine {
            source,
            feedback,
            reference,
            aspect,
            output,
        } => run_refine(&config, &source, &feedback, reference, &aspect, &output).await,
        Commands::Slides {
            theme,
            aspect,
            output,
        } => {
            let ctx = studio_context(&config);
            slides::run_slides(ctx, &theme, parse_aspect(&aspect)?, &output).await
        }
        Commands::Preview { file } => atelier_tui::run_preview(&file),
    }
}

fn studio_context(config: &Config) -> Arc<StudioContext> {
    let store = Arc::new(CredentialStore::new(config.credential_path.clone()));
    let client = Arc::new(GeminiClient::new(config.model.clone(), store.clone()));
    StudioContext::new(client, store)
}

fn parse_aspect(s: &str) -> Result<AspectRatio> {
    s.parse().map_err(anyhow::Error::msg)
}

fn parse_selection(s: &str) -> Result<AspectSelection> {
    s.parse().map_err(anyhow::Error::msg)
}

fn run_key(config: &Config, action: KeyCommands) -> Result<()> {
    let store = CredentialStore::new(config.credential_path.clone());
    match action {
        KeyCommands::Set { value } => {
            store.set(&value)?;
            println!("API key stored at {}", store.path().display());
        }
        KeyCommands::Show => match store.get() {
            Some(key) => {
                let tail: String = key
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                println!("API key available (...{tail})");
            }
            None => println!("No API key stored; set one with `atelier key set`"),
        },
        KeyCommands::Clear => {
            store.clear()?;
            println!("API key cleared");
        }
    }
    Ok(())
}

fn save(artifact: &ImageArtifact, output: &Path) -> Result<()> {
    media::export_raw(artifact, output)?;
    println!("Saved {}", output.display());
    Ok(())
}

/// One line of feedback from the terminal. Empty input or EOF ends
/// the refinement loop.
fn read_feedback(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    if line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line.to_string()))
    }
}

async fn run_portrait(
    config: &Config,
    person: Option<PathBuf>,
    background: Option<PathBuf>,
    style: &str,
    extra: &str,
    aspect: &str,
    output: &Path,
) -> Result<()> {
    let style: ImageStyle = style.parse().map_err(anyhow::Error::msg)?;
    let aspect = parse_aspect(aspect)?;
    let person = person.map(|p| media::load_image(&p)).transpose()?;
    let background = background.map(|p| media::load_image(&p)).transpose()?;

    let mut workflow = PortraitWorkflow::new(studio_context(config));
    let artifact = workflow
        .generate(
            person.as_ref().map(|l| &l.artifact),
            background.as_ref().map(|l| &l.artifact),
            style,
            extra,
            aspect,
        )
        .await?;
    save(&artifact, output)?;

    while let Some(feedback) = read_feedback("refine (blank to finish)> ")? {
        match workflow.refine(&feedback, None, aspect).await {
            Ok(artifact) => save(&artifact, output)?,
            Err(err) => eprintln!("refinement failed: {err}"),
        }
    }
    Ok(())
}

async fn run_landing(
    config: &Config,
    section: &str,
    tone: &str,
    brief: &str,
    tone_image: Option<PathBuf>,
    aspect: &str,
    output: &Path,
) -> Result<()> {
    let section: LpSection = section.parse().map_err(anyhow::Error::msg)?;
    let tone: LpTone = tone.parse().map_err(anyhow::Error::msg)?;
    let aspect = parse_aspect(aspect)?;
    let tone_image = tone_image.map(|p| media::load_image(&p)).transpose()?;

    let mut workflow = LandingWorkflow::new(studio_context(config));
    let artifact = workflow
        .generate(
            section,
            tone,
            brief,
            tone_image.as_ref().map(|l| &l.artifact),
            aspect,
        )
        .await?;
    save(&artifact, output)?;

    while let Some(feedback) = read_feedback("refine (blank to finish)> ")? {
        match workflow.refine(&feedback, aspect).await {
            Ok(artifact) => save(&artifact, output)?,
            Err(err) => eprintln!("refinement failed: {err}"),
        }
    }
    Ok(())
}

async fn run_edit(
    config: &Config,
    source: &Path,
    instruction: &str,
    aspect: &str,
    output: &Path,
) -> Result<()> {
    let selection = parse_selection(aspect)?;
    let loaded = media::load_image(source)?;

    let mut workflow = EditorWorkflow::new(studio_context(config));
    let artifact = workflow
        .edit(
            &loaded.artifact,
            (loaded.width, loaded.height),
            instruction,
            selection,
        )
        .await?;
    save(&artifact, output)?;

    while let Some(instruction) = read_feedback("next edit (blank to finish)> ")? {
        match workflow.refine(&instruction).await {
            Ok(artifact) => save(&artifact, output)?,
            Err(err) => eprintln!("edit failed: {err}"),
        }
    }
    Ok(())
}

async fn run_style(
    config: &Config,
    source: &Path,
    kind: &str,
    extra: &str,
    aspect: &str,
    output: &Path,
) -> Result<()> {
    let kind: StyleKind = kind.parse().map_err(anyhow::Error::msg)?;
    let selection = parse_selection(aspect)?;
    let loaded = media::load_image(source)?;

    let mut workflow = StyleWorkflow::new(studio_context(config));
    let artifact = workflow
        .convert(
            &loaded.artifact,
            (loaded.width, loaded.height),
            kind,
            extra,
            selection,
        )
        .await?;
    save(&artifact, output)?;

    while let Some(feedback) = read_feedback("refine (blank to finish)> ")? {
        match workflow.refine(&feedback, None).await {
            Ok(artifact) => save(&artifact, output)?,
            Err(err) => eprintln!("refinement failed: {err}"),
        }
    }
    Ok(())
}

async fn run_generate(
    config: &Config,
    brief: &str,
    reference_paths: &[PathBuf],
    aspect: &str,
    output: &Path,
) -> Result<()> {
    let aspect = parse_aspect(aspect)?;
    let mut references = Vec::with_capacity(reference_paths.len());
    for path in reference_paths {
        references.push(media::load_image(path)?.artifact);
    }

    let mut workflow = GeneratorWorkflow::new(studio_context(config));
    let artifact = workflow.generate(brief, &references, aspect).await?;
    save(&artifact, output)?;

    while let Some(feedback) = read_feedback("refine (blank to finish)> ")? {
        match workflow.refine(&feedback, None).await {
            Ok(artifact) => save(&artifact, output)?,
            Err(err) => eprintln!("refinement failed: {err}"),
        }
    }
    Ok(())
}

async fn run_refine(
    config: &Config,
    source: &Path,
    feedback: &str,
    reference: Option<PathBuf>,
    aspect: &str,
    output: &Path,
) -> Result<()> {
    let loaded = media::load_image(source)?;
    let aspect = parse_selection(aspect)?.resolve(loaded.width, loaded.height);
    let reference = reference.map(|p| media::load_image(&p)).transpose()?;

    let mut workflow = GeneratorWorkflow::resume(studio_context(config), loaded.artifact, aspect);
    let artifact = workflow
        .refine(feedback, reference.as_ref().map(|l| &l.artifact))
        .await?;
    save(&artifact, output)?;

    while let Some(feedback) = read_feedback("refine (blank to finish)> ")? {
        match workflow.refine(&feedback, None).await {
            Ok(artifact) => save(&artifact, output)?,
            Err(err) => eprintln!("refinement failed: {err}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_arguments_parse_both_forms() {
        assert_eq!(parse_aspect("16:9").unwrap(), AspectRatio::Wide);
        assert_eq!(parse_aspect("square").unwrap(), AspectRatio::Square);
        assert!(parse_aspect("21:9").is_err());
        assert_eq!(
            parse_selection("original").unwrap(),
            AspectSelection::Original
        );
        assert_eq!(
            parse_selection("3:4").unwrap(),
            AspectSelection::Fixed(AspectRatio::Portrait)
        );
    }

    #[test]
    fn command_line_shapes_parse() {
        let cli = Cli::try_parse_from([
            "atelier", "portrait", "--person", "me.jpg", "--style", "cinematic",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Portrait { .. }));

        let cli = Cli::try_parse_from([
            "atelier", "generate", "a red fox", "-r", "a.png", "-r", "b.png",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate { reference, .. } => assert_eq!(reference.len(), 2),
            _ => panic!("expected generate"),
        }

        let cli = Cli::try_parse_from(["atelier", "key", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Key {
                action: KeyCommands::Show
            }
        ));
    }
}
