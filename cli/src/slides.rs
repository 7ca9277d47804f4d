//! Interactive slide-deck session: drives the deck workflow through
//! its phases from stdin and exports the finished deck as JPEG slides
//! plus a `deck.json` the preview command can open.

use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use atelier_common::types::{DeckSummary, GenerationMode, PageSummary, SlidePageType};
use atelier_common::AspectRatio;
use atelier_core::deck::{DeckPhase, DeckWorkflow, PAGES_PER_BATCH, TEMPLATE_COUNT};
use atelier_core::{media, StudioContext};
use uuid::Uuid;

pub async fn run_slides(
    ctx: Arc<StudioContext>,
    theme: &str,
    aspect: AspectRatio,
    output_dir: &Path,
) -> Result<()> {
    let mut deck = DeckWorkflow::new(ctx);

    println!("Generating {TEMPLATE_COUNT} template candidates for \"{theme}\"...");
    deck.generate_templates(theme, aspect).await?;
    list_templates(&deck);
    print_help();

    loop {
        print!("[{}]> ", deck.phase().name());
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let result = match command {
            "templates" => {
                list_templates(&deck);
                Ok(())
            }
            "theme" => retheme(&mut deck, rest).await,
            "select" => select(&mut deck, rest),
            "back" => deck.back_to_selection().map_err(Into::into),
            "pages" => {
                list_pages(&deck);
                Ok(())
            }
            "prompt" => set_prompt(&mut deck, rest),
            "type" => set_type(&mut deck, rest),
            "add" => deck
                .add_page()
                .map(|added| {
                    if !added {
                        println!("Page limit reached.");
                    }
                })
                .map_err(Into::into),
            "batch" => add_batch(&mut deck, rest),
            "remove" => remove(&mut deck, rest),
            "go" => go(&mut deck, rest).await,
            "next" => next(&mut deck).await,
            "gen" => deck
                .generate_pending()
                .await
                .map(|()| list_pages(&deck))
                .map_err(Into::into),
            "regen" => regen(&mut deck, rest).await,
            "export" => export_deck(&deck, output_dir).map(|path| {
                println!("Exported to {}", path.display());
            }),
            "reset" => {
                deck.reset();
                println!("Back to template generation; rerun `atelier slides` to start over.");
                Ok(())
            }
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => break,
            other => {
                println!("Unknown command: {other} (try `help`)");
                Ok(())
            }
        };
        if let Err(err) = result {
            eprintln!("error: {err:#}");
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        "Commands:\n  \
         templates              list template candidates\n  \
         theme <text>           regenerate candidates for a new theme\n  \
         select <n>             choose a template\n  \
         back                   return to template selection\n  \
         pages                  list pages\n  \
         prompt <n> <text>      set a page's content\n  \
         type <n> title|content change a page's kind\n  \
         add                    append a page (setup)\n  \
         batch [n]              append up to n pages (editing)\n  \
         remove <n>             delete a page\n  \
         go all|one             generate the deck\n  \
         next                   generate the next page (one-by-one)\n  \
         gen                    generate pending pages (editing)\n  \
         regen <n> [feedback]   redo a generated page\n  \
         export                 write slides and deck.json\n  \
         quit"
    );
}

fn list_templates(deck: &DeckWorkflow) {
    for (index, template) in deck.templates().iter().enumerate() {
        println!("  {}. {}", index + 1, template.description);
    }
}

fn list_pages(deck: &DeckWorkflow) {
    for page in deck.pages() {
        let status = if page.image.is_some() {
            "generated"
        } else if page.error.is_some() {
            "failed"
        } else if page.prompt.trim().is_empty() {
            "no prompt"
        } else {
            "ready"
        };
        println!(
            "  {}. [{}] ({status}) {}",
            page.page_number,
            page.page_type,
            page.prompt.lines().next().unwrap_or("")
        );
        if let Some(error) = &page.error {
            println!("     error: {error}");
        }
    }
}

fn page_id(deck: &DeckWorkflow, arg: &str) -> Result<Uuid> {
    let number: usize = arg
        .parse()
        .map_err(|_| anyhow::anyhow!("expected a page number, got {arg:?}"))?;
    deck.pages()
        .iter()
        .find(|p| p.page_number == number)
        .map(|p| p.id)
        .ok_or_else(|| anyhow::anyhow!("no page {number}"))
}

async fn retheme(deck: &mut DeckWorkflow, theme: &str) -> Result<()> {
    let aspect = deck.aspect();
    println!("Regenerating template candidates...");
    deck.generate_templates(theme, aspect).await?;
    list_templates(deck);
    Ok(())
}

fn select(deck: &mut DeckWorkflow, arg: &str) -> Result<()> {
    let index: usize = arg
        .parse()
        .map_err(|_| anyhow::anyhow!("expected a template number, got {arg:?}"))?;
    let id = deck
        .templates()
        .get(index.wrapping_sub(1))
        .map(|t| t.id)
        .ok_or_else(|| anyhow::anyhow!("no template {index}"))?;
    deck.select_template(id)?;
    list_pages(deck);
    Ok(())
}

fn set_prompt(deck: &mut DeckWorkflow, rest: &str) -> Result<()> {
    let (number, text) = rest
        .split_once(' ')
        .ok_or_else(|| anyhow::anyhow!("usage: prompt <n> <text>"))?;
    let id = page_id(deck, number)?;
    deck.set_page_prompt(id, text.trim())?;
    Ok(())
}

fn set_type(deck: &mut DeckWorkflow, rest: &str) -> Result<()> {
    let (number, kind) = rest
        .split_once(' ')
        .ok_or_else(|| anyhow::anyhow!("usage: type <n> title|content"))?;
    let id = page_id(deck, number)?;
    let page_type: SlidePageType = kind.trim().parse().map_err(anyhow::Error::msg)?;
    deck.set_page_type(id, page_type)?;
    Ok(())
}

fn add_batch(deck: &mut DeckWorkflow, arg: &str) -> Result<()> {
    let count = if arg.is_empty() {
        PAGES_PER_BATCH
    } else {
        arg.parse()
            .map_err(|_| anyhow::anyhow!("expected a page count, got {arg:?}"))?
    };
    let added = deck.add_pages(count)?;
    if added == 0 {
        println!("Deck is full.");
    } else {
        println!("Added {added} page(s).");
    }
    Ok(())
}

fn remove(deck: &mut DeckWorkflow, arg: &str) -> Result<()> {
    let id = page_id(deck, arg)?;
    deck.remove_page(id)?;
    list_pages(deck);
    Ok(())
}

async fn go(deck: &mut DeckWorkflow, arg: &str) -> Result<()> {
    let mode: GenerationMode = arg.parse().map_err(anyhow::Error::msg)?;
    println!("Generating...");
    deck.start_generation(mode).await?;
    list_pages(deck);
    if matches!(deck.phase(), DeckPhase::Generation { .. }) {
        println!("Run `next` to generate the next page.");
    }
    Ok(())
}

async fn next(deck: &mut DeckWorkflow) -> Result<()> {
    let more = deck.generate_next().await?;
    list_pages(deck);
    if !more {
        println!("All pages done; now editing.");
    }
    Ok(())
}

async fn regen(deck: &mut DeckWorkflow, rest: &str) -> Result<()> {
    let (number, feedback) = match rest.split_once(' ') {
        Some((number, feedback)) => (number, feedback.trim()),
        None => (rest, ""),
    };
    let id = page_id(deck, number)?;
    deck.regenerate_page(id, feedback).await?;
    println!("Page {number} regenerated.");
    Ok(())
}

/// Write every generated page as `slide-N.jpg` plus a `deck.json`
/// description for the preview viewer.
fn export_deck(deck: &DeckWorkflow, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut pages = Vec::with_capacity(deck.pages().len());
    for page in deck.pages() {
        let image_path = match &page.image {
            Some(artifact) => {
                let name = format!("slide-{}.jpg", page.page_number);
                media::export_jpeg(artifact, &dir.join(&name))?;
                Some(name)
            }
            None => None,
        };
        pages.push(PageSummary {
            page_number: page.page_number,
            page_type: page.page_type,
            prompt: page.prompt.clone(),
            image_path,
            error: page.error.clone(),
        });
    }

    let summary = DeckSummary {
        theme: deck.theme().to_string(),
        aspect: deck.aspect().to_string(),
        template: deck
            .selected_template()
            .map(|t| t.description.clone())
            .unwrap_or_default(),
        pages,
    };
    let path = dir.join("deck.json");
    fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
    Ok(path)
}
