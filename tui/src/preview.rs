use anyhow::{Context, Result};
use atelier_common::types::{DeckSummary, PageSummary, SlidePageType};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::path::Path;

/// Page-by-page viewer for a deck exported by the slides workflow.
pub struct DeckPreview {
    deck: DeckSummary,
    current: usize,
    running: bool,
}

impl DeckPreview {
    pub fn new(deck: DeckSummary) -> Self {
        Self {
            deck,
            current: 0,
            running: true,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        while self.running {
            terminal.draw(|f| self.draw(f))?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        self.running = false;
                    }
                    KeyCode::Left | KeyCode::Char('h') => {
                        self.previous_page();
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        self.next_page();
                    }
                    _ => {}
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let size = f.area();

        let title = format!(
            "{} ({}/{}) [{}]",
            self.deck.theme,
            self.current + 1,
            self.deck.pages.len().max(1),
            self.deck.aspect,
        );
        let block = Block::default().title(title).borders(Borders::ALL);

        let body = match self.deck.pages.get(self.current) {
            Some(page) => page_body(page),
            None => "This deck has no pages.".to_string(),
        };
        let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: true });

        f.render_widget(paragraph, size);
    }

    fn next_page(&mut self) {
        if self.current < self.deck.pages.len().saturating_sub(1) {
            self.current += 1;
        }
    }

    fn previous_page(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }
}

fn page_body(page: &PageSummary) -> String {
    let kind = match page.page_type {
        SlidePageType::Title => "Title page",
        SlidePageType::Content => "Content page",
    };
    let mut body = format!("Slide {} - {kind}\n\nPrompt:\n{}\n\n", page.page_number, page.prompt);
    match (&page.image_path, &page.error) {
        (Some(path), _) => body.push_str(&format!("Image: {path}")),
        (None, Some(error)) => body.push_str(&format!("Generation failed: {error}")),
        (None, None) => body.push_str("Not generated."),
    }
    body
}

/// Load an exported `deck.json` and open the viewer.
pub fn run_preview(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let deck: DeckSummary =
        serde_json::from_str(&raw).with_context(|| format!("invalid deck file {}", path.display()))?;
    DeckPreview::new(deck).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deck() -> DeckSummary {
        DeckSummary {
            theme: "Quarterly Review".into(),
            aspect: "16:9".into(),
            template: "clean and minimal".into(),
            pages: vec![
                PageSummary {
                    page_number: 1,
                    page_type: SlidePageType::Title,
                    prompt: "Q3 results".into(),
                    image_path: Some("slide-1.jpg".into()),
                    error: None,
                },
                PageSummary {
                    page_number: 2,
                    page_type: SlidePageType::Content,
                    prompt: "Revenue".into(),
                    image_path: None,
                    error: Some("rate limited".into()),
                },
            ],
        }
    }

    #[test]
    fn page_body_shows_image_or_error() {
        let deck = sample_deck();
        assert!(page_body(&deck.pages[0]).contains("Image: slide-1.jpg"));
        assert!(page_body(&deck.pages[1]).contains("Generation failed: rate limited"));
    }

    #[test]
    fn navigation_clamps_to_deck_bounds() {
        let mut preview = DeckPreview::new(sample_deck());
        preview.previous_page();
        assert_eq!(preview.current, 0);
        preview.next_page();
        preview.next_page();
        assert_eq!(preview.current, 1);
    }

    #[test]
    fn exported_deck_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        std::fs::write(&path, serde_json::to_string(&sample_deck()).unwrap()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let deck: DeckSummary = serde_json::from_str(&raw).unwrap();
        assert_eq!(deck.pages.len(), 2);
        assert_eq!(deck.pages[1].error.as_deref(), Some("rate limited"));
    }
}
