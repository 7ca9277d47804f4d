//! The multi-phase slide-deck workflow: template generation, template
//! selection, page setup, generation, and editing. All remote calls are
//! sequential; a failed page records its error and never blocks the
//! rest of the deck.

use atelier_common::types::{GenerationMode, SlidePage, SlidePageType, SlideTemplate};
use atelier_common::{AspectRatio, ImageArtifact};
use atelier_gemini::ImageOptions;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StudioError;
use crate::prompts;
use crate::StudioContext;

/// Number of template candidates generated per theme.
pub const TEMPLATE_COUNT: usize = prompts::TEMPLATE_DIRECTIONS.len();
/// Pages a fresh deck starts with.
pub const INITIAL_PAGE_COUNT: usize = 3;
/// Upper bound on pages during setup.
pub const MAX_INITIAL_PAGES: usize = 10;
/// Pages appended per request while editing.
pub const PAGES_PER_BATCH: usize = 5;
/// Hard cap on deck length.
pub const MAX_TOTAL_PAGES: usize = 20;
/// How many recently generated slides accompany each page request.
pub const CONTINUITY_WINDOW: usize = 2;

/// Where the workflow currently is. Each phase carries exactly the
/// state it needs; moving forward consumes what the next phase does
/// not keep.
pub enum DeckPhase {
    TemplateGeneration,
    TemplateSelection {
        templates: Vec<SlideTemplate>,
    },
    PageSetup {
        templates: Vec<SlideTemplate>,
        template: SlideTemplate,
    },
    Generation {
        template: SlideTemplate,
        mode: GenerationMode,
    },
    Editing {
        template: SlideTemplate,
    },
}

impl DeckPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DeckPhase::TemplateGeneration => "template generation",
            DeckPhase::TemplateSelection { .. } => "template selection",
            DeckPhase::PageSetup { .. } => "page setup",
            DeckPhase::Generation { .. } => "generation",
            DeckPhase::Editing { .. } => "editing",
        }
    }
}

pub struct DeckWorkflow {
    ctx: Arc<StudioContext>,
    phase: DeckPhase,
    theme: String,
    aspect: AspectRatio,
    pages: Vec<SlidePage>,
}

impl DeckWorkflow {
    pub fn new(ctx: Arc<StudioContext>) -> Self {
        Self {
            ctx,
            phase: DeckPhase::TemplateGeneration,
            theme: String::new(),
            aspect: AspectRatio::Wide,
            pages: Vec::new(),
        }
    }

    pub fn phase(&self) -> &DeckPhase {
        &self.phase
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    pub fn pages(&self) -> &[SlidePage] {
        &self.pages
    }

    /// Candidate templates, visible during selection and setup.
    pub fn templates(&self) -> &[SlideTemplate] {
        match &self.phase {
            DeckPhase::TemplateSelection { templates }
            | DeckPhase::PageSetup { templates, .. } => templates,
            _ => &[],
        }
    }

    /// The template locked in for this deck, once one is selected.
    pub fn selected_template(&self) -> Option<&SlideTemplate> {
        match &self.phase {
            DeckPhase::PageSetup { template, .. }
            | DeckPhase::Generation { template, .. }
            | DeckPhase::Editing { template } => Some(template),
            _ => None,
        }
    }

    /// Generate the candidate templates for a theme. Each candidate is
    /// a title-page call followed by a content-page call that takes the
    /// fresh title image as its style reference; a failed title call
    /// skips the candidate entirely. The phase only advances when at
    /// least one candidate succeeds. Calling this from the selection
    /// phase discards the current candidates and regenerates.
    pub async fn generate_templates(
        &mut self,
        theme: &str,
        aspect: AspectRatio,
    ) -> Result<&[SlideTemplate], StudioError> {
        if !matches!(
            self.phase,
            DeckPhase::TemplateGeneration | DeckPhase::TemplateSelection { .. }
        ) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        if theme.trim().is_empty() {
            return Err(StudioError::EmptyTheme);
        }

        let options = ImageOptions {
            aspect_ratio: aspect,
        };
        let mut templates = Vec::with_capacity(TEMPLATE_COUNT);
        let mut last_error = String::new();

        for direction in prompts::TEMPLATE_DIRECTIONS {
            let title_prompt = prompts::deck_template(theme, direction, SlidePageType::Title);
            let title_image = match self.ctx.model.request_image(&title_prompt, &[], options).await
            {
                Ok(image) => image,
                Err(err) => {
                    self.ctx.note_remote_failure(&err);
                    warn!(direction, error = %err, "template title generation failed");
                    last_error = err.to_string();
                    continue;
                }
            };

            let content_prompt = prompts::deck_template(theme, direction, SlidePageType::Content);
            let content_image = match self
                .ctx
                .model
                .request_image(&content_prompt, std::slice::from_ref(&title_image), options)
                .await
            {
                Ok(image) => image,
                Err(err) => {
                    self.ctx.note_remote_failure(&err);
                    warn!(direction, error = %err, "template content generation failed");
                    last_error = err.to_string();
                    continue;
                }
            };

            templates.push(SlideTemplate {
                id: Uuid::new_v4(),
                title_image,
                content_image,
                description: direction.to_string(),
            });
        }

        if templates.is_empty() {
            return Err(StudioError::TemplatesFailed(TEMPLATE_COUNT, last_error));
        }

        debug!(count = templates.len(), "templates generated");
        self.theme = theme.to_string();
        self.aspect = aspect;
        self.phase = DeckPhase::TemplateSelection { templates };
        Ok(self.templates())
    }

    /// Lock in a template and move to page setup. A fresh deck starts
    /// with a title page and two content pages.
    pub fn select_template(&mut self, id: Uuid) -> Result<(), StudioError> {
        let phase = std::mem::replace(&mut self.phase, DeckPhase::TemplateGeneration);
        let templates = match phase {
            DeckPhase::TemplateSelection { templates } => templates,
            other => {
                let name = other.name();
                self.phase = other;
                return Err(StudioError::WrongPhase(name));
            }
        };

        let Some(template) = templates.iter().find(|t| t.id == id).cloned() else {
            self.phase = DeckPhase::TemplateSelection { templates };
            return Err(StudioError::UnknownTemplate(id));
        };

        if self.pages.is_empty() {
            self.pages.push(SlidePage::new(1, SlidePageType::Title));
            for number in 2..=INITIAL_PAGE_COUNT {
                self.pages.push(SlidePage::new(number, SlidePageType::Content));
            }
        }

        self.phase = DeckPhase::PageSetup {
            templates,
            template,
        };
        Ok(())
    }

    /// Return to the selection phase, keeping page setup intact.
    pub fn back_to_selection(&mut self) -> Result<(), StudioError> {
        let phase = std::mem::replace(&mut self.phase, DeckPhase::TemplateGeneration);
        match phase {
            DeckPhase::PageSetup { templates, .. } => {
                self.phase = DeckPhase::TemplateSelection { templates };
                Ok(())
            }
            other => {
                let name = other.name();
                self.phase = other;
                Err(StudioError::WrongPhase(name))
            }
        }
    }

    pub fn set_page_prompt(&mut self, id: Uuid, prompt: &str) -> Result<(), StudioError> {
        if !matches!(
            self.phase,
            DeckPhase::PageSetup { .. } | DeckPhase::Editing { .. }
        ) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        let page = self
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StudioError::UnknownPage(id))?;
        page.prompt = prompt.to_string();
        Ok(())
    }

    pub fn set_page_type(&mut self, id: Uuid, page_type: SlidePageType) -> Result<(), StudioError> {
        if !matches!(self.phase, DeckPhase::PageSetup { .. }) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        let page = self
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StudioError::UnknownPage(id))?;
        page.page_type = page_type;
        Ok(())
    }

    /// Append one content page during setup. Returns false once the
    /// setup cap is reached.
    pub fn add_page(&mut self) -> Result<bool, StudioError> {
        if !matches!(self.phase, DeckPhase::PageSetup { .. }) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        if self.pages.len() >= MAX_INITIAL_PAGES {
            return Ok(false);
        }
        self.pages
            .push(SlidePage::new(self.pages.len() + 1, SlidePageType::Content));
        Ok(true)
    }

    /// Append up to `count` content pages during editing, capped by
    /// the batch size and the total deck limit. Returns the number
    /// actually added; a full deck makes this a no-op.
    pub fn add_pages(&mut self, count: usize) -> Result<usize, StudioError> {
        if !matches!(self.phase, DeckPhase::Editing { .. }) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        let room = MAX_TOTAL_PAGES.saturating_sub(self.pages.len());
        let count = count.min(PAGES_PER_BATCH).min(room);
        for _ in 0..count {
            self.pages
                .push(SlidePage::new(self.pages.len() + 1, SlidePageType::Content));
        }
        Ok(count)
    }

    /// Delete a page and renumber the rest contiguously. The deck
    /// always keeps at least one page.
    pub fn remove_page(&mut self, id: Uuid) -> Result<(), StudioError> {
        if !matches!(
            self.phase,
            DeckPhase::PageSetup { .. } | DeckPhase::Editing { .. }
        ) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        if self.pages.len() == 1 {
            return Err(StudioError::LastPage);
        }
        let index = self
            .pages
            .iter()
            .position(|p| p.id == id)
            .ok_or(StudioError::UnknownPage(id))?;
        self.pages.remove(index);
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.page_number = index + 1;
        }
    }

    /// Pages still owed an image: prompted but ungenerated. An earlier
    /// failure does not remove a page from this set; the next attempt
    /// retries it.
    fn pending_indices(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.prompt.trim().is_empty() && p.image.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    /// Leave page setup and start generating. All-at-once runs every
    /// prompted page before returning; one-by-one generates the first
    /// page and waits for `generate_next` calls.
    pub async fn start_generation(&mut self, mode: GenerationMode) -> Result<(), StudioError> {
        if !matches!(self.phase, DeckPhase::PageSetup { .. }) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        if self.pending_indices().is_empty() {
            return Err(StudioError::NoPromptedPages);
        }

        let phase = std::mem::replace(&mut self.phase, DeckPhase::TemplateGeneration);
        let template = match phase {
            DeckPhase::PageSetup { template, .. } => template,
            other => {
                let name = other.name();
                self.phase = other;
                return Err(StudioError::WrongPhase(name));
            }
        };
        self.phase = DeckPhase::Generation { template, mode };

        match mode {
            GenerationMode::AllAtOnce => {
                for index in self.pending_indices() {
                    self.run_page(index).await;
                }
                self.advance_if_done(true);
            }
            GenerationMode::OneByOne => {
                if let Some(index) = self.pending_indices().first().copied() {
                    self.run_page(index).await;
                }
                self.advance_if_done(false);
            }
        }
        Ok(())
    }

    /// Generate the next ungenerated prompted page in one-by-one mode.
    /// A page that failed last time is attempted again, its error
    /// cleared for the new attempt. Returns true while pages remain;
    /// once none do, the workflow moves to editing.
    pub async fn generate_next(&mut self) -> Result<bool, StudioError> {
        if !matches!(self.phase, DeckPhase::Generation { .. }) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        if let Some(index) = self.pending_indices().first().copied() {
            self.pages[index].error = None;
            self.run_page(index).await;
        }
        Ok(!self.advance_if_done(false))
    }

    /// Generate any prompted-but-ungenerated pages while editing, such
    /// as a freshly added batch or a page that failed during the
    /// generation phase.
    pub async fn generate_pending(&mut self) -> Result<(), StudioError> {
        if !matches!(self.phase, DeckPhase::Editing { .. }) {
            return Err(StudioError::WrongPhase(self.phase.name()));
        }
        for index in self.pending_indices() {
            self.pages[index].error = None;
            self.run_page(index).await;
        }
        Ok(())
    }

    /// Re-generate one finished page against user feedback. The
    /// current image stays in place if the call fails.
    pub async fn regenerate_page(&mut self, id: Uuid, feedback: &str) -> Result<(), StudioError> {
        let template = match &self.phase {
            DeckPhase::Editing { template } => template.clone(),
            other => return Err(StudioError::WrongPhase(other.name())),
        };
        let index = self
            .pages
            .iter()
            .position(|p| p.id == id)
            .ok_or(StudioError::UnknownPage(id))?;

        let (prompt, references) = {
            let page = &self.pages[index];
            let Some(current) = page.image.clone() else {
                return Err(StudioError::PageNotGenerated);
            };
            let prompt = prompts::deck_regenerate(page.page_type, &page.prompt, feedback);
            let references = vec![template.image_for(page.page_type).clone(), current];
            (prompt, references)
        };

        self.pages[index].generating = true;
        let options = ImageOptions {
            aspect_ratio: self.aspect,
        };
        let result = self
            .ctx
            .model
            .request_image(&prompt, &references, options)
            .await;
        match result {
            Ok(artifact) => {
                let page = &mut self.pages[index];
                page.generating = false;
                page.image = Some(artifact);
                page.error = None;
                Ok(())
            }
            Err(err) => {
                self.ctx.note_remote_failure(&err);
                let page = &mut self.pages[index];
                page.generating = false;
                page.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Discard everything and return to the first phase.
    pub fn reset(&mut self) {
        self.phase = DeckPhase::TemplateGeneration;
        self.theme.clear();
        self.pages.clear();
    }

    /// One page generation. Inputs are the matching template image
    /// plus the most recently generated slides in page order; failures
    /// are recorded on the page and never propagate.
    async fn run_page(&mut self, index: usize) {
        let Some(template) = self.selected_template().cloned() else {
            return;
        };

        let (prompt, references) = {
            let page = &self.pages[index];
            let mut references = vec![template.image_for(page.page_type).clone()];
            let generated: Vec<ImageArtifact> = self.pages[..index]
                .iter()
                .filter_map(|p| p.image.clone())
                .collect();
            let start = generated.len().saturating_sub(CONTINUITY_WINDOW);
            references.extend_from_slice(&generated[start..]);
            let prompt = prompts::deck_page(
                page.page_type,
                page.page_number,
                &page.prompt,
                references.len() - 1,
            );
            (prompt, references)
        };

        self.pages[index].generating = true;
        let options = ImageOptions {
            aspect_ratio: self.aspect,
        };
        let result = self
            .ctx
            .model
            .request_image(&prompt, &references, options)
            .await;
        match result {
            Ok(artifact) => {
                let page = &mut self.pages[index];
                page.generating = false;
                page.image = Some(artifact);
                page.error = None;
            }
            Err(err) => {
                self.ctx.note_remote_failure(&err);
                warn!(page = self.pages[index].page_number, error = %err, "page generation failed");
                let page = &mut self.pages[index];
                page.generating = false;
                page.error = Some(err.to_string());
            }
        }
    }

    /// Move to editing once no pages are pending. `force` skips the
    /// pending check for the all-at-once path, where every page has
    /// already been attempted. Returns true when the phase advanced.
    fn advance_if_done(&mut self, force: bool) -> bool {
        if !force && !self.pending_indices().is_empty() {
            return false;
        }
        let phase = std::mem::replace(&mut self.phase, DeckPhase::TemplateGeneration);
        match phase {
            DeckPhase::Generation { template, .. } => {
                self.phase = DeckPhase::Editing { template };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }
}
