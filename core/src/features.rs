//! The single-shot feature workflows: portrait, landing-page section,
//! image editor, style changer, and the free-form generator. Each one
//! assembles a prompt, attaches references in a fixed order, makes one
//! remote call, and keeps the last good result on failure.

use std::sync::Arc;

use atelier_common::types::{
    ChatMessage, ChatRole, ImageStyle, LpSection, LpTone, StyleKind,
};
use atelier_common::{AspectRatio, AspectSelection, ImageArtifact};
use atelier_gemini::ImageOptions;

use crate::error::StudioError;
use crate::prompts;
use crate::StudioContext;

/// One call through the model, with the shared bookkeeping: the result
/// is only overwritten on success, the error slot mirrors the last
/// failure, and authorization failures invalidate the credential.
async fn submit(
    ctx: &StudioContext,
    result: &mut Option<ImageArtifact>,
    error: &mut Option<String>,
    prompt: &str,
    references: &[ImageArtifact],
    aspect: AspectRatio,
) -> Result<ImageArtifact, StudioError> {
    let options = ImageOptions {
        aspect_ratio: aspect,
    };
    match ctx.model.request_image(prompt, references, options).await {
        Ok(artifact) => {
            *result = Some(artifact.clone());
            *error = None;
            Ok(artifact)
        }
        Err(err) => {
            ctx.note_remote_failure(&err);
            *error = Some(err.to_string());
            Err(err.into())
        }
    }
}

/// Portrait generation: optional subject reference first, optional
/// background reference second. The order carries meaning in the
/// prompt text and must not be altered.
pub struct PortraitWorkflow {
    ctx: Arc<StudioContext>,
    result: Option<ImageArtifact>,
    error: Option<String>,
}

impl PortraitWorkflow {
    pub fn new(ctx: Arc<StudioContext>) -> Self {
        Self {
            ctx,
            result: None,
            error: None,
        }
    }

    pub fn result(&self) -> Option<&ImageArtifact> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn generate(
        &mut self,
        person: Option<&ImageArtifact>,
        background: Option<&ImageArtifact>,
        style: ImageStyle,
        extra: &str,
        aspect: AspectRatio,
    ) -> Result<ImageArtifact, StudioError> {
        let prompt = prompts::portrait(style, person.is_some(), background.is_some(), extra);
        let mut references = Vec::new();
        if let Some(person) = person {
            references.push(person.clone());
        }
        if let Some(background) = background {
            references.push(background.clone());
        }
        submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &references,
            aspect,
        )
        .await
    }

    /// Re-invoke generation with the previous result as the primary
    /// reference. A failed call leaves the previous result in place.
    pub async fn refine(
        &mut self,
        feedback: &str,
        reference: Option<&ImageArtifact>,
        aspect: AspectRatio,
    ) -> Result<ImageArtifact, StudioError> {
        let Some(previous) = self.result.clone() else {
            return Err(StudioError::NothingToRefine);
        };
        let prompt = prompts::refine(feedback, reference.is_some());
        let mut references = vec![previous];
        if let Some(reference) = reference {
            references.push(reference.clone());
        }
        submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &references,
            aspect,
        )
        .await
    }
}

/// Landing-page section generation.
pub struct LandingWorkflow {
    ctx: Arc<StudioContext>,
    result: Option<ImageArtifact>,
    error: Option<String>,
}

impl LandingWorkflow {
    pub fn new(ctx: Arc<StudioContext>) -> Self {
        Self {
            ctx,
            result: None,
            error: None,
        }
    }

    pub fn result(&self) -> Option<&ImageArtifact> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn generate(
        &mut self,
        section: LpSection,
        tone: LpTone,
        brief: &str,
        tone_image: Option<&ImageArtifact>,
        aspect: AspectRatio,
    ) -> Result<ImageArtifact, StudioError> {
        let prompt = prompts::landing(section, tone, brief, tone_image.is_some());
        let references: Vec<ImageArtifact> = tone_image.cloned().into_iter().collect();
        submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &references,
            aspect,
        )
        .await
    }

    pub async fn refine(
        &mut self,
        feedback: &str,
        aspect: AspectRatio,
    ) -> Result<ImageArtifact, StudioError> {
        let Some(previous) = self.result.clone() else {
            return Err(StudioError::NothingToRefine);
        };
        let prompt = prompts::refine(feedback, false);
        submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &[previous],
            aspect,
        )
        .await
    }
}

/// Image editor: one source image plus an edit instruction. The
/// aspect sentinel resolves against the source's dimensions once and
/// is reused by every follow-up edit.
pub struct EditorWorkflow {
    ctx: Arc<StudioContext>,
    result: Option<ImageArtifact>,
    error: Option<String>,
    last_aspect: Option<AspectRatio>,
}

impl EditorWorkflow {
    pub fn new(ctx: Arc<StudioContext>) -> Self {
        Self {
            ctx,
            result: None,
            error: None,
            last_aspect: None,
        }
    }

    pub fn result(&self) -> Option<&ImageArtifact> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn edit(
        &mut self,
        source: &ImageArtifact,
        dimensions: (u32, u32),
        instruction: &str,
        selection: AspectSelection,
    ) -> Result<ImageArtifact, StudioError> {
        let aspect = selection.resolve(dimensions.0, dimensions.1);
        self.last_aspect = Some(aspect);
        let prompt = prompts::edit(instruction);
        submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            std::slice::from_ref(source),
            aspect,
        )
        .await
    }

    /// Apply a further instruction to the current result.
    pub async fn refine(&mut self, instruction: &str) -> Result<ImageArtifact, StudioError> {
        let Some(previous) = self.result.clone() else {
            return Err(StudioError::NothingToRefine);
        };
        let aspect = self.last_aspect.unwrap_or(AspectRatio::Wide);
        let prompt = prompts::edit(instruction);
        submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &[previous],
            aspect,
        )
        .await
    }
}

/// Style changer with a display-only chat log. Only the most recent
/// feedback entry is ever sent to the model.
pub struct StyleWorkflow {
    ctx: Arc<StudioContext>,
    result: Option<ImageArtifact>,
    error: Option<String>,
    chat: Vec<ChatMessage>,
    last_aspect: Option<AspectRatio>,
}

impl StyleWorkflow {
    pub fn new(ctx: Arc<StudioContext>) -> Self {
        Self {
            ctx,
            result: None,
            error: None,
            chat: Vec::new(),
            last_aspect: None,
        }
    }

    pub fn result(&self) -> Option<&ImageArtifact> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub async fn convert(
        &mut self,
        source: &ImageArtifact,
        dimensions: (u32, u32),
        kind: StyleKind,
        extra: &str,
        selection: AspectSelection,
    ) -> Result<ImageArtifact, StudioError> {
        let aspect = selection.resolve(dimensions.0, dimensions.1);
        self.last_aspect = Some(aspect);
        let prompt = prompts::style_change(kind, extra);
        let artifact = submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            std::slice::from_ref(source),
            aspect,
        )
        .await?;

        let mut request_text = format!("Convert to {kind}");
        if !extra.trim().is_empty() {
            request_text.push_str(&format!("\nAdditional instructions: {extra}"));
        }
        self.chat = vec![
            ChatMessage {
                role: ChatRole::User,
                content: request_text,
                image: None,
            },
            ChatMessage {
                role: ChatRole::Assistant,
                content: "Style conversion complete.".into(),
                image: Some(artifact.clone()),
            },
        ];
        Ok(artifact)
    }

    pub async fn refine(
        &mut self,
        feedback: &str,
        feedback_image: Option<&ImageArtifact>,
    ) -> Result<ImageArtifact, StudioError> {
        let Some(previous) = self.result.clone() else {
            return Err(StudioError::NothingToRefine);
        };
        self.chat.push(ChatMessage {
            role: ChatRole::User,
            content: feedback.to_string(),
            image: feedback_image.cloned(),
        });

        let aspect = self.last_aspect.unwrap_or(AspectRatio::Wide);
        let prompt = prompts::refine(feedback, feedback_image.is_some());
        let mut references = vec![previous];
        if let Some(feedback_image) = feedback_image {
            references.push(feedback_image.clone());
        }
        let artifact = submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &references,
            aspect,
        )
        .await?;

        self.chat.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "Applied your feedback.".into(),
            image: Some(artifact.clone()),
        });
        Ok(artifact)
    }
}

/// Free-form generation from a description plus optional reference
/// images, with the same display-only chat log as the style changer.
pub struct GeneratorWorkflow {
    ctx: Arc<StudioContext>,
    result: Option<ImageArtifact>,
    error: Option<String>,
    chat: Vec<ChatMessage>,
    aspect: Option<AspectRatio>,
}

impl GeneratorWorkflow {
    pub fn new(ctx: Arc<StudioContext>) -> Self {
        Self {
            ctx,
            result: None,
            error: None,
            chat: Vec::new(),
            aspect: None,
        }
    }

    /// Pick refinement back up over a previously saved result.
    pub fn resume(ctx: Arc<StudioContext>, previous: ImageArtifact, aspect: AspectRatio) -> Self {
        Self {
            ctx,
            result: Some(previous),
            error: None,
            chat: Vec::new(),
            aspect: Some(aspect),
        }
    }

    pub fn result(&self) -> Option<&ImageArtifact> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub async fn generate(
        &mut self,
        brief: &str,
        references: &[ImageArtifact],
        aspect: AspectRatio,
    ) -> Result<ImageArtifact, StudioError> {
        self.aspect = Some(aspect);
        let prompt = prompts::generate(brief, references.len());
        let artifact = submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            references,
            aspect,
        )
        .await?;

        let mut request_text = brief.to_string();
        if !references.is_empty() {
            request_text.push_str(&format!("\n({} reference image(s))", references.len()));
        }
        self.chat = vec![
            ChatMessage {
                role: ChatRole::User,
                content: request_text,
                image: None,
            },
            ChatMessage {
                role: ChatRole::Assistant,
                content: "Generated an image.".into(),
                image: Some(artifact.clone()),
            },
        ];
        Ok(artifact)
    }

    pub async fn refine(
        &mut self,
        feedback: &str,
        feedback_image: Option<&ImageArtifact>,
    ) -> Result<ImageArtifact, StudioError> {
        let Some(previous) = self.result.clone() else {
            return Err(StudioError::NothingToRefine);
        };
        self.chat.push(ChatMessage {
            role: ChatRole::User,
            content: feedback.to_string(),
            image: feedback_image.cloned(),
        });

        let aspect = self.aspect.unwrap_or(AspectRatio::Wide);
        let prompt = prompts::refine(feedback, feedback_image.is_some());
        let mut references = vec![previous];
        if let Some(feedback_image) = feedback_image {
            references.push(feedback_image.clone());
        }
        let artifact = submit(
            &self.ctx,
            &mut self.result,
            &mut self.error,
            &prompt,
            &references,
            aspect,
        )
        .await?;

        self.chat.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "Applied your feedback.".into(),
            image: Some(artifact.clone()),
        });
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scripted_context, ScriptedModel};
    use atelier_gemini::{CredentialStore, GeminiError};

    #[tokio::test]
    async fn portrait_with_background_only_sends_one_reference() {
        let model = ScriptedModel::new(vec![Ok(ScriptedModel::artifact("portrait"))]);
        let mut workflow = PortraitWorkflow::new(scripted_context(model.clone()));

        let background = ScriptedModel::artifact("background");
        workflow
            .generate(
                None,
                Some(&background),
                ImageStyle::Cinematic,
                "",
                AspectRatio::Wide,
            )
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].references.len(), 1);
        assert_eq!(calls[0].references[0], background);
        assert!(calls[0].prompt.contains("BACKGROUND/ENVIRONMENT REFERENCE"));
        assert!(!calls[0].prompt.contains("REFERENCE PERSON"));
        assert!(workflow.result().is_some());
    }

    #[tokio::test]
    async fn failed_refine_preserves_the_previous_result() {
        let first = ScriptedModel::artifact("first");
        let model = ScriptedModel::new(vec![
            Ok(first.clone()),
            Err(GeminiError::Transport("boom".into())),
        ]);
        let mut workflow = GeneratorWorkflow::new(scripted_context(model.clone()));

        workflow
            .generate("a lighthouse", &[], AspectRatio::Square)
            .await
            .unwrap();
        let err = workflow.refine("make it night", None).await.unwrap_err();

        assert!(matches!(err, StudioError::Remote(GeminiError::Transport(_))));
        assert_eq!(workflow.result(), Some(&first));
        assert_eq!(workflow.error(), Some("boom"));
    }

    #[tokio::test]
    async fn refine_before_any_result_is_rejected_without_a_call() {
        let model = ScriptedModel::new(vec![]);
        let mut workflow = PortraitWorkflow::new(scripted_context(model.clone()));
        let err = workflow
            .refine("brighter", None, AspectRatio::Wide)
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::NothingToRefine));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn authorization_failure_invalidates_the_stored_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(CredentialStore::with_env_var(
            dir.path().join("credential"),
            "ATELIER_TEST_NO_SUCH_VAR",
        ));
        store.set("sk-stale").unwrap();

        let model = ScriptedModel::new(vec![Err(GeminiError::Authorization(
            "Permission denied".into(),
        ))]);
        let ctx = StudioContext::new(model, store.clone());
        let mut workflow = LandingWorkflow::new(ctx);

        let err = workflow
            .generate(
                LpSection::Hero,
                LpTone::Professional,
                "product launch",
                None,
                AspectRatio::Wide,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StudioError::Remote(GeminiError::Authorization(_))
        ));
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn style_conversion_resolves_the_original_sentinel() {
        let model = ScriptedModel::new(vec![Ok(ScriptedModel::artifact("styled"))]);
        let mut workflow = StyleWorkflow::new(scripted_context(model.clone()));

        let source = ScriptedModel::artifact("source");
        workflow
            .convert(
                &source,
                (1920, 1080),
                StyleKind::Watercolor,
                "",
                AspectSelection::Original,
            )
            .await
            .unwrap();

        assert_eq!(model.calls()[0].aspect, AspectRatio::Wide);
        assert_eq!(workflow.chat().len(), 2);
    }

    #[tokio::test]
    async fn generator_chat_is_a_display_log_only_latest_feedback_sent() {
        let first = ScriptedModel::artifact("first");
        let second = ScriptedModel::artifact("second");
        let model = ScriptedModel::new(vec![Ok(first.clone()), Ok(second.clone())]);
        let mut workflow = GeneratorWorkflow::new(scripted_context(model.clone()));

        workflow
            .generate("a quiet harbor at dawn", &[], AspectRatio::Wide)
            .await
            .unwrap();
        let feedback_image = ScriptedModel::artifact("feedback");
        workflow
            .refine("more fog", Some(&feedback_image))
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls[1].references, vec![first, feedback_image]);
        assert!(calls[1].prompt.contains("more fog"));
        // The original brief is not replayed into the refinement call.
        assert!(!calls[1].prompt.contains("quiet harbor"));
        assert_eq!(workflow.chat().len(), 4);
        assert_eq!(workflow.result(), Some(&second));
    }

    #[tokio::test]
    async fn a_resumed_workflow_refines_the_saved_result() {
        let refined = ScriptedModel::artifact("refined");
        let model = ScriptedModel::new(vec![Ok(refined.clone())]);
        let previous = ScriptedModel::artifact("saved");
        let mut workflow = GeneratorWorkflow::resume(
            scripted_context(model.clone()),
            previous.clone(),
            AspectRatio::Portrait,
        );

        workflow.refine("warmer colors", None).await.unwrap();

        let calls = model.calls();
        assert_eq!(calls[0].references, vec![previous]);
        assert_eq!(calls[0].aspect, AspectRatio::Portrait);
        assert_eq!(workflow.result(), Some(&refined));
    }

    #[tokio::test]
    async fn editor_reuses_the_resolved_aspect_for_refinements() {
        let first = ScriptedModel::artifact("edited");
        let model = ScriptedModel::new(vec![
            Ok(first.clone()),
            Ok(ScriptedModel::artifact("refined")),
        ]);
        let mut workflow = EditorWorkflow::new(scripted_context(model.clone()));

        let source = ScriptedModel::artifact("source");
        workflow
            .edit(
                &source,
                (800, 1000),
                "remove the background",
                AspectSelection::Original,
            )
            .await
            .unwrap();
        workflow.refine("now add soft shadows").await.unwrap();

        let calls = model.calls();
        assert_eq!(calls[0].aspect, AspectRatio::Portrait);
        assert_eq!(calls[1].aspect, AspectRatio::Portrait);
        assert_eq!(calls[1].references, vec![first]);
    }
}
