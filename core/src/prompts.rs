//! Prompt assembly for every feature: fixed instructional boilerplate
//! concatenated with user-supplied text and enum-derived clauses. The
//! reference-image order is meaningful; each prompt names the images
//! by position.

use atelier_common::types::{ImageStyle, LpSection, LpTone, SlidePageType, StyleKind};

pub fn portrait(style: ImageStyle, has_person: bool, has_background: bool, extra: &str) -> String {
    let mut prompt = format!("Generate a high-quality image with the style: \"{style}\". ");

    if has_person {
        prompt.push_str(
            "The first image provided is the REFERENCE PERSON (SUBJECT). \
             CRITICAL: You MUST preserve the facial features, hair, expression, \
             and identity of this person exactly. High fidelity to the source \
             subject is required. ",
        );
    }

    if has_background {
        let ordinal = if has_person { "second" } else { "first" };
        prompt.push_str(&format!(
            "The {ordinal} image provided is the BACKGROUND/ENVIRONMENT REFERENCE. \
             Use the location, lighting, atmosphere, and mood of this image as the \
             setting. Integrate the subject into this environment naturally. The \
             lighting on the subject must match the background. Do not treat this \
             as a simple layer composition; generate a cohesive single scene. ",
        ));
    }

    let extra = if extra.trim().is_empty() {
        "Create a masterpiece."
    } else {
        extra
    };
    prompt.push_str(&format!("\nAdditional Instructions: {extra}"));
    prompt
}

pub fn refine(feedback: &str, has_reference: bool) -> String {
    let mut prompt = format!(
        "The first image is a previously generated image.\n\
         User feedback for refinement: \"{feedback}\"."
    );
    if has_reference {
        prompt.push_str(
            "\n\nThe second image is a REFERENCE IMAGE provided by the user. Use it \
             to guide the modifications - it may show the desired style, colors, \
             composition, or specific elements the user wants incorporated.",
        );
    }
    prompt.push_str(
        "\n\nTask: Re-generate the image incorporating the user's feedback. \
         Maintain the original subject identity and overall composition unless \
         the feedback specifically asks to change them. Ensure the output \
         remains high quality.",
    );
    prompt
}

fn tone_clause(tone: LpTone) -> &'static str {
    match tone {
        LpTone::Professional => "a clean, trustworthy, corporate look",
        LpTone::Casual => "a friendly, approachable, relaxed look",
        LpTone::Luxury => "a premium, refined look with generous spacing",
        LpTone::Playful => "a colorful, energetic look with rounded shapes",
        LpTone::Minimal => "a restrained look with lots of whitespace",
        LpTone::Bold => "a high-contrast look with strong typography",
    }
}

pub fn landing(section: LpSection, tone: LpTone, brief: &str, has_tone_image: bool) -> String {
    let mut prompt = format!(
        "Design the {section} section of a marketing landing page as a single \
         finished image. Visual tone: {} ({tone}). Include realistic headline \
         and body placeholder text that fits the section's purpose. ",
        tone_clause(tone)
    );
    if has_tone_image {
        prompt.push_str(
            "The first image provided is a TONE REFERENCE. Match its color \
             palette, typography feel, and overall mood. ",
        );
    }
    prompt.push_str(&format!("\nSection brief: {brief}"));
    prompt
}

pub fn edit(instruction: &str) -> String {
    format!(
        "The first image is the source photo. Apply the following edit while \
         keeping everything not mentioned unchanged, preserving the subject \
         identity, composition, and image quality.\nEdit instruction: {instruction}"
    )
}

fn style_clause(kind: StyleKind) -> &'static str {
    match kind {
        StyleKind::Anime => "Japanese anime illustration with clean line art and cel shading",
        StyleKind::Cg => "polished 3D CG rendering with physically plausible lighting",
        StyleKind::HandDrawn => "loose hand-drawn sketch with visible pencil strokes",
        StyleKind::Whiteboard => "whiteboard marker drawing on a white background",
        StyleKind::Realistic => "photorealistic rendering with natural lighting",
        StyleKind::Watercolor => "soft watercolor painting with bleeding pigment edges",
        StyleKind::PixelArt => "retro pixel art with a limited color palette",
        StyleKind::OilPainting => "classic oil painting with textured brushwork",
    }
}

pub fn style_change(kind: StyleKind, extra: &str) -> String {
    let mut prompt = format!(
        "The first image is the source. Redraw the entire image as {}. Keep \
         the subject, layout, and composition of the source recognizable while \
         fully converting the rendering style. ",
        style_clause(kind)
    );
    if !extra.trim().is_empty() {
        prompt.push_str(&format!("\nAdditional instructions: {extra}"));
    }
    prompt
}

pub fn generate(brief: &str, reference_count: usize) -> String {
    let mut prompt = String::from("Generate a single high-quality image. ");
    if reference_count > 0 {
        prompt.push_str(&format!(
            "The first {reference_count} image(s) are REFERENCE IMAGES supplied \
             by the user; use them for style, subject, or composition guidance \
             as the description implies. ",
        ));
    }
    prompt.push_str(&format!("\nDescription: {brief}"));
    prompt
}

/// Descriptive directions that keep the fixed template count visually
/// distinct from one another.
pub const TEMPLATE_DIRECTIONS: [&str; 3] = [
    "clean and minimal",
    "bold and vivid",
    "elegant and refined",
];

pub fn deck_template(theme: &str, direction: &str, page_type: SlidePageType) -> String {
    match page_type {
        SlidePageType::Title => format!(
            "Design the TITLE page of a presentation slide template. Theme: \
             \"{theme}\". Art direction: {direction}. Show a large title area \
             with placeholder text, a subtitle area, and decorative elements \
             establishing the deck's visual identity. No photographic content, \
             no watermarks.",
        ),
        SlidePageType::Content => format!(
            "Design the CONTENT page of the same presentation slide template. \
             The first image is the template's TITLE page; reuse its exact \
             color palette, typography, and decorative style. Theme: \
             \"{theme}\". Art direction: {direction}. Show a heading area and \
             a body area with placeholder text and room for bullet points.",
        ),
    }
}

pub fn deck_page(
    page_type: SlidePageType,
    page_number: usize,
    content: &str,
    continuity_count: usize,
) -> String {
    let mut prompt = format!(
        "Create slide {page_number} of a presentation as a finished image. \
         The first image is the deck's {page_type} page TEMPLATE. You MUST \
         preserve the template's color palette, typography, and decorative \
         style exactly. ",
    );
    if continuity_count > 0 {
        prompt.push_str(&format!(
            "The next {continuity_count} image(s) are the most recently \
             generated slides of this deck; keep the new slide visually \
             consistent with them. ",
        ));
    }
    match page_type {
        SlidePageType::Title => prompt.push_str(
            "Lay the following out as the deck's title and subtitle, large and \
             centered. ",
        ),
        SlidePageType::Content => prompt.push_str(
            "Lay the following out as a heading with clearly readable body \
             content, summarized into concise bullet points where natural. ",
        ),
    }
    prompt.push_str(&format!("\nSlide content: {content}"));
    prompt
}

pub fn deck_regenerate(page_type: SlidePageType, content: &str, feedback: &str) -> String {
    let feedback = if feedback.trim().is_empty() {
        "Regenerate with the same content."
    } else {
        feedback
    };
    format!(
        "The first image is the deck's {page_type} page TEMPLATE; preserve its \
         color palette, typography, and decorative style exactly. The second \
         image is the CURRENT version of this slide. Re-generate the slide \
         with the same content, applying the user's feedback.\n\
         Slide content: {content}\nUser feedback: {feedback}"
    )
}
