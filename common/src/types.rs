use crate::artifact::ImageArtifact;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Portrait rendering styles. The display form is the descriptive
/// phrase spliced into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageStyle {
    Realistic,
    Cinematic,
    Anime,
    DigitalArt,
    OilPainting,
    Cyberpunk,
    StudioHeadshot,
    Fantasy,
}

impl ImageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Realistic => "Realistic Photography",
            ImageStyle::Cinematic => "Cinematic Movie Scene",
            ImageStyle::Anime => "Anime / Manga Style",
            ImageStyle::DigitalArt => "Digital Art / Concept Art",
            ImageStyle::OilPainting => "Classic Oil Painting",
            ImageStyle::Cyberpunk => "Cyberpunk / Neon",
            ImageStyle::StudioHeadshot => "Professional Studio Headshot",
            ImageStyle::Fantasy => "High Fantasy RPG",
        }
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "realistic" => Ok(ImageStyle::Realistic),
            "cinematic" => Ok(ImageStyle::Cinematic),
            "anime" => Ok(ImageStyle::Anime),
            "digital-art" => Ok(ImageStyle::DigitalArt),
            "oil-painting" => Ok(ImageStyle::OilPainting),
            "cyberpunk" => Ok(ImageStyle::Cyberpunk),
            "studio-headshot" => Ok(ImageStyle::StudioHeadshot),
            "fantasy" => Ok(ImageStyle::Fantasy),
            other => Err(format!("unknown style: {other}")),
        }
    }
}

/// Landing-page section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpSection {
    Hero,
    Features,
    Problem,
    Solution,
    BeforeAfter,
    Testimonials,
    Cta,
    About,
    Philosophy,
    Pricing,
    Faq,
    Footer,
    Other,
}

impl LpSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LpSection::Hero => "hero",
            LpSection::Features => "features",
            LpSection::Problem => "problem",
            LpSection::Solution => "solution",
            LpSection::BeforeAfter => "before-after",
            LpSection::Testimonials => "testimonials",
            LpSection::Cta => "call-to-action",
            LpSection::About => "about",
            LpSection::Philosophy => "philosophy",
            LpSection::Pricing => "pricing",
            LpSection::Faq => "faq",
            LpSection::Footer => "footer",
            LpSection::Other => "general",
        }
    }
}

impl fmt::Display for LpSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LpSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hero" => Ok(LpSection::Hero),
            "features" => Ok(LpSection::Features),
            "problem" => Ok(LpSection::Problem),
            "solution" => Ok(LpSection::Solution),
            "before-after" => Ok(LpSection::BeforeAfter),
            "testimonials" => Ok(LpSection::Testimonials),
            "cta" => Ok(LpSection::Cta),
            "about" => Ok(LpSection::About),
            "philosophy" => Ok(LpSection::Philosophy),
            "pricing" => Ok(LpSection::Pricing),
            "faq" => Ok(LpSection::Faq),
            "footer" => Ok(LpSection::Footer),
            "other" => Ok(LpSection::Other),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// Landing-page visual tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpTone {
    Professional,
    Casual,
    Luxury,
    Playful,
    Minimal,
    Bold,
}

impl LpTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            LpTone::Professional => "professional",
            LpTone::Casual => "casual",
            LpTone::Luxury => "luxury",
            LpTone::Playful => "playful",
            LpTone::Minimal => "minimal",
            LpTone::Bold => "bold",
        }
    }
}

impl fmt::Display for LpTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LpTone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(LpTone::Professional),
            "casual" => Ok(LpTone::Casual),
            "luxury" => Ok(LpTone::Luxury),
            "playful" => Ok(LpTone::Playful),
            "minimal" => Ok(LpTone::Minimal),
            "bold" => Ok(LpTone::Bold),
            other => Err(format!("unknown tone: {other}")),
        }
    }
}

/// Target styles for the style-changer feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Anime,
    Cg,
    HandDrawn,
    Whiteboard,
    Realistic,
    Watercolor,
    PixelArt,
    OilPainting,
}

impl StyleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKind::Anime => "anime",
            StyleKind::Cg => "cg",
            StyleKind::HandDrawn => "hand-drawn",
            StyleKind::Whiteboard => "whiteboard",
            StyleKind::Realistic => "realistic",
            StyleKind::Watercolor => "watercolor",
            StyleKind::PixelArt => "pixel-art",
            StyleKind::OilPainting => "oil-painting",
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anime" => Ok(StyleKind::Anime),
            "cg" => Ok(StyleKind::Cg),
            "hand-drawn" => Ok(StyleKind::HandDrawn),
            "whiteboard" => Ok(StyleKind::Whiteboard),
            "realistic" => Ok(StyleKind::Realistic),
            "watercolor" => Ok(StyleKind::Watercolor),
            "pixel-art" => Ok(StyleKind::PixelArt),
            "oil-painting" => Ok(StyleKind::OilPainting),
            other => Err(format!("unknown style: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the display-only feedback log kept by the generator
/// and style-changer workflows. Never replayed into a request; only
/// the most recent feedback text/image is ever sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<ImageArtifact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlidePageType {
    Title,
    Content,
}

impl SlidePageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlidePageType::Title => "title",
            SlidePageType::Content => "content",
        }
    }
}

impl fmt::Display for SlidePageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlidePageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SlidePageType::Title),
            "content" => Ok(SlidePageType::Content),
            other => Err(format!("unknown page type: {other}")),
        }
    }
}

/// A paired title/content visual style. Immutable once generated; one
/// is selected for the remainder of a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideTemplate {
    pub id: Uuid,
    pub title_image: ImageArtifact,
    pub content_image: ImageArtifact,
    pub description: String,
}

impl SlideTemplate {
    /// The template image matching a page's type.
    pub fn image_for(&self, page_type: SlidePageType) -> &ImageArtifact {
        match page_type {
            SlidePageType::Title => &self.title_image,
            SlidePageType::Content => &self.content_image,
        }
    }
}

/// One page of a deck. Page numbers are kept contiguous 1..N in list
/// order; renumbering happens synchronously on every deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidePage {
    pub id: Uuid,
    pub page_number: usize,
    pub page_type: SlidePageType,
    pub prompt: String,
    pub image: Option<ImageArtifact>,
    #[serde(skip)]
    pub generating: bool,
    pub error: Option<String>,
}

impl SlidePage {
    pub fn new(page_number: usize, page_type: SlidePageType) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_number,
            page_type,
            prompt: String::new(),
            image: None,
            generating: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    AllAtOnce,
    OneByOne,
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "all-at-once" => Ok(GenerationMode::AllAtOnce),
            "one" | "one-by-one" => Ok(GenerationMode::OneByOne),
            other => Err(format!("unknown generation mode: {other}")),
        }
    }
}

/// Exported deck description consumed by the preview viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSummary {
    pub theme: String,
    pub aspect: String,
    pub template: String,
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub page_number: usize,
    pub page_type: SlidePageType,
    pub prompt: String,
    pub image_path: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_their_cli_forms() {
        assert_eq!(
            "studio-headshot".parse::<ImageStyle>().unwrap(),
            ImageStyle::StudioHeadshot
        );
        assert_eq!("cta".parse::<LpSection>().unwrap(), LpSection::Cta);
        assert_eq!("luxury".parse::<LpTone>().unwrap(), LpTone::Luxury);
        assert_eq!(
            "pixel-art".parse::<StyleKind>().unwrap(),
            StyleKind::PixelArt
        );
        assert_eq!(
            "title".parse::<SlidePageType>().unwrap(),
            SlidePageType::Title
        );
        assert!("watercolour".parse::<StyleKind>().is_err());
    }

    #[test]
    fn template_serves_matching_page_image() {
        let template = SlideTemplate {
            id: Uuid::new_v4(),
            title_image: ImageArtifact::new("image/png", "dGl0bGU="),
            content_image: ImageArtifact::new("image/png", "Ym9keQ=="),
            description: "clean and minimal".into(),
        };
        assert_eq!(
            template.image_for(SlidePageType::Title).data,
            template.title_image.data
        );
        assert_eq!(
            template.image_for(SlidePageType::Content).data,
            template.content_image.data
        );
    }
}
