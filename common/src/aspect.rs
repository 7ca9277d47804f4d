use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output aspect-ratio tags accepted by the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9
    Wide,
    /// 4:3
    Standard,
    /// 1:1
    Square,
    /// 9:16
    Vertical,
    /// 3:4
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Square => "1:1",
            AspectRatio::Vertical => "9:16",
            AspectRatio::Portrait => "3:4",
        }
    }

    /// Derive a tag from source dimensions. The cascade is
    /// order-sensitive and the comparisons are strict: ranges overlap
    /// and earlier branches win, so boundary values fall through.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let ratio = width as f64 / height as f64;
        if ratio > 1.5 {
            AspectRatio::Wide
        } else if ratio < 0.7 {
            AspectRatio::Vertical
        } else if ratio > 1.2 {
            AspectRatio::Standard
        } else if ratio < 0.85 {
            AspectRatio::Portrait
        } else {
            AspectRatio::Square
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "16:9" | "wide" => Ok(AspectRatio::Wide),
            "4:3" | "standard" => Ok(AspectRatio::Standard),
            "1:1" | "square" => Ok(AspectRatio::Square),
            "9:16" | "vertical" => Ok(AspectRatio::Vertical),
            "3:4" | "portrait" => Ok(AspectRatio::Portrait),
            other => Err(format!("unknown aspect ratio: {other}")),
        }
    }
}

/// Caller-facing aspect choice: an explicit tag, or the `original`
/// sentinel asking to preserve the source image's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectSelection {
    Original,
    Fixed(AspectRatio),
}

impl AspectSelection {
    pub fn resolve(&self, width: u32, height: u32) -> AspectRatio {
        match self {
            AspectSelection::Original => AspectRatio::from_dimensions(width, height),
            AspectSelection::Fixed(ratio) => *ratio,
        }
    }
}

impl fmt::Display for AspectSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectSelection::Original => f.write_str("original"),
            AspectSelection::Fixed(ratio) => ratio.fmt(f),
        }
    }
}

impl FromStr for AspectSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "original" {
            Ok(AspectSelection::Original)
        } else {
            s.parse().map(AspectSelection::Fixed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_sources_map_to_wide() {
        assert_eq!(AspectRatio::from_dimensions(1920, 1080), AspectRatio::Wide);
        assert_eq!(AspectRatio::from_dimensions(3000, 1000), AspectRatio::Wide);
    }

    #[test]
    fn exact_boundaries_fall_through() {
        // 1.5 is not > 1.5, so it lands in the 4:3 branch.
        assert_eq!(
            AspectRatio::from_dimensions(1500, 1000),
            AspectRatio::Standard
        );
        // 0.7 is not < 0.7, so it lands in the 3:4 branch.
        assert_eq!(
            AspectRatio::from_dimensions(700, 1000),
            AspectRatio::Portrait
        );
        // 0.85 is not < 0.85, so it stays square.
        assert_eq!(AspectRatio::from_dimensions(850, 1000), AspectRatio::Square);
    }

    #[test]
    fn tall_and_near_square_sources() {
        assert_eq!(
            AspectRatio::from_dimensions(1080, 1920),
            AspectRatio::Vertical
        );
        assert_eq!(AspectRatio::from_dimensions(1000, 1000), AspectRatio::Square);
        assert_eq!(
            AspectRatio::from_dimensions(1300, 1000),
            AspectRatio::Standard
        );
        assert_eq!(
            AspectRatio::from_dimensions(800, 1000),
            AspectRatio::Portrait
        );
    }

    #[test]
    fn sentinel_resolves_from_source_shape() {
        let selection: AspectSelection = "original".parse().unwrap();
        assert_eq!(selection.resolve(1920, 1080), AspectRatio::Wide);
        let fixed: AspectSelection = "3:4".parse().unwrap();
        assert_eq!(fixed.resolve(1920, 1080), AspectRatio::Portrait);
    }
}
