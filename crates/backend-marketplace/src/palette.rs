//! Image palette analysis for search-by-image.
//!
//! An image is reduced to its average colour, and the colour's HSL
//! coordinates are mapped to a few mood keywords that are then matched
//! against listing text.

use std::future::Future;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::BackendError;

/// Side of the square the image is downsampled to before averaging.
const SAMPLE_SIZE: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees `[0, 360)`, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Result of analysing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub keywords: Vec<String>,
    pub average_color: Rgb,
    pub hsl: Hsl,
}

/// Trait for image analyzers.
pub trait ImageAnalyzer {
    /// Derive search keywords from the image at `path`.
    fn analyze(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<ImageAnalysis, BackendError>> + Send;
}

/// Average-colour analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteAnalyzer;

impl PaletteAnalyzer {
    /// Decode and analyse synchronously.
    pub fn analyze_file(path: &Path) -> Result<ImageAnalysis, BackendError> {
        let img = image::open(path).map_err(|e| BackendError::Image(e.to_string()))?;
        let img = img
            .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
            .to_rgb8();

        let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
        for pixel in img.pixels() {
            r += u64::from(pixel[0]);
            g += u64::from(pixel[1]);
            b += u64::from(pixel[2]);
            count += 1;
        }
        if count == 0 {
            return Err(BackendError::Image("Image has no pixels".to_string()));
        }

        let average_color = Rgb {
            r: average_channel(r, count),
            g: average_channel(g, count),
            b: average_channel(b, count),
        };
        let hsl = rgb_to_hsl(average_color);
        let keywords = keywords_from_color(hsl);

        tracing::debug!(
            path = %path.display(),
            ?average_color,
            ?keywords,
            "Analysed image palette"
        );

        Ok(ImageAnalysis {
            keywords,
            average_color,
            hsl,
        })
    }
}

fn average_channel(sum: u64, count: u64) -> u8 {
    (sum as f64 / count as f64).round().clamp(0.0, 255.0) as u8
}

impl ImageAnalyzer for PaletteAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<ImageAnalysis, BackendError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::analyze_file(&path))
            .await
            .map_err(|e| BackendError::Image(e.to_string()))?
    }
}

/// Convert an sRGB colour to HSL.
pub fn rgb_to_hsl(color: Rgb) -> Hsl {
    let r = f64::from(color.r) / 255.0;
    let g = f64::from(color.g) / 255.0;
    let b = f64::from(color.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl {
        h: h * 60.0,
        s: s * 100.0,
        l: l * 100.0,
    }
}

/// Mood keywords for a colour. Several may apply; `versatile` when none does.
pub fn keywords_from_color(hsl: Hsl) -> Vec<String> {
    let Hsl { h, s, l } = hsl;
    let mut keywords = Vec::new();

    if l >= 70.0 {
        keywords.push("bright");
    }
    if l <= 35.0 {
        keywords.push("dramatic");
    }
    if s <= 25.0 {
        keywords.push("minimal");
    }
    if s >= 55.0 && (h < 40.0 || h > 340.0) {
        keywords.push("warm");
    }
    if s >= 55.0 && (40.0..=140.0).contains(&h) {
        keywords.push("natural");
    }
    if (180.0..=260.0).contains(&h) {
        keywords.push("cool");
    }
    if (260.0..=340.0).contains(&h) {
        keywords.push("vibrant");
    }
    if keywords.is_empty() {
        keywords.push("versatile");
    }

    keywords.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hsl(h: f64, s: f64, l: f64) -> Hsl {
        Hsl { h, s, l }
    }

    #[test]
    fn test_rgb_to_hsl() {
        assert_eq!(rgb_to_hsl(Rgb { r: 255, g: 0, b: 0 }), hsl(0.0, 100.0, 50.0));
        assert_eq!(rgb_to_hsl(Rgb { r: 0, g: 0, b: 255 }), hsl(240.0, 100.0, 50.0));
        assert_eq!(rgb_to_hsl(Rgb { r: 0, g: 0, b: 0 }), hsl(0.0, 0.0, 0.0));

        let grey = rgb_to_hsl(Rgb { r: 128, g: 128, b: 128 });
        assert_eq!(grey.s, 0.0);
        assert!((grey.l - 50.196).abs() < 0.01);
    }

    #[test]
    fn test_keywords_from_color() {
        assert_eq!(keywords_from_color(hsl(0.0, 100.0, 50.0)), vec!["warm"]);
        assert_eq!(keywords_from_color(hsl(120.0, 60.0, 50.0)), vec!["natural"]);
        assert_eq!(keywords_from_color(hsl(0.0, 0.0, 95.0)), vec!["bright", "minimal"]);
        assert_eq!(keywords_from_color(hsl(220.0, 40.0, 20.0)), vec!["dramatic", "cool"]);
        assert_eq!(keywords_from_color(hsl(260.0, 40.0, 50.0)), vec!["cool", "vibrant"]);
        assert_eq!(keywords_from_color(hsl(160.0, 40.0, 50.0)), vec!["versatile"]);
    }

    #[tokio::test]
    async fn test_analyze_solid_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swatch.png");
        image::RgbImage::from_pixel(64, 48, image::Rgb([240, 240, 240]))
            .save(&path)
            .unwrap();

        let analysis = PaletteAnalyzer.analyze(&path).await.unwrap();
        assert_eq!(analysis.average_color, Rgb { r: 240, g: 240, b: 240 });
        assert_eq!(analysis.keywords, vec!["bright", "minimal"]);
    }

    #[tokio::test]
    async fn test_analyze_missing_file() {
        let result = PaletteAnalyzer.analyze(Path::new("/nonexistent/photo.jpg")).await;
        assert!(matches!(result, Err(BackendError::Image(_))));
    }
}
