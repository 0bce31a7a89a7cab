// SPDX-License-Identifier: MPL-2.0
//! Text rasterization through resvg.
//!
//! Runs are laid out as SVG `<text>` elements and rendered on top of an
//! existing surface. System fonts are loaded once per process.

use crate::error::{Error, Result};
use resvg::usvg;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};
use tiny_skia::{Pixmap, Transform};

/// Font families offered for text layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Inter,
    Lora,
    Montserrat,
}

impl FontFamily {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter",
            FontFamily::Lora => "Lora",
            FontFamily::Montserrat => "Montserrat",
        }
    }

    /// CSS font-family list with a generic fallback.
    #[must_use]
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter, sans-serif",
            FontFamily::Lora => "Lora, serif",
            FontFamily::Montserrat => "Montserrat, sans-serif",
        }
    }

    #[must_use]
    pub fn all() -> &'static [FontFamily] {
        &[FontFamily::Inter, FontFamily::Lora, FontFamily::Montserrat]
    }
}

/// Horizontal alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn anchor(self) -> &'static str {
        match self {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        }
    }
}

/// One line of text positioned in surface pixels.
///
/// `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub content: String,
    pub family: FontFamily,
    pub size: f32,
    pub color: String,
    pub opacity: f32,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
    pub x: f32,
    pub y: f32,
}

fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds the SVG document for `runs` on a `width` x `height` canvas.
#[must_use]
pub fn to_svg(runs: &[TextRun], width: u32, height: u32) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    for run in runs {
        // Writing to a String cannot fail.
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-weight="{weight}" font-style="{style}" fill="{fill}" fill-opacity="{opacity}" text-anchor="{anchor}" xml:space="preserve">{content}</text>"#,
            x = run.x,
            y = run.y,
            family = run.family.css_stack(),
            size = run.size,
            weight = if run.bold { "bold" } else { "normal" },
            style = if run.italic { "italic" } else { "normal" },
            fill = escape_xml(&run.color),
            opacity = run.opacity.clamp(0.0, 1.0),
            anchor = run.align.anchor(),
            content = escape_xml(&run.content),
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Draws `runs` over the existing content of `pixmap`.
///
/// # Errors
///
/// Returns [`Error::Surface`] if the generated document cannot be parsed.
pub fn draw(pixmap: &mut Pixmap, runs: &[TextRun]) -> Result<()> {
    if runs.is_empty() {
        return Ok(());
    }
    let svg = to_svg(runs, pixmap.width(), pixmap.height());

    let mut options = usvg::Options::default();
    options.fontdb = font_database();

    let tree = usvg::Tree::from_str(&svg, &options)
        .map_err(|e| Error::Surface(format!("failed to lay out text: {e}")))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(content: &str) -> TextRun {
        TextRun {
            content: content.to_string(),
            family: FontFamily::Lora,
            size: 24.0,
            color: "#FF0000".to_string(),
            opacity: 1.0,
            bold: true,
            italic: false,
            align: TextAlign::Center,
            x: 10.0,
            y: 30.0,
        }
    }

    #[test]
    fn svg_escapes_markup_in_content() {
        let svg = to_svg(&[run("a < b & \"c\"")], 100, 50);
        assert!(svg.contains("a &lt; b &amp; &quot;c&quot;"));
        assert!(!svg.contains("a < b"));
    }

    #[test]
    fn svg_carries_style_attributes() {
        let svg = to_svg(&[run("Hi")], 100, 50);
        assert!(svg.contains(r#"font-family="Lora, serif""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r##"fill="#FF0000""##));
    }

    #[test]
    fn draw_with_no_runs_leaves_surface_untouched() {
        let mut pixmap = Pixmap::new(10, 10).expect("pixmap");
        draw(&mut pixmap, &[]).expect("draw");
        assert!(pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_accepts_hostile_content() {
        let mut pixmap = Pixmap::new(64, 32).expect("pixmap");
        draw(&mut pixmap, &[run("</text><script/>")]).expect("draw");
    }

    #[test]
    fn family_fallbacks() {
        assert_eq!(FontFamily::Inter.css_stack(), "Inter, sans-serif");
        assert_eq!(FontFamily::Montserrat.name(), "Montserrat");
        assert_eq!(FontFamily::all().len(), 3);
    }
}
