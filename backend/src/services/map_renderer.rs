//! Tile-grid SVG of the prefectures, one rounded square per region.

use crate::data::regions;
use crate::models::visit::{self, VisitRating};
use crate::services::statistics::highest_ratings;

/// Colors and geometry of the exported map
#[derive(Debug, Clone)]
pub struct MapStyle {
    pub cell_size: u32,
    pub cell_gap: u32,
    pub cell_radius: u32,
    pub padding: u32,
    pub title_height: u32,
    pub legend_height: u32,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Fill per rating, index 0 is "never been"
    pub palette: [String; 6],
    pub show_legend: bool,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            cell_size: 36,
            cell_gap: 4,
            cell_radius: 6,
            padding: 24,
            title_height: 40,
            legend_height: 36,
            background_color: "oklch(0.985 0.002 247)".to_string(),
            text_color: "oklch(0.279 0.041 260)".to_string(),
            font_family: "sans-serif".to_string(),
            palette: [
                "oklch(0.929 0.013 255.5)".to_string(),
                "oklch(0.882 0.059 254.1)".to_string(),
                "oklch(0.809 0.105 251.8)".to_string(),
                "oklch(0.707 0.165 254.6)".to_string(),
                "oklch(0.623 0.214 259.8)".to_string(),
                "oklch(0.488 0.243 264.4)".to_string(),
            ],
            show_legend: true,
        }
    }
}

impl MapStyle {
    pub fn color_for_rating(&self, rating: i32) -> &str {
        let index = rating.clamp(0, 5) as usize;
        &self.palette[index]
    }
}

pub fn render_map_svg(visits: &[visit::Model], style: &MapStyle, title: Option<&str>) -> String {
    let highest = highest_ratings(visits);

    let cols = regions::all().iter().map(|r| r.tile_col as u32).max().unwrap_or(0) + 1;
    let rows = regions::all().iter().map(|r| r.tile_row as u32).max().unwrap_or(0) + 1;
    let step = style.cell_size + style.cell_gap;

    let grid_width = cols * step - style.cell_gap;
    let grid_height = rows * step - style.cell_gap;
    let title_height = if title.is_some() { style.title_height } else { 0 };
    let legend_height = if style.show_legend { style.legend_height } else { 0 };

    let total_width = style.padding * 2 + grid_width;
    let total_height = style.padding * 2 + title_height + grid_height + legend_height;

    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
        total_width, total_height, total_width, total_height
    ));

    svg.push_str(&format!(
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        style.background_color
    ));

    if let Some(title) = title {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="20" font-weight="600" fill="{}">{}</text>"#,
            style.padding,
            style.padding + 20,
            style.font_family,
            style.text_color,
            escape_xml(title)
        ));
    }

    let grid_top = style.padding + title_height;
    for region in regions::all() {
        let rating = highest.get(region.id).copied().unwrap_or(0);
        let x = style.padding + region.tile_col as u32 * step;
        let y = grid_top + region.tile_row as u32 * step;

        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" fill="{}"><title>{}: {}</title></rect>"#,
            x,
            y,
            style.cell_size,
            style.cell_size,
            style.cell_radius,
            style.cell_radius,
            style.color_for_rating(rating),
            region.name,
            VisitRating::from_value(rating)
                .map(|r| r.label())
                .unwrap_or("Unknown")
        ));
    }

    let visited = regions::all()
        .iter()
        .filter(|r| highest.get(r.id).is_some_and(|rating| *rating > 0))
        .count();

    // Caption sits in the empty top-left corner of the grid
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" font-family="{}" font-size="16" fill="{}">{} / {}</text>"#,
        style.padding,
        grid_top + 16,
        style.font_family,
        style.text_color,
        visited,
        regions::all().len()
    ));

    if style.show_legend {
        let legend_y = grid_top + grid_height + style.legend_height / 2;
        let swatch = 12;
        let mut x = style.padding;

        for rating in 0..=5 {
            let label = VisitRating::from_value(rating)
                .map(|r| r.label())
                .unwrap_or("Unknown");

            svg.push_str(&format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="2" fill="{}"/>"#,
                x,
                legend_y,
                swatch,
                swatch,
                style.color_for_rating(rating)
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" font-family="{}" font-size="10" fill="{}">{}</text>"#,
                x + swatch + 4,
                legend_y + 10,
                style.font_family,
                style.text_color,
                label
            ));

            x += swatch + 8 + label.len() as u32 * 6;
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Escapes markup and `(`, so user text can never read as a CSS color function
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('(', "&#40;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::export::css_color::contains_modern_color_function;
    use chrono::Utc;
    use uuid::Uuid;

    fn visit(region_id: &str, rating: i32) -> visit::Model {
        visit::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            region_id: region_id.to_string(),
            country_id: "japan".to_string(),
            rating,
            visit_year: 2020,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_one_cell_per_region() {
        let svg = render_map_svg(&[], &MapStyle::default(), None);
        assert_eq!(svg.matches("<title>").count(), 47);
        assert!(svg.contains("0 / 47"));
    }

    #[test]
    fn test_cells_use_highest_rating() {
        let style = MapStyle::default();
        let svg = render_map_svg(
            &[visit("tokyo", 2), visit("tokyo", 5), visit("nara", 0)],
            &style,
            None,
        );

        assert!(svg.contains(&format!(r#"fill="{}"><title>Tokyo: Lived there</title>"#, style.palette[5])));
        assert!(svg.contains("<title>Nara: Never been</title>"));
        assert!(svg.contains("1 / 47"));
    }

    #[test]
    fn test_default_palette_uses_modern_colors() {
        let svg = render_map_svg(&[], &MapStyle::default(), None);
        assert!(contains_modern_color_function(&svg));
    }

    #[test]
    fn test_title_is_escaped() {
        let svg = render_map_svg(&[], &MapStyle::default(), Some("Tom & Jerry <3"));
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
    }

    #[test]
    fn test_title_cannot_inject_color_functions() {
        let style = MapStyle {
            background_color: "#ffffff".to_string(),
            text_color: "#000000".to_string(),
            palette: std::array::from_fn(|_| "#cccccc".to_string()),
            ..MapStyle::default()
        };

        for title in ["Science lab(2024)", "My lch(trip)", "OKLCH(1 0 0)", "oklab("] {
            let svg = render_map_svg(&[], &style, Some(title));
            assert!(!contains_modern_color_function(&svg), "{}", title);
        }

        let svg = render_map_svg(&[], &style, Some("Trips (ok)"));
        assert!(svg.contains("Trips &#40;ok)"));
    }

    #[test]
    fn test_legend_can_be_hidden() {
        let style = MapStyle {
            show_legend: false,
            ..MapStyle::default()
        };
        let svg = render_map_svg(&[], &style, None);
        assert!(!svg.contains("Stayed overnight</text>"));
    }
}
