use crate::surface::Color;

/// Page size and margins in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }
}

impl Default for PageGeometry {
    // US Letter with 2/3 inch margins
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 48.0,
            margin_bottom: 48.0,
            margin_left: 54.0,
            margin_right: 54.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub page: PageGeometry,
    pub base_font_size: f32,
    pub base_line_height: f32,
    pub heading_line_height: f32,
    pub accent_color: Color,
    /// Family used for chapter headings. Resolved from system fonts, Helvetica if missing.
    pub display_font: String,
    pub toc_title: String,
    pub toc_indent: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            base_font_size: 10.5,
            base_line_height: 1.15,
            heading_line_height: 1.2,
            accent_color: Color::Cmyk([42, 1, 83, 1]),
            display_font: "Akkurat".to_string(),
            toc_title: "Table of Contents".to_string(),
            toc_indent: 15.0,
        }
    }
}
