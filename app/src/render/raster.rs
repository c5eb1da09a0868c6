use std::fmt;

use resvg::{tiny_skia, usvg};

use super::{FontSettings, RenderError};

/// Loaded into every font database, ahead of system fonts.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BUNDLED_FAMILY: &str = "DejaVu Sans";

pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rasterizer")
            .field("fonts", &self.options.fontdb.len())
            .finish()
    }
}

impl Rasterizer {
    pub fn new(fonts: &FontSettings) -> Self {
        let mut options = usvg::Options::default();
        let fontdb = options.fontdb_mut();
        fontdb.load_font_data(BUNDLED_FONT.to_vec());
        // `sans-serif` resolves to the bundled face when Arial is missing
        fontdb.set_sans_serif_family(BUNDLED_FAMILY);
        if fonts.system_fonts {
            fontdb.load_system_fonts();
        }
        if let Some(dir) = &fonts.font_dir {
            fontdb.load_fonts_dir(dir);
        }
        log::debug!("loaded {} font faces", options.fontdb.len());
        Rasterizer { options }
    }

    /// svg -> png bytes
    pub fn rasterize(&self, svg: &str) -> Result<Vec<u8>, RenderError> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| RenderError::Canvas(size.width(), size.height()))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Png(e.to_string()))
    }
}
