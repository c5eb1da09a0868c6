//! Label renderer: draws the requested text onto a solid background and
//! hands the PNG back base64 encoded inside an API Gateway envelope.

use std::path::PathBuf;

use lamp_core::{is_truthy, ApiGatewayResponse};
use serde_json::{json, Value};

pub use self::raster::Rasterizer;

mod raster;
mod svg;

const SUCCESS_MESSAGE: &str = "¡Imagen creada!";
const FAILURE_MESSAGE: &str = "Error procesando imagen";
const IMAGE_FORMAT: &str = "PNG";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{axis} must be positive, got {value}")]
    InvalidDimension { axis: &'static str, value: i64 },
    #[error("{axis} of {value} exceeds the maximum of {max}")]
    TooLarge {
        axis: &'static str,
        value: i64,
        max: u32,
    },
    #[error("could not parse svg: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("could not allocate a {0}x{1} canvas")]
    Canvas(u32, u32),
    #[error("png encoding failed: {0}")]
    Png(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSettings {
    pub system_fonts: bool,
    pub font_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub default_text: String,
    pub default_width: u32,
    pub default_height: u32,
    pub max_dimension: u32,
    pub fonts: FontSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub text: String,
    pub width: u32,
    pub height: u32,
}

impl RenderRequest {
    /// Build a request from a raw invocation payload.
    ///
    /// Missing, falsy or unparsable fields take the configured defaults.
    /// Dimensions are read the way `parseInt` reads them, so `"300px"` is 300.
    pub fn from_event(event: &Value, settings: &RenderSettings) -> Result<Self, RenderError> {
        let text = match event.get("text") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(v) if is_truthy(v) => v.to_string(),
            _ => settings.default_text.clone(),
        };
        let width = coerce_dimension(
            "width",
            event.get("width"),
            settings.default_width,
            settings.max_dimension,
        )?;
        let height = coerce_dimension(
            "height",
            event.get("height"),
            settings.default_height,
            settings.max_dimension,
        )?;
        Ok(RenderRequest {
            text,
            width,
            height,
        })
    }

    pub fn image_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

fn coerce_dimension(
    axis: &'static str,
    value: Option<&Value>,
    default: u32,
    max: u32,
) -> Result<u32, RenderError> {
    match value.and_then(parse_int) {
        None | Some(0) => Ok(default),
        Some(n) if n < 0 => Err(RenderError::InvalidDimension { axis, value: n }),
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|v| *v <= max)
            .ok_or(RenderError::TooLarge { axis, value: n, max }),
    }
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub request: RenderRequest,
    pub png: Vec<u8>,
}

/// Holds the font database, which is expensive to build, across invocations.
#[derive(Debug)]
pub struct Renderer {
    settings: RenderSettings,
    rasterizer: Rasterizer,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        let rasterizer = Rasterizer::new(&settings.fonts);
        Renderer {
            settings,
            rasterizer,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn render(&self, request: RenderRequest) -> Result<RenderedImage, RenderError> {
        log::info!(
            "creating image: {} ({})",
            request.text,
            request.image_size()
        );
        let svg = svg::label_svg(&request);
        let png = self.rasterizer.rasterize(&svg)?;
        Ok(RenderedImage { request, png })
    }

    fn render_event_inner(&self, event: &Value) -> Result<RenderedImage, RenderError> {
        let request = RenderRequest::from_event(event, &self.settings)?;
        self.render(request)
    }

    /// Entry point for the render function. Never fails: errors become a 500.
    pub fn render_event(&self, event: &Value) -> ApiGatewayResponse {
        log::info!("event received: {}", event);
        match self.render_event_inner(event) {
            Ok(image) => {
                log::debug!("png is {} bytes", image.png.len());
                success_response(&image)
            }
            Err(e) => {
                log::error!("render failed: {}", e);
                ApiGatewayResponse::json(
                    500,
                    &json!({
                        "success": false,
                        "error": e.to_string(),
                        "message": FAILURE_MESSAGE,
                    }),
                )
            }
        }
    }
}

fn success_response(image: &RenderedImage) -> ApiGatewayResponse {
    ApiGatewayResponse::json(
        200,
        &json!({
            "success": true,
            "message": SUCCESS_MESSAGE,
            "text": image.request.text,
            "image_size": image.request.image_size(),
            "image_data": lamp_core::base64::encode(&image.png),
            "image_format": IMAGE_FORMAT,
            "file_size": format!("{} bytes", image.png.len()),
            "file_size_bytes": image.png.len(),
            "timestamp": lamp_core::iso_timestamp(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn settings() -> RenderSettings {
        RenderSettings {
            default_text: "Laravel + Lambda".to_string(),
            default_width: 800,
            default_height: 600,
            max_dimension: 4096,
            fonts: FontSettings {
                system_fonts: false,
                font_dir: None,
            },
        }
    }

    fn request(event: Value) -> Result<RenderRequest, RenderError> {
        RenderRequest::from_event(&event, &settings())
    }

    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        // IHDR is the first chunk: width and height follow the chunk type
        let width = u32::from_be_bytes(png[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(png[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn defaults_for_empty_event() {
        let req = request(json!({})).unwrap();
        assert_eq!(
            req,
            RenderRequest {
                text: "Laravel + Lambda".to_string(),
                width: 800,
                height: 600,
            }
        );
    }

    #[test]
    fn dimension_coercion_follows_parse_int() {
        assert_eq!(request(json!({"width": "abc"})).unwrap().width, 800);
        assert_eq!(request(json!({"width": "300"})).unwrap().width, 300);
        assert_eq!(request(json!({"width": " 300px"})).unwrap().width, 300);
        assert_eq!(request(json!({"width": 300.9})).unwrap().width, 300);
        assert_eq!(request(json!({"width": 0})).unwrap().width, 800);
        assert_eq!(request(json!({"height": true})).unwrap().height, 600);
        assert_eq!(request(json!({"height": null})).unwrap().height, 600);
    }

    #[test]
    fn negative_dimension_is_an_error() {
        let err = request(json!({"width": "-5"})).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidDimension {
                axis: "width",
                value: -5
            }
        ));
    }

    #[test]
    fn oversized_dimension_is_an_error() {
        let err = request(json!({"height": 5000})).unwrap_err();
        assert!(matches!(err, RenderError::TooLarge { axis: "height", .. }));
    }

    #[test]
    fn non_string_text_is_stringified() {
        assert_eq!(request(json!({"text": 42})).unwrap().text, "42");
        assert_eq!(request(json!({"text": ""})).unwrap().text, "Laravel + Lambda");
    }

    #[test]
    fn render_event_returns_png_payload() {
        let renderer = Renderer::new(settings());
        let resp = renderer.render_event(&json!({"text": "Hola", "width": 64, "height": "48"}));
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.headers["Content-Type"], "application/json");

        let body = resp.body_json().unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["text"], "Hola");
        assert_eq!(body["image_size"], "64x48");
        assert_eq!(body["image_format"], "PNG");
        assert_eq!(body["message"], "¡Imagen creada!");
        assert!(body.get("sharp_working").is_none());

        let png = lamp_core::base64::decode(body["image_data"].as_str().unwrap()).unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
        assert_eq!(png_dimensions(&png), (64, 48));
        assert_eq!(body["file_size_bytes"], png.len());
        assert_eq!(body["file_size"], format!("{} bytes", png.len()));
    }

    #[test]
    fn labels_are_drawn_without_system_fonts() {
        let renderer = Renderer::new(settings());
        let image = renderer
            .render(RenderRequest {
                text: "HOLA HOLA".to_string(),
                width: 200,
                height: 100,
            })
            .unwrap();
        let pixmap = resvg::tiny_skia::Pixmap::decode_png(&image.png).unwrap();

        // white glyphs on a #2563eb background
        let is_ink = |x: u32, y: u32| pixmap.pixel(x, y).map(|p| p.red() > 0xa0).unwrap_or(false);
        let label_ink = (40..60)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| is_ink(x, y))
            .count();
        assert!(label_ink > 0, "no text pixels around the center row");
        assert!(!is_ink(0, 0));
        assert!(!is_ink(199, 99));
    }

    #[test]
    fn markup_in_text_does_not_break_rendering() {
        let renderer = Renderer::new(settings());
        let resp = renderer.render_event(&json!({"text": "<b>&\"'", "width": 32, "height": 32}));
        assert_eq!(resp.status_code, 200, "{}", resp.body);
    }

    #[test]
    fn render_failure_is_a_500() {
        let renderer = Renderer::new(settings());
        let resp = renderer.render_event(&json!({"width": -1}));
        assert_eq!(resp.status_code, 500);
        let body = resp.body_json().unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Error procesando imagen");
        assert_eq!(body["error"], "width must be positive, got -1");
    }
}
