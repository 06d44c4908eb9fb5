//! QR rendering for short links
//!
//! Renders the fully qualified short link into an SVG QR code and wraps it
//! as a base64 data URI so clients can embed it directly in an `<img>` tag.

use base64::Engine;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::errors::{Result, ServiceError};

const QR_MIN_DIMENSIONS: u32 = 240;

/// Encode a URL as an SVG QR image, returned as a `data:image/svg+xml` URI.
pub fn render_data_uri(url: &str) -> Result<String> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| ServiceError::qr_render(format!("QR encoding failed: {}", e)))?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_DIMENSIONS, QR_MIN_DIMENSIONS)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    let encoded = base64::engine::general_purpose::STANDARD.encode(image.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{}", encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_data_uri_shape() {
        let uri = render_data_uri("https://cur.tl/abc123d").unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));

        let payload = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .expect("payload should be valid base64");
        let svg_text = String::from_utf8(decoded).expect("payload should be UTF-8 SVG");
        assert!(svg_text.contains("<svg"));
    }

    #[test]
    fn test_render_distinct_inputs_distinct_images() {
        let a = render_data_uri("https://cur.tl/aaaaaaa").unwrap();
        let b = render_data_uri("https://cur.tl/bbbbbbb").unwrap();
        assert_ne!(a, b);
    }
}
