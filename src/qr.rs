//! QR identity tokens and their rendered images.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;
use uuid::Uuid;

const TOKEN_PREFIX: &str = "MP-";

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// Fresh opaque token for a new student. Never derived from student data.
pub fn new_token() -> String {
    format!("{TOKEN_PREFIX}{}", Uuid::new_v4().simple()).to_uppercase()
}

/// Render `payload` as an SVG QR code
pub fn render_svg(payload: &str) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .quiet_zone(true)
        .build();
    Ok(image)
}

/// Render `payload` as a `data:` URL the frontend can drop into an `<img>`
pub fn render_data_url(payload: &str) -> Result<String, QrError> {
    let svg = render_svg(payload)?;
    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_prefixed() {
        let a = new_token();
        let b = new_token();
        assert_ne!(a, b);
        assert!(a.starts_with(TOKEN_PREFIX));
        assert_eq!(a.len(), TOKEN_PREFIX.len() + 32);
    }

    #[test]
    fn renders_svg_data_url() {
        let url = render_data_url(&new_token()).unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
        let encoded = url.trim_start_matches("data:image/svg+xml;base64,");
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }
}
