//! Scannable-code rendering for login URLs.
//!
//! Pure functions from a login URL to a displayable form: a PNG data URI
//! (the representation carried by the `QrCode` event) and a Unicode
//! half-block rendering for terminals.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{ImageBuffer, Luma};
use protocol::error::{ProtocolError, Result};
use qrcode::QrCode;

/// QR code module size in pixels for PNG output.
const PNG_MODULE_SIZE: u32 = 8;

/// Quiet zone (border) size in modules.
const QUIET_ZONE: u32 = 4;

/// Renders the URL as a PNG data URI (`data:image/png;base64,…`).
pub fn data_uri(url: &str) -> Result<String> {
    let png = png_bytes(url)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

/// Renders the URL as a PNG byte buffer.
pub fn png_bytes(url: &str) -> Result<Vec<u8>> {
    let code =
        QrCode::new(url.as_bytes()).map_err(|e| ProtocolError::QrEncoding(e.to_string()))?;
    let modules = code.to_colors();
    let qr_width = code.width();

    let quiet_zone_pixels = QUIET_ZONE * PNG_MODULE_SIZE;
    let qr_pixels = qr_width as u32 * PNG_MODULE_SIZE;
    let image_size = qr_pixels + 2 * quiet_zone_pixels;

    let mut img: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(image_size, image_size, Luma([255u8]));

    for (idx, color) in modules.iter().enumerate() {
        let row = (idx / qr_width) as u32;
        let col = (idx % qr_width) as u32;

        let pixel_color = if *color == qrcode::Color::Dark {
            Luma([0u8])
        } else {
            Luma([255u8])
        };

        let x_start = quiet_zone_pixels + col * PNG_MODULE_SIZE;
        let y_start = quiet_zone_pixels + row * PNG_MODULE_SIZE;

        for dy in 0..PNG_MODULE_SIZE {
            for dx in 0..PNG_MODULE_SIZE {
                img.put_pixel(x_start + dx, y_start + dy, pixel_color);
            }
        }
    }

    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| ProtocolError::QrEncoding(e.to_string()))?;

    Ok(bytes)
}

/// Renders the URL with Unicode half blocks for terminal display.
///
/// Two QR rows share one text row: upper half block (U+2580) for a dark
/// module on top, lower half block (U+2584) for dark below, full block
/// (U+2588) for both, space for neither.
pub fn terminal_string(url: &str) -> Result<String> {
    let code =
        QrCode::new(url.as_bytes()).map_err(|e| ProtocolError::QrEncoding(e.to_string()))?;
    let modules = code.to_colors();
    let width = code.width();
    let height = modules.len() / width;

    let mut output = String::new();
    let full_width = width + 2 * QUIET_ZONE as usize;

    for _ in 0..QUIET_ZONE / 2 {
        output.push_str(&" ".repeat(full_width));
        output.push('\n');
    }

    let mut row = 0;
    while row < height {
        output.push_str(&" ".repeat(QUIET_ZONE as usize));

        for col in 0..width {
            let top_dark = modules[row * width + col] == qrcode::Color::Dark;
            let bottom_dark = if row + 1 < height {
                modules[(row + 1) * width + col] == qrcode::Color::Dark
            } else {
                false
            };

            let ch = match (top_dark, bottom_dark) {
                (true, true) => '\u{2588}',
                (true, false) => '\u{2580}',
                (false, true) => '\u{2584}',
                (false, false) => ' ',
            };
            output.push(ch);
        }

        output.push_str(&" ".repeat(QUIET_ZONE as usize));
        output.push('\n');
        row += 2;
    }

    for _ in 0..QUIET_ZONE / 2 {
        output.push_str(&" ".repeat(full_width));
        output.push('\n');
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://discordapp.com/ra/abcdef0123456789";

    #[test]
    fn test_png_bytes_has_png_header() {
        let bytes = png_bytes(URL).unwrap();
        assert!(!bytes.is_empty());
        assert!(
            bytes.starts_with(&[137, 80, 78, 71, 13, 10, 26, 10]),
            "output should have a PNG header"
        );
    }

    #[test]
    fn test_data_uri_prefix() {
        let uri = data_uri(URL).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        // The payload must decode back to the PNG bytes.
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = BASE64.decode(payload).unwrap();
        assert_eq!(decoded, png_bytes(URL).unwrap());
    }

    #[test]
    fn test_terminal_string_uses_block_characters() {
        let rendered = terminal_string(URL).unwrap();
        assert!(!rendered.is_empty());

        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines.len() > 10, "QR code should have multiple rows");
        assert!(
            rendered.contains('\u{2588}')
                || rendered.contains('\u{2580}')
                || rendered.contains('\u{2584}'),
            "QR code should contain Unicode block characters"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        assert_eq!(data_uri(URL).unwrap(), data_uri(URL).unwrap());
        assert_eq!(terminal_string(URL).unwrap(), terminal_string(URL).unwrap());
    }
}
