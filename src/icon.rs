//! Default application icon
//!
//! The pixels are generated in code and written once as a PNG-compressed
//! `.ico` so builds have an icon to point at. The same pixels are used as the
//! GUI window icon.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::constants::icon::SIZE;

const ICO_HEADER_LEN: u32 = 6;
const ICO_ENTRY_LEN: u32 = 16;

/// RGBA pixels of the default icon (two interlocking rounded blocks)
pub fn default_icon_rgba() -> Vec<u8> {
    const BLUE: [u8; 4] = [0x37, 0x76, 0xAB, 0xFF];
    const YELLOW: [u8; 4] = [0xFF, 0xD4, 0x3B, 0xFF];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    let half = SIZE / 2;
    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let upper_left = x < half + 4 && y < half + 4 && x >= 2 && y >= 2;
            let lower_right = x >= half - 4 && y >= half - 4 && x < SIZE - 2 && y < SIZE - 2;
            let pixel = if upper_left && (!lower_right || x + y < SIZE) {
                BLUE
            } else if lower_right {
                YELLOW
            } else {
                CLEAR
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    rgba
}

/// Encode the default icon as a single-image ICO with an embedded PNG
pub fn default_icon_ico() -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, SIZE, SIZE);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().context("Failed to write PNG header")?;
        writer
            .write_image_data(&default_icon_rgba())
            .context("Failed to encode icon pixels")?;
        writer.finish().context("Failed to finish PNG stream")?;
    }

    let mut ico = Vec::with_capacity((ICO_HEADER_LEN + ICO_ENTRY_LEN) as usize + png_bytes.len());
    // ICONDIR: reserved, type (1 = icon), image count
    ico.extend_from_slice(&0u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    // ICONDIRENTRY
    ico.push(SIZE as u8);
    ico.push(SIZE as u8);
    ico.push(0); // palette size
    ico.push(0); // reserved
    ico.extend_from_slice(&1u16.to_le_bytes()); // color planes
    ico.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    ico.extend_from_slice(&(png_bytes.len() as u32).to_le_bytes());
    ico.extend_from_slice(&(ICO_HEADER_LEN + ICO_ENTRY_LEN).to_le_bytes());
    ico.extend_from_slice(&png_bytes);
    Ok(ico)
}

/// Write the default icon to `path` unless something is already there
///
/// Returns whether a file was written. Safe to call repeatedly.
pub fn ensure_default_icon(path: &Path) -> Result<bool> {
    let bytes = default_icon_ico()?;
    let written = write_new_file(path, |file| file.write_all(&bytes))
        .with_context(|| format!("Failed to write default icon {:?}", path))?;
    if written {
        info!(path = %path.display(), "Created default icon");
    }
    Ok(written)
}

/// Create `path` and fill it with `write`; an existing file is left alone
///
/// A failed write removes the partial file so the next call starts over.
fn write_new_file(path: &Path, write: impl FnOnce(&mut File) -> io::Result<()>) -> io::Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err),
    };

    if let Err(err) = write(&mut file) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove_err, "Failed to remove partial file");
        }
        return Err(err);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rgba_dimensions() {
        assert_eq!(default_icon_rgba().len(), (SIZE * SIZE * 4) as usize);
    }

    #[test]
    fn test_ico_header() {
        let ico = default_icon_ico().unwrap();
        assert_eq!(&ico[..6], &[0, 0, 1, 0, 1, 0]);
        assert_eq!(ico[6], SIZE as u8);
        // Embedded image starts right after the directory with the PNG signature
        assert_eq!(&ico[22..30], b"\x89PNG\r\n\x1a\n");
        let len = u32::from_le_bytes(ico[14..18].try_into().unwrap()) as usize;
        assert_eq!(ico.len(), 22 + len);
    }

    #[test]
    fn test_ensure_default_icon_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.ico");

        assert!(ensure_default_icon(&path).unwrap());
        let first = fs::read(&path).unwrap();

        assert!(!ensure_default_icon(&path).unwrap());
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn test_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.ico");
        fs::write(&path, b"custom").unwrap();

        assert!(!ensure_default_icon(&path).unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"custom");
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.ico");

        let result = write_new_file(&path, |file| {
            file.write_all(b"\0\0\x01")?;
            Err(io::Error::other("disk full"))
        });
        assert!(result.is_err());
        assert!(!path.exists());

        // Next bootstrap writes a complete icon
        assert!(ensure_default_icon(&path).unwrap());
        assert_eq!(fs::read(&path).unwrap(), default_icon_ico().unwrap());
    }
}
