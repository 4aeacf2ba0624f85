//! PNG encoding: container layout and physical density.

use renderer::png::{create_png, create_png_auto, dpi_to_pixels_per_meter, write_png, DEFAULT_DPI};
use test_utils::temp_test_dir;

// ============================================================================
// Helper functions
// ============================================================================

/// (type, data) of every chunk after the signature.
fn chunks(png: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = 8;
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let kind = String::from_utf8_lossy(&png[pos + 4..pos + 8]).into_owned();
        let data = png[pos + 8..pos + 8 + len].to_vec();

        let crc = u32::from_be_bytes([
            png[pos + 8 + len],
            png[pos + 9 + len],
            png[pos + 10 + len],
            png[pos + 11 + len],
        ]);
        assert_eq!(crc, crc32fast::hash(&png[pos + 4..pos + 8 + len]), "bad CRC on {}", kind);

        out.push((kind, data));
        pos += 12 + len;
    }
    out
}

fn gradient_pixels(width: usize, height: usize, levels: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let v = (((x + y) % levels) * 255 / levels) as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_signature_and_chunk_order() {
    let png = create_png_auto(&gradient_pixels(32, 16, 8), 32, 16, Some(DEFAULT_DPI)).unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

    let kinds: Vec<String> = chunks(&png).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds.first().map(String::as_str), Some("IHDR"));
    assert_eq!(kinds.last().map(String::as_str), Some("IEND"));

    let phys = kinds.iter().position(|k| k == "pHYs").unwrap();
    let idat = kinds.iter().position(|k| k == "IDAT").unwrap();
    assert!(phys < idat, "pHYs must precede image data: {:?}", kinds);
}

#[test]
fn test_phys_records_300_dpi() {
    let png = create_png(&gradient_pixels(8, 8, 300), 8, 8, Some(300)).unwrap();
    let (_, phys) = chunks(&png).into_iter().find(|(k, _)| k == "pHYs").unwrap();

    assert_eq!(phys.len(), 9);
    let x = u32::from_be_bytes([phys[0], phys[1], phys[2], phys[3]]);
    let y = u32::from_be_bytes([phys[4], phys[5], phys[6], phys[7]]);
    assert_eq!((x, y), (11811, 11811));
    assert_eq!(phys[8], 1);
    assert_eq!(dpi_to_pixels_per_meter(300), x);
}

#[test]
fn test_no_density_without_dpi() {
    let png = create_png_auto(&gradient_pixels(4, 4, 4), 4, 4, None).unwrap();
    assert!(chunks(&png).iter().all(|(k, _)| k != "pHYs"));
}

#[test]
fn test_ihdr_dimensions_and_mode() {
    let few = create_png_auto(&gradient_pixels(20, 10, 4), 20, 10, None).unwrap();
    let (_, ihdr) = chunks(&few).into_iter().find(|(k, _)| k == "IHDR").unwrap();
    assert_eq!(u32::from_be_bytes([ihdr[0], ihdr[1], ihdr[2], ihdr[3]]), 20);
    assert_eq!(u32::from_be_bytes([ihdr[4], ihdr[5], ihdr[6], ihdr[7]]), 10);
    assert_eq!(ihdr[9], 3, "few colors should be indexed");

    let mut many = Vec::new();
    for i in 0..400u32 {
        many.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let rgba = create_png_auto(&many, 20, 20, None).unwrap();
    let (_, ihdr) = chunks(&rgba).into_iter().find(|(k, _)| k == "IHDR").unwrap();
    assert_eq!(ihdr[9], 6, "many colors should fall back to RGBA");
}

#[test]
fn test_wrong_buffer_length_rejected() {
    assert!(create_png_auto(&[0u8; 12], 2, 2, None).is_err());
}

#[test]
fn test_write_png_creates_directories() {
    let dir = temp_test_dir();
    let path = dir.path().join("nested").join("map.png");
    let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));

    write_png(&path, &image, Some(DEFAULT_DPI)).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}
