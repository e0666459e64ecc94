use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decodes_png_dimensions() {
    let page = ImageCrateDecoder
        .decode(&png_bytes(6, 4), PageFormat::Png)
        .unwrap();
    assert_eq!((page.width, page.height), (6, 4));
    assert_eq!(page.natural_size(), Size::new(6.0, 4.0));
    assert_eq!(page.pixels.get_pixel(0, 0).0, [10, 20, 30, 255]);
}

#[test]
fn signature_wins_over_requested_format() {
    let page = ImageCrateDecoder
        .decode(&png_bytes(2, 2), PageFormat::Webp)
        .unwrap();
    assert_eq!(page.width, 2);
}

#[test]
fn garbage_is_a_decode_error() {
    let err = ImageCrateDecoder
        .decode(b"definitely not an image", PageFormat::Png)
        .unwrap_err();
    assert!(err.to_string().contains("decode error:"));
}
