//! Document Composer — downloads both panel images and lays each on its own
//! US-letter page of a two-page PDF.
//!
//! Flow: fetch front + inside concurrently → decode → re-encode as RGB JPEG
//! XObjects → draw stretched to full page bounds → serialize. Images are
//! buffered fully in memory; rendering is CPU-bound and runs inside
//! `tokio::task::spawn_blocking`.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::errors::AppError;

/// US letter at 72 dpi-equivalent units.
pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;

/// Downloads both panel images and composes the card PDF.
/// Page 1 is the front panel, page 2 the inside panel.
pub async fn compose(
    http: &reqwest::Client,
    front_url: &str,
    inside_url: &str,
) -> Result<Bytes, AppError> {
    let (front, inside) = tokio::join!(fetch_image(http, front_url), fetch_image(http, inside_url));
    let (front, inside) = (front?, inside?);

    let pdf = tokio::task::spawn_blocking(move || render_document(&front, &inside))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("compose task failed: {e}")))??;

    Ok(Bytes::from(pdf))
}

/// Downloads one image fully into memory. No streaming and no size cap.
async fn fetch_image(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, AppError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Fetch(format!("download failed for {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Fetch(format!(
            "download failed for {url}: HTTP {status}"
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::Fetch(format!("download failed for {url}: {e}")))?;

    Ok(body.to_vec())
}

/// Renders the two panel images into a two-page letter PDF.
fn render_document(front: &[u8], inside: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let front_page = add_image_page(&mut doc, pages_id, front)?;
    let inside_page = add_image_page(&mut doc, pages_id, inside)?;

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![front_page.into(), inside_page.into()],
        "Count" => 2,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| AppError::Render(format!("failed to serialize document: {e}")))?;
    Ok(out)
}

/// Adds one page carrying a single image stretched to the full page bounds.
/// Aspect ratio is intentionally not preserved.
fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    image_bytes: &[u8],
) -> Result<ObjectId, AppError> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| AppError::Render(format!("failed to decode panel image: {e}")))?;
    let (width, height) = decoded.dimensions();

    // JPEG passes through as a DCTDecode stream, whatever the source format was.
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(decoded.to_rgb8())
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(|e| AppError::Render(format!("failed to encode panel image: {e}")))?;

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    PAGE_WIDTH_PT.into(),
                    0f32.into(),
                    0f32.into(),
                    PAGE_HEIGHT_PT.into(),
                    0f32.into(),
                    0f32.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content
            .encode()
            .map_err(|e| AppError::Render(format!("failed to encode page content: {e}")))?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0f32.into(),
            0f32.into(),
            PAGE_WIDTH_PT.into(),
            PAGE_HEIGHT_PT.into(),
        ],
        "Contents" => content_id,
        "Resources" => resources_id,
    });

    Ok(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_fixture(r: u8, g: u8, b: u8) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([r, g, b])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode fixture");
        buf
    }

    #[test]
    fn test_render_produces_two_pages() {
        let front = png_fixture(200, 30, 30);
        let inside = png_fixture(30, 30, 200);

        let pdf = render_document(&front, &inside).expect("render should succeed");
        let doc = Document::load_mem(&pdf).expect("output parses as PDF");

        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_render_output_is_pdf_shaped() {
        let front = png_fixture(0, 0, 0);
        let inside = png_fixture(255, 255, 255);

        let pdf = render_document(&front, &inside).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_undecodable_image_is_a_render_error() {
        let err = render_document(b"not an image", b"also not an image").unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}
