//! Extract embedded page images from a PDF using lopdf
//!
//! Files are named `image{page:04}_{index:03}.{ext}` so that sorting by file
//! name keeps page order. JPEG streams are copied verbatim as `.jpg`, raw
//! 8-bit samples are re-encoded as `.png`.

use crate::error::AppError;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// Write every image XObject of every page into `output_dir`.
/// Images that cannot be decoded are skipped with a warning.
pub fn extract_images(pdf_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let doc = Document::load(pdf_path)
        .map_err(|e| AppError::Pdf(format!("{}: {}", pdf_path.display(), e)))?;
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for (page_number, page_id) in doc.get_pages() {
        let images = page_images(&doc, page_id);
        if images.is_empty() {
            tracing::info!("No images found on page {}", page_number);
            continue;
        }
        tracing::info!("Found {} image(s) on page {}", images.len(), page_number);

        for (index, (object_id, stream)) in images.into_iter().enumerate() {
            let stem = format!("image{:04}_{:03}", page_number, index + 1);
            match write_image(&doc, stream, output_dir, &stem) {
                Ok(path) => {
                    tracing::debug!("Saved {:?} from object {:?}", path, object_id);
                    written.push(path);
                }
                Err(e) => tracing::warn!(
                    "Failed to extract image {} of page {} (object {:?}): {}",
                    index + 1,
                    page_number,
                    object_id,
                    e
                ),
            }
        }
    }

    Ok(written)
}

/// Image XObjects of a page, following inherited resources up the page tree
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<(ObjectId, &Stream)> {
    let Some(xobjects) = page_xobjects(doc, page_id) else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, object)| {
            let id = object.as_reference().ok()?;
            let stream = doc.get_object(id).and_then(Object::as_stream).ok()?;
            let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok()?;
            (subtype == b"Image").then_some((id, stream))
        })
        .collect()
}

fn page_xobjects(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Bounded walk so a cyclic Parent chain cannot hang
    for _ in 0..32 {
        if let Ok(resources) = node.get(b"Resources") {
            let resources = resolve(doc, resources)?.as_dict().ok()?;
            let xobjects = resources.get(b"XObject").ok()?;
            return resolve(doc, xobjects)?.as_dict().ok();
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

fn write_image(
    doc: &Document,
    stream: &Stream,
    output_dir: &Path,
    stem: &str,
) -> Result<PathBuf, AppError> {
    let filters = filters(stream);
    if matches!(filters.as_slice(), [only] if only == b"DCTDecode") {
        let path = output_dir.join(format!("{}.jpg", stem));
        std::fs::write(&path, &stream.content)?;
        return Ok(path);
    }
    if let Some(unsupported) = filters.iter().find(|f| f.as_slice() != b"FlateDecode") {
        return Err(AppError::Pdf(format!(
            "Unsupported image filter: {}",
            String::from_utf8_lossy(unsupported)
        )));
    }

    let image = decode_raw_image(doc, stream)?;
    let path = output_dir.join(format!("{}.png", stem));
    image
        .save(&path)
        .map_err(|e| AppError::Pdf(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(path)
}

/// Decode an uncompressed or Flate-compressed 8-bit image stream
fn decode_raw_image(doc: &Document, stream: &Stream) -> Result<DynamicImage, AppError> {
    let dimension = |key: &[u8]| -> Result<u32, AppError> {
        stream
            .dict
            .get(key)
            .and_then(Object::as_i64)
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                AppError::Pdf(format!("Missing image {}", String::from_utf8_lossy(key)))
            })
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;

    let bits_per_component = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits_per_component != 8 {
        return Err(AppError::Pdf(format!(
            "Unsupported bits per component: {}",
            bits_per_component
        )));
    }

    let data = if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| AppError::Pdf(format!("Failed to decompress image: {}", e)))?
    } else {
        stream.content.clone()
    };

    let pixels = width as usize * height as usize;
    let space = color_space(doc, stream);
    let channels = match space.as_str() {
        "DeviceGray" | "CalGray" => 1,
        "DeviceRGB" | "CalRGB" => 3,
        "DeviceCMYK" => 4,
        // The ICC profile's component count is implied by the sample data
        "ICCBased" => match data.len() / pixels.max(1) {
            n @ (1 | 3 | 4) => n,
            _ => 3,
        },
        other => {
            return Err(AppError::Pdf(format!("Unsupported color space: {}", other)));
        }
    };
    tracing::debug!(
        "PDF image: {}x{}, color_space={}, channels={}, data_len={}",
        width,
        height,
        space,
        channels,
        data.len()
    );

    let samples = data.get(..pixels * channels).ok_or_else(|| {
        AppError::Pdf(format!(
            "{} image data too short: {} bytes, expected {}",
            space,
            data.len(),
            pixels * channels
        ))
    })?;

    let image = match channels {
        1 => image::GrayImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageLuma8),
        3 => image::RgbImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageRgb8),
        _ => image::RgbImage::from_raw(width, height, cmyk_to_rgb(samples))
            .map(DynamicImage::ImageRgb8),
    };
    image.ok_or_else(|| AppError::Pdf(format!("Invalid {}x{} image buffer", width, height)))
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|px| {
            let k = 1.0 - px[3] as f32 / 255.0;
            [0, 1, 2].map(|i| ((1.0 - px[i] as f32 / 255.0) * k * 255.0).round() as u8)
        })
        .collect()
}

/// Color space family name, resolving indirect references and `[/ICCBased ref]` arrays
fn color_space(doc: &Document, stream: &Stream) -> String {
    let name = stream
        .dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|object| resolve(doc, object))
        .and_then(|object| match object {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(items) => items.first().and_then(|first| first.as_name().ok()),
            _ => None,
        });

    name.map(|n| String::from_utf8_lossy(n).into_owned())
        .unwrap_or_else(|| "DeviceRGB".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn image_stream(color_space: &str, width: i64, height: i64, data: Vec<u8>) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
            },
            data,
        )
    }

    /// One page per stream, each holding a single image XObject
    fn write_pdf(path: &Path, images: Vec<Stream>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for stream in images {
            let image_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im1" => image_id },
                },
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_raw_images_are_saved_as_png_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        let mut flate = image_stream("DeviceRGB", 4, 2, vec![200; 4 * 2 * 3]);
        flate.compress().unwrap();
        write_pdf(
            &pdf,
            vec![image_stream("DeviceGray", 3, 2, vec![10, 20, 30, 40, 50, 60]), flate],
        );

        let out = dir.path().join("images");
        let written = extract_images(&pdf, &out).unwrap();
        assert_eq!(names(&written), ["image0001_001.png", "image0002_001.png"]);

        let gray = image::open(&written[0]).unwrap().to_luma8();
        assert_eq!(gray.dimensions(), (3, 2));
        assert_eq!(gray.get_pixel(2, 1)[0], 60);

        let rgb = image::open(&written[1]).unwrap().to_rgb8();
        assert_eq!(rgb.dimensions(), (4, 2));
        assert_eq!(rgb.get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn test_jpeg_stream_is_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut jpeg = Vec::new();
        DynamicImage::ImageLuma8(image::GrayImage::from_pixel(8, 8, image::Luma([128])))
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let mut stream = image_stream("DeviceGray", 8, 8, jpeg.clone());
        stream.dict.set("Filter", "DCTDecode");
        let pdf = dir.path().join("doc.pdf");
        write_pdf(&pdf, vec![stream]);

        let written = extract_images(&pdf, dir.path()).unwrap();
        assert_eq!(names(&written), ["image0001_001.jpg"]);
        assert_eq!(std::fs::read(&written[0]).unwrap(), jpeg);
    }

    #[test]
    fn test_truncated_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        write_pdf(
            &pdf,
            vec![
                image_stream("DeviceRGB", 10, 10, vec![0; 12]),
                image_stream("DeviceGray", 2, 2, vec![255; 4]),
            ],
        );

        let written = extract_images(&pdf, dir.path()).unwrap();
        assert_eq!(names(&written), ["image0002_001.png"]);
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"definitely not a pdf").unwrap();
        assert!(matches!(
            extract_images(&bogus, dir.path()),
            Err(AppError::Pdf(_))
        ));
    }

    #[test]
    fn test_cmyk_conversion() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), [0, 255, 255]);
    }
}
