#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use scan2deck::engine::OcrEngine;
use scan2deck::error::AppError;
use scan2deck::preprocessing::{Pipeline, PipelineConfig};
use scan2deck::raster::RasterImage;
use std::path::Path;
use std::sync::Mutex;

/// Records the size of every page it is handed and answers "page N"
#[derive(Default)]
pub struct RecordingEngine {
    pub seen: Mutex<Vec<(u32, u32)>>,
}

impl RecordingEngine {
    pub fn seen(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

impl OcrEngine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn description(&self) -> &'static str {
        "records page sizes"
    }

    fn recognize(&self, image: &RasterImage) -> Result<String, AppError> {
        let mut seen = self.seen.lock().unwrap();
        seen.push(image.dimensions());
        Ok(format!("page {}", seen.len()))
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["eng".to_string()]
    }
}

/// Default chain with a small denoise window so debug builds stay quick
pub fn fast_pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig {
        denoise_template_window: 3,
        denoise_search_window: 5,
        ..PipelineConfig::default()
    })
    .unwrap()
}

/// A white page with a dark text-like bar
pub fn page_pixels(width: u32, height: u32) -> image::GrayImage {
    image::GrayImage::from_fn(width, height, |x, y| {
        let in_bar = x > width / 5 && x < width * 4 / 5 && y > height / 3 && y < height / 3 + 8;
        image::Luma([if in_bar { 20 } else { 235 }])
    })
}

/// One page per image, each embedding it as a raw DeviceGray XObject
pub fn write_scanned_pdf(path: &Path, pages: &[image::GrayImage]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for page in pages {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => page.width() as i64,
                "Height" => page.height() as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            page.as_raw().clone(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
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

pub fn three_page_pdf(path: &Path) {
    write_scanned_pdf(
        path,
        &[page_pixels(100, 140), page_pixels(120, 160), page_pixels(90, 120)],
    );
}
