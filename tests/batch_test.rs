mod common;

use common::{fast_pipeline, page_pixels, three_page_pdf, write_scanned_pdf, RecordingEngine};
use scan2deck::batch::{BatchDriver, ErrorKind};
use scan2deck::convert::{build_deck, convert_pdf, ConvertOptions};
use std::io::Read;

#[test]
fn test_three_page_pdf_becomes_three_slides() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scan.pdf");
    three_page_pdf(&pdf);

    let pipeline = fast_pipeline();
    let engine = RecordingEngine::default();
    let (deck, report) =
        build_deck(&pdf, &pipeline, &engine, &ConvertOptions::default()).unwrap();

    assert_eq!(report.images_extracted, 3);
    assert_eq!(report.slides, 3);
    assert_eq!(deck.len(), 3);
    assert_eq!(report.batch.failed_count(), 0);

    let names: Vec<&str> = report.batch.processed().map(|(name, _)| name).collect();
    assert_eq!(names, ["image0001_001.png", "image0002_001.png", "image0003_001.png"]);

    let seen = engine.seen();
    assert_eq!(seen.len(), 3);
    for (width, height) in seen {
        assert_eq!(height, 900);
        assert!(width >= 1);
    }
}

#[test]
fn test_convert_writes_deck_and_text_files() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scan.pdf");
    three_page_pdf(&pdf);
    let deck_path = dir.path().join("TextPPT.pptx");
    let text_dir = dir.path().join("text");

    let pipeline = fast_pipeline();
    let engine = RecordingEngine::default();
    let options = ConvertOptions {
        text_dir: Some(text_dir.clone()),
    };
    let report = convert_pdf(&pdf, &deck_path, &pipeline, &engine, &options).unwrap();
    assert_eq!(report.slides, 3);

    let text = std::fs::read_to_string(text_dir.join("image0002_001.txt")).unwrap();
    assert_eq!(text, "page 2");

    let file = std::fs::File::open(&deck_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut slide = String::new();
    archive
        .by_name("ppt/slides/slide3.xml")
        .unwrap()
        .read_to_string(&mut slide)
        .unwrap();
    assert!(slide.contains("<a:t>page 3</a:t>"));
}

#[test]
fn test_slides_follow_page_order_past_nine_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("long.pdf");
    // Widths grow with the page number so the OCR call order is visible
    let pages: Vec<_> = (0..12).map(|i| page_pixels(40 + 2 * i, 50)).collect();
    write_scanned_pdf(&pdf, &pages);
    let deck_path = dir.path().join("TextPPT.pptx");

    let pipeline = fast_pipeline();
    let engine = RecordingEngine::default();
    let report =
        convert_pdf(&pdf, &deck_path, &pipeline, &engine, &ConvertOptions::default()).unwrap();
    assert_eq!(report.slides, 12);

    let names: Vec<&str> = report.batch.processed().map(|(name, _)| name).collect();
    let expected: Vec<String> = (1..=12).map(|n| format!("image{:04}_001.png", n)).collect();
    assert_eq!(names, expected);

    let widths: Vec<u32> = engine.seen().iter().map(|&(w, _)| w).collect();
    assert!(widths.windows(2).all(|w| w[0] < w[1]), "widths {:?}", widths);

    let file = std::fs::File::open(&deck_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    for n in [2, 10, 12] {
        let mut slide = String::new();
        archive
            .by_name(&format!("ppt/slides/slide{}.xml", n))
            .unwrap()
            .read_to_string(&mut slide)
            .unwrap();
        assert!(slide.contains(&format!("<a:t>page {}</a:t>", n)), "slide {}", n);
    }
}

#[test]
fn test_truncated_file_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    page_pixels(80, 100).save(dir.path().join("a.png")).unwrap();
    page_pixels(60, 90).save(dir.path().join("b.jpg")).unwrap();

    let mut png = Vec::new();
    page_pixels(80, 100)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.path().join("c.png"), &png[..png.len() / 3]).unwrap();

    let pipeline = fast_pipeline();
    let engine = RecordingEngine::default();
    let report = BatchDriver::new(&pipeline, &engine).run(dir.path()).unwrap();

    assert_eq!(report.processed_count(), 2);
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "c.png");
    assert_eq!(failed[0].1.kind, ErrorKind::Decode);
    assert_eq!(engine.seen().len(), 2);
}

#[test]
fn test_empty_directory_is_distinguishable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let pipeline = fast_pipeline();
    let engine = RecordingEngine::default();
    let report = BatchDriver::new(&pipeline, &engine).run(dir.path()).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.failed_count(), 0);
}
