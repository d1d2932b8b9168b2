//! scan2deck: normalize scanned page images and turn their text into slides.
//!
//! The core is [`preprocessing::Pipeline`], a fixed chain of image filters
//! that prepares a page for OCR. [`batch::BatchDriver`] runs it over a
//! directory, [`convert::convert_pdf`] adds PDF extraction and slide
//! assembly, and [`server`] exposes the conversion over HTTP.

pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod deck;
pub mod engine;
pub mod engines;
pub mod error;
pub mod pdf;
pub mod preprocessing;
pub mod raster;
pub mod server;
