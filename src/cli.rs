use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scan2deck")]
#[command(about = "Turn scanned PDFs into slide decks of recognized text")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// OCR engine to use (defaults to the first compiled-in engine)
    #[arg(long, env = "SCAN2DECK_ENGINE", global = true)]
    pub engine: Option<String>,

    /// OCR language (e.g., "eng", "deu", "fra")
    #[arg(long, env = "SCAN2DECK_LANGUAGE", default_value = "eng", global = true)]
    pub language: String,

    /// Path to tessdata directory (downloaded to the cache if not set)
    #[arg(long, env = "TESSDATA_PREFIX", global = true)]
    pub tessdata_path: Option<String>,

    /// JSON file overriding preprocessing parameters
    #[arg(long, env = "SCAN2DECK_PIPELINE_CONFIG", global = true)]
    pub pipeline_config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP upload service
    Serve {
        /// Host address to bind to
        #[arg(long, env = "SCAN2DECK_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "SCAN2DECK_PORT", default_value = "5000")]
        port: u16,

        /// Maximum upload size in bytes (default: 50MB)
        #[arg(long, env = "SCAN2DECK_MAX_FILE_SIZE", default_value = "52428800")]
        max_file_size: usize,
    },

    /// Convert a PDF into a slide deck
    Convert {
        /// Scanned PDF to read
        pdf: PathBuf,

        /// Where to write the .pptx
        #[arg(short, long, default_value = "TextPPT.pptx")]
        output: PathBuf,

        /// Also write one .txt file per page into this directory
        #[arg(long)]
        text_dir: Option<PathBuf>,
    },

    /// Preprocess and OCR every image in a directory
    Batch {
        /// Directory of png/jpg/jpeg/tiff/bmp/gif files
        dir: PathBuf,

        /// Write one .txt file per image into this directory
        #[arg(long)]
        text_dir: Option<PathBuf>,
    },
}
