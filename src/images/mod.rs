//! Local image materialization
//!
//! Downloads images referenced by extracted content into a directory with
//! stable, URL-hash based filenames and records where each one landed.

mod downloader;

pub use downloader::{image_filename, DownloadStats, ImageDownloader};
