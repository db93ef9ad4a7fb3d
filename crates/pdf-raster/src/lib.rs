//! Background rasterization of PDF slide decks.
//!
//! A [`Rasterizer`] owns one worker thread that renders every page of a
//! document at the size of the window it feeds. Resizes restart the render,
//! and only complete [`ImageSet`]s are ever handed back to the caller.

mod constants;
mod decoder;
mod image_set;
mod metadata;
#[cfg(feature = "pdfium")]
mod pdfium;
mod rasterizer;
mod types;
mod worker;

pub use constants::*;
pub use decoder::PageDecoder;
pub use image_set::ImageSet;
pub use metadata::{LopdfProbe, MetadataProbe};
#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumDecoder, init_pdfium};
pub use rasterizer::Rasterizer;
pub use types::*;
pub use worker::{ImageSetSink, RasterWorker};

pub use image::RgbaImage;
