//! Catalog of supported file formats.

pub mod formats;

pub use formats::{FileCategory, FormatInfo, by_category, detect, get};
