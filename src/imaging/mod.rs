//! Layout and compositing in pure Rust, with no system graphics stack.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Layout** | pure arithmetic in [`calculations`] |
//! | **Decode** | `image::load_from_memory` |
//! | **Blit** | `imageops::overlay` (+ `Lanczos3` resize for the logo) |
//! | **Text** | `rusttype` |
//! | **Encode** | `image` JPEG / PNG encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions from fractions to pixel geometry (unit testable)
//! - **Parameters**: Export format, quality and font descriptions
//! - **Backend**: [`Surface`] trait + [`RasterSurface`]
//! - **Operations**: The [`Compositor`] render pass and export

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Bitmap, RenderError, Surface, TextMetrics};
pub use calculations::resolve;
pub use operations::{Compositor, RenderStage, Scene};
pub use params::{ExportFormat, ExportOptions, FontSpec, MONOSPACE_FAMILY, Quality, TextStyle};
pub use rust_backend::RasterSurface;
