//! Presentation layer for `pulse`.
//!
//! - [`dashboard`]: the self-refreshing HTML page served at `/`
//! - [`pdf`]: the downloadable one-page report
//! - [`format`]: human-readable number helpers shared by both

pub mod dashboard;
pub mod format;
pub mod pdf;

pub use dashboard::render_dashboard;
pub use pdf::{render_report_pdf, PdfDocument, TextLine};
