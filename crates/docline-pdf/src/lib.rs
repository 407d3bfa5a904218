//! Docline PDF - PDF text extraction for the docline pipeline
//!
//! Plugs into [`docline_core::run`] as a [`docline_core::Transform`]. Each
//! PDF becomes one record:
//!
//! ```json
//! {"text": "...", "modalities": [], "metadata": {"file_path": "/abs/a.pdf", "page_count": 3}}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docline_core::{PipelineConfig, ProgressContext, run};
//! use docline_pdf::PdfProcessor;
//!
//! let config = PipelineConfig {
//!     input_dir: "papers".into(),
//!     output_dir: "out".into(),
//!     ..Default::default()
//! };
//! let summary = run(&config, &PdfProcessor::new(), &ProgressContext::new())?;
//! println!("Wrote {} records", summary.records_written);
//! ```

pub mod processor;
pub mod text;

// Re-exports
pub use processor::PdfProcessor;
pub use text::normalize_text;
