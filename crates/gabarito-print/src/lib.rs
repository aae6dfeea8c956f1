//! gabarito-print — Print-ready rendering.
//!
//! Produces a self-contained HTML file: the exam sheet followed by the
//! detachable answer-mark grid, with an optional answer-key mode.

pub mod sheet;

pub use sheet::{render_exam, write_exam_html};
