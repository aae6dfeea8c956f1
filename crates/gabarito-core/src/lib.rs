//! gabarito-core — Exam data model, oracle contract, and scoring.
//!
//! This crate defines the fundamental types, the answer-sheet recognition
//! contract, and the deterministic grading logic that the rest of the
//! gabarito system builds on.

pub mod error;
pub mod extraction;
pub mod grading;
pub mod model;
pub mod parser;
pub mod traits;
