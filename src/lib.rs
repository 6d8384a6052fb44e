//! Quality Report - software process quality dashboard
//!
//! Evaluates quality metrics fetched from project tracking tools against
//! their norms and renders the result as an HTML or JSON report.

pub mod engine;
