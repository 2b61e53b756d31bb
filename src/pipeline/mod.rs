//! Pipeline stages for classifying and renaming documents.
//!
//! Each submodule implements exactly one step and returns
//! `Result<_, FileError>`, so the batch driver can record a failure and move
//! on to the next file.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ convert ──▶ extract ──▶ classify ──▶ rename
//! (walk)   (office)    (lopdf)     (model)      (move)
//! ```
//!
//! 1. [`scan`]     — list the documents under the input folder, once
//! 2. [`convert`]  — office formats to PDF via LibreOffice; PDFs pass through
//! 3. [`extract`]  — concatenate the text of every page
//! 4. [`classify`] — one model call with a deadline, no retry
//! 5. [`rename`]   — sanitise the answer and move the PDF to the output folder

pub mod classify;
pub mod convert;
pub mod extract;
pub mod rename;
pub mod scan;
