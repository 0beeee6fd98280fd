//! Flat-file interchange for ledger entries.

pub mod csv;

pub use self::csv::{
    export, parse_import, ExportAmount, ExportOptions, ImportReport, ImportedRow, SkippedRow,
    CSV_HEADER,
};
