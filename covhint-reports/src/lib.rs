//! Input ingestion.
//!
//! covhint consumes a diff report and a coverage report produced by other tools. Envelopes are read
//! tolerantly (extra fields are ignored, a missing report is an empty one) but every span is
//! validated before it is handed to the engine.

mod load;

pub use load::{
    COVERAGE_SENSOR, DIFF_SENSOR, LoadedInputs, ReportLoadError, load_inputs,
    parse_coverage_report, parse_diff_report,
};
