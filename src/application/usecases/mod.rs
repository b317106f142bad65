mod handle_report;

pub use handle_report::*;
