pub mod console;
pub mod report_model;

pub use console::format_console_report;
pub use report_model::SuiteReport;
