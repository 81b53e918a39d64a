pub mod charts;
pub mod config;
pub mod context;
pub mod experiment;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod table;
pub mod visualization;

pub use charts::{catalog, ChartSpec, Layer, Split, PALETTE};
pub use config::{load_or_init, PlotterConfig};
pub use context::ResultsContext;
pub use experiment::ExperimentFamily;
pub use loader::load_experiment;
pub use metrics::{gflop_lu, gflop_matmul, AlgorithmClass, PerformancePolicy};
pub use pipeline::{build_charts, render_charts, select_charts, write_report};
pub use report::{ensure_report_file, report_template, update_sections, ReportSection};
pub use table::{AggregatedRow, Column, GroupBy, ResultRow, ResultTable, Selection};
pub use visualization::{
    rgb_buffer_len, write_png, Chart, Renderer, Series, SeriesColor, MAX_DIMENSION,
};
