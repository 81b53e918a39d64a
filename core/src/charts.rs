//! The fixed set of comparison charts drawn from the benchmark results.
//!
//! Every chart plots one experiment family against Matrix Size. A chart is
//! made of layers; each layer selects one variant (`Op`, optionally `P`),
//! aggregates it and either draws it whole or splits it into one line per
//! block size.

use anyhow::{anyhow, Context, Result};
use tracing::warn;

use crate::context::ResultsContext;
use crate::experiment::ExperimentFamily;
use crate::metrics::PerformancePolicy;
use crate::table::{AggregatedRow, Column, GroupBy, Selection};
use crate::visualization::{Chart, Series, SeriesColor};

pub const PALETTE: [SeriesColor; 10] = [
    SeriesColor::Red,
    SeriesColor::Green,
    SeriesColor::Blue,
    SeriesColor::Cyan,
    SeriesColor::Magenta,
    SeriesColor::Yellow,
    SeriesColor::LightSalmon,
    SeriesColor::LightGreen,
    SeriesColor::Purple,
    SeriesColor::Purple,
];

const CPU_BLOCKS: &[u64] = &[128, 256, 512];
const DEVICE_BLOCKS: &[u64] = &[8, 16, 32];

const TIME_LABEL: &str = "Time (s)";
const PERF_LABEL: &str = "Performance (Gflop/s)";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Split {
    /// One line per listed block size.
    PerBlockSize(&'static [u64]),
    Whole,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
    pub selection: Selection,
    pub split: Split,
    pub label: &'static str,
    pub palette_offset: usize,
}

impl Layer {
    pub fn per_block(
        selection: Selection,
        blocks: &'static [u64],
        label: &'static str,
        palette_offset: usize,
    ) -> Self {
        Self {
            selection,
            split: Split::PerBlockSize(blocks),
            label,
            palette_offset,
        }
    }

    pub fn whole(selection: Selection, label: &'static str, palette_offset: usize) -> Self {
        Self {
            selection,
            split: Split::Whole,
            label,
            palette_offset,
        }
    }

    pub fn group_by(&self) -> GroupBy {
        match self.split {
            Split::PerBlockSize(_) => GroupBy::MatrixAndBlockSize,
            Split::Whole => GroupBy::MatrixSize,
        }
    }

    fn series_label(&self, block_size: u64) -> String {
        if self.label.is_empty() {
            block_size.to_string()
        } else {
            format!("{} ({})", self.label, block_size)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub name: &'static str,
    pub family: ExperimentFamily,
    pub x: Column,
    pub y: Column,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub legend_title: Option<&'static str>,
    pub layers: Vec<Layer>,
}

impl ChartSpec {
    fn new(
        name: &'static str,
        family: ExperimentFamily,
        y: Column,
        y_label: &'static str,
        legend_title: &'static str,
        layers: Vec<Layer>,
    ) -> Self {
        Self {
            name,
            family,
            x: Column::MatrixSize,
            y,
            x_label: "Matrix Size",
            y_label,
            legend_title: Some(legend_title),
            layers,
        }
    }

    /// Resolve the chart's series against the loaded tables.
    pub fn build(&self, context: &ResultsContext, policy: PerformancePolicy) -> Result<Chart> {
        let table = context.table(self.family)?;
        let mut series = Vec::new();

        for layer in &self.layers {
            let rows = table.aggregate(layer.selection, layer.group_by(), policy);
            if rows.is_empty() {
                warn!(
                    chart = self.name,
                    family = %self.family,
                    op = layer.selection.op,
                    threads = ?layer.selection.threads,
                    "layer selects no rows"
                );
            }

            match layer.split {
                Split::PerBlockSize(blocks) => {
                    for (i, &block_size) in blocks.iter().enumerate() {
                        let selected: Vec<&AggregatedRow> = rows
                            .iter()
                            .filter(|row| row.block_size == Some(block_size as f64))
                            .collect();
                        series.push(self.series(
                            layer.series_label(block_size),
                            palette(layer.palette_offset + i),
                            &selected,
                        )?);
                    }
                }
                Split::Whole => {
                    let selected: Vec<&AggregatedRow> = rows.iter().collect();
                    series.push(self.series(
                        layer.label.to_string(),
                        palette(layer.palette_offset),
                        &selected,
                    )?);
                }
            }
        }

        Ok(Chart {
            file_stem: self.name.to_string(),
            x_label: self.x_label.to_string(),
            y_label: self.y_label.to_string(),
            legend_title: self.legend_title.map(str::to_string),
            series,
        })
    }

    fn series(&self, label: String, color: SeriesColor, rows: &[&AggregatedRow]) -> Result<Series> {
        let points = rows
            .iter()
            .map(|row| {
                let x = column_value(row, self.x)?;
                let y = column_value(row, self.y)?;
                Ok((x, y))
            })
            .collect::<Result<_>>()
            .with_context(|| format!("failed to build chart {} from {}", self.name, self.family))?;

        Ok(Series {
            label,
            color,
            points,
            samples: rows.iter().map(|row| row.samples).collect(),
        })
    }
}

fn column_value(row: &AggregatedRow, column: Column) -> Result<f64> {
    row.value(column)
        .ok_or_else(|| anyhow!("column {:?} has no values", column.header()))
}

fn palette(index: usize) -> SeriesColor {
    PALETTE[index.min(PALETTE.len() - 1)]
}

/// A time chart and a performance chart sharing the same layers.
fn time_and_perf(
    (time_name, perf_name): (&'static str, &'static str),
    perf_label: &'static str,
    family: ExperimentFamily,
    legend_title: &'static str,
    layers: Vec<Layer>,
) -> [ChartSpec; 2] {
    [
        ChartSpec::new(
            time_name,
            family,
            Column::Time,
            TIME_LABEL,
            legend_title,
            layers.clone(),
        ),
        ChartSpec::new(
            perf_name,
            family,
            Column::Performance,
            perf_label,
            legend_title,
            layers,
        ),
    ]
}

fn sycl_matmul_layers() -> Vec<Layer> {
    vec![
        Layer::per_block(Selection::op(1), DEVICE_BLOCKS, "Naive", 0),
        Layer::per_block(Selection::op(2), DEVICE_BLOCKS, "W/o Local Mem", 3),
        Layer::per_block(Selection::op(3), DEVICE_BLOCKS, "W/ Local Mem", 6),
    ]
}

fn sycl_lu_layers() -> Vec<Layer> {
    vec![Layer::per_block(Selection::op(1), DEVICE_BLOCKS, "Blocked", 0)]
}

/// Every chart, in drawing order.
pub fn catalog() -> Vec<ChartSpec> {
    let mut charts = Vec::new();

    charts.extend(time_and_perf(
        ("mm_1_time", "mm_1_perf"),
        "Gflop/s",
        ExperimentFamily::MmOmp,
        "Block Size",
        vec![Layer::per_block(Selection::op_with_threads(1, 1), CPU_BLOCKS, "", 0)],
    ));
    charts.extend(time_and_perf(
        ("lu_1_2_time", "lu_1_2_perf"),
        PERF_LABEL,
        ExperimentFamily::LuSeq,
        "Operation",
        vec![
            Layer::per_block(Selection::op_with_threads(2, 1), CPU_BLOCKS, "Blocked", 0),
            Layer::whole(Selection::op_with_threads(1, 1), "Naive", PALETTE.len() - 1),
        ],
    ));
    charts.extend(time_and_perf(
        ("mm_cuda_block_time", "mm_cuda_block_perf"),
        PERF_LABEL,
        ExperimentFamily::MmCuda,
        "Operation",
        vec![
            Layer::per_block(Selection::op(2), DEVICE_BLOCKS, "W/ Local Mem", 0),
            Layer::per_block(Selection::op(3), DEVICE_BLOCKS, "W/o Local Mem", 3),
        ],
    ));
    charts.extend(time_and_perf(
        ("mm_sycl_cpu_time", "mm_sycl_cpu_perf"),
        PERF_LABEL,
        ExperimentFamily::MmSyclCpu,
        "Operation",
        sycl_matmul_layers(),
    ));
    charts.extend(time_and_perf(
        ("mm_sycl_gpu_time", "mm_sycl_gpu_perf"),
        PERF_LABEL,
        ExperimentFamily::MmSyclGpu,
        "Operation",
        sycl_matmul_layers(),
    ));
    charts.extend(time_and_perf(
        ("lu_sycl_cpu_time", "lu_sycl_cpu_perf"),
        PERF_LABEL,
        ExperimentFamily::LuSyclCpu,
        "Operation",
        sycl_lu_layers(),
    ));
    charts.extend(time_and_perf(
        ("lu_sycl_gpu_time", "lu_sycl_gpu_perf"),
        PERF_LABEL,
        ExperimentFamily::LuSyclGpu,
        "Operation",
        sycl_lu_layers(),
    ));

    charts
}
