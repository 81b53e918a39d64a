use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::experiment::ExperimentFamily;
use crate::metrics::{AlgorithmClass, PerformancePolicy};

pub const PERFORMANCE_COLUMN: &str = "Performance";

/// One benchmark trial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub matrix_size: u64,
    pub block_size: Option<u64>,
    pub op: u32,
    /// Thread/process count (`P`).
    pub threads: Option<u32>,
    pub time: f64,
    pub performance: Option<f64>,
}

/// All trials of one experiment family, sharing a single column set.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultTable {
    family: ExperimentFamily,
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(family: ExperimentFamily, columns: Vec<String>, rows: Vec<ResultRow>) -> Self {
        Self {
            family,
            columns,
            rows,
        }
    }

    pub fn family(&self) -> ExperimentFamily {
        self.family
    }

    pub fn algorithm(&self) -> AlgorithmClass {
        self.family.algorithm()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_performance(&self) -> bool {
        self.columns.iter().any(|c| c == PERFORMANCE_COLUMN)
    }

    /// Append the Performance column using the family's FLOP model.
    pub fn derive_performance(&mut self) {
        let algorithm = self.algorithm();
        for row in &mut self.rows {
            row.performance = Some(algorithm.throughput(row.matrix_size, row.time));
        }
        if !self.has_performance() {
            self.columns.push(PERFORMANCE_COLUMN.to_string());
        }
    }

    /// Average every numeric column per group of selected rows. Groups come
    /// back in ascending key order.
    pub fn aggregate(
        &self,
        selection: Selection,
        group_by: GroupBy,
        policy: PerformancePolicy,
    ) -> Vec<AggregatedRow> {
        let mut groups: BTreeMap<(u64, Option<u64>), Accumulator> = BTreeMap::new();

        for row in self.rows.iter().filter(|row| selection.matches(row)) {
            let key = match group_by {
                GroupBy::MatrixSize => (row.matrix_size, None),
                GroupBy::MatrixAndBlockSize => (row.matrix_size, row.block_size),
            };
            groups.entry(key).or_default().push(row);
        }

        let algorithm = self.algorithm();
        let aggregated: Vec<AggregatedRow> = groups
            .into_iter()
            .map(|((matrix_size, _), acc)| acc.finish(matrix_size, algorithm, policy))
            .collect();

        debug!(
            family = %self.family,
            op = selection.op,
            threads = ?selection.threads,
            groups = aggregated.len(),
            "aggregated rows"
        );

        aggregated
    }
}

/// Row filter on the variant code and, optionally, the thread count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Selection {
    pub op: u32,
    pub threads: Option<u32>,
}

impl Selection {
    pub fn op(op: u32) -> Self {
        Self { op, threads: None }
    }

    pub fn op_with_threads(op: u32, threads: u32) -> Self {
        Self {
            op,
            threads: Some(threads),
        }
    }

    pub fn matches(&self, row: &ResultRow) -> bool {
        row.op == self.op && self.threads.map_or(true, |p| row.threads == Some(p))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupBy {
    MatrixSize,
    MatrixAndBlockSize,
}

/// Plottable columns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Column {
    MatrixSize,
    Time,
    Performance,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Self::MatrixSize => "Matrix Size",
            Self::Time => "Time",
            Self::Performance => PERFORMANCE_COLUMN,
        }
    }
}

/// Column means for one group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub matrix_size: u64,
    pub block_size: Option<f64>,
    pub op: f64,
    pub threads: Option<f64>,
    pub time: f64,
    pub performance: Option<f64>,
    pub samples: usize,
}

impl AggregatedRow {
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::MatrixSize => Some(self.matrix_size as f64),
            Column::Time => Some(self.time),
            Column::Performance => self.performance,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    op: f64,
    time: f64,
    block_size: OptionalMean,
    threads: OptionalMean,
    performance: OptionalMean,
}

impl Accumulator {
    fn push(&mut self, row: &ResultRow) {
        self.count += 1;
        self.op += f64::from(row.op);
        self.time += row.time;
        self.block_size.push(row.block_size.map(|b| b as f64));
        self.threads.push(row.threads.map(f64::from));
        self.performance.push(row.performance);
    }

    fn finish(
        self,
        matrix_size: u64,
        algorithm: AlgorithmClass,
        policy: PerformancePolicy,
    ) -> AggregatedRow {
        let n = self.count as f64;
        let time = self.time / n;
        let performance = match policy {
            PerformancePolicy::Averaged => self.performance.mean(),
            PerformancePolicy::Recomputed => self
                .performance
                .mean()
                .map(|_| algorithm.throughput(matrix_size, time)),
        };

        AggregatedRow {
            matrix_size,
            block_size: self.block_size.mean(),
            op: self.op / n,
            threads: self.threads.mean(),
            time,
            performance,
            samples: self.count,
        }
    }
}

/// Mean over the rows that carry a value.
#[derive(Default)]
struct OptionalMean {
    sum: f64,
    count: usize,
}

impl OptionalMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
