use serde::{Deserialize, Serialize};

/// Which theoretical operation count applies to an experiment family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmClass {
    MatrixMultiply,
    LuDecomposition,
}

impl AlgorithmClass {
    /// Theoretical work for a square problem of side `matrix_size`, in Gflop.
    pub fn gflop(&self, matrix_size: u64) -> f64 {
        match self {
            Self::MatrixMultiply => gflop_matmul(matrix_size),
            Self::LuDecomposition => gflop_lu(matrix_size),
        }
    }

    /// Throughput in Gflop/s. `seconds` is expected to be positive; other
    /// values produce inf/NaN and are passed through.
    pub fn throughput(&self, matrix_size: u64, seconds: f64) -> f64 {
        self.gflop(matrix_size) / seconds
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MatrixMultiply => "matrix multiply",
            Self::LuDecomposition => "LU decomposition",
        }
    }
}

pub fn gflop_matmul(matrix_size: u64) -> f64 {
    2.0 * cube(matrix_size) * 1e-9
}

pub fn gflop_lu(matrix_size: u64) -> f64 {
    2.0 / 3.0 * cube(matrix_size) * 1e-9
}

fn cube(n: u64) -> f64 {
    let n = n as f64;
    n * n * n
}

/// How aggregated rows obtain their Performance value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformancePolicy {
    /// Mean of the per-row Performance values.
    #[default]
    Averaged,
    /// Throughput recomputed from the group's mean Time.
    Recomputed,
}
