use std::fmt;

use anyhow::{anyhow, Result};

use crate::metrics::AlgorithmClass;

/// One benchmark campaign; each maps to a folder under the results root.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ExperimentFamily {
    LuData,
    LuFunc,
    LuSeq,
    LuSyclCpu,
    LuSyclGpu,
    MmCuda,
    MmOmp,
    MmSyclCpu,
    MmSyclGpu,
}

impl ExperimentFamily {
    pub const ALL: [ExperimentFamily; 9] = [
        Self::LuData,
        Self::LuFunc,
        Self::LuSeq,
        Self::LuSyclCpu,
        Self::LuSyclGpu,
        Self::MmCuda,
        Self::MmOmp,
        Self::MmSyclCpu,
        Self::MmSyclGpu,
    ];

    pub fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.folder() == value)
            .ok_or_else(|| anyhow!("unknown experiment family: {}", value))
    }

    /// Folder name under the results root.
    pub fn folder(&self) -> &'static str {
        match self {
            Self::LuData => "lu_data",
            Self::LuFunc => "lu_func",
            Self::LuSeq => "lu_seq",
            Self::LuSyclCpu => "lu_sycl_cpu",
            Self::LuSyclGpu => "lu_sycl_gpu",
            Self::MmCuda => "mm_cuda",
            Self::MmOmp => "mm_omp",
            Self::MmSyclCpu => "mm_sycl_cpu",
            Self::MmSyclGpu => "mm_sycl_gpu",
        }
    }

    pub fn algorithm(&self) -> AlgorithmClass {
        match self {
            Self::LuData | Self::LuFunc | Self::LuSeq | Self::LuSyclCpu | Self::LuSyclGpu => {
                AlgorithmClass::LuDecomposition
            }
            Self::MmCuda | Self::MmOmp | Self::MmSyclCpu | Self::MmSyclGpu => {
                AlgorithmClass::MatrixMultiply
            }
        }
    }
}

impl fmt::Display for ExperimentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}
