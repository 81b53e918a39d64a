use std::{collections::BTreeMap, path::Path};

use anyhow::{anyhow, Context, Result};

use crate::experiment::ExperimentFamily;
use crate::loader::load_experiment;
use crate::table::ResultTable;

/// Every experiment table, loaded once and shared read-only by the charts.
#[derive(Clone, Debug, Default)]
pub struct ResultsContext {
    tables: BTreeMap<ExperimentFamily, ResultTable>,
}

impl ResultsContext {
    /// Load all families under `results_dir` and derive their throughput.
    pub fn load(results_dir: &Path) -> Result<Self> {
        let mut context = Self::default();
        for family in ExperimentFamily::ALL {
            let mut table = load_experiment(results_dir, family)
                .with_context(|| format!("failed to load experiment {}", family))?;
            table.derive_performance();
            context.insert(table);
        }
        Ok(context)
    }

    pub fn insert(&mut self, table: ResultTable) {
        self.tables.insert(table.family(), table);
    }

    pub fn table(&self, family: ExperimentFamily) -> Result<&ResultTable> {
        self.tables
            .get(&family)
            .ok_or_else(|| anyhow!("experiment {} has not been loaded", family))
    }

    pub fn tables(&self) -> impl Iterator<Item = &ResultTable> {
        self.tables.values()
    }
}
