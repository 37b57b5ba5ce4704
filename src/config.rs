//! Command-line configuration.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use crate::data::filter::{DEFAULT_MAX_COUNT, Filters, MAX_COUNT_RANGE};
use crate::data::model::ClimateTable;

/// Default dataset file, looked up in the working directory.
pub const DEFAULT_DATA_FILE: &str = "global_temp_income_co2_1960_2013.csv";

/// Climate Explorer - temperature and CO₂ by country and income group
///
/// Examples:
///   climate-explorer
///   climate-explorer data/climate.parquet --max-count 12
///   climate-explorer --report > view.json
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dataset to open (.csv, .json or .parquet)
    #[arg(value_name = "FILE", default_value = DEFAULT_DATA_FILE, env = "CLIMATE_DATA")]
    pub data: PathBuf,

    /// Maximum number of countries plotted individually
    #[arg(long, default_value_t = DEFAULT_MAX_COUNT, value_name = "COUNT")]
    pub max_count: usize,

    /// Never switch to income-group averages
    #[arg(long)]
    pub no_auto_aggregate: bool,

    /// Plot CO₂ on a linear axis instead of log1p
    #[arg(long)]
    pub linear_co2: bool,

    /// Print the default view as JSON and exit without opening a window
    #[arg(long)]
    pub report: bool,
}

impl Cli {
    /// Check option ranges that clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if !MAX_COUNT_RANGE.contains(&self.max_count) {
            bail!(
                "--max-count must be between {} and {}",
                MAX_COUNT_RANGE.start(),
                MAX_COUNT_RANGE.end()
            );
        }
        Ok(())
    }

    /// Initial filters for `table`, with the command-line overrides applied.
    pub fn initial_filters(&self, table: &ClimateTable) -> Filters {
        let mut filters = Filters::for_table(table);
        filters.max_count = self.max_count;
        filters.auto_aggregate = !self.no_auto_aggregate;
        filters.display.use_log = !self.linear_co2;
        filters
    }
}
