//! Extractors: one per output table.
//!
//! An extractor turns the full source dataset into one normalized table:
//! it runs its [`ExtractionPlan`] and then checks the result against the
//! source. Extractors never see each other's output.
//!
//! ```text
//!                  ┌──────────────┐
//!             ┌───▶│    client    │──▶ client.csv
//! ┌────────┐  │    └──────────────┘
//! │ source │──┼───▶│   campaign   │──▶ campaign.csv
//! └────────┘  │    └──────────────┘
//!             └───▶│  economics   │──▶ economics.csv
//!                  └──────────────┘
//! ```

pub mod campaign;
pub mod client;
pub mod economics;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractResult, ValidationResult};
use crate::logs::{log_info_indent, log_success_indent};
use crate::models::Dataset;
use crate::transform::plan::{execute, ExtractionPlan};

pub use campaign::CampaignExtractor;
pub use client::ClientExtractor;
pub use economics::EconomicsExtractor;

/// Output tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Client,
    Campaign,
    Economics,
}

impl Table {
    /// All tables, in run order.
    pub const ALL: [Table; 3] = [Table::Client, Table::Campaign, Table::Economics];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Client => "client",
            Table::Campaign => "campaign",
            Table::Economics => "economics",
        }
    }

    /// Extractor with its default settings.
    pub fn extractor(&self) -> Box<dyn Extractor> {
        match self {
            Table::Client => Box::new(ClientExtractor),
            Table::Campaign => Box::new(CampaignExtractor::default()),
            Table::Economics => Box::new(EconomicsExtractor),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds and checks one output table
pub trait Extractor {
    /// Table this extractor produces.
    fn table(&self) -> Table;

    /// Projection and operations.
    fn plan(&self) -> ExtractionPlan;

    /// Post-conditions of the finished table against the source.
    fn check(&self, result: &Dataset, source: &Dataset) -> ValidationResult<()>;

    /// Run the plan on `source` and validate the result.
    fn extract(&self, source: &Dataset) -> ExtractResult<Dataset> {
        let name = self.table().name();

        log_info_indent(format!("Loading and processing {} data...", name), 1);
        let output = execute(source, &self.plan())?;
        log_success_indent(
            format!(
                "{} data: {} rows, {} columns",
                name,
                output.dataset.row_count(),
                output.dataset.column_count()
            ),
            1,
        );

        log_info_indent(format!("Checking processed {} data...", name), 1);
        self.check(&output.dataset, source)?;
        log_success_indent(format!("{} data passed all checks", name), 1);

        Ok(output.dataset)
    }
}
