//! How a single measurement is rendered into a report cell.

use crate::driver::ExecutionResult;
use clap::ValueEnum;

/// Statistic projection used for report cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResultsPrinter {
    /// Warm-up, mean, median and standard deviation
    #[default]
    All,
    /// Median only, as a bare number
    Median,
}

impl ResultsPrinter {
    pub fn print(self, result: &ExecutionResult) -> String {
        match self {
            Self::All => result.brief(),
            Self::Median => format!("{:.2}", result.median()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Median => "median",
        }
    }
}

impl std::fmt::Display for ResultsPrinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
