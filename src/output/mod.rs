use crate::error::Error;

mod csv;
mod ods;
mod ods_helper;

pub use crate::output::csv::CsvOutput;
pub use crate::output::ods::OdsOutput;

pub const IRR_HEADER: &str = "IRR (%)";
pub const DEAL_HEADER: &str = "Deal Code";
pub const REASON_HEADER: &str = "Reason";
pub const SKIPPED_DEALS_HEADER: &str = "Skipped Deals";

pub trait Output {
    fn write(&mut self) -> Result<(), Error>;
}
