use super::{DEAL_HEADER, IRR_HEADER, Output, REASON_HEADER, SKIPPED_DEALS_HEADER};
use crate::error::Error;
use crate::irr::IrrReport;

use ::csv::{Writer, WriterBuilder};
use log::debug;
use std::fs::File;

impl From<::csv::Error> for Error {
    fn from(error: ::csv::Error) -> Self {
        Error::new_output(format!("csv error : {error}"))
    }
}

pub struct CsvOutput<'a> {
    output_dir: String,
    report: &'a IrrReport,
}

fn make_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.delimiter(b';');
    builder
}

fn format_irr(irr: Option<f64>) -> String {
    irr.map(|value| format!("{value:.2}")).unwrap_or_default()
}

impl<'a> CsvOutput<'a> {
    pub fn new(output_dir: &str, report: &'a IrrReport) -> Self {
        Self {
            output_dir: output_dir.to_string(),
            report,
        }
    }

    fn create(&self, name: &str) -> Result<Writer<File>, Error> {
        let filename = format!("{}/{}", self.output_dir, name);
        make_builder()
            .from_path(&filename)
            .map_err(|err| Error::new_output(format!("unable to create {filename} : {err}")))
    }

    fn write_categories(&self) -> Result<(), Error> {
        let categories = &self.report.categories;
        let mut writer = self.create("category_irrs.csv")?;

        let mut headers = categories.key_names().to_vec();
        headers.push(IRR_HEADER.to_string());
        writer.write_record(&headers)?;

        for result in categories.results.iter() {
            let mut fields = result
                .key
                .values()
                .iter()
                .map(|(_, value)| value.to_string())
                .collect::<Vec<_>>();
            fields.push(format_irr(result.irr));
            writer.write_record(&fields)?;
        }
        writer.flush().map_err(|err| Error::new_output(err.to_string()))
    }

    fn write_skipped_groups(&self) -> Result<(), Error> {
        let categories = &self.report.categories;
        let mut writer = self.create("skipped_groups.csv")?;

        let mut headers = categories.key_names().to_vec();
        headers.push(REASON_HEADER.to_string());
        writer.write_record(&headers)?;

        for skipped in categories.skipped.iter() {
            let mut fields = skipped
                .key
                .values()
                .iter()
                .map(|(_, value)| value.to_string())
                .collect::<Vec<_>>();
            fields.push(skipped.reason.to_string());
            writer.write_record(&fields)?;
        }
        writer.flush().map_err(|err| Error::new_output(err.to_string()))
    }

    fn write_deals(&self) -> Result<(), Error> {
        let mut writer = self.create("deal_irrs.csv")?;
        writer.write_record([DEAL_HEADER, IRR_HEADER])?;
        for result in self.report.deals.results.iter() {
            writer.write_record([result.deal.as_str(), format_irr(result.irr).as_str()])?;
        }
        writer.flush().map_err(|err| Error::new_output(err.to_string()))
    }

    fn write_skipped_deals(&self) -> Result<(), Error> {
        let mut writer = self.create("skipped_deals.csv")?;
        writer.write_record([SKIPPED_DEALS_HEADER])?;
        for deal in self.report.deals.skipped.iter() {
            writer.write_record([deal])?;
        }
        writer.flush().map_err(|err| Error::new_output(err.to_string()))
    }
}

impl Output for CsvOutput<'_> {
    fn write(&mut self) -> Result<(), Error> {
        debug!("write category irrs");
        self.write_categories()?;

        debug!("write skipped groups");
        self.write_skipped_groups()?;

        debug!("write deal irrs");
        self.write_deals()?;

        debug!("write skipped deals");
        self.write_skipped_deals()?;

        Ok(())
    }
}
