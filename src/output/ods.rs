use super::ods_helper::TableBuilder;
use super::{DEAL_HEADER, IRR_HEADER, Output, REASON_HEADER, SKIPPED_DEALS_HEADER};
use crate::error::Error;
use crate::irr::{DealResult, GroupResult, IrrReport, SkippedGroup};

use log::debug;
use spreadsheet_ods::format::ValueFormatTrait;
use spreadsheet_ods::{CellStyleRef, Sheet, ValueFormatNumber, ValueFormatRef, WorkBook};

const IRR_FORMAT: &str = "irr_format";
const IRR_STYLE: &str = "irr_style";

const SUMMARY_SHEET: &str = "Summary";
const CATEGORIES_SHEET: &str = "Category IRRs";
const SKIPPED_GROUPS_SHEET: &str = "Skipped Groups";
const DEALS_SHEET: &str = "Deal IRRs";
const SKIPPED_DEALS_SHEET: &str = "Skipped Deals";

/// Position of the generated sheets in the work book, other sheets stay where they are.
const SHEET_ORDER: [&str; 5] = [
    SUMMARY_SHEET,
    CATEGORIES_SHEET,
    SKIPPED_GROUPS_SHEET,
    DEALS_SHEET,
    SKIPPED_DEALS_SHEET,
];

fn sheet_rank(name: &str) -> Option<usize> {
    SHEET_ORDER.iter().position(|item| *item == name)
}

impl From<spreadsheet_ods::OdsError> for Error {
    fn from(error: spreadsheet_ods::OdsError) -> Self {
        Error::new_output(format!("ods error : {error}"))
    }
}

pub struct OdsOutput<'a> {
    output_filename: String,
    work_book: WorkBook,
    report: &'a IrrReport,
}

impl<'a> OdsOutput<'a> {
    pub fn new(output_dir: &str, report: &'a IrrReport) -> Result<Self, Error> {
        let output_filename = format!("{output_dir}/irr_results.ods");
        let path = std::path::Path::new(&output_filename);
        let work_book = if path.exists() {
            spreadsheet_ods::read_ods(path)?
        } else {
            WorkBook::new_empty()
        };
        Ok(Self {
            output_filename,
            work_book,
            report,
        })
    }

    fn add_sheet(&mut self, sheet: Sheet) {
        for i in 0..self.work_book.num_sheets() {
            let i_sheet = self.work_book.sheet(i);
            if i_sheet.name() == sheet.name() {
                self.work_book.remove_sheet(i);
                self.work_book.insert_sheet(i, sheet);
                return;
            }
        }

        // before the first generated sheet that comes after it
        let rank = sheet_rank(sheet.name());
        let position = (0..self.work_book.num_sheets()).find(|i| {
            let i_rank = sheet_rank(self.work_book.sheet(*i).name());
            matches!((rank, i_rank), (Some(rank), Some(i_rank)) if i_rank > rank)
        });
        match position {
            Some(i) => self.work_book.insert_sheet(i, sheet),
            None => self.work_book.push_sheet(sheet),
        }
    }

    fn remove_sheet(&mut self, name: &str) {
        for i in 0..self.work_book.num_sheets() {
            let i_sheet = self.work_book.sheet(i);
            if i_sheet.name() == name {
                self.work_book.remove_sheet(i);
                return;
            }
        }
    }

    fn save(&mut self) -> Result<(), Error> {
        spreadsheet_ods::write_ods(&mut self.work_book, &self.output_filename)?;
        Ok(())
    }

    fn write_categories(&mut self) -> Result<(), Error> {
        let report = self.report;
        let irr_style = self.get_irr_style();
        let mut sheet = Sheet::new(CATEGORIES_SHEET);

        let mut builder = TableBuilder::<&GroupResult>::new();
        for (position, name) in report.categories.key_names().iter().enumerate() {
            builder.add(name.as_str(), move |result: &&GroupResult| {
                result.key.values()[position].1.to_string()
            });
        }
        builder
            .add_optional(IRR_HEADER, |result: &&GroupResult| result.irr)
            .with_style(&irr_style);
        builder.write(&mut sheet, 0, 0, report.categories.results.iter());

        self.add_sheet(sheet);
        Ok(())
    }

    fn write_skipped_groups(&mut self) -> Result<(), Error> {
        let name = SKIPPED_GROUPS_SHEET;
        let report = self.report;
        let skipped = &report.categories.skipped;
        if skipped.is_empty() {
            self.remove_sheet(name);
            return Ok(());
        }

        let mut sheet = Sheet::new(name);
        let mut builder = TableBuilder::<&SkippedGroup>::new();
        for (position, name) in report.categories.key_names().iter().enumerate() {
            builder.add(name.as_str(), move |skipped: &&SkippedGroup| {
                skipped.key.values()[position].1.to_string()
            });
        }
        builder.add(REASON_HEADER, |skipped: &&SkippedGroup| {
            skipped.reason.to_string()
        });
        builder.write(&mut sheet, 0, 0, skipped.iter());

        self.add_sheet(sheet);
        Ok(())
    }

    fn write_deals(&mut self) -> Result<(), Error> {
        let report = self.report;
        let irr_style = self.get_irr_style();
        let mut sheet = Sheet::new(DEALS_SHEET);

        let mut builder = TableBuilder::<&DealResult>::new();
        builder
            .add(DEAL_HEADER, |result: &&DealResult| result.deal.clone())
            .add_optional(IRR_HEADER, |result: &&DealResult| result.irr)
            .with_style(&irr_style);
        builder.write(&mut sheet, 0, 0, report.deals.results.iter());

        self.add_sheet(sheet);
        Ok(())
    }

    fn write_skipped_deals(&mut self) -> Result<(), Error> {
        let name = SKIPPED_DEALS_SHEET;
        let report = self.report;
        if report.deals.skipped.is_empty() {
            self.remove_sheet(name);
            return Ok(());
        }

        let mut sheet = Sheet::new(name);
        let mut builder = TableBuilder::<&String>::new();
        builder.add(SKIPPED_DEALS_HEADER, |deal: &&String| deal.to_string());
        builder.write(&mut sheet, 0, 0, report.deals.skipped.iter());

        self.add_sheet(sheet);
        Ok(())
    }

    fn write_summary(&mut self) -> Result<(), Error> {
        let report = self.report;
        let irr_style = self.get_irr_style();
        let mut sheet = Sheet::new(SUMMARY_SHEET);
        let categories = &report.categories;
        let deals = &report.deals;

        sheet.set_value(0, 0, "Average IRR (%)");
        match report.average_irr() {
            Some(average) => sheet.set_styled_value(0, 1, average, &irr_style),
            None => sheet.set_value(0, 1, "no data"),
        }
        for (row, (header, count)) in [
            ("Groups", categories.results.len()),
            ("Skipped Groups", categories.skipped.len()),
            ("Deals", deals.results.len()),
            ("Skipped Deals", deals.skipped.len()),
        ]
        .into_iter()
        .enumerate()
        {
            sheet.set_value(row as u32 + 1, 0, header);
            sheet.set_value(row as u32 + 1, 1, count as f64);
        }

        self.add_sheet(sheet);
        Ok(())
    }

    fn get_irr_format(&mut self) -> ValueFormatRef {
        if let Some(value) = self.work_book.number_format(IRR_FORMAT) {
            return value.format_ref();
        }
        let mut format_number = ValueFormatNumber::new_named(IRR_FORMAT);
        format_number
            .part_number()
            .min_integer_digits(1)
            .decimal_places(2)
            .min_decimal_places(2)
            .build();
        self.work_book.add_number_format(format_number)
    }

    fn get_irr_style(&mut self) -> CellStyleRef {
        if let Some(value) = self.work_book.cellstyle(IRR_STYLE) {
            return value.style_ref();
        }
        let value_format_ref = self.get_irr_format();
        let irr_style = spreadsheet_ods::CellStyle::new(IRR_STYLE, &value_format_ref);
        self.work_book.add_cellstyle(irr_style)
    }
}

impl Output for OdsOutput<'_> {
    fn write(&mut self) -> Result<(), Error> {
        debug!("write summary");
        self.write_summary()?;

        debug!("write category irrs");
        self.write_categories()?;

        debug!("write skipped groups");
        self.write_skipped_groups()?;

        debug!("write deal irrs");
        self.write_deals()?;

        debug!("write skipped deals");
        self.write_skipped_deals()?;

        debug!("save");
        self.save()?;
        Ok(())
    }
}
