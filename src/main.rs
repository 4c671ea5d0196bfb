use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;
use log::{info, warn};

mod alias;
mod cashflow;
mod error;
mod irr;
mod output;
mod referential;

use alias::Date;
use irr::IrrReport;
use output::{CsvOutput, OdsOutput, Output};
use referential::{Filter, Referential};

use error::Error;

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputType {
    Csv,
    Ods,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// Internal rate of return of cash flows grouped by deal attributes
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Cash flows file (json)
    #[clap(short, long, value_parser)]
    cash_flows: String,

    /// Deal metadata file (json)
    #[clap(short, long, value_parser)]
    metadata: String,

    /// Grouping keys, comma separated, empty for a single group
    #[clap(
        short,
        long,
        value_delimiter = ',',
        default_value = "Industry,Region,Liquidation Status,Fund"
    )]
    group_by: Vec<String>,

    /// Keep only records matching Name=value1,value2 (repeatable)
    #[clap(short, long, value_parser)]
    filter: Vec<String>,

    /// First cash flow date kept (inclusive)
    #[clap(long, value_parser)]
    from: Option<Date>,

    /// Last cash flow date kept (inclusive)
    #[clap(long, value_parser)]
    to: Option<Date>,

    /// output type
    #[clap(default_value_t = OutputType::Csv, short = 't', long, value_parser)]
    output_type: OutputType,

    /// output dir
    #[clap(short, long, value_parser)]
    output_dir: String,
}

fn make_filter(args: &Args) -> Result<Filter, Error> {
    let mut filter = Filter::new().with_begin(args.from).with_end(args.to);
    for input in args.filter.iter() {
        let (name, values) = Filter::parse_field(input)?;
        filter = filter.with_field(name, values);
    }
    Ok(filter)
}

fn make_keys(args: &Args) -> Vec<&str> {
    args.group_by
        .iter()
        .map(|key| key.trim())
        .filter(|key| !key.is_empty())
        .collect()
}

fn main() -> Result<(), Error> {
    //
    // cli arg
    let args = Args::parse();

    //
    // logger
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    builder.init();

    //
    // load and select cash flows
    let referential = Referential::load(&args.cash_flows, &args.metadata)?;
    let filter = make_filter(&args)?;
    let records = filter.apply(referential.join(), referential.schema())?;
    info!("{} cash flows selected", records.len());

    //
    // compute
    let keys = make_keys(&args);
    let report = IrrReport::compute(&records, &keys, referential.schema())?;
    match report.average_irr() {
        Some(average) => info!("average irr {:.2}%", average),
        None => info!("average irr : no data"),
    }
    if !report.categories.skipped.is_empty() {
        warn!(
            "{} groups skipped due to missing positive or negative cash flows",
            report.categories.skipped.len()
        );
    }
    if !report.deals.skipped.is_empty() {
        warn!(
            "deals skipped due to invalid cash flow structure : {}",
            report.deals.skipped.join(", ")
        );
    }

    //
    // write output
    let mut output: Box<dyn Output + '_> = match args.output_type {
        OutputType::Csv => Box::new(CsvOutput::new(&args.output_dir, &report)),
        OutputType::Ods => Box::new(OdsOutput::new(&args.output_dir, &report)?),
    };
    output.write()?;
    info!("write output done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let args = Args::try_parse_from([
            "irr-rs",
            "-c",
            "flows.json",
            "-m",
            "meta.json",
            "-o",
            "out",
            "-f",
            "Industry=Tech,Health",
            "--filter",
            "Fund=F1",
            "--from",
            "2020-01-01",
            "-t",
            "ods",
        ])
        .unwrap();

        assert_eq!(
            make_keys(&args),
            vec!["Industry", "Region", "Liquidation Status", "Fund"]
        );
        assert_eq!(args.filter.len(), 2);
        assert_eq!(args.from, Date::from_ymd_opt(2020, 1, 1));
        assert_eq!(args.to, None);
        assert_eq!(args.output_type, OutputType::Ods);
        assert!(make_filter(&args).is_ok());
    }

    #[test]
    fn parse_group_by() {
        let parse = |group_by: &str| {
            Args::try_parse_from([
                "irr-rs", "-c", "f", "-m", "m", "-o", "o", "-g", group_by,
            ])
            .unwrap()
        };

        let args = parse("Year, Fund");
        assert_eq!(make_keys(&args), vec!["Year", "Fund"]);

        let args = parse("");
        assert!(make_keys(&args).is_empty());
    }

    #[test]
    fn invalid_filter() {
        let args = Args::try_parse_from([
            "irr-rs", "-c", "f", "-m", "m", "-o", "o", "-f", "Industry",
        ])
        .unwrap();
        assert!(make_filter(&args).is_err());
    }
}
