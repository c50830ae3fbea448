use std::path::PathBuf;

use clap::Parser;

use crate::config::{ReportConfig, ThresholdOverrides};
use crate::report::plot::ImageFormat;
use crate::report::sheet::SheetFormat;

#[derive(Debug, Parser)]
#[command(
    name = "proteo-compare",
    version,
    about = "Compare dried and liquid replicate intensities from a MaxQuant proteinGroups table",
    long_about = "Reads a MaxQuant proteinGroups.txt export, computes per-protein replicate\n\
                  statistics, drops proteins with noisy replicates, flags clinically relevant\n\
                  proteins and writes comparison charts and Excel spreadsheets."
)]
pub struct Cli {
    /// MaxQuant proteinGroups.txt (tab-separated)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for charts and spreadsheets (created if missing)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Prefix prepended to every output file name
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Chart image format
    #[arg(long, value_enum, default_value_t = ImageFormat::Svg)]
    pub format: ImageFormat,

    /// Spreadsheet file format
    #[arg(long, value_enum, default_value_t = SheetFormat::Xlsx)]
    pub sheet_format: SheetFormat,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1200, value_parser = clap::value_parser!(u32).range(100..=10_000))]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(100..=10_000))]
    pub height: u32,

    /// JSON file with max_variation, min_fold_change and/or detection_limit
    #[arg(long)]
    pub thresholds: Option<PathBuf>,

    /// Largest replicate CV kept (default 0.2)
    #[arg(long)]
    pub max_variation: Option<f64>,

    /// Fold change for clinical relevance (default 2.0)
    #[arg(long)]
    pub min_fold_change: Option<f64>,

    /// Group mean above which a protein counts as detected (default 0)
    #[arg(long)]
    pub detection_limit: Option<f64>,

    /// Also write the proteins removed by the variation filter
    #[arg(long)]
    pub export_excluded: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn threshold_overrides(&self) -> ThresholdOverrides {
        ThresholdOverrides {
            max_variation: self.max_variation,
            min_fold_change: self.min_fold_change,
            detection_limit: self.detection_limit,
        }
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            output_dir: self.output.clone(),
            prefix: self.prefix.clone(),
            format: self.format,
            sheet_format: self.sheet_format,
            width: self.width,
            height: self.height,
            export_excluded: self.export_excluded,
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["proteo-compare", "-i", "proteinGroups.txt"]).unwrap();
        let report = cli.report_config();
        assert_eq!(report.output_dir, PathBuf::from("."));
        assert_eq!(report.format, ImageFormat::Svg);
        assert_eq!(report.sheet_format, SheetFormat::Xlsx);
        assert_eq!((report.width, report.height), (1200, 800));
        assert!(!report.export_excluded);
        assert_eq!(cli.threshold_overrides(), ThresholdOverrides::default());
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn overrides_and_format() {
        let cli = Cli::try_parse_from([
            "proteo-compare",
            "--input",
            "pg.txt",
            "--format",
            "png",
            "--max-variation",
            "0.3",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.format, ImageFormat::Png);
        assert_eq!(cli.threshold_overrides().max_variation, Some(0.3));
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn csv_sheets_on_request() {
        let cli =
            Cli::try_parse_from(["proteo-compare", "-i", "pg.txt", "--sheet-format", "csv"]).unwrap();
        assert_eq!(cli.report_config().sheet_format, SheetFormat::Csv);
    }

    #[test]
    fn chart_size_is_bounded() {
        let parse = |flag: &str, value: &str| {
            Cli::try_parse_from(["proteo-compare", "-i", "pg.txt", flag, value])
        };
        assert_eq!(parse("--width", "10000").unwrap().width, 10_000);
        assert!(parse("--width", "100000").is_err());
        assert!(parse("--height", "10001").is_err());
        assert!(parse("--height", "99").is_err());
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["proteo-compare"]).is_err());
    }
}
