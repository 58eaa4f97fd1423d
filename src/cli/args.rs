use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{
    default_worker_count, DEFAULT_LAPSE_RATE, DEFAULT_MIN_FILE_SIZE, DEFAULT_REFERENCE_ELEVATION,
    DEFAULT_ZERO_RATIO_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "sfcgrid-processor")]
#[command(about = "Completeness, audit and point-extraction tooling for surface-grid archives")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress bars and summaries")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile expected timestamps against the files on disk
    Scan {
        #[arg(short, long, help = "Archive root directory")]
        data_dir: PathBuf,

        #[arg(short, long, default_value = "output", help = "Report output directory")]
        output_dir: PathBuf,

        #[arg(long = "var", help = "Variable token, repeatable [default: all]")]
        vars: Vec<String>,

        #[arg(short, long, default_value = "hour", help = "Expected frequency: hour or day")]
        freq: String,

        #[arg(long, help = "Range start date YYYY-MM-DD [default: earliest on disk]")]
        start: Option<String>,

        #[arg(long, help = "Range end date YYYY-MM-DD [default: latest on disk]")]
        end: Option<String>,

        #[arg(long, help = "Also treat files smaller than this many bytes as missing")]
        min_size: Option<u64>,
    },

    /// Audit raw value distributions file by file
    Audit {
        #[arg(short, long, help = "Archive root directory")]
        data_dir: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long = "var", help = "Variable token, repeatable [default: all]")]
        vars: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_ZERO_RATIO_THRESHOLD)]
        zero_ratio_threshold: f64,

        #[arg(short, long, default_value = "parquet", help = "Full listing format: parquet or csv")]
        format: String,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value_t = default_worker_count())]
        max_workers: usize,
    },

    /// List snapshot file sizes and flag undersized ones
    Sizes {
        #[arg(short, long, help = "Archive root directory")]
        data_dir: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long = "var", help = "Variable token, repeatable [default: all]")]
        vars: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_MIN_FILE_SIZE)]
        min_size: u64,
    },

    /// Convert snapshots into per-point series and corrected grids
    Convert {
        #[arg(short, long, help = "Archive root directory")]
        data_dir: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long = "var", default_value = "ta", help = "Variable token")]
        var: String,

        #[arg(short, long, default_value = "hour", help = "Expected frequency: hour or day")]
        freq: String,

        #[arg(long, help = "Range start date YYYY-MM-DD [default: earliest on disk]")]
        start: Option<String>,

        #[arg(long, help = "Range end date YYYY-MM-DD [default: latest on disk]")]
        end: Option<String>,

        #[arg(long, help = "Target point CSV (label,lat,lon) [default: built-in regions]")]
        points: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_LAPSE_RATE)]
        lapse_rate: f64,

        #[arg(long, default_value_t = DEFAULT_REFERENCE_ELEVATION)]
        reference_elevation: f64,

        #[arg(long, default_value_t = 0, help = "Synthetic elevation seed")]
        seed: u64,

        #[arg(long, help = "Keep raw sentinel values in obs output instead of NaN")]
        raw_sentinels: bool,

        #[arg(long, default_value_t = default_worker_count())]
        max_workers: usize,
    },
}
