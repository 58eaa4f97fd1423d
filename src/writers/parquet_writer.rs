use crate::error::Result;
use crate::models::AuditRecord;
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(crate::error::ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write audit records to a Parquet file
    pub fn write_records(&self, records: &[AuditRecord], path: &Path) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let batch = self.records_to_batch(records, schema.clone())?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }

    /// Create Arrow schema for per-file audit records
    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new("date", DataType::Utf8, false),
            Field::new("size_bytes", DataType::UInt64, false),
            Field::new("filename", DataType::Utf8, false),
            Field::new("min", DataType::Float64, true),
            Field::new("max", DataType::Float64, true),
            Field::new("no_valid_data", DataType::Boolean, false),
            Field::new("zero_ratio", DataType::Float64, false),
            Field::new("negative_ratio", DataType::Float64, false),
            Field::new("reason", DataType::Utf8, true),
        ];

        Arc::new(Schema::new(fields))
    }

    /// Convert audit records to an Arrow RecordBatch
    fn records_to_batch(&self, records: &[AuditRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        let sizes: Vec<u64> = records.iter().map(|r| r.size_bytes).collect();
        let filenames: Vec<String> = records.iter().map(|r| r.filename.clone()).collect();
        let mins: Vec<Option<f64>> = records.iter().map(|r| r.min).collect();
        let maxs: Vec<Option<f64>> = records.iter().map(|r| r.max).collect();
        let no_valid: Vec<bool> = records.iter().map(|r| r.no_valid_data).collect();
        let zero_ratios: Vec<f64> = records.iter().map(|r| r.zero_ratio).collect();
        let negative_ratios: Vec<f64> = records.iter().map(|r| r.negative_ratio).collect();
        let reasons: Vec<Option<String>> = records.iter().map(|r| r.reason.clone()).collect();

        let date_array = Arc::new(StringArray::from(dates));
        let size_array = Arc::new(UInt64Array::from(sizes));
        let filename_array = Arc::new(StringArray::from(filenames));
        let min_array = Arc::new(Float64Array::from(mins));
        let max_array = Arc::new(Float64Array::from(maxs));
        let no_valid_array = Arc::new(BooleanArray::from(no_valid));
        let zero_ratio_array = Arc::new(Float64Array::from(zero_ratios));
        let negative_ratio_array = Arc::new(Float64Array::from(negative_ratios));
        let reason_array = Arc::new(StringArray::from(reasons));

        let batch = RecordBatch::try_new(
            schema,
            vec![
                date_array,
                size_array,
                filename_array,
                min_array,
                max_array,
                no_valid_array,
                zero_ratio_array,
                negative_ratio_array,
                reason_array,
            ],
        )?;

        Ok(batch)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let total_rows = metadata.file_metadata().num_rows();
        let row_groups = metadata.num_row_groups();
        let file_size = std::fs::metadata(path)?.len();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
        )
    }
}
