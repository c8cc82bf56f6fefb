use crate::core::filter::RowFilter;
use crate::core::renderer::SheetRenderer;
use crate::core::shaper::shape_rows;
use crate::core::xml_reader::read_records;
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::{EtlError, Result};
use std::path::Path;

/// Builds the Sheet3 report from the XML files of one folder.
pub struct SheetPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    filter: RowFilter,
    renderer: SheetRenderer,
}

impl<S: Storage, C: ConfigProvider> SheetPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let filter = RowFilter::from_config(&config);
        Self {
            storage,
            config,
            filter,
            renderer: SheetRenderer::default(),
        }
    }
}

fn display_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SheetPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let files = self.storage.list_files(self.config.file_pattern()).await?;
        if files.is_empty() {
            return Err(EtlError::NoInputFiles {
                folder: self.config.input_folder().to_string(),
                pattern: self.config.file_pattern().to_string(),
            });
        }

        tracing::info!("Found {} input file(s)", files.len());

        let mut records = Vec::new();
        let mut parsed_files = 0usize;
        for path in &files {
            let name = display_name(path);
            let data = match self.storage.read_file(path).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("[WARN] Skipped {}: {}", name, e);
                    continue;
                }
            };

            match read_records(name, &data) {
                Ok(file_records) => {
                    tracing::debug!("{}: {} TestStep rows", name, file_records.len());
                    parsed_files += 1;
                    records.extend(file_records);
                }
                Err(e) if e.is_file_level() => {
                    tracing::warn!("[WARN] Skipped {}: {}", name, e);
                }
                Err(e) => return Err(e),
            }
        }

        if parsed_files == 0 {
            return Err(EtlError::NoParseableFiles {
                attempted: files.len(),
            });
        }

        tracing::info!(
            "Loaded {} records from {} of {} file(s)",
            records.len(),
            parsed_files,
            files.len()
        );
        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let records_in = data.len();
        let kept = self.filter.apply(data);
        let records_dropped = records_in - kept.len();

        tracing::debug!(
            "Filter kept {} of {} records ({} dropped)",
            kept.len(),
            records_in,
            records_dropped
        );

        Ok(TransformResult {
            rows: shape_rows(kept),
            records_in,
            records_dropped,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path().to_string();
        let bytes = self.renderer.render(&result.rows)?;

        tracing::debug!(
            "Writing workbook ({} bytes, {} highlighted readings) to {}",
            bytes.len(),
            self.renderer.count_highlighted(&result.rows),
            output_path
        );

        self.storage
            .write_file(&output_path, &bytes)
            .await
            .map_err(|e| match e {
                EtlError::IoError(source) => EtlError::OutputWriteError {
                    path: output_path.clone(),
                    source,
                },
                other => other,
            })?;

        Ok(output_path)
    }
}
