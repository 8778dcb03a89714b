use crate::core::allocate::allocate;
use crate::core::csv;
use crate::core::{Allocation, ConfigProvider, Document, Pipeline, Storage};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const REPORT_FILE: &str = "split_report.json";
const BOM: &str = "\u{feff}";

pub struct FileSplitPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> FileSplitPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn build_report(&self, allocation: &Allocation) -> Result<Vec<u8>> {
        let report = serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "input": self.config.input_path(),
            "total_rows": allocation.total_rows(),
            "groups": allocation
                .groups
                .iter()
                .map(|group| {
                    serde_json::json!({
                        "file": format!("{}.csv", group.key),
                        "account": group.account,
                        "sent": group.sent,
                        "rows": group.rows.len(),
                    })
                })
                .collect::<Vec<_>>(),
        });

        Ok(serde_json::to_vec_pretty(&report)?)
    }

    fn build_archive(&self, allocation: &Allocation) -> Result<Vec<u8>> {
        // 在記憶體組 ZIP，完成後取回底層 Vec<u8>
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for group in &allocation.groups {
            zip.start_file::<_, ()>(format!("{}.csv", group.key), FileOptions::default())?;
            zip.write_all(csv::serialize(&allocation.headers, &group.rows).as_bytes())?;
        }

        if self.config.write_report() {
            zip.start_file::<_, ()>(REPORT_FILE, FileOptions::default())?;
            zip.write_all(&self.build_report(allocation)?)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FileSplitPipeline<S, C> {
    async fn extract(&self) -> Result<Document> {
        tracing::debug!("Reading input file: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        let mut text = String::from_utf8(bytes)?;

        // 去掉 UTF-8 BOM，試算表匯出的檔案常帶這個
        if let Some(stripped) = text.strip_prefix(BOM) {
            text = stripped.to_string();
        }

        let document = csv::parse(&text);
        if document.rows.is_empty() {
            tracing::warn!("Input produced no data rows");
        }

        Ok(document)
    }

    async fn partition(&self, document: Document) -> Result<Allocation> {
        Ok(allocate(&document, self.config.splits()))
    }

    async fn deliver(&self, allocation: Allocation) -> Result<Vec<String>> {
        let mut written = Vec::new();

        if let Some(archive_name) = self.config.archive_name() {
            // 打包模式：所有分組檔進同一個 ZIP
            let zip_data = self.build_archive(&allocation)?;
            tracing::debug!("Writing archive ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive_name, &zip_data).await?;
            written.push(format!("{}/{}", self.config.output_path(), archive_name));
        } else {
            for group in &allocation.groups {
                let file_name = format!("{}.csv", group.key);
                let content = csv::serialize(&allocation.headers, &group.rows);
                self.storage
                    .write_file(&file_name, content.as_bytes())
                    .await?;
                written.push(format!("{}/{}", self.config.output_path(), file_name));
            }

            if self.config.write_report() {
                let report = self.build_report(&allocation)?;
                self.storage.write_file(REPORT_FILE, &report).await?;
                written.push(format!("{}/{}", self.config.output_path(), REPORT_FILE));
            }
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SplitSpec;
    use crate::utils::error::SplitError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_names(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut names: Vec<String> = files.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                SplitError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: String,
        splits: Vec<SplitSpec>,
        archive_name: Option<String>,
        write_report: bool,
    }

    impl MockConfig {
        fn new(splits: Vec<SplitSpec>) -> Self {
            Self {
                input_path: "input.csv".to_string(),
                output_path: "test_output".to_string(),
                splits,
                archive_name: None,
                write_report: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn splits(&self) -> &[SplitSpec] {
            &self.splits
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive_name.as_deref()
        }

        fn write_report(&self) -> bool {
            self.write_report
        }
    }

    fn sample_document() -> Document {
        csv::parse("email,city\na@x.com,Taipei\nb@y.com,Kaohsiung\nc@z.com,Tainan\n")
    }

    #[tokio::test]
    async fn test_extract_parses_input_file() {
        let storage = MockStorage::new();
        storage
            .put_file("input.csv", b"email,city\na@x.com,Taipei\nb@y.com,Kaohsiung\n")
            .await;
        let config = MockConfig::new(vec![SplitSpec::new("acme", "b1")]);
        let pipeline = FileSplitPipeline::new(storage, config);

        let document = pipeline.extract().await.unwrap();

        assert_eq!(document.headers, ["email", "city"]);
        assert_eq!(document.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_extract_strips_utf8_bom() {
        let storage = MockStorage::new();
        storage
            .put_file("input.csv", "\u{feff}email,city\na@x.com,Taipei\n".as_bytes())
            .await;
        let config = MockConfig::new(vec![SplitSpec::new("acme", "b1")]);
        let pipeline = FileSplitPipeline::new(storage, config);

        let document = pipeline.extract().await.unwrap();

        assert_eq!(document.headers, ["email", "city"]);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let storage = MockStorage::new();
        let config = MockConfig::new(vec![SplitSpec::new("acme", "b1")]);
        let pipeline = FileSplitPipeline::new(storage, config);

        let result = pipeline.extract().await;

        assert!(matches!(result, Err(SplitError::IoError(_))));
    }

    #[tokio::test]
    async fn test_extract_invalid_utf8_is_encoding_error() {
        let storage = MockStorage::new();
        storage.put_file("input.csv", &[0xff, 0xfe, 0x41]).await;
        let config = MockConfig::new(vec![SplitSpec::new("acme", "b1")]);
        let pipeline = FileSplitPipeline::new(storage, config);

        let result = pipeline.extract().await;

        assert!(matches!(result, Err(SplitError::EncodingError(_))));
    }

    #[tokio::test]
    async fn test_partition_follows_configured_splits() {
        let storage = MockStorage::new();
        let config = MockConfig::new(vec![
            SplitSpec::with_quota("acme", "b1", 1),
            SplitSpec::new("acme", "b2"),
        ]);
        let pipeline = FileSplitPipeline::new(storage, config);

        let allocation = pipeline.partition(sample_document()).await.unwrap();

        assert_eq!(allocation.groups.len(), 2);
        assert_eq!(allocation.groups[0].rows.len(), 1);
        assert_eq!(allocation.groups[1].rows.len(), 2);
    }

    #[tokio::test]
    async fn test_deliver_writes_one_file_per_group() {
        let storage = MockStorage::new();
        let config = MockConfig::new(vec![
            SplitSpec::with_quota("acme", "b1", 2),
            SplitSpec::new("globex", "b2"),
        ]);
        let pipeline = FileSplitPipeline::new(storage.clone(), config);

        let allocation = pipeline.partition(sample_document()).await.unwrap();
        let written = pipeline.deliver(allocation).await.unwrap();

        assert_eq!(
            written,
            ["test_output/acme_b1.csv", "test_output/globex_b2.csv"]
        );

        let first = storage.get_file("acme_b1.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(first).unwrap(),
            "email,city,account,sent\na@x.com,Taipei,acme,b1\nb@y.com,Kaohsiung,acme,b1\n"
        );
    }

    #[tokio::test]
    async fn test_deliver_writes_empty_file_for_empty_group() {
        let storage = MockStorage::new();
        let config = MockConfig::new(vec![
            SplitSpec::with_quota("acme", "b1", 5),
            SplitSpec::with_quota("acme", "b2", 5),
        ]);
        let pipeline = FileSplitPipeline::new(storage.clone(), config);

        let allocation = pipeline.partition(sample_document()).await.unwrap();
        pipeline.deliver(allocation).await.unwrap();

        let second = storage.get_file("acme_b2.csv").await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_deliver_writes_report_when_enabled() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(vec![SplitSpec::with_quota("acme", "b1", 2)]);
        config.write_report = true;
        let pipeline = FileSplitPipeline::new(storage.clone(), config);

        let allocation = pipeline.partition(sample_document()).await.unwrap();
        let written = pipeline.deliver(allocation).await.unwrap();

        assert!(written.contains(&"test_output/split_report.json".to_string()));

        let report_bytes = storage.get_file("split_report.json").await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&report_bytes).unwrap();
        assert_eq!(report["total_rows"], 3);
        assert_eq!(report["groups"][0]["file"], "acme_b1.csv");
        assert_eq!(report["groups"][0]["rows"], 2);
        assert_eq!(report["groups"][1]["file"], "acme_b1_remainder.csv");
        assert_eq!(report["groups"][1]["sent"], "b1_remainder");
    }

    #[tokio::test]
    async fn test_deliver_bundles_archive_when_configured() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(vec![
            SplitSpec::with_quota("acme", "b1", 2),
            SplitSpec::new("acme", "b2"),
        ]);
        config.archive_name = Some("splits.zip".to_string());
        config.write_report = true;
        let pipeline = FileSplitPipeline::new(storage.clone(), config);

        let allocation = pipeline.partition(sample_document()).await.unwrap();
        let written = pipeline.deliver(allocation).await.unwrap();

        assert_eq!(written, ["test_output/splits.zip"]);
        assert_eq!(storage.file_names().await, ["splits.zip"]);

        let zip_bytes = storage.get_file("splits.zip").await.unwrap();
        let cursor = std::io::Cursor::new(zip_bytes);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(
            file_names,
            ["acme_b1.csv", "acme_b2.csv", "split_report.json"]
        );

        let csv_content = {
            let mut file = archive.by_name("acme_b2.csv").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        assert_eq!(
            csv_content,
            "email,city,account,sent\nc@z.com,Tainan,acme,b2\n"
        );
    }
}
