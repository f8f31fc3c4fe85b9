// src/article/mod.rs
//! Article discovery and photo-row parsing.
//!
//! An article is one CSV file; every row is `timestamp,latitude,longitude`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::photo::{LatLon, PhotoRecord};

/// Supplies the articles of one run and their photo rows.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Article locators in dispatch order.
    async fn list_articles(&self) -> Result<Vec<String>>;

    async fn read_photo_records(&self, article: &str) -> Result<Vec<PhotoRecord>>;
}

/// Articles stored as files of one directory.
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArticleSource for CsvDirectory {
    async fn list_articles(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("listing articles in {}", self.dir.display()))?;

        let mut out = Vec::new();
        while let Some(e) = entries.next_entry().await? {
            if e.file_type().await?.is_file() {
                out.push(e.path().to_string_lossy().to_string());
            }
        }
        out.sort();
        Ok(out)
    }

    async fn read_photo_records(&self, article: &str) -> Result<Vec<PhotoRecord>> {
        tracing::info!(article, "processing article");
        let content = tokio::fs::read_to_string(article)
            .await
            .with_context(|| format!("reading article {article}"))?;
        parse_photo_rows(article, &content)
    }
}

const ROW_FIELDS: usize = 3;

/// Parse article rows. Every row has exactly three fields; quoted fields may
/// contain commas and `""` escapes. Blank lines are skipped and indexes count
/// parsed rows from 1.
pub fn parse_photo_rows(article: &str, content: &str) -> Result<Vec<PhotoRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("{article}: malformed csv"))?;
        if record.len() != ROW_FIELDS {
            bail!(
                "{article}:{}: expected `timestamp,latitude,longitude`, got {} field(s)",
                record.position().map_or(0, |p| p.line()),
                record.len()
            );
        }
        out.push(PhotoRecord {
            article_id: article.to_string(),
            index: out.len() + 1,
            timestamp: record[0].to_string(),
            lat_lon: LatLon {
                latitude: record[1].to_string(),
                longitude: record[2].to_string(),
            },
        });
    }
    Ok(out)
}
