//! Article backup archives
//!
//! Builds a ZIP snapshot of every article:
//! - `articles_backup.json`: the authoritative manifest
//! - `articles/<id>_<title>.json`: one file per article, best effort
//! - `backup_info.txt`: a human-readable summary
//!
//! A per-article entry that cannot be serialized or written is skipped and
//! counted; the export only fails when the manifest or the archive itself
//! cannot be produced.

use crate::domain::Article;
use crate::errors::{AppError, BackupStage, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// Manifest entry name
pub const MANIFEST_ENTRY: &str = "articles_backup.json";

/// Summary entry name
pub const INFO_ENTRY: &str = "backup_info.txt";

/// Directory holding the per-article entries
pub const ARTICLE_DIR: &str = "articles/";

/// Longest sanitized title kept in an entry name
pub const MAX_FILENAME_LEN: usize = 50;

/// Timestamp layout used in the summary entry
const INFO_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Manifest document written to [`MANIFEST_ENTRY`]
#[derive(Debug, Serialize)]
pub struct BackupManifest<'a> {
    pub backup_time: DateTime<Local>,
    pub article_count: usize,
    pub articles: &'a [Article],
}

/// A finished backup archive
#[derive(Debug, Clone)]
pub struct BackupArchive {
    /// Raw ZIP bytes
    pub bytes: Vec<u8>,
    /// Snapshot time recorded in the manifest
    pub backup_time: DateTime<Local>,
    /// Number of articles in the manifest
    pub article_count: usize,
    /// Per-article entries that could not be written
    pub skipped: usize,
}

impl BackupArchive {
    /// Suggested download name, e.g. `articles_backup_20240501_083000.zip`
    pub fn file_name(&self) -> String {
        format!("articles_backup_{}.zip", self.backup_time.format("%Y%m%d_%H%M%S"))
    }
}

/// Replace characters unsafe in file names and clamp the length
///
/// `/ \ : * ? " < > |` and anything outside printable ASCII become `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ' '..='~' => ch,
            _ => '_',
        })
        .take(MAX_FILENAME_LEN)
        .collect()
}

/// Archive path of the per-article entry
pub fn article_entry_name(article: &Article) -> String {
    format!("{}{}_{}.json", ARTICLE_DIR, article.id, sanitize_filename(&article.title))
}

fn info_text(backup_time: &DateTime<Local>, article_count: usize) -> String {
    format!(
        "Blog article backup\n\
         Backup time: {}\n\
         Total articles: {}\n\
         Backup format: JSON\n\
         Backup tool: inkpress\n\
         \n\
         Contents:\n\
         - {}: complete article backup data\n\
         - {}: one file per article\n\
         - {}: backup information (this file)\n",
        backup_time.format(INFO_TIME_FORMAT),
        article_count,
        MANIFEST_ENTRY,
        ARTICLE_DIR,
        INFO_ENTRY,
    )
}

/// Serialize `articles` into a backup archive stamped with `backup_time`
pub fn build_archive(articles: &[Article], backup_time: DateTime<Local>) -> Result<BackupArchive> {
    let manifest = BackupManifest {
        backup_time,
        article_count: articles.len(),
        articles,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| AppError::backup(BackupStage::ManifestSerialization, e.into()))?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, options)
        .map_err(|e| manifest_write_error(e.to_string()))?;
    zip.write_all(&manifest_bytes)
        .map_err(|e| manifest_write_error(e.to_string()))?;

    let mut skipped = 0;
    for article in articles {
        let entry = article_entry_name(article);
        if let Err(reason) = write_article_entry(&mut zip, &entry, article, options) {
            skipped += 1;
            tracing::warn!(
                article_id = article.id,
                entry = %entry,
                error = %reason,
                "Skipping article entry in backup"
            );
        }
    }

    // The summary is informational; the archive stays usable without it
    let info = info_text(&backup_time, articles.len());
    if let Err(e) = zip
        .start_file(INFO_ENTRY, options)
        .map_err(|e| e.to_string())
        .and_then(|_| zip.write_all(info.as_bytes()).map_err(|e| e.to_string()))
    {
        tracing::warn!(error = %e, "Failed to write backup summary entry");
    }

    let bytes = zip
        .finish()
        .map_err(|e| {
            AppError::backup(
                BackupStage::ArchiveFinalization,
                AppError::Internal { message: e.to_string() },
            )
        })?
        .into_inner();

    Ok(BackupArchive {
        bytes,
        backup_time,
        article_count: articles.len(),
        skipped,
    })
}

fn manifest_write_error(message: String) -> AppError {
    AppError::backup(
        BackupStage::ManifestSerialization,
        AppError::Internal { message },
    )
}

fn write_article_entry<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    entry: &str,
    article: &Article,
    options: FileOptions<'_, ()>,
) -> std::result::Result<(), String> {
    let data = serde_json::to_vec_pretty(article).map_err(|e| e.to_string())?;
    zip.start_file(entry, options).map_err(|e| e.to_string())?;
    zip.write_all(&data).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Tag};
    use chrono::{TimeZone, Utc};
    use std::io::Read;
    use zip::ZipArchive;

    fn fixture() -> Vec<Article> {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let tag = |id: i32, name: &str, color: &str| Tag {
            id,
            name: name.to_string(),
            color: color.to_string(),
            created_at: now,
            updated_at: now,
        };
        vec![
            Article {
                id: 1,
                title: "Go语言入门".to_string(),
                content: "An introduction to Go".to_string(),
                summary: "Go basics".to_string(),
                published: true,
                created_at: now,
                updated_at: now,
                category: Some(Category {
                    id: 1,
                    name: "Tech".to_string(),
                    description: String::new(),
                    created_at: now,
                    updated_at: now,
                }),
                tags: vec![tag(1, "Go", "#00ADD8"), tag(2, "Programming", "#007bff")],
            },
            Article {
                id: 2,
                title: "Docker: deploy/ship?".to_string(),
                content: "Containers".to_string(),
                summary: String::new(),
                published: true,
                created_at: now,
                updated_at: now,
                category: None,
                tags: vec![tag(3, "Docker", "#2496ED")],
            },
        ]
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    fn backup_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 16, 30, 5).unwrap()
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename(r#"a/b\c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
        assert_eq!(sanitize_filename("Go语言"), "Go__");
        assert_eq!(sanitize_filename("plain title-1.2"), "plain title-1.2");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "x".repeat(80);
        assert_eq!(sanitize_filename(&long).len(), MAX_FILENAME_LEN);
        let wide = "文".repeat(80);
        assert_eq!(sanitize_filename(&wide), "_".repeat(MAX_FILENAME_LEN));
    }

    #[test]
    fn test_entry_name_uses_id_and_sanitized_title() {
        let articles = fixture();
        assert_eq!(article_entry_name(&articles[1]), "articles/2_Docker_ deploy_ship_.json");
    }

    #[test]
    fn test_archive_layout() {
        let articles = fixture();
        let archive = build_archive(&articles, backup_time()).unwrap();
        assert_eq!(archive.article_count, 2);
        assert_eq!(archive.skipped, 0);

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let names: Vec<String> = zip.file_names().map(str::to_string).collect();
        assert_eq!(names.iter().filter(|n| n.as_str() == MANIFEST_ENTRY).count(), 1);
        assert_eq!(names.iter().filter(|n| n.as_str() == INFO_ENTRY).count(), 1);
        assert_eq!(names.iter().filter(|n| n.starts_with(ARTICLE_DIR)).count(), 2);

        let manifest: serde_json::Value =
            serde_json::from_str(&read_entry(&mut zip, MANIFEST_ENTRY)).unwrap();
        assert_eq!(manifest["article_count"], 2);
        assert_eq!(manifest["articles"][0]["title"], "Go语言入门");
        assert_eq!(manifest["articles"][1]["title"], "Docker: deploy/ship?");
        assert_eq!(manifest["articles"][0]["category"]["name"], "Tech");
        assert_eq!(manifest["articles"][0]["tags"][1]["name"], "Programming");
        assert!(manifest["backup_time"].is_string());

        let single: Article =
            serde_json::from_str(&read_entry(&mut zip, "articles/1_Go____.json")).unwrap();
        assert_eq!(single, articles[0]);

        let info = read_entry(&mut zip, INFO_ENTRY);
        assert!(info.contains("Total articles: 2"));
        assert!(info.contains("Backup time: 2024-05-01 16:30:05"));
    }

    #[test]
    fn test_failed_entry_is_skipped() {
        let mut articles = fixture();
        let mut twin = articles[0].clone();
        twin.summary = "same entry name as article 1".to_string();
        articles.push(twin);

        let archive = build_archive(&articles, backup_time()).unwrap();
        assert_eq!(archive.article_count, 3);
        assert_eq!(archive.skipped, 1);

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let entries = zip.file_names().filter(|n| n.starts_with(ARTICLE_DIR)).count();
        assert_eq!(entries, 2);

        let manifest: serde_json::Value =
            serde_json::from_str(&read_entry(&mut zip, MANIFEST_ENTRY)).unwrap();
        assert_eq!(manifest["article_count"], 3);
        assert_eq!(manifest["articles"].as_array().map(Vec::len), Some(3));
        assert_eq!(manifest["articles"][2]["summary"], "same entry name as article 1");

        let single: Article =
            serde_json::from_str(&read_entry(&mut zip, "articles/1_Go____.json")).unwrap();
        assert_eq!(single, articles[0]);
        assert!(read_entry(&mut zip, INFO_ENTRY).contains("Total articles: 3"));
    }

    #[test]
    fn test_empty_archive_still_has_manifest_and_info() {
        let archive = build_archive(&[], backup_time()).unwrap();
        assert!(!archive.bytes.is_empty());

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert!(zip.len() >= 2);
        let manifest: serde_json::Value =
            serde_json::from_str(&read_entry(&mut zip, MANIFEST_ENTRY)).unwrap();
        assert_eq!(manifest["article_count"], 0);
        assert_eq!(manifest["articles"].as_array().map(Vec::len), Some(0));
        assert!(read_entry(&mut zip, INFO_ENTRY).contains("Total articles: 0"));
    }

    #[test]
    fn test_download_file_name() {
        let archive = build_archive(&[], backup_time()).unwrap();
        assert_eq!(archive.file_name(), "articles_backup_20240501_163005.zip");
    }
}
