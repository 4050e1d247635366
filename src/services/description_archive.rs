//! 职位描述归档 - 业务能力层
//!
//! 每个打开过的职位保存一份 HTML，便于事后查看为什么投递 / 跳过。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::models::JobPosting;

/// 归档时的职位状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStatus {
    Applied,
    Failed,
    Skipped,
}

impl ArchiveStatus {
    fn as_str(self) -> &'static str {
        match self {
            ArchiveStatus::Applied => "applied",
            ArchiveStatus::Failed => "failed",
            ArchiveStatus::Skipped => "skipped",
        }
    }
}

/// 描述归档服务
pub struct DescriptionArchive {
    dir: PathBuf,
}

impl DescriptionArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 写入（覆盖）一个职位的归档页，返回文件路径
    pub fn write(
        &self,
        posting: &JobPosting,
        status: ArchiveStatus,
        reason: Option<&str>,
        external_link: Option<&str>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(posting);

        let description = posting.description.as_deref().unwrap_or("Unknown");
        let mut meta = format!(
            "<p><strong>Company:</strong> {}</p>\n<p><strong>Location:</strong> {} ({})</p>\n\
             <p><strong>Viewed:</strong> {}</p>\n<p><strong>Status:</strong> {}</p>\n",
            escape_html(&posting.company),
            escape_html(&posting.location),
            posting.work_style,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            status.as_str(),
        );
        if let Some(listed) = posting.date_listed {
            meta.push_str(&format!(
                "<p><strong>Listed:</strong> {}</p>\n",
                listed.format("%Y-%m-%d")
            ));
        }
        if let Some(reason) = reason {
            meta.push_str(&format!("<p><strong>Reason:</strong> {}</p>\n", escape_html(reason)));
        }
        if let Some(link) = external_link {
            let link = escape_html(link);
            meta.push_str(&format!(
                "<p><strong>Apply link:</strong> <a href=\"{link}\">{link}</a></p>\n"
            ));
        }

        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n<h1>{title}</h1>\n<p><a href=\"{url}\">{url}</a></p>\n{meta}<hr>\n\
             <pre style=\"white-space: pre-wrap\">{body}</pre>\n</body>\n</html>\n",
            title = escape_html(&posting.title),
            url = posting.job_url(),
            meta = meta,
            body = escape_html(description),
        );

        fs::write(&path, html)?;
        debug!("已归档职位描述: {}", path.display());
        Ok(path)
    }

    fn path_for(&self, posting: &JobPosting) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.html",
            sanitize_file_stem(&posting.company),
            sanitize_file_stem(&posting.title)
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// 只保留字母数字，其余替换为下划线
pub fn sanitize_file_stem(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned.chars().take(80).collect()
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Acme, Inc."), "Acme__Inc");
        assert_eq!(sanitize_file_stem("  ///  "), "unknown");
    }

    #[test]
    fn test_archive_escapes_description() {
        let dir = tempfile::tempdir().unwrap();
        let archive = DescriptionArchive::new(dir.path());
        let posting = JobPosting {
            id: "9".into(),
            title: "Frontend Developer".into(),
            company: "Acme".into(),
            description: Some("<script>alert(1)</script>".into()),
            ..Default::default()
        };

        let path = archive
            .write(&posting, ArchiveStatus::Skipped, Some("crypto"), None)
            .unwrap();
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<strong>Status:</strong> skipped"));
        assert!(html.contains("<strong>Reason:</strong> crypto"));
    }
}
