//! Common test utilities for integration tests

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use portal_harvest::config::ResolvedConfig;
use portal_harvest::downloader::Portal;
use portal_harvest::errors::{AppError, AppResult};
use portal_harvest::models::{DownloadTask, FileKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Writes a PDF with one line of text per page.
#[allow(dead_code)]
pub fn create_test_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(pages.len() as i64),
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    doc.save(path).unwrap();
}

/// Writes a file named and shaped like a portal download.
#[allow(dead_code)]
pub fn create_download(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if name.to_ascii_lowercase().ends_with(".pdf") {
        create_test_pdf(&path, &[text]);
    } else {
        fs::create_dir_all(dir).unwrap();
        fs::write(&path, text).unwrap();
    }
    path
}

/// Test configuration downloading into `root/data` with short waits.
#[allow(dead_code)]
pub fn test_config(root: &Path) -> ResolvedConfig {
    ResolvedConfig {
        download_dir: root.join("data"),
        output_path: root.join("simple-energy.xlsx"),
        download_timeout_secs: 1,
        poll_interval_ms: 10,
        ..Default::default()
    }
}

/// Portal double: each click writes the expected download for the submitted code.
///
/// Text downloads contain `text {file_id} {code}`; PDFs get a two-page
/// document whose first page reads `page one {file_id} {code}`.
/// When `skip_file_id` is set, clicks for that file id produce nothing.
/// When `timeout_on_click` is set, that click (1-based, counted across
/// sessions) fails with `ElementTimeout` instead.
#[allow(dead_code)]
pub struct FakePortal {
    download_dir: PathBuf,
    prefix: String,
    tasks: Vec<DownloadTask>,
    code: Option<String>,
    skip_file_id: Option<u32>,
    timeout_on_click: Option<usize>,
    pub sessions: usize,
    pub closed: usize,
    pub clicks: usize,
}

#[allow(dead_code)]
impl FakePortal {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            download_dir: config.download_dir.clone(),
            prefix: config.file_prefix.clone(),
            tasks: config.tasks().unwrap(),
            code: None,
            skip_file_id: None,
            timeout_on_click: None,
            sessions: 0,
            closed: 0,
            clicks: 0,
        }
    }

    pub fn skipping(mut self, file_id: u32) -> Self {
        self.skip_file_id = Some(file_id);
        self
    }

    pub fn timing_out_on_click(mut self, click: usize) -> Self {
        self.timeout_on_click = Some(click);
        self
    }
}

#[async_trait]
impl Portal for FakePortal {
    async fn open(&mut self, _url: &Url) -> AppResult<()> {
        self.sessions += 1;
        Ok(())
    }

    async fn submit_code(&mut self, _selector: &str, code: &str) -> AppResult<()> {
        self.code = Some(code.to_string());
        Ok(())
    }

    async fn click_when_ready(&mut self, xpath: &str, timeout: Duration) -> AppResult<()> {
        self.clicks += 1;
        if self.timeout_on_click == Some(self.clicks) {
            return Err(AppError::ElementTimeout {
                xpath: xpath.to_string(),
                waited: timeout,
            });
        }

        let code = self.code.clone().expect("code submitted before clicking");
        let task = self
            .tasks
            .iter()
            .find(|t| t.xpath() == xpath)
            .expect("xpath belongs to a configured task")
            .clone();
        if self.skip_file_id == Some(task.file_id) {
            return Ok(());
        }

        let path = self.download_dir.join(task.file_name(&self.prefix, &code));
        match task.kind {
            FileKind::Txt => {
                fs::write(&path, format!("text {} {code}", task.file_id)).unwrap();
            }
            FileKind::Pdf => {
                let first = format!("page one {} {code}", task.file_id);
                create_test_pdf(&path, &[first.as_str(), "page two"]);
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        self.code = None;
        self.closed += 1;
        Ok(())
    }
}
