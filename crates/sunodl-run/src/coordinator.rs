use sunodl_acquire::{extract, output};
use sunodl_model::error::AcquireError;
use sunodl_model::failure::FailureLog;
use sunodl_model::item::{ItemState, OutputKind, WorkItem};
use sunodl_model::layout::OutputLayout;
use sunodl_model::page::{MediaPage, PageFields};
use sunodl_model::sanitize::{sanitize_filename, UNKNOWN_TITLE};

use crate::SiteClient;

/// Per-item result: terminal state plus which kinds produced an output
/// and which are covered by failure records. For every item,
/// `written.len() + failed.len()` equals the number of requested kinds.
#[derive(Debug)]
pub struct ItemOutcome {
    pub url: String,
    pub state: ItemState,
    pub written: Vec<OutputKind>,
    pub failed: Vec<OutputKind>,
}

/// Totals for one finished run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub items: usize,
    pub done: usize,
    pub failed: usize,
    pub files_written: usize,
    pub failures_recorded: usize,
}

/// Sequential driver for a run: processes work items in input order and
/// accumulates every failure for the end-of-run log. Failures never abort
/// the run; they surface only in the log.
pub struct Coordinator {
    layout: OutputLayout,
    failures: FailureLog,
}

impl Coordinator {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            failures: FailureLog::new(),
        }
    }

    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Process every item, then flush the failure log.
    pub async fn run<S: SiteClient>(
        &mut self,
        client: &S,
        items: &[WorkItem],
    ) -> Result<RunSummary, AcquireError> {
        let mut summary = RunSummary {
            items: items.len(),
            ..Default::default()
        };

        for item in items {
            tracing::info!(url = %item.url, kinds = item.kinds.len(), "Processing URL");
            let outcome = self.process_item(client, item).await;
            match outcome.state {
                ItemState::Failed => summary.failed += 1,
                _ => summary.done += 1,
            }
            summary.files_written += outcome.written.len();
        }

        summary.failures_recorded = self.failures.len();

        let log_path = self.layout.failure_log_path();
        self.failures.write_to(&log_path)?;
        tracing::info!(
            path = %log_path.display(),
            failures = self.failures.len(),
            "Wrote failure log"
        );

        Ok(summary)
    }

    /// Drive one work item through the state machine. The text pipeline
    /// (rendered page) and media pipeline (plain fetch) run independently;
    /// either failing outright gates the item to the failed state.
    pub async fn process_item<S: SiteClient>(
        &mut self,
        client: &S,
        item: &WorkItem,
    ) -> ItemOutcome {
        let mut outcome = ItemOutcome {
            url: item.url.clone(),
            state: ItemState::Pending,
            written: Vec::new(),
            failed: Vec::new(),
        };

        let text_kinds = item.text_kinds();
        let media_kinds = item.media_kinds();
        let mut page_title: Option<String> = None;
        let mut gate_failed = false;

        if !text_kinds.is_empty() {
            transition(&mut outcome, ItemState::Loading);
            match client.render_page(&item.url).await {
                Ok(page) => {
                    transition(&mut outcome, ItemState::Extracting);
                    let fields = extract::page_fields(&page);
                    page_title = Some(fields.title.clone());
                    transition(&mut outcome, ItemState::Writing);
                    self.write_text_outputs(&text_kinds, &fields, &mut outcome);
                }
                Err(e) => {
                    // Nothing text-derived can proceed without the page;
                    // one record covers all requested text kinds.
                    self.fail_gate(&mut outcome, &item.url, &e.to_string(), &text_kinds);
                    gate_failed = true;
                }
            }
        }

        if !media_kinds.is_empty() {
            if outcome.state == ItemState::Pending {
                transition(&mut outcome, ItemState::Loading);
            }
            match client.locate_media(&item.url).await {
                Ok(media) => {
                    if outcome.state != ItemState::Writing {
                        transition(&mut outcome, ItemState::Writing);
                    }
                    self.download_media_outputs(
                        client,
                        &media_kinds,
                        &media,
                        page_title.as_deref(),
                        &mut outcome,
                    )
                    .await;
                }
                Err(e) => {
                    let identifier = match &page_title {
                        Some(title) => sanitize_filename(title),
                        None => item.url.clone(),
                    };
                    self.fail_gate(&mut outcome, &identifier, &e.to_string(), &media_kinds);
                    gate_failed = true;
                }
            }
        }

        let terminal = if gate_failed {
            ItemState::Failed
        } else {
            ItemState::Done
        };
        transition(&mut outcome, terminal);
        tracing::info!(
            url = %item.url,
            state = %outcome.state,
            written = outcome.written.len(),
            failed = outcome.failed.len(),
            "Finished item"
        );
        outcome
    }

    fn write_text_outputs(
        &mut self,
        kinds: &[OutputKind],
        fields: &PageFields,
        outcome: &mut ItemOutcome,
    ) {
        let title = sanitize_filename(&fields.title);

        for &kind in kinds {
            let text = match kind {
                OutputKind::Html => Some(fields.html.clone()),
                OutputKind::Lyrics => fields.lyrics.as_deref().map(output::clean_lyrics),
                OutputKind::Prompt => fields.prompt.clone(),
                _ => None,
            };

            match text {
                Some(text) => {
                    let dir = self.layout.dir_for(kind);
                    match output::write_text(&dir, &kind.file_name(&title), &text) {
                        Ok(_) => outcome.written.push(kind),
                        Err(e) => self.fail_kind(outcome, &title, &e.to_string(), kind),
                    }
                }
                None => {
                    let reason = AcquireError::Extraction(kind.label().to_string()).to_string();
                    self.fail_kind(outcome, &title, &reason, kind);
                }
            }
        }
    }

    async fn download_media_outputs<S: SiteClient>(
        &mut self,
        client: &S,
        kinds: &[OutputKind],
        media: &MediaPage,
        page_title: Option<&str>,
        outcome: &mut ItemOutcome,
    ) {
        // Media-only runs never rendered the page, so the plain-fetched
        // document's title has to name the files.
        let title = page_title
            .map(str::to_string)
            .or_else(|| media.title.clone())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let title = sanitize_filename(&title);

        for &kind in kinds {
            match media.urls.url_for(kind) {
                Some(remote) => {
                    let dir = self.layout.dir_for(kind);
                    let dest = output::unique_path(&dir, &kind.file_name(&title));
                    match client.download(remote, &dest).await {
                        Ok(()) => outcome.written.push(kind),
                        Err(e) => self.fail_kind(outcome, &title, &e.to_string(), kind),
                    }
                }
                None => {
                    let reason = AcquireError::NotFound(kind.label().to_string()).to_string();
                    self.fail_kind(outcome, &title, &reason, kind);
                }
            }
        }
    }

    /// A gating fetch failed: one record covers every kind it blocked.
    fn fail_gate(
        &mut self,
        outcome: &mut ItemOutcome,
        identifier: &str,
        reason: &str,
        kinds: &[OutputKind],
    ) {
        tracing::warn!(item = %identifier, reason = %reason, "Recording failure");
        self.failures.record(identifier, reason);
        outcome.failed.extend_from_slice(kinds);
    }

    /// One requested kind failed; the rest of the item proceeds.
    fn fail_kind(
        &mut self,
        outcome: &mut ItemOutcome,
        identifier: &str,
        reason: &str,
        kind: OutputKind,
    ) {
        tracing::warn!(item = %identifier, kind = %kind, reason = %reason, "Recording failure");
        self.failures.record(identifier, reason);
        outcome.failed.push(kind);
    }
}

fn transition(outcome: &mut ItemOutcome, next: ItemState) {
    tracing::debug!(url = %outcome.url, from = %outcome.state, to = %next, "State");
    outcome.state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SiteClient;
    use async_trait::async_trait;
    use std::path::Path;
    use sunodl_model::page::{MediaUrls, RenderedPage};

    /// Fake collaborator: None in a slot makes that call fail.
    struct FakeClient {
        page: Option<RenderedPage>,
        media: Option<MediaPage>,
        download_ok: bool,
    }

    #[async_trait]
    impl SiteClient for FakeClient {
        async fn render_page(&self, _url: &str) -> Result<RenderedPage, AcquireError> {
            self.page
                .clone()
                .ok_or_else(|| AcquireError::Load("timeout".to_string()))
        }

        async fn locate_media(&self, _url: &str) -> Result<MediaPage, AcquireError> {
            self.media
                .clone()
                .ok_or_else(|| AcquireError::Load("fetch failed".to_string()))
        }

        async fn download(&self, _url: &str, dest: &Path) -> Result<(), AcquireError> {
            if self.download_ok {
                std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
                std::fs::write(dest, b"data").unwrap();
                Ok(())
            } else {
                Err(AcquireError::Download("connection reset".to_string()))
            }
        }
    }

    const PROMPT_HTML: &str = r#"<html><head>
    <script type="application/json">{"gpt_description_prompt":"Upbeat electro swing song. Listen and make your own with Suno."}</script>
    </head><body></body></html>"#;

    fn full_page() -> RenderedPage {
        RenderedPage {
            title: Some("Neon Nights".to_string()),
            html: PROMPT_HTML.to_string(),
            lyrics: Some("[Verse]\nNeon lights".to_string()),
        }
    }

    fn full_media() -> MediaPage {
        MediaPage {
            title: Some("Neon Nights".to_string()),
            urls: MediaUrls {
                video: Some("https://cdn.example.com/a.mp4".to_string()),
                audio: Some("https://cdn.example.com/a.mp3".to_string()),
                image: Some("https://cdn.example.com/image_large_a.jpeg".to_string()),
            },
        }
    }

    fn coordinator() -> (Coordinator, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::new(OutputLayout::new(dir.path()));
        (coordinator, dir)
    }

    #[tokio::test]
    async fn test_all_kinds_succeed() {
        let (mut coordinator, dir) = coordinator();
        let client = FakeClient {
            page: Some(full_page()),
            media: Some(full_media()),
            download_ok: true,
        };
        let item = WorkItem::new("https://suno.com/song/aaa", &OutputKind::ALL);

        let outcome = coordinator.process_item(&client, &item).await;

        assert_eq!(outcome.state, ItemState::Done);
        assert_eq!(outcome.written.len(), 6);
        assert!(outcome.failed.is_empty());
        assert!(coordinator.failures().is_empty());

        assert!(dir.path().join("HTML/Neon Nights - Parsed.html").exists());
        assert!(dir.path().join("Lyrics/Neon Nights - Lyrics.txt").exists());
        assert!(dir.path().join("Prompts/Neon Nights - Prompt.txt").exists());
        assert!(dir.path().join("Videos/Neon Nights.mp4").exists());
        assert!(dir.path().join("Audio/Neon Nights.mp3").exists());
        assert!(dir.path().join("Images/Neon Nights - Art.jpeg").exists());

        let prompt =
            std::fs::read_to_string(dir.path().join("Prompts/Neon Nights - Prompt.txt")).unwrap();
        assert_eq!(prompt, "Upbeat electro swing");
    }

    #[tokio::test]
    async fn test_load_failure_gates_text_but_not_media() {
        let (mut coordinator, dir) = coordinator();
        let client = FakeClient {
            page: None,
            media: Some(full_media()),
            download_ok: true,
        };
        let item = WorkItem::new(
            "https://suno.com/song/bbb",
            &[OutputKind::Lyrics, OutputKind::Image],
        );

        let outcome = coordinator.process_item(&client, &item).await;

        assert_eq!(outcome.state, ItemState::Failed);
        assert_eq!(outcome.written, vec![OutputKind::Image]);
        assert_eq!(outcome.failed, vec![OutputKind::Lyrics]);
        assert_eq!(outcome.written.len() + outcome.failed.len(), item.kinds.len());

        // One record for the gate, identified by URL since no title exists.
        let records = coordinator.failures().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "https://suno.com/song/bbb");
        assert_eq!(records[0].reason, "LoadError: timeout");

        assert!(dir.path().join("Images/Neon Nights - Art.jpeg").exists());
    }

    #[tokio::test]
    async fn test_missing_lyrics_and_prompt_record_extraction_failures() {
        let (mut coordinator, _dir) = coordinator();
        let client = FakeClient {
            page: Some(RenderedPage {
                title: Some("Quiet Track".to_string()),
                html: "<html><head></head><body></body></html>".to_string(),
                lyrics: None,
            }),
            media: None,
            download_ok: true,
        };
        let item = WorkItem::new(
            "https://suno.com/song/ccc",
            &[OutputKind::Html, OutputKind::Lyrics, OutputKind::Prompt],
        );

        let outcome = coordinator.process_item(&client, &item).await;

        // The page loaded, so missing fields do not fail the item.
        assert_eq!(outcome.state, ItemState::Done);
        assert_eq!(outcome.written, vec![OutputKind::Html]);
        assert_eq!(outcome.failed, vec![OutputKind::Lyrics, OutputKind::Prompt]);

        let reasons: Vec<&str> = coordinator
            .failures()
            .records()
            .iter()
            .map(|r| r.reason.as_str())
            .collect();
        assert_eq!(
            reasons,
            vec!["ExtractionError: lyrics", "ExtractionError: prompt"]
        );
    }

    #[tokio::test]
    async fn test_no_matching_image_is_not_found() {
        let (mut coordinator, _dir) = coordinator();
        let client = FakeClient {
            page: None,
            media: Some(MediaPage {
                title: Some("Coverless".to_string()),
                urls: MediaUrls {
                    video: None,
                    audio: Some("https://cdn.example.com/c.mp3".to_string()),
                    image: None,
                },
            }),
            download_ok: true,
        };
        let item = WorkItem::new(
            "https://suno.com/song/ddd",
            &[OutputKind::Audio, OutputKind::Image],
        );

        let outcome = coordinator.process_item(&client, &item).await;

        assert_eq!(outcome.state, ItemState::Done);
        assert_eq!(outcome.written, vec![OutputKind::Audio]);
        assert_eq!(outcome.failed, vec![OutputKind::Image]);

        let records = coordinator.failures().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "Coverless");
        assert_eq!(records[0].reason, "NotFoundError: image");
    }

    #[tokio::test]
    async fn test_media_fetch_failure_gates_media_kinds() {
        let (mut coordinator, _dir) = coordinator();
        let client = FakeClient {
            page: Some(full_page()),
            media: None,
            download_ok: true,
        };
        let item = WorkItem::new(
            "https://suno.com/song/eee",
            &[OutputKind::Lyrics, OutputKind::Video, OutputKind::Audio],
        );

        let outcome = coordinator.process_item(&client, &item).await;

        assert_eq!(outcome.state, ItemState::Failed);
        assert_eq!(outcome.written, vec![OutputKind::Lyrics]);
        assert_eq!(outcome.failed, vec![OutputKind::Video, OutputKind::Audio]);

        // One record covering both media kinds, identified by the title
        // the text pipeline established.
        let records = coordinator.failures().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "Neon Nights");
        assert_eq!(records[0].reason, "LoadError: fetch failed");
    }

    #[tokio::test]
    async fn test_download_failure_recorded_per_kind() {
        let (mut coordinator, dir) = coordinator();
        let client = FakeClient {
            page: None,
            media: Some(full_media()),
            download_ok: false,
        };
        let item = WorkItem::new("https://suno.com/song/fff", &[OutputKind::Audio]);

        let outcome = coordinator.process_item(&client, &item).await;

        assert_eq!(outcome.state, ItemState::Done);
        assert!(outcome.written.is_empty());
        assert_eq!(outcome.failed, vec![OutputKind::Audio]);
        assert!(!dir.path().join("Audio/Neon Nights.mp3").exists());

        let records = coordinator.failures().records();
        assert_eq!(records[0].reason, "DownloadError: connection reset");
    }

    #[tokio::test]
    async fn test_run_writes_failure_log_in_order() {
        let (mut coordinator, dir) = coordinator();
        let client = FakeClient {
            page: None,
            media: None,
            download_ok: true,
        };
        let items = vec![
            WorkItem::new("https://suno.com/song/one", &[OutputKind::Lyrics]),
            WorkItem::new("https://suno.com/song/two", &[OutputKind::Image]),
        ];

        let summary = coordinator.run(&client, &items).await.unwrap();

        assert_eq!(summary.items, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.done, 0);
        assert_eq!(summary.files_written, 0);
        assert_eq!(summary.failures_recorded, 2);

        let log = std::fs::read_to_string(dir.path().join("Logs/failed.txt")).unwrap();
        assert_eq!(
            log,
            "https://suno.com/song/one: LoadError: timeout\n\
             https://suno.com/song/two: LoadError: fetch failed\n"
        );
    }

    /// One client, three URLs: the "dead" one never renders and its plain
    /// fetch fails too; the others fully succeed.
    struct ScriptedClient {
        inner: FakeClient,
    }

    #[async_trait]
    impl SiteClient for ScriptedClient {
        async fn render_page(&self, url: &str) -> Result<RenderedPage, AcquireError> {
            if url.contains("dead") {
                return Err(AcquireError::Load("timeout".to_string()));
            }
            self.inner.render_page(url).await
        }

        async fn locate_media(&self, url: &str) -> Result<MediaPage, AcquireError> {
            if url.contains("dead") {
                return Err(AcquireError::Load("fetch failed".to_string()));
            }
            self.inner.locate_media(url).await
        }

        async fn download(&self, url: &str, dest: &Path) -> Result<(), AcquireError> {
            self.inner.download(url, dest).await
        }
    }

    #[tokio::test]
    async fn test_end_to_end_three_urls_one_dead() {
        let (mut coordinator, dir) = coordinator();
        let client = ScriptedClient {
            inner: FakeClient {
                page: Some(full_page()),
                media: Some(full_media()),
                download_ok: true,
            },
        };
        let kinds = [OutputKind::Lyrics, OutputKind::Image];
        let items = vec![
            WorkItem::new("https://suno.com/song/one", &kinds),
            WorkItem::new("https://suno.com/song/dead", &kinds),
            WorkItem::new("https://suno.com/song/two", &kinds),
        ];

        let summary = coordinator.run(&client, &items).await.unwrap();

        assert_eq!(summary.items, 3);
        assert_eq!(summary.done, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.files_written, 4);

        // Two lyrics files and two image files: the healthy URLs collide
        // on the same title, so the second image gets a counter suffix.
        assert!(dir.path().join("Lyrics/Neon Nights - Lyrics.txt").exists());
        assert!(dir.path().join("Images/Neon Nights - Art.jpeg").exists());
        assert!(dir.path().join("Images/Neon Nights - Art (1).jpeg").exists());

        // The dead URL is covered for both requested kinds.
        let log = std::fs::read_to_string(dir.path().join("Logs/failed.txt")).unwrap();
        assert_eq!(
            log,
            "https://suno.com/song/dead: LoadError: timeout\n\
             https://suno.com/song/dead: LoadError: fetch failed\n"
        );
    }

    #[tokio::test]
    async fn test_outputs_plus_failures_equal_requested_kinds() {
        // Mixed case: lyrics ok, prompt missing, audio ok, image absent.
        let (mut coordinator, _dir) = coordinator();
        let client = FakeClient {
            page: Some(RenderedPage {
                title: Some("Mixed".to_string()),
                html: "<html></html>".to_string(),
                lyrics: Some("la".to_string()),
            }),
            media: Some(MediaPage {
                title: None,
                urls: MediaUrls {
                    video: None,
                    audio: Some("https://cdn.example.com/m.mp3".to_string()),
                    image: None,
                },
            }),
            download_ok: true,
        };
        let item = WorkItem::new(
            "https://suno.com/song/ggg",
            &[
                OutputKind::Lyrics,
                OutputKind::Prompt,
                OutputKind::Audio,
                OutputKind::Image,
            ],
        );

        let outcome = coordinator.process_item(&client, &item).await;

        assert_eq!(outcome.state, ItemState::Done);
        assert_eq!(
            outcome.written.len() + outcome.failed.len(),
            item.kinds.len()
        );
        assert_eq!(outcome.written, vec![OutputKind::Lyrics, OutputKind::Audio]);
        assert_eq!(outcome.failed, vec![OutputKind::Prompt, OutputKind::Image]);
    }
}
