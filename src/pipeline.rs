//! Sequential chapter pipeline: fetch, extract, translate, write.
//!
//! A failure inside one chapter is logged and counted; only problems with the
//! output directory or the index page end the run.

use crate::config::RunConfig;
use crate::console::Console;
use crate::error::RunError;
use crate::fetcher::PageFetcher;
use crate::pacing::Pacer;
use crate::scrapers::{ChapterReference, SiteRules, extract, parse_index};
use crate::translator::Translator;
use crate::writer::{ensure_dir, write_chapter};
use std::fmt;
use std::path::PathBuf;

/// What happened to a single chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// The chapter file was written.
    Written(PathBuf),
    /// The page had no recognizable story text.
    Skipped(String),
    /// Fetching or writing failed.
    Failed(String),
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Chapters listed on the index page.
    pub discovered: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ChapterOutcome) {
        match outcome {
            ChapterOutcome::Written(_) => self.written += 1,
            ChapterOutcome::Skipped(_) => self.skipped += 1,
            ChapterOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Chapters attempted in this run.
    pub fn attempted(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} skipped, {} failed ({} of {} chapters attempted)",
            self.written,
            self.skipped,
            self.failed,
            self.attempted(),
            self.discovered
        )
    }
}

/// Drives one run over the chapters of an index page.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    rules: &'a SiteRules,
    fetcher: &'a dyn PageFetcher,
    translator: Option<&'a Translator>,
    pacer: &'a dyn Pacer,
    console: Console,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline without translation.
    pub fn new(
        config: &'a RunConfig,
        rules: &'a SiteRules,
        fetcher: &'a dyn PageFetcher,
        pacer: &'a dyn Pacer,
    ) -> Self {
        Self {
            config,
            rules,
            fetcher,
            translator: None,
            pacer,
            console: Console::new(),
        }
    }

    /// Sets the translator used when the run has translation enabled.
    pub fn with_translator(mut self, translator: &'a Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replaces the console (e.g. to force colors off).
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Runs the whole pipeline and returns the totals.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let config = self.config;

        ensure_dir(&config.output_dir)
            .await
            .map_err(RunError::OutputDir)?;

        self.console
            .step(&format!("Fetching chapter index {}", config.index_url));
        let index_html = self
            .fetcher
            .fetch(config.index_url.as_str())
            .await
            .map_err(RunError::IndexFetch)?;

        let chapters = parse_index(&index_html, &config.index_url, self.rules)?;
        let total = chapters.len();
        self.console
            .success(&format!("Found {} chapters", self.console.count(total)));

        let mut summary = RunSummary {
            discovered: total,
            ..RunSummary::default()
        };

        let skip = config.start.saturating_sub(1) as usize;
        if skip >= total {
            self.console.warning(&format!(
                "Start chapter {} is beyond the last chapter ({}); nothing to do",
                config.start, total
            ));
            return Ok(summary);
        }

        let limit = config.max_chapters.map_or(usize::MAX, |n| n as usize);
        for chapter in chapters.iter().skip(skip).take(limit) {
            self.console.section(&format!(
                "Chapter {}/{}: {}",
                chapter.ordinal, total, chapter.title
            ));

            let outcome = self.process_chapter(chapter).await;
            self.report(chapter, &outcome);
            summary.record(&outcome);

            self.pacer.pause(config.request_delay).await;
        }

        self.console.section("Summary");
        self.console.info(&summary.to_string());

        Ok(summary)
    }

    async fn process_chapter(&self, chapter: &ChapterReference) -> ChapterOutcome {
        let html = match self.fetcher.fetch(&chapter.url).await {
            Ok(html) => html,
            Err(e) => return ChapterOutcome::Failed(e.to_string()),
        };

        let content = match extract(&html, self.rules) {
            Ok(content) => content,
            Err(e) => return ChapterOutcome::Skipped(e.to_string()),
        };
        self.console.info(&format!(
            "Extracted {} lines{}",
            content.paragraphs.len(),
            if content.title.is_empty() {
                String::new()
            } else {
                format!(" from 「{}」", content.title)
            }
        ));

        let translator = self.active_translator();
        let lines = match translator {
            Some(translator) => {
                self.console.step(&format!(
                    "Translating {} → {} with {}",
                    self.config.source_lang,
                    self.config.target_lang,
                    translator.backend_name()
                ));
                translator.translate(&content.paragraphs).await
            }
            None => content.paragraphs,
        };

        match write_chapter(
            &self.config.output_dir,
            chapter.ordinal,
            &chapter.title,
            translator.map(|_| self.config.target_lang.as_str()),
            &lines.join("\n"),
        )
        .await
        {
            Ok(path) => ChapterOutcome::Written(path),
            Err(e) => ChapterOutcome::Failed(e.to_string()),
        }
    }

    /// The translator to use, if translation is on and one was supplied.
    /// Output files carry the language suffix only when this is `Some`.
    fn active_translator(&self) -> Option<&'a Translator> {
        if self.config.translate {
            self.translator
        } else {
            None
        }
    }

    fn report(&self, chapter: &ChapterReference, outcome: &ChapterOutcome) {
        match outcome {
            ChapterOutcome::Written(path) => {
                self.console
                    .success(&format!("Saved file: {}", path.display()));
            }
            ChapterOutcome::Skipped(reason) => {
                self.console.warning(&format!(
                    "Skipping chapter {} ({}): {}",
                    chapter.ordinal, chapter.url, reason
                ));
            }
            ChapterOutcome::Failed(reason) => {
                self.console.error(&format!(
                    "Chapter {} ({}) failed: {}",
                    chapter.ordinal, chapter.url, reason
                ));
            }
        }
    }
}
