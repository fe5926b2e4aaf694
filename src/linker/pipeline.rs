//! Link-generation pipeline
//!
//! One long asynchronous pass: scan → resolve → index → write back. The
//! suspension points are each note read, each lookup call, and each note
//! write; nothing runs concurrently with anything else. A busy flag
//! rejects re-entrant invocation; a new trigger while a run is in progress
//! gets a notice instead of being queued. Cancellation mid-run is not
//! supported — a run completes or fails outright, and the flag is cleared
//! on every exit path.

use super::indexer;
use super::resolver;
use super::types::{LinkError, LinkerConfig, PaperInfo, RunSummary};
use crate::lookup::MetadataSource;
use crate::meta;
use crate::progress::StatusSink;
use crate::vault::VaultStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// The pipeline-owning object.
///
/// Holds the vault, the lookup source, the status sink, and the config.
/// `generate` is the single entry point; the busy flag has exactly two
/// transitions, idle→running at entry and running→idle on exit.
pub struct LinkGenerator {
    vault: Arc<dyn VaultStore>,
    source: Arc<dyn MetadataSource>,
    status: Arc<dyn StatusSink>,
    config: LinkerConfig,
    running: AtomicBool,
}

/// Clears the busy flag on every exit path, including errors.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl LinkGenerator {
    pub fn new(
        vault: Arc<dyn VaultStore>,
        source: Arc<dyn MetadataSource>,
        status: Arc<dyn StatusSink>,
        config: LinkerConfig,
    ) -> Self {
        Self {
            vault,
            source,
            status,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Run one full link-generation pass over the vault.
    ///
    /// Rejected with [`LinkError::AlreadyRunning`] when a pass is already
    /// in progress. Per-note failures degrade to warnings; only a vault
    /// enumeration failure aborts the run.
    pub async fn generate(&self) -> Result<RunSummary, LinkError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.status
                .notify("Link generation is already running; check the status for progress.");
            return Err(LinkError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let result = self.run().await;
        self.status.set_status("");
        result
    }

    async fn run(&self) -> Result<RunSummary, LinkError> {
        let notes = self.vault.list_notes()?;
        info!(total = notes.len(), "scanning vault");

        // Scan: collect qualifying notes into the batch
        let mut papers: Vec<PaperInfo> = Vec::new();
        for (i, note) in notes.iter().enumerate() {
            self.status
                .set_status(&format!("Scanning notes {}/{}", i + 1, notes.len()));

            let text = match self.vault.read(note).await {
                Ok(text) => text,
                Err(e) => {
                    self.status
                        .warn(&format!("cannot read '{}': {}", note.name, e));
                    continue;
                }
            };

            let fields = meta::parse_block(&text);
            let Some(raw_doi) = fields.get(meta::DOI_KEY) else {
                continue;
            };
            let doi = meta::unwrap_link(raw_doi);
            if doi.is_empty() {
                continue;
            }

            let mut paper = PaperInfo::new(note.clone(), doi);
            if let Some(refs) = fields.get(meta::REFS_KEY) {
                paper.references = meta::parse_ref_list(refs);
            }
            if let Some(year) = fields.get(meta::YEAR_KEY) {
                paper
                    .extra_fields
                    .insert(meta::YEAR_KEY.to_string(), year.clone());
            }
            papers.push(paper);
        }
        info!(qualifying = papers.len(), "scan complete");

        // Resolve: sequential lookups where local data is insufficient
        let looked_up = resolver::resolve_references(
            &mut papers,
            self.source.as_ref(),
            &self.config,
            self.status.as_ref(),
        )
        .await;

        // Index and cross-reference
        self.status.set_status("Computing in-vault links...");
        let (index, duplicate_dois) = indexer::build_index(&papers, self.status.as_ref());
        indexer::compute_links(&mut papers, &index);

        // Write back: re-read each note immediately before writing so the
        // replacement span comes from current text, not the scan cache
        self.status.set_status("Updating meta blocks...");
        let mut skipped_writes = 0;
        for i in 0..papers.len() {
            let paper = &papers[i];
            let text = match self.vault.read(&paper.note).await {
                Ok(text) => text,
                Err(e) => {
                    self.status
                        .warn(&format!("cannot re-read '{}': {}", paper.note.name, e));
                    skipped_writes += 1;
                    continue;
                }
            };

            let link_names: Vec<&str> = paper
                .links
                .iter()
                .map(|&target| papers[target].note.name.as_str())
                .collect();
            let year = if self.config.fetch_year {
                paper.year()
            } else {
                None
            };
            let block = meta::render_block(&paper.doi, year, &paper.references, &link_names);

            match meta::replace_block(&text, &block) {
                Some(updated) => {
                    if let Err(e) = self.vault.write(&paper.note, &updated).await {
                        self.status
                            .warn(&format!("cannot write '{}': {}", paper.note.name, e));
                        skipped_writes += 1;
                    } else {
                        debug!(note = %paper.note.name, "meta block updated");
                    }
                }
                None => {
                    self.status.warn(&format!(
                        "meta block missing in '{}' at write time; note left unmodified",
                        paper.note.name
                    ));
                    skipped_writes += 1;
                }
            }
        }

        let summary = RunSummary {
            processed: papers.len(),
            looked_up,
            duplicate_dois,
            skipped_writes,
        };
        self.status.notify(&format!(
            "Link generation complete: {} notes processed.",
            summary.processed
        ));
        info!(?summary, "run complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{WorkMetadata, WorkReference};
    use crate::progress::NullStatus;
    use crate::vault::{NoteHandle, VaultError, VaultResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory vault for pipeline tests.
    struct MemoryVault {
        notes: Vec<NoteHandle>,
        contents: Mutex<HashMap<String, String>>,
    }

    impl MemoryVault {
        fn new(files: &[(&str, &str)]) -> Self {
            let notes = files
                .iter()
                .map(|(name, _)| NoteHandle::new(format!("/vault/{}.md", name)))
                .collect();
            let contents = files
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect();
            Self {
                notes,
                contents: Mutex::new(contents),
            }
        }

        fn content(&self, name: &str) -> String {
            self.contents.lock().unwrap().get(name).unwrap().clone()
        }
    }

    #[async_trait]
    impl VaultStore for MemoryVault {
        fn list_notes(&self) -> VaultResult<Vec<NoteHandle>> {
            Ok(self.notes.clone())
        }

        async fn read(&self, note: &NoteHandle) -> VaultResult<String> {
            self.contents
                .lock()
                .unwrap()
                .get(&note.name)
                .cloned()
                .ok_or_else(|| {
                    VaultError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        note.name.clone(),
                    ))
                })
        }

        async fn write(&self, note: &NoteHandle, content: &str) -> VaultResult<()> {
            self.contents
                .lock()
                .unwrap()
                .insert(note.name.clone(), content.to_string());
            Ok(())
        }
    }

    /// Vault whose enumeration always fails.
    struct BrokenVault;

    #[async_trait]
    impl VaultStore for BrokenVault {
        fn list_notes(&self) -> VaultResult<Vec<NoteHandle>> {
            Err(VaultError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "vault unavailable",
            )))
        }

        async fn read(&self, _note: &NoteHandle) -> VaultResult<String> {
            unreachable!()
        }

        async fn write(&self, _note: &NoteHandle, _content: &str) -> VaultResult<()> {
            unreachable!()
        }
    }

    struct EmptySource;

    #[async_trait]
    impl MetadataSource for EmptySource {
        async fn lookup(&self, _doi: &str) -> Option<WorkMetadata> {
            None
        }
    }

    struct ScriptedSource {
        works: HashMap<String, WorkMetadata>,
    }

    #[async_trait]
    impl MetadataSource for ScriptedSource {
        async fn lookup(&self, doi: &str) -> Option<WorkMetadata> {
            self.works.get(doi).cloned()
        }
    }

    fn generator(vault: Arc<dyn VaultStore>, source: Arc<dyn MetadataSource>) -> LinkGenerator {
        LinkGenerator::new(vault, source, Arc::new(NullStatus), LinkerConfig::default())
    }

    #[tokio::test]
    async fn test_generates_links_between_notes() {
        let vault = Arc::new(MemoryVault::new(&[
            ("a", "# Meta\ndoi: 10.1/a\nrefs: 10.1/b\n\nBody of a.\n"),
            ("b", "# Meta\ndoi: 10.1/b\nrefs: 10.1/x\n\nBody of b.\n"),
        ]));
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        let summary = gen.generate().await.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped_writes, 0);

        let a = vault.content("a");
        assert!(a.contains("links: [[b]]"), "a was: {}", a);
        assert!(a.contains("refs: 10.1/b"));
        assert!(a.ends_with("\nBody of a.\n"));

        // b's only reference is not in the vault: refs kept, no links line
        let b = vault.content("b");
        assert!(b.contains("refs: 10.1/x"));
        assert!(!b.contains("links:"));
    }

    #[tokio::test]
    async fn test_note_without_block_is_untouched() {
        let original = "Just prose, no block.\n";
        let vault = Arc::new(MemoryVault::new(&[
            ("plain", original),
            ("a", "# Meta\ndoi: 10.1/a\nrefs: 10.1/b\n"),
        ]));
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        let summary = gen.generate().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(vault.content("plain"), original);
    }

    #[tokio::test]
    async fn test_note_without_doi_is_excluded() {
        let vault = Arc::new(MemoryVault::new(&[(
            "nodoi",
            "# Meta\ntitle: something\n",
        )]));
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        let summary = gen.generate().await.unwrap();
        assert_eq!(summary.processed, 0);
        assert_eq!(vault.content("nodoi"), "# Meta\ntitle: something\n");
    }

    #[tokio::test]
    async fn test_linked_doi_unwrapped_from_markdown_link() {
        let vault = Arc::new(MemoryVault::new(&[
            ("a", "# Meta\ndoi: [10.1/a](https://doi.org/10.1/a)\nrefs: 10.1/b\n"),
            ("b", "# Meta\ndoi: 10.1/b\nrefs: 10.1/a\n"),
        ]));
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        gen.generate().await.unwrap();

        // The bare identifier is what gets indexed and rewritten
        assert!(vault.content("a").contains("doi: 10.1/a\n"));
        assert!(vault.content("b").contains("links: [[a]]"));
    }

    #[tokio::test]
    async fn test_fetch_year_enrichment_persisted() {
        let vault = Arc::new(MemoryVault::new(&[(
            "a",
            "# Meta\ndoi: 10.1/a\n\nBody.\n",
        )]));
        let source = ScriptedSource {
            works: HashMap::from([(
                "10.1/a".to_string(),
                WorkMetadata {
                    references: vec![WorkReference {
                        doi: Some("10.1/b".to_string()),
                    }],
                    issued_year: Some(2017),
                },
            )]),
        };
        let gen = LinkGenerator::new(
            vault.clone(),
            Arc::new(source),
            Arc::new(NullStatus),
            LinkerConfig { fetch_year: true },
        );

        gen.generate().await.unwrap();

        let a = vault.content("a");
        assert!(a.contains("year: 2017"), "a was: {}", a);
        assert!(a.contains("refs: 10.1/b"));
    }

    #[tokio::test]
    async fn test_year_not_written_when_not_configured() {
        let vault = Arc::new(MemoryVault::new(&[(
            "a",
            "# Meta\ndoi: 10.1/a\nyear: 2015\nrefs: 10.1/b\n",
        )]));
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        gen.generate().await.unwrap();
        assert!(!vault.content("a").contains("year:"));
    }

    /// Vault that simulates a concurrent external edit: the first read of
    /// each note returns the original text, later reads return text whose
    /// meta block has been removed.
    struct EditedUnderneathVault {
        note: NoteHandle,
        reads: Mutex<usize>,
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VaultStore for EditedUnderneathVault {
        fn list_notes(&self) -> VaultResult<Vec<NoteHandle>> {
            Ok(vec![self.note.clone()])
        }

        async fn read(&self, _note: &NoteHandle) -> VaultResult<String> {
            let mut reads = self.reads.lock().unwrap();
            *reads += 1;
            if *reads == 1 {
                Ok("# Meta\ndoi: 10.1/a\nrefs: 10.1/b\n".to_string())
            } else {
                Ok("block removed by an external edit\n".to_string())
            }
        }

        async fn write(&self, _note: &NoteHandle, content: &str) -> VaultResult<()> {
            self.writes.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_block_missing_at_write_time_skips_note() {
        let vault = Arc::new(EditedUnderneathVault {
            note: NoteHandle::new("/vault/a.md"),
            reads: Mutex::new(0),
            writes: Mutex::new(Vec::new()),
        });
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        let summary = gen.generate().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped_writes, 1);
        // Nothing was written: the note is left exactly as the editor left it
        assert!(vault.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enumeration_failure_aborts_and_clears_flag() {
        let gen = generator(Arc::new(BrokenVault), Arc::new(EmptySource));

        let err = gen.generate().await.unwrap_err();
        assert!(matches!(err, LinkError::Vault(_)));

        // The busy flag was cleared: the next failure is again Vault, not
        // AlreadyRunning
        let err = gen.generate().await.unwrap_err();
        assert!(matches!(err, LinkError::Vault(_)));
    }

    #[tokio::test]
    async fn test_sequential_runs_allowed() {
        let vault = Arc::new(MemoryVault::new(&[(
            "a",
            "# Meta\ndoi: 10.1/a\nrefs: 10.1/b\n",
        )]));
        let gen = generator(vault, Arc::new(EmptySource));

        gen.generate().await.unwrap();
        gen.generate().await.unwrap();
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let vault = Arc::new(MemoryVault::new(&[
            ("a", "intro\n\n# Meta\ndoi: 10.1/a\nrefs: 10.1/b\n\noutro\n"),
            ("b", "# Meta\ndoi: 10.1/b\nrefs: 10.1/a\n"),
        ]));
        let gen = generator(vault.clone(), Arc::new(EmptySource));

        gen.generate().await.unwrap();
        let first = (vault.content("a"), vault.content("b"));
        gen.generate().await.unwrap();
        let second = (vault.content("a"), vault.content("b"));
        assert_eq!(first, second);
    }
}
