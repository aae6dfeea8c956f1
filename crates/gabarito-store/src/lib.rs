//! gabarito-store — Single-slot persistence for the exam collection.
//!
//! The whole collection lives in one JSON file, the file-system analogue of
//! the original browser slot. Reads fail soft: an absent or undecodable
//! slot is an empty collection, never an error. Writes rewrite the entire
//! collection through a temp file in the same directory, so readers never
//! observe a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gabarito_core::model::Exam;

/// File-backed store for the persisted exam collection.
pub struct ExamStore {
    path: PathBuf,
}

impl ExamStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the collection is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection.
    ///
    /// An absent slot or corrupt content degrades to an empty collection;
    /// the decode failure is logged and recovered locally.
    pub fn list(&self) -> Vec<Exam> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&content) {
            Ok(exams) => exams,
            Err(e) => {
                tracing::warn!(
                    "discarding undecodable exam collection at {}: {e}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Look up one exam by id.
    pub fn get(&self, id: &str) -> Option<Exam> {
        self.list().into_iter().find(|e| e.id == id)
    }

    /// Insert or update by id.
    ///
    /// An existing record is replaced in place, keeping its position in the
    /// collection; a new one is appended.
    pub fn upsert(&self, exam: &Exam) -> Result<()> {
        let mut exams = self.list();
        match exams.iter_mut().find(|e| e.id == exam.id) {
            Some(existing) => *existing = exam.clone(),
            None => exams.push(exam.clone()),
        }
        self.write(&exams)
    }

    /// Remove the exam with the given id. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut exams = self.list();
        exams.retain(|e| e.id != id);
        self.write(&exams)
    }

    fn write(&self, exams: &[Exam]) -> Result<()> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create store directory: {}", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(exams)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .context("failed to create temp file for store write")?;
        std::io::Write::write_all(&mut tmp, json.as_bytes())?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to persist store at {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ExamStore {
        ExamStore::new(dir.path().join("exams.json"))
    }

    fn sample_exam(title: &str) -> Exam {
        let mut exam = Exam::new(title);
        let q = exam.add_question();
        q.text = "Pergunta".into();
        q.correct_answer = 'B';
        exam
    }

    #[test]
    fn absent_slot_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).list().is_empty());
    }

    #[test]
    fn corrupt_slot_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{definitely not json]").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn upsert_then_list_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let exam = sample_exam("Prova A");

        store.upsert(&exam).unwrap();
        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, exam.id);
        assert_eq!(listed[0].title, "Prova A");
        assert_eq!(listed[0].questions.len(), 1);
        assert_eq!(listed[0].created_at, exam.created_at);
    }

    #[test]
    fn upsert_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let exam = sample_exam("Prova A");

        store.upsert(&exam).unwrap();
        store.upsert(&exam).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = sample_exam("Primeira");
        let second = sample_exam("Segunda");
        store.upsert(&first).unwrap();
        store.upsert(&second).unwrap();

        let mut updated = first.clone();
        updated.title = "Primeira (revisada)".into();
        store.upsert(&updated).unwrap();

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        // Position preserved, content replaced.
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[0].title, "Primeira (revisada)");
        assert_eq!(listed[1].id, second.id);
    }

    #[test]
    fn remove_filters_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let a = sample_exam("A");
        let b = sample_exam("B");
        store.upsert(&a).unwrap();
        store.upsert(&b).unwrap();

        store.remove(&a.id).unwrap();
        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);

        // Unknown id is a no-op.
        store.remove("nope").unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn get_finds_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let exam = sample_exam("Prova");
        store.upsert(&exam).unwrap();

        assert!(store.get(&exam.id).is_some());
        assert!(store.get("missing").is_none());
    }
}
