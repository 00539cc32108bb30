use std::collections::HashMap;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::db::{
    NewStudent, NewWord, ProgressRecord, RepoResult, Repository, Student, UpsertOutcome, Word,
};

#[derive(Debug, Default)]
struct Store {
    students: Vec<Student>,
    words: Vec<Word>,
    progress: HashMap<(String, String), ProgressRecord>,
}

/// In-process repository. Vectors keep insertion order, which is what word
/// selection relies on.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    fn find_student_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, RepoResult<Option<Student>>> {
        let store = self.store.read();
        let found = store.students.iter().find(|s| s.code == code).cloned();
        future::ready(Ok(found)).boxed()
    }

    fn find_words_by_class<'a>(&'a self, class_name: &'a str) -> BoxFuture<'a, RepoResult<Vec<Word>>> {
        let store = self.store.read();
        let words = store
            .words
            .iter()
            .filter(|w| w.class_name == class_name)
            .cloned()
            .collect();
        future::ready(Ok(words)).boxed()
    }

    fn find_word<'a>(&'a self, word_id: &'a str) -> BoxFuture<'a, RepoResult<Option<Word>>> {
        let store = self.store.read();
        let found = store.words.iter().find(|w| w.id == word_id).cloned();
        future::ready(Ok(found)).boxed()
    }

    fn count_words_by_class<'a>(&'a self, class_name: &'a str) -> BoxFuture<'a, RepoResult<i64>> {
        let store = self.store.read();
        let count = store
            .words
            .iter()
            .filter(|w| w.class_name == class_name)
            .count();
        future::ready(Ok(count as i64)).boxed()
    }

    fn find_progress_by_student<'a>(
        &'a self,
        student_code: &'a str,
    ) -> BoxFuture<'a, RepoResult<Vec<ProgressRecord>>> {
        let store = self.store.read();
        let records = store
            .progress
            .values()
            .filter(|p| p.student_code == student_code)
            .cloned()
            .collect();
        future::ready(Ok(records)).boxed()
    }

    fn find_progress<'a>(
        &'a self,
        student_code: &'a str,
        word_id: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<ProgressRecord>>> {
        let store = self.store.read();
        let found = store
            .progress
            .get(&(student_code.to_string(), word_id.to_string()))
            .cloned();
        future::ready(Ok(found)).boxed()
    }

    fn upsert_progress<'a>(
        &'a self,
        record: &'a ProgressRecord,
        expected_version: Option<i64>,
    ) -> BoxFuture<'a, RepoResult<UpsertOutcome>> {
        let mut store = self.store.write();
        let key = (record.student_code.clone(), record.word_id.clone());
        let current = store.progress.get(&key).map(|p| p.version);

        let outcome = if current == expected_version {
            let mut stored = record.clone();
            if let Some(existing) = store.progress.get(&key) {
                stored.id = existing.id.clone();
            }
            store.progress.insert(key, stored);
            UpsertOutcome::Written
        } else {
            UpsertOutcome::Conflict
        };
        future::ready(Ok(outcome)).boxed()
    }

    fn insert_student<'a>(&'a self, student: &'a NewStudent) -> BoxFuture<'a, RepoResult<bool>> {
        let mut store = self.store.write();
        let exists = store.students.iter().any(|s| s.code == student.code);
        if !exists {
            store.students.push(Student {
                id: Uuid::new_v4().to_string(),
                code: student.code.clone(),
                name: student.name.clone(),
                class_name: student.class_name.clone(),
            });
        }
        future::ready(Ok(!exists)).boxed()
    }

    fn insert_word<'a>(&'a self, word: &'a NewWord) -> BoxFuture<'a, RepoResult<bool>> {
        let mut store = self.store.write();
        let exists = store
            .words
            .iter()
            .any(|w| w.class_name == word.class_name && w.english == word.english);
        if !exists {
            store.words.push(Word {
                id: Uuid::new_v4().to_string(),
                class_name: word.class_name.clone(),
                english: word.english.clone(),
                turkish: word.turkish.clone(),
            });
        }
        future::ready(Ok(!exists)).boxed()
    }

    fn list_students(&self) -> BoxFuture<'_, RepoResult<Vec<Student>>> {
        let students = self.store.read().students.clone();
        future::ready(Ok(students)).boxed()
    }

    fn list_words(&self) -> BoxFuture<'_, RepoResult<Vec<Word>>> {
        let words = self.store.read().words.clone();
        future::ready(Ok(words)).boxed()
    }

    fn ping(&self) -> BoxFuture<'_, RepoResult<()>> {
        future::ready(Ok(())).boxed()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
