//! The question/answer corpus.
//!
//! A [`Corpus`] is built once at startup and never mutated. Questions and
//! answers are kept as two parallel sequences, alongside the normalized
//! question text and token sets every scorer compares against.
//!
//! Duplicate questions are allowed. Lookups that return "the first match"
//! resolve duplicates by corpus order.

use std::collections::HashSet;

use crate::normalize::{normalize, tokenize};

/// One question/answer pair as read from the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
}

impl QaRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Immutable, loaded-once list of question/answer pairs.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    questions: Vec<String>,
    answers: Vec<String>,
    normalized: Vec<String>,
    tokens: Vec<HashSet<String>>,
}

impl Corpus {
    pub fn new(records: impl IntoIterator<Item = QaRecord>) -> Self {
        let mut corpus = Corpus::default();
        for record in records {
            corpus.normalized.push(normalize(&record.question));
            corpus.tokens.push(tokenize(&record.question));
            corpus.questions.push(record.question);
            corpus.answers.push(record.answer);
        }
        corpus
    }

    /// Build a corpus from `(question, answer)` tuples.
    pub fn from_pairs<Q, A>(pairs: impl IntoIterator<Item = (Q, A)>) -> Self
    where
        Q: Into<String>,
        A: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(q, a)| QaRecord::new(q, a)))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    /// Normalized question text, parallel to [`questions`](Corpus::questions).
    pub fn normalized_questions(&self) -> &[String] {
        &self.normalized
    }

    /// Token sets of the normalized questions, parallel to [`questions`](Corpus::questions).
    pub fn question_tokens(&self) -> &[HashSet<String>] {
        &self.tokens
    }

    /// Iterate `(question, answer)` pairs in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }
}
