//! Offline entity recognizer built from regular expressions and small gazetteers.
//!
//! Candidates from every rule are collected, then resolved left to right: the
//! earliest span wins, ties go to the longer span, then to the rule listed
//! first in [`RULE_PRIORITY`]. Overlapping losers are dropped.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::ports::EntityRecognizerPort;
use crate::domain::{EntitySpan, EntityType};
use crate::error::Result;

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";

const GIVEN_NAMES: &[&str] = &[
    "John", "Sarah", "Tom", "Jane", "Michael", "Emily", "David", "Maria", "James", "Anna",
    "Robert", "Laura", "William", "Linda", "Richard", "Susan", "Daniel", "Karen", "Peter", "Lisa",
    "Paul", "Mary", "Mark", "Emma", "Alex", "Olivia", "Chris", "Sophia", "Kevin", "Rachel",
];

const PLACES: &[&str] = &[
    "United States", "United Kingdom", "New York", "Los Angeles", "San Francisco", "Hong Kong",
    "USA", "UK", "Canada", "Mexico", "Brazil", "France", "Germany", "Spain", "Italy", "India",
    "China", "Japan", "Australia", "London", "Paris", "Berlin", "Madrid", "Rome", "Tokyo",
    "Toronto", "Chicago", "Boston", "Seattle", "Austin", "Texas", "California", "Florida",
];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("email regex"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b\d{{4}}-\d{{2}}-\d{{2}}\b|\b\d{{1,2}}/\d{{1,2}}/\d{{2,4}}\b|\b(?:{m})\.? \d{{1,2}}(?:st|nd|rd|th)?,? \d{{4}}\b|\b\d{{1,2}} (?:{m}) \d{{4}}\b",
        m = MONTHS
    ))
    .expect("date regex")
});

static ORG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[A-Z][A-Za-z&]*\s+)+(?:Corp|Corporation|Inc|LLC|Ltd|Co|Company|Group|Bank|University)\b\.?")
        .expect("org regex")
});

static GPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b(?:{})\b", PLACES.join("|"))).expect("gpe regex"));

static PERSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:{})(?:\s+[A-Z][a-z]+)?\b", GIVEN_NAMES.join("|"))).expect("person regex")
});

static CARDINAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(?:[.,]\d+)*\b").expect("cardinal regex"));

/// Rule order doubles as tie-break priority
pub const RULE_PRIORITY: [&str; 6] = ["EMAIL", "DATE", "ORG", "GPE", "PERSON", "CARDINAL"];

#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    priority: usize,
    entity_type: EntityType,
}

#[derive(Debug, Default, Clone)]
pub struct PatternEntityRecognizer;

impl PatternEntityRecognizer {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> Vec<EntitySpan> {
        let rules: [(&Regex, EntityType); 6] = [
            (&EMAIL_RE, EntityType::Email),
            (&DATE_RE, EntityType::Date),
            (&ORG_RE, EntityType::Org),
            (&GPE_RE, EntityType::Gpe),
            (&PERSON_RE, EntityType::Person),
            (&CARDINAL_RE, EntityType::Cardinal),
        ];

        let mut candidates: Vec<Candidate> = rules
            .iter()
            .enumerate()
            .flat_map(|(priority, (re, entity_type))| {
                re.find_iter(text).map(move |m| Candidate {
                    start: m.start(),
                    end: m.end(),
                    priority,
                    entity_type: entity_type.clone(),
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
                .then(a.priority.cmp(&b.priority))
        });

        let mut spans = Vec::new();
        let mut covered_until = 0;
        for candidate in candidates {
            if candidate.start < covered_until {
                continue;
            }
            covered_until = candidate.end;
            spans.push(EntitySpan::new(&text[candidate.start..candidate.end], candidate.entity_type));
        }
        spans
    }
}

#[async_trait]
impl EntityRecognizerPort for PatternEntityRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        Ok(self.extract(text))
    }
}
