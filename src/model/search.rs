//! Text matching and relevance for switcher search.
//!
//! Everything is compared in a folded form: decomposed, stripped of combining
//! marks and lowercased, so "Café" and "cafe" match each other. Queries are
//! split on whitespace and every term has to match (AND semantics).
//! App names additionally match fuzzily through `nucleo-matcher`.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::item::{AppInfo, SystemAction};

pub fn fold(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    terms: Vec<String>,
    joined: String,
}

impl SearchTerms {
    /// Returns `None` for queries without any term.
    pub fn parse(query: &str) -> Option<SearchTerms> {
        let folded = fold(query);
        let terms: Vec<String> = folded.split_whitespace().map(str::to_string).collect();
        if terms.is_empty() {
            return None;
        }
        let joined = terms.join(" ");
        Some(SearchTerms { terms, joined })
    }

    pub fn terms(&self) -> &[String] { &self.terms }

    /// True when every term occurs in at least one of `fields`.
    pub fn match_all<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        self.terms.iter().all(|term| fields.iter().any(|field| field.as_ref().contains(term.as_str())))
    }
}

fn words(field: &str) -> impl Iterator<Item = &str> {
    field.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// 2 when some term starts a word of `field`, 1 for a plain substring hit, 0 otherwise.
pub fn word_relevance(field: &str, terms: &SearchTerms) -> u8 {
    let mut best = 0;
    for term in terms.terms() {
        if words(field).any(|word| word.starts_with(term.as_str())) {
            return 2;
        }
        if field.contains(term.as_str()) {
            best = 1;
        }
    }
    best
}

/// Folded search fields of a window: title first, then the owning app's names.
#[derive(Debug, Clone, Default)]
pub struct WindowFields {
    pub title: String,
    pub app: Vec<String>,
}

impl WindowFields {
    pub fn new(title: &str, app: Option<&AppInfo>, app_name: Option<&str>) -> Self {
        let mut fields = Vec::new();
        if let Some(name) = app_name.or(app.map(|a| a.name.as_str())) {
            fields.push(fold(name));
        }
        if let Some(app) = app {
            fields.extend(app.generic_name.as_deref().map(fold));
            fields.extend(app.executable.as_deref().map(fold));
        }
        WindowFields { title: fold(title), app: fields }
    }

    pub fn matches(&self, terms: &SearchTerms) -> bool {
        terms.terms().iter().all(|term| {
            self.title.contains(term.as_str())
                || self.app.iter().any(|field| field.contains(term.as_str()))
        })
    }

    /// Sort key, higher is better; title relevance outranks app relevance.
    pub fn relevance(&self, terms: &SearchTerms) -> (u8, u8) {
        let title = word_relevance(&self.title, terms);
        let app = self.app.iter().map(|f| word_relevance(f, terms)).max().unwrap_or(0);
        (title, app)
    }
}

/// Fuzzy scorer for app names, one pattern per search term.
pub struct NameMatcher {
    patterns: Vec<Pattern>,
    matcher: Matcher,
    buf: Vec<char>,
}

impl NameMatcher {
    pub fn new(terms: &SearchTerms) -> Self {
        let patterns = terms
            .terms()
            .iter()
            .map(|term| Pattern::new(term, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy))
            .collect();
        NameMatcher {
            patterns,
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            buf: Vec::with_capacity(64),
        }
    }

    fn term_score(&mut self, term: usize, name: &str) -> Option<u32> {
        let pattern = self.patterns.get(term)?;
        self.buf.clear();
        pattern.score(Utf32Str::new(name, &mut self.buf), &mut self.matcher)
    }

    /// Summed score of every term against `name`, `None` unless all of them match.
    pub fn score(&mut self, name: &str) -> Option<u32> {
        (0..self.patterns.len()).try_fold(0, |total, term| Some(total + self.term_score(term, name)?))
    }
}

/// Folded fields of an installed app, in match-priority order.
#[derive(Debug, Clone)]
pub struct AppFields {
    pub name: String,
    pub others: Vec<String>,
}

impl AppFields {
    pub fn new(app: &AppInfo) -> Self {
        let mut others = Vec::new();
        others.extend(app.generic_name.as_deref().map(fold));
        others.extend(app.executable.as_deref().map(fold));
        others.extend(app.description.as_deref().map(fold));
        others.extend(app.categories.iter().map(|c| fold(c)));
        others.extend(app.keywords.iter().map(|k| fold(k)));
        AppFields { name: fold(&app.name), others }
    }

    /// Each term must occur somewhere, or fuzzily match the name.
    pub fn matches(&self, terms: &SearchTerms, fuzzy: &mut NameMatcher) -> bool {
        terms.terms().iter().enumerate().all(|(index, term)| {
            self.name.contains(term.as_str())
                || self.others.iter().any(|field| field.contains(term.as_str()))
                || fuzzy.term_score(index, &self.name).is_some()
        })
    }

    /// 3: the name starts with the query, 2: a name word starts with a term,
    /// 1: the name contains a term, 0: matched through other fields only.
    pub fn relevance(&self, terms: &SearchTerms) -> u8 {
        if self.name.starts_with(terms.joined.as_str()) {
            return 3;
        }
        word_relevance(&self.name, terms)
    }
}

pub fn action_matches(action: &SystemAction, terms: &SearchTerms) -> bool {
    let mut fields = vec![fold(&action.name)];
    fields.extend(action.keywords.iter().map(|k| fold(k)));
    terms.match_all(&fields)
}
