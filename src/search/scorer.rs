//! Additive relevance scoring.
//!
//! Each heuristic is a [`Rule`] evaluated independently against a note. The
//! relevance of a note is the plain sum of the weights of every rule that
//! fires; there is no normalisation or cap. All comparisons are done on
//! case-folded text.

use crate::notes::Note;

/// Weight when the title contains the whole query.
pub const TITLE_PHRASE_WEIGHT: f64 = 3.0;
/// Weight when the body contains the whole query.
pub const BODY_PHRASE_WEIGHT: f64 = 2.0;
/// Weight when the serialised front matter contains the whole query.
pub const FRONT_MATTER_WEIGHT: f64 = 1.5;
/// Weight per query term found in the body.
pub const TERM_BODY_WEIGHT: f64 = 0.5;
/// Weight per query term found in the title.
pub const TERM_TITLE_WEIGHT: f64 = 1.0;
/// Weight when the file name contains the whole query.
pub const FILE_NAME_WEIGHT: f64 = 2.0;

/// Terms of this many characters or fewer are ignored.
pub const MIN_TERM_CHARS: usize = 2;

/// Characters of context kept on each side of a body match.
pub const EXCERPT_RADIUS: usize = 50;

/// Relevance of one note for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub relevance: f64,
    /// Explanations in the order the rules fired.
    pub matches: Vec<String>,
}

/// One scoring heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    TitlePhrase,
    BodyPhrase,
    FrontMatterPhrase,
    QueryTerms,
    FileNamePhrase,
}

impl Rule {
    /// All rules, in evaluation order.
    pub const ALL: [Rule; 5] = [
        Rule::TitlePhrase,
        Rule::BodyPhrase,
        Rule::FrontMatterPhrase,
        Rule::QueryTerms,
        Rule::FileNamePhrase,
    ];

    /// Evaluate this rule, returning its weight and optional explanation.
    #[must_use]
    pub fn apply(self, query: &Query, note: &FoldedNote<'_>) -> Option<(f64, Option<String>)> {
        match self {
            Rule::TitlePhrase => note
                .title
                .contains(&query.phrase)
                .then(|| (TITLE_PHRASE_WEIGHT, Some(format!("Title: \"{}\"", note.note.title)))),
            Rule::BodyPhrase => {
                if !note.body.contains(&query.phrase) {
                    return None;
                }
                let explanation = excerpt(&note.note.content, &query.phrase, EXCERPT_RADIUS)
                    .map(|context| format!("Content: \"...{context}...\""));
                Some((BODY_PHRASE_WEIGHT, explanation))
            }
            Rule::FrontMatterPhrase => note
                .front_matter
                .as_ref()
                .is_some_and(|fm| fm.contains(&query.phrase))
                .then(|| (FRONT_MATTER_WEIGHT, Some("Front matter".to_string()))),
            Rule::QueryTerms => {
                let mut weight = 0.0;
                for term in &query.terms {
                    if note.body.contains(term.as_str()) {
                        weight += TERM_BODY_WEIGHT;
                    }
                    if note.title.contains(term.as_str()) {
                        weight += TERM_TITLE_WEIGHT;
                    }
                }
                (weight > 0.0).then_some((weight, None))
            }
            Rule::FileNamePhrase => note
                .file_name
                .contains(&query.phrase)
                .then_some((FILE_NAME_WEIGHT, None)),
        }
    }
}

/// A case-folded query and its significant terms.
#[derive(Debug, Clone)]
pub struct Query {
    pub phrase: String,
    pub terms: Vec<String>,
}

impl Query {
    #[must_use]
    pub fn new(query: &str) -> Self {
        let phrase = fold(query);
        let terms = phrase
            .split_whitespace()
            .filter(|t| t.chars().count() > MIN_TERM_CHARS)
            .map(ToString::to_string)
            .collect();
        Self { phrase, terms }
    }
}

/// Case-folded views of the fields of a note that rules look at.
#[derive(Debug)]
pub struct FoldedNote<'a> {
    pub note: &'a Note,
    pub title: String,
    pub body: String,
    pub file_name: String,
    /// Front matter serialised as compact JSON.
    pub front_matter: Option<String>,
}

impl<'a> FoldedNote<'a> {
    #[must_use]
    pub fn new(note: &'a Note) -> Self {
        let front_matter = note
            .front_matter
            .as_ref()
            .and_then(|fm| serde_json::to_string(fm).ok())
            .map(|json| fold(&json));

        Self {
            note,
            title: fold(&note.title),
            body: fold(&note.content),
            file_name: fold(&note.file_name),
            front_matter,
        }
    }
}

/// Score a note against a query.
#[must_use]
pub fn score(note: &Note, query: &str) -> Score {
    score_folded(&Query::new(query), &FoldedNote::new(note))
}

/// Score a prepared note against a prepared query.
#[must_use]
pub fn score_folded(query: &Query, note: &FoldedNote<'_>) -> Score {
    let mut score = Score::default();
    for rule in Rule::ALL {
        if let Some((weight, explanation)) = rule.apply(query, note) {
            score.relevance += weight;
            score.matches.extend(explanation);
        }
    }
    score
}

/// Lowercase each character independently.
///
/// Unlike `str::to_lowercase` this has no context-dependent mappings, so the
/// folded text of a substring is always a substring of the folded text.
#[must_use]
pub fn fold(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Context around the first case-insensitive occurrence of `needle`.
///
/// `needle` must already be folded. The window spans `radius` characters on
/// each side of the match, with line breaks turned into spaces.
#[must_use]
pub fn excerpt(text: &str, needle: &str, radius: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();

    // Map every folded char back to the original char it came from.
    let mut folded = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        for lower in c.to_lowercase() {
            folded.push(lower);
            origin.push(i);
        }
    }

    let byte_pos = folded.find(needle)?;
    let folded_start = folded[..byte_pos].chars().count();
    let folded_end = folded_start + needle.chars().count();

    let match_start = origin.get(folded_start).copied().unwrap_or(chars.len());
    let match_end = origin
        .get(folded_end)
        .copied()
        .unwrap_or(chars.len());

    let start = match_start.saturating_sub(radius);
    let end = (match_end + radius).min(chars.len());

    let window: String = chars[start..end]
        .iter()
        .map(|&c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    Some(window.trim().to_string())
}
