//! Run tree construction and composition.
//!
//! Rendering elements produce [`Fragment`]s: a build tree that still
//! carries pending affixes, quotes, and text case. [`Fragment::into_run`]
//! performs composition (text case, then quote wrapping, then affix
//! suppression for empty content) and yields the final immutable
//! [`Run`]/[`ComposedRun`] tree handed back to callers.
//!
//! Every run remembers whether its text originated from a variable lookup
//! (`by_variable`); groups consult that flag for the suppression rule.

use citekit_csl::{Formatting, TextCase};

// ============================================================================
// Final run tree
// ============================================================================

/// A node of the final run tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    Text(TextRun),
    Composed(ComposedRun),
}

/// A leaf text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub formatting: Formatting,
    /// True iff the text originated from consulting a variable.
    pub by_variable: bool,
}

/// A composed run: children plus affixes, quote wrapping, and text case.
///
/// Quote characters are materialized into the children during composition;
/// the `quotes` flag records that the wrapping happened. `by_variable` is
/// the OR over all marked descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedRun {
    pub tag: Option<String>,
    pub children: Vec<Run>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub quotes: bool,
    pub text_case: Option<TextCase>,
    pub by_variable: bool,
}

impl Run {
    /// Whether the run contains no text.
    pub fn is_empty(&self) -> bool {
        match self {
            Run::Text(t) => t.text.is_empty(),
            Run::Composed(c) => c.children.iter().all(Run::is_empty),
        }
    }

    /// Whether any descendant is marked by-variable.
    pub fn by_variable(&self) -> bool {
        match self {
            Run::Text(t) => t.by_variable,
            Run::Composed(c) => c.by_variable,
        }
    }

    /// Flattened text: affixes, quote characters, and content, without any
    /// font markup.
    pub fn plain_text(&self) -> String {
        match self {
            Run::Text(t) => t.text.clone(),
            Run::Composed(c) => c.plain_text(),
        }
    }
}

impl ComposedRun {
    /// Whether the composed content is empty.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Run::is_empty)
    }

    /// Flattened text including affixes.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        if let Some(ref prefix) = self.prefix {
            out.push_str(prefix);
        }
        for child in &self.children {
            out.push_str(&child.plain_text());
        }
        if let Some(ref suffix) = self.suffix {
            out.push_str(suffix);
        }
        out
    }
}

// ============================================================================
// Build tree
// ============================================================================

/// An intermediate rendering result, before composition.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Nothing was rendered. The flag records whether a variable was
    /// consulted on the way to nothing, which feeds group suppression.
    Empty { by_variable: bool },
    /// A leaf text.
    Text {
        text: String,
        formatting: Formatting,
        by_variable: bool,
    },
    /// A group of children with pending affixes, quotes, and case.
    Composed(ComposedFragment),
}

/// The composed variant of [`Fragment`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposedFragment {
    pub tag: Option<String>,
    pub children: Vec<Fragment>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub quotes: bool,
    pub text_case: Option<TextCase>,
    pub strip_periods: bool,
    /// Node-level by-variable mark, OR'd with the children's marks.
    pub by_variable: bool,
}

impl Fragment {
    /// Nothing, with no variable consulted.
    pub fn empty() -> Self {
        Fragment::Empty { by_variable: false }
    }

    /// Nothing, after consulting a variable that was missing or empty.
    pub fn missing_variable() -> Self {
        Fragment::Empty { by_variable: true }
    }

    /// A literal text leaf.
    pub fn text(text: impl Into<String>, formatting: Formatting) -> Self {
        let text = text.into();
        if text.is_empty() {
            Fragment::empty()
        } else {
            Fragment::Text {
                text,
                formatting,
                by_variable: false,
            }
        }
    }

    /// A text leaf that originated from a variable lookup.
    pub fn variable_text(text: impl Into<String>, formatting: Formatting) -> Self {
        let text = text.into();
        if text.is_empty() {
            Fragment::missing_variable()
        } else {
            Fragment::Text {
                text,
                formatting,
                by_variable: true,
            }
        }
    }

    /// A bare sequence of children with no pending decoration.
    pub fn sequence(children: Vec<Fragment>) -> Self {
        match children.len() {
            0 => Fragment::empty(),
            1 => children.into_iter().next().unwrap(),
            _ => Fragment::Composed(ComposedFragment {
                children,
                ..Default::default()
            }),
        }
    }

    /// Wrap children in an element's formatting: affixes, quotes, text
    /// case, and strip-periods pending; font attributes are expected to be
    /// stamped on the leaves already.
    pub fn wrapped(children: Vec<Fragment>, formatting: &Formatting) -> Self {
        Fragment::Composed(ComposedFragment {
            tag: None,
            children,
            prefix: formatting.prefix.clone(),
            suffix: formatting.suffix.clone(),
            quotes: formatting.quotes,
            text_case: formatting.text_case,
            strip_periods: formatting.strip_periods,
            by_variable: false,
        })
    }

    /// Whether nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        match self {
            Fragment::Empty { .. } => true,
            Fragment::Text { text, .. } => text.is_empty(),
            Fragment::Composed(c) => c.children.iter().all(Fragment::is_empty),
        }
    }

    /// Whether any descendant consulted a variable, empty or not.
    pub fn consulted_variable(&self) -> bool {
        match self {
            Fragment::Empty { by_variable } => *by_variable,
            Fragment::Text { by_variable, .. } => *by_variable,
            Fragment::Composed(c) => {
                c.by_variable || c.children.iter().any(Fragment::consulted_variable)
            }
        }
    }

    /// Whether any by-variable descendant produced non-empty text.
    pub fn has_variable_content(&self) -> bool {
        match self {
            Fragment::Empty { .. } => false,
            Fragment::Text {
                text, by_variable, ..
            } => *by_variable && !text.is_empty(),
            Fragment::Composed(c) => {
                (c.by_variable && !self.is_empty())
                    || c.children.iter().any(Fragment::has_variable_content)
            }
        }
    }

    /// Mark this fragment as variable-sourced as a whole.
    pub fn mark_by_variable(self) -> Self {
        match self {
            Fragment::Empty { .. } => Fragment::Empty { by_variable: true },
            Fragment::Text {
                text, formatting, ..
            } => Fragment::Text {
                text,
                formatting,
                by_variable: true,
            },
            Fragment::Composed(mut c) => {
                c.by_variable = true;
                Fragment::Composed(c)
            }
        }
    }

    /// Attach a tag, wrapping leaves as needed.
    pub fn tagged(self, tag: &str) -> Self {
        match self {
            Fragment::Composed(mut c) if c.tag.is_none() => {
                c.tag = Some(tag.to_string());
                Fragment::Composed(c)
            }
            other => Fragment::Composed(ComposedFragment {
                tag: Some(tag.to_string()),
                children: vec![other],
                ..Default::default()
            }),
        }
    }

    /// Flattened text before composition: content and affixes of non-empty
    /// nodes, without quotes or case. Used for sort keys.
    pub fn plain_text(&self) -> String {
        match self {
            Fragment::Empty { .. } => String::new(),
            Fragment::Text { text, .. } => text.clone(),
            Fragment::Composed(c) => {
                if self.is_empty() {
                    return String::new();
                }
                let mut out = String::new();
                if let Some(ref prefix) = c.prefix {
                    out.push_str(prefix);
                }
                for child in &c.children {
                    out.push_str(&child.plain_text());
                }
                if let Some(ref suffix) = c.suffix {
                    out.push_str(suffix);
                }
                out
            }
        }
    }

    /// Compose this fragment into the final run tree.
    pub fn into_run(self, ctx: &ComposeContext) -> Run {
        self.compose(ctx, 0)
    }

    fn compose(self, ctx: &ComposeContext, quote_depth: usize) -> Run {
        match self {
            Fragment::Empty { by_variable } => Run::Text(TextRun {
                text: String::new(),
                formatting: Formatting::default(),
                by_variable,
            }),
            Fragment::Text {
                text,
                formatting,
                by_variable,
            } => Run::Text(TextRun {
                text,
                formatting,
                by_variable,
            }),
            Fragment::Composed(c) => {
                let child_depth = quote_depth + usize::from(c.quotes);
                let mut children: Vec<Run> = c
                    .children
                    .into_iter()
                    .map(|child| child.compose(ctx, child_depth))
                    .collect();

                let by_variable = c.by_variable || children.iter().any(Run::by_variable);
                let empty = children.iter().all(Run::is_empty);

                if empty {
                    // Affixes and quotes never materialize around empty
                    // content.
                    return Run::Composed(ComposedRun {
                        tag: c.tag,
                        children,
                        prefix: None,
                        suffix: None,
                        quotes: false,
                        text_case: c.text_case,
                        by_variable,
                    });
                }

                if c.strip_periods {
                    strip_periods_in(&mut children);
                }

                if let Some(case) = c.text_case {
                    let mut state = CaseState::new();
                    apply_text_case(&mut children, case, &mut state);
                }

                if c.quotes {
                    let (open, close) = ctx.quote_pair(quote_depth);
                    children.insert(
                        0,
                        Run::Text(TextRun {
                            text: open,
                            formatting: Formatting::default(),
                            by_variable: false,
                        }),
                    );
                    children.push(Run::Text(TextRun {
                        text: close,
                        formatting: Formatting::default(),
                        by_variable: false,
                    }));
                }

                Run::Composed(ComposedRun {
                    tag: c.tag,
                    children,
                    prefix: c.prefix,
                    suffix: c.suffix,
                    quotes: c.quotes,
                    text_case: c.text_case,
                    by_variable,
                })
            }
        }
    }
}

/// Context for composition: the locale's quote pairs.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    pub outer_quotes: (String, String),
    pub inner_quotes: (String, String),
}

impl ComposeContext {
    /// A context with plain curly quotes, for tests and plain rendering.
    pub fn plain() -> Self {
        Self {
            outer_quotes: ("\u{201C}".to_string(), "\u{201D}".to_string()),
            inner_quotes: ("\u{2018}".to_string(), "\u{2019}".to_string()),
        }
    }

    fn quote_pair(&self, depth: usize) -> (String, String) {
        if depth == 0 {
            self.outer_quotes.clone()
        } else {
            self.inner_quotes.clone()
        }
    }
}

/// Interleave a delimiter between non-empty fragments.
///
/// The number of delimiter instances is `max(0, non_empty_count - 1)`;
/// empty fragments never attract a delimiter. Empty fragments that
/// consulted a variable are kept (without a delimiter) so that group
/// suppression higher up still sees them; other empties are dropped.
/// Delimiter runs take the supplied formatting.
pub fn join_fragments(
    fragments: Vec<Fragment>,
    delimiter: &str,
    formatting: &Formatting,
) -> Vec<Fragment> {
    let mut joined = Vec::with_capacity(fragments.len());
    let mut seen_content = false;
    for fragment in fragments {
        if fragment.is_empty() {
            if fragment.consulted_variable() {
                joined.push(fragment);
            }
            continue;
        }
        if seen_content && !delimiter.is_empty() {
            joined.push(Fragment::text(delimiter, formatting.clone()));
        }
        seen_content = true;
        joined.push(fragment);
    }
    joined
}

/// Apply a case transform to a standalone piece of text, outside the run
/// tree (name parts are cased individually).
pub(crate) fn transform_case(text: &str, case: TextCase) -> String {
    let mut state = CaseState::new();
    apply_case_to_text(text, case, &mut state)
}

// ============================================================================
// Text case
// ============================================================================

/// State carried across text runs while applying a case transform.
struct CaseState {
    /// No cased content seen yet.
    at_start: bool,
    /// The next word must be capitalized (title case).
    force_next: bool,
}

impl CaseState {
    fn new() -> Self {
        Self {
            at_start: true,
            force_next: true,
        }
    }
}

fn apply_text_case(children: &mut [Run], case: TextCase, state: &mut CaseState) {
    for child in children {
        match child {
            Run::Text(t) => {
                if t.text.is_empty() {
                    continue;
                }
                t.text = apply_case_to_text(&t.text, case, state);
            }
            Run::Composed(c) => {
                if c.quotes && matters_for_quote_skip(case) {
                    // Capitalization skips text inside quotes; the quoted
                    // segment still consumes the "first word" slot.
                    if !c.is_empty() {
                        state.at_start = false;
                        state.force_next = false;
                    }
                } else {
                    apply_text_case(&mut c.children, case, state);
                }
            }
        }
    }
}

fn matters_for_quote_skip(case: TextCase) -> bool {
    matches!(
        case,
        TextCase::CapitalizeFirst | TextCase::CapitalizeAll | TextCase::Title | TextCase::Sentence
    )
}

fn apply_case_to_text(text: &str, case: TextCase, state: &mut CaseState) -> String {
    match case {
        TextCase::Lowercase => text.to_lowercase(),
        TextCase::Uppercase => text.to_uppercase(),
        TextCase::CapitalizeFirst => {
            if state.at_start {
                state.at_start = false;
                capitalize_first(text)
            } else {
                text.to_string()
            }
        }
        TextCase::CapitalizeAll => {
            state.at_start = false;
            capitalize_all(text)
        }
        TextCase::Title => {
            state.at_start = false;
            title_case(text, state)
        }
        TextCase::Sentence => {
            let out = if is_all_uppercase(text) {
                let lowered = text.to_lowercase();
                if state.at_start {
                    capitalize_first(&lowered)
                } else {
                    lowered
                }
            } else if state.at_start {
                capitalize_first(text)
            } else {
                text.to_string()
            };
            state.at_start = false;
            out
        }
    }
}

/// Uppercase the first character.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Uppercase the first character of each whitespace-separated word.
fn capitalize_all(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Stop words that stay lowercase in title case unless forced.
const TITLE_CASE_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "down", "for", "from", "in", "into", "nor", "of",
    "on", "onto", "or", "over", "so", "the", "till", "to", "up", "via", "with", "yet", "von",
    "van", "de", "d", "l", "about",
];

fn is_all_uppercase(s: &str) -> bool {
    let letters: Vec<char> = s.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty() && letters.iter().all(|c| c.is_uppercase())
}

fn has_internal_uppercase(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    chars
        .iter()
        .enumerate()
        .any(|(i, c)| c.is_uppercase() && i > 0 && chars[i - 1].is_alphabetic())
}

/// Title-case one word. Acronyms and mixed-case words are preserved;
/// hyphenated words capitalize their first and last segments.
fn title_case_word(word: &str, force: bool) -> String {
    if !word.chars().next().is_some_and(|c| c.is_alphabetic()) {
        return word.to_string();
    }
    if is_all_uppercase(word) || has_internal_uppercase(word) {
        return word.to_string();
    }

    if word.contains('-') {
        let parts: Vec<&str> = word.split('-').collect();
        let last = parts.len() - 1;
        return parts
            .iter()
            .enumerate()
            .map(|(i, part)| title_case_word(part, (i == 0 && force) || i == last))
            .collect::<Vec<_>>()
            .join("-");
    }

    let lower = word.to_lowercase();
    if !force && TITLE_CASE_STOP_WORDS.contains(&lower.as_str()) {
        return lower;
    }
    capitalize_first(word)
}

fn title_case(s: &str, state: &mut CaseState) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word = String::new();

    fn flush(word: &mut String, out: &mut String, state: &mut CaseState) {
        if !word.is_empty() {
            out.push_str(&title_case_word(word, state.force_next));
            word.clear();
            state.force_next = false;
        }
    }

    for c in s.chars() {
        if c.is_whitespace() {
            flush(&mut word, &mut out, state);
            out.push(c);
        } else if matches!(c, ':' | '.' | '?' | '!') {
            flush(&mut word, &mut out, state);
            out.push(c);
            // Sentence punctuation forces the next word.
            state.force_next = true;
        } else if matches!(c, '\u{201C}' | '\u{2018}') {
            flush(&mut word, &mut out, state);
            out.push(c);
            // An opening quote forces the next word.
            state.force_next = true;
        } else if matches!(c, '\u{2014}' | '\u{2013}') {
            flush(&mut word, &mut out, state);
            out.push(c);
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut out, state);
    out
}

fn strip_periods_in(children: &mut [Run]) {
    for child in children {
        match child {
            Run::Text(t) => t.text = t.text.replace('.', ""),
            Run::Composed(c) => strip_periods_in(&mut c.children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(fragment: Fragment) -> Run {
        fragment.into_run(&ComposeContext::plain())
    }

    #[test]
    fn test_affixes_suppressed_around_empty_content() {
        let fragment = Fragment::wrapped(
            vec![Fragment::missing_variable()],
            &Formatting {
                prefix: Some("(".to_string()),
                suffix: Some(")".to_string()),
                quotes: true,
                ..Default::default()
            },
        );
        let Run::Composed(run) = compose(fragment) else {
            panic!("expected composed run");
        };
        assert!(run.is_empty());
        assert_eq!(run.prefix, None);
        assert_eq!(run.suffix, None);
        assert!(!run.quotes);
        assert!(run.by_variable);
        assert_eq!(run.plain_text(), "");
    }

    #[test]
    fn test_affixes_kept_around_content() {
        let fragment = Fragment::wrapped(
            vec![Fragment::text("vol. 3", Formatting::default())],
            &Formatting {
                prefix: Some("(".to_string()),
                suffix: Some(")".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(compose(fragment).plain_text(), "(vol. 3)");
    }

    #[test]
    fn test_delimiter_count_between_non_empty() {
        let fragments = vec![
            Fragment::text("a", Formatting::default()),
            Fragment::empty(),
            Fragment::text("b", Formatting::default()),
            Fragment::missing_variable(),
            Fragment::text("c", Formatting::default()),
        ];
        let joined = join_fragments(fragments, ", ", &Formatting::default());
        // 3 non-empty runs, 2 delimiters, 1 consulted empty kept for
        // suppression bookkeeping.
        assert_eq!(joined.len(), 6);
        assert!(joined.iter().any(|f| f.is_empty() && f.consulted_variable()));
        let text = Fragment::sequence(joined).plain_text();
        assert_eq!(text, "a, b, c");
    }

    #[test]
    fn test_empty_delimiter_leaves_runs_untouched() {
        let fragments = vec![
            Fragment::text("a", Formatting::default()),
            Fragment::text("b", Formatting::default()),
        ];
        let joined = join_fragments(fragments, "", &Formatting::default());
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn test_quotes_use_locale_pairs_and_nest() {
        let inner = Fragment::wrapped(
            vec![Fragment::text("inner", Formatting::default())],
            &Formatting {
                quotes: true,
                ..Default::default()
            },
        );
        let outer = Fragment::wrapped(
            vec![Fragment::text("before ", Formatting::default()), inner],
            &Formatting {
                quotes: true,
                ..Default::default()
            },
        );
        assert_eq!(
            compose(outer).plain_text(),
            "\u{201C}before \u{2018}inner\u{2019}\u{201D}"
        );
    }

    #[test]
    fn test_by_variable_or_propagation() {
        let fragment = Fragment::sequence(vec![
            Fragment::text("literal", Formatting::default()),
            Fragment::variable_text("1999", Formatting::default()),
        ]);
        assert!(compose(fragment).by_variable());

        let no_vars = Fragment::sequence(vec![
            Fragment::text("a", Formatting::default()),
            Fragment::text("b", Formatting::default()),
        ]);
        assert!(!compose(no_vars).by_variable());
    }

    #[test]
    fn test_consulted_and_content_flags() {
        let suppressible = Fragment::sequence(vec![
            Fragment::text("p. ", Formatting::default()),
            Fragment::missing_variable(),
        ]);
        assert!(suppressible.consulted_variable());
        assert!(!suppressible.has_variable_content());

        let kept = Fragment::sequence(vec![
            Fragment::text("p. ", Formatting::default()),
            Fragment::variable_text("33", Formatting::default()),
        ]);
        assert!(kept.consulted_variable());
        assert!(kept.has_variable_content());
    }

    #[test]
    fn test_uppercase_and_lowercase() {
        let upper = Fragment::wrapped(
            vec![Fragment::text("of mice and men", Formatting::default())],
            &Formatting {
                text_case: Some(TextCase::Uppercase),
                ..Default::default()
            },
        );
        assert_eq!(compose(upper).plain_text(), "OF MICE AND MEN");

        let lower = Fragment::wrapped(
            vec![Fragment::text("LOUD TITLE", Formatting::default())],
            &Formatting {
                text_case: Some(TextCase::Lowercase),
                ..Default::default()
            },
        );
        assert_eq!(compose(lower).plain_text(), "loud title");
    }

    #[test]
    fn test_capitalize_first_spans_runs() {
        let fragment = Fragment::wrapped(
            vec![
                Fragment::text("hello ", Formatting::default()),
                Fragment::text("world", Formatting::default()),
            ],
            &Formatting {
                text_case: Some(TextCase::CapitalizeFirst),
                ..Default::default()
            },
        );
        assert_eq!(compose(fragment).plain_text(), "Hello world");
    }

    #[test]
    fn test_title_case_stop_words_and_edges() {
        let fragment = Fragment::wrapped(
            vec![Fragment::text(
                "the war of the worlds",
                Formatting::default(),
            )],
            &Formatting {
                text_case: Some(TextCase::Title),
                ..Default::default()
            },
        );
        // First word always capitalized; stop words stay lowercase.
        assert_eq!(compose(fragment).plain_text(), "The War of the Worlds");
    }

    #[test]
    fn test_title_case_preserves_acronyms_and_mixed_case() {
        let fragment = Fragment::wrapped(
            vec![Fragment::text("NASA and the iPhone era", Formatting::default())],
            &Formatting {
                text_case: Some(TextCase::Title),
                ..Default::default()
            },
        );
        assert_eq!(compose(fragment).plain_text(), "NASA and the iPhone Era");
    }

    #[test]
    fn test_title_case_skips_quoted_segment() {
        let quoted = Fragment::wrapped(
            vec![Fragment::text("a quiet place", Formatting::default())],
            &Formatting {
                quotes: true,
                ..Default::default()
            },
        );
        let fragment = Fragment::wrapped(
            vec![Fragment::text("notes on ", Formatting::default()), quoted],
            &Formatting {
                text_case: Some(TextCase::Title),
                ..Default::default()
            },
        );
        assert_eq!(
            compose(fragment).plain_text(),
            "Notes on \u{201C}a quiet place\u{201D}"
        );
    }

    #[test]
    fn test_sentence_case() {
        let upper = Fragment::wrapped(
            vec![Fragment::text("AN ALL CAPS TITLE", Formatting::default())],
            &Formatting {
                text_case: Some(TextCase::Sentence),
                ..Default::default()
            },
        );
        assert_eq!(compose(upper).plain_text(), "An all caps title");

        let mixed = Fragment::wrapped(
            vec![Fragment::text("a study of McDonald", Formatting::default())],
            &Formatting {
                text_case: Some(TextCase::Sentence),
                ..Default::default()
            },
        );
        assert_eq!(compose(mixed).plain_text(), "A study of McDonald");
    }

    #[test]
    fn test_strip_periods() {
        let fragment = Fragment::wrapped(
            vec![Fragment::text("Jan.", Formatting::default())],
            &Formatting {
                strip_periods: true,
                ..Default::default()
            },
        );
        assert_eq!(compose(fragment).plain_text(), "Jan");
    }

    #[test]
    fn test_tagged_fragment_carries_tag_through() {
        let fragment = Fragment::text("Doe", Formatting::default()).tagged("editor-translator");
        let Run::Composed(run) = compose(fragment) else {
            panic!("expected composed run");
        };
        assert_eq!(run.tag.as_deref(), Some("editor-translator"));
    }
}
