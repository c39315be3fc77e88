//! Integration tests for the rendering engine.
//!
//! These drive the public API end to end: a compiled author-date style
//! built in code, CSL-JSON items, and the two entry points.

use citekit_csl::{
    DateElement, DatePart, DatePartForm, DatePartName, DatePrecision, Element, ElementKind,
    Formatting, GroupElement, Layout, Locale, Macro, NameAnd, NameAsSortOrder, NameForm,
    NameOptions, NameSpec, NamesElement, PageRangeFormat, Sort, SortKey, SortOrder, SortTarget,
    Style, StyleClass, StyleOptions, Term, TermForm, TextElement, TextSource, VariableForm,
};
use citekit_proc::{Item, ItemData, Processor};
use serde_json::json;
use std::collections::HashMap;

fn text_variable(name: &str, formatting: Formatting) -> Element {
    Element::formatted(
        ElementKind::Text(TextElement {
            source: TextSource::Variable {
                name: name.to_string(),
                form: VariableForm::Long,
            },
        }),
        formatting,
    )
}

fn year_date(variable: &str, formatting: Formatting) -> Element {
    Element::formatted(
        ElementKind::Date(DateElement {
            variable: variable.to_string(),
            form: None,
            precision: DatePrecision::Year,
            parts: vec![DatePart::plain(DatePartName::Year, DatePartForm::Numeric)],
            delimiter: None,
        }),
        formatting,
    )
}

fn suffix(text: &str) -> Formatting {
    Formatting {
        suffix: Some(text.to_string()),
        ..Default::default()
    }
}

/// A small author-date style: "(Author Year)" citations, "Family, G.
/// Title. Publisher, Place. (Year)" bibliography entries.
fn author_date_style() -> Style {
    let mut macros = HashMap::new();
    macros.insert(
        "author-short".to_string(),
        Macro {
            name: "author-short".to_string(),
            elements: vec![Element::new(ElementKind::Names(NamesElement {
                variables: vec!["author".to_string()],
                name: Some(NameSpec {
                    options: NameOptions {
                        form: Some(NameForm::Short),
                        ..Default::default()
                    },
                    ..Default::default()
                }),
                label: None,
                substitute: None,
            }))],
        },
    );

    let citation = Layout {
        formatting: Formatting {
            prefix: Some("(".to_string()),
            suffix: Some(")".to_string()),
            ..Default::default()
        },
        delimiter: None,
        sort: Some(Sort {
            keys: vec![SortKey {
                target: SortTarget::Variable("issued".to_string()),
                order: SortOrder::Ascending,
            }],
        }),
        name_options: NameOptions::default(),
        elements: vec![
            Element::new(ElementKind::Text(TextElement {
                source: TextSource::Macro {
                    name: "author-short".to_string(),
                },
            })),
            year_date(
                "issued",
                Formatting {
                    prefix: Some(" ".to_string()),
                    ..Default::default()
                },
            ),
        ],
    };

    let bibliography = Layout {
        formatting: Formatting::default(),
        delimiter: None,
        sort: Some(Sort {
            keys: vec![
                SortKey {
                    target: SortTarget::Variable("author".to_string()),
                    order: SortOrder::Ascending,
                },
                SortKey {
                    target: SortTarget::Variable("issued".to_string()),
                    order: SortOrder::Ascending,
                },
            ],
        }),
        name_options: NameOptions::default(),
        elements: vec![
            Element::formatted(
                ElementKind::Names(NamesElement {
                    variables: vec!["author".to_string()],
                    name: Some(NameSpec {
                        options: NameOptions {
                            name_as_sort_order: Some(NameAsSortOrder::First),
                            initialize_with: Some(". ".to_string()),
                            and: Some(NameAnd::Text),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
                    label: None,
                    substitute: None,
                }),
                suffix(". "),
            ),
            text_variable("title", suffix(". ")),
            Element::formatted(
                ElementKind::Group(GroupElement {
                    elements: vec![
                        text_variable("publisher", Formatting::default()),
                        text_variable("publisher-place", Formatting::default()),
                    ],
                    delimiter: Some(", ".to_string()),
                }),
                suffix(". "),
            ),
            year_date(
                "issued",
                Formatting {
                    prefix: Some("(".to_string()),
                    suffix: Some(")".to_string()),
                    ..Default::default()
                },
            ),
        ],
    };

    Style {
        class: StyleClass::InText,
        default_locale: None,
        options: StyleOptions {
            page_range_format: Some(PageRangeFormat::Chicago),
            ..Default::default()
        },
        macros,
        citation,
        bibliography: Some(bibliography),
        name_options: NameOptions::default(),
    }
}

fn item(fields: serde_json::Value) -> Item {
    serde_json::from_value(fields).unwrap()
}

fn smith_2020() -> Item {
    item(json!({
        "id": "smith2020",
        "type": "book",
        "title": "A Book",
        "author": [{"family": "Smith", "given": "John"}],
        "publisher": "Acme",
        "publisher-place": "Berlin",
        "issued": {"date-parts": [[2020]]}
    }))
}

fn jones_1999() -> Item {
    item(json!({
        "id": "jones1999",
        "type": "article-journal",
        "title": "B Work",
        "author": [{"family": "Jones", "given": "Alice"}],
        "issued": {"date-parts": [[1999]]}
    }))
}

fn byte_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.cmp(b)
}

#[test]
fn test_bibliography_entries_and_order() {
    let processor = Processor::new(author_date_style());
    let smith = smith_2020();
    let jones = jones_1999();
    let items: Vec<&dyn ItemData> = vec![&smith, &jones];

    let entries = processor
        .generate_bibliography(&items, "en-US", false, &byte_cmp)
        .expect("bibliography should render");

    assert_eq!(entries.len(), 2);
    // Sorted by author: Jones before Smith.
    assert_eq!(entries[0].plain_text(), "Jones, A. B Work. (1999)");
    assert_eq!(
        entries[1].plain_text(),
        "Smith, J. A Book. Acme, Berlin. (2020)"
    );
}

#[test]
fn test_publisher_group_suppressed_without_variables() {
    let processor = Processor::new(author_date_style());
    let jones = jones_1999();
    let items: Vec<&dyn ItemData> = vec![&jones];

    let entries = processor
        .generate_bibliography(&items, "en-US", false, &byte_cmp)
        .unwrap();

    // No publisher data: the whole group, including its ". " suffix,
    // vanishes.
    assert_eq!(entries[0].plain_text(), "Jones, A. B Work. (1999)");
}

#[test]
fn test_single_citation() {
    let processor = Processor::new(author_date_style());
    let smith = smith_2020();
    let items: Vec<&dyn ItemData> = vec![&smith];

    let citation = processor
        .generate_citation(&items, "en-US", false, "; ", &byte_cmp)
        .unwrap()
        .expect("one item yields a citation");
    assert_eq!(citation.plain_text(), "(Smith 2020)");
}

#[test]
fn test_multi_citation_sorted_and_delimited() {
    let processor = Processor::new(author_date_style());
    let smith = smith_2020();
    let jones = jones_1999();
    let items: Vec<&dyn ItemData> = vec![&smith, &jones];

    let citation = processor
        .generate_citation(&items, "en-US", false, "; ", &byte_cmp)
        .unwrap()
        .unwrap();
    // The citation sort orders by year, so Jones (1999) comes first; the
    // layout affixes wrap the joined citation.
    assert_eq!(citation.plain_text(), "(Jones 1999; Smith 2020)");
}

#[test]
fn test_empty_citation_returns_none() {
    let processor = Processor::new(author_date_style());
    let citation = processor
        .generate_citation(&[], "en-US", false, "; ", &byte_cmp)
        .unwrap();
    assert!(citation.is_none());
}

#[test]
fn test_sort_is_stable_for_identical_keys() {
    let processor = Processor::new(author_date_style());
    let first = item(json!({
        "id": "a",
        "title": "First In",
        "author": [{"family": "Same", "given": "A."}],
        "issued": {"date-parts": [[2000]]}
    }));
    let second = item(json!({
        "id": "b",
        "title": "Second In",
        "author": [{"family": "Same", "given": "A."}],
        "issued": {"date-parts": [[2000]]}
    }));
    let items: Vec<&dyn ItemData> = vec![&first, &second];

    let entries = processor
        .generate_bibliography(&items, "en-US", false, &byte_cmp)
        .unwrap();
    assert!(entries[0].plain_text().contains("First In"));
    assert!(entries[1].plain_text().contains("Second In"));
}

#[test]
fn test_force_locale_switches_terms() {
    let mut processor = Processor::new(author_date_style());
    processor.add_locale(Locale {
        lang: Some("de".to_string()),
        terms: vec![Term::simple("and", TermForm::Long, "und")],
        ..Default::default()
    });

    let two_authors = item(json!({
        "id": "duo",
        "title": "Duo",
        "author": [
            {"family": "Smith", "given": "John"},
            {"family": "Jones", "given": "Alice"}
        ],
        "issued": {"date-parts": [[2001]]}
    }));
    let items: Vec<&dyn ItemData> = vec![&two_authors];

    // Without forcing, the style's default locale (en-US) wins.
    let english = processor
        .generate_bibliography(&items, "de", false, &byte_cmp)
        .unwrap();
    assert_eq!(english[0].plain_text(), "Smith, J. and A. Jones. Duo. (2001)");

    // Forcing honors the requested locale, which falls back to the
    // invariant for terms it does not define.
    let german = processor
        .generate_bibliography(&items, "de", true, &byte_cmp)
        .unwrap();
    assert_eq!(german[0].plain_text(), "Smith, J. und A. Jones. Duo. (2001)");
}

#[test]
fn test_page_range_collapses_in_text_variable() {
    let mut style = author_date_style();
    if let Some(ref mut bibliography) = style.bibliography {
        bibliography.elements.push(text_variable(
            "page",
            Formatting {
                prefix: Some(" pp. ".to_string()),
                ..Default::default()
            },
        ));
    }
    let processor = Processor::new(style);

    let paper = item(json!({
        "id": "p",
        "title": "Pages",
        "author": [{"family": "Author", "given": "A."}],
        "issued": {"date-parts": [[2010]]},
        "page": "321-328"
    }));
    let items: Vec<&dyn ItemData> = vec![&paper];

    let entries = processor
        .generate_bibliography(&items, "en-US", false, &byte_cmp)
        .unwrap();
    assert_eq!(
        entries[0].plain_text(),
        "Author, A. Pages. (2010) pp. 321\u{2013}28"
    );
}

#[test]
fn test_missing_bibliography_layout_yields_no_entries() {
    let mut style = author_date_style();
    style.bibliography = None;
    let processor = Processor::new(style);
    let smith = smith_2020();
    let items: Vec<&dyn ItemData> = vec![&smith];

    let entries = processor
        .generate_bibliography(&items, "en-US", false, &byte_cmp)
        .unwrap();
    assert!(entries.is_empty());
}
