//! The processor: style entry points for citations and bibliographies.
//!
//! The processor owns a compiled style and a locale registry, and wires an
//! evaluation context per item. It never interprets style logic itself: it
//! resolves the locale, renders each item through the layout, orders the
//! results, and applies the citation delimiter.

use crate::error::Result;
use crate::eval::{evaluate_elements, EvalContext, Parameters};
use crate::item::ItemData;
use crate::locale::{LocaleProvider, LocaleRegistry, INVARIANT_LOCALE};
use crate::output::{ComposeContext, ComposedRun, Fragment, Run, TextRun};
use crate::sort::{self, Comparator};
use citekit_csl::{Formatting, Layout, Locale, SortOrder, Style};

/// One rendered bibliography or citation entry with its sort keys.
#[derive(Debug, Clone)]
pub struct Entry {
    pub layout: ComposedRun,
    pub sort_keys: Vec<String>,
}

/// Citation processor applying a compiled style to items.
pub struct Processor {
    /// The compiled style.
    pub style: Style,
    /// Registered locale bundles.
    pub locales: LocaleRegistry,
}

impl Processor {
    /// Create a processor for a style, with the invariant locale
    /// registered.
    pub fn new(style: Style) -> Self {
        Self {
            style,
            locales: LocaleRegistry::new(),
        }
    }

    /// Register an additional locale bundle.
    pub fn add_locale(&mut self, locale: Locale) {
        self.locales.register(locale);
    }

    /// Render the bibliography for a set of items, stably ordered by the
    /// bibliography's sort keys under `cmp`.
    ///
    /// `force_locale = false` uses the style's default locale regardless
    /// of the argument; `true` honors the argument.
    pub fn generate_bibliography(
        &self,
        items: &[&dyn ItemData],
        locale: &str,
        force_locale: bool,
        cmp: Comparator<'_>,
    ) -> Result<Vec<ComposedRun>> {
        let Some(layout) = self.style.bibliography.as_ref() else {
            return Ok(Vec::new());
        };

        let lang = self.effective_locale(locale, force_locale);
        let provider = self.locales.resolve(&lang)?;
        tracing::debug!(locale = %lang, items = items.len(), "generating bibliography");

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            entries.push(self.render_entry(*item, layout, &provider, true)?);
        }
        sort_entries(&mut entries, layout, cmp);

        Ok(entries.into_iter().map(|e| e.layout).collect())
    }

    /// Render a single citation covering all given items, joined with
    /// `delimiter`. Returns `None` for an empty item list.
    pub fn generate_citation(
        &self,
        items: &[&dyn ItemData],
        locale: &str,
        force_locale: bool,
        delimiter: &str,
        cmp: Comparator<'_>,
    ) -> Result<Option<ComposedRun>> {
        if items.is_empty() {
            return Ok(None);
        }

        let layout = &self.style.citation;
        let lang = self.effective_locale(locale, force_locale);
        let provider = self.locales.resolve(&lang)?;
        tracing::debug!(locale = %lang, items = items.len(), "generating citation");

        // An empty delimiter argument falls back to the layout's own.
        let delimiter = if delimiter.is_empty() {
            layout.delimiter.as_deref().unwrap_or("")
        } else {
            delimiter
        };

        if items.len() == 1 {
            let entry = self.render_entry(items[0], layout, &provider, true)?;
            return Ok(Some(entry.layout));
        }

        // Cites render without the layout affixes; those wrap the joined
        // citation as a whole.
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            entries.push(self.render_entry(*item, layout, &provider, false)?);
        }
        sort_entries(&mut entries, layout, cmp);

        // Interleave the delimiter between non-empty cites.
        let mut children: Vec<Run> = Vec::with_capacity(entries.len() * 2);
        let mut by_variable = false;
        for entry in entries {
            if entry.layout.is_empty() {
                continue;
            }
            if !children.is_empty() && !delimiter.is_empty() {
                children.push(Run::Text(TextRun {
                    text: delimiter.to_string(),
                    formatting: Formatting::default(),
                    by_variable: false,
                }));
            }
            by_variable |= entry.layout.by_variable;
            children.push(Run::Composed(entry.layout));
        }

        let empty = children.is_empty();
        Ok(Some(ComposedRun {
            tag: None,
            children,
            prefix: if empty {
                None
            } else {
                layout.formatting.prefix.clone()
            },
            suffix: if empty {
                None
            } else {
                layout.formatting.suffix.clone()
            },
            quotes: false,
            text_case: None,
            by_variable,
        }))
    }

    fn effective_locale(&self, locale: &str, force_locale: bool) -> String {
        if force_locale {
            locale.to_string()
        } else {
            self.style
                .default_locale
                .clone()
                .unwrap_or_else(|| INVARIANT_LOCALE.to_string())
        }
    }

    /// Render one item through a layout and compute its sort keys. With
    /// `wrap_layout` the layout's own formatting wraps the entry.
    fn render_entry(
        &self,
        item: &dyn ItemData,
        layout: &Layout,
        provider: &LocaleProvider<'_>,
        wrap_layout: bool,
    ) -> Result<Entry> {
        let params = Parameters {
            formatting: layout.formatting.font_only(),
            name_options: layout.name_options.merge(&self.style.name_options),
        };
        let mut ctx = EvalContext::new(&self.style, item, provider);

        let inner = evaluate_elements(&mut ctx, &layout.elements, "", &params)?;
        let fragment = if wrap_layout && layout.formatting.wraps() {
            Fragment::wrapped(vec![inner], &layout.formatting)
        } else {
            inner
        };

        let compose_ctx = ComposeContext {
            outer_quotes: provider.quotes(false),
            inner_quotes: provider.quotes(true),
        };
        let layout_run = into_composed(fragment.into_run(&compose_ctx));

        let sort_keys = match layout.sort {
            Some(ref sort) => sort::sort_keys(&mut ctx, sort, &params)?,
            None => Vec::new(),
        };

        Ok(Entry {
            layout: layout_run,
            sort_keys,
        })
    }
}

/// Stable sort by the layout's sort keys; without a sort spec the input
/// order is preserved.
fn sort_entries(entries: &mut [Entry], layout: &Layout, cmp: Comparator<'_>) {
    let Some(ref spec) = layout.sort else {
        return;
    };
    let orders: Vec<SortOrder> = spec.keys.iter().map(|k| k.order).collect();
    entries.sort_by(|a, b| sort::compare_keys(&a.sort_keys, &b.sort_keys, &orders, cmp));
}

fn into_composed(run: Run) -> ComposedRun {
    match run {
        Run::Composed(composed) => composed,
        Run::Text(text) => {
            let by_variable = text.by_variable;
            ComposedRun {
                tag: None,
                children: vec![Run::Text(text)],
                prefix: None,
                suffix: None,
                quotes: false,
                text_case: None,
                by_variable,
            }
        }
    }
}
