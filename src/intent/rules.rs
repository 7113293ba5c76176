//! The intent rule cascade.
//!
//! Rules run in the order of [`CASCADE`]. Each rule is a guard plus an
//! effect; the effect takes the draft by value and returns the next draft.
//! Precedence is carried by the guards: later rules check what earlier rules
//! have already decided.
//!
//! | # | Rule                 | Fires when                                           |
//! |---|----------------------|------------------------------------------------------|
//! | 1 | `top_n_entity`       | "top <n>" with a resolvable group column             |
//! | 2 | `count`              | "count" / "how many", unless top-N ranked the query  |
//! | 3 | `most_frequent`      | "most" + "updates", not the service phrase           |
//! | 4 | `entity_filters`     | always                                               |
//! | 5 | `service_most_updates` | the service phrase, unless top-N fired             |
//! | 6 | `dedupe_filters`     | always                                               |
//! | 7 | `default_find_data`  | no earlier rule set an intent                        |

use std::collections::HashSet;

use crate::catalog::Table;
use crate::nlp::Analysis;

use super::query::{Aggregation, Filter, Intent, OrderBy, ParsedQuery};
use super::ParserOptions;

/// Alias of the COUNT produced by the top-N rule.
pub const MENTION_COUNT: &str = "mention_count";
/// Alias of the COUNT produced by the count rule.
pub const TOTAL_COUNT: &str = "total_count";
/// Alias of the COUNT produced by the "most updates" rules.
pub const UPDATE_COUNT: &str = "update_count";
/// Phrase reserved for [`service_most_updates`].
pub const SERVICE_MOST_UPDATES: &str = "service with the most updates";

/// Everything a rule may look at. Read-only.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Lowercased question text.
    pub text: &'a str,
    pub analysis: &'a Analysis,
    pub table: &'a Table,
    pub options: &'a ParserOptions,
}

impl ParseContext<'_> {
    fn mentions(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    fn primary_key(&self) -> String {
        self.table.primary_key().unwrap_or("*").to_string()
    }

    fn product_column(&self) -> &str {
        &self.options.product_column
    }

    fn provider_column(&self) -> &str {
        &self.options.provider_column
    }
}

/// A `ParsedQuery` under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDraft {
    pub intent: Option<Intent>,
    pub select_columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub aggregations: Vec<Aggregation>,
    pub group_by_column: Option<String>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    /// Set when the top-N rule ranked the query.
    pub top_n: bool,
}

impl QueryDraft {
    pub fn has_filter_on(&self, column: &str) -> bool {
        self.filters.iter().any(|f| f.column == column)
    }

    fn push_unique(&mut self, filter: Filter) {
        if !self
            .filters
            .iter()
            .any(|f| f.targets(&filter.column, &filter.value))
        {
            self.filters.push(filter);
        }
    }

    /// Freeze the draft.
    pub fn finish(self, target_table: &str) -> ParsedQuery {
        ParsedQuery {
            intent: self.intent.unwrap_or_default(),
            select_columns: self.select_columns,
            filters: self.filters,
            aggregations: self.aggregations,
            group_by_column: self.group_by_column,
            order_by: self.order_by,
            limit: self.limit,
            target_table: target_table.to_string(),
        }
    }
}

/// A named guard/effect pair.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub guard: fn(&ParseContext<'_>, &QueryDraft) -> bool,
    pub apply: fn(&ParseContext<'_>, QueryDraft) -> QueryDraft,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The cascade, in precedence order.
pub const CASCADE: &[Rule] = &[
    Rule {
        name: "top_n_entity",
        guard: top_n_guard,
        apply: top_n_entity,
    },
    Rule {
        name: "count",
        guard: count_guard,
        apply: count,
    },
    Rule {
        name: "most_frequent",
        guard: most_frequent_guard,
        apply: most_frequent,
    },
    Rule {
        name: "entity_filters",
        guard: always,
        apply: entity_filters,
    },
    Rule {
        name: "service_most_updates",
        guard: service_most_updates_guard,
        apply: service_most_updates,
    },
    Rule {
        name: "dedupe_filters",
        guard: always,
        apply: dedupe_filters,
    },
    Rule {
        name: "default_find_data",
        guard: default_guard,
        apply: default_find_data,
    },
];

/// Run every rule of [`CASCADE`] over a fresh draft.
pub fn run_cascade(ctx: &ParseContext<'_>) -> QueryDraft {
    CASCADE.iter().fold(QueryDraft::default(), |draft, rule| {
        if (rule.guard)(ctx, &draft) {
            tracing::trace!(rule = rule.name, "intent rule fired");
            (rule.apply)(ctx, draft)
        } else {
            draft
        }
    })
}

fn always(_: &ParseContext<'_>, _: &QueryDraft) -> bool {
    true
}

// =============================================================================
// Top N <entity>
// =============================================================================

/// Find "top <n>" and the column the ranking groups by.
///
/// Numerals that do not parse as a positive integer ("top three") are
/// skipped and scanning continues. Returns `None` when no group column can
/// be inferred or the inferred column is not in the catalog.
pub fn detect_top_n(ctx: &ParseContext<'_>) -> Option<(u64, String)> {
    let tokens = &ctx.analysis.tokens;

    for (i, token) in tokens.iter().enumerate() {
        if token.lemma != "top" {
            continue;
        }
        let Some(number) = tokens.get(i + 1).filter(|t| t.like_num) else {
            continue;
        };
        let Some(limit) = number
            .text
            .replace(',', "")
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
        else {
            continue;
        };

        let hinted = tokens
            .get(i + 2)
            .is_some_and(|t| ctx.options.entity_words.iter().any(|w| *w == t.lemma));
        let mentioned = ctx
            .options
            .entity_words
            .iter()
            .any(|w| ctx.mentions(w));

        if !(hinted || mentioned) {
            return None;
        }

        let group_by = ctx.product_column();
        if !ctx.table.has_column(group_by) {
            tracing::debug!(column = group_by, "top-N group column not in catalog");
            return None;
        }
        return Some((limit, group_by.to_string()));
    }

    None
}

fn top_n_guard(ctx: &ParseContext<'_>, _: &QueryDraft) -> bool {
    detect_top_n(ctx).is_some()
}

pub fn top_n_entity(ctx: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    let Some((limit, group_by)) = detect_top_n(ctx) else {
        return draft;
    };

    draft.intent = Some(Intent::FindMostFrequentEntity);
    draft.aggregations = vec![Aggregation::count(&ctx.primary_key(), MENTION_COUNT)];
    draft.order_by = Some(OrderBy::desc(MENTION_COUNT));
    draft.limit = Some(limit);
    draft.select_columns = vec![group_by.clone()];
    draft.group_by_column = Some(group_by);
    draft.top_n = true;
    draft
}

// =============================================================================
// Count
// =============================================================================

fn count_guard(ctx: &ParseContext<'_>, draft: &QueryDraft) -> bool {
    let ranked = draft.intent == Some(Intent::FindMostFrequentEntity) && draft.top_n;
    !ranked && (ctx.mentions("count") || ctx.mentions("how many"))
}

pub fn count(ctx: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    draft.intent = Some(Intent::Count);
    draft.select_columns.clear();
    draft.aggregations = vec![Aggregation::count(&ctx.primary_key(), TOTAL_COUNT)];
    draft
}

// =============================================================================
// Generic "most updates"
// =============================================================================

fn most_frequent_guard(ctx: &ParseContext<'_>, draft: &QueryDraft) -> bool {
    draft.intent != Some(Intent::FindMostFrequentEntity)
        && ctx.mentions("most")
        && ctx.mentions("updates")
        && !ctx.mentions(SERVICE_MOST_UPDATES)
}

pub fn most_frequent(ctx: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    let product = ctx.product_column();
    let projected = if ctx.table.has_column(product) {
        product.to_string()
    } else {
        ctx.table.first_column().unwrap_or(product).to_string()
    };

    draft.intent = Some(Intent::FindMostFrequent);
    draft.group_by_column = Some(product.to_string());
    draft.aggregations = vec![Aggregation::count(&ctx.primary_key(), UPDATE_COUNT)];
    draft.order_by = Some(OrderBy::desc(UPDATE_COUNT));
    draft.limit = Some(ctx.options.most_frequent_limit);
    draft.select_columns = vec![projected];
    draft
}

// =============================================================================
// Entity linking
// =============================================================================

pub fn entity_filters(ctx: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    // Recognized entities that equal a TEXT column example, bound with the
    // example's catalog spelling.
    for entity in ctx.analysis.entities.iter().filter(|e| e.label.is_linkable()) {
        let linked = ctx.table.text_columns().find_map(|column| {
            column
                .example_matching(&entity.text)
                .map(|example| (column, example))
        });
        if let Some((column, example)) = linked {
            draft.push_unique(Filter::equals(&column.name, example));
        }
    }

    // Provider keywords, in case the recognizer missed them.
    let provider = ctx.provider_column();
    if !draft.has_filter_on(provider) && ctx.table.has_column(provider) {
        if let Some(keyword) = ctx
            .options
            .provider_keywords
            .iter()
            .find(|k| ctx.mentions(k.as_str()))
        {
            draft.filters.push(Filter::equals(provider, keyword));
        }
    }

    // Product examples as plain substrings, bound with the catalog's casing.
    let product = ctx.product_column();
    if !draft.has_filter_on(product) {
        if let Some(column) = ctx.table.column(product) {
            if let Some(example) = column
                .examples
                .iter()
                .find(|ex| ctx.mentions(&ex.to_lowercase()))
            {
                draft.push_unique(Filter::equals(product, example));
            }
        }
    }

    draft
}

// =============================================================================
// "Service with the most updates"
// =============================================================================

fn service_most_updates_guard(ctx: &ParseContext<'_>, draft: &QueryDraft) -> bool {
    !draft.top_n && ctx.mentions(SERVICE_MOST_UPDATES)
}

pub fn service_most_updates(ctx: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    let product = ctx.product_column();
    let pk = ctx.primary_key();
    let projected = if ctx.table.has_column(product) {
        product.to_string()
    } else {
        pk.clone()
    };

    draft.intent = Some(Intent::FindMostFrequentEntity);
    draft.group_by_column = Some(product.to_string());
    draft.aggregations = vec![Aggregation::count(&pk, UPDATE_COUNT)];
    draft.order_by = Some(OrderBy::desc(UPDATE_COUNT));
    draft.limit = Some(1);
    draft.select_columns = vec![projected];

    // "<provider> service" pins the provider.
    let provider = ctx.provider_column();
    if let Some(keyword) = ctx
        .options
        .provider_keywords
        .iter()
        .find(|k| ctx.mentions(&format!("{k} service")))
    {
        draft
            .filters
            .retain(|f| f.column != provider || f.value.eq_ignore_ascii_case(keyword));
        if !draft.has_filter_on(provider) {
            draft.filters.push(Filter::equals(provider, keyword));
        }
    }

    draft
}

// =============================================================================
// Cleanup and fallback
// =============================================================================

pub fn dedupe_filters(_: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    let mut seen = HashSet::new();
    draft.filters.retain(|f| seen.insert(f.dedup_key()));
    draft
}

fn default_guard(_: &ParseContext<'_>, draft: &QueryDraft) -> bool {
    draft.intent.is_none()
}

pub fn default_find_data(ctx: &ParseContext<'_>, mut draft: QueryDraft) -> QueryDraft {
    draft.intent = Some(Intent::FindData);
    draft.select_columns = ctx.options.default_select_columns.clone();
    draft
}
