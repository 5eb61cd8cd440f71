//! Shelf query: the filter -> sort pipeline over enriched products.
//!
//! The pipeline is pure: it takes the enriched collection and a
//! [`FilterState`] and returns row indices, preserving input order unless a
//! sort is active. Every state change re-runs the whole pipeline.

#![forbid(unsafe_code)]

use std::cmp::Ordering;

use shelf_core::{CategoryId, EnrichedProduct, UserId};
use tracing::debug;

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Product,
    Category,
    User,
}

/// Three-state sort setting.
///
/// Activating a column cycles unsorted -> ascending -> descending ->
/// unsorted; activating a different column always starts ascending.
/// `Unsorted` leaves the post-filter order untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sort {
    #[default]
    Unsorted,
    Ascending(SortColumn),
    Descending(SortColumn),
}

impl Sort {
    /// Pure transition for a header activation on `column`.
    pub fn cycle(self, column: SortColumn) -> Sort {
        match self {
            Sort::Ascending(cur) if cur == column => Sort::Descending(column),
            Sort::Descending(cur) if cur == column => Sort::Unsorted,
            _ => Sort::Ascending(column),
        }
    }

    pub fn column(self) -> Option<SortColumn> {
        match self {
            Sort::Unsorted => None,
            Sort::Ascending(c) | Sort::Descending(c) => Some(c),
        }
    }

    pub fn is_descending(self) -> bool {
        matches!(self, Sort::Descending(_))
    }
}

/// The complete set of user-adjustable query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub selected_user: Option<UserId>,
    /// Insertion order is kept for display; only membership drives filtering.
    pub selected_categories: Vec<CategoryId>,
    pub query: String,
    pub sort: Sort,
}

impl FilterState {
    pub fn select_user(&mut self, user: Option<UserId>) {
        self.selected_user = user;
    }

    pub fn toggle_category(&mut self, id: CategoryId) {
        if let Some(pos) = self.selected_categories.iter().position(|&c| c == id) {
            self.selected_categories.remove(pos);
        } else {
            self.selected_categories.push(id);
        }
    }

    pub fn clear_categories(&mut self) {
        self.selected_categories.clear();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn cycle_sort(&mut self, column: SortColumn) {
        self.sort = self.sort.cycle(column);
    }

    /// Restore every parameter to its default in one step.
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// True when any filter would narrow the result set.
    pub fn has_active_filters(&self) -> bool {
        self.selected_user.is_some()
            || !self.selected_categories.is_empty()
            || !self.query.trim().is_empty()
    }
}

/// Survivor counts after each pipeline stage.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct PipelineDebug {
    pub total: usize,
    pub after_user: usize,
    pub after_categories: usize,
    pub after_query: usize,
}

/// Run the full pipeline and return row indices into `items`.
pub fn apply(items: &[EnrichedProduct], state: &FilterState) -> Vec<usize> {
    apply_with_debug(items, state).0
}

/// As [`apply`], also reporting per-stage survivor counts.
pub fn apply_with_debug(
    items: &[EnrichedProduct],
    state: &FilterState,
) -> (Vec<usize>, PipelineDebug) {
    let started = std::time::Instant::now();
    let mut dbg = PipelineDebug {
        total: items.len(),
        ..Default::default()
    };

    let mut ix: Vec<usize> = (0..items.len())
        .filter(|&i| matches_user(&items[i], state.selected_user))
        .collect();
    dbg.after_user = ix.len();

    ix.retain(|&i| matches_categories(&items[i], &state.selected_categories));
    dbg.after_categories = ix.len();

    let query = state.query.trim().to_lowercase();
    if !query.is_empty() {
        ix.retain(|&i| matches_query(&items[i], &query));
    }
    dbg.after_query = ix.len();

    sort_indices(items, &mut ix, state.sort);

    metrics::gauge!("pipeline_rows", ix.len() as f64);
    metrics::histogram!("pipeline_eval_ms", started.elapsed().as_secs_f64() * 1_000.0);
    debug!(
        total = dbg.total,
        after_user = dbg.after_user,
        after_categories = dbg.after_categories,
        after_query = dbg.after_query,
        "pipeline evaluated"
    );
    (ix, dbg)
}

fn matches_user(p: &EnrichedProduct, selected: Option<UserId>) -> bool {
    match selected {
        None => true,
        Some(id) => p.user.as_ref().map(|u| u.id == id).unwrap_or(false),
    }
}

fn matches_categories(p: &EnrichedProduct, selected: &[CategoryId]) -> bool {
    selected.is_empty()
        || p.category
            .as_ref()
            .map(|c| selected.contains(&c.id))
            .unwrap_or(false)
}

/// Case-insensitive substring match against the product name, category
/// title, and owner name. An unlinked category/user only opts out of its
/// own clause: a product with broken links can still match on its name.
fn matches_query(p: &EnrichedProduct, query_lower: &str) -> bool {
    if p.name.to_lowercase().contains(query_lower) {
        return true;
    }
    if p.category
        .as_ref()
        .map(|c| c.title.to_lowercase().contains(query_lower))
        .unwrap_or(false)
    {
        return true;
    }
    p.user
        .as_ref()
        .map(|u| u.name.to_lowercase().contains(query_lower))
        .unwrap_or(false)
}

fn sort_indices(items: &[EnrichedProduct], ix: &mut [usize], sort: Sort) {
    let (column, descending) = match sort {
        Sort::Unsorted => return,
        Sort::Ascending(c) => (c, false),
        Sort::Descending(c) => (c, true),
    };
    // slice::sort_by is stable: equal keys keep the post-filter order,
    // in both directions (descending only flips the comparator sign).
    ix.sort_by(|&a, &b| {
        let ord = compare(&items[a], &items[b], column);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn compare(a: &EnrichedProduct, b: &EnrichedProduct, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::Product => cmp_ci(&a.name, &b.name),
        SortColumn::Category => cmp_ci(category_title(a), category_title(b)),
        SortColumn::User => cmp_ci(user_name(a), user_name(b)),
    }
}

fn category_title(p: &EnrichedProduct) -> &str {
    p.category.as_ref().map(|c| c.title.as_str()).unwrap_or("")
}

fn user_name(p: &EnrichedProduct) -> &str {
    p.user.as_ref().map(|u| u.name.as_str()).unwrap_or("")
}

/// Case-insensitive lexicographic compare. Keys equal ignoring case are
/// reported equal so the stable sort keeps their incoming order.
fn cmp_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{Catalog, Category, Product, Sex, User};

    fn user(id: u32, name: &str, sex: Sex) -> User {
        User { id, name: name.to_string(), sex }
    }

    fn cat(id: u32, title: &str, owner_id: u32) -> Category {
        Category { id, title: title.to_string(), icon: "🍏".to_string(), owner_id }
    }

    fn prod(id: u32, name: &str, category_id: u32) -> Product {
        Product { id, name: name.to_string(), category_id }
    }

    fn single_apple() -> Vec<EnrichedProduct> {
        Catalog {
            users: vec![user(100, "Max", Sex::Male)],
            categories: vec![cat(10, "Fruits", 100)],
            products: vec![prod(1, "Apple", 10)],
        }
        .enrich()
    }

    #[test]
    fn user_filter_keeps_owned_products() {
        let items = single_apple();
        let mut state = FilterState::default();
        state.select_user(Some(100));
        assert_eq!(apply(&items, &state), vec![0]);

        state.select_user(Some(999));
        assert!(apply(&items, &state).is_empty());
    }

    #[test]
    fn query_matches_case_insensitively() {
        let items = single_apple();
        let mut state = FilterState::default();
        state.set_query("aPPle");
        assert_eq!(apply(&items, &state), vec![0]);

        state.set_query("zzz");
        assert!(apply(&items, &state).is_empty());
    }

    #[test]
    fn whitespace_query_is_inactive() {
        let items = single_apple();
        let mut state = FilterState::default();
        state.set_query("   ");
        assert_eq!(apply(&items, &state), vec![0]);
    }

    #[test]
    fn query_matches_category_and_user_names() {
        let items = single_apple();
        let mut state = FilterState::default();
        state.set_query("fruit");
        assert_eq!(apply(&items, &state), vec![0]);
        state.set_query("max");
        assert_eq!(apply(&items, &state), vec![0]);
    }

    #[test]
    fn unlinked_product_only_matches_on_name() {
        let items = Catalog {
            users: vec![user(1, "Maxine", Sex::Female)],
            categories: vec![cat(1, "Fruits", 1)],
            products: vec![prod(1, "Apple", 1), prod(2, "Maxi brush", 99)],
        }
        .enrich();
        let mut state = FilterState::default();
        // "max" hits Apple via its owner and the unlinked product via its name.
        state.set_query("max");
        assert_eq!(apply(&items, &state), vec![0, 1]);
        // "fruit" must not crash on the unlinked product, and must not match it.
        state.set_query("fruit");
        assert_eq!(apply(&items, &state), vec![0]);
    }

    #[test]
    fn unlinked_product_never_matches_a_user_filter() {
        let items = Catalog {
            users: vec![user(1, "Roma", Sex::Male)],
            categories: vec![cat(1, "Grocery", 1)],
            products: vec![prod(1, "Milk", 1), prod(2, "Mystery", 99)],
        }
        .enrich();
        let mut state = FilterState::default();
        state.select_user(Some(1));
        assert_eq!(apply(&items, &state), vec![0]);
        state.select_user(None);
        state.toggle_category(1);
        assert_eq!(apply(&items, &state), vec![0]);
    }

    #[test]
    fn category_toggle_adds_and_removes() {
        let mut state = FilterState::default();
        state.toggle_category(3);
        state.toggle_category(1);
        assert_eq!(state.selected_categories, vec![3, 1]);
        state.toggle_category(3);
        assert_eq!(state.selected_categories, vec![1]);
        state.clear_categories();
        assert!(state.selected_categories.is_empty());
    }

    #[test]
    fn sort_cycle_walks_three_states() {
        let mut sort = Sort::Unsorted;
        sort = sort.cycle(SortColumn::Id);
        assert_eq!(sort, Sort::Ascending(SortColumn::Id));
        sort = sort.cycle(SortColumn::Id);
        assert_eq!(sort, Sort::Descending(SortColumn::Id));
        sort = sort.cycle(SortColumn::Id);
        assert_eq!(sort, Sort::Unsorted);
    }

    #[test]
    fn switching_column_starts_ascending() {
        let sort = Sort::Descending(SortColumn::Id).cycle(SortColumn::User);
        assert_eq!(sort, Sort::Ascending(SortColumn::User));
    }

    #[test]
    fn id_sort_cycle_matches_natural_order() {
        let items = Catalog {
            users: vec![user(1, "Roma", Sex::Male)],
            categories: vec![cat(1, "Grocery", 1)],
            products: vec![prod(3, "Milk", 1), prod(1, "Bread", 1), prod(2, "Garlic", 1)],
        }
        .enrich();
        let mut state = FilterState::default();

        state.cycle_sort(SortColumn::Id);
        let ids = |ix: &[usize]| ix.iter().map(|&i| items[i].id).collect::<Vec<_>>();
        assert_eq!(ids(&apply(&items, &state)), vec![1, 2, 3]);

        state.cycle_sort(SortColumn::Id);
        assert_eq!(ids(&apply(&items, &state)), vec![3, 2, 1]);

        state.cycle_sort(SortColumn::Id);
        assert_eq!(ids(&apply(&items, &state)), vec![3, 1, 2]);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = FilterState::default();
        state.select_user(Some(2));
        state.toggle_category(1);
        state.set_query("milk");
        state.cycle_sort(SortColumn::User);
        assert!(state.has_active_filters());

        state.reset();
        assert_eq!(state, FilterState::default());
        assert!(!state.has_active_filters());
    }

    #[test]
    fn debug_counts_track_each_stage() {
        let items = Catalog {
            users: vec![user(1, "Roma", Sex::Male), user(2, "Anna", Sex::Female)],
            categories: vec![cat(1, "Grocery", 1), cat(2, "Drinks", 2)],
            products: vec![
                prod(1, "Milk", 1),
                prod(2, "Bread", 1),
                prod(3, "Tea", 2),
            ],
        }
        .enrich();
        let mut state = FilterState::default();
        state.select_user(Some(1));
        state.toggle_category(1);
        state.set_query("milk");
        let (ix, dbg) = apply_with_debug(&items, &state);
        assert_eq!(dbg.total, 3);
        assert_eq!(dbg.after_user, 2);
        assert_eq!(dbg.after_categories, 2);
        assert_eq!(dbg.after_query, 1);
        assert_eq!(ix, vec![0]);
    }
}
