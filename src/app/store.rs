// ListingDesk - app/store.rs
//
// The single writable source of truth for the working set.
//
// Every mutation builds a complete new Vec<Listing> and swaps it in as a
// fresh `Arc` snapshot, then notifies subscribers. Derived views (search ->
// conditions -> sort -> page, grouping, validation, analytics) are pure
// functions over the current snapshot and hold no state of their own.
//
// Single-threaded: mutations are serialised by the caller's event loop.

use crate::app::settings::{ConfirmAction, PersistedSettings, SettingsBackend};
use crate::core::analytics::{self, ListingSummary, PriceDistribution};
use crate::core::bulk::{self, PriceAdjustment, Scope};
use crate::core::export::ExportSpec;
use crate::core::filter::{apply_conditions, FilterCondition};
use crate::core::focus::{Bounds, CellPos, FocusNavigator, NavEvent, NavOutcome};
use crate::core::group::{group_by, Group, GroupExpansion, GroupField};
use crate::core::import::{normalise_batch, ImportDefaults, RawListing, RejectedRecord};
use crate::core::model::{Field, Listing, ListingId};
use crate::core::paginate::{default_rows_per_page, Pagination};
use crate::core::search::apply_search;
use crate::core::sort::{sort_indices, SortDirection, SortState};
use crate::core::validate::{self, ValidationIssue};
use crate::util::constants::DEFAULT_NARROW_VIEWPORT_WIDTH;
use crate::util::error::{BulkError, EditError};
use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::sync::Arc;

// =============================================================================
// Events
// =============================================================================

/// Notifications delivered to subscribers.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Full replacement snapshot after any mutation.
    Updated(Arc<Vec<Listing>>),

    /// Sort column or direction changed. `None` means unsorted.
    SortChanged {
        field: Option<Field>,
        direction: Option<SortDirection>,
    },

    /// Quick search or advanced conditions changed.
    FilterChanged {
        query: String,
        conditions: Vec<FilterCondition>,
    },
}

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

// =============================================================================
// Import merge
// =============================================================================

/// Where an imported batch goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Append,
    /// Discard the current working set.
    Replace,
    /// Insert before this row of the working set (clamped to the end).
    InsertAt(usize),
}

/// Counts returned to the caller for review after a merge.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Ids assigned to the accepted rows, in batch order.
    pub accepted: Vec<ListingId>,
    /// Accepted rows that carry at least one autofill annotation.
    pub autofilled: usize,
    /// Records missing TITLE; not merged.
    pub rejected: Vec<RejectedRecord>,
}

impl ImportSummary {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

// =============================================================================
// Views
// =============================================================================

/// Filtered and sorted rows over one snapshot.
#[derive(Debug, Clone)]
pub struct ListingView {
    snapshot: Arc<Vec<Listing>>,
    indices: Vec<usize>,
}

impl ListingView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Listing> {
        self.indices.get(position).map(|&i| &self.snapshot[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listing> + '_ {
        self.indices.iter().map(move |&i| &self.snapshot[i])
    }

    pub fn ids(&self) -> Vec<ListingId> {
        self.iter().map(|l| l.id).collect()
    }
}

/// The rows shown on the current page.
#[derive(Debug, Clone)]
pub struct PageWindow {
    view: ListingView,
    range: Range<usize>,
    pub page: usize,
    pub total_pages: usize,
    /// Rows in the whole filtered view.
    pub total_rows: usize,
}

impl PageWindow {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Listing> + '_ {
        self.range.clone().filter_map(move |p| self.view.get(p))
    }

    /// Row `row` of the page (0-based within the page).
    pub fn row(&self, row: usize) -> Option<&Listing> {
        if row >= self.range.len() {
            return None;
        }
        self.view.get(self.range.start + row)
    }
}

// =============================================================================
// Store
// =============================================================================

/// Construction options for a store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Width of the hosting viewport, used for the default page size.
    pub viewport_width: u32,
    pub narrow_viewport_width: u32,
    /// Configured page size used when no size was persisted yet.
    pub rows_per_page: Option<usize>,
    pub import_defaults: ImportDefaults,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            viewport_width: u32::MAX,
            narrow_viewport_width: DEFAULT_NARROW_VIEWPORT_WIDTH,
            rows_per_page: None,
            import_defaults: ImportDefaults::default(),
        }
    }
}

pub struct ListingStore {
    snapshot: Arc<Vec<Listing>>,
    next_id: ListingId,
    selected: BTreeSet<ListingId>,
    search_query: String,
    conditions: Vec<FilterCondition>,
    sort: SortState,
    pagination: Pagination,
    settings: PersistedSettings,
    backend: Box<dyn SettingsBackend>,
    focus: FocusNavigator,
    /// Listing and column the open editor writes to, fixed when editing starts.
    edit_target: Option<(ListingId, Field)>,
    visible_columns: Vec<Field>,
    group_expansion: GroupExpansion,
    import_defaults: ImportDefaults,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for ListingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingStore")
            .field("listings", &self.snapshot.len())
            .field("selected", &self.selected.len())
            .field("search_query", &self.search_query)
            .field("conditions", &self.conditions.len())
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .field("focus", &self.focus)
            .field("edit_target", &self.edit_target)
            .finish_non_exhaustive()
    }
}

impl ListingStore {
    /// Build a store over `listings`, restoring page state from `backend`.
    ///
    /// Duplicate ids in the input are reassigned so ids stay unique. So is
    /// `ListingId::MAX`, which is reserved so allocation never overflows.
    pub fn new(
        listings: Vec<Listing>,
        backend: Box<dyn SettingsBackend>,
        options: StoreOptions,
    ) -> Self {
        let mut next_id = listings
            .iter()
            .map(|l| l.id)
            .filter(|&id| id < ListingId::MAX)
            .max()
            .unwrap_or(0)
            + 1;
        let mut seen = HashSet::new();
        let listings: Vec<Listing> = listings
            .into_iter()
            .map(|mut l| {
                if l.id == ListingId::MAX || !seen.insert(l.id) {
                    tracing::warn!(duplicate = l.id, new_id = next_id, "Reassigned duplicate listing id");
                    l.id = next_id;
                    seen.insert(next_id);
                    next_id += 1;
                }
                l
            })
            .collect();

        let settings = backend.load().unwrap_or_default();
        let rows = settings.rows_per_page.or(options.rows_per_page).unwrap_or_else(|| {
            default_rows_per_page(options.viewport_width, options.narrow_viewport_width)
        });
        let fallback_rows = default_rows_per_page(options.viewport_width, options.narrow_viewport_width);
        let pagination = Pagination::new(settings.current_page, rows, fallback_rows);

        let mut store = Self {
            snapshot: Arc::new(listings),
            next_id,
            selected: BTreeSet::new(),
            search_query: String::new(),
            conditions: Vec::new(),
            sort: SortState::unsorted(),
            pagination,
            settings,
            backend,
            focus: FocusNavigator::default(),
            edit_target: None,
            visible_columns: Field::all().to_vec(),
            group_expansion: GroupExpansion::default(),
            import_defaults: options.import_defaults,
            subscribers: Vec::new(),
        };
        store.reconcile_view();

        tracing::info!(
            listings = store.snapshot.len(),
            page = store.pagination.current_page(),
            rows_per_page = store.pagination.rows_per_page(),
            "Listing store ready"
        );
        store
    }

    /// Register a subscriber for update, sort, and filter notifications.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&StoreEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    // -------------------------------------------------------------------------
    // Snapshot access
    // -------------------------------------------------------------------------

    /// The current immutable snapshot (cheap to clone and share).
    pub fn snapshot(&self) -> Arc<Vec<Listing>> {
        Arc::clone(&self.snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.snapshot.iter().find(|l| l.id == id)
    }

    fn position_of(&self, id: ListingId) -> Result<usize, EditError> {
        self.snapshot
            .iter()
            .position(|l| l.id == id)
            .ok_or(EditError::UnknownListing { id })
    }

    // -------------------------------------------------------------------------
    // Derived views
    // -------------------------------------------------------------------------

    /// Search, then advanced conditions, then sort.
    pub fn view(&self) -> ListingView {
        let listings = self.snapshot.as_slice();
        let all: Vec<usize> = (0..listings.len()).collect();
        let searched = apply_search(listings, &all, &self.search_query);
        let mut indices = apply_conditions(listings, &searched, &self.conditions);
        sort_indices(listings, &mut indices, &self.sort);
        ListingView {
            snapshot: self.snapshot(),
            indices,
        }
    }

    /// The current page of the view.
    pub fn page(&self) -> PageWindow {
        let view = self.view();
        let total_rows = view.len();
        PageWindow {
            range: self.pagination.range(total_rows),
            page: self.pagination.current_page(),
            total_pages: self.pagination.total_pages(total_rows),
            total_rows,
            view,
        }
    }

    /// Groups over the whole working set, independent of paging.
    pub fn groups(&self, by: GroupField) -> Vec<Group<'_>> {
        group_by(&self.snapshot, by)
    }

    pub fn group_expansion(&self) -> &GroupExpansion {
        &self.group_expansion
    }

    pub fn group_expansion_mut(&mut self) -> &mut GroupExpansion {
        &mut self.group_expansion
    }

    /// Inline markers for one listing.
    pub fn issues(&self, id: ListingId) -> Vec<ValidationIssue> {
        self.listing(id).map(validate::validate).unwrap_or_default()
    }

    /// Every listing that has at least one marker.
    pub fn validation_report(&self) -> Vec<(ListingId, Vec<ValidationIssue>)> {
        self.snapshot
            .iter()
            .map(|l| (l.id, validate::validate(l)))
            .filter(|(_, issues)| !issues.is_empty())
            .collect()
    }

    pub fn summary(&self) -> ListingSummary {
        analytics::summary(&self.snapshot)
    }

    pub fn price_distribution(&self, bins: usize) -> PriceDistribution {
        analytics::price_distribution(&self.snapshot, bins)
    }

    /// Export spec for the full working set: visible columns, current sort.
    pub fn export_spec(&self, include_autofill: bool) -> ExportSpec {
        ExportSpec {
            columns: self.visible_columns.clone(),
            sort: self.sort,
            include_autofill,
        }
    }

    // -------------------------------------------------------------------------
    // Search and conditions
    // -------------------------------------------------------------------------

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Replace the quick search. Always returns to page 1.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.pagination.reset();
        tracing::debug!(query = %self.search_query, "Search changed");
        self.reconcile_view();
        self.persist();
        self.notify_filter();
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Replace the advanced conditions. Always returns to page 1.
    pub fn set_conditions(&mut self, conditions: Vec<FilterCondition>) {
        self.conditions = conditions;
        self.pagination.reset();
        tracing::debug!(conditions = self.conditions.len(), "Advanced filter changed");
        self.reconcile_view();
        self.persist();
        self.notify_filter();
    }

    pub fn add_condition(&mut self, condition: FilterCondition) {
        let mut next = self.conditions.clone();
        next.push(condition);
        self.set_conditions(next);
    }

    pub fn clear_filters(&mut self) {
        self.search_query.clear();
        self.set_conditions(Vec::new());
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Header click: tri-state cycle on `field`.
    pub fn click_header(&mut self, field: Field) {
        self.sort.cycle(field);
        self.after_sort_change();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.after_sort_change();
    }

    fn after_sort_change(&mut self) {
        tracing::debug!(sort = ?self.sort, "Sort changed");
        self.reconcile_view();
        let event = StoreEvent::SortChanged {
            field: self.sort.field(),
            direction: self.sort.direction(),
        };
        self.emit(&event);
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Change the page size; returns false for unsupported sizes.
    pub fn set_rows_per_page(&mut self, rows: usize) -> bool {
        if !self.pagination.set_rows_per_page(rows) {
            tracing::warn!(rows, "Unsupported rows-per-page value ignored");
            return false;
        }
        self.settings.rows_per_page = Some(rows);
        self.reconcile_view();
        self.persist();
        true
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.view().len();
        self.pagination.go_to(page, total);
        self.after_page_change();
    }

    pub fn next_page(&mut self) {
        let total = self.view().len();
        self.pagination.next(total);
        self.after_page_change();
    }

    pub fn previous_page(&mut self) {
        let total = self.view().len();
        self.pagination.previous(total);
        self.after_page_change();
    }

    pub fn first_page(&mut self) {
        self.pagination.first();
        self.after_page_change();
    }

    pub fn last_page(&mut self) {
        let total = self.view().len();
        self.pagination.last(total);
        self.after_page_change();
    }

    fn after_page_change(&mut self) {
        self.reconcile_view();
        self.persist();
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    pub fn visible_columns(&self) -> &[Field] {
        &self.visible_columns
    }

    /// Show or hide a column. Shown columns keep display order.
    pub fn set_column_visible(&mut self, field: Field, visible: bool) {
        let columns: Vec<Field> = Field::all()
            .iter()
            .copied()
            .filter(|f| {
                if *f == field {
                    visible
                } else {
                    self.visible_columns.contains(f)
                }
            })
            .collect();
        self.visible_columns = columns;
        self.reconcile_view();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selected(&self) -> &BTreeSet<ListingId> {
        &self.selected
    }

    pub fn is_selected(&self, id: ListingId) -> bool {
        self.selected.contains(&id)
    }

    /// Returns false when the id is not in the working set.
    pub fn select(&mut self, id: ListingId) -> bool {
        if self.listing(id).is_none() {
            return false;
        }
        self.selected.insert(id);
        true
    }

    pub fn deselect(&mut self, id: ListingId) {
        self.selected.remove(&id);
    }

    pub fn toggle_selected(&mut self, id: ListingId) {
        if !self.selected.remove(&id) {
            self.select(id);
        }
    }

    /// Select every row of the filtered view (all pages).
    pub fn select_all_visible(&mut self) {
        let ids = self.view().ids();
        self.selected.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // -------------------------------------------------------------------------
    // Single-record mutations
    // -------------------------------------------------------------------------

    fn allocate_id(&mut self) -> ListingId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Append a blank row and return its id.
    pub fn add_row(&mut self) -> ListingId {
        let id = self.allocate_id();
        let mut next = self.snapshot.as_ref().clone();
        next.push(Listing::blank(id));
        self.commit(next, "add row");
        id
    }

    /// Copy a listing (including its autofill annotations) right after the
    /// original, under a fresh id.
    pub fn duplicate(&mut self, id: ListingId) -> Result<ListingId, EditError> {
        let pos = self.position_of(id)?;
        let new_id = self.allocate_id();
        let mut copy = self.snapshot[pos].clone();
        copy.id = new_id;
        let mut next = self.snapshot.as_ref().clone();
        next.insert(pos + 1, copy);
        self.commit(next, "duplicate");
        Ok(new_id)
    }

    pub fn delete(&mut self, id: ListingId) -> Result<(), EditError> {
        let pos = self.position_of(id)?;
        let mut next = self.snapshot.as_ref().clone();
        next.remove(pos);
        self.commit(next, "delete");
        Ok(())
    }

    /// Edit one cell. Text is coerced into the field's type; text that cannot
    /// be represented leaves the listing unchanged and is reported.
    ///
    /// Autofill annotations survive edits; only `acknowledge_autofill`
    /// removes them.
    pub fn edit_cell(&mut self, id: ListingId, field: Field, text: &str) -> Result<(), EditError> {
        let pos = self.position_of(id)?;
        let mut next = self.snapshot.as_ref().clone();
        next[pos]
            .set_from_text(field, text)
            .map_err(|reason| EditError::InvalidValue {
                field: field.label(),
                value: text.to_string(),
                reason,
            })?;
        if next[pos] == self.snapshot[pos] {
            return Ok(());
        }
        self.commit(next, "edit cell");
        Ok(())
    }

    /// Mark an autofilled field as reviewed, removing its annotation.
    /// Returns false when the field had no annotation.
    pub fn acknowledge_autofill(&mut self, id: ListingId, field: Field) -> Result<bool, EditError> {
        let pos = self.position_of(id)?;
        if !self.snapshot[pos].is_auto_filled(field) {
            return Ok(false);
        }
        let mut next = self.snapshot.as_ref().clone();
        next[pos].auto_filled.retain(|a| a.field != field);
        tracing::info!(id, field = %field, "Autofill annotation acknowledged");
        self.commit(next, "acknowledge autofill");
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Bulk mutations
    // -------------------------------------------------------------------------

    pub fn set_field(&mut self, scope: Scope, field: Field, value: &str) -> Result<usize, BulkError> {
        let targets = bulk::resolve_targets(&self.snapshot, scope, &self.selected, "Set field")?;
        let next = bulk::set_field(&self.snapshot, &targets, field, value)?;
        tracing::info!(field = %field, rows = targets.len(), ?scope, "Bulk set field");
        self.commit(next, "bulk set field");
        Ok(targets.len())
    }

    pub fn clear_field(&mut self, scope: Scope, field: Field) -> Result<usize, BulkError> {
        let targets = bulk::resolve_targets(&self.snapshot, scope, &self.selected, "Clear field")?;
        let next = bulk::clear_field(&self.snapshot, &targets, field);
        tracing::info!(field = %field, rows = targets.len(), ?scope, "Bulk clear field");
        self.commit(next, "bulk clear field");
        Ok(targets.len())
    }

    pub fn adjust_prices(&mut self, scope: Scope, adjustment: &PriceAdjustment) -> Result<usize, BulkError> {
        let targets = bulk::resolve_targets(&self.snapshot, scope, &self.selected, "Adjust prices")?;
        let next = bulk::adjust_prices(&self.snapshot, &targets, adjustment)?;
        tracing::info!(rows = targets.len(), ?scope, ?adjustment, "Bulk price adjustment");
        self.commit(next, "bulk adjust prices");
        Ok(targets.len())
    }

    /// Delete every selected row in one pass.
    pub fn delete_selected(&mut self) -> Result<usize, BulkError> {
        if self.selected.is_empty() {
            return Err(BulkError::NoRowsSelected {
                operation: "Delete selected",
            });
        }
        let before = self.snapshot.len();
        let next: Vec<Listing> = self
            .snapshot
            .iter()
            .filter(|l| !self.selected.contains(&l.id))
            .cloned()
            .collect();
        let removed = before - next.len();
        if removed == 0 {
            return Err(BulkError::NoRowsSelected {
                operation: "Delete selected",
            });
        }
        tracing::info!(removed, "Bulk delete");
        self.commit(next, "bulk delete");
        Ok(removed)
    }

    /// Evict every listing missing a required field (title, price > 0,
    /// condition). Returns the evicted ids.
    pub fn remove_invalid_rows(&mut self) -> Vec<ListingId> {
        let (evicted, kept): (Vec<Listing>, Vec<Listing>) = self
            .snapshot
            .iter()
            .cloned()
            .partition(validate::is_missing_required);
        let ids: Vec<ListingId> = evicted.iter().map(|l| l.id).collect();
        if ids.is_empty() {
            tracing::debug!("No invalid rows to remove");
            return ids;
        }
        tracing::info!(removed = ids.len(), ids = ?ids, "Removed rows missing required fields");
        self.commit(kept, "remove invalid rows");
        ids
    }

    // -------------------------------------------------------------------------
    // Import
    // -------------------------------------------------------------------------

    /// Normalise and merge a finished batch in one step.
    pub fn merge_import(&mut self, batch: Vec<RawListing>, mode: MergeMode) -> ImportSummary {
        let normalised = normalise_batch(batch, &self.import_defaults);
        let autofilled = normalised.autofilled_count();

        let mut incoming = normalised.listings;
        let mut accepted = Vec::with_capacity(incoming.len());
        for listing in &mut incoming {
            listing.id = self.allocate_id();
            accepted.push(listing.id);
        }

        let summary = ImportSummary {
            accepted,
            autofilled,
            rejected: normalised.rejected,
        };

        if incoming.is_empty() && mode != MergeMode::Replace {
            tracing::info!(rejected = summary.rejected_count(), "Import merged nothing");
            return summary;
        }

        let next = match mode {
            MergeMode::Append => {
                let mut next = self.snapshot.as_ref().clone();
                next.extend(incoming);
                next
            }
            MergeMode::Replace => incoming,
            MergeMode::InsertAt(row) => {
                let mut next = self.snapshot.as_ref().clone();
                let at = row.min(next.len());
                next.splice(at..at, incoming);
                next
            }
        };

        tracing::info!(
            ?mode,
            accepted = summary.accepted_count(),
            autofilled = summary.autofilled,
            rejected = summary.rejected_count(),
            "Import merged"
        );
        self.commit(next, "import merge");
        summary
    }

    // -------------------------------------------------------------------------
    // Focus and cell editing
    // -------------------------------------------------------------------------

    pub fn focus(&self) -> &FocusNavigator {
        &self.focus
    }

    /// The listing and column under the cursor, or the one being edited.
    pub fn focused_cell(&self) -> Option<(ListingId, Field)> {
        if let Some(target) = self.edit_target {
            return Some(target);
        }
        let cell = self.focus.cursor()?;
        self.resolve_cell(&self.page(), cell)
    }

    fn resolve_cell(&self, window: &PageWindow, cell: CellPos) -> Option<(ListingId, Field)> {
        let listing = window.row(cell.row)?;
        let field = *self.visible_columns.get(cell.col)?;
        Some((listing.id, field))
    }

    fn window_bounds(&self, window: &PageWindow) -> Bounds {
        Bounds::new(window.len(), self.visible_columns.len())
    }

    /// Feed a keyboard/pointer event to the grid.
    ///
    /// Keystrokes while editing are committed immediately. Closing the editor
    /// never rolls them back. A keystroke that cannot be stored (e.g. a
    /// letter in PRICE) is reported but keeps the editor open.
    ///
    /// The editor is bound to the listing under the cursor when it opens.
    /// Later keystrokes go to that listing even if sort or filters move it.
    pub fn handle_nav(&mut self, event: NavEvent) -> Result<NavOutcome, EditError> {
        let window = self.page();
        let bounds = self.window_bounds(&window);
        let outcome = self.focus.handle(event, bounds);

        match &outcome {
            NavOutcome::StartedEditing(cell) => {
                self.edit_target = self.resolve_cell(&window, *cell);
            }
            NavOutcome::Commit { text, .. } => {
                let (id, field) = self.edit_target.ok_or(EditError::NotEditing)?;
                self.edit_cell(id, field, text)?;
                if let Some(row) = self.page().rows().position(|l| l.id == id) {
                    self.focus.follow_row(row);
                }
            }
            _ => {}
        }
        if !self.focus.is_editing() {
            self.edit_target = None;
        }
        Ok(outcome)
    }

    // -------------------------------------------------------------------------
    // Confirmation flags
    // -------------------------------------------------------------------------

    /// Whether the UI should ask before running `action`.
    pub fn should_confirm(&self, action: ConfirmAction) -> bool {
        !self.settings.skips_confirm(action)
    }

    /// Record the user's "don't ask again" choice.
    pub fn set_skip_confirm(&mut self, action: ConfirmAction, skip: bool) {
        self.settings.skip_confirm.insert(action, skip);
        self.persist();
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Swap in a new snapshot, drop stale selection, keep page and focus in
    /// range, and notify subscribers.
    fn commit(&mut self, next: Vec<Listing>, operation: &'static str) {
        self.snapshot = Arc::new(next);

        let live: HashSet<ListingId> = self.snapshot.iter().map(|l| l.id).collect();
        self.selected.retain(|id| live.contains(id));
        if let Some((id, _)) = self.edit_target {
            if !live.contains(&id) {
                self.edit_target = None;
                self.focus.stop_editing();
            }
        }

        let page_before = self.pagination.current_page();
        self.reconcile_view();
        if self.pagination.current_page() != page_before {
            self.persist();
        }

        tracing::debug!(operation, listings = self.snapshot.len(), "Snapshot published");
        let event = StoreEvent::Updated(self.snapshot());
        self.emit(&event);
    }

    /// Clamp the page to the view and the cursor to the page.
    fn reconcile_view(&mut self) {
        let total = self.view().len();
        if self.pagination.clamp(total) {
            tracing::debug!(page = self.pagination.current_page(), "Current page clamped");
        }
        let window = self.page();
        let bounds = self.window_bounds(&window);
        self.focus.clamp_to(bounds);
    }

    fn persist(&mut self) {
        self.settings.current_page = self.pagination.current_page();
        if let Err(e) = self.backend.save(&self.settings) {
            tracing::warn!(error = %e, "Failed to persist view settings");
        }
    }

    fn notify_filter(&mut self) {
        let event = StoreEvent::FilterChanged {
            query: self.search_query.clone(),
            conditions: self.conditions.clone(),
        };
        self.emit(&event);
    }

    fn emit(&mut self, event: &StoreEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}
