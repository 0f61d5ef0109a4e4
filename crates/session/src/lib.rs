//! Browsing session over a studio catalog.
//!
//! `CatalogSession` owns the loaded records and everything derived from them:
//! range domains, the filter state, the sort order, the ranked results and
//! the pagination window. Catalog fetches and image analyses are issued with
//! tickets; only the completion carrying the latest ticket is applied, so a
//! slow response can never overwrite a newer one.

use std::path::Path;

use atelier_backend_marketplace::{
    BackendError, CatalogPage, CatalogSource, ImageAnalysis, ImageAnalyzer, LocalCatalog,
};
use atelier_features::{annotate, normalize_batch, SignalRules};
use atelier_model::{FetchParams, ListingHit, ListingStatus, RawRecord, RecordSource, StudioRecord};
use atelier_query::{fetch_params, FilterAction, FilterState, RangeDomains};
use atelier_rerank::{rank, result_fingerprint, Paginator, RankConfig, RankedPage, SortOrder};
use serde::{Deserialize, Serialize};

/// Progress of the catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last fetch failed; the previous records are still shown
    Failed(String),
}

/// Progress of search-by-image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum ImageStatus {
    #[default]
    Idle,
    Analyzing,
    Ready,
    Failed(String),
}

/// Identifies one catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Identifies one image analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket(u64);

/// State of one user's browse through the catalog.
#[derive(Debug, Clone)]
pub struct CatalogSession {
    rules: SignalRules,
    remote: Vec<RawRecord>,
    workspace: Vec<RawRecord>,
    hits: Vec<ListingHit>,
    results: Vec<ListingHit>,
    state: FilterState,
    order: SortOrder,
    paginator: Paginator,
    load_state: LoadState,
    image_status: ImageStatus,
    fallback: bool,
    fetch_generation: u64,
    analysis_generation: u64,
}

impl Default for CatalogSession {
    fn default() -> Self {
        Self::new(SignalRules::default(), RankConfig::default())
    }
}

impl CatalogSession {
    pub fn new(rules: SignalRules, config: RankConfig) -> Self {
        Self {
            rules,
            remote: Vec::new(),
            workspace: Vec::new(),
            hits: Vec::new(),
            results: Vec::new(),
            state: FilterState::default(),
            order: config.order,
            paginator: Paginator::new(config.page_size),
            load_state: LoadState::Idle,
            image_status: ImageStatus::Idle,
            fallback: false,
            fetch_generation: 0,
            analysis_generation: 0,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn image_status(&self) -> &ImageStatus {
        &self.image_status
    }

    /// Whether the current records came from a fallback catalog.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn domains(&self) -> &RangeDomains {
        &self.state.domains
    }

    /// Every loaded listing, before filtering.
    pub fn listings(&self) -> &[ListingHit] {
        &self.hits
    }

    pub fn records(&self) -> impl Iterator<Item = &StudioRecord> {
        self.hits.iter().map(|hit| &hit.record)
    }

    /// Filtered, sorted results.
    pub fn results(&self) -> &[ListingHit] {
        &self.results
    }

    /// The visible window of the results.
    pub fn page(&self) -> RankedPage {
        RankedPage::from_results(&self.results, &self.paginator)
    }

    pub fn load_more(&mut self) {
        self.paginator.load_more(self.results.len());
    }

    /// Parameters the next catalog fetch should use.
    pub fn fetch_params(&self) -> FetchParams {
        fetch_params(&self.state)
    }

    /// Apply a filter action. Returns whether the catalog must be refetched.
    pub fn dispatch(&mut self, action: FilterAction) -> bool {
        let before = self.fetch_params();
        self.state = self.state.apply(action);
        self.refresh_results();
        self.fetch_params() != before
    }

    pub fn set_sort(&mut self, order: SortOrder) {
        if self.order != order {
            self.order = order;
            self.refresh_results();
        }
    }

    /// Replace the workspace records merged into the catalog.
    pub fn set_workspace_records(&mut self, records: Vec<RawRecord>) {
        self.workspace = records;
        self.rebuild();
    }

    /// Start a fetch; any fetch still in flight becomes stale.
    pub fn begin_fetch(&mut self) -> (FetchTicket, FetchParams) {
        self.fetch_generation += 1;
        self.load_state = LoadState::Loading;
        (FetchTicket(self.fetch_generation), self.fetch_params())
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale and the
    /// result was discarded.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<CatalogPage, BackendError>,
    ) -> bool {
        if ticket.0 != self.fetch_generation {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.fetch_generation,
                "Discarding stale fetch"
            );
            return false;
        }

        match result {
            Ok(page) => {
                tracing::debug!(
                    items = page.items.len(),
                    total = page.meta.total,
                    fallback = page.meta.fallback,
                    "Catalog loaded"
                );
                self.remote = page.items;
                self.fallback = page.meta.fallback;
                self.load_state = LoadState::Ready;
                self.rebuild();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed; keeping previous records");
                self.load_state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Fetch from `source` and apply the result.
    pub async fn refresh<S: CatalogSource>(&mut self, source: &S) -> bool {
        let (ticket, params) = self.begin_fetch();
        tracing::debug!(source = source.name(), ?params, "Refreshing catalog");
        let result = source.fetch(&params).await;
        self.complete_fetch(ticket, result)
    }

    /// Fetch from `source`, answering from `fallback` when it fails.
    pub async fn refresh_with_fallback<S: CatalogSource>(
        &mut self,
        source: &S,
        fallback: &LocalCatalog,
    ) -> bool {
        let (ticket, params) = self.begin_fetch();
        let result = match source.fetch(&params).await {
            Ok(page) => Ok(page),
            Err(e) => {
                tracing::warn!(
                    source = source.name(),
                    error = %e,
                    "Catalog source failed; using local catalog"
                );
                fallback.fetch(&params).await
            }
        };
        self.complete_fetch(ticket, result)
    }

    /// Start an image analysis; any analysis still in flight becomes stale.
    pub fn begin_analysis(&mut self) -> AnalysisTicket {
        self.analysis_generation += 1;
        self.image_status = ImageStatus::Analyzing;
        AnalysisTicket(self.analysis_generation)
    }

    /// Apply an analysis result. Failures clear the image keywords.
    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        result: Result<ImageAnalysis, BackendError>,
    ) -> bool {
        if ticket.0 != self.analysis_generation {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.analysis_generation,
                "Discarding stale image analysis"
            );
            return false;
        }

        match result {
            Ok(analysis) => {
                self.image_status = ImageStatus::Ready;
                self.dispatch(FilterAction::SetKeywords(analysis.keywords));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image analysis failed");
                self.image_status = ImageStatus::Failed(format!("Could not analyse image: {}", e));
                self.dispatch(FilterAction::ClearKeywords);
            }
        }
        true
    }

    /// Analyse an image and filter by its keywords.
    pub async fn analyze_image<A: ImageAnalyzer>(&mut self, analyzer: &A, path: &Path) -> bool {
        let ticket = self.begin_analysis();
        let result = analyzer.analyze(path).await;
        self.complete_analysis(ticket, result)
    }

    /// Drop the image filter and invalidate any analysis in flight.
    pub fn clear_image(&mut self) {
        self.analysis_generation += 1;
        self.image_status = ImageStatus::Idle;
        self.dispatch(FilterAction::ClearKeywords);
    }

    /// Re-derive records, signals and domains from the raw inputs.
    fn rebuild(&mut self) {
        let mut records = normalize_batch(&self.remote, RecordSource::Marketplace);
        let own = normalize_batch(&self.workspace, RecordSource::Workspace)
            .into_iter()
            .filter(|record| record.status == ListingStatus::Published);

        for record in own {
            match records.iter().position(|r| r.id == record.id) {
                Some(idx) => records[idx] = record,
                None => records.push(record),
            }
        }

        let domains = RangeDomains::from_records(&records);
        if domains != self.state.domains {
            tracing::debug!(?domains, "Range domains changed");
            self.state = self.state.apply(FilterAction::DomainsChanged(domains));
        }

        self.hits = annotate(records, &self.rules);
        self.refresh_results();
    }

    fn refresh_results(&mut self) {
        self.results = rank(&self.hits, &self.state, self.order);
        let fingerprint = result_fingerprint(&self.state, self.order, &self.results);
        if self.paginator.sync(fingerprint) {
            tracing::trace!(results = self.results.len(), "Pagination reset");
        }
    }
}
