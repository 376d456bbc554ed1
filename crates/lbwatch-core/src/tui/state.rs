//! Application state management.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::{ChartColors, DashboardConfig};
use crate::error::FetchError;
use crate::telemetry::{
    Application, Capabilities, ExportRequest, FailoverEvent, FailoverQuery, ListFilter, Node,
    ServiceRow, SessionQuery, UserSession,
};
use crate::viewport::ViewportTracker;

use super::widgets::OverviewCanvas;

/// Available tabs in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Overview,
    Applications,
    Failover,
    Sessions,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Applications, Tab::Failover, Tab::Sessions]
    }

    /// Returns the display name of the tab.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Applications => "Applications",
            Tab::Failover => "Failover",
            Tab::Sessions => "Sessions",
        }
    }

    /// Tab for a 1-based number key.
    pub fn from_number(n: u32) -> Option<Tab> {
        Self::all().get((n as usize).checked_sub(1)?).copied()
    }

    /// Returns the next tab.
    pub fn next(&self) -> Tab {
        match self {
            Tab::Overview => Tab::Applications,
            Tab::Applications => Tab::Failover,
            Tab::Failover => Tab::Sessions,
            Tab::Sessions => Tab::Overview,
        }
    }

    /// Returns the previous tab.
    pub fn prev(&self) -> Tab {
        match self {
            Tab::Overview => Tab::Sessions,
            Tab::Applications => Tab::Overview,
            Tab::Failover => Tab::Applications,
            Tab::Sessions => Tab::Failover,
        }
    }

    /// Whether the tab's list takes a [`ListFilter`] and can be exported.
    pub fn is_filterable(&self) -> bool {
        matches!(self, Tab::Failover | Tab::Sessions)
    }
}

/// Active popup state. Only one popup can be open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    None,
    Help,
    /// Filter form of a list tab; the form itself is [`AppState::filter_form`].
    Filter,
}

/// Editable field of the filter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    From,
    To,
    Kind,
    User,
    Status,
}

impl FilterField {
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::From => "From",
            FilterField::To => "To",
            FilterField::Kind => "Type",
            FilterField::User => "User",
            FilterField::Status => "Status",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            FilterField::From | FilterField::To => "YYYY-MM-DD",
            FilterField::Kind => "substring, e.g. Manual or VPN",
            FilterField::User => "substring of the account name",
            FilterField::Status => "Active or Terminated",
        }
    }
}

/// Filter form being edited in the filter popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterForm {
    pub tab: Tab,
    pub fields: Vec<(FilterField, String)>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FilterForm {
    /// Form for `tab` prefilled from its current filter. `None` for tabs
    /// without filters.
    pub fn for_tab(tab: Tab, current: &ListFilter) -> Option<Self> {
        let keys: &[FilterField] = match tab {
            Tab::Failover => &[FilterField::From, FilterField::To, FilterField::Kind],
            Tab::Sessions => &[
                FilterField::From,
                FilterField::To,
                FilterField::User,
                FilterField::Kind,
                FilterField::Status,
            ],
            Tab::Overview | Tab::Applications => return None,
        };
        let value = |field: &FilterField| {
            let value = match field {
                FilterField::From => &current.from,
                FilterField::To => &current.to,
                FilterField::Kind => &current.kind,
                FilterField::User => &current.user,
                FilterField::Status => &current.status,
            };
            value.clone().unwrap_or_default()
        };
        Some(Self {
            tab,
            fields: keys.iter().map(|f| (*f, value(f))).collect(),
            focus: 0,
            error: None,
        })
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push(&mut self, c: char) {
        if let Some((_, value)) = self.fields.get_mut(self.focus) {
            value.push(c);
        }
        self.error = None;
    }

    pub fn pop(&mut self) {
        if let Some((_, value)) = self.fields.get_mut(self.focus) {
            value.pop();
        }
        self.error = None;
    }

    pub fn clear_field(&mut self) {
        if let Some((_, value)) = self.fields.get_mut(self.focus) {
            value.clear();
        }
        self.error = None;
    }

    /// Validates the form. Dates must be `YYYY-MM-DD` and `from` must not be
    /// after `to`; blank fields are unset.
    pub fn to_filter(&self) -> Result<ListFilter, String> {
        let mut filter = ListFilter::default();
        for (field, value) in &self.fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if matches!(field, FilterField::From | FilterField::To)
                && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err()
            {
                return Err(format!("{} must be a date like 2025-12-08", field.label()));
            }
            let slot = match field {
                FilterField::From => &mut filter.from,
                FilterField::To => &mut filter.to,
                FilterField::Kind => &mut filter.kind,
                FilterField::User => &mut filter.user,
                FilterField::Status => &mut filter.status,
            };
            *slot = Some(value.to_string());
        }
        if let (Some(from), Some(to)) = (&filter.from, &filter.to) {
            // ISO dates order lexicographically.
            if from > to {
                return Err("From is after To".to_string());
            }
        }
        Ok(filter)
    }
}

/// Result of a one-shot list fetch, tagged with the epoch it was issued under.
#[derive(Debug)]
pub struct ListUpdate {
    pub epoch: u64,
    pub payload: ListPayload,
}

#[derive(Debug)]
pub enum ListPayload {
    Capabilities(Result<Capabilities, FetchError>),
    Applications(Result<Vec<Application>, FetchError>),
    Services(Result<Vec<ServiceRow>, FetchError>),
    Failover(Result<Vec<FailoverEvent>, FetchError>),
    Sessions(Result<Vec<UserSession>, FetchError>),
    /// CSV export finished; not bound to any list epoch.
    Exported(Result<PathBuf, String>),
}

/// Rows of one list tab plus its fetch bookkeeping.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
    pub fetched_at: Option<DateTime<Local>>,
    epoch: u64,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            selected: 0,
            fetched_at: None,
            epoch: 0,
        }
    }
}

impl<T> ListView<T> {
    /// Starts a fetch; results carrying any other epoch are ignored.
    pub fn begin(&mut self) -> u64 {
        self.epoch += 1;
        self.loading = true;
        self.epoch
    }

    /// Abandons any fetch in flight (tab left).
    pub fn detach(&mut self) {
        self.epoch += 1;
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.error = None;
        self.selected = 0;
        self.fetched_at = None;
    }

    /// Applies a fetch result. Returns false when it is stale.
    pub fn apply(&mut self, epoch: u64, result: Result<Vec<T>, FetchError>) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding stale list result");
            return false;
        }
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
                self.selected = self.selected.min(self.items.len().saturating_sub(1));
                self.fetched_at = Some(Local::now());
            }
            Err(e) => {
                warn!(error = %e, "list fetch failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }
}

/// Unified selection access over the three list tabs.
pub trait Navigable {
    fn select_up(&mut self);
    fn select_down(&mut self);
    fn page_up(&mut self, n: usize);
    fn page_down(&mut self, n: usize);
    fn home(&mut self);
    fn end(&mut self);
}

impl<T> Navigable for ListView<T> {
    fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    fn page_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    fn page_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.items.len().saturating_sub(1));
    }

    fn home(&mut self) {
        self.selected = 0;
    }

    fn end(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }
}

/// Main application state.
pub struct AppState {
    pub current_tab: Tab,
    pub node: Node,
    pub popup: PopupState,
    pub capabilities: Capabilities,
    pub applications: ListView<Application>,
    pub services: ListView<ServiceRow>,
    pub failover: ListView<FailoverEvent>,
    pub sessions: ListView<UserSession>,
    pub failover_filter: ListFilter,
    pub session_filter: ListFilter,
    /// Form shown while `popup` is [`PopupState::Filter`].
    pub filter_form: Option<FilterForm>,
    /// Transient message shown on the right of the header.
    pub status_message: Option<String>,
    /// Login location after the appliance rejected our session.
    pub auth_redirect: Option<String>,
    /// Width of the trend panel in pixels, observed on every frame.
    pub viewport: ViewportTracker,
    /// Present only while the Overview tab is mounted.
    pub overview: Option<OverviewCanvas>,
    pub colors: ChartColors,
    pub poll_interval_secs: u64,
    pub demo: bool,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            current_tab: Tab::Overview,
            node: config.node,
            popup: PopupState::None,
            capabilities: Capabilities::default(),
            applications: ListView::default(),
            services: ListView::default(),
            failover: ListView::default(),
            sessions: ListView::default(),
            failover_filter: ListFilter::default(),
            session_filter: ListFilter::default(),
            filter_form: None,
            status_message: None,
            auth_redirect: None,
            viewport: ViewportTracker::new(0),
            overview: None,
            colors: config.colors,
            poll_interval_secs: config.poll_interval.as_secs(),
            demo: config.is_demo(),
        }
    }

    /// Creates the overview surfaces and their viewport listener.
    pub fn mount_overview(&mut self) {
        if self.overview.is_none() {
            self.overview = Some(OverviewCanvas::new(&self.viewport, self.colors));
        }
    }

    /// Drops the overview surfaces, detaching their viewport listener.
    pub fn unmount_overview(&mut self) {
        self.overview = None;
    }

    pub fn filter(&self, tab: Tab) -> Option<&ListFilter> {
        match tab {
            Tab::Failover => Some(&self.failover_filter),
            Tab::Sessions => Some(&self.session_filter),
            Tab::Overview | Tab::Applications => None,
        }
    }

    pub fn failover_query(&self) -> FailoverQuery {
        self.failover_filter.failover_query(self.node)
    }

    pub fn session_query(&self) -> SessionQuery {
        self.session_filter.session_query(self.node)
    }

    /// Export of the current tab's filtered list, if it has one.
    pub fn export_request(&self) -> Option<ExportRequest> {
        match self.current_tab {
            Tab::Failover => Some(ExportRequest::FailoverHistory(self.failover_query())),
            Tab::Sessions => Some(ExportRequest::UserSessions(self.session_query())),
            Tab::Overview | Tab::Applications => None,
        }
    }

    /// Opens the filter popup for the current tab. Returns false when the
    /// tab has no filters.
    pub fn open_filter_form(&mut self) -> bool {
        let form = self
            .filter(self.current_tab)
            .and_then(|current| FilterForm::for_tab(self.current_tab, current));
        match form {
            Some(form) => {
                self.filter_form = Some(form);
                self.popup = PopupState::Filter;
                true
            }
            None => false,
        }
    }

    pub fn close_filter_form(&mut self) {
        self.filter_form = None;
        self.popup = PopupState::None;
    }

    /// Validates the open form and stores its filter. Returns the tab whose
    /// list must be re-fetched; on a validation error the form stays open
    /// with the message.
    pub fn submit_filter_form(&mut self) -> Option<Tab> {
        let form = self.filter_form.as_mut()?;
        let filter = match form.to_filter() {
            Ok(filter) => filter,
            Err(message) => {
                form.error = Some(message);
                return None;
            }
        };
        let tab = form.tab;
        self.close_filter_form();
        self.set_filter(tab, filter);
        Some(tab)
    }

    /// Removes the current tab's filter. Returns true when one was set.
    pub fn clear_filter(&mut self) -> bool {
        let tab = self.current_tab;
        let was_set = self.filter(tab).is_some_and(|f| !f.is_empty());
        if was_set {
            self.set_filter(tab, ListFilter::default());
        }
        was_set
    }

    fn set_filter(&mut self, tab: Tab, filter: ListFilter) {
        debug!(tab = tab.name(), filter = %filter.summary(), "list filter changed");
        self.status_message = if filter.is_empty() {
            Some("Filter cleared".to_string())
        } else {
            Some(format!("Filter: {}", filter.summary()))
        };
        match tab {
            Tab::Failover => self.failover_filter = filter,
            Tab::Sessions => self.session_filter = filter,
            Tab::Overview | Tab::Applications => {}
        }
    }

    /// Selection target for the current tab, if it is a list.
    pub fn navigable(&mut self) -> Option<&mut dyn Navigable> {
        match self.current_tab {
            Tab::Overview => None,
            Tab::Applications => Some(&mut self.applications),
            Tab::Failover => Some(&mut self.failover),
            Tab::Sessions => Some(&mut self.sessions),
        }
    }

    /// Drops list rows fetched for the previous node and abandons their fetches.
    pub fn reset_lists(&mut self) {
        self.applications.detach();
        self.applications.clear();
        self.services.detach();
        self.services.clear();
        self.failover.detach();
        self.failover.clear();
        self.sessions.detach();
        self.sessions.clear();
    }

    /// Abandons the fetch of a tab being left.
    pub fn detach_list(&mut self, tab: Tab) {
        match tab {
            Tab::Overview => {}
            Tab::Applications => {
                self.applications.detach();
                self.services.detach();
            }
            Tab::Failover => self.failover.detach(),
            Tab::Sessions => self.sessions.detach(),
        }
    }

    /// Routes a fetch result to its list. Returns false for stale results.
    pub fn apply_list(&mut self, update: ListUpdate) -> bool {
        match update.payload {
            ListPayload::Capabilities(Ok(caps)) => {
                self.capabilities = caps;
                true
            }
            ListPayload::Capabilities(Err(e)) => {
                debug!(error = %e, "capabilities unavailable, using defaults");
                false
            }
            ListPayload::Applications(result) => self.applications.apply(update.epoch, result),
            ListPayload::Services(result) => self.services.apply(update.epoch, result),
            ListPayload::Failover(result) => self.failover.apply(update.epoch, result),
            ListPayload::Sessions(result) => self.sessions.apply(update.epoch, result),
            ListPayload::Exported(Ok(path)) => {
                info!(path = %path.display(), "export written");
                self.status_message = Some(format!("Exported to {}", path.display()));
                true
            }
            ListPayload::Exported(Err(e)) => {
                warn!(error = %e, "export failed");
                self.status_message = Some(format!("Export failed: {}", e));
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle() {
        let mut tab = Tab::Overview;
        for _ in 0..Tab::all().len() {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Overview);
        assert_eq!(Tab::Overview.prev(), Tab::Sessions);
        for t in Tab::all() {
            assert_eq!(t.next().prev(), *t);
        }
    }

    #[test]
    fn test_tab_from_number() {
        assert_eq!(Tab::from_number(1), Some(Tab::Overview));
        assert_eq!(Tab::from_number(4), Some(Tab::Sessions));
        assert_eq!(Tab::from_number(0), None);
        assert_eq!(Tab::from_number(5), None);
    }

    fn app(name: &str) -> Application {
        Application {
            name: name.to_string(),
            ..Application::default()
        }
    }

    #[test]
    fn test_list_epoch_guard() {
        let mut list: ListView<Application> = ListView::default();
        let first = list.begin();
        let second = list.begin();
        assert!(list.loading);

        assert!(!list.apply(first, Ok(vec![app("stale")])));
        assert!(list.items.is_empty());
        assert!(list.loading);

        assert!(list.apply(second, Ok(vec![app("web"), app("api")])));
        assert!(!list.loading);
        assert_eq!(list.items.len(), 2);
        assert!(list.fetched_at.is_some());
    }

    #[test]
    fn test_detached_list_ignores_late_result() {
        let mut list: ListView<Application> = ListView::default();
        let epoch = list.begin();
        list.detach();
        assert!(!list.loading);
        assert!(!list.apply(epoch, Ok(vec![app("late")])));
        assert!(list.items.is_empty());
    }

    #[test]
    fn test_list_error_keeps_rows() {
        let mut list: ListView<Application> = ListView::default();
        let epoch = list.begin();
        list.apply(epoch, Ok(vec![app("web")]));
        let epoch = list.begin();
        assert!(list.apply(epoch, Err(FetchError::Status(502))));
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.error.as_deref(), Some("HTTP 502"));
    }

    fn state_on(tab: Tab) -> AppState {
        let mut state = AppState::new(&DashboardConfig::default());
        state.current_tab = tab;
        state
    }

    #[test]
    fn test_overview_mount_attaches_single_listener() {
        let mut state = AppState::new(&DashboardConfig::default());
        assert_eq!(state.viewport.listener_count(), 0);
        state.mount_overview();
        state.mount_overview();
        assert_eq!(state.viewport.listener_count(), 1);
        state.unmount_overview();
        assert!(state.overview.is_none());
        assert_eq!(state.viewport.listener_count(), 0);
    }

    #[test]
    fn test_filter_form_submit_stores_filter() {
        let mut state = state_on(Tab::Sessions);
        assert!(state.open_filter_form());
        assert_eq!(state.popup, PopupState::Filter);
        let form = state.filter_form.as_mut().unwrap();
        assert_eq!(form.fields.len(), 5);
        form.focus = 2;
        for c in "jane".chars() {
            form.push(c);
        }

        assert_eq!(state.submit_filter_form(), Some(Tab::Sessions));
        assert_eq!(state.popup, PopupState::None);
        assert!(state.filter_form.is_none());
        assert_eq!(state.session_filter.user.as_deref(), Some("jane"));
        assert_eq!(state.session_query().user.as_deref(), Some("jane"));
        assert_eq!(state.status_message.as_deref(), Some("Filter: user=jane"));
    }

    #[test]
    fn test_filter_form_rejects_bad_dates() {
        let mut state = state_on(Tab::Failover);
        state.open_filter_form();
        let form = state.filter_form.as_mut().unwrap();
        assert_eq!(form.fields.len(), 3);
        form.fields[0].1 = "2025-13-01".to_string();
        assert_eq!(state.submit_filter_form(), None);
        assert_eq!(state.popup, PopupState::Filter);
        let form = state.filter_form.as_mut().unwrap();
        assert!(form.error.as_deref().unwrap().starts_with("From"));

        form.fields[0].1 = "2025-12-08".to_string();
        form.fields[1].1 = "2025-12-01".to_string();
        assert_eq!(state.submit_filter_form(), None);
        assert!(state.failover_filter.is_empty());

        let form = state.filter_form.as_mut().unwrap();
        form.fields[1].1 = "2025-12-31".to_string();
        assert_eq!(state.submit_filter_form(), Some(Tab::Failover));
        assert_eq!(state.failover_query().from.as_deref(), Some("2025-12-08"));
    }

    #[test]
    fn test_filter_form_prefills_and_clears() {
        let mut state = state_on(Tab::Failover);
        state.failover_filter.kind = Some("Manual".to_string());
        state.open_filter_form();
        let form = state.filter_form.as_ref().unwrap();
        assert_eq!(form.fields[2], (FilterField::Kind, "Manual".to_string()));
        state.close_filter_form();

        assert!(state.clear_filter());
        assert!(state.failover_filter.is_empty());
        assert!(!state.clear_filter());

        let mut applications = state_on(Tab::Applications);
        assert!(!applications.open_filter_form());
        assert!(applications.export_request().is_none());
    }

    #[test]
    fn test_export_result_is_reported() {
        let mut state = state_on(Tab::Sessions);
        assert!(matches!(
            state.export_request(),
            Some(ExportRequest::UserSessions(q)) if q.node == Node::Primary
        ));
        state.apply_list(ListUpdate {
            epoch: 0,
            payload: ListPayload::Exported(Ok(PathBuf::from("out.csv"))),
        });
        assert_eq!(state.status_message.as_deref(), Some("Exported to out.csv"));
        state.apply_list(ListUpdate {
            epoch: 0,
            payload: ListPayload::Exported(Err("HTTP 500".to_string())),
        });
        assert_eq!(state.status_message.as_deref(), Some("Export failed: HTTP 500"));
    }

    #[test]
    fn test_selection_clamps() {
        let mut list: ListView<Application> = ListView::default();
        let epoch = list.begin();
        list.apply(epoch, Ok(vec![app("a"), app("b"), app("c")]));
        list.select_down();
        list.select_down();
        list.select_down();
        assert_eq!(list.selected, 2);
        list.page_up(10);
        assert_eq!(list.selected, 0);
        list.end();
        assert_eq!(list.selected, 2);

        let epoch = list.begin();
        list.apply(epoch, Ok(vec![app("a")]));
        assert_eq!(list.selected, 0);
    }
}
