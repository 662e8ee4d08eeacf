//! Application state store.
//!
//! [`Store`] is the single owner of the session and the incident collection.
//! Every mutation goes through a named method, is visible to the next read,
//! and (when it touches incidents) rewrites the full collection to storage.
//!
//! Time, id generation and coordinate jitter are injected so the store is
//! deterministic under test.
//!
//! The store does not enforce that resolved incidents stay closed; that rule
//! belongs to the caller boundary in [`crate::actions`].

use crate::clock::{Clock, SystemClock};
use crate::config::MapConfig;
use crate::ids::{ClockIds, IdGenerator};
use crate::model::{
    Coordinates, HistoryEntry, Incident, IncidentDraft, IncidentPatch, Status, Timestamp, User,
    View, dedup_resources,
};
use crate::query::{self, Facets, FilterPatch, FilterSet, Listing, SortField, SortSpec};
use crate::storage::{
    INCIDENTS_KEY, LoadPolicy, LoadSource, PersistError, Storage, load_incidents, save_incidents,
};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::{debug, info, warn};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_DISPLAY_NAME: &str = "Administrador";
pub const ADMIN_ROLE: &str = "admin";

pub const ACTION_REGISTERED: &str = "Incidente registrado";
pub const ACTION_RESOURCES_UPDATED: &str = "Recursos actualizados";

const MAX_ID_ATTEMPTS: usize = 64;

/// History text recorded when an update sets the status.
#[must_use]
pub fn status_changed_action(status: Status) -> String {
    format!("Estado cambiado a {status}")
}

/// Snapshot of everything the dashboard renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub user: User,
    pub current_view: View,
    /// Copy of the incident opened in the detail view; not kept in sync.
    pub selected_incident: Option<Incident>,
    pub incidents: Vec<Incident>,
    pub filters: FilterSet,
    pub search_term: String,
    pub sort_spec: SortSpec,
}

impl AppState {
    #[must_use]
    pub fn new(incidents: Vec<Incident>) -> Self {
        Self {
            user: User::anonymous(),
            current_view: View::default(),
            selected_incident: None,
            incidents,
            filters: FilterSet::default(),
            search_term: String::new(),
            sort_spec: SortSpec::default(),
        }
    }

    #[must_use]
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|incident| incident.id == id)
    }

    /// Filtered, searched and sorted view of the collection.
    #[must_use]
    pub fn listing(&self) -> Listing<'_> {
        query::run(
            &self.incidents,
            &self.filters,
            &self.search_term,
            &self.sort_spec,
        )
    }

    #[must_use]
    pub fn facets(&self) -> Facets {
        Facets::collect(&self.incidents)
    }

    #[must_use]
    pub fn has_active_criteria(&self) -> bool {
        query::has_active_criteria(&self.filters, &self.search_term)
    }
}

/// Builder for [`Store`]; unset collaborators default to the wall clock,
/// time-based ids and an entropy-seeded RNG.
pub struct StoreBuilder {
    storage: Box<dyn Storage>,
    key: String,
    policy: LoadPolicy,
    clock: Option<Box<dyn Clock>>,
    ids: Option<Box<dyn IdGenerator>>,
    rng: Option<Box<dyn RngCore>>,
    map: MapConfig,
}

impl StoreBuilder {
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub const fn load_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    #[must_use]
    pub fn ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    #[must_use]
    pub fn rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    #[must_use]
    pub const fn map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    /// Load the collection and build the store.
    pub fn open(self) -> Result<Store, PersistError> {
        let (incidents, source) = load_incidents(self.storage.as_ref(), &self.key, self.policy)?;
        debug!(key = %self.key, ?source, count = incidents.len(), "store opened");
        Ok(Store {
            state: AppState::new(incidents),
            storage: self.storage,
            key: self.key,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            ids: self.ids.unwrap_or_else(|| Box::new(ClockIds::default())),
            rng: self
                .rng
                .unwrap_or_else(|| Box::new(StdRng::from_entropy())),
            map: self.map,
            load_source: source,
            dirty: false,
        })
    }
}

/// The application state container.
pub struct Store {
    state: AppState,
    storage: Box<dyn Storage>,
    key: String,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    rng: Box<dyn RngCore>,
    map: MapConfig,
    load_source: LoadSource,
    dirty: bool,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("key", &self.key)
            .field("incidents", &self.state.incidents.len())
            .field("load_source", &self.load_source)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Store {
    #[must_use]
    pub fn builder(storage: impl Storage + 'static) -> StoreBuilder {
        StoreBuilder {
            storage: Box::new(storage),
            key: INCIDENTS_KEY.to_string(),
            policy: LoadPolicy::default(),
            clock: None,
            ids: None,
            rng: None,
            map: MapConfig::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// True when the last automatic persist failed and memory is ahead of storage.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.state.incident(id)
    }

    #[must_use]
    pub fn listing(&self) -> Listing<'_> {
        self.state.listing()
    }

    #[must_use]
    pub fn facets(&self) -> Facets {
        self.state.facets()
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Check the fixed operator credentials. On failure nothing changes.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        if username != ADMIN_USERNAME || password != ADMIN_PASSWORD {
            warn!("login rejected");
            return false;
        }
        self.state.user = User {
            authenticated: true,
            name: ADMIN_DISPLAY_NAME.to_string(),
            role: ADMIN_ROLE.to_string(),
        };
        info!(user = ADMIN_DISPLAY_NAME, "operator signed in");
        true
    }

    /// Sign out and return to the dashboard. Incidents are kept.
    pub fn logout(&mut self) -> &AppState {
        info!(user = %self.state.user.name, "operator signed out");
        self.state.user = User::anonymous();
        self.state.current_view = View::Dashboard;
        &self.state
    }

    pub fn set_current_view(&mut self, view: View) -> &AppState {
        self.state.current_view = view;
        &self.state
    }

    pub fn set_selected_incident(&mut self, incident: Option<Incident>) -> &AppState {
        self.state.selected_incident = incident;
        &self.state
    }

    /// Open the detail view for `id`. Returns false for unknown ids.
    pub fn select_incident_by_id(&mut self, id: &str) -> bool {
        let Some(incident) = self.state.incident(id).cloned() else {
            return false;
        };
        self.state.selected_incident = Some(incident);
        self.state.current_view = View::IncidentDetail;
        true
    }

    // -----------------------------------------------------------------------
    // Incidents
    // -----------------------------------------------------------------------

    /// Register a new incident and return it.
    ///
    /// The store assigns a fresh id, the creation time, the signed-in
    /// operator, `Pending` status and the first history entry. Coordinates
    /// missing from the draft are jittered around the map reference point.
    pub fn add_incident(&mut self, draft: IncidentDraft) -> &Incident {
        let now = self.clock.now();
        let stamp = Timestamp::from_utc(now);
        let id = self.fresh_id(now);
        let operator = self.state.user.name.clone();
        let coordinates = draft
            .coordinates
            .unwrap_or_else(|| self.jittered_coordinates());

        let incident = Incident {
            id,
            kind: draft.kind,
            location: draft.location,
            status: Status::Pending,
            timestamp: stamp,
            resources: dedup_resources(&draft.resources),
            operator: operator.clone(),
            description: draft.description,
            involved_parties: draft.involved_parties,
            history: vec![HistoryEntry {
                timestamp: stamp,
                action: ACTION_REGISTERED.to_string(),
                operator,
            }],
            coordinates: Some(coordinates),
        };

        info!(id = %incident.id, kind = %incident.kind, "incident registered");
        self.state.incidents.push(incident);
        self.persist();
        let idx = self.state.incidents.len() - 1;
        &self.state.incidents[idx]
    }

    /// Merge `patch` into the incident with `id`.
    ///
    /// When the patch carries a status or resources, exactly one history
    /// entry is appended; a status change is described in preference to a
    /// resource change. Unknown ids are ignored and return `None`.
    pub fn update_incident(&mut self, id: &str, patch: IncidentPatch) -> Option<&Incident> {
        let Some(idx) = self.state.incidents.iter().position(|i| i.id == id) else {
            debug!(id, "update ignored: unknown incident");
            return None;
        };

        let entry = patch.is_material().then(|| HistoryEntry {
            timestamp: Timestamp::from_utc(self.clock.now()),
            action: patch
                .status
                .map_or_else(|| ACTION_RESOURCES_UPDATED.to_string(), status_changed_action),
            operator: self.state.user.name.clone(),
        });

        let incident = &mut self.state.incidents[idx];
        if let Some(kind) = patch.kind {
            incident.kind = kind;
        }
        if let Some(location) = patch.location {
            incident.location = location;
        }
        if let Some(status) = patch.status {
            incident.status = status;
        }
        if let Some(resources) = patch.resources {
            incident.resources = dedup_resources(&resources);
        }
        if let Some(description) = patch.description {
            incident.description = Some(description);
        }
        if let Some(parties) = patch.involved_parties {
            incident.involved_parties = parties;
        }
        if let Some(coordinates) = patch.coordinates {
            incident.coordinates = Some(coordinates);
        }
        if let Some(entry) = entry {
            debug!(id, action = %entry.action, "history appended");
            incident.history.push(entry);
        }

        self.persist();
        self.state.incidents.get(idx)
    }

    // -----------------------------------------------------------------------
    // Query criteria
    // -----------------------------------------------------------------------

    pub fn set_filters(&mut self, patch: FilterPatch) -> &AppState {
        self.state.filters.merge(patch);
        &self.state
    }

    /// Clear every filter dimension and the search term.
    pub fn clear_filters(&mut self) -> &AppState {
        self.state.filters.merge(FilterPatch::clear_all());
        self.state.search_term.clear();
        &self.state
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> &AppState {
        self.state.search_term = term.into();
        &self.state
    }

    pub fn set_sort_spec(&mut self, spec: SortSpec) -> &AppState {
        self.state.sort_spec = spec;
        &self.state
    }

    /// Replace the sort spec with a function of the current one.
    pub fn update_sort_spec(&mut self, update: impl FnOnce(&SortSpec) -> SortSpec) -> &AppState {
        self.state.sort_spec = update(&self.state.sort_spec);
        &self.state
    }

    /// Column-header click; see [`SortSpec::toggle`].
    pub fn toggle_sort(&mut self, field: SortField) -> &AppState {
        self.update_sort_spec(|spec| spec.toggled(field))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the collection now, surfacing any error.
    pub fn save(&mut self) -> Result<(), PersistError> {
        save_incidents(self.storage.as_mut(), &self.key, &self.state.incidents)?;
        self.dirty = false;
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(err) = self.save() {
            warn!(key = %self.key, error = %err, "failed to persist incidents");
            self.dirty = true;
        }
    }

    fn contains_id(&self, id: &str) -> bool {
        self.state.incidents.iter().any(|incident| incident.id == id)
    }

    fn fresh_id(&mut self, now: chrono::DateTime<chrono::Utc>) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id(now);
            if !self.contains_id(&candidate) {
                return candidate;
            }
        }
        let base = self.ids.next_id(now);
        (1_u64..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.contains_id(candidate))
            .unwrap_or(base)
    }

    fn jittered_coordinates(&mut self) -> Coordinates {
        let span = self.map.jitter_span;
        let lat_offset = self.rng.gen_range(-0.5..0.5) * span;
        let lng_offset = self.rng.gen_range(-0.5..0.5) * span;
        Coordinates {
            latitude: self.map.reference_lat + lat_offset,
            longitude: self.map.reference_lng + lng_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ids::SequenceIds;
    use crate::model::IncidentKind;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};

    fn store() -> Store {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        Store::builder(MemoryStorage::new())
            .clock(FixedClock::frozen(start))
            .ids(SequenceIds::default())
            .rng(StdRng::seed_from_u64(7))
            .open()
            .unwrap()
    }

    #[test]
    fn opens_with_seed_when_storage_is_empty() {
        let store = store();
        assert_eq!(store.load_source(), LoadSource::Seed);
        assert_eq!(store.state().incidents.len(), 5);
        assert!(!store.state().user.authenticated);
        assert_eq!(store.state().current_view, View::Dashboard);
    }

    #[test]
    fn login_accepts_only_fixed_credentials() {
        let mut store = store();
        assert!(!store.login("admin", "wrong"));
        assert!(!store.login("root", "admin123"));
        assert_eq!(store.state().user, User::anonymous());

        assert!(store.login("admin", "admin123"));
        assert!(store.state().user.authenticated);
        assert_eq!(store.state().user.name, "Administrador");
        assert_eq!(store.state().user.role, "admin");
    }

    #[test]
    fn logout_resets_view_but_keeps_incidents() {
        let mut store = store();
        store.login("admin", "admin123");
        store.set_current_view(View::IncidentForm);
        let state = store.logout();
        assert!(!state.user.authenticated);
        assert_eq!(state.current_view, View::Dashboard);
        assert_eq!(state.incidents.len(), 5);
    }

    #[test]
    fn sequence_ids_skip_existing_seed_ids() {
        let mut store = store();
        store.login("admin", "admin123");
        let id = store
            .add_incident(IncidentDraft::new(IncidentKind::Other, "Calle 1"))
            .id
            .clone();
        assert_eq!(id, "006");
    }

    #[test]
    fn jitter_stays_within_span() {
        let mut store = store();
        let incident = store.add_incident(IncidentDraft::new(IncidentKind::Fire, "x"));
        let coords = incident.coordinates.unwrap();
        assert!((coords.latitude - 4.6097).abs() <= 0.05);
        assert!((coords.longitude + 74.0817).abs() <= 0.05);
    }

    #[test]
    fn draft_coordinates_are_kept() {
        let mut store = store();
        let given = Coordinates {
            latitude: 1.0,
            longitude: 2.0,
        };
        let incident = store.add_incident(
            IncidentDraft::new(IncidentKind::Fire, "x").with_coordinates(given),
        );
        assert_eq!(incident.coordinates, Some(given));
    }

    #[test]
    fn select_by_id_opens_detail_with_a_copy() {
        let mut store = store();
        assert!(store.select_incident_by_id("002"));
        assert_eq!(store.state().current_view, View::IncidentDetail);

        store.update_incident("002", IncidentPatch::status(Status::Resolved));
        let selected = store.state().selected_incident.as_ref().unwrap();
        assert_eq!(selected.status, Status::InProgress);

        assert!(!store.select_incident_by_id("999"));
    }

    #[test]
    fn non_material_update_adds_no_history() {
        let mut store = store();
        let updated = store
            .update_incident("001", IncidentPatch::default().with_location("Calle 124"))
            .unwrap();
        assert_eq!(updated.location, "Calle 124");
        assert!(updated.history.is_empty());
    }

    #[test]
    fn clear_filters_resets_search() {
        let mut store = store();
        store.set_filters(FilterPatch::default().statuses([Status::Pending]));
        store.set_search_term("calle");
        assert!(store.state().has_active_criteria());

        let state = store.clear_filters();
        assert!(!state.has_active_criteria());
    }

    #[test]
    fn toggle_sort_goes_through_updater() {
        let mut store = store();
        store.toggle_sort(SortField::Timestamp);
        store.toggle_sort(SortField::Timestamp);
        assert_eq!(store.state().sort_spec.describe(), "fechaHora ↓");
        assert_eq!(store.listing().ids()[0], "004");
    }
}
