//! Dashboard actions
//!
//! Each user interaction is one of these operations applied to a session's
//! state. They never fail: problems become notices on the session.

use std::sync::Arc;
use tracing::info;

use crate::config::DashboardConfig;
use crate::input::{parse_weights, DashboardForm};
use crate::route_client::{RouteClient, RouteRequest};
use crate::session::{NoticeLevel, SessionState, SessionStore};
use crate::warehouse::{query_or_empty, Warehouse};
use crate::weights::{self, Preset};

pub struct DashboardService {
    pub config: DashboardConfig,
    pub sessions: SessionStore,
    warehouse: Arc<dyn Warehouse>,
    routes: RouteClient,
}

impl DashboardService {
    pub fn new(config: DashboardConfig, warehouse: Arc<dyn Warehouse>, routes: RouteClient) -> Self {
        Self {
            sessions: SessionStore::new(config.session_idle),
            config,
            warehouse,
            routes,
        }
    }

    /// Record the submitted field values. Returns false when a weight edit
    /// was rejected, in which case the action should not proceed.
    pub fn apply_form(&self, state: &mut SessionState, form: &DashboardForm) -> bool {
        state.form.absorb(form);
        match parse_weights(form, &state.weights) {
            Ok(edited) => {
                state.weights = weights::apply_edit(&edited, state.recalculation);
                true
            }
            Err(e) => {
                state.notify(NoticeLevel::Error, e.to_string());
                false
            }
        }
    }

    /// "Query routes": look up warehouse rows for the SKU and postal code.
    pub async fn query_routes(&self, state: &mut SessionState, form: &DashboardForm) {
        if !self.apply_form(state, form) {
            return;
        }

        let params = match state.form.query_params() {
            Ok(p) => p,
            Err(e) => {
                state.notify(NoticeLevel::Error, e.to_string());
                state.query_attempted = false;
                return;
            }
        };

        let (rows, failure) = query_or_empty(self.warehouse.as_ref(), params).await;
        if let Some(message) = failure {
            state.notify(NoticeLevel::Error, message);
        }

        state.rows = rows;
        state.query_attempted = true;
        state.route = None;
        state.scroll_to = None;
        state.rejected_store = None;
    }

    /// "Calculate route": ask the route service for the best route.
    pub async fn calculate_route(&self, state: &mut SessionState, form: &DashboardForm) {
        if !self.apply_form(state, form) {
            return;
        }

        let (_, qty) = match state.form.route_params() {
            Ok(p) => p,
            Err(e) => {
                state.notify(NoticeLevel::Error, e.to_string());
                return;
            }
        };

        let recalculation = if state.recalculation {
            match state.form.recalculation_context(self.config.purchase_date) {
                Ok(ctx) => Some(ctx),
                Err(e) => {
                    state.notify(NoticeLevel::Error, e.to_string());
                    return;
                }
            }
        } else {
            None
        };
        state.rejected_store = recalculation.map(|ctx| ctx.rejecting_store);

        let request = RouteRequest::new(&state.form.sku, &state.form.cp, qty, state.weights, recalculation);
        let outcome = self.routes.calculate(&request).await;

        state.scroll_to = outcome
            .response()
            .and_then(|r| r.rutas.first())
            .map(|r| r.id_trazo.clone());
        state.route = Some(outcome);
    }

    /// Switch recalculation mode, resetting the weights for the new mode.
    pub fn toggle_recalculation(&self, state: &mut SessionState, form: &DashboardForm) {
        state.form.absorb(form);
        state.recalculation = !state.recalculation;
        state.weights = weights::weights_for_recalculation_toggle(state.recalculation);
        if !state.recalculation {
            state.rejected_store = None;
        }
        info!(enabled = state.recalculation, "Recalculation toggled");
    }

    /// Overwrite all weights with a preset. Presets are unavailable while
    /// recalculating, where the base weights stay pinned to high season.
    pub fn apply_preset(&self, state: &mut SessionState, form: &DashboardForm, preset: Preset) {
        state.form.absorb(form);
        if state.recalculation {
            state.notify(
                NoticeLevel::Warning,
                "Presets are not available while recalculation is active.",
            );
            return;
        }
        state.weights = preset.weights(false);
        state.notify(
            NoticeLevel::Success,
            format!("Weights set to {}.", preset.display_name().to_lowercase()),
        );
    }
}

