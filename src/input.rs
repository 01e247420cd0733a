//! Input Collector
//!
//! Form fields arrive as text. Parsing happens only when an action needs the
//! value, so a half-typed field never blocks unrelated actions.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{iso_date, QueryParams, RecalculationContext};
use crate::weights::{WeightVector, WEIGHT_MAX, WEIGHT_MIN};

/// Validation failures reported inline; the action is aborted and no call made
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Please enter a SKU and a postal code to query the warehouse.")]
    MissingQueryFields,

    #[error("Please make sure SKU, postal code and quantity are filled in to calculate a route.")]
    MissingRouteFields,

    #[error("SKU and/or postal code must be integer values.")]
    NotInteger,

    #[error("Quantity must be a whole number of at least 1, got '{0}'.")]
    InvalidQuantity(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Rejecting store must be a non-negative integer, got '{0}'.")]
    InvalidStore(String),

    #[error("Weight '{name}' must be a number, got '{value}'.")]
    InvalidWeight { name: &'static str, value: String },

    #[error("Weight '{0}' must be between {min} and {max}.", min = WEIGHT_MIN, max = WEIGHT_MAX)]
    WeightOutOfRange(&'static str),

    #[error("The original delivery date ({delivery}) cannot be earlier than the original purchase date ({purchase}).")]
    DeliveryBeforePurchase { delivery: NaiveDate, purchase: NaiveDate },
}

/// Fields posted by the dashboard form. Disabled or hidden inputs are not
/// submitted, so everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardForm {
    pub sku: Option<String>,
    pub cp: Option<String>,
    pub qty: Option<String>,
    pub original_delivery: Option<String>,
    pub rejecting_store: Option<String>,
    pub w_inventario: Option<String>,
    pub w_tiempo: Option<String>,
    pub w_costo: Option<String>,
    pub w_nodo: Option<String>,
    pub w_ruta: Option<String>,
    pub w_diferencia: Option<String>,
}

/// Text of the user-editable fields, kept between requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub sku: String,
    pub cp: String,
    pub qty: String,
    pub original_delivery: String,
    pub rejecting_store: String,
}

impl FormState {
    /// Copy over every text field present in the submitted form.
    pub fn absorb(&mut self, form: &DashboardForm) {
        let fields = [
            (&mut self.sku, &form.sku),
            (&mut self.cp, &form.cp),
            (&mut self.qty, &form.qty),
            (&mut self.original_delivery, &form.original_delivery),
            (&mut self.rejecting_store, &form.rejecting_store),
        ];
        for (target, submitted) in fields {
            if let Some(value) = submitted {
                *target = value.trim().to_string();
            }
        }
    }

    /// SKU and postal code for a warehouse lookup
    pub fn query_params(&self) -> Result<QueryParams, InputError> {
        if self.sku.is_empty() || self.cp.is_empty() {
            return Err(InputError::MissingQueryFields);
        }
        parse_params(&self.sku, &self.cp)
    }

    /// SKU, postal code and quantity for a route calculation
    pub fn route_params(&self) -> Result<(QueryParams, u32), InputError> {
        if self.sku.is_empty() || self.cp.is_empty() || self.qty.is_empty() {
            return Err(InputError::MissingRouteFields);
        }
        let params = parse_params(&self.sku, &self.cp)?;
        let qty = self
            .qty
            .parse::<u32>()
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| InputError::InvalidQuantity(self.qty.clone()))?;
        Ok((params, qty))
    }

    /// Recalculation block, checking the delivery does not precede the purchase
    pub fn recalculation_context(
        &self,
        original_purchase: NaiveDate,
    ) -> Result<RecalculationContext, InputError> {
        let original_delivery = parse_date(&self.original_delivery)?;
        let rejecting_store = self
            .rejecting_store
            .parse::<i64>()
            .ok()
            .filter(|s| *s >= 0)
            .ok_or_else(|| InputError::InvalidStore(self.rejecting_store.clone()))?;

        if original_delivery < original_purchase {
            return Err(InputError::DeliveryBeforePurchase {
                delivery: original_delivery,
                purchase: original_purchase,
            });
        }

        Ok(RecalculationContext {
            original_purchase,
            original_delivery,
            rejecting_store,
        })
    }
}

fn parse_params(sku: &str, cp: &str) -> Result<QueryParams, InputError> {
    match (sku.parse::<i64>(), cp.parse::<i64>()) {
        (Ok(sku), Ok(cp)) => Ok(QueryParams { sku, cp }),
        _ => Err(InputError::NotInteger),
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(text.trim(), iso_date::FORMAT)
        .map_err(|_| InputError::InvalidDate(text.to_string()))
}

/// Merge submitted slider values over `current`. Missing sliders keep their
/// current value.
pub fn parse_weights(form: &DashboardForm, current: &WeightVector) -> Result<WeightVector, InputError> {
    fn field(
        name: &'static str,
        submitted: &Option<String>,
        current: f64,
    ) -> Result<f64, InputError> {
        let Some(text) = submitted else {
            return Ok(current);
        };
        let value = text.trim().parse::<f64>().map_err(|_| InputError::InvalidWeight {
            name,
            value: text.clone(),
        })?;
        if !(WEIGHT_MIN..=WEIGHT_MAX).contains(&value) {
            return Err(InputError::WeightOutOfRange(name));
        }
        Ok(value)
    }

    Ok(WeightVector {
        inventory: field("inventario", &form.w_inventario, current.inventory)?,
        time: field("tiempo", &form.w_tiempo, current.time)?,
        cost: field("costo", &form.w_costo, current.cost)?,
        node: field("nodo", &form.w_nodo, current.node)?,
        route: field("ruta", &form.w_ruta, current.route)?,
        difference: field("diferencia", &form.w_diferencia, current.difference)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FormState {
        FormState {
            sku: "1139002876".to_string(),
            cp: "52715".to_string(),
            qty: "2".to_string(),
            original_delivery: "2025-06-12".to_string(),
            rejecting_store: "108".to_string(),
        }
    }

    fn purchase() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_absorb_only_submitted_fields() {
        let mut s = state();
        s.absorb(&DashboardForm {
            sku: Some(" 42 ".to_string()),
            ..Default::default()
        });
        assert_eq!(s.sku, "42");
        assert_eq!(s.cp, "52715");
    }

    #[test]
    fn test_query_params_validation() {
        assert_eq!(
            state().query_params(),
            Ok(QueryParams { sku: 1139002876, cp: 52715 })
        );

        let mut s = state();
        s.cp = "52A15".to_string();
        assert_eq!(s.query_params(), Err(InputError::NotInteger));

        s.cp.clear();
        assert_eq!(s.query_params(), Err(InputError::MissingQueryFields));
    }

    #[test]
    fn test_route_params_rejects_zero_quantity() {
        let mut s = state();
        s.qty = "0".to_string();
        assert_eq!(s.route_params(), Err(InputError::InvalidQuantity("0".to_string())));
    }

    #[test]
    fn test_delivery_before_purchase_is_rejected() {
        let mut s = state();
        s.original_delivery = "2025-06-01".to_string();
        assert!(matches!(
            s.recalculation_context(purchase()),
            Err(InputError::DeliveryBeforePurchase { .. })
        ));
    }

    #[test]
    fn test_recalculation_context() {
        let ctx = state().recalculation_context(purchase()).unwrap();
        assert_eq!(ctx.rejecting_store, 108);
        assert_eq!(ctx.original_delivery, NaiveDate::from_ymd_opt(2025, 6, 12).unwrap());

        let mut s = state();
        s.rejecting_store = "-4".to_string();
        assert_eq!(
            s.recalculation_context(purchase()),
            Err(InputError::InvalidStore("-4".to_string()))
        );
    }

    #[test]
    fn test_parse_weights_merges_and_validates() {
        let form = DashboardForm {
            w_tiempo: Some("1.7".to_string()),
            ..Default::default()
        };
        let w = parse_weights(&form, &WeightVector::LOW_SEASON).unwrap();
        assert_eq!(w.time, 1.7);
        assert_eq!(w.cost, 2.0);

        let form = DashboardForm {
            w_costo: Some("9".to_string()),
            ..Default::default()
        };
        assert_eq!(
            parse_weights(&form, &WeightVector::LOW_SEASON),
            Err(InputError::WeightOutOfRange("costo"))
        );

        let form = DashboardForm {
            w_nodo: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            parse_weights(&form, &WeightVector::LOW_SEASON),
            Err(InputError::InvalidWeight { name: "nodo", .. })
        ));
    }
}
