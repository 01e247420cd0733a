use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Raw record from CSV ingestion, using the upstream warehouse column names
#[derive(Debug, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "ID_TRAZO")]
    pub id_trazo: String,
    #[serde(rename = "SKU_CVE")]
    pub sku_cve: i64,
    #[serde(rename = "CP")]
    pub cp: i64,
    #[serde(rename = "TDA_CVE")]
    pub tda_cve: i64,
    #[serde(rename = "INVENTARIO_OH")]
    pub inventario_oh: i64,
    #[serde(rename = "MET_ENTREGA")]
    pub met_entrega: String,
    #[serde(rename = "ZONA_ROJA")]
    pub zona_roja: i64,
    #[serde(rename = "EXCL_PROD")]
    pub excl_prod: i64,
}

/// Delivery method of a warehouse row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum DeliveryMethod {
    CompanyFleet,
    ExternalCourier,
    Other(String),
}

impl DeliveryMethod {
    pub const COMPANY_FLEET: &'static str = "FLOTA LIVERPOOL";
    pub const EXTERNAL_COURIER: &'static str = "MENSAJERIA EXTERNA";

    pub fn as_str(&self) -> &str {
        match self {
            DeliveryMethod::CompanyFleet => Self::COMPANY_FLEET,
            DeliveryMethod::ExternalCourier => Self::EXTERNAL_COURIER,
            DeliveryMethod::Other(s) => s,
        }
    }
}

impl From<&str> for DeliveryMethod {
    fn from(s: &str) -> Self {
        match s {
            Self::COMPANY_FLEET => DeliveryMethod::CompanyFleet,
            Self::EXTERNAL_COURIER => DeliveryMethod::ExternalCourier,
            other => DeliveryMethod::Other(other.to_string()),
        }
    }
}

impl From<String> for DeliveryMethod {
    fn from(s: String) -> Self {
        DeliveryMethod::from(s.as_str())
    }
}

impl From<DeliveryMethod> for String {
    fn from(m: DeliveryMethod) -> Self {
        m.as_str().to_string()
    }
}

/// One row of the warehouse result set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarehouseRow {
    pub id_trazo: String,
    pub sku_cve: i64,
    pub cp: i64,
    pub tda_cve: i64,
    pub inventario_oh: i64,
    pub met_entrega: DeliveryMethod,
    pub zona_roja: bool,
    pub excl_prod: i64,
}

impl CsvRecord {
    pub fn to_row(&self) -> WarehouseRow {
        WarehouseRow {
            id_trazo: self.id_trazo.clone(),
            sku_cve: self.sku_cve,
            cp: self.cp,
            tda_cve: self.tda_cve,
            inventario_oh: self.inventario_oh,
            met_entrega: DeliveryMethod::from(self.met_entrega.as_str()),
            zona_roja: self.zona_roja != 0,
            excl_prod: self.excl_prod,
        }
    }
}

/// Parameters identifying a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub sku: i64,
    pub cp: i64,
}

/// Data sent alongside a route request when a prior delivery was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationContext {
    #[serde(rename = "fechaCompraOriginal", with = "iso_date")]
    pub original_purchase: NaiveDate,
    #[serde(rename = "fechaEntregaOriginal", with = "iso_date")]
    pub original_delivery: NaiveDate,
    #[serde(rename = "tiendaRechazo")]
    pub rejecting_store: i64,
}

/// Candidate route returned by the route service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteCandidate {
    #[serde(deserialize_with = "string_or_number")]
    pub id_trazo: String,
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

/// Successful route service response. Unknown fields are kept so the
/// response can be shown back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: Map<String, Value>,
    #[serde(default, deserialize_with = "traced_routes")]
    pub rutas: Vec<RouteCandidate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resumen: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteResponse {
    pub fn trace_ids(&self) -> impl Iterator<Item = &str> {
        self.rutas.iter().map(|r| r.id_trazo.as_str())
    }

    /// Echoed inputs with nested objects flattened to `parent.child` keys.
    pub fn flattened_inputs(&self) -> Vec<(String, Value)> {
        let mut rows = Vec::new();
        for (key, value) in &self.inputs {
            match value {
                Value::Object(inner) if key == "weights" || key == "dataRecalculo" => {
                    for (inner_key, inner_value) in inner {
                        rows.push((format!("{}.{}", key, inner_key), inner_value.clone()));
                    }
                }
                _ => rows.push((key.clone(), value.clone())),
            }
        }
        rows
    }
}

/// Outcome of a route calculation as kept in the session
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Routes(RouteResponse),
    Error(String),
}

impl RouteOutcome {
    pub fn response(&self) -> Option<&RouteResponse> {
        match self {
            RouteOutcome::Routes(r) => Some(r),
            RouteOutcome::Error(_) => None,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for id_trazo, got {}",
            other
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Route list where `null` means no routes and entries without a trace id
/// are skipped.
fn traced_routes<'de, D>(deserializer: D) -> Result<Vec<RouteCandidate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .filter(|route| route.get("id_trazo").is_some_and(|id| !id.is_null()))
        .map(|route| serde_json::from_value(route).map_err(serde::de::Error::custom))
        .collect()
}

pub(crate) mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
