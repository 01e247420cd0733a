//! HTML rendering of the dashboard page from session state.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::calendar::{self, CalendarDates, DeliveryDate, MonthView};
use crate::models::RouteResponse;
use crate::presenter::{self, RowHighlight};
use crate::session::{Notice, NoticeLevel, SessionState};
use crate::weights::{detect_preset, Preset, PresetStatus, WeightVector};

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 0; display: flex; background: #0e1117; color: #fafafa; }
aside { width: 320px; padding: 20px; background: #262730; min-height: 100vh; box-sizing: border-box; }
main { flex: 1; padding: 20px 40px; }
label { display: block; margin-top: 10px; font-size: 0.9em; }
input[type=text], input[type=number], input[type=date] { width: 100%; box-sizing: border-box; }
input[type=range] { width: 100%; }
button { margin-top: 10px; margin-right: 6px; }
table { border-collapse: collapse; width: 100%; margin: 10px 0; }
th, td { border: 1px solid #444; padding: 4px 8px; font-size: 0.85em; text-align: left; }
.notice { padding: 8px 12px; border-radius: 4px; margin: 8px 0; }
.notice.success { background: #1e4620; } .notice.info { background: #1c3d5a; }
.notice.warning { background: #5c4a13; } .notice.error { background: #5a1c1c; }
.preset-low { color: #87CEEB; font-weight: bold; } .preset-high { color: #FFD700; font-weight: bold; }
.calendar-container { background-color: #262730; border-radius: 10px; padding: 20px; max-width: 500px; }
.calendar-weekdays, .calendar-day-grid { display: grid; grid-template-columns: repeat(7, 1fr); gap: 5px; text-align: center; }
.calendar-weekdays { font-weight: bold; margin-bottom: 10px; color: #bbbbbb; }
.calendar-day { padding: 10px 5px; border-radius: 5px; background-color: #33343d; min-height: 50px; display: flex; flex-direction: column; justify-content: center; align-items: center; font-size: 0.9em; }
.calendar-day.empty { background-color: transparent; }
.calendar-day small { font-size: 0.65em; margin-top: 5px; }
.calendar-day.highlight-purchase { background-color: #8B0000; font-weight: bold; }
.calendar-day.highlight-delivery, .calendar-day.highlight-original-delivery { background-color: #006400; font-weight: bold; }
.calendar-day.highlight-both { background: linear-gradient(to right, #8B0000 50%, #006400 50%); font-weight: bold; }
.calendar-day.highlight-recalc-new-delivery { background-color: #FFD700; color: #000000; font-weight: bold; }
.calendar-day.highlight-recalc-same-date { background: linear-gradient(to right, #FFD700 50%, #006400 50%); color: #000000; font-weight: bold; }
.calendar-day.highlight-recalc-new-delivery-and-purchase { background: linear-gradient(to right, #8B0000 50%, #FFD700 50%); color: #000000; font-weight: bold; }
.color-box { width: 15px; height: 15px; border: 1px solid #ccc; display: inline-block; margin-right: 5px; vertical-align: middle; }
.color-box.red { background-color: #8B0000; } .color-box.green { background-color: #006400; } .color-box.yellow { background-color: #FFD700; }
"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn long_date(date: NaiveDate) -> String {
    date.format("%d-%B-%Y").to_string()
}

/// Anchor id of a warehouse row, used to scroll to the selected route
pub fn trace_anchor(trace_id: &str) -> String {
    let safe: String = trace_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("trace-{}", safe)
}

fn notice_html(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Success => "success",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!(r#"<div class="notice {}">{}</div>"#, class, escape(&notice.text))
}

/// Render the full page. `notices` are the one-shot messages taken from the
/// session before rendering.
pub fn page(state: &SessionState, purchase_date: NaiveDate, notices: &[Notice]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Route and Estimated Delivery Date Lookup</title>");
    html.push_str(&format!("<style>{}</style></head><body>", STYLE));

    html.push_str(&sidebar(state, purchase_date));

    html.push_str("<main><h1>Route and Estimated Delivery Date Lookup</h1>");
    html.push_str("<p>Look up route candidates in the warehouse and calculate the best delivery routes through the route service.</p>");
    for notice in notices {
        html.push_str(&notice_html(notice));
    }
    html.push_str(&warehouse_section(state));
    html.push_str("<hr>");
    html.push_str(&route_section(state, purchase_date));
    html.push_str("</main></body></html>");
    html
}

fn text_input(label: &str, name: &str, value: &str, kind: &str) -> String {
    format!(
        r#"<label>{label}<input type="{kind}" name="{name}" value="{value}"></label>"#,
        label = label,
        kind = kind,
        name = name,
        value = escape(value)
    )
}

fn slider(label: &str, name: &str, value: f64, max: f64, step: f64) -> String {
    format!(
        r#"<label>{label}: {value}<input type="range" name="{name}" min="0" max="{max}" step="{step}" value="{value}"></label>"#,
        label = label,
        name = name,
        value = value,
        max = max,
        step = step
    )
}

fn sidebar(state: &SessionState, purchase_date: NaiveDate) -> String {
    let form = &state.form;
    let mut html = String::from(r#"<aside><form method="post" action="/actions/query-routes">"#);
    // Enter in a text field submits through the first button in the form.
    html.push_str(r#"<button type="submit" tabindex="-1" style="position:absolute;left:-9999px"></button>"#);

    html.push_str("<h2>Query parameters</h2>");
    html.push_str(&text_input("SKU", "sku", &form.sku, "text"));
    html.push_str(&text_input("Postal code (CP)", "cp", &form.cp, "text"));
    html.push_str(&text_input("Quantity (QTY)", "qty", &form.qty, "number"));

    html.push_str("<hr><h2>Recalculation</h2>");
    let toggle = if state.recalculation { "Disable recalculation" } else { "Enable recalculation" };
    html.push_str(&format!(
        r#"<button type="submit" formaction="/actions/recalculation">{}</button>"#,
        toggle
    ));
    if state.recalculation {
        html.push_str(r#"<p class="preset-high">Recalculation active</p>"#);
        html.push_str(&format!(
            r#"<label>Original purchase date<input type="text" value="{}" disabled></label>"#,
            purchase_date.format("%Y-%m-%d")
        ));
        html.push_str(&text_input("Original delivery date", "original_delivery", &form.original_delivery, "date"));
        html.push_str(&text_input("Rejecting store", "rejecting_store", &form.rejecting_store, "number"));
    } else {
        html.push_str("<p>Recalculation disabled. Enable it to enter the original delivery and rejecting store.</p>");
    }

    html.push_str("<hr><h2>Optimization weights</h2>");
    html.push_str(&weights_panel(&state.weights, state.recalculation));

    html.push_str("<hr>");
    html.push_str(r#"<button type="submit" formaction="/actions/query-routes">Query routes</button>"#);
    html.push_str(r#"<button type="submit" formaction="/actions/calculate-route">Calculate route</button>"#);
    html.push_str("</form></aside>");
    html
}

fn weights_panel(weights: &WeightVector, recalculation: bool) -> String {
    let mut html = String::new();
    if recalculation {
        html.push_str(&slider("Difference (new)", "w_diferencia", weights.difference, 4.0, 0.2));
        html.push_str(r#"<p class="preset-high">Fixed weights: high season base</p><ul>"#);
        for (name, value) in [
            ("Inventory", weights.inventory),
            ("Time", weights.time),
            ("Cost", weights.cost),
            ("Node", weights.node),
            ("Route", weights.route),
        ] {
            html.push_str(&format!("<li>{}: <b>{}</b></li>", name, value));
        }
        html.push_str("</ul>");
        return html;
    }

    html.push_str(&slider("Inventory", "w_inventario", weights.inventory, 2.0, 0.1));
    html.push_str(&slider("Time", "w_tiempo", weights.time, 2.0, 0.1));
    html.push_str(&slider("Cost", "w_costo", weights.cost, 2.0, 0.1));
    html.push_str(&slider("Node", "w_nodo", weights.node, 2.0, 0.1));
    html.push_str(&slider("Route", "w_ruta", weights.route, 2.0, 0.1));

    html.push_str(&match detect_preset(weights, false) {
        PresetStatus::Active(Preset::LowSeason) => {
            r#"<p class="preset-low">Active preset: Low season</p>"#.to_string()
        }
        PresetStatus::Active(Preset::HighSeason) => {
            r#"<p class="preset-high">Active preset: High season</p>"#.to_string()
        }
        PresetStatus::Custom => {
            r#"<div class="notice warning">Weights: <b>Custom</b> (no preset matches)</div>"#.to_string()
        }
    });

    for preset in [Preset::LowSeason, Preset::HighSeason] {
        html.push_str(&format!(
            r#"<button type="submit" formaction="/actions/presets/{}">{}</button>"#,
            preset.slug(),
            preset.display_name()
        ));
    }
    html
}

fn warehouse_section(state: &SessionState) -> String {
    let mut html = String::from("<h2>1. Route results</h2>");

    if state.rows.is_empty() {
        html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Info,
            text: "Click 'Query routes' to load inventory and location data.".to_string(),
        }));
        if state.query_attempted {
            html.push_str(&notice_html(&Notice {
                level: NoticeLevel::Warning,
                text: "No warehouse records match the given parameters.".to_string(),
            }));
        }
        return html;
    }

    html.push_str("<h3>Inventory and location data</h3>");
    html.push_str(&format!("<p>Number of records: <b>{}</b></p>", state.rows.len()));

    let rejection = state.rejection();
    let total = presenter::inventory_total(&state.rows, rejection);
    html.push_str(&format!(
        "<p>Total inventory: <b>{}</b>{}</p>",
        total.total,
        if total.excludes_rejected { " (excluding rejected store)" } else { "" }
    ));

    let selected: HashSet<&str> = state
        .route
        .as_ref()
        .and_then(|r| r.response())
        .map(|r| r.trace_ids().collect())
        .unwrap_or_default();
    let highlights = presenter::highlight_rows(&state.rows, &selected, rejection);

    html.push_str("<table><thead><tr>");
    for column in ["ID_TRAZO", "SKU_CVE", "CP", "TDA_CVE", "INVENTARIO_OH", "MET_ENTREGA", "ZONA_ROJA", "EXCL_PROD"] {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead><tbody>");

    let mut anchored = HashSet::new();
    for (row, highlight) in state.rows.iter().zip(highlights) {
        let id_attr = if anchored.insert(row.id_trazo.as_str()) {
            format!(r#" id="{}""#, trace_anchor(&row.id_trazo))
        } else {
            String::new()
        };
        let style_attr = match highlight {
            RowHighlight::None => String::new(),
            other => format!(r#" style="{}""#, other.style()),
        };
        html.push_str(&format!(
            "<tr{}{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            id_attr,
            style_attr,
            escape(&row.id_trazo),
            row.sku_cve,
            row.cp,
            row.tda_cve,
            row.inventario_oh,
            escape(row.met_entrega.as_str()),
            u8::from(row.zona_roja),
            row.excl_prod
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn route_section(state: &SessionState, purchase_date: NaiveDate) -> String {
    let mut html = String::from("<h2>2. Best route calculation</h2>");

    if let Some(message) = state.route_error() {
        html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Error,
            text: message.to_string(),
        }));
        return html;
    }

    let Some(response) = state.route.as_ref().and_then(|r| r.response()) else {
        return html;
    };

    html.push_str("<h3>Key dates</h3>");
    let delivery = calendar::resolve_delivery_date(purchase_date, &response.resumen);
    match &delivery {
        DeliveryDate::Invalid(raw) => html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Warning,
            text: format!(
                "Invalid delivery date format ({}) in the route service response. Expected 'YYYY-MM-DD'.",
                raw
            ),
        })),
        DeliveryDate::Derived { date, days } => html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Info,
            text: format!(
                "Approximate delivery date computed from tiempo_maximo_dias ({}): {}",
                days,
                long_date(*date)
            ),
        })),
        DeliveryDate::Explicit(_) | DeliveryDate::Missing => {}
    }

    let original_delivery = crate::input::parse_date(&state.form.original_delivery).ok();
    let dates = CalendarDates {
        purchase: purchase_date,
        new_delivery: delivery.date(),
        original_delivery,
        recalculation: state.recalculation,
    };
    html.push_str(&calendar_html(&calendar::build_month(&dates)));
    html.push_str(&legend_html(&dates));

    html.push_str(&inputs_table(response));
    html.push_str(&routes_table(response));
    html.push_str(&summary_table(&response.resumen));
    html
}

fn calendar_html(month: &MonthView) -> String {
    let mut html = format!(
        r#"<div class="calendar-container"><h3>{}</h3><div class="calendar-weekdays">"#,
        month.title()
    );
    for day in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        html.push_str(&format!("<span>{}</span>", day));
    }
    html.push_str(r#"</div><div class="calendar-day-grid">"#);

    for week in &month.weeks {
        for cell in week {
            match cell {
                None => html.push_str(r#"<div class="calendar-day empty"></div>"#),
                Some(cell) => {
                    let day = chrono::Datelike::day(&cell.date);
                    match cell.label {
                        Some(label) => html.push_str(&format!(
                            r#"<div class="calendar-day {}">{}<small>{}</small></div>"#,
                            label.css_class(),
                            day,
                            label.text()
                        )),
                        None => html.push_str(&format!(r#"<div class="calendar-day">{}</div>"#, day)),
                    }
                }
            }
        }
    }
    html.push_str("</div></div>");
    html
}

fn legend_html(dates: &CalendarDates) -> String {
    let describe = |date: Option<NaiveDate>| date.map(long_date).unwrap_or_else(|| "not available".to_string());

    let mut html = String::from("<hr><p><b>Date legend:</b></p>");
    html.push_str(&format!(
        r#"<p><span class="color-box red"></span><b>Red</b> Purchase date: {}</p>"#,
        long_date(dates.purchase)
    ));
    if dates.recalculation {
        html.push_str(&format!(
            r#"<p><span class="color-box green"></span><b>Green</b> Original delivery date: {}</p>"#,
            describe(dates.original_delivery)
        ));
        html.push_str(&format!(
            r#"<p><span class="color-box yellow"></span><b>Yellow</b> NEW delivery date: {}</p>"#,
            describe(dates.new_delivery)
        ));
    } else {
        html.push_str(&format!(
            r#"<p><span class="color-box green"></span><b>Green</b> Delivery date: {}</p>"#,
            describe(dates.new_delivery)
        ));
    }
    html.push_str("<hr>");
    html
}

fn key_value_table(headers: (&str, &str), rows: &[(String, Value)]) -> String {
    let mut html = format!(
        "<table><thead><tr><th>{}</th><th>{}</th></tr></thead><tbody>",
        headers.0, headers.1
    );
    for (key, value) in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(key),
            escape(&value_text(value))
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn inputs_table(response: &RouteResponse) -> String {
    let mut html = String::from("<h3>Route service request inputs</h3>");
    let rows = response.flattened_inputs();
    if rows.is_empty() {
        html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Info,
            text: "The route service did not echo any inputs.".to_string(),
        }));
    } else {
        html.push_str(&key_value_table(("Variable", "Value"), &rows));
    }
    html
}

fn routes_table(response: &RouteResponse) -> String {
    let mut html = String::from("<h3>Routes returned by the route service</h3>");
    if response.rutas.is_empty() {
        html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Info,
            text: "The route service returned no routes for these inputs.".to_string(),
        }));
        return html;
    }

    let mut columns: Vec<&str> = Vec::new();
    for route in &response.rutas {
        for key in route.metrics.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    html.push_str("<table><thead><tr><th>id_trazo</th>");
    for column in &columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr></thead><tbody>");
    for route in &response.rutas {
        html.push_str(&format!(
            r##"<tr><td><a href="#{}">{}</a></td>"##,
            trace_anchor(&route.id_trazo),
            escape(&route.id_trazo)
        ));
        for column in &columns {
            let cell = route.metrics.get(*column).map(value_text).unwrap_or_default();
            html.push_str(&format!("<td>{}</td>", escape(&cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn summary_table(summary: &Map<String, Value>) -> String {
    let mut html = String::from("<h3>Calculation summary</h3>");
    if summary.is_empty() {
        html.push_str(&notice_html(&Notice {
            level: NoticeLevel::Warning,
            text: "The route service response had no summary.".to_string(),
        }));
    } else {
        let rows: Vec<(String, Value)> = summary.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        html.push_str(&key_value_table(("Metric", "Value"), &rows));
    }
    html
}
