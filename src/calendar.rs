//! Month calendar of the purchase and delivery dates.
//!
//! The label rule (`day_label`) is a pure function of the dates; HTML
//! rendering lives in `render`.

use chrono::{Datelike, Duration, NaiveDate};
use serde_json::{Map, Value};

use crate::models::iso_date;

/// Summary key holding an explicit delivery date
pub const SUMMARY_DATE_KEY: &str = "fecha_de_entrega";
/// Summary key holding a delivery day-count relative to the purchase date
pub const SUMMARY_DAYS_KEY: &str = "tiempo_maximo_dias";

/// Highlight applied to a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    /// Purchase and delivery on the same day (recalculation off)
    SameDay,
    Purchase,
    Delivery,
    /// New delivery falls on the purchase date (recalculation on)
    NewDeliveryAndPurchase,
    /// New delivery keeps the original delivery date (recalculation on)
    DateKept,
    NewDelivery,
    OriginalDelivery,
}

impl DayLabel {
    pub fn text(&self) -> &'static str {
        match self {
            DayLabel::SameDay => "Same day",
            DayLabel::Purchase => "Purchase",
            DayLabel::Delivery => "Delivery",
            DayLabel::NewDeliveryAndPurchase => "Purchase / New delivery",
            DayLabel::DateKept => "Date kept",
            DayLabel::NewDelivery => "New delivery",
            DayLabel::OriginalDelivery => "Original delivery",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            DayLabel::SameDay => "highlight-both",
            DayLabel::Purchase => "highlight-purchase",
            DayLabel::Delivery => "highlight-delivery",
            DayLabel::NewDeliveryAndPurchase => "highlight-recalc-new-delivery-and-purchase",
            DayLabel::DateKept => "highlight-recalc-same-date",
            DayLabel::NewDelivery => "highlight-recalc-new-delivery",
            DayLabel::OriginalDelivery => "highlight-original-delivery",
        }
    }
}

/// Dates the calendar highlights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDates {
    pub purchase: NaiveDate,
    pub new_delivery: Option<NaiveDate>,
    /// Only consulted in recalculation mode
    pub original_delivery: Option<NaiveDate>,
    pub recalculation: bool,
}

impl CalendarDates {
    /// First day of the month containing the earliest relevant date.
    pub fn display_month(&self) -> NaiveDate {
        let mut earliest = self.purchase;
        if let Some(d) = self.new_delivery {
            earliest = earliest.min(d);
        }
        if self.recalculation {
            if let Some(d) = self.original_delivery {
                earliest = earliest.min(d);
            }
        }
        earliest.with_day(1).unwrap_or(earliest)
    }
}

/// Label for `date`, first matching rule wins.
pub fn day_label(date: NaiveDate, dates: &CalendarDates) -> Option<DayLabel> {
    let purchase = date == dates.purchase;
    let new_delivery = dates.new_delivery == Some(date);

    if dates.recalculation {
        let original = dates.original_delivery == Some(date);
        if new_delivery && purchase {
            Some(DayLabel::NewDeliveryAndPurchase)
        } else if new_delivery && original {
            Some(DayLabel::DateKept)
        } else if new_delivery {
            Some(DayLabel::NewDelivery)
        } else if original {
            Some(DayLabel::OriginalDelivery)
        } else if purchase {
            Some(DayLabel::Purchase)
        } else {
            None
        }
    } else if purchase && new_delivery {
        Some(DayLabel::SameDay)
    } else if purchase {
        Some(DayLabel::Purchase)
    } else if new_delivery {
        Some(DayLabel::Delivery)
    } else {
        None
    }
}

/// How the new delivery date was obtained from the route summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryDate {
    Explicit(NaiveDate),
    /// Purchase date plus the summary's day-count
    Derived { date: NaiveDate, days: i64 },
    /// The summary's date field could not be parsed
    Invalid(String),
    Missing,
}

impl DeliveryDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DeliveryDate::Explicit(d) | DeliveryDate::Derived { date: d, .. } => Some(*d),
            DeliveryDate::Invalid(_) | DeliveryDate::Missing => None,
        }
    }
}

/// Resolve the new delivery date from a route summary block.
pub fn resolve_delivery_date(purchase: NaiveDate, summary: &Map<String, Value>) -> DeliveryDate {
    if let Some(raw) = summary.get(SUMMARY_DATE_KEY) {
        let text = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return match NaiveDate::parse_from_str(&text, iso_date::FORMAT) {
            Ok(date) => DeliveryDate::Explicit(date),
            Err(_) => DeliveryDate::Invalid(text),
        };
    }

    // Fractional counts truncate toward zero; out-of-range counts saturate and
    // then fail the checked arithmetic below.
    let days = summary
        .get(SUMMARY_DAYS_KEY)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.trunc() as i64)));
    let shifted = days.and_then(|d| {
        Duration::try_days(d)
            .and_then(|offset| purchase.checked_add_signed(offset))
            .map(|date| (date, d))
    });
    match shifted {
        Some((date, days)) => DeliveryDate::Derived { date, days },
        None => DeliveryDate::Missing,
    }
}

/// One cell of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub label: Option<DayLabel>,
}

/// Month grid, Sunday-first, padded with `None` outside the month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub first_day: NaiveDate,
    pub weeks: Vec<[Option<CalendarCell>; 7]>,
}

impl MonthView {
    pub fn title(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.weeks
            .iter()
            .flat_map(|w| w.iter())
            .flatten()
            .find(|c| c.date == date)
    }
}

/// Build the grid for the month containing the earliest relevant date.
pub fn build_month(dates: &CalendarDates) -> MonthView {
    let first_day = dates.display_month();
    let mut weeks = Vec::new();
    let mut week: [Option<CalendarCell>; 7] = [None; 7];
    let mut day = first_day;

    while day.month() == first_day.month() {
        let column = day.weekday().num_days_from_sunday() as usize;
        week[column] = Some(CalendarCell {
            date: day,
            label: day_label(day, dates),
        });
        if column == 6 {
            weeks.push(week);
            week = [None; 7];
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }

    MonthView { first_day, weeks }
}
