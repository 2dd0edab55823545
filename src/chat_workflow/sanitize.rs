//! Allow-list mapping from model-extracted filters to a listings query.
//!
//! Model output is untrusted. Every field is checked on its own and either
//! accepted into the [`SanitizedQuery`] or dropped; nothing is merged through
//! wholesale, and a bad field never fails the request.

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::chat_workflow::extract::ExtractedFilters;
use crate::listings::Listing;
use crate::reference::{BodyType, FuelType, Transmission};

const MAX_TEXT_LEN: usize = 64;

/// Result of checking one extracted field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome<T> {
    Absent,
    Accepted(T),
    Dropped,
}

impl<T> FieldOutcome<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            FieldOutcome::Accepted(value) => Some(value),
            FieldOutcome::Absent | FieldOutcome::Dropped => None,
        }
    }
}

fn check<T>(
    filters: &ExtractedFilters,
    key: &str,
    parse: impl Fn(&Value) -> Option<T>,
) -> FieldOutcome<T> {
    match filters.get(key) {
        None => FieldOutcome::Absent,
        Some(raw) => match parse(raw) {
            Some(value) => FieldOutcome::Accepted(value),
            None => {
                warn!("Dropping extracted filter {}={}", key, raw);
                FieldOutcome::Dropped
            }
        },
    }
}

/// Case-insensitive partial match on free text. The text is escaped, so it
/// is always matched literally.
#[derive(Debug, Clone)]
pub struct TextPattern {
    needle: String,
    regex: Regex,
}

impl TextPattern {
    pub fn new(needle: &str) -> Option<Self> {
        let needle = needle.trim();
        if needle.is_empty() || needle.chars().count() > MAX_TEXT_LEN {
            return None;
        }
        let regex = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self {
            needle: needle.to_string(),
            regex,
        })
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    fn to_document(&self) -> Value {
        json!({ "$regex": regex::escape(&self.needle), "$options": "i" })
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.needle == other.needle
    }
}

/// Inclusive bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange<T> {
    pub gte: Option<T>,
    pub lte: Option<T>,
}

impl<T: PartialOrd + Copy + Into<Value>> NumericRange<T> {
    fn from_bounds(gte: Option<T>, lte: Option<T>) -> Option<Self> {
        (gte.is_some() || lte.is_some()).then_some(Self { gte, lte })
    }

    pub fn contains(&self, value: T) -> bool {
        self.gte.is_none_or(|min| value >= min) && self.lte.is_none_or(|max| value <= max)
    }

    fn to_document(&self) -> Value {
        let mut doc = Map::new();
        if let Some(min) = self.gte {
            doc.insert("$gte".to_string(), min.into());
        }
        if let Some(max) = self.lte {
            doc.insert("$lte".to_string(), max.into());
        }
        Value::Object(doc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YearConstraint {
    Exact(i32),
    Range(NumericRange<i32>),
}

impl YearConstraint {
    pub fn contains(&self, year: i32) -> bool {
        match self {
            YearConstraint::Exact(wanted) => year == *wanted,
            YearConstraint::Range(range) => range.contains(year),
        }
    }
}

/// The only query shape that reaches the listings store
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedQuery {
    /// Restrict to verified, paid listings
    pub moderated_only: bool,
    pub body_type: Option<BodyType>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub price: Option<NumericRange<u64>>,
    pub make: Option<TextPattern>,
    pub model: Option<TextPattern>,
    pub city: Option<TextPattern>,
    pub year: Option<YearConstraint>,
    pub min_seats: Option<u32>,
    pub min_mpg: Option<f64>,
}

impl SanitizedQuery {
    /// Listings are soft-deleted, never removed; deleted ones never match.
    pub fn matches(&self, listing: &Listing) -> bool {
        if listing.is_deleted {
            return false;
        }
        if self.moderated_only && !(listing.verified && listing.payment_status == "paid") {
            return false;
        }
        if !enum_matches(self.body_type.map(|b| b.as_str()), &listing.body_type)
            || !enum_matches(self.fuel_type.map(|f| f.as_str()), &listing.fuel_type)
            || !enum_matches(self.transmission.map(|t| t.as_str()), &listing.transmission)
        {
            return false;
        }
        if let Some(price) = &self.price {
            if !price.contains(listing.price) {
                return false;
            }
        }
        if let Some(make) = &self.make {
            if !make.is_match(&listing.make) {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if !model.is_match(&listing.model) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if !listing.location.as_deref().is_some_and(|loc| city.is_match(loc)) {
                return false;
            }
        }
        if let Some(year) = &self.year {
            if !year.contains(listing.year) {
                return false;
            }
        }
        if let Some(min_seats) = self.min_seats {
            if !listing.seating_capacity.is_some_and(|seats| seats >= min_seats) {
                return false;
            }
        }
        if let Some(min_mpg) = self.min_mpg {
            let highway = listing.highway_mpg.is_some_and(|mpg| mpg >= min_mpg);
            let city = listing.city_mpg.is_some_and(|mpg| mpg >= min_mpg);
            if !(highway || city) {
                return false;
            }
        }
        true
    }

    /// Whether any filter narrows the search beyond moderation state
    pub fn has_concrete_filter(&self) -> bool {
        self.price.is_some()
            || self.fuel_type.is_some()
            || self.body_type.is_some()
            || self.make.is_some()
            || self.model.is_some()
    }

    /// Renders the query as a document-store filter
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("isDeleted".to_string(), json!(false));
        if self.moderated_only {
            doc.insert("verified".to_string(), json!(true));
            doc.insert("paymentStatus".to_string(), json!("paid"));
        }
        if let Some(body_type) = self.body_type {
            doc.insert("body_type".to_string(), json!(body_type.as_str()));
        }
        if let Some(fuel_type) = self.fuel_type {
            doc.insert("fuel_type".to_string(), json!(fuel_type.as_str()));
        }
        if let Some(transmission) = self.transmission {
            doc.insert("transmission".to_string(), json!(transmission.as_str()));
        }
        if let Some(price) = &self.price {
            doc.insert("price".to_string(), price.to_document());
        }
        if let Some(make) = &self.make {
            doc.insert("make".to_string(), make.to_document());
        }
        if let Some(model) = &self.model {
            doc.insert("model".to_string(), model.to_document());
        }
        if let Some(city) = &self.city {
            doc.insert("location".to_string(), city.to_document());
        }
        match &self.year {
            Some(YearConstraint::Exact(year)) => {
                doc.insert("year".to_string(), json!(year));
            }
            Some(YearConstraint::Range(range)) => {
                doc.insert("year".to_string(), range.to_document());
            }
            None => {}
        }
        if let Some(min_seats) = self.min_seats {
            doc.insert("seating_capacity".to_string(), json!({ "$gte": min_seats }));
        }
        if let Some(min_mpg) = self.min_mpg {
            doc.insert(
                "$or".to_string(),
                json!([
                    { "highway_mpg": { "$gte": min_mpg } },
                    { "city_mpg": { "$gte": min_mpg } }
                ]),
            );
        }
        Value::Object(doc)
    }
}

fn enum_matches(wanted: Option<&str>, actual: &Option<String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual
            .as_deref()
            .is_some_and(|actual| actual.trim().eq_ignore_ascii_case(wanted)),
    }
}

/// Builds the listings query from extracted filters, field by field.
pub fn sanitize(filters: &ExtractedFilters) -> SanitizedQuery {
    let max_price = check(filters, "maxPrice", parse_price).accepted();
    let min_price = check(filters, "minPrice", parse_price).accepted();

    let exact_year = check(filters, "year", parse_year).accepted();
    let min_year = check(filters, "minYear", parse_year).accepted();
    let max_year = check(filters, "maxYear", parse_year).accepted();
    let year = match NumericRange::from_bounds(min_year, max_year) {
        Some(range) => Some(YearConstraint::Range(range)),
        None => exact_year.map(YearConstraint::Exact),
    };

    let make = check(filters, "make", parse_text).accepted();
    let model = check(filters, "model", parse_text).accepted();

    SanitizedQuery {
        moderated_only: make.is_none() && model.is_none(),
        body_type: check(filters, "body_type", |v| v.as_str().and_then(BodyType::parse)).accepted(),
        fuel_type: check(filters, "fuel_type", |v| v.as_str().and_then(FuelType::parse)).accepted(),
        transmission: check(filters, "transmission", |v| {
            v.as_str().and_then(Transmission::parse)
        })
        .accepted(),
        price: NumericRange::from_bounds(min_price, max_price),
        make,
        model,
        city: check(filters, "city", parse_text).accepted(),
        year,
        min_seats: check(filters, "minSeats", parse_seats).accepted(),
        min_mpg: check(filters, "minMPG", parse_mpg).accepted(),
    }
}

/// Accepts JSON numbers and numeric strings such as "500,000,000"
fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_whole(value: &Value) -> Option<f64> {
    parse_number(value).filter(|n| n.fract() == 0.0)
}

fn parse_price(value: &Value) -> Option<u64> {
    parse_number(value)
        .filter(|n| *n >= 0.0 && *n < 1e15)
        .map(|n| n.round() as u64)
}

fn parse_year(value: &Value) -> Option<i32> {
    parse_whole(value)
        .filter(|n| (1900.0..=2100.0).contains(n))
        .map(|n| n as i32)
}

fn parse_seats(value: &Value) -> Option<u32> {
    parse_whole(value)
        .filter(|n| (1.0..=20.0).contains(n))
        .map(|n| n as u32)
}

fn parse_mpg(value: &Value) -> Option<f64> {
    parse_number(value).filter(|n| *n > 0.0 && *n <= 200.0)
}

fn parse_text(value: &Value) -> Option<TextPattern> {
    value.as_str().and_then(TextPattern::new)
}
