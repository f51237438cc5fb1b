//! Lead-capture and login form schemas.
//!
//! Each form is a static [`FormSchema`]: named fields with a kind, a
//! required marker and the message shown when the field fails. The same
//! schema drives HTML rendering and validation, and validation always runs
//! before any backend call. Success yields a typed draft, failure a
//! [`FieldErrors`] map keyed by field name.

pub mod emergency;
pub mod login;
pub mod quote;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    /// Something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Digits with the usual separators, optional leading +
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9()\-.\s]{5,}$").unwrap();
}

/// Wire format of `<input type="date">`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire formats of `<input type="datetime-local">`, plus the UTC shape
/// older admin edits stored
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse a stored date-time as wall-clock time, keeping the written hour
/// whatever offset it carries.
pub fn parse_datetime(stored: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(stored)
        .map(|t| t.naive_local())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(stored, fmt).ok())
        })
}

/// Reduce a stored date-time to the `YYYY-MM-DDTHH:MM` value a
/// `datetime-local` input accepts. Unparseable values pass through.
pub fn datetime_input_value(stored: &str) -> String {
    parse_datetime(stored)
        .map(|t| t.format(DATETIME_INPUT_FORMAT).to_string())
        .unwrap_or_else(|| stored.to_string())
}

/// Reduce a stored date to the `YYYY-MM-DD` value a `date` input accepts.
pub fn date_input_value(stored: &str) -> String {
    NaiveDate::parse_from_str(stored, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(stored).map(|t| t.date()))
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| stored.to_string())
}

pub type Options = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text { min_len: usize },
    Email,
    Phone,
    /// Positive whole number
    Count,
    Date,
    DateTime,
    Select(Options),
    Radio(Options),
    /// Any number of the options; `min` of them when required
    Checkboxes { options: Options, min: usize },
    LongText,
    Password { min_len: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown when the field is missing or holds a rejected value
    pub message: &'static str,
}

impl FieldSpec {
    pub const fn required(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            message,
        }
    }

    pub const fn optional(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            message,
        }
    }

    /// Whether a single submitted value is acceptable for this field.
    fn accepts(&self, value: &str) -> bool {
        match self.kind {
            FieldKind::Text { min_len } | FieldKind::Password { min_len } => {
                value.chars().count() >= min_len
            }
            FieldKind::Email => EMAIL_REGEX.is_match(value),
            FieldKind::Phone => PHONE_REGEX.is_match(value),
            FieldKind::Count => value.parse::<u32>().map(|n| n > 0).unwrap_or(false),
            FieldKind::Date => NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok(),
            FieldKind::DateTime => parse_datetime(value).is_some(),
            FieldKind::Select(options)
            | FieldKind::Radio(options)
            | FieldKind::Checkboxes { options, .. } => {
                options.iter().any(|(wire, _)| *wire == value)
            }
            FieldKind::LongText => true,
        }
    }
}

#[derive(Debug)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Run every field rule against `raw`, collecting all failures.
    pub fn check(&self, raw: &RawForm) -> FieldErrors {
        let mut errors = FieldErrors::default();

        for field in self.fields {
            match field.kind {
                FieldKind::Checkboxes { min, .. } => {
                    let values: Vec<&str> = raw.values(field.name).collect();
                    let too_few = field.required && values.len() < min.max(1);
                    if too_few || values.iter().any(|v| !field.accepts(v)) {
                        errors.add(field.name, field.message);
                    }
                }
                FieldKind::Password { .. } => match raw.exact(field.name) {
                    Some(value) if field.accepts(value) => {}
                    None if !field.required => {}
                    _ => errors.add(field.name, field.message),
                },
                _ => match raw.value(field.name) {
                    Some(value) if field.accepts(value) => {}
                    None if !field.required => {}
                    _ => errors.add(field.name, field.message),
                },
            }
        }

        errors
    }
}

/// Submitted form body as name to values. Repeated names (checkbox groups)
/// keep every value in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawForm {
    fields: BTreeMap<String, Vec<String>>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut form = Self::new();
        for (name, value) in pairs {
            form.push(name, value);
        }
        form
    }

    /// First value, trimmed; blank counts as absent.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    /// First value exactly as submitted; empty counts as absent.
    pub fn exact(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All non-blank values, trimmed.
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .get(name)
            .into_iter()
            .flatten()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.values(name).any(|v| v == value)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), vec![value.into()]);
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.fields.remove(name);
    }
}

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

/// Typed extraction after the schema check. Accessors never record errors;
/// the schema check already has.
pub(crate) struct FieldReader<'a> {
    raw: &'a RawForm,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn check(schema: &FormSchema, raw: &'a RawForm) -> Self {
        Self {
            raw,
            errors: schema.check(raw),
        }
    }

    pub(crate) fn text(&self, name: &str) -> String {
        self.raw.value(name).unwrap_or_default().to_string()
    }

    pub(crate) fn optional_text(&self, name: &str) -> Option<String> {
        self.raw.value(name).map(str::to_string)
    }

    pub(crate) fn secret(&self, name: &str) -> String {
        self.raw.exact(name).unwrap_or_default().to_string()
    }

    pub(crate) fn choice<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.raw.value(name).and_then(|v| v.parse().ok())
    }

    pub(crate) fn count(&self, name: &str) -> Option<u32> {
        self.raw
            .value(name)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
    }

    pub(crate) fn values(&self, name: &str) -> Vec<String> {
        self.raw.values(name).map(str::to_string).collect()
    }

    /// The draft if every rule passed, otherwise the collected errors.
    pub(crate) fn finish<T>(self, draft: Option<T>) -> Result<T, FieldErrors> {
        let mut errors = self.errors;
        match draft {
            Some(draft) if errors.is_empty() => Ok(draft),
            _ => {
                if errors.is_empty() {
                    errors.add("form", "Please check the form and try again");
                }
                Err(errors)
            }
        }
    }
}
