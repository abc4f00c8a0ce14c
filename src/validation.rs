use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

// "In the future" is judged on the Moncton wall clock no matter where the
// caller is.
pub const REFERENCE_TZ: Tz = chrono_tz::America::Moncton;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

// A booking form as submitted, nothing normalized yet.
#[derive(Clone, Debug, Deserialize)]
pub struct BookingInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pickup_date: String,
    pub pickup_time: String,
    #[serde(default)]
    pub return_trip: bool,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    pub passengers: i64,
    pub message: Option<String>,
}

// Fields that can fail validation, in the order they are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    PickupTime,
    ReturnTime,
    Passengers,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::PickupTime => "pickup_time",
            Self::ReturnTime => "return_time",
            Self::Passengers => "passengers",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Name => "Please enter your name",
            Self::Email => "Please enter a valid email address",
            Self::Phone => "Please enter a valid 10 digit phone number",
            Self::PickupTime => "Pickup time must be in the future",
            Self::ReturnTime => "Return time must be in the future",
            Self::Passengers => "Number of passengers must be between 1 and 40",
        }
    }
}

// A booking form that passed validation, contact details normalized.
#[derive(Clone, Debug, Serialize)]
pub struct BookingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub pickup_at: DateTime<Utc>,
    pub return_trip: bool,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    pub return_at: Option<DateTime<Utc>>,
    pub passengers: i64,
    pub message: String,
}

pub enum ValidationResult {
    Valid(BookingDetails),
    // every failed field, plus the message for the first of them
    Invalid { failed: Vec<Field>, message: String },
}

pub fn validate(input: &BookingInput, now: DateTime<Utc>) -> ValidationResult {
    let mut failed = Vec::new();

    let name = input.name.trim().to_string();
    if name.is_empty() {
        failed.push(Field::Name);
    }

    let email = input.email.trim().to_string();
    if !is_valid_email(&email) {
        failed.push(Field::Email);
    }

    let phone = normalize_phone(&input.phone);
    if phone.is_none() {
        failed.push(Field::Phone);
    }

    let pickup_at = parse_local(&input.pickup_date, &input.pickup_time);
    match pickup_at {
        Some(at) if at > now => {}
        _ => failed.push(Field::PickupTime),
    }

    let mut return_at = None;
    if input.return_trip {
        let date = input.return_date.as_deref().unwrap_or("");
        let time = input.return_time.as_deref().unwrap_or("");
        match parse_local(date, time) {
            Some(at) if at > now => return_at = Some(at),
            _ => failed.push(Field::ReturnTime),
        }
    }

    if !(1..=40).contains(&input.passengers) {
        failed.push(Field::Passengers);
    }

    if let Some(first) = failed.first() {
        return ValidationResult::Invalid {
            message: first.message().into(),
            failed,
        };
    }

    ValidationResult::Valid(BookingDetails {
        name,
        email,
        phone: phone.unwrap_or_default(),
        pickup_date: input.pickup_date.clone(),
        pickup_time: input.pickup_time.clone(),
        pickup_at: pickup_at.unwrap_or(now),
        return_trip: input.return_trip,
        return_date: input.return_date.clone().filter(|_| input.return_trip),
        return_time: input.return_time.clone().filter(|_| input.return_trip),
        return_at,
        passengers: input.passengers,
        message: input.message.clone().unwrap_or_default().trim().to_string(),
    })
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

// Accepts ten digits, or eleven with a leading country code 1. The
// formatted output normalizes to itself.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let national = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return None,
    };

    Some(format!(
        "+1 ({}) {}-{}",
        &national[..3],
        &national[3..6],
        &national[6..]
    ))
}

// DST makes some wall-clock readings nonexistent and some ambiguous; the
// earlier instant wins for the latter.
fn parse_local(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;

    match REFERENCE_TZ.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(at) => Some(at.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
