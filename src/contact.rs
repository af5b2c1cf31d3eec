// 📇 Contact Extraction
// Pulls e-mails, phone numbers and a US shipping address out of non-product memo rows

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("phone pattern")
});

static STATE_ZIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",?\s*([A-Z]{2})\s+(\d{5})").expect("state/zip pattern")
});

static CITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z\s]*?),?\s*[A-Z]{2}\s+\d{5}").expect("city pattern")
});

const MAX_NAME_LEN: usize = 100;
const MIN_ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub name: Option<String>,
    pub emails: Vec<String>,
    /// Digits only
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

fn lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn extract_contact_info(text: &str) -> Option<ContactInfo> {
    let emails: Vec<String> = EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    let phones: Vec<String> = PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().chars().filter(char::is_ascii_digit).collect())
        .collect();

    if emails.is_empty() && phones.is_empty() {
        return None;
    }

    // First line is usually the person or company name
    let name = lines(text)
        .first()
        .filter(|line| line.len() < MAX_NAME_LEN)
        .map(|line| line.to_string());

    Some(ContactInfo {
        name,
        emails,
        phones,
    })
}

pub fn extract_address(text: &str) -> Option<Address> {
    if text.len() < MIN_ADDRESS_LEN {
        return None;
    }

    let lines = lines(text);
    if lines.len() < 2 {
        return None;
    }

    let state_zip_idx = lines.iter().position(|line| STATE_ZIP_RE.is_match(line))?;
    let state_zip_line = lines[state_zip_idx];

    let caps = STATE_ZIP_RE.captures(state_zip_line)?;
    let state = caps[1].to_string();
    let postal_code = caps[2].to_string();

    let city = CITY_RE
        .captures(state_zip_line)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    let line1 = lines[..state_zip_idx].first()?.to_string();
    let line2 = lines[..state_zip_idx].get(1).map(|line| line.to_string());

    if city.is_empty() {
        return None;
    }

    Some(Address {
        line1,
        line2,
        city,
        state,
        postal_code,
        country: "US".to_string(),
    })
}
