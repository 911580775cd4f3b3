//! Test utilities and fixtures for playwatch tests

#![allow(dead_code)]

pub mod fake_bot_api;
pub mod fakes;

use chrono::{DateTime, Local, TimeZone};
use std::collections::HashSet;

/// Fixed instant `secs` seconds after an arbitrary base time
pub fn at(secs: i64) -> DateTime<Local> {
    Local
        .timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .expect("valid timestamp")
}

/// Build a snapshot from a list of names
pub fn names(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}
