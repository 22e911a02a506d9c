use crate::error::CoreError;
use serde_json::{Map, Value};
use std::borrow::Cow;

pub const DEFAULT_LIMIT: usize = 10;

/// A validated search invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The `keywords` field exactly as received, echoed back in the response.
    pub raw_keywords: String,
    pub keywords: Vec<String>,
    pub subreddit: String,
    pub limit: usize,
}

impl SearchRequest {
    /// Normalises a raw invocation payload.
    ///
    /// Objects are used as-is; strings are decoded as JSON and anything that
    /// does not decode to an object is treated as an empty mapping. `limit` is
    /// coerced before `keywords` is checked, so a bad limit wins over missing
    /// keywords. Only an absent, `null` or empty `keywords` is missing; a value
    /// like `" , "` passes and simply searches nothing.
    pub fn from_event(event: &Value, default_subreddit: &str) -> Result<Self, CoreError> {
        let params = event_params(event);

        let limit = match params.get("limit") {
            None => DEFAULT_LIMIT,
            Some(value) => coerce_limit(value)?,
        };

        let subreddit = match params.get("subreddit") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            _ => default_subreddit.to_string(),
        };

        let raw_keywords = match params.get("keywords") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(raw)) => raw.clone(),
            Some(other) => {
                return Err(CoreError::invalid_input(format!(
                    "keywords must be a comma-separated string, got {}",
                    other
                )))
            }
        };

        if raw_keywords.is_empty() {
            return Err(CoreError::MissingKeywords);
        }
        let keywords = split_keywords(&raw_keywords);

        Ok(Self {
            raw_keywords,
            keywords,
            subreddit,
            limit,
        })
    }

    /// Per-request page size sent upstream; Reddit serves at most 25.
    pub fn page_size(&self) -> u32 {
        self.limit.min(25) as u32
    }
}

/// Splits on commas, trims, and drops empty entries.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

fn event_params(event: &Value) -> Cow<'_, Map<String, Value>> {
    match event {
        Value::Object(map) => Cow::Borrowed(map),
        Value::String(body) => match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Cow::Owned(map),
            _ => Cow::Owned(Map::new()),
        },
        _ => Cow::Owned(Map::new()),
    }
}

fn coerce_limit(value: &Value) -> Result<usize, CoreError> {
    let limit = match value {
        Value::Number(number) => match number.as_i64() {
            Some(n) => n,
            None => number.as_f64().map(|f| f.trunc() as i64).unwrap_or(i64::MAX),
        },
        Value::Bool(flag) => i64::from(*flag),
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| {
            CoreError::invalid_input(format!("invalid literal for limit: '{}'", text))
        })?,
        other => {
            return Err(CoreError::invalid_input(format!(
                "limit must be an integer, got {}",
                other
            )))
        }
    };

    if limit < 1 {
        return Err(CoreError::invalid_input(format!(
            "limit must be a positive integer, got {}",
            limit
        )));
    }

    usize::try_from(limit)
        .map_err(|_| CoreError::invalid_input(format!("limit out of range: {}", limit)))
}
