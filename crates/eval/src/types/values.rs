//! Runtime fact values and snapshot JSON decoding.

use rust_decimal::Decimal;
use screenflow_core::ItemId;
use time::macros::format_description;
use time::Date;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A fact value as read from the fact graph.
/// Money and fractional numbers use `rust_decimal::Decimal`, never `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Dollar(Decimal),
    Text(String),
    /// Selected option(s) of an enum or multi-enum fact.
    Enum(Vec<String>),
    Day(Date),
    /// Member ids of a collection fact, in listing order.
    Collection(Vec<ItemId>),
    /// Reference to one collection member.
    Item(ItemId),
    /// Composite values the engine never inspects (addresses, TINs, ...).
    Structured(serde_json::Value),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Decimal(_) => "Decimal",
            Value::Dollar(_) => "Dollar",
            Value::Text(_) => "Text",
            Value::Enum(_) => "Enum",
            Value::Day(_) => "Day",
            Value::Collection(_) => "Collection",
            Value::Item(_) => "Item",
            Value::Structured(_) => "Structured",
        }
    }

    /// Truthiness used by the condition operators.
    ///
    /// Bools are themselves; numbers are true when non-zero; text and
    /// collections when non-empty. Everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Decimal(d) | Value::Dollar(d) => !d.is_zero(),
            Value::Text(s) => !s.is_empty(),
            Value::Collection(items) => !items.is_empty(),
            Value::Enum(_) | Value::Day(_) | Value::Item(_) | Value::Structured(_) => true,
        }
    }

    /// Plain JSON rendering for CLI output and explanations.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(i),
            Value::Decimal(d) | Value::Dollar(d) => serde_json::Value::String(d.to_string()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Enum(options) => serde_json::json!(options),
            Value::Day(d) => serde_json::Value::String(d.to_string()),
            Value::Collection(items) => {
                serde_json::Value::Array(items.iter().map(|i| i.as_str().into()).collect())
            }
            Value::Item(id) => serde_json::Value::String(id.to_string()),
            Value::Structured(v) => v.clone(),
        }
    }
}

// ──────────────────────────────────────────────
// Snapshot JSON decoding
// ──────────────────────────────────────────────

/// Decoded form of one snapshot entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub value: Option<Value>,
    pub complete: bool,
}

/// Decode a snapshot fact value.
///
/// Bare scalars are complete values, arrays of strings are collections and
/// `null` is a known but unanswered fact. Objects must be persister
/// wrappers (`{"$type": ..., "item": ...}`); a wrapper with
/// `"complete": false` is a placeholder value.
pub(crate) fn decode_fact(v: &serde_json::Value) -> Result<Decoded, String> {
    let complete = |value| Decoded {
        value: Some(value),
        complete: true,
    };
    match v {
        serde_json::Value::Null => Ok(Decoded {
            value: None,
            complete: false,
        }),
        serde_json::Value::Bool(b) => Ok(complete(Value::Bool(*b))),
        serde_json::Value::Number(n) => Ok(complete(decode_number(n)?)),
        serde_json::Value::String(s) => Ok(complete(Value::Text(s.clone()))),
        serde_json::Value::Array(items) => Ok(complete(Value::Collection(decode_ids(items)?))),
        serde_json::Value::Object(obj) => {
            let type_name = obj
                .get("$type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| "object values must be persister wrappers with a '$type'".to_string())?;
            let item = obj
                .get("item")
                .ok_or_else(|| format!("{} is missing 'item'", type_name))?;
            let value = decode_wrapper(type_name, item)?;
            let is_complete = obj
                .get("complete")
                .and_then(|c| c.as_bool())
                .unwrap_or(true);
            Ok(Decoded {
                value: Some(value),
                complete: is_complete,
            })
        }
    }
}

fn decode_number(n: &serde_json::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    n.to_string()
        .parse::<Decimal>()
        .map(Value::Decimal)
        .map_err(|e| format!("invalid number {}: {}", n, e))
}

fn decode_ids(items: &[serde_json::Value]) -> Result<Vec<ItemId>, String> {
    items
        .iter()
        .map(|i| {
            i.as_str()
                .map(ItemId::from)
                .ok_or_else(|| "collection members must be string ids".to_string())
        })
        .collect()
}

fn decode_decimal(item: &serde_json::Value, what: &str) -> Result<Decimal, String> {
    let text = match item {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return Err(format!("{} must be a string or number", what)),
    };
    text.parse::<Decimal>()
        .map_err(|e| format!("invalid {} '{}': {}", what, text, e))
}

fn decode_wrapper(type_name: &str, item: &serde_json::Value) -> Result<Value, String> {
    // Accept both fully qualified and short persister names.
    let short = type_name.rsplit('.').next().unwrap_or(type_name);
    match short {
        "BooleanWrapper" => item
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| "BooleanWrapper item must be a boolean".to_string()),
        "IntWrapper" => match item {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| format!("IntWrapper item {} is not an integer", n)),
            serde_json::Value::String(s) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("invalid IntWrapper item '{}': {}", s, e)),
            _ => Err("IntWrapper item must be an integer".to_string()),
        },
        "DollarWrapper" => decode_decimal(item, "dollar amount").map(Value::Dollar),
        "RationalWrapper" | "DecimalWrapper" => decode_decimal(item, "decimal").map(Value::Decimal),
        "StringWrapper" => item
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| "StringWrapper item must be a string".to_string()),
        "EnumWrapper" | "MultiEnumWrapper" => {
            let options = item
                .get("value")
                .ok_or_else(|| format!("{} item is missing 'value'", short))?;
            match options {
                serde_json::Value::String(s) => Ok(Value::Enum(vec![s.clone()])),
                serde_json::Value::Array(values) => values
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| format!("{} options must be strings", short))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Enum),
                _ => Err(format!("{} 'value' must be a string or array", short)),
            }
        }
        "DayWrapper" => {
            let text = item
                .as_str()
                .ok_or_else(|| "DayWrapper item must be a YYYY-MM-DD string".to_string())?;
            Date::parse(text, format_description!("[year]-[month]-[day]"))
                .map(Value::Day)
                .map_err(|e| format!("invalid day '{}': {}", text, e))
        }
        "CollectionWrapper" => {
            let items = item
                .get("items")
                .and_then(|i| i.as_array())
                .ok_or_else(|| "CollectionWrapper item must have an 'items' array".to_string())?;
            decode_ids(items).map(Value::Collection)
        }
        "CollectionItemWrapper" => item
            .get("id")
            .and_then(|i| i.as_str())
            .map(|id| Value::Item(ItemId::from(id)))
            .ok_or_else(|| "CollectionItemWrapper item must have an 'id'".to_string()),
        "TinWrapper" | "EinWrapper" | "PinWrapper" | "IpPinWrapper" | "EmailAddressWrapper"
        | "AddressWrapper" | "BankAccountWrapper" | "PhoneNumberWrapper" => {
            Ok(Value::Structured(item.clone()))
        }
        other => Err(format!("unsupported persister type '{}'", other)),
    }
}
