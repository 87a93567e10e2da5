//! Matcher trees: the declarative expectation language.
//!
//! A [`CaseNode`] is either raw data (which may itself contain matchers) or a
//! [`Matcher`]. Raw data is turned into matchers by [`infer_matcher`] when the
//! engine reaches it.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::errors::{CaseError, Result};
use crate::value::{number_to_json, AnyData};

/// Key that marks a serialised JSON object as a matcher rather than data.
pub const MATCHER_TYPE_KEY: &str = "case:matcher:type";

pub const DEFAULT_NUMBER_EXAMPLE: f64 = 1.1;
pub const DEFAULT_INTEGER_EXAMPLE: i64 = 1;
pub const DEFAULT_STRING_EXAMPLE: &str = "someString";
pub const DEFAULT_BOOLEAN_EXAMPLE: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    Literal,
    AnyNumber,
    AnyInteger,
    AnyString,
    AnyBoolean,
    AnyNull,
    HttpStatus,
    ShapedLike,
    ExactlyLike,
    ShapedArray,
    ShapedObject,
    ObjectEachKey,
    ObjectEachValue,
    ArrayEachEntry,
    ArrayContains,
    ArrayStartsWith,
    ArrayLength,
}

impl MatcherKind {
    pub const ALL: [MatcherKind; 17] = [
        MatcherKind::Literal,
        MatcherKind::AnyNumber,
        MatcherKind::AnyInteger,
        MatcherKind::AnyString,
        MatcherKind::AnyBoolean,
        MatcherKind::AnyNull,
        MatcherKind::HttpStatus,
        MatcherKind::ShapedLike,
        MatcherKind::ExactlyLike,
        MatcherKind::ShapedArray,
        MatcherKind::ShapedObject,
        MatcherKind::ObjectEachKey,
        MatcherKind::ObjectEachValue,
        MatcherKind::ArrayEachEntry,
        MatcherKind::ArrayContains,
        MatcherKind::ArrayStartsWith,
        MatcherKind::ArrayLength,
    ];

    /// The tag written under [`MATCHER_TYPE_KEY`].
    pub fn as_str(self) -> &'static str {
        match self {
            MatcherKind::Literal => "literal",
            MatcherKind::AnyNumber => "any-number",
            MatcherKind::AnyInteger => "any-integer",
            MatcherKind::AnyString => "any-string",
            MatcherKind::AnyBoolean => "any-boolean",
            MatcherKind::AnyNull => "any-null",
            MatcherKind::HttpStatus => "http-status",
            MatcherKind::ShapedLike => "shaped-like",
            MatcherKind::ExactlyLike => "exactly-like",
            MatcherKind::ShapedArray => "shaped-array",
            MatcherKind::ShapedObject => "shaped-object",
            MatcherKind::ObjectEachKey => "object-each-key",
            MatcherKind::ObjectEachValue => "object-each-value",
            MatcherKind::ArrayEachEntry => "array-each-entry",
            MatcherKind::ArrayContains => "array-contains",
            MatcherKind::ArrayStartsWith => "array-starts-with",
            MatcherKind::ArrayLength => "array-length",
        }
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatcherKind {
    type Err = CaseError;

    /// An unknown tag can only come from a corrupt or foreign contract file,
    /// so it is a core fault rather than a configuration one.
    fn from_str(s: &str) -> Result<Self> {
        MatcherKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CaseError::Core(format!("Missing executor for matcher type '{s}'")))
    }
}

/// An expectation node: raw data or an explicit matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseNode {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<CaseNode>),
    Object(Vec<(String, CaseNode)>),
    Matcher(Box<Matcher>),
}

impl CaseNode {
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, CaseNode)>) -> Self {
        CaseNode::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(items: impl IntoIterator<Item = CaseNode>) -> Self {
        CaseNode::Array(items.into_iter().collect())
    }

    pub fn as_matcher(&self) -> Option<&Matcher> {
        match self {
            CaseNode::Matcher(m) => Some(m),
            _ => None,
        }
    }

    /// Reads a node from contract JSON, where objects tagged with
    /// [`MATCHER_TYPE_KEY`] are matchers.
    pub fn from_contract_json(value: Value) -> Result<CaseNode> {
        if let Some(unknown) = find_unknown_kind(&value) {
            return Err(unknown);
        }
        serde_json::from_value(value)
            .map_err(|e| CaseError::Configuration(format!("Malformed matcher tree: {e}")))
    }

    pub fn to_contract_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn from_tagged_json(value: Value) -> std::result::Result<CaseNode, String> {
        match value {
            Value::Object(map) if map.contains_key(MATCHER_TYPE_KEY) => {
                serde_json::from_value::<Matcher>(Value::Object(map))
                    .map(|m| CaseNode::Matcher(Box::new(m)))
                    .map_err(|e| e.to_string())
            }
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| CaseNode::from_tagged_json(v).map(|node| (k, node)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(CaseNode::Object),
            Value::Array(items) => items
                .into_iter()
                .map(CaseNode::from_tagged_json)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(CaseNode::Array),
            other => Ok(CaseNode::from(AnyData::from(other))),
        }
    }
}

pub(crate) fn find_unknown_kind(value: &Value) -> Option<CaseError> {
    match value {
        Value::Object(map) => {
            if let Some(tag) = map.get(MATCHER_TYPE_KEY) {
                let Some(tag) = tag.as_str() else {
                    return Some(CaseError::Configuration(format!(
                        "'{MATCHER_TYPE_KEY}' must be a string, but was {tag}"
                    )));
                };
                if let Err(e) = tag.parse::<MatcherKind>() {
                    return Some(e);
                }
            }
            map.values().find_map(find_unknown_kind)
        }
        Value::Array(items) => items.iter().find_map(find_unknown_kind),
        _ => None,
    }
}

impl Serialize for CaseNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CaseNode::Null => serializer.serialize_unit(),
            CaseNode::Bool(b) => serializer.serialize_bool(*b),
            CaseNode::Number(n) => number_to_json(*n).serialize(serializer),
            CaseNode::String(s) => serializer.serialize_str(s),
            CaseNode::Array(items) => serializer.collect_seq(items),
            CaseNode::Object(fields) => serializer.collect_map(fields.iter().map(|(k, v)| (k, v))),
            CaseNode::Matcher(m) => m.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CaseNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CaseNode::from_tagged_json(value).map_err(serde::de::Error::custom)
    }
}

impl From<AnyData> for CaseNode {
    fn from(data: AnyData) -> Self {
        match data {
            AnyData::Null => CaseNode::Null,
            AnyData::Bool(b) => CaseNode::Bool(b),
            AnyData::Number(n) => CaseNode::Number(n),
            AnyData::String(s) => CaseNode::String(s),
            AnyData::Array(items) => CaseNode::Array(items.into_iter().map(CaseNode::from).collect()),
            AnyData::Object(fields) => {
                CaseNode::Object(fields.into_iter().map(|(k, v)| (k, CaseNode::from(v))).collect())
            }
        }
    }
}

/// Plain JSON is always data; use [`CaseNode::from_contract_json`] to read
/// serialised matchers.
impl From<Value> for CaseNode {
    fn from(value: Value) -> Self {
        CaseNode::from(AnyData::from(value))
    }
}

impl From<Matcher> for CaseNode {
    fn from(matcher: Matcher) -> Self {
        CaseNode::Matcher(Box::new(matcher))
    }
}

impl From<f64> for CaseNode {
    fn from(n: f64) -> Self {
        CaseNode::Number(n)
    }
}

impl From<i64> for CaseNode {
    fn from(n: i64) -> Self {
        CaseNode::Number(n as f64)
    }
}

impl From<bool> for CaseNode {
    fn from(b: bool) -> Self {
        CaseNode::Bool(b)
    }
}

impl From<&str> for CaseNode {
    fn from(s: &str) -> Self {
        CaseNode::String(s.to_string())
    }
}

impl From<String> for CaseNode {
    fn from(s: String) -> Self {
        CaseNode::String(s)
    }
}

impl From<Vec<CaseNode>> for CaseNode {
    fn from(items: Vec<CaseNode>) -> Self {
        CaseNode::Array(items)
    }
}

/// The closed set of matchers the engine knows how to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "case:matcher:type", rename_all = "kebab-case")]
pub enum Matcher {
    Literal(LiteralMatcher),
    AnyNumber(NumberMatcher),
    AnyInteger(IntegerMatcher),
    AnyString(StringMatcher),
    AnyBoolean(BooleanMatcher),
    AnyNull(NullMatcher),
    HttpStatus(HttpStatusMatcher),
    ShapedLike(CascadingMatcher),
    ExactlyLike(CascadingMatcher),
    ShapedArray(ShapedArrayMatcher),
    ShapedObject(ShapedObjectMatcher),
    ObjectEachKey(ObjectEachKeyMatcher),
    ObjectEachValue(ObjectEachValueMatcher),
    ArrayEachEntry(ArrayEachEntryMatcher),
    ArrayContains(ArrayContainsMatcher),
    ArrayStartsWith(ArrayStartsWithMatcher),
    ArrayLength(ArrayLengthMatcher),
}

impl Matcher {
    pub fn kind(&self) -> MatcherKind {
        match self {
            Matcher::Literal(_) => MatcherKind::Literal,
            Matcher::AnyNumber(_) => MatcherKind::AnyNumber,
            Matcher::AnyInteger(_) => MatcherKind::AnyInteger,
            Matcher::AnyString(_) => MatcherKind::AnyString,
            Matcher::AnyBoolean(_) => MatcherKind::AnyBoolean,
            Matcher::AnyNull(_) => MatcherKind::AnyNull,
            Matcher::HttpStatus(_) => MatcherKind::HttpStatus,
            Matcher::ShapedLike(_) => MatcherKind::ShapedLike,
            Matcher::ExactlyLike(_) => MatcherKind::ExactlyLike,
            Matcher::ShapedArray(_) => MatcherKind::ShapedArray,
            Matcher::ShapedObject(_) => MatcherKind::ShapedObject,
            Matcher::ObjectEachKey(_) => MatcherKind::ObjectEachKey,
            Matcher::ObjectEachValue(_) => MatcherKind::ObjectEachValue,
            Matcher::ArrayEachEntry(_) => MatcherKind::ArrayEachEntry,
            Matcher::ArrayContains(_) => MatcherKind::ArrayContains,
            Matcher::ArrayStartsWith(_) => MatcherKind::ArrayStartsWith,
            Matcher::ArrayLength(_) => MatcherKind::ArrayLength,
        }
    }

    /// An example supplied by the author, which stripping prefers over
    /// generating one from the matcher.
    pub fn explicit_example(&self) -> Option<&CaseNode> {
        match self {
            Matcher::ObjectEachKey(m) => m.example.as_ref(),
            Matcher::ObjectEachValue(m) => m.example.as_ref(),
            Matcher::ArrayEachEntry(m) => m.example.as_ref(),
            Matcher::ArrayContains(m) => m.example.as_ref(),
            _ => None,
        }
    }
}

/// Produced by inference over raw primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMatcher {
    pub example: AnyData,
}

// Leaf examples may be omitted in contract JSON; the defaults fill them in.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberMatcher {
    pub example: f64,
}

impl Default for NumberMatcher {
    fn default() -> Self {
        Self {
            example: DEFAULT_NUMBER_EXAMPLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegerMatcher {
    pub example: i64,
}

impl Default for IntegerMatcher {
    fn default() -> Self {
        Self {
            example: DEFAULT_INTEGER_EXAMPLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringMatcher {
    pub example: String,
}

impl Default for StringMatcher {
    fn default() -> Self {
        Self {
            example: DEFAULT_STRING_EXAMPLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanMatcher {
    pub example: bool,
}

impl Default for BooleanMatcher {
    fn default() -> Self {
        Self {
            example: DEFAULT_BOOLEAN_EXAMPLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NullMatcher {}

/// Accepts any status in the listed classes (`"4XX"`) or codes (`"404"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpStatusMatcher {
    pub codes: Vec<String>,
}

/// Changes how the subtree under `example` is matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadingMatcher {
    pub example: CaseNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedArrayMatcher {
    pub entries: Vec<CaseNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedObjectMatcher {
    pub fields: Vec<(String, CaseNode)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEachKeyMatcher {
    pub matcher: CaseNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<CaseNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEachValueMatcher {
    pub matcher: CaseNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<CaseNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayEachEntryMatcher {
    pub matcher: CaseNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<CaseNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayContainsMatcher {
    pub matchers: Vec<CaseNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<CaseNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayStartsWithMatcher {
    pub matchers: Vec<CaseNode>,
}

/// With no bounds, an array must have at least one entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayLengthMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl ArrayLengthMatcher {
    pub const DEFAULT_MIN_LENGTH: usize = 1;

    pub fn min(&self) -> usize {
        self.min_length.unwrap_or(Self::DEFAULT_MIN_LENGTH)
    }

    pub fn has_bounds(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some()
    }
}

/// Turns raw data into the matcher it implies. Nodes that are already
/// matchers are borrowed as-is.
pub fn infer_matcher(node: &CaseNode) -> Cow<'_, Matcher> {
    let literal = |example: AnyData| Cow::Owned(Matcher::Literal(LiteralMatcher { example }));
    match node {
        CaseNode::Matcher(m) => Cow::Borrowed(m),
        CaseNode::Null => literal(AnyData::Null),
        CaseNode::Bool(b) => literal(AnyData::Bool(*b)),
        CaseNode::Number(n) => literal(AnyData::Number(*n)),
        CaseNode::String(s) => literal(AnyData::String(s.clone())),
        CaseNode::Array(items) => Cow::Owned(Matcher::ShapedArray(ShapedArrayMatcher {
            entries: items.clone(),
        })),
        CaseNode::Object(fields) => Cow::Owned(Matcher::ShapedObject(ShapedObjectMatcher {
            fields: fields.clone(),
        })),
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

pub fn any_number(example: f64) -> CaseNode {
    Matcher::AnyNumber(NumberMatcher { example }).into()
}

pub fn any_integer(example: i64) -> CaseNode {
    Matcher::AnyInteger(IntegerMatcher { example }).into()
}

pub fn any_string(example: impl Into<String>) -> CaseNode {
    Matcher::AnyString(StringMatcher {
        example: example.into(),
    })
    .into()
}

pub fn any_boolean(example: bool) -> CaseNode {
    Matcher::AnyBoolean(BooleanMatcher { example }).into()
}

pub fn any_null() -> CaseNode {
    Matcher::AnyNull(NullMatcher {}).into()
}

pub fn http_status<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> CaseNode {
    Matcher::HttpStatus(HttpStatusMatcher {
        codes: codes.into_iter().map(Into::into).collect(),
    })
    .into()
}

/// Matches anything with the same shape and types as `example`.
pub fn shaped_like(example: impl Into<CaseNode>) -> CaseNode {
    Matcher::ShapedLike(CascadingMatcher {
        example: example.into(),
    })
    .into()
}

/// Matches only values exactly equal to `example`, however deeply nested.
pub fn exactly_like(example: impl Into<CaseNode>) -> CaseNode {
    Matcher::ExactlyLike(CascadingMatcher {
        example: example.into(),
    })
    .into()
}

pub fn object_each_key_matches(matcher: impl Into<CaseNode>) -> CaseNode {
    Matcher::ObjectEachKey(ObjectEachKeyMatcher {
        matcher: matcher.into(),
        example: None,
    })
    .into()
}

pub fn object_each_key_matches_with_example(
    matcher: impl Into<CaseNode>,
    example: impl Into<CaseNode>,
) -> CaseNode {
    Matcher::ObjectEachKey(ObjectEachKeyMatcher {
        matcher: matcher.into(),
        example: Some(example.into()),
    })
    .into()
}

pub fn object_each_value_matches(matcher: impl Into<CaseNode>) -> CaseNode {
    Matcher::ObjectEachValue(ObjectEachValueMatcher {
        matcher: matcher.into(),
        example: None,
    })
    .into()
}

pub fn object_each_value_matches_with_example(
    matcher: impl Into<CaseNode>,
    example: impl Into<CaseNode>,
) -> CaseNode {
    Matcher::ObjectEachValue(ObjectEachValueMatcher {
        matcher: matcher.into(),
        example: Some(example.into()),
    })
    .into()
}

pub fn array_each_entry_matches(matcher: impl Into<CaseNode>) -> CaseNode {
    Matcher::ArrayEachEntry(ArrayEachEntryMatcher {
        matcher: matcher.into(),
        example: None,
    })
    .into()
}

pub fn array_each_entry_matches_with_example(
    matcher: impl Into<CaseNode>,
    example: impl Into<CaseNode>,
) -> CaseNode {
    Matcher::ArrayEachEntry(ArrayEachEntryMatcher {
        matcher: matcher.into(),
        example: Some(example.into()),
    })
    .into()
}

/// Every one of `matchers` must be satisfied by at least one entry.
pub fn array_contains<N: Into<CaseNode>>(matchers: impl IntoIterator<Item = N>) -> CaseNode {
    Matcher::ArrayContains(ArrayContainsMatcher {
        matchers: matchers.into_iter().map(Into::into).collect(),
        example: None,
    })
    .into()
}

pub fn array_contains_with_example<N: Into<CaseNode>>(
    matchers: impl IntoIterator<Item = N>,
    example: impl Into<CaseNode>,
) -> CaseNode {
    Matcher::ArrayContains(ArrayContainsMatcher {
        matchers: matchers.into_iter().map(Into::into).collect(),
        example: Some(example.into()),
    })
    .into()
}

pub fn array_starts_with<N: Into<CaseNode>>(matchers: impl IntoIterator<Item = N>) -> CaseNode {
    Matcher::ArrayStartsWith(ArrayStartsWithMatcher {
        matchers: matchers.into_iter().map(Into::into).collect(),
    })
    .into()
}

pub fn array_length(bounds: ArrayLengthMatcher) -> CaseNode {
    Matcher::ArrayLength(bounds).into()
}
