//! Solr admin JSON 응답 파서
//!
//! 이질적인 admin 응답을 타입이 있는 접근자로 조회하고, 값을 메트릭 값으로 변환합니다.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::LookupError;

/// 조회 결과 타입
pub type LookupResult<T> = Result<T, LookupError>;

/// 메트릭 값 - 정수, 실수, 또는 변환할 수 없는 원본 문자열
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// 정수
    Integer(i64),
    /// 실수
    Float(f64),
    /// 숫자로 해석할 수 없는 문자열
    Text(String),
}

impl MetricValue {
    /// Best-effort numeric coercion of text
    ///
    /// Integer parse first, then float parse when the text contains a decimal
    /// point; anything else comes back unchanged as `Text`.
    pub fn coerce(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return MetricValue::Integer(i);
        }
        if trimmed.contains('.') {
            if let Ok(f) = trimmed.parse::<f64>() {
                return MetricValue::Float(f);
            }
        }
        MetricValue::Text(text.to_string())
    }

    /// 이미 숫자인 값은 그대로, 문자열은 [`MetricValue::coerce`]
    pub fn try_convert(value: &Value) -> Option<Self> {
        match value {
            Value::Number(_) | Value::Bool(_) => Self::from_scalar(value),
            Value::String(s) => Some(Self::coerce(s)),
            _ => None,
        }
    }

    /// Verbatim conversion of a JSON scalar; strings are kept as `Text`
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(MetricValue::Integer(i)),
                None => n.as_f64().map(MetricValue::Float),
            },
            Value::String(s) => Some(MetricValue::Text(s.clone())),
            Value::Bool(b) => Some(MetricValue::Integer(i64::from(*b))),
            _ => None,
        }
    }

    /// 숫자로 변환 시도
    ///
    /// # Precision Warning
    /// Integers above 2^53 lose precision when converted to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Integer(i) => {
                if i.abs() > (1i64 << 53) {
                    tracing::warn!(
                        value = i,
                        "Large integer may lose precision when converted to f64"
                    );
                }
                Some(*i as f64)
            }
            MetricValue::Float(f) => Some(*f),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(i) => write!(f, "{}", i),
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Integer(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

/// 객체 노드 - 경로 정보를 포함
#[derive(Debug, Clone)]
pub struct Section<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Section<'a> {
    /// View a whole response as a section; the root must be an object
    pub fn root(value: &'a Value) -> LookupResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::new(map, "")),
            _ => Err(LookupError::NotAnObject {
                path: "<root>".to_string(),
            }),
        }
    }

    /// Build a section from an owned path and a borrowed map
    pub fn new(map: &'a Map<String, Value>, path: impl Into<String>) -> Self {
        Self {
            map,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// Raw child value
    pub fn get(&self, key: &str) -> LookupResult<&'a Value> {
        self.map.get(key).ok_or_else(|| LookupError::MissingField {
            path: self.child_path(key),
        })
    }

    /// Nested object at `keys`
    pub fn section(&self, keys: &[&str]) -> LookupResult<Section<'a>> {
        let mut current = self.clone();
        for key in keys {
            let path = current.child_path(key);
            current = match current.get(key)? {
                Value::Object(map) => Section { map, path },
                _ => return Err(LookupError::NotAnObject { path }),
            };
        }
        Ok(current)
    }

    /// Scalar child, converted verbatim
    pub fn scalar(&self, key: &str) -> LookupResult<MetricValue> {
        MetricValue::from_scalar(self.get(key)?).ok_or_else(|| LookupError::NotScalar {
            path: self.child_path(key),
        })
    }
}

/// `solr-mbeans` 블록을 category → 객체 맵으로 변환
///
/// Accepts the classic flat `[name, block, name, block, ...]` list as well as
/// an already keyed object. A trailing name without a block is ignored, as are
/// pairs whose name is not a string or whose block is not an object.
pub fn mbean_categories(response: &Value) -> LookupResult<Map<String, Value>> {
    match Section::root(response)?.get("solr-mbeans")? {
        Value::Array(items) => {
            let mut categories = Map::new();
            for pair in items.chunks_exact(2) {
                if let (Value::String(name), block @ Value::Object(_)) = (&pair[0], &pair[1]) {
                    categories.insert(name.clone(), block.clone());
                }
            }
            Ok(categories)
        }
        Value::Object(map) => Ok(map.clone()),
        _ => Err(LookupError::NotAnObject {
            path: "solr-mbeans".to_string(),
        }),
    }
}
