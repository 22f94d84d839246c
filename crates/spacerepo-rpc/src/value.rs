use std::collections::BTreeMap;

use crate::error::{Result, RpcError};

/// An XML-RPC value.
///
/// `DateTime` and `Base64` keep their raw text; nothing in this client needs
/// them decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Boolean(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(String),
    Struct(BTreeMap<String, Value>),
    Array(Vec<Value>),
    Nil,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Double(_) => "double",
            Value::DateTime(_) => "dateTime.iso8601",
            Value::Base64(_) => "base64",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
            Value::Nil => "nil",
        }
    }

    fn mismatch(&self, expected: &'static str) -> RpcError {
        RpcError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_struct(&self) -> Result<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(members) => Ok(members),
            other => Err(other.mismatch("struct")),
        }
    }

    /// Looks up a required string member of a struct.
    pub fn member_str(&self, name: &str) -> Result<&str> {
        self.as_struct()?
            .get(name)
            .ok_or_else(|| RpcError::MissingMember(name.to_string()))?
            .as_str()
    }

    /// Looks up an optional string member of a struct. `nil` and empty
    /// strings count as absent.
    pub fn member_opt_str(&self, name: &str) -> Result<Option<&str>> {
        match self.as_struct()?.get(name) {
            None | Some(Value::Nil) => Ok(None),
            Some(value) => {
                let s = value.as_str()?;
                Ok((!s.is_empty()).then_some(s))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Struct(value)
    }
}
