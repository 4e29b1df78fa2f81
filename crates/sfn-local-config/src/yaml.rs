//! YAML to JSON conversion with CloudFormation short-form intrinsics expanded.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;
use serde_yaml::value::TaggedValue;

use crate::error::ConfigError;

/// Convert a parsed YAML document into JSON.
///
/// `!GetAtt a.b` becomes `{"Fn::GetAtt": ["a", "b"]}`, `!Ref x` becomes
/// `{"Ref": "x"}` and any other `!Name v` becomes `{"Fn::Name": v}`.
/// Scalar mapping keys are stringified.
pub(crate) fn to_json(value: Yaml) -> Result<Value, ConfigError> {
  match value {
    Yaml::Null => Ok(Value::Null),
    Yaml::Bool(b) => Ok(Value::Bool(b)),
    Yaml::Number(n) => number(&n),
    Yaml::String(s) => Ok(Value::String(s)),
    Yaml::Sequence(items) => items
      .into_iter()
      .map(to_json)
      .collect::<Result<Vec<_>, _>>()
      .map(Value::Array),
    Yaml::Mapping(mapping) => {
      let mut object = Map::new();
      for (key, value) in mapping {
        object.insert(key_to_string(key)?, to_json(value)?);
      }
      Ok(Value::Object(object))
    }
    Yaml::Tagged(tagged) => intrinsic(*tagged),
  }
}

fn number(n: &serde_yaml::Number) -> Result<Value, ConfigError> {
  if let Some(i) = n.as_i64() {
    return Ok(Value::from(i));
  }
  if let Some(u) = n.as_u64() {
    return Ok(Value::from(u));
  }
  n.as_f64()
    .and_then(Number::from_f64)
    .map(Value::Number)
    .ok_or_else(|| ConfigError::UnsupportedYaml(format!("number {}", n)))
}

fn key_to_string(key: Yaml) -> Result<String, ConfigError> {
  match key {
    Yaml::String(s) => Ok(s),
    Yaml::Number(n) => Ok(n.to_string()),
    Yaml::Bool(b) => Ok(b.to_string()),
    Yaml::Null => Ok("null".to_string()),
    other => Err(ConfigError::UnsupportedYaml(format!(
      "mapping key {:?}",
      other
    ))),
  }
}

fn intrinsic(tagged: TaggedValue) -> Result<Value, ConfigError> {
  let tag = tagged.tag.to_string();
  let name = tag.trim_start_matches('!');

  let (key, argument) = match name {
    "GetAtt" => {
      let argument = match tagged.value {
        Yaml::String(dotted) => match dotted.split_once('.') {
          Some((resource, attribute)) => Value::Array(vec![
            Value::String(resource.to_string()),
            Value::String(attribute.to_string()),
          ]),
          None => Value::String(dotted),
        },
        other => to_json(other)?,
      };
      ("Fn::GetAtt".to_string(), argument)
    }
    "Ref" | "Condition" => (name.to_string(), to_json(tagged.value)?),
    _ => (format!("Fn::{}", name), to_json(tagged.value)?),
  };

  let mut object = Map::new();
  object.insert(key, argument);
  Ok(Value::Object(object))
}
