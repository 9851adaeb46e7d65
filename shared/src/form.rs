//! Form-encoded request bodies
//!
//! Entities describe their wire shape with a static table of [`Field`]s.
//! [`serialize_defined`] walks that table in order and appends every field
//! whose value is present, so the table is the only place the field set
//! and its ordering are written down.

use std::fmt;
use thiserror::Error;

/// Form serialization error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A field marked as required had no value
    #[error("Required field missing: {0}")]
    MissingField(String),
}

/// Ordered `application/x-www-form-urlencoded` body
///
/// Pairs are kept in insertion order; keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builder form of [`FormBody::push`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `k=v&k=v` text for display; transports send [`FormBody::pairs`]
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for FormBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// A value that knows how to write itself under a form key
pub trait FormEncode {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError>;
}

impl FormEncode for String {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError> {
        form.push(key, self.as_str());
        Ok(())
    }
}

impl FormEncode for bool {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError> {
        form.push(key, if *self { "true" } else { "false" });
        Ok(())
    }
}

impl FormEncode for u32 {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError> {
        form.push(key, self.to_string());
        Ok(())
    }
}

/// Lists use the query-protocol convention `Key.member.N`, 1-based
impl<T: FormEncode> FormEncode for Vec<T> {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError> {
        for (i, item) in self.iter().enumerate() {
            item.encode_into(&format!("{}.member.{}", key, i + 1), form)?;
        }
        Ok(())
    }
}

/// One row of a declarative field table
pub struct Field<T> {
    /// Local attribute name
    pub attribute: &'static str,
    /// Key used on the wire
    pub wire: &'static str,
    /// Whether absence is an error rather than an omission
    pub required: bool,
    /// Accessor returning the value when it is defined
    pub value: fn(&T) -> Option<&dyn FormEncode>,
}

impl<T> Field<T> {
    pub fn is_defined(&self, entity: &T) -> bool {
        (self.value)(entity).is_some()
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("attribute", &self.attribute)
            .field("wire", &self.wire)
            .field("required", &self.required)
            .finish()
    }
}

/// Adapt an optional attribute for use in a field table accessor
pub fn defined<T: FormEncode>(value: &Option<T>) -> Option<&dyn FormEncode> {
    value.as_ref().map(|v| v as &dyn FormEncode)
}

/// Append every defined field of `entity` to `form`, in table order
///
/// A field is included iff its accessor returns `Some`. Empty strings,
/// `false` and zero are values like any other.
pub fn serialize_defined<T>(
    fields: &[Field<T>],
    entity: &T,
    form: &mut FormBody,
) -> Result<(), FormError> {
    serialize_with_prefix(fields, entity, None, form)
}

/// Same as [`serialize_defined`], nesting every wire key under `prefix.`
pub fn serialize_with_prefix<T>(
    fields: &[Field<T>],
    entity: &T,
    prefix: Option<&str>,
    form: &mut FormBody,
) -> Result<(), FormError> {
    for field in fields {
        let key = match prefix {
            Some(p) => format!("{}.{}", p, field.wire),
            None => field.wire.to_string(),
        };
        match (field.value)(entity) {
            Some(value) => value.encode_into(&key, form)?,
            None if field.required => return Err(FormError::MissingField(key)),
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        id: Option<String>,
        flag: Option<bool>,
        tags: Option<Vec<String>>,
    }

    static SAMPLE_FIELDS: &[Field<Sample>] = &[
        Field {
            attribute: "id",
            wire: "Id",
            required: true,
            value: |p| defined(&p.id),
        },
        Field {
            attribute: "flag",
            wire: "Flag",
            required: false,
            value: |p| defined(&p.flag),
        },
        Field {
            attribute: "tags",
            wire: "Tags",
            required: false,
            value: |p| defined(&p.tags),
        },
    ];

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let form = FormBody::new()
            .with("UserData", "#!/bin/sh\necho a&b=c")
            .with("Name", "web lc");
        assert_eq!(
            form.encode(),
            "UserData=%23%21%2Fbin%2Fsh%0Aecho%20a%26b%3Dc&Name=web%20lc"
        );
    }

    #[test]
    fn test_false_and_empty_are_still_defined() {
        let sample = Sample {
            id: Some(String::new()),
            flag: Some(false),
            tags: None,
        };
        let mut form = FormBody::new();
        serialize_defined(SAMPLE_FIELDS, &sample, &mut form).unwrap();

        assert_eq!(form.get("Id"), Some(""));
        assert_eq!(form.get("Flag"), Some("false"));
        assert!(!form.contains_key("Tags"));
    }

    #[test]
    fn test_missing_required_field() {
        let sample = Sample {
            id: None,
            flag: Some(true),
            tags: None,
        };
        let mut form = FormBody::new();
        let err = serialize_defined(SAMPLE_FIELDS, &sample, &mut form).unwrap_err();
        assert_eq!(err, FormError::MissingField("Id".into()));
    }

    #[test]
    fn test_list_members_are_one_based() {
        let sample = Sample {
            id: Some("x".into()),
            flag: None,
            tags: Some(vec!["a".into(), "b".into()]),
        };
        let mut form = FormBody::new();
        serialize_with_prefix(SAMPLE_FIELDS, &sample, Some("Outer"), &mut form).unwrap();

        let keys: Vec<_> = form.keys().collect();
        assert_eq!(keys, vec!["Outer.Id", "Outer.Tags.member.1", "Outer.Tags.member.2"]);
    }
}
