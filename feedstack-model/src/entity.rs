use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// The value bound to one property name of an [`Entity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Text content, taken verbatim (after unescaping).
    Scalar(String),
    /// An element with neither text nor children. Present, but empty.
    Empty,
    /// A nested entity.
    Group(Entity),
    /// Same-named siblings, in document order. Items are `Scalar`,
    /// `Empty` or `Group`.
    Repeated(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Shorthand for a scalar value.
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// The text of a `Scalar`; `None` for every other variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The nested entity of a `Group`.
    pub fn as_group(&self) -> Option<&Entity> {
        match self {
            Self::Group(e) => Some(e),
            _ => None,
        }
    }

    /// The items of a `Repeated`.
    pub fn as_repeated(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Repeated(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_empty_value(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Iterates the value as a list: a `Repeated` yields its items, any
    /// other value yields itself once. Lets readers accept one-or-many
    /// without caring whether the writer marked the element repeatable.
    pub fn items(&self) -> std::slice::Iter<'_, PropertyValue> {
        match self {
            Self::Repeated(items) => items.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Entity> for PropertyValue {
    fn from(e: Entity) -> Self {
        Self::Group(e)
    }
}

/// An ordered property structure.
///
/// Property names are unique within one entity and iterate in insertion
/// (for decoded entities: document) order. Consumers re-emit documents
/// and count fields by position, so the order is part of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    properties: Vec<(String, PropertyValue)>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`. An existing binding is replaced in place
    /// and its old value returned; a new name is appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.properties[idx].1, value)),
            None => {
                self.properties.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.position(name).map(|idx| &self.properties[idx].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.position(name).map(|idx| &mut self.properties[idx].1)
    }

    /// Text of a scalar property.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    /// Nested entity of a group property.
    pub fn get_group(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(PropertyValue::as_group)
    }

    /// Removes a property, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.position(name).map(|idx| self.properties.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Properties in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Property names in stored order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(k, _)| k.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|(k, _)| k == name)
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (k, v) in iter {
            entity.insert(k, v);
        }
        entity
    }
}

impl IntoIterator for Entity {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

// JSON presentation keeps property order, which a derived map impl would not.
impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (name, value) in &self.properties {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => serializer.serialize_str(s),
            Self::Empty => serializer.serialize_none(),
            Self::Group(e) => e.serialize(serializer),
            Self::Repeated(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
