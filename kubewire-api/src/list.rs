use kubewire_core::{
    codec::{Decode, Decoder, Encode, Encoder},
    value::{Map, Value},
    DecodeError, EncodeError,
};

use crate::apimachinery::meta::v1::ListMeta;

/// A generic Kubernetes object list
///
/// Stands in for `DeploymentList`, `PodList` and friends, which all share this shape.
/// Produced by list and delete-collection queries.
///
/// Unlike the object types, `metadata` and `items` are plain values rather than
/// optional slots. Every list kind requires both, so they are always encoded: an empty
/// list is written as `{"metadata":{},"items":[]}`, the way the apiserver writes it.
#[derive(Clone, Debug, PartialEq)]
pub struct List<T> {
    /// `apiVersion` of the list, usually that of the items
    pub api_version: Option<String>,
    /// `<Kind>List`
    pub kind: Option<String>,
    /// Only really used for its `resourceVersion` and `continue` token
    pub metadata: ListMeta,
    /// The objects
    pub items: Vec<T>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self {
            api_version: None,
            kind: None,
            metadata: ListMeta::default(),
            items: Vec::new(),
        }
    }
}

impl<T> List<T> {
    /// Iterate over the items
    ///
    /// ```
    /// use kubewire_api::List;
    ///
    /// let list = List { items: vec![1, 2, 3], ..List::default() };
    /// assert_eq!(list.iter().sum::<i32>(), 6);
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Iterate mutably over the items
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl<T> IntoIterator for List<T> {
    type IntoIter = std::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Decode> Decode for List<T> {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(de.type_mismatch("List", &other)),
        };
        de.nested(|de| {
            let mut list = Self::default();
            for (key, value) in map {
                if value.is_null() {
                    continue;
                }
                match key.as_str() {
                    "apiVersion" => list.api_version = Some(de.field("apiVersion", value)?),
                    "kind" => list.kind = Some(de.field("kind", value)?),
                    "metadata" => list.metadata = de.field("metadata", value)?,
                    "items" => list.items = de.field("items", value)?,
                    _ => tracing::trace!(%key, "dropping unknown list field"),
                }
            }
            Ok(list)
        })
    }
}

impl<T: Encode> Encode for List<T> {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        if let Some(api_version) = &self.api_version {
            map.insert("apiVersion".into(), en.field("apiVersion", api_version)?);
        }
        if let Some(kind) = &self.kind {
            map.insert("kind".into(), en.field("kind", kind)?);
        }
        map.insert("metadata".into(), en.field("metadata", &self.metadata)?);
        map.insert("items".into(), en.field("items", &self.items)?);
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::apps::v1::Deployment, ResourceExt};
    use kubewire_core::codec::{from_value, to_value};
    use serde_json::json;

    #[test]
    fn decodes_deployment_list() {
        let list: List<Deployment> = from_value(json!({
            "apiVersion": "apps/v1",
            "kind": "DeploymentList",
            "metadata": {"resourceVersion": "1234", "continue": "tok"},
            "items": [
                {"metadata": {"name": "a"}},
                {"metadata": {"name": "b"}, "spec": {"replicas": 0}}
            ]
        }))
        .unwrap();
        assert_eq!(list.metadata.resource_version.as_deref(), Some("1234"));
        assert_eq!(list.metadata.continue_.as_deref(), Some("tok"));
        let names: Vec<_> = list.iter().map(ResourceExt::name_any).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(list.items[1].spec.as_ref().and_then(|s| s.replicas), Some(0));
    }

    #[test]
    fn missing_items_is_empty() {
        let list: List<Deployment> = from_value(json!({"metadata": {}, "items": null})).unwrap();
        assert!(list.items.is_empty());
        assert_eq!(to_value(&list).unwrap(), json!({"metadata": {}, "items": []}));
    }

    #[test]
    fn required_keys_are_always_written() {
        let list: List<Deployment> = from_value(json!({})).unwrap();
        assert_eq!(list, List::default());
        assert_eq!(to_value(&list).unwrap(), json!({"metadata": {}, "items": []}));

        let list = List::<Deployment> {
            kind: Some("DeploymentList".into()),
            ..List::default()
        };
        assert_eq!(
            to_value(&list).unwrap(),
            json!({"kind": "DeploymentList", "metadata": {}, "items": []})
        );
    }

    #[test]
    fn item_errors_carry_index() {
        let err = from_value::<List<Deployment>>(json!({"items": [{}, {"spec": {"replicas": "3"}}]}))
            .unwrap_err();
        assert!(err.to_string().starts_with("items[1].spec.replicas:"));
    }
}
