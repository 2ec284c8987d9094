//! REST path templates
use crate::request::Error;

// Characters that would end the path or start an escape when spliced into a URI.
const RESERVED: &[char] = &['/', '?', '#', '%'];

/// A REST path with `{param}` placeholders, such as
/// `/apis/{group}/{version}/namespaces/{namespace}/{plural}`.
///
/// Substitution is literal. Every placeholder must be supplied with a value that is a
/// single, non-empty path segment without `?`, `#` or `%`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathTemplate<'a>(&'a str);

impl<'a> PathTemplate<'a> {
    /// Wrap a template string
    pub const fn new(template: &'a str) -> Self {
        Self(template)
    }

    /// The template as written
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Placeholder names in order of appearance
    pub fn params(&self) -> impl Iterator<Item = &'a str> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            let start = rest.find('{')?;
            let len = rest[start..].find('}')?;
            let name = &rest[start + 1..start + len];
            rest = &rest[start + len + 1..];
            Some(name)
        })
    }

    /// Substitute `params` into the template.
    ///
    /// ```
    /// use kubewire_core::PathTemplate;
    /// let path = PathTemplate::new("/api/{version}/namespaces/{namespace}/pods")
    ///     .render(&[("version", "v1"), ("namespace", "default")])
    ///     .unwrap();
    /// assert_eq!(path, "/api/v1/namespaces/default/pods");
    /// ```
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, Error> {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + len];
            let value = params
                .iter()
                .find_map(|(key, value)| (*key == name).then_some(*value))
                .ok_or_else(|| Error::MissingPathParam {
                    template: self.0.to_owned(),
                    param: name.to_owned(),
                })?;
            if value.is_empty() || value == "." || value == ".." || value.contains(RESERVED) {
                return Err(Error::InvalidPathParam {
                    param: name.to_owned(),
                    value: value.to_owned(),
                });
            }
            out.push_str(&rest[..start]);
            out.push_str(value);
            rest = &rest[start + len + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
