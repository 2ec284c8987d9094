//! Request builder for the collection and item endpoints of a resource
use http::header;
use thiserror::Error;

use crate::{
    codec::Encode,
    params::{DeleteParams, GetParams, ListParams, Patch, PatchParams, PostParams, WatchParams},
    path::PathTemplate,
    EncodeError,
};

pub(crate) const JSON_MIME: &str = "application/json";

const ITEM: PathTemplate<'static> = PathTemplate::new("{name}");
const SUBRESOURCE: PathTemplate<'static> = PathTemplate::new("{name}/{subresource}");

/// Possible errors when building a request.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to assemble the http request
    #[error("failed to build request: {0}")]
    BuildRequest(#[source] http::Error),

    /// Failed to encode a typed request body
    #[error("failed to encode request body: {0}")]
    EncodeBody(#[source] EncodeError),

    /// Failed to serialize a parameter body
    #[error("failed to serialize request body: {0}")]
    SerializeBody(#[source] serde_json::Error),

    /// Parameters were rejected before sending
    #[error("request validation failed with {0}")]
    Validation(String),

    /// A path placeholder had no value
    #[error("path template {template:?} has no value for {{{param}}}")]
    MissingPathParam {
        /// The template being rendered
        template: String,
        /// The placeholder without a value
        param: String,
    },

    /// A path value is not a single non-empty segment
    #[error("invalid value {value:?} for path parameter {param}")]
    InvalidPathParam {
        /// The placeholder
        param: String,
        /// The rejected value
        value: String,
    },
}

type Query = form_urlencoded::Serializer<'static, String>;

fn with_query(path: String, populate: impl FnOnce(&mut Query)) -> String {
    let mut qp = form_urlencoded::Serializer::new(String::new());
    populate(&mut qp);
    let query = qp.finish();
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// A request builder rooted at a resource collection path.
///
/// Every method returns an `http::Request` ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Collection path, e.g. `/apis/apps/v1/namespaces/prod/deployments`
    pub url_path: String,
}

impl Request {
    /// New request builder for a collection path
    pub fn new<S: Into<String>>(url_path: S) -> Self {
        Self {
            url_path: url_path.into(),
        }
    }

    fn item_path(&self, name: &str) -> Result<String, Error> {
        Ok(format!("{}/{}", self.url_path, ITEM.render(&[("name", name)])?))
    }

    fn subresource_path(&self, subresource: &str, name: &str) -> Result<String, Error> {
        let tail = SUBRESOURCE.render(&[("name", name), ("subresource", subresource)])?;
        Ok(format!("{}/{tail}", self.url_path))
    }
}

/// Collection and item verbs
impl Request {
    /// List the collection
    pub fn list(&self, lp: &ListParams) -> Result<http::Request<Vec<u8>>, Error> {
        lp.validate()?;
        let uri = with_query(self.url_path.clone(), |qp| lp.populate_qp(qp));
        http::Request::get(uri).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Watch the collection from `version`
    pub fn watch(&self, wp: &WatchParams, version: &str) -> Result<http::Request<Vec<u8>>, Error> {
        wp.validate()?;
        let uri = with_query(self.url_path.clone(), |qp| {
            wp.populate_qp(qp);
            qp.append_pair("resourceVersion", version);
        });
        http::Request::get(uri).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Get one object
    pub fn get(&self, name: &str, gp: &GetParams) -> Result<http::Request<Vec<u8>>, Error> {
        let uri = with_query(self.item_path(name)?, |qp| gp.populate_qp(qp));
        http::Request::get(uri).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Create an object from an encoded body
    pub fn create(&self, pp: &PostParams, data: Vec<u8>) -> Result<http::Request<Vec<u8>>, Error> {
        pp.validate()?;
        let uri = with_query(self.url_path.clone(), |qp| pp.populate_qp(qp));
        http::Request::post(uri)
            .header(header::CONTENT_TYPE, JSON_MIME)
            .body(data)
            .map_err(Error::BuildRequest)
    }

    /// Replace an object; the body must carry `metadata.resourceVersion`
    pub fn replace(&self, name: &str, pp: &PostParams, data: Vec<u8>) -> Result<http::Request<Vec<u8>>, Error> {
        pp.validate()?;
        let uri = with_query(self.item_path(name)?, |qp| pp.populate_qp(qp));
        http::Request::put(uri)
            .header(header::CONTENT_TYPE, JSON_MIME)
            .body(data)
            .map_err(Error::BuildRequest)
    }

    /// Patch an object
    pub fn patch<P: Encode>(
        &self,
        name: &str,
        pp: &PatchParams,
        patch: &Patch<P>,
    ) -> Result<http::Request<Vec<u8>>, Error> {
        pp.validate(patch)?;
        let uri = with_query(self.item_path(name)?, |qp| pp.populate_qp(qp));
        patch_request(uri, patch)
    }

    /// Delete an object
    pub fn delete(&self, name: &str, dp: &DeleteParams) -> Result<http::Request<Vec<u8>>, Error> {
        let uri = self.item_path(name)?;
        delete_request(uri, dp)
    }

    /// Delete every object matching the selectors of `lp`
    pub fn delete_collection(
        &self,
        dp: &DeleteParams,
        lp: &ListParams,
    ) -> Result<http::Request<Vec<u8>>, Error> {
        let uri = with_query(self.url_path.clone(), |qp| lp.populate_selectors(qp));
        delete_request(uri, dp)
    }
}

/// Subresource verbs
impl Request {
    /// Get a subresource of an object
    pub fn get_subresource(&self, subresource: &str, name: &str) -> Result<http::Request<Vec<u8>>, Error> {
        let uri = self.subresource_path(subresource, name)?;
        http::Request::get(uri).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Patch a subresource of an object
    pub fn patch_subresource<P: Encode>(
        &self,
        subresource: &str,
        name: &str,
        pp: &PatchParams,
        patch: &Patch<P>,
    ) -> Result<http::Request<Vec<u8>>, Error> {
        pp.validate(patch)?;
        let uri = with_query(self.subresource_path(subresource, name)?, |qp| pp.populate_qp(qp));
        patch_request(uri, patch)
    }

    /// Replace a subresource of an object
    pub fn replace_subresource(
        &self,
        subresource: &str,
        name: &str,
        pp: &PostParams,
        data: Vec<u8>,
    ) -> Result<http::Request<Vec<u8>>, Error> {
        pp.validate()?;
        let uri = with_query(self.subresource_path(subresource, name)?, |qp| pp.populate_qp(qp));
        http::Request::put(uri)
            .header(header::CONTENT_TYPE, JSON_MIME)
            .body(data)
            .map_err(Error::BuildRequest)
    }
}

fn patch_request<P: Encode>(uri: String, patch: &Patch<P>) -> Result<http::Request<Vec<u8>>, Error> {
    http::Request::patch(uri)
        .header(header::ACCEPT, JSON_MIME)
        .header(header::CONTENT_TYPE, patch.content_type())
        .body(patch.serialize().map_err(Error::EncodeBody)?)
        .map_err(Error::BuildRequest)
}

fn delete_request(uri: String, dp: &DeleteParams) -> Result<http::Request<Vec<u8>>, Error> {
    let body = if dp.is_default() {
        vec![]
    } else {
        serde_json::to_vec(dp).map_err(Error::SerializeBody)?
    };
    http::Request::delete(uri)
        .header(header::CONTENT_TYPE, JSON_MIME)
        .body(body)
        .map_err(Error::BuildRequest)
}
