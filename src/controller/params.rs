use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpMessage, HttpRequest};

use crate::domain::{DashboardData, DashboardDataError, DashboardId};
use crate::error::{RestError, RestResult};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request parameters from the query string and, for form posts, the body.
///
/// Body values take precedence over query values with the same name.
#[derive(Debug, Default)]
pub struct Params(HashMap<String, String>);

impl FromRequest for Params {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut dev::Payload) -> Self::Future {
        let query = web::Query::<HashMap<String, String>>::from_query(req.query_string());
        let form = (req.content_type() == FORM_CONTENT_TYPE)
            .then(|| web::Form::<HashMap<String, String>>::from_request(req, payload));

        Box::pin(async move {
            let mut params = query
                .map_err(|e| RestError::ParseError(format!("Malformed query string: {}", e)))?
                .into_inner();

            if let Some(form) = form {
                let form = form
                    .await
                    .map_err(|e| RestError::ParseError(format!("Malformed form body: {}", e)))?;
                params.extend(form.into_inner());
            }

            Ok(Params(params))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Params {
    /// A parameter value, empty values count as missing
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> RestResult<&str> {
        self.optional(name)
            .ok_or_else(|| RestError::MissingParameter(name.into()))
    }

    pub fn required_id(&self, name: &str) -> RestResult<DashboardId> {
        let value = self.required(name)?;
        value.parse().map_err(|_| RestError::NotAnInteger {
            name: name.into(),
            found: value.into(),
        })
    }

    pub fn required_data(&self, name: &str) -> RestResult<DashboardData> {
        let value = self.required(name)?;
        DashboardData::parse(value).map_err(|e| match e {
            DashboardDataError::InvalidJson(_) => RestError::InvalidJson {
                name: name.into(),
                found: value.into(),
            },
            DashboardDataError::NotAnObject => RestError::NotAnObject {
                name: name.into(),
                found: value.into(),
            },
        })
    }

    /// Boolean flag, `true`, `1` and `yes` are truthy
    pub fn flag(&self, name: &str) -> bool {
        self.optional(name)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }
}
