//! Page-number query parameters and response envelopes for list endpoints.

use actix_web::HttpRequest;
use pagination::{Page, PageRequest};
use serde::Deserialize;
use url::Url;
use utoipa::IntoParams;

use crate::domain::{Error, Paged};

/// `page` and `page_size` query parameters shared by list endpoints.
///
/// Values stay textual so an unparsable page reports `Invalid page.` rather
/// than a generic query error.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<String>,
    /// Rows per page; defaults to 10 and is capped at 50.
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Resolve the requested window; a malformed page number is `404`.
    pub fn request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page.as_deref(), self.page_size.as_deref())
            .map_err(|err| Error::not_found(err.to_string()))
    }
}

/// Absolute URL of the current request, used to derive page links.
pub fn current_url(req: &HttpRequest) -> Result<Url, Error> {
    let info = req.connection_info();
    let raw = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
    Url::parse(&raw).map_err(|err| Error::internal(format!("request url is invalid: {err}")))
}

/// Wrap a domain page into the response envelope, converting each item.
pub fn envelope<T, U>(
    req: &HttpRequest,
    request: &PageRequest,
    paged: Paged<T>,
    convert: impl FnMut(T) -> U,
) -> Result<Page<U>, Error> {
    let url = current_url(req)?;
    Ok(Page::new(request, paged.count, paged.items, &url).map(convert))
}
