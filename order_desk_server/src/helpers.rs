use actix_web::HttpRequest;
use log::trace;

use crate::data_objects::Linked;

/// Builds the absolute URL of a resource, e.g. `http://localhost:8360/articles/7/`, using the scheme and host the
/// client used to reach the server.
pub fn resource_url(req: &HttpRequest, collection: &str, id: i64) -> String {
    let info = req.connection_info();
    let url = format!("{}://{}/{collection}/{id}/", info.scheme(), info.host());
    trace!("💻️ Resource url: {url}");
    url
}

pub fn linked<T>(req: &HttpRequest, collection: &str, id: i64, inner: T) -> Linked<T> {
    Linked::new(resource_url(req, collection, id), inner)
}
