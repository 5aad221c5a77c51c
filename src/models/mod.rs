mod url;

pub use url::{CodeInfoRequest, CodeInfoResponse, ShortenRequest, ShortenResponse, UrlMapping};
