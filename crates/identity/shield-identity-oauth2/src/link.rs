//! Authorization redirect URL.

use url::Url;

/// Build the URL the user agent is redirected to.
///
/// All values are form-urlencoded into the query; anything already in the
/// endpoint's query is kept. `state` is passed through as given.
pub fn build_authorization_link(
    authorization_endpoint: &Url,
    client_id: &str,
    callback_url: &str,
    scope: &str,
    state: &str,
) -> String {
    let mut url = authorization_endpoint.clone();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", callback_url)
        .append_pair("scope", scope)
        .append_pair("response_type", "code")
        .append_pair("state", state);
    url.into()
}
