//! Canonical URL form shared by the signer and the verifier.
//!
//! A URL is viewed as:
//!
//! ```text
//! <prefix>[?<name>=<value>&...][#<fragment>]
//! ```
//!
//! The prefix (scheme, authority and path) is signed in the form an HTTP
//! client puts on the wire: scheme and host are lowercased, the default port
//! of the scheme (`:80` for `http`, `:443` for `https`) is dropped, and an
//! empty path becomes `/`. The path itself is kept verbatim. Query parameters
//! are decoded with `application/x-www-form-urlencoded` rules into an ordered
//! list and re-encoded with the same rules on serialization, so two parsers
//! that see the same residual parameters in the same order always produce the
//! same bytes.
//!
//! The fragment never reaches a server. It is recorded on parse but is neither
//! signed nor written back by [`CanonicalUrl::to_url_string`].

use http::Uri;

use crate::error::{AuthError, AuthResult};

/// Query parameter holding the Unix timestamp after which the URL expires.
pub const EXPIRES_PARAM: &str = "expires";

/// Query parameter holding the encoded HMAC.
pub const SIGNATURE_PARAM: &str = "signature";

/// Parameter names owned by the signing protocol.
pub const RESERVED_PARAMS: [&str; 2] = [EXPIRES_PARAM, SIGNATURE_PARAM];

/// A URL split into prefix, ordered decoded query, and fragment.
///
/// # Examples
///
/// ```
/// use signurl_auth::canonical::CanonicalUrl;
///
/// let url = CanonicalUrl::parse("http://site.com/a?b=2&a=1&signature=x").unwrap();
/// assert_eq!(url.prefix(), "http://site.com/a");
/// assert_eq!(url.strip_reserved().serialize(), "http://site.com/a?b=2&a=1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    prefix: String,
    signing_prefix: String,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl CanonicalUrl {
    /// Parse a URL string.
    ///
    /// Accepts absolute URLs (`scheme://authority/path?query`) and origin-form
    /// references (`/path?query`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedUrl`] if the input is empty, is rejected
    /// by the URI parser, or is neither absolute nor origin-form.
    pub fn parse(url: &str) -> AuthResult<Self> {
        let (without_fragment, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_owned())),
            None => (url, None),
        };

        let absolute = validate(without_fragment)?;

        let (prefix, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        let signing_prefix = if absolute {
            normalize_authority(prefix)
        } else {
            prefix.to_owned()
        };

        let query = form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        Ok(Self {
            prefix: prefix.to_owned(),
            signing_prefix,
            query,
            fragment,
        })
    }

    /// Scheme, authority and path, exactly as they appeared in the input.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The decoded query parameters in input order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.query
    }

    /// The fragment (without the leading `#`), if any. Signed URLs never carry one.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// All values carried under `name`, in input order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Remove every occurrence of `name`, returning the removed values in order.
    ///
    /// The relative order of the remaining parameters is preserved.
    pub fn remove(&mut self, name: &str) -> Vec<String> {
        let mut removed = Vec::new();
        self.query.retain(|(key, value)| {
            if key == name {
                removed.push(value.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drop the reserved `expires` and `signature` parameters.
    #[must_use]
    pub fn strip_reserved(mut self) -> Self {
        self.query
            .retain(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()));
        self
    }

    /// Append a parameter after all existing ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    /// Serialize the prefix and query; this is the byte sequence that gets signed.
    ///
    /// An empty query serializes to the bare prefix. The fragment is omitted.
    #[must_use]
    pub fn serialize(&self) -> String {
        join(&self.signing_prefix, &self.encoded_query())
    }

    /// Serialize the URL as handed back to callers: the prefix as given and
    /// the encoded query. The fragment is dropped.
    #[must_use]
    pub fn to_url_string(&self) -> String {
        join(&self.prefix, &self.encoded_query())
    }

    fn encoded_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.query {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

/// Lowercase scheme and host, drop the scheme's default port, and root an empty path.
fn normalize_authority(prefix: &str) -> String {
    let Some((scheme, rest)) = prefix.split_once("://") else {
        return prefix.to_owned();
    };
    let (authority, path) = rest.find('/').map_or((rest, "/"), |at| rest.split_at(at));
    let (userinfo, host_port) = match authority.rsplit_once('@') {
        Some((userinfo, host_port)) => (Some(userinfo), host_port),
        None => (None, authority),
    };

    let scheme = scheme.to_ascii_lowercase();
    let host_port = host_port.to_ascii_lowercase();
    let default_port = match scheme.as_str() {
        "http" => Some(":80"),
        "https" => Some(":443"),
        _ => None,
    };
    let host_port = default_port
        .and_then(|port| host_port.strip_suffix(port))
        .unwrap_or(&host_port);

    match userinfo {
        Some(userinfo) => format!("{scheme}://{userinfo}@{host_port}{path}"),
        None => format!("{scheme}://{host_port}{path}"),
    }
}

fn join(prefix: &str, query: &str) -> String {
    if query.is_empty() {
        prefix.to_owned()
    } else {
        format!("{prefix}?{query}")
    }
}

/// Parse a URL string into its canonical view.
///
/// # Errors
///
/// See [`CanonicalUrl::parse`].
pub fn canonicalize(url: &str) -> AuthResult<CanonicalUrl> {
    CanonicalUrl::parse(url)
}

/// Check that `url` is an absolute or origin-form URI; returns whether it is absolute.
fn validate(url: &str) -> AuthResult<bool> {
    if url.is_empty() {
        return Err(AuthError::MalformedUrl("empty URL".to_owned()));
    }

    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| AuthError::MalformedUrl(format!("{url}: {e}")))?;

    let absolute = uri.scheme().is_some() && uri.authority().is_some();
    let origin_form = uri.scheme().is_none() && url.starts_with('/');
    if absolute || origin_form {
        Ok(absolute)
    } else {
        Err(AuthError::MalformedUrl(format!(
            "{url}: expected an absolute URL or a path starting with '/'"
        )))
    }
}
