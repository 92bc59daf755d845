use itertools::Itertools;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use url::{Position, Url};

/// Join path elements with '/' and clean the result.
/// Empty elements are ignored, and if all elements are empty
/// then the result is also empty.
pub fn join_path<'p>(elements: impl IntoIterator<Item = &'p str>) -> String {
    let joined = elements
        .into_iter()
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        joined
    } else {
        clean_path(&joined)
    }
}

/// Lexically clean `path`: repeated separators and "." elements are removed,
/// and ".." elements consume their preceding element. A rooted path never
/// climbs above its root. An empty result is ".".
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

// Base against which relative references are resolved. It's never displayed.
const RELATIVE_BASE: &str = "http://relative.invalid/";

// Bytes escaped within query names and values: everything but unreserved characters.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Link is either an absolute URL, or a reference which is relative to
/// some unknown base (ex `/grafana` or `grafana.example.com/sub`).
/// A relative Link displays in the same form it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    url: Url,
    form: Form,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Form {
    Absolute,
    // `//host/path`
    NetworkPath,
    // `/path`, `?query`, or `#fragment`
    Rooted,
    // `path`
    Unrooted,
}

impl Link {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        match Url::parse(input) {
            Ok(url) => {
                return Ok(Self {
                    url,
                    form: Form::Absolute,
                })
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => (),
            Err(err) => return Err(err),
        }

        let base = Url::parse(RELATIVE_BASE)?;
        let url = Url::options().base_url(Some(&base)).parse(input)?;

        let form = if input.starts_with("//") {
            Form::NetworkPath
        } else if input.is_empty() || input.starts_with(|c: char| matches!(c, '/' | '?' | '#')) {
            Form::Rooted
        } else {
            Form::Unrooted
        };
        Ok(Self { url, form })
    }

    /// Escaped path of the Link. An unrooted Link has an unrooted path.
    pub fn path(&self) -> &str {
        match self.form {
            Form::Unrooted => self.url.path().trim_start_matches('/'),
            _ => self.url.path(),
        }
    }

    pub fn set_path(&mut self, path: &str) {
        self.url.set_path(path);
    }

    /// Set the raw, already-encoded query of the Link.
    pub fn set_query(&mut self, query: Option<&str>) {
        self.url.set_query(query);
    }

    /// Replace all values of query parameter `name` with `value`.
    /// Parameters are re-encoded in sorted order of their names.
    pub fn set_query_param(&mut self, name: &str, value: &str) {
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (k, v) in self.url.query_pairs() {
            params.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        params.insert(name.to_string(), vec![value.to_string()]);

        let query = encode_query(
            params
                .iter()
                .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str()))),
        );
        self.url.set_query(Some(&query));
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.form {
            Form::Absolute => f.write_str(self.url.as_str()),
            Form::NetworkPath => write!(f, "//{}", &self.url[Position::BeforeUsername..]),
            Form::Rooted => f.write_str(&self.url[Position::BeforePath..]),
            Form::Unrooted => {
                f.write_str(self.url[Position::BeforePath..].trim_start_matches('/'))
            }
        }
    }
}

/// Encode `pairs` as a query string. Names and values are escaped so that
/// only unreserved characters remain, and spaces become '+'.
pub fn encode_query<'p>(pairs: impl IntoIterator<Item = (&'p str, &'p str)>) -> String {
    pairs
        .into_iter()
        .map(|(name, value)| format!("{}={}", query_escape(name), query_escape(value)))
        .join("&")
}

fn query_escape(s: &str) -> String {
    // A literal '%' is itself escaped, so "%20" can only be a space.
    utf8_percent_encode(s, QUERY).to_string().replace("%20", "+")
}
