//! Typed request parameters for each backend endpoint.
//!
//! Every endpoint gets its own struct; [`RequestParams::pairs`] is the only
//! place where field names and value formats are decided.

use std::collections::BTreeMap;

use crate::query::{SafeSearch, SearchQuery};

/// Something that can be serialized into ordered request parameters.
pub trait RequestParams {
    /// Name/value pairs in wire order.
    fn pairs(&self) -> Vec<(&'static str, String)>;
}

/// Empty parameter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParams;

impl RequestParams for NoParams {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl RequestParams for BTreeMap<&'static str, String> {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        self.iter().map(|(k, v)| (*k, v.clone())).collect()
    }
}

/// Parameters for the root page probe that yields the vqd token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParams<'a> {
    pub keywords: &'a str,
}

impl RequestParams for TokenParams<'_> {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![("q", self.keywords.to_string())]
    }
}

/// Parameters for the image JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub region: String,
    pub cursor: String,
    pub keywords: String,
    pub vqd: String,
    pub filter: String,
    pub safesearch: SafeSearch,
}

impl ImageParams {
    /// Builds the first-page parameters for `query`.
    pub fn new(query: &SearchQuery, vqd: impl Into<String>) -> Self {
        Self {
            region: query.region.clone(),
            cursor: "0".to_string(),
            keywords: query.keywords.clone(),
            vqd: vqd.into(),
            filter: image_filter(query),
            safesearch: query.safesearch,
        }
    }

    fn safesearch_flag(&self) -> &'static str {
        match self.safesearch {
            SafeSearch::On | SafeSearch::Moderate => "1",
            SafeSearch::Off => "-1",
        }
    }
}

impl RequestParams for ImageParams {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("l", self.region.clone()),
            ("o", "json".to_string()),
            ("s", self.cursor.clone()),
            ("q", self.keywords.clone()),
            ("vqd", self.vqd.clone()),
            ("f", self.filter.clone()),
            ("p", self.safesearch_flag().to_string()),
        ]
    }
}

/// Joins the image filters into the backend's comma-separated `f` field.
///
/// Absent filters leave an empty segment, so the field always has six parts.
pub fn image_filter(query: &SearchQuery) -> String {
    fn segment(prefix: &str, value: Option<&str>) -> String {
        value.map(|v| format!("{}:{}", prefix, v)).unwrap_or_default()
    }

    let f = &query.filters;
    [
        segment("time", query.timelimit.map(|t| t.image_name())),
        segment("size", f.size.map(|v| v.as_str())),
        segment("color", f.color.map(|v| v.as_str())),
        segment("type", f.image_type.map(|v| v.as_str())),
        segment("layout", f.layout.map(|v| v.as_str())),
        segment("license", f.license.map(|v| v.as_str())),
    ]
    .join(",")
}

/// Parameters for the text (links) JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextParams {
    pub keywords: String,
    pub region: String,
    pub cursor: String,
    pub timelimit: Option<&'static str>,
    pub vqd: String,
    pub safesearch: SafeSearch,
}

impl TextParams {
    /// Builds the first-page parameters for `query`.
    pub fn new(query: &SearchQuery, vqd: impl Into<String>) -> Self {
        Self {
            keywords: query.keywords.clone(),
            region: query.region.clone(),
            cursor: "0".to_string(),
            timelimit: query.timelimit.map(|t| t.code()),
            vqd: vqd.into(),
            safesearch: query.safesearch,
        }
    }
}

impl RequestParams for TextParams {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.keywords.clone()),
            ("kl", self.region.clone()),
            ("l", self.region.clone()),
            ("s", self.cursor.clone()),
        ];
        if let Some(df) = self.timelimit {
            pairs.push(("df", df.to_string()));
        }
        pairs.push(("vqd", self.vqd.clone()));
        pairs.push(("o", "json".to_string()));
        pairs.push(("sp", "0".to_string()));
        match self.safesearch {
            SafeSearch::Moderate => pairs.push(("ex", "-1".to_string())),
            SafeSearch::Off => pairs.push(("ex", "-2".to_string())),
            SafeSearch::On => pairs.push(("p", "1".to_string())),
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ImageFilters, ImageLayout, ImageSize, ImageType, TimeLimit};

    fn get<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_token_params() {
        let pairs = TokenParams { keywords: "cat" }.pairs();
        assert_eq!(pairs, vec![("q", "cat".to_string())]);
    }

    #[test]
    fn test_image_params_defaults() {
        let query = SearchQuery::new("cat");
        let pairs = ImageParams::new(&query, "X1").pairs();
        assert_eq!(get(&pairs, "l"), Some("wt-wt"));
        assert_eq!(get(&pairs, "o"), Some("json"));
        assert_eq!(get(&pairs, "s"), Some("0"));
        assert_eq!(get(&pairs, "q"), Some("cat"));
        assert_eq!(get(&pairs, "vqd"), Some("X1"));
        assert_eq!(get(&pairs, "f"), Some(",,,,,"));
        assert_eq!(get(&pairs, "p"), Some("1"));
    }

    #[test]
    fn test_image_params_safesearch_mapping() {
        let on = ImageParams::new(&SearchQuery::new("a").with_safesearch(SafeSearch::On), "v");
        let off = ImageParams::new(&SearchQuery::new("a").with_safesearch(SafeSearch::Off), "v");
        assert_eq!(get(&on.pairs(), "p"), Some("1"));
        assert_eq!(get(&off.pairs(), "p"), Some("-1"));
    }

    #[test]
    fn test_image_filter_joined() {
        let query = SearchQuery::new("cat")
            .with_timelimit(TimeLimit::Day)
            .with_filters(ImageFilters {
                size: Some(ImageSize::Large),
                image_type: Some(ImageType::Photo),
                layout: Some(ImageLayout::Wide),
                ..Default::default()
            });
        assert_eq!(
            image_filter(&query),
            "time:Day,size:Large,,type:photo,layout:Wide,"
        );
    }

    #[test]
    fn test_text_params_moderate() {
        let pairs = TextParams::new(&SearchQuery::new("cat"), "X1").pairs();
        assert_eq!(get(&pairs, "kl"), Some("wt-wt"));
        assert_eq!(get(&pairs, "l"), Some("wt-wt"));
        assert_eq!(get(&pairs, "sp"), Some("0"));
        assert_eq!(get(&pairs, "ex"), Some("-1"));
        assert_eq!(get(&pairs, "p"), None);
        assert_eq!(get(&pairs, "df"), None);
    }

    #[test]
    fn test_text_params_safesearch_exclusive() {
        let off = TextParams::new(&SearchQuery::new("a").with_safesearch(SafeSearch::Off), "v").pairs();
        assert_eq!(get(&off, "ex"), Some("-2"));
        assert_eq!(get(&off, "p"), None);

        let on = TextParams::new(&SearchQuery::new("a").with_safesearch(SafeSearch::On), "v").pairs();
        assert_eq!(get(&on, "p"), Some("1"));
        assert_eq!(get(&on, "ex"), None);
    }

    #[test]
    fn test_text_params_timelimit() {
        let query = SearchQuery::new("a").with_timelimit(TimeLimit::Month);
        let pairs = TextParams::new(&query, "v").pairs();
        assert_eq!(get(&pairs, "df"), Some("m"));
    }

    #[test]
    fn test_btreemap_params() {
        let mut map = BTreeMap::new();
        map.insert("b", "2".to_string());
        map.insert("a", "1".to_string());
        assert_eq!(map.pairs(), vec![("a", "1".to_string()), ("b", "2".to_string())]);
    }
}
