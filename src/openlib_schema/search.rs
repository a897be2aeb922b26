use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `GET /search.json`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: Option<u64>,
    pub docs:      Vec<RawBook>,
}

/// One entry of `docs`, as the catalog sends it.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBook {
    pub key:          String,
    #[serde(default)]
    pub title:        Option<String>,
    #[serde(default)]
    pub subtitle:     Option<String>,
    #[serde(default, deserialize_with = "lenient_cover_id")]
    pub cover_i:      Option<u64>,
    #[serde(default)]
    pub author_name:  Option<AuthorName>,
    #[serde(default)]
    pub subject:      Option<Subjects>,
    #[serde(default, deserialize_with = "lenient_years")]
    pub publish_year: Option<Vec<i32>>,
}

/// Anything that is not a non-negative integer is no cover.
fn lenient_cover_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|x| x.as_u64()))
}

/// Keeps the entries that are years and drops the rest.
fn lenient_years<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<i32>>, D::Error> {
    let years = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|x| x.as_i64())
            .filter_map(|x| i32::try_from(x).ok())
            .collect(),
        _ => return Ok(None),
    };
    Ok(Some(years))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorName {
    Single(String),
    Many(Vec<String>),
    /// Neither a name nor a list of names, e.g. a list with `null` in it.
    Malformed(Value),
}

impl AuthorName {
    /// Names that can be salvaged from a [AuthorName::Malformed] value.
    pub fn salvage(value: &Value) -> Vec<String> {
        match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|x| x.as_str())
                .filter(|x| !x.is_empty())
                .map(String::from)
                .collect(),
            _ => vec![],
        }
    }
}

/// `subject` is documented as a list of strings, anything else is kept
/// around as-is and treated as no subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subjects {
    List(Vec<String>),
    Malformed(Value),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn author_name_accepts_string_or_list() {
        let single: RawBook =
            serde_json::from_str(r#"{"key":"/works/OL1W","author_name":"Ursula K. Le Guin"}"#)
                .unwrap();
        assert_eq!(
            single.author_name,
            Some(AuthorName::Single("Ursula K. Le Guin".into()))
        );

        let many: RawBook = serde_json::from_str(
            r#"{"key":"/works/OL2W","author_name":["Terry Pratchett","Neil Gaiman"]}"#,
        )
        .unwrap();
        assert_eq!(
            many.author_name,
            Some(AuthorName::Many(vec![
                "Terry Pratchett".into(),
                "Neil Gaiman".into()
            ]))
        );
    }

    #[test]
    fn malformed_subject_does_not_fail_the_record() {
        let raw: RawBook =
            serde_json::from_str(r#"{"key":"/works/OL3W","subject":"Fantasy"}"#).unwrap();
        assert_eq!(
            raw.subject,
            Some(Subjects::Malformed(Value::String(
                "Fantasy".into()
            )))
        );
    }

    #[test]
    fn odd_records_do_not_fail_the_response() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"docs": [
                {"key": "/works/A", "title": "Good", "author_name": ["Ann"], "publish_year": [1990]},
                {"key": "/works/B", "author_name": 42},
                {"key": "/works/C", "author_name": ["X", null]},
                {"key": "/works/D", "publish_year": [1990, null, "1991"]},
                {"key": "/works/E", "publish_year": "1990", "cover_i": -1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.docs.len(), 5);

        let [good, number, with_null, years, scalar] = &response.docs[..] else {
            panic!("expected five records");
        };
        assert_eq!(good.author_name, Some(AuthorName::Many(vec!["Ann".into()])));
        assert_eq!(good.publish_year, Some(vec![1990]));
        assert_eq!(number.author_name, Some(AuthorName::Malformed(Value::from(42))));
        assert_eq!(
            with_null.author_name,
            Some(AuthorName::Malformed(serde_json::json!(["X", null])))
        );
        assert_eq!(years.publish_year, Some(vec![1990]));
        assert_eq!(scalar.publish_year, None);
        assert_eq!(scalar.cover_i, None);
    }

    #[test]
    fn salvage_keeps_the_string_names() {
        assert_eq!(
            AuthorName::salvage(&serde_json::json!(["X", null, "", 3, "Y"])),
            vec!["X".to_string(), "Y".to_string()]
        );
        assert!(AuthorName::salvage(&Value::from(42)).is_empty());
    }

    #[test]
    fn docs_is_required() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{"numFound":0}"#).is_err());
        let empty: SearchResponse = serde_json::from_str(r#"{"docs":[]}"#).unwrap();
        assert!(empty.docs.is_empty());
    }
}
