//! Read-only catalog of post topics.
//!
//! Topics are static: the built-in catalog is constructed once per process
//! and never mutated. Alternative catalogs can be read from the JSON catalog
//! format (`{"<id>": {"name", "thumbId", "thumbPath", "public"}}`).

use std::{cmp::Ordering, collections::BTreeMap, path::Path, sync::LazyLock};

use serde::{Deserialize, Serialize};

/// Display name returned for ids that are not in the catalog.
pub const FALLBACK_TOPIC_NAME: &str = "Other";

/// A topic posts can be classified under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Stable identifier, e.g. `programming`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Asset id of the thumbnail image.
    pub thumb_id: String,
    /// Public id (path) of the thumbnail image.
    pub thumb_path: String,
    /// Whether posts under this topic are published publicly.
    pub public: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicEntry {
    name: String,
    #[serde(default)]
    thumb_id: String,
    #[serde(default)]
    thumb_path: String,
    #[serde(default)]
    public: bool,
}

/// Error returned when a topic catalog cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum TopicCatalogError {
    /// The catalog file could not be read.
    #[error("failed to read topic catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The catalog is not valid JSON in the expected shape.
    #[error("failed to parse topic catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The topic lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCatalog {
    /// Sorted by display name.
    topics: Vec<Topic>,
}

static BUILTIN: LazyLock<TopicCatalog> = LazyLock::new(|| {
    TopicCatalog::new(BUILTIN_TOPICS.iter().map(|&(id, name, thumb_id, thumb_path, public)| Topic {
        id: id.to_string(),
        name: name.to_string(),
        thumb_id: thumb_id.to_string(),
        thumb_path: thumb_path.to_string(),
        public,
    }))
});

impl TopicCatalog {
    /// Build a catalog from an arbitrary set of topics.
    #[must_use]
    pub fn new(topics: impl IntoIterator<Item = Topic>) -> Self {
        let mut topics: Vec<_> = topics.into_iter().collect();
        topics.sort_by(|a, b| collate(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
        Self { topics }
    }

    /// The catalog shipped with the application.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an entry has no name.
    pub fn from_json(json: &str) -> Result<Self, TopicCatalogError> {
        let entries: BTreeMap<String, TopicEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries.into_iter().map(|(id, entry)| Topic {
            id,
            name: entry.name,
            thumb_id: entry.thumb_id,
            thumb_path: entry.thumb_path,
            public: entry.public,
        })))
    }

    /// Read a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TopicCatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Every topic, sorted by display name.
    #[must_use]
    pub fn list_all(&self) -> &[Topic] {
        &self.topics
    }

    /// Public topics, sorted by display name.
    pub fn list_public(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|topic| topic.public)
    }

    /// Private topics, sorted by display name.
    pub fn list_private(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|topic| !topic.public)
    }

    /// Look up a topic by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    /// Whether the catalog knows the given id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display name for a topic id, or [`FALLBACK_TOPIC_NAME`] if unknown.
    #[must_use]
    pub fn name_of(&self, id: &str) -> &str {
        self.get(id).map_or(FALLBACK_TOPIC_NAME, |topic| topic.name.as_str())
    }
}

/// Case-insensitive ordering with a case-sensitive tiebreak.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// (id, name, thumb id, thumb path, public)
const BUILTIN_TOPICS: &[(&str, &str, &str, &str, bool)] = &[
    (
        "lifestyle",
        "Lifestyle",
        "c25decb56feccf32b56f3bbce1d0649e",
        "fivemin-prod/topic-thumb/d6kqr2vxy7siuchz3ugj",
        false,
    ),
    (
        "food-and-cooking",
        "Food and Cooking",
        "a38d1f899a322069b57f93a3a2aa1a0b",
        "fivemin-prod/topic-thumb/ufafc9pcz80k9obim4ly",
        false,
    ),
    (
        "technology",
        "Technology",
        "d7032d16343fe1a6330db626bf5feeaf",
        "fivemin-prod/topic-thumb/n6rztxn2ujb5b1ccwhbn",
        true,
    ),
    (
        "finance",
        "Finance",
        "b386564e5f7bb336c6cda43377f8f21d",
        "fivemin-prod/topic-thumb/ewjibbyowrykv0zjuqq7",
        true,
    ),
    (
        "parenting",
        "Parenting",
        "122e62251f9fb3d3e90091a47af983a8",
        "fivemin-prod/topic-thumb/xkn9wwkwgpdybn0ynqds",
        false,
    ),
    (
        "sports",
        "Sports",
        "4710819168f02f59326504082b132ba7",
        "fivemin-prod/topic-thumb/cheancimace34cd4jmib",
        false,
    ),
    (
        "beauty-and-skincare",
        "Beauty and Skincare",
        "391d0fbf180c1864e125ae2de2056f49",
        "fivemin-prod/topic-thumb/vpfyyuihzwn1xsrcmu9x",
        false,
    ),
    (
        "home-improvement",
        "Home Improvement",
        "545a8568b81b52b21d323e54139f060a",
        "fivemin-prod/topic-thumb/cxcp7mxut7g9qqdemxpp",
        false,
    ),
    (
        "education",
        "Education",
        "ea4a1994e29888ee339a83ba875b2498",
        "fivemin-prod/topic-thumb/ezuokyiqie8apwdpunli",
        false,
    ),
    (
        "entertainment",
        "Entertainment",
        "5455004f1dc1f498d5a4c8ee9f00ecf9",
        "fivemin-prod/topic-thumb/vubqex8sbphmqhgxyeb3",
        false,
    ),
    (
        "business",
        "Business",
        "62180034fffab4bd0b9e2e11c0418876",
        "fivemin-prod/topic-thumb/nxzh4ihpddkqm0nputm4",
        true,
    ),
    (
        "travel",
        "Travel",
        "9406a84d081a8e72bfba2451c6900872",
        "fivemin-prod/topic-thumb/rjpwglx0iavcdhukkhuy",
        false,
    ),
    (
        "health",
        "Health",
        "7124b21e721cc4477af37edd67ac2549",
        "fivemin-prod/topic-thumb/cdagmwqtctswknvqzkxu",
        false,
    ),
    (
        "social",
        "Social",
        "9fb66dab59f3e0ff79ca57f3c7e1fbd1",
        "fivemin-prod/topic-thumb/ti3kpjhcd155t4h5toom",
        false,
    ),
    (
        "relationships",
        "Relationships",
        "36dc7b9c0f4aaf4f56dd0165b7859d16",
        "fivemin-prod/topic-thumb/zcdz5monp2zqeipuqzdu",
        false,
    ),
    (
        "science",
        "Science",
        "f41cd486d292306f036ab3b54cb9749d",
        "fivemin-prod/topic-thumb/xtcbet9ywsfif7uiiayu",
        true,
    ),
    (
        "programming",
        "Programming",
        "e7b77657550f169f0a6d6f679283b222",
        "fivemin-prod/topic-thumb/zmlt6ft5tyivzcfeejci",
        true,
    ),
];

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, io::Write};

    use super::*;

    #[test]
    fn builtin_is_sorted_by_name() {
        let names: Vec<_> = TopicCatalog::builtin()
            .list_all()
            .iter()
            .map(|t| t.name.as_str())
            .collect();

        assert_eq!(names.len(), 17);
        assert!(names.windows(2).all(|w| collate(w[0], w[1]) != Ordering::Greater));
        assert_eq!(names.first(), Some(&"Beauty and Skincare"));
        assert_eq!(names.last(), Some(&"Travel"));
    }

    #[test]
    fn public_and_private_partition_the_catalog() {
        let catalog = TopicCatalog::builtin();
        let public: BTreeSet<_> = catalog.list_public().map(|t| t.id.as_str()).collect();
        let private: BTreeSet<_> = catalog.list_private().map(|t| t.id.as_str()).collect();
        let all: BTreeSet<_> = catalog.list_all().iter().map(|t| t.id.as_str()).collect();

        assert!(public.is_disjoint(&private));
        assert_eq!(&public | &private, all);
        assert_eq!(
            public,
            BTreeSet::from(["business", "finance", "programming", "science", "technology"])
        );
    }

    #[test]
    fn filtered_lists_keep_name_order() {
        let names: Vec<_> = TopicCatalog::builtin()
            .list_public()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Business", "Finance", "Programming", "Science", "Technology"]
        );
    }

    #[test]
    fn name_of_falls_back_for_unknown_ids() {
        let catalog = TopicCatalog::builtin();
        assert_eq!(catalog.name_of("food-and-cooking"), "Food and Cooking");
        assert_eq!(catalog.name_of("astrology"), FALLBACK_TOPIC_NAME);
        assert_eq!(catalog.name_of(""), FALLBACK_TOPIC_NAME);
        assert!(!catalog.contains("astrology"));
    }

    #[test]
    fn sort_ignores_case() {
        let catalog = TopicCatalog::from_json(
            r#"{
                "b": {"name": "banana", "public": true},
                "a": {"name": "Apple"},
                "c": {"name": "cherry"}
            }"#,
        )
        .unwrap();

        let names: Vec<_> = catalog.list_all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Apple", "banana", "cherry"]);
        assert!(catalog.get("b").unwrap().public);
        assert!(!catalog.get("a").unwrap().public);
    }

    #[test]
    fn load_reads_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"rust": {"name": "Rust", "thumbPath": "thumbs/rust", "public": true}}"#)
            .unwrap();

        let catalog = TopicCatalog::load(file.path()).unwrap();
        let topic = catalog.get("rust").unwrap();
        assert_eq!(topic.thumb_path, "thumbs/rust");
        assert_eq!(topic.id, "rust");
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let error = TopicCatalog::from_json(r#"{"x": {"public": true}}"#).unwrap_err();
        assert!(matches!(error, TopicCatalogError::Parse(_)));
    }
}
