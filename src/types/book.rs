use std::fmt::Write;

use anyhow::Result;
use tracing::debug;

use crate::{
    config::Config,
    openlib_schema::search::{AuthorName, RawBook, Subjects},
    traits::{Catalog, DisplayTerminal},
    types::cover::{CoverHandle, CoverSize, CoverStore},
};

pub const NO_TITLE: &str = "No title available";
pub const NO_SUBTITLE: &str = "No subtitle available";
pub const NO_AUTHOR: &str = "No author available";

/// Separator between author names, matching what the catalog's own
/// frontend shows.
pub const AUTHOR_SEPARATOR: &str = ",";

/// A search result, normalized for display.
///
/// Raw fields are fixed at construction; [Book::author], [Book::subjects] and
/// [Book::last_published_year] derive their values on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub key:       String,
    pub title:     String,
    pub subtitle:  String,
    pub cover_id:  Option<u64>,
    author:        AuthorName,
    subjects:      Vec<String>,
    publish_years: Vec<i32>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|x| !x.is_empty())
}

impl From<RawBook> for Book {
    fn from(raw: RawBook) -> Self {
        let author = match raw.author_name {
            Some(AuthorName::Single(name)) if !name.is_empty() => AuthorName::Single(name),
            Some(AuthorName::Many(names)) if !names.is_empty() => AuthorName::Many(names),
            Some(AuthorName::Malformed(value)) => match AuthorName::salvage(&value) {
                names if names.is_empty() => AuthorName::Single(NO_AUTHOR.into()),
                names => AuthorName::Many(names),
            },
            _ => AuthorName::Single(NO_AUTHOR.into()),
        };
        let subjects = match raw.subject {
            Some(Subjects::List(subjects)) => subjects,
            _ => vec![],
        };
        Self {
            key: raw.key,
            title: non_empty(raw.title).unwrap_or_else(|| NO_TITLE.into()),
            subtitle: non_empty(raw.subtitle).unwrap_or_else(|| NO_SUBTITLE.into()),
            cover_id: raw.cover_i,
            author,
            subjects,
            publish_years: raw.publish_year.unwrap_or_default(),
        }
    }
}

impl Book {
    /// One book per record, in the order the catalog returned them.
    pub fn from_records(records: Vec<RawBook>) -> Vec<Self> {
        records.into_iter().map(Self::from).collect()
    }

    pub fn author(&self) -> String {
        match &self.author {
            AuthorName::Single(name) => name.clone(),
            AuthorName::Many(names) => names.join(AUTHOR_SEPARATOR),
            AuthorName::Malformed(_) => NO_AUTHOR.into(),
        }
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Most recent year any edition was published in, `None` when the
    /// catalog knows of no edition years.
    pub fn last_published_year(&self) -> Option<i32> {
        self.publish_years.iter().copied().max()
    }

    /// Fetch the cover through `catalog` and register it in `store`.
    ///
    /// Books without a cover id and failed fetches both give `None`.
    pub async fn find_cover<C: Catalog>(
        &self,
        catalog: &C,
        size: CoverSize,
        store: &CoverStore,
    ) -> Option<CoverHandle> {
        let cover_id = self.cover_id?;
        match catalog.cover(cover_id, size).await {
            Ok(image) => store.register(image),
            Err(e) => {
                debug!("No cover for {} ({cover_id}-{size}): {e:#}", self.key);
                None
            }
        }
    }
}

impl DisplayTerminal for Book {
    fn fmt(&self, f: &mut String, config: &Config) -> Result<()> {
        writeln!(
            f,
            "{} {}",
            config.output_title.format_str(&self.title),
            config.output_key.format_str(&self.key)
        )?;
        writeln!(f, "{}", config.output_subtitle.format_str(&self.subtitle))?;
        writeln!(f, "{}", config.output_author.format_str(self.author()))?;
        if !self.subjects.is_empty() {
            writeln!(f, "{}", config.output_subjects.format_vec(self.subjects.as_slice()))?;
        }
        if let Some(cover_id) = self.cover_id {
            writeln!(f, "{}", config.output_cover.format_str(cover_id))?;
        }
        let year = match self.last_published_year() {
            Some(year) => year.to_string(),
            None => "unknown".into(),
        };
        write!(f, "{}", config.output_year.format_str(year))?;
        Ok(())
    }
}
