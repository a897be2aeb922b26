use anyhow::Result;
use crossterm::style::Stylize;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{default_colors::*, types::cover::CoverSize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    bold:   bool,
    italic: bool,
    color:  crossterm::style::Color,
}

impl StyleConfig {
    fn style(&self, s: impl ToString) -> String {
        let mut s = s.to_string().with(self.color);
        if self.bold {
            s = s.bold();
        }
        if self.italic {
            s = s.italic();
        }
        s.to_string()
    }
}

pub trait Styleable {
    fn style(&self, c: &StyleConfig) -> String;
}

impl<T> Styleable for T
where
    T: ToString + std::fmt::Display,
{
    fn style(&self, c: &StyleConfig) -> String {
        c.style(self)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color:  COLOR_WHITE,
            bold:   false,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub prefix:            String,
    pub suffix:            String,
    pub description:       String,
    pub separator:         String,
    pub style_prefix:      StyleConfig,
    pub style_suffix:      StyleConfig,
    pub style_description: StyleConfig,
    pub style_separator:   StyleConfig,
    pub style_content:     StyleConfig,
}

impl OutputConfig {
    fn head(&self) -> String {
        let prefix = self.prefix.style(&self.style_prefix);
        if self.description.is_empty() {
            return prefix;
        }
        let description = self.description.style(&self.style_description);
        format!("{prefix}{description} ")
    }

    pub fn format_str(&self, content: impl ToString) -> String {
        let head = self.head();
        let suffix = self.suffix.style(&self.style_suffix);
        let content = content.to_string().style(&self.style_content);
        format!("{head}{content}{suffix}")
    }

    pub fn format_vec(&self, content: &[impl ToString]) -> String {
        let separator = self.separator.style(&self.style_separator);
        let mut s = self.head();
        let mut i = content.iter().peekable();
        while let Some(x) = i.next() {
            s.push_str(&x.to_string().style(&self.style_content));
            if i.peek().is_some() {
                s.push_str(&separator);
            }
        }
        s.push_str(&self.suffix.style(&self.style_suffix));
        s
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix:            "".into(),
            suffix:            "".into(),
            description:       "".into(),
            separator:         ", ".into(),
            style_prefix:      StyleConfig::default(),
            style_suffix:      StyleConfig::default(),
            style_description: StyleConfig {
                italic: true,
                ..StyleConfig::default()
            },
            style_separator:   StyleConfig::default(),
            style_content:     StyleConfig::default(),
        }
    }
}

/// Which of the catalog's search parameters a query goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// `title=<name>&limit=<limit>`
    #[serde(rename = "title")]
    Title,
    /// `q=<name>`
    #[serde(rename = "q", alias = "free-text")]
    FreeText,
}

/// What to do with a response that arrives after a newer search was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseOrdering {
    /// Only the most recently issued search may update the results.
    LatestIssued,
    /// Every response is applied as it arrives.
    LastResolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub open_library_url:       String,
    pub open_library_cover_url: String,
    pub search_mode:            SearchMode,
    pub result_limit:           u32,
    pub ordering:               ResponseOrdering,
    /// Fetch covers for the web page at all.
    pub covers:                 bool,
    pub cover_size:             CoverSize,
    /// Applies to every request made to the catalog, covers included.
    pub request_timeout_secs:   u64,
    pub show_errors:            bool,
    pub port:                   u16,
    pub bind_local_ip:          bool,
    pub output_key:             OutputConfig,
    pub output_title:           OutputConfig,
    pub output_subtitle:        OutputConfig,
    pub output_author:          OutputConfig,
    pub output_subjects:        OutputConfig,
    pub output_cover:           OutputConfig,
    pub output_year:            OutputConfig,
    pub output_error:           OutputConfig,
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::raw().only(&["OPEN_LIBRARY_URL", "OPEN_LIBRARY_COVER_URL"]))
            .merge(Env::prefixed("FOLIO_"))
    }

    pub fn read_config() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_library_url:       "https://openlibrary.org".into(),
            open_library_cover_url: "https://covers.openlibrary.org".into(),
            search_mode:            SearchMode::Title,
            result_limit:           10,
            ordering:               ResponseOrdering::LatestIssued,
            covers:                 true,
            cover_size:             CoverSize::Medium,
            request_timeout_secs:   10,
            show_errors:            false,
            port:                   3000,
            bind_local_ip:          true,
            output_key:             OutputConfig {
                prefix: "(".into(),
                suffix: ")".into(),
                style_content: StyleConfig {
                    color: COLOR_DIMMED,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_title:           OutputConfig {
                style_content: StyleConfig {
                    color: COLOR_TITLE,
                    bold: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_subtitle:        OutputConfig {
                prefix: "  ".into(),
                style_content: StyleConfig {
                    color: COLOR_SUBTITLE,
                    italic: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_author:          OutputConfig {
                prefix: "  ".into(),
                description: "Written by:".into(),
                style_content: StyleConfig {
                    color: COLOR_AUTHOR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_subjects:        OutputConfig {
                prefix: "  ".into(),
                description: "Subjects:".into(),
                style_content: StyleConfig {
                    color: COLOR_SUBJECT,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_cover:           OutputConfig {
                prefix: "  ".into(),
                description: "Cover:".into(),
                style_content: StyleConfig {
                    color: COLOR_COVER,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_year:            OutputConfig {
                prefix: "  ".into(),
                description: "Last edition year of release:".into(),
                style_content: StyleConfig {
                    color: COLOR_YEAR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_error:           OutputConfig {
                description: "Error:".into(),
                style_content: StyleConfig {
                    color: COLOR_ERROR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::controller::SearchSettings;

    #[test]
    fn defaults_search_titles_with_ten_results() {
        Jail::expect_with(|_jail| {
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.open_library_url, "https://openlibrary.org");
            assert_eq!(config.search_mode, SearchMode::Title);
            assert_eq!(config.result_limit, 10);
            assert_eq!(config.ordering, ResponseOrdering::LatestIssued);
            assert!(config.covers);
            assert_eq!(config.cover_size, CoverSize::Medium);
            assert_eq!(config.request_timeout_secs, 10);
            assert!(!config.show_errors);
            Ok(())
        });
    }

    #[test]
    fn catalog_urls_come_from_the_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("OPEN_LIBRARY_URL", "http://127.0.0.1:9000");
            jail.set_env("OPEN_LIBRARY_COVER_URL", "http://127.0.0.1:9001");
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.open_library_url, "http://127.0.0.1:9000");
            assert_eq!(config.open_library_cover_url, "http://127.0.0.1:9001");
            Ok(())
        });
    }

    #[test]
    fn prefixed_environment_overrides_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                search_mode = "q"
                ordering = "last-resolved"
                result_limit = 25
                cover_size = "L"
                "#,
            )?;
            jail.set_env("FOLIO_RESULT_LIMIT", "5");
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.search_mode, SearchMode::FreeText);
            assert_eq!(config.ordering, ResponseOrdering::LastResolved);
            assert_eq!(config.result_limit, 5);
            assert_eq!(config.cover_size, CoverSize::Large);
            Ok(())
        });
    }

    #[test]
    fn covers_can_be_turned_off() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "covers = false")?;
            let config: Config = Config::figment().extract()?;
            assert!(!config.covers);
            assert_eq!(SearchSettings::from_config(&config).cover_size, None);

            jail.set_env("FOLIO_COVERS", "true");
            jail.set_env("FOLIO_COVER_SIZE", "S");
            let config: Config = Config::figment().extract()?;
            assert_eq!(
                SearchSettings::from_config(&config).cover_size,
                Some(CoverSize::Small)
            );
            Ok(())
        });
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let s = Config::default_as_string().unwrap();
        let config: Config = toml::from_str(&s).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.output_author.description, "Written by:");
    }

    #[test]
    fn output_joins_lists_with_separator() {
        let output = OutputConfig {
            prefix: "[".into(),
            suffix: "]".into(),
            ..OutputConfig::default()
        };
        let plain = output.format_vec(&["a", "b"]);
        assert!(plain.contains('a') && plain.contains('b'));
        assert!(plain.contains(", "));
        assert!(plain.contains('['));
    }
}
