//! Server-rendered HTML for the search screen.

use crate::{
    config::Config,
    controller::RenderState,
    types::{book::Book, cover::CoverHandle},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_errors: bool,
}

impl ViewOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            show_errors: config.show_errors,
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; }
main { max-width: 72rem; margin: 0 auto; padding: 1.5rem; display: flex; flex-direction: column; align-items: center; gap: 0.5rem; }
form { width: 100%; display: flex; justify-content: center; gap: 1rem; }
input { flex: 1; padding: 0.5rem; }
#books-results { margin-top: 1rem; display: grid; grid-template-columns: repeat(3, 1fr); gap: 0.5rem; width: 100%; }
.card { border: 1px solid #e2e8f0; border-radius: 0.5rem; padding: 1rem; display: flex; flex-direction: column; justify-content: space-between; box-shadow: 0 1px 2px rgba(0,0,0,0.05); }
.card img { max-width: 100%; }
.subjects { display: flex; flex-wrap: wrap; gap: 0.5rem; }
.subject { background: #f8fafc; border-radius: 9999px; padding: 0.25rem 0.5rem; font-size: 0.75rem; color: #6b7280; }
.year { margin-top: 0.75rem; font-size: 0.75rem; color: #6b7280; }
.error { color: #b91c1c; }
"#;

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_page(state: &RenderState, options: &ViewOptions) -> String {
    let mut html = String::from("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    if state.loading {
        html.push_str("<meta http-equiv=\"refresh\" content=\"1\">\n");
    }
    html.push_str("<title>folio</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main>\n");

    html.push_str(&render_form(&state.query));
    if state.loading {
        html.push_str("<p class=\"loading\">Searching…</p>\n");
    }
    if options.show_errors && !state.error.is_empty() {
        html.push_str(&format!("<p class=\"error\">{}</p>\n", escape(&state.error)));
    }

    html.push_str("<section id=\"books-results\">\n");
    for book in &state.results {
        html.push_str(&render_card(book, state.cover_for(book)));
    }
    html.push_str("</section>\n</main>\n</body>\n</html>\n");
    html
}

pub fn render_form(query: &str) -> String {
    format!(
        concat!(
            "<form method=\"post\" action=\"/search\">\n",
            "<input name=\"q\" placeholder=\"Search for a book\" value=\"{}\">\n",
            "<button type=\"submit\">Search</button>\n",
            "</form>\n"
        ),
        escape(query)
    )
}

pub fn render_card(book: &Book, cover: Option<&CoverHandle>) -> String {
    let mut html = format!("<article class=\"card\" data-key=\"{}\">\n", escape(&book.key));
    html.push_str(&format!("<h2>{}</h2>\n", escape(&book.title)));
    html.push_str(&format!("<p class=\"subtitle\">{}</p>\n", escape(&book.subtitle)));
    html.push_str(&format!("<p class=\"author\">{}</p>\n", escape(&book.author())));
    if let Some(cover) = cover {
        html.push_str(&render_cover(book, cover));
    }
    html.push_str("<div class=\"subjects\">");
    for subject in book.subjects() {
        html.push_str(&render_subject(subject));
    }
    html.push_str("</div>\n");
    let year = match book.last_published_year() {
        Some(year) => year.to_string(),
        None => "unknown".into(),
    };
    html.push_str(&format!(
        "<p class=\"year\">Last edition year of release: {year}</p>\n"
    ));
    // No detail view exists yet.
    html.push_str("<button type=\"button\">See More.</button>\n</article>\n");
    html
}

pub fn render_cover(book: &Book, cover: &CoverHandle) -> String {
    format!(
        "<img class=\"cover\" src=\"{}\" alt=\"Cover of {}\">\n",
        cover.url(),
        escape(&book.title)
    )
}

pub fn render_subject(subject: &str) -> String {
    format!("<span class=\"subject\">{}</span>", escape(subject))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        openlib_schema::search::{AuthorName, RawBook, Subjects},
        types::cover::{CoverImage, CoverStore},
    };

    fn book(key: &str, title: &str) -> Book {
        Book::from(RawBook {
            key: key.into(),
            title: Some(title.into()),
            author_name: Some(AuthorName::Single("Mary Shelley".into())),
            subject: Some(Subjects::List(vec!["Horror".into(), "Gothic".into()])),
            publish_year: Some(vec![1818, 1831]),
            ..RawBook::default()
        })
    }

    #[test]
    fn card_shows_book_fields() {
        let card = render_card(&book("/works/OL1W", "Frankenstein"), None);
        assert!(card.contains("<h2>Frankenstein</h2>"));
        assert!(card.contains("No subtitle available"));
        assert!(card.contains("Mary Shelley"));
        assert!(card.contains("<span class=\"subject\">Horror</span>"));
        assert!(card.contains("<span class=\"subject\">Gothic</span>"));
        assert!(card.contains("Last edition year of release: 1831"));
        assert!(card.contains("See More."));
        assert!(!card.contains("<img"));
    }

    #[test]
    fn card_without_years_says_unknown() {
        let book = Book::from(RawBook {
            key: "/works/OL2W".into(),
            ..RawBook::default()
        });
        assert!(render_card(&book, None).contains("Last edition year of release: unknown"));
    }

    #[test]
    fn card_links_cover_handle() {
        let store = CoverStore::new();
        let handle = store.register(CoverImage::default()).unwrap();
        let card = render_card(&book("/works/OL1W", "Frankenstein"), Some(&handle));
        assert!(card.contains(&format!("src=\"/covers/{}\"", handle.id())));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(
            render_subject("<script>&\"'"),
            "<span class=\"subject\">&lt;script&gt;&amp;&quot;&#39;</span>"
        );
        assert!(render_form("a \"quoted\" title").contains("value=\"a &quot;quoted&quot; title\""));
    }

    #[test]
    fn page_renders_cards_in_result_order() {
        let state = RenderState {
            query: "f".into(),
            results: vec![book("/works/OL1W", "First"), book("/works/OL2W", "Second")],
            ..RenderState::default()
        };
        let page = render_page(&state, &ViewOptions::default());
        let first = page.find("First").unwrap();
        let second = page.find("Second").unwrap();
        assert!(first < second);
        assert_eq!(page.matches("class=\"card\"").count(), 2);
        assert!(page.contains("value=\"f\""));
        assert!(!page.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn error_is_hidden_unless_configured() {
        let state = RenderState {
            error: "Request to http://catalog/search.json failed".into(),
            ..RenderState::default()
        };
        let hidden = render_page(&state, &ViewOptions::default());
        assert!(!hidden.contains("failed"));
        let shown = render_page(&state, &ViewOptions { show_errors: true });
        assert!(shown.contains("<p class=\"error\">Request to http://catalog/search.json failed</p>"));
    }

    #[test]
    fn loading_page_refreshes() {
        let state = RenderState {
            loading: true,
            ..RenderState::default()
        };
        let page = render_page(&state, &ViewOptions::default());
        assert!(page.contains("http-equiv=\"refresh\""));
        assert!(page.contains("Searching"));
    }
}
