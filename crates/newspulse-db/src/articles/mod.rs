//! Article read models: filter composition and parameterized queries.

mod filter;
mod read;
mod types;

pub use filter::{compose, ArticleFilter, InvalidFilter, OrderBy, Predicate};
pub use read::{count_articles, find_articles, get_articles_by_ids, list_article_ids, Page};
pub use types::ArticleRow;
