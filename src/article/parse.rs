use reqwest::Url;

use super::types::Article;
use crate::error::{ToolError, ToolResult};

/// Wrap width for the plain-text rendering of the article body.
const TEXT_WIDTH: usize = 120;

/// Run the readability pass over raw markup and reduce it to an [`Article`].
///
/// `url` is the document base, so relative links in the kept markup resolve
/// against the page they came from.
pub fn parse_article(markup: &str, url: &Url) -> ToolResult<Article> {
    let mut input = markup.as_bytes();
    let product = readability::extractor::extract(&mut input, url)
        .map_err(|_| ToolError::ExtractionEmpty)?;

    if product.text.trim().is_empty() {
        return Err(ToolError::ExtractionEmpty);
    }

    // html2text keeps paragraph breaks that the raw text node walk loses.
    let content = html2text::from_read(product.content.as_bytes(), TEXT_WIDTH)
        .ok()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(product.text);

    Ok(Article {
        title: product.title.trim().to_string(),
        content,
        html: product.content,
    })
}
