//! The slice of the Docs `documents.get` response that carries text.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Document {
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Debug, Default, Deserialize)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
struct StructuralElement {
    paragraph: Option<Paragraph>,
}

#[derive(Debug, Deserialize)]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    #[serde(default)]
    content: String,
}

impl Document {
    /// Concatenated text runs of all top-level paragraphs, in order.
    ///
    /// Tables, tables of contents, and section breaks contribute nothing.
    pub(crate) fn plain_text(&self) -> String {
        self.body
            .iter()
            .flat_map(|b| &b.content)
            .filter_map(|el| el.paragraph.as_ref())
            .flat_map(|p| &p.elements)
            .filter_map(|el| el.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }
}
