use serde::{Deserialize, Serialize};

use crate::content::sections::{Section, SectionKind};
use crate::favorites::FavoriteStatus;
use crate::model::{Poem, Poet};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(msg: &str, data: T) -> Self {
        ApiResponse {
            status: msg.to_owned(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub kind: SectionKind,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<&Section> for SectionView {
    fn from(section: &Section) -> Self {
        SectionView {
            kind: section.kind,
            text: section.display_text(),
            tags: section.tags(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoemSummary {
    pub poet: String,
    pub dynasty: String,
    pub slug: String,
    pub title: String,
    pub image: String,
    pub tags: Vec<String>,
    pub path: String,
}

impl PoemSummary {
    pub fn new(poet: &Poet, poem: &Poem) -> Self {
        PoemSummary {
            poet: poet.name.clone(),
            dynasty: poet.dynasty.clone(),
            slug: poem.slug.clone(),
            title: poem.title.clone(),
            image: poem.image.clone(),
            tags: poem.tags.clone(),
            path: crate::poem_path(&poet.name, &poem.slug),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoemPage {
    pub poet: String,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub dynasty: Option<String>,
    pub image: Option<String>,
    pub sections: Vec<SectionView>,
    pub favorite: Option<FavoriteStatus>,
}
