//! Content Module
//!
//! Read-only poetry content loaded once at startup. The tree on disk looks like:
//!
//! ```text
//! content/
//!   index.json            dynasties and poets, each poet listing its poems
//!   <poet>/<slug>/intro.md
//! ```
//!
//! A poem listed in `index.json` without an `intro.md` is only discovered when
//! the document is requested, and then surfaces as not found.

pub mod sections;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::{ContentIndex, DynastyGroup, Poem, Poet, TagAggregate};

const INDEX_FILE: &str = "index.json";
const DOCUMENT_FILE: &str = "intro.md";

#[derive(Debug)]
pub struct ContentTree {
    root: PathBuf,
    index: ContentIndex,
}

/// Rejects anything that could step outside the content root.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && !segment.contains("..")
        && !segment.contains(['/', '\\', '\0'])
}

impl ContentTree {
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let index_path = root.join(INDEX_FILE);
        let raw = fs::read_to_string(&index_path)
            .with_context(|| format!("failed to read content index {:?}", index_path))?;
        let index: ContentIndex = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse content index {:?}", index_path))?;

        tracing::info!(
            root = ?root,
            dynasties = index.dynasties.len(),
            poets = index.poets.len(),
            "content index loaded"
        );

        Ok(ContentTree { root, index })
    }

    pub fn from_index(root: impl AsRef<Path>, index: ContentIndex) -> Self {
        ContentTree {
            root: root.as_ref().to_path_buf(),
            index,
        }
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    /// Reads the document body for a poem. `Ok(None)` means there is no such
    /// document.
    pub fn document(&self, poet: &str, slug: &str) -> Result<Option<String>> {
        if !is_safe_segment(poet) || !is_safe_segment(slug) {
            tracing::warn!(poet, slug, "rejected unsafe content path");
            return Ok(None);
        }

        let path = self.root.join(poet).join(slug).join(DOCUMENT_FILE);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read document {:?}", path)),
        }
    }

    pub fn find_poet(&self, poet: &str) -> Option<&Poet> {
        self.index.poets.iter().find(|p| p.name == poet)
    }

    pub fn find_poem(&self, poet: &str, slug: &str) -> Option<(&Poet, &Poem)> {
        let poet = self.find_poet(poet)?;
        let poem = poet.poems.iter().find(|p| p.slug == slug)?;
        Some((poet, poem))
    }

    pub fn timeline(&self) -> Vec<DynastyGroup> {
        let mut dynasties = self.index.dynasties.clone();
        dynasties.sort_by_key(|d| d.order);

        dynasties
            .into_iter()
            .map(|dynasty| {
                let mut poets: Vec<Poet> = self
                    .index
                    .poets
                    .iter()
                    .filter(|p| p.dynasty == dynasty.name)
                    .cloned()
                    .collect();
                poets.sort_by_key(|p| p.first_poem_order());
                for poet in poets.iter_mut() {
                    poet.poems.sort_by_key(|p| p.order);
                }
                DynastyGroup { dynasty, poets }
            })
            .collect()
    }

    /// Case-insensitive match of `query` on title, poet name or any tag,
    /// intersected with an exact `tag` filter. Empty filters match everything.
    pub fn search(&self, query: Option<&str>, tag: Option<&str>) -> Vec<(&Poet, &Poem)> {
        let query = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
        let tag = tag.map(str::trim).filter(|t| !t.is_empty());

        self.index
            .poets
            .iter()
            .flat_map(|poet| poet.poems.iter().map(move |poem| (poet, poem)))
            .filter(|(poet, poem)| {
                let matches_query = match &query {
                    None => true,
                    Some(q) => {
                        poem.title.to_lowercase().contains(q.as_str())
                            || poet.name.to_lowercase().contains(q.as_str())
                            || poem.tags.iter().any(|t| t.to_lowercase().contains(q.as_str()))
                    }
                };
                let matches_tag = tag.map_or(true, |t| poem.tags.iter().any(|pt| pt == t));
                matches_query && matches_tag
            })
            .collect()
    }

    pub fn tag_counts(&self) -> Vec<TagAggregate> {
        let mut counts: BTreeMap<&str, i32> = BTreeMap::new();
        for poem in self.index.poets.iter().flat_map(|p| p.poems.iter()) {
            for tag in &poem.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .map(|(tag, count)| TagAggregate {
                tag: tag.to_string(),
                count,
            })
            .collect()
    }

    /// Every `<poet>/<slug>` directory present on disk, sorted.
    pub fn poem_paths(&self) -> Result<Vec<(String, String)>> {
        let mut paths = Vec::new();

        let poets = fs::read_dir(&self.root)
            .with_context(|| format!("failed to list content root {:?}", self.root))?;
        for poet in poets {
            let poet = poet?;
            if !poet.file_type()?.is_dir() {
                continue;
            }
            let poet_name = poet.file_name().to_string_lossy().into_owned();

            for poem in fs::read_dir(poet.path())? {
                let poem = poem?;
                if poem.file_type()?.is_dir() {
                    paths.push((poet_name.clone(), poem.file_name().to_string_lossy().into_owned()));
                }
            }
        }

        paths.sort();
        Ok(paths)
    }
}
