use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynasty {
    pub name: String,
    #[serde(default)]
    pub period: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poem {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poet {
    pub name: String,
    pub dynasty: String,
    #[serde(default)]
    pub dynasty_order: i32,
    #[serde(default)]
    pub life_period: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub poems: Vec<Poem>,
}

impl Poet {
    /// Order of the poet's first listed poem, used as a timeline proxy.
    pub fn first_poem_order(&self) -> i32 {
        self.poems.first().map(|p| p.order).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentIndex {
    #[serde(default)]
    pub dynasties: Vec<Dynasty>,
    #[serde(default)]
    pub poets: Vec<Poet>,
}

#[derive(Debug, Serialize)]
pub struct DynastyGroup {
    pub dynasty: Dynasty,
    pub poets: Vec<Poet>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TagAggregate {
    pub tag: String,
    pub count: i32,
}
