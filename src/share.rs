use serde::Serialize;

/// Everything the browser needs to lay out and rasterize a share image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareCard {
    pub title: String,
    pub author: String,
    pub dynasty: String,
    pub lines: Vec<String>,
    pub tags: Vec<String>,
    pub file_name: String,
    pub share_text: String,
}

impl ShareCard {
    pub fn new(title: &str, author: &str, dynasty: &str, lines: Vec<String>, tags: Vec<String>) -> Self {
        ShareCard {
            title: title.to_string(),
            author: author.to_string(),
            dynasty: dynasty.to_string(),
            lines,
            tags,
            file_name: format!("{title}-{author}.png"),
            share_text: format!("{title}是{author}的经典诗词"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_the_image_after_title_and_author() {
        let card = ShareCard::new("静夜思", "李白", "唐", vec!["床前明月光".into()], vec!["思乡".into()]);
        assert_eq!(card.file_name, "静夜思-李白.png");
        assert_eq!(card.share_text, "静夜思是李白的经典诗词");
        assert_eq!(card.lines.len(), 1);
    }
}
