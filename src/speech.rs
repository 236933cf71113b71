use serde::Serialize;

use crate::content::sections::{Section, SectionKind};

/// Slightly slower than conversational speech, which suits classical verse.
pub const DEFAULT_RATE: f32 = 0.8;
pub const DEFAULT_LANG: &str = "zh-CN";

/// The verse lines of a poem: every quote section, in order.
pub fn reading_lines(sections: &[Section]) -> Vec<String> {
    sections
        .iter()
        .filter(|s| s.kind == SectionKind::Quote)
        .map(|s| s.text.clone())
        .collect()
}

/// What the browser speech engine needs to read a poem aloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub lang: &'static str,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn for_poem(title: &str, author: &str, lines: &[String]) -> Self {
        let mut sentences = Vec::with_capacity(lines.len() + 1);
        sentences.push(format!("{title}，{author}"));
        sentences.extend(lines.iter().cloned());

        Utterance {
            text: sentences.join("。"),
            lang: DEFAULT_LANG,
            rate: DEFAULT_RATE,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sections::parse_sections;

    #[test]
    fn only_quotes_are_read() {
        let sections = parse_sections("# 静夜思\n> 床前明月光，疑是地上霜。\n赏析文字\n> 举头望明月，低头思故乡。");
        assert_eq!(
            reading_lines(&sections),
            vec!["床前明月光，疑是地上霜。", "举头望明月，低头思故乡。"]
        );
    }

    #[test]
    fn utterance_opens_with_title_and_author() {
        let lines = vec!["床前明月光".to_string(), "疑是地上霜".to_string()];
        let utterance = Utterance::for_poem("静夜思", "李白", &lines);

        assert_eq!(utterance.text, "静夜思，李白。床前明月光。疑是地上霜");
        assert_eq!(utterance.rate, DEFAULT_RATE);
        assert_eq!(utterance.lang, "zh-CN");
    }

    #[test]
    fn utterance_without_lines_is_just_the_heading() {
        assert_eq!(Utterance::for_poem("无题", "佚名", &[]).text, "无题，佚名");
    }
}
