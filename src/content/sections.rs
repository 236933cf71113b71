//! Line classifier for poem documents.
//!
//! Every physical line is one unit. There is no nesting, escaping or
//! paragraph joining; the shape of the hand-authored `intro.md` files is
//! all this needs to handle.

use serde::Serialize;

const TAG_MARKER: &str = "**标签：**";
const AUTHOR_MARKER: &str = "作者";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Heading1,
    Heading2,
    Heading3,
    Quote,
    Bold,
    Rule,
    TagLine,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
}

impl Section {
    pub fn new(kind: SectionKind, text: impl Into<String>) -> Self {
        Section {
            kind,
            text: text.into(),
        }
    }

    /// Text as it should be shown. Paragraphs lose their `**` markers here,
    /// not at parse time.
    pub fn display_text(&self) -> String {
        match self.kind {
            SectionKind::Paragraph => strip_emphasis(&self.text),
            _ => self.text.clone(),
        }
    }

    /// `#token` substrings of a tag line, without the leading `#`.
    pub fn tags(&self) -> Vec<String> {
        if self.kind != SectionKind::TagLine {
            return vec![];
        }

        let mut tags = Vec::new();
        let mut current: Option<String> = None;

        for c in self.text.chars() {
            if c == '#' {
                if let Some(tag) = current.take().filter(|t| !t.is_empty()) {
                    tags.push(tag);
                }
                current = Some(String::new());
            } else if c.is_whitespace() {
                if let Some(tag) = current.take().filter(|t| !t.is_empty()) {
                    tags.push(tag);
                }
            } else if let Some(tag) = current.as_mut() {
                tag.push(c);
            }
        }

        if let Some(tag) = current.filter(|t| !t.is_empty()) {
            tags.push(tag);
        }

        tags
    }
}

pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}

fn classify(line: &str) -> Section {
    if let Some(rest) = line.strip_prefix("# ") {
        Section::new(SectionKind::Heading1, rest)
    } else if let Some(rest) = line.strip_prefix("## ") {
        Section::new(SectionKind::Heading2, rest)
    } else if let Some(rest) = line.strip_prefix("### ") {
        Section::new(SectionKind::Heading3, rest)
    } else if let Some(rest) = line.strip_prefix("> ") {
        Section::new(SectionKind::Quote, rest)
    } else if line.starts_with("**") && line.ends_with("**") {
        // "**" and "***" have no inner text
        let inner = if line.len() >= 4 { &line[2..line.len() - 2] } else { "" };
        Section::new(SectionKind::Bold, inner)
    } else if line.starts_with("---") {
        Section::new(SectionKind::Rule, "")
    } else if let Some(rest) = line.strip_prefix(TAG_MARKER) {
        Section::new(SectionKind::TagLine, rest.trim())
    } else {
        Section::new(SectionKind::Paragraph, line)
    }
}

pub fn parse_sections(document: &str) -> Vec<Section> {
    document
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify)
        .collect()
}

pub fn document_title(sections: &[Section]) -> Option<&str> {
    sections
        .iter()
        .find(|s| s.kind == SectionKind::Heading1)
        .map(|s| s.text.as_str())
}

/// First paragraph mentioning the author, emphasis removed.
pub fn author_line(sections: &[Section]) -> Option<String> {
    sections
        .iter()
        .find(|s| s.kind == SectionKind::Paragraph && s.text.contains(AUTHOR_MARKER))
        .map(|s| strip_emphasis(&s.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use SectionKind::*;

    #[test]
    fn parses_headings_quotes_and_tags() {
        let doc = "# Title\n\n> line one\n> line two\n**标签：** #tag1 #tag2";
        let sections = parse_sections(doc);

        assert_eq!(
            sections,
            vec![
                Section::new(Heading1, "Title"),
                Section::new(Quote, "line one"),
                Section::new(Quote, "line two"),
                Section::new(TagLine, "#tag1 #tag2"),
            ]
        );
        assert_eq!(sections[3].tags(), vec!["tag1", "tag2"]);
    }

    #[test]
    fn inline_emphasis_stays_in_paragraph_text() {
        let sections = parse_sections("这是 **重点** 和 **另一处** 文字");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, Paragraph);
        assert_eq!(sections[0].text, "这是 **重点** 和 **另一处** 文字");
        assert_eq!(sections[0].display_text(), "这是 重点 和 另一处 文字");
    }

    #[test]
    fn classifies_every_kind_in_priority_order() {
        let doc = "\
# 静夜思
## 原文
### 注释
> 床前明月光
**赏析**
---
**标签：** #思乡 #月亮
普通段落
#不是标题";
        let kinds: Vec<SectionKind> = parse_sections(doc).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![Heading1, Heading2, Heading3, Quote, Bold, Rule, TagLine, Paragraph, Paragraph]
        );
    }

    #[test]
    fn bold_line_keeps_inner_text_and_rule_is_empty() {
        let sections = parse_sections("  **创作背景**  \n-----");
        assert_eq!(sections[0], Section::new(Bold, "创作背景"));
        assert_eq!(sections[1], Section::new(Rule, ""));
    }

    #[test]
    fn bare_tag_marker_is_bold() {
        let sections = parse_sections("**标签：**");
        assert_eq!(sections, vec![Section::new(Bold, "标签：")]);
    }

    #[test]
    fn degenerate_bold_markers_do_not_panic() {
        assert_eq!(parse_sections("**"), vec![Section::new(Bold, "")]);
        assert_eq!(parse_sections("***"), vec![Section::new(Bold, "")]);
    }

    #[test]
    fn blank_and_whitespace_lines_are_dropped() {
        let sections = parse_sections("\n   \n\t\n> 一\r\n\n> 二\n");
        assert_eq!(sections, vec![Section::new(Quote, "一"), Section::new(Quote, "二")]);
    }

    #[test]
    fn tags_split_on_adjacent_markers_and_ignore_loose_text() {
        let line = Section::new(TagLine, "前言 #唐诗#李白  #  #送别");
        assert_eq!(line.tags(), vec!["唐诗", "李白", "送别"]);
        assert!(Section::new(Paragraph, "#唐诗").tags().is_empty());
    }

    #[test]
    fn finds_title_and_author() {
        let sections = parse_sections("# 将进酒\n**作者：** 李白\n> 君不见");
        assert_eq!(document_title(&sections), Some("将进酒"));
        assert_eq!(author_line(&sections).as_deref(), Some("作者： 李白"));

        let untitled = parse_sections("> 只有诗句");
        assert_eq!(document_title(&untitled), None);
        assert_eq!(author_line(&untitled), None);
    }
}
