use chrono::NaiveDate;

use crate::content::sections::{Section, SectionKind};
use crate::favorites::FavoriteStatus;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub struct PageView<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub image: Option<&'a str>,
    pub sections: &'a [Section],
    /// `None` for signed-out visitors or when the status could not be read.
    pub favorite: Option<FavoriteStatus>,
}

fn render_section(section: &Section) -> Option<String> {
    let text = escape_html(&section.display_text());
    let html = match section.kind {
        // shown in the hero
        SectionKind::Heading1 => return None,
        SectionKind::Heading2 => format!("<h2>{text}</h2>"),
        SectionKind::Heading3 => format!("<h3>{text}</h3>"),
        SectionKind::Quote => format!("<blockquote>{text}</blockquote>"),
        SectionKind::Bold => format!("<p class=\"bold\">{text}</p>"),
        SectionKind::Rule => "<hr>".to_string(),
        SectionKind::TagLine => {
            let chips: String = section
                .tags()
                .iter()
                .map(|tag| format!("<span class=\"tag\">{}</span>", escape_html(tag)))
                .collect();
            format!("<div class=\"tags\">{chips}</div>")
        }
        SectionKind::Paragraph => format!("<p>{text}</p>"),
    };
    Some(html)
}

pub fn poem_page(view: &PageView<'_>) -> String {
    let title = escape_html(view.title);
    let mut html = String::new();

    html.push_str("<!doctype html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str("<nav><a href=\"/\">返回首页</a></nav>\n<header class=\"hero\">\n");
    if let Some(image) = view.image.filter(|i| !i.is_empty()) {
        html.push_str(&format!("<img src=\"{}\" alt=\"{title}\">\n", escape_html(image)));
    }
    html.push_str(&format!("<h1>{title}</h1>\n"));
    html.push_str(&format!(
        "<p class=\"author\">{}</p>\n",
        escape_html(&view.author.replace("**", ""))
    ));
    match view.favorite {
        Some(FavoriteStatus::Favorited) => html.push_str("<span class=\"favorite on\">已收藏</span>\n"),
        Some(FavoriteStatus::NotFavorited) => html.push_str("<span class=\"favorite\">收藏</span>\n"),
        None => {}
    }
    html.push_str("</header>\n<article>\n");

    for section in view.sections {
        if let Some(rendered) = render_section(section) {
            html.push_str(&rendered);
            html.push('\n');
        }
    }

    html.push_str("</article>\n</body>\n</html>\n");
    html
}

pub fn sitemap(base_url: &str, paths: &[(String, String)], last_modified: NaiveDate) -> String {
    let base_url = base_url.trim_end_matches('/');
    let lastmod = last_modified.format("%Y-%m-%d");
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    xml.push_str(&format!(
        "<url><loc>{}</loc><lastmod>{lastmod}</lastmod><changefreq>weekly</changefreq><priority>1.0</priority></url>\n",
        escape_html(base_url)
    ));
    for (poet, slug) in paths {
        let loc = format!("{}{}", base_url, crate::poem_path(poet, slug));
        xml.push_str(&format!(
            "<url><loc>{}</loc><lastmod>{lastmod}</lastmod><changefreq>monthly</changefreq><priority>0.8</priority></url>\n",
            escape_html(&loc)
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sections::parse_sections;

    #[test]
    fn page_escapes_text_and_skips_the_heading() {
        let sections = parse_sections("# 静夜思\n## 原文\n> 床前<明月>光\n一段 **重点** & 说明\n**标签：** #思乡 #<b>");
        let html = poem_page(&PageView {
            title: "静夜思",
            author: "**作者：** 李白",
            image: Some("/img/a.png"),
            sections: &sections,
            favorite: Some(FavoriteStatus::Favorited),
        });

        assert_eq!(html.matches("<h1>").count(), 1);
        assert!(html.contains("<h2>原文</h2>"));
        assert!(html.contains("<blockquote>床前&lt;明月&gt;光</blockquote>"));
        assert!(html.contains("<p>一段 重点 &amp; 说明</p>"));
        assert!(html.contains("<span class=\"tag\">思乡</span><span class=\"tag\">&lt;b&gt;</span>"));
        assert!(html.contains("<p class=\"author\">作者： 李白</p>"));
        assert!(html.contains("已收藏"));
        assert!(html.contains("<img src=\"/img/a.png\""));
    }

    #[test]
    fn signed_out_page_has_no_favorite_badge() {
        let html = poem_page(&PageView {
            title: "无题",
            author: "",
            image: None,
            sections: &[],
            favorite: None,
        });
        assert!(!html.contains("收藏</span>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn sitemap_encodes_poem_paths() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let xml = sitemap(
            "https://poems.example/",
            &[("李白".to_string(), "静夜思".to_string())],
            date,
        );

        assert!(xml.contains("<loc>https://poems.example</loc>"));
        assert!(xml.contains("<loc>https://poems.example/poem/%E6%9D%8E%E7%99%BD/%E9%9D%99%E5%A4%9C%E6%80%9D</loc>"));
        assert_eq!(xml.matches("<lastmod>2026-01-02</lastmod>").count(), 2);
        assert!(xml.contains("<priority>0.8</priority>"));
    }
}
