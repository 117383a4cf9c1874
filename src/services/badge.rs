// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SVG badge rendering.
//!
//! The badge is an SVG wrapping an XHTML card in a `<foreignObject>`. All
//! markup goes through [`Markup`], which only accepts literal tags as raw
//! text and escapes everything else.

use crate::models::{WatchedItem, WatchedKind};
use crate::services::image::LogoSource;

/// Card height without a tagline.
pub const BASE_HEIGHT: u32 = 160;

/// Card height with a tagline line.
pub const TAGLINE_HEIGHT: u32 = 190;

/// Badge width in pixels.
const WIDTH: u32 = 550;

/// Vertical padding and border eaten by the outer card.
const CARD_CHROME: u32 = 34;

/// Genres shown on the badge.
const MAX_GENRES: usize = 3;

const CARD_STYLE: &str = "background-color: #151515; border-radius: 6px; padding: 16px; \
    border: 1px solid #e4e3e2; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', \
    Roboto, Helvetica, Arial, sans-serif, 'Apple Color Emoji', 'Segoe UI Emoji'; color: #fff; \
    display: flex; align-items: center; height: ";

/// A rendered badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub svg: String,
    pub height: u32,
}

impl Badge {
    /// Badge shown when the history is empty.
    pub fn nothing_watched() -> Self {
        Self::message("Nothing watched recently.")
    }

    /// Badge carrying an upstream error as text.
    pub fn error(message: &str) -> Self {
        Self::message(&format!("Error fetching data: {}", message))
    }

    fn message(text: &str) -> Self {
        let mut m = Markup::default();
        m.raw("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"")
            .number(BASE_HEIGHT)
            .raw("\"><text x=\"10\" y=\"50\" fill=\"#888\" font-family=\"sans-serif\" font-size=\"14\">")
            .text(text)
            .raw("</text></svg>");

        Self {
            svg: m.into_string(),
            height: BASE_HEIGHT,
        }
    }
}

/// Escaping string builder.
#[derive(Debug, Default)]
struct Markup(String);

impl Markup {
    /// Append literal markup. Only `'static` strings are accepted.
    fn raw(&mut self, s: &'static str) -> &mut Self {
        self.0.push_str(s);
        self
    }

    /// Append text, escaped for element content and quoted attributes.
    fn text(&mut self, s: &str) -> &mut Self {
        for c in s.chars() {
            match c {
                '&' => self.0.push_str("&amp;"),
                '<' => self.0.push_str("&lt;"),
                '>' => self.0.push_str("&gt;"),
                '"' => self.0.push_str("&quot;"),
                '\'' => self.0.push_str("&#x27;"),
                c => self.0.push(c),
            }
        }
        self
    }

    fn number(&mut self, n: u32) -> &mut Self {
        self.0.push_str(&n.to_string());
        self
    }

    fn into_string(self) -> String {
        self.0
    }
}

/// Text lines shown on the card.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CardText {
    title: String,
    tagline: Option<String>,
    genres: String,
}

impl CardText {
    fn from_item(item: &WatchedItem) -> Self {
        let title = match item.kind {
            WatchedKind::Movie => match item.year {
                Some(year) => format!("{} ({})", item.title, year),
                None => item.title.clone(),
            },
            WatchedKind::Episode => format!(
                "{} (S{:02}E{:02})",
                item.title,
                item.season.unwrap_or(0),
                item.episode_number.unwrap_or(0)
            ),
        };

        let tagline = match item.kind {
            WatchedKind::Movie => item.tagline.clone().filter(|t| !t.is_empty()),
            WatchedKind::Episode => None,
        };

        let genres = item
            .genres
            .iter()
            .take(MAX_GENRES)
            .map(|g| title_case(g))
            .collect::<Vec<_>>()
            .join(" | ");

        Self {
            title,
            tagline,
            genres,
        }
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Turns a [`WatchedItem`] into a [`Badge`].
#[derive(Debug, Clone)]
pub struct BadgeRenderer<L> {
    logos: L,
}

impl<L: LogoSource> BadgeRenderer<L> {
    pub fn new(logos: L) -> Self {
        Self { logos }
    }

    /// Render `item`, linking the card to `profile_link`.
    pub async fn render(&self, item: Option<&WatchedItem>, profile_link: &str) -> Badge {
        let Some(item) = item else {
            return Badge::nothing_watched();
        };

        let logo = match item.logo_url.as_deref() {
            Some(reference) => self.logos.to_data_uri(reference).await,
            None => String::new(),
        };

        render_card(&CardText::from_item(item), &logo, profile_link)
    }
}

fn render_card(text: &CardText, logo: &str, profile_link: &str) -> Badge {
    let height = if text.tagline.is_some() {
        TAGLINE_HEIGHT
    } else {
        BASE_HEIGHT
    };

    let mut m = Markup::default();
    m.raw("<svg fill=\"none\" width=\"")
        .number(WIDTH)
        .raw("\" height=\"")
        .number(height)
        .raw("\" viewBox=\"0 0 ")
        .number(WIDTH)
        .raw(" ")
        .number(height)
        .raw("\" xmlns=\"http://www.w3.org/2000/svg\">\n")
        .raw("  <foreignObject width=\"100%\" height=\"100%\">\n")
        .raw("    <div xmlns=\"http://www.w3.org/1999/xhtml\" style=\"height: 100%;\">\n")
        .raw("      <a href=\"")
        .text(profile_link)
        .raw("\" style=\"text-decoration:none;\">\n")
        .raw("        <div style=\"")
        .raw(CARD_STYLE)
        .number(height - CARD_CHROME)
        .raw("px;\">\n")
        .raw("          <div style=\"flex-shrink: 0; width: 130px; text-align: center;\">\n")
        .raw("            <img src=\"")
        .text(logo)
        .raw("\" alt=\"Logo\" width=\"120\"/>\n")
        .raw("          </div>\n")
        .raw("          <div style=\"flex-grow: 1; padding-left: 12px;\">\n")
        .raw("            <p style=\"margin: 0 0 8px; font-size: 12px; color: #888; font-weight: 600;\">LATEST WATCH</p>\n")
        .raw("            <p style=\"margin: 0 0 8px; font-size: 18px; font-weight: 600;\"><strong>")
        .text(&text.title)
        .raw("</strong></p>\n");

    if let Some(tagline) = &text.tagline {
        m.raw("            <p style=\"margin: 0 0 12px; font-size: 14px; color: #a9fef7;\"><em>")
            .text(tagline)
            .raw("</em></p>\n");
    }

    m.raw("            <p style=\"margin: 0; font-size: 12px; color: #888;\">")
        .text(&text.genres)
        .raw("</p>\n")
        .raw("          </div>\n")
        .raw("        </div>\n")
        .raw("      </a>\n")
        .raw("    </div>\n")
        .raw("  </foreignObject>\n")
        .raw("</svg>\n");

    Badge {
        svg: m.into_string(),
        height,
    }
}
