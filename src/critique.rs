//! Parsing of the external text critic's reply.
//!
//! The language model comparing the standard and dialect transcripts is asked
//! to answer as
//!
//! ```text
//! 関西弁レベル: 75
//! 分析: 語尾の「〜やん」が自然です。
//! ```
//!
//! Only the reply format lives here; the model call belongs to the caller.

pub const LEVEL_LABEL: &str = "関西弁レベル";
pub const ANALYSIS_LABEL: &str = "分析";
pub const ANALYSIS_FALLBACK: &str = "分析結果を取得できませんでした。";
const SECTION_BREAK: &str = "---";
const LABEL_SEPARATORS: [char; 2] = [':', '：'];
const MAX_LEVEL: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCritique {
    /// Text-similarity score, 0–100
    pub level: u8,
    pub analysis: String,
}

impl TextCritique {
    pub fn parse(reply: &str) -> Self {
        let level = after_label(reply, LEVEL_LABEL)
            .and_then(|rest| leading_number(rest.trim_start()))
            .unwrap_or(0);
        let analysis = after_label(reply, ANALYSIS_LABEL)
            .map(|rest| {
                let body = rest.split(SECTION_BREAK).next().unwrap_or_default();
                body.trim().to_string()
            })
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| ANALYSIS_FALLBACK.to_string());
        Self { level, analysis }
    }
}

/// Text following the first `label` that is immediately followed by a separator.
fn after_label<'a>(reply: &'a str, label: &str) -> Option<&'a str> {
    reply.match_indices(label).find_map(|(idx, _)| {
        let rest = &reply[idx + label.len()..];
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if LABEL_SEPARATORS.contains(&c) => Some(chars.as_str()),
            _ => None,
        }
    })
}

fn leading_number(text: &str) -> Option<u8> {
    let digits: Vec<u32> = text.chars().map_while(|c| c.to_digit(10)).collect();
    if digits.is_empty() {
        return None;
    }
    let value = digits
        .iter()
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(*d));
    Some(value.min(MAX_LEVEL as u32) as u8)
}
