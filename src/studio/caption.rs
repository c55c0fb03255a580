use crate::foundation::error::{AdreelError, AdreelResult};

/// Social caption with hashtags.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Caption {
    /// Caption text without hashtags.
    pub caption: String,
    /// Hashtags, each starting with `#`.
    pub hashtags: Vec<String>,
}

impl Caption {
    /// Parse generated caption text.
    ///
    /// Accepts a JSON object `{"caption": .., "hashtags": [..]}`, the labelled
    /// `CAPTION:`/`HASHTAGS:` form, or free text where `#words` are collected as hashtags.
    pub fn parse(text: &str) -> AdreelResult<Self> {
        let text = strip_code_fence(text.trim());
        if let Ok(c) = serde_json::from_str::<Caption>(text) {
            return Self::new(c.caption, c.hashtags);
        }

        let mut caption = Vec::new();
        let mut tags = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(rest) = strip_label(line, "hashtags:") {
                tags.extend(rest.split([' ', ',']).map(str::to_string));
            } else if let Some(rest) = strip_label(line, "caption:") {
                caption.push(rest.to_string());
            } else {
                let (words, hashes): (Vec<&str>, Vec<&str>) =
                    line.split_whitespace().partition(|w| !w.starts_with('#'));
                tags.extend(hashes.into_iter().map(str::to_string));
                if !words.is_empty() {
                    caption.push(words.join(" "));
                }
            }
        }
        Self::new(caption.join(" "), tags)
    }

    fn new(caption: String, hashtags: Vec<String>) -> AdreelResult<Self> {
        let caption = caption.trim().to_string();
        if caption.is_empty() {
            return Err(AdreelError::validation("generated caption is empty"));
        }
        let mut out: Vec<String> = Vec::new();
        for tag in hashtags {
            let Some(tag) = normalize_hashtag(&tag) else {
                continue;
            };
            if !out.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                out.push(tag);
            }
        }
        Ok(Self {
            caption,
            hashtags: out,
        })
    }

    /// Plain-text file body: caption, blank line, hashtags on one line.
    pub fn to_text_file(&self) -> String {
        if self.hashtags.is_empty() {
            return format!("{}\n", self.caption);
        }
        format!("{}\n\n{}\n", self.caption, self.hashtags.join(" "))
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let line = line.trim_start_matches(['*', '-', ' ']);
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label)
        .then(|| line[label.len()..].trim_start_matches('*').trim())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((lang, rest)) if !lang.contains(' ') => rest.trim(),
        _ => inner.trim(),
    }
}

fn normalize_hashtag(raw: &str) -> Option<String> {
    let body: String = raw
        .trim()
        .trim_start_matches('#')
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!body.is_empty()).then(|| format!("#{body}"))
}

#[cfg(test)]
#[path = "../../tests/unit/studio/caption.rs"]
mod tests;
