use unicode_segmentation::UnicodeSegmentation;

const MAX_GRAPHEMES: usize = 64;
const FORBIDDEN_CHARACTERS: [char; 10] = ['/', '(', ')', '"', '<', '>', '\\', '{', '}', ':'];

/// Which capture point produced a signup: `section` or `section:plan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTag {
    section: String,
    plan: Option<String>,
}

impl SourceTag {
    pub fn parse(section: String, plan: Option<String>) -> Result<Self, String> {
        let section = parse_segment(section, "section")?;
        let plan = match plan {
            Some(p) if !p.trim().is_empty() => Some(parse_segment(p, "plan")?),
            _ => None,
        };
        Ok(Self { section, plan })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }
}

fn parse_segment(s: String, what: &str) -> Result<String, String> {
    let s = s.trim().to_string();
    let is_empty = s.is_empty();
    let is_too_long = s.graphemes(true).count() > MAX_GRAPHEMES;
    let contains_forbidden_chars = s
        .chars()
        .any(|c| c.is_whitespace() || FORBIDDEN_CHARACTERS.contains(&c));

    if is_empty || is_too_long || contains_forbidden_chars {
        Err(format!("{s:?} is not a valid source {what}."))
    } else {
        Ok(s)
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.plan {
            Some(plan) => write!(f, "{}:{}", self.section, plan),
            None => f.write_str(&self.section),
        }
    }
}
