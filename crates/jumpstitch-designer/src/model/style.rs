use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Inline CSS declarations (`key:value;...`) in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| {
                let (key, value) = decl.split_once(':')?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { declarations }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.declarations.push((key.to_string(), value)),
        }
    }

    /// Stroke paint, `None` when absent or `none`.
    pub fn stroke(&self) -> Option<String> {
        paint(self.get("stroke"))
    }

    /// Fill paint; SVG paints shapes black when no fill is given.
    pub fn fill(&self) -> Option<String> {
        match self.get("fill") {
            None => Some("#000000".to_string()),
            value => paint(value),
        }
    }
}

fn paint(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_lowercase())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.declarations {
            write!(f, "{}:{};", key, value)?;
        }
        Ok(())
    }
}

impl From<&str> for Style {
    fn from(s: &str) -> Self {
        Style::parse(s)
    }
}

impl Serialize for Style {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Style::parse(&String::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let style = Style::parse("stroke: #FF0000; fill:none;stroke-width:1px");
        assert_eq!(style.get("stroke-width"), Some("1px"));
        assert_eq!(style.stroke().as_deref(), Some("#ff0000"));
        assert_eq!(style.fill(), None);
        assert_eq!(style.to_string(), "stroke:#FF0000;fill:none;stroke-width:1px;");
    }

    #[test]
    fn test_fill_defaults_to_black() {
        let style = Style::parse("");
        assert_eq!(style.fill().as_deref(), Some("#000000"));
        assert_eq!(style.stroke(), None);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = Style::parse("stroke:red;fill:none");
        style.set("stroke", "blue");
        style.set("opacity", "0.5");
        assert_eq!(style.to_string(), "stroke:blue;fill:none;opacity:0.5;");
    }
}
