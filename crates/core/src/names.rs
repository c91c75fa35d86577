use std::collections::BTreeMap;
use std::fmt;

/// Placeholder name forced onto every cell of a repeated grid.
pub const GRID_CELL_NAME: &str = "item0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    CommentOut,
    SubPrefab,
    Button,
    Slider,
    Scrollbar,
    Image,
    Text,
    Input,
    Toggle,
    List,
    Scroller,
}

impl OptionKey {
    pub const ALL: [OptionKey; 11] = [
        Self::CommentOut,
        Self::SubPrefab,
        Self::Button,
        Self::Slider,
        Self::Scrollbar,
        Self::Image,
        Self::Text,
        Self::Input,
        Self::Toggle,
        Self::List,
        Self::Scroller,
    ];

    /// Spelling used in `@key=value` annotations.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommentOut => "commentout",
            Self::SubPrefab => "subPrefab",
            Self::Button => "button",
            Self::Slider => "slider",
            Self::Scrollbar => "scrollbar",
            Self::Image => "image",
            Self::Text => "text",
            Self::Input => "input",
            Self::Toggle => "toggle",
            Self::List => "list",
            Self::Scroller => "scroller",
        }
    }

    /// Case-insensitive lookup of an annotation key.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
}

impl OptionValue {
    /// `false`, `0`, `null` (any case) and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => {
                !(s.is_empty()
                    || s.eq_ignore_ascii_case("false")
                    || s == "0"
                    || s.eq_ignore_ascii_case("null"))
            }
        }
    }
}

/// Options attached to one node. Built fresh for every node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet(BTreeMap<OptionKey, OptionValue>);

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: OptionKey) {
        self.0.insert(key, OptionValue::Flag(true));
    }

    pub fn insert(&mut self, key: OptionKey, value: OptionValue) {
        self.0.insert(key, value);
    }

    pub fn remove(&mut self, key: OptionKey) -> Option<OptionValue> {
        self.0.remove(&key)
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.0.get(&key)
    }

    /// Present and truthy.
    pub fn is_set(&self, key: OptionKey) -> bool {
        self.0.get(&key).is_some_and(OptionValue::is_truthy)
    }

    pub fn keys(&self) -> impl Iterator<Item = OptionKey> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                OptionValue::Flag(b) => write!(f, "{key}: {b}")?,
                OptionValue::Text(s) => write!(f, "{key}: {s:?}")?,
            }
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub name: String,
    pub options: OptionSet,
}

/// Split a raw label into display name and options.
///
/// `parent_is_grid` forces the [`GRID_CELL_NAME`] placeholder, since hosts
/// give generated grid cells arbitrary names that could otherwise match a
/// role. `extended` enables the `Input` and `Scroller` suffixes.
pub fn parse_name(label: &str, parent_is_grid: bool, extended: bool) -> ParsedName {
    let mut segments = label.split('@');
    let mut name = segments.next().unwrap_or_default().trim().to_string();
    let mut options = OptionSet::new();

    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((k, v)) => (k.trim(), OptionValue::Text(v.trim().to_string())),
            None => (segment, OptionValue::Flag(true)),
        };
        match OptionKey::parse(key) {
            Some(key) => options.insert(key, value),
            None => tracing::debug!("ignoring unknown option {key:?} in {label:?}"),
        }
    }

    if let Some(rest) = name.strip_prefix('#') {
        options.set(OptionKey::CommentOut);
        name = rest.to_string();
    }

    if let Some(rest) = name.strip_prefix('*') {
        options.set(OptionKey::Image);
        name = rest.to_string();
    }

    if let Some(rest) = name.strip_suffix('/') {
        options.set(OptionKey::SubPrefab);
        name = rest.to_string();
    }

    if parent_is_grid {
        name = GRID_CELL_NAME.to_string();
    }

    for (key, suffixes, exact) in ROLE_SUFFIXES {
        if suffixes.iter().any(|s| name.ends_with(s)) || exact.is_some_and(|e| name == e) {
            options.set(*key);
        }
    }

    if extended {
        if name.ends_with("Input") {
            options.set(OptionKey::Input);
        }
        if name.ends_with("Scroller") {
            options.set(OptionKey::Scroller);
        }
    }

    ParsedName { name, options }
}

/// Name endings (and optional exact match) that imply a role.
const ROLE_SUFFIXES: &[(OptionKey, &[&str], Option<&str>)] = &[
    (OptionKey::Image, &["Image", "_image"], Some("image")),
    (OptionKey::Button, &["Button", "_button"], Some("button")),
    (OptionKey::Slider, &["Slider"], None),
    (OptionKey::Scrollbar, &["Scrollbar"], None),
    (OptionKey::Text, &["Text", "_text"], Some("text")),
    (OptionKey::Toggle, &["Toggle"], None),
    (OptionKey::List, &["List"], None),
];

/// Replace characters that cannot appear in file or folder names with `_`.
/// With `include_dot`, dots are replaced too so the name cannot carry its
/// own extension.
pub fn sanitize_file_name(name: &str, include_dot: bool) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' => '_',
            '.' if include_dot => '_',
            c if c.is_ascii_control() => '_',
            c => c,
        })
        .collect()
}
