//! Group Tags
//!
//! Group names carry their metadata in a small bracketed grammar:
//! `"[Base]"`, `"[Base_2]"`, `"[Base_2] (turret_01.dds)"` for keep groups
//! and `"[Name] <rule>"`, `"[Texture] <rule>"`, `"[No Texture]"` for discard
//! groups. Rather than threading raw strings through the pipeline, keep tags
//! are a structured record with a symmetric parse/format pair; the display
//! string is only the scene-facing serialization.

use std::fmt;

/// Parsed keep-group tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepTag {
    /// Base family name, e.g. `Turret` or `DropTank`.
    pub base: String,
    /// Numeric suffix for multi-member families. `None` renders the bare
    /// base name.
    pub suffix: Option<u32>,
    /// Texture key shown after the tag, e.g. `turret_01.dds`.
    pub texture_key: Option<String>,
}

impl KeepTag {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            suffix: None,
            texture_key: None,
        }
    }

    pub fn with_suffix(mut self, suffix: u32) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn with_texture_key(mut self, key: impl Into<String>) -> Self {
        self.texture_key = Some(key.into());
        self
    }

    /// Parse a group name in the bracketed-tag grammar.
    ///
    /// The base is everything before the first underscore inside the
    /// brackets; the remainder counts as a suffix only when it is all
    /// digits, otherwise it is dropped. Parsing and formatting round-trip
    /// for every name this tool emits.
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('[')?;
        let close = rest.find(']')?;
        let content = &rest[..close];
        if content.is_empty() {
            return None;
        }

        let (base, suffix) = match content.split_once('_') {
            Some((base, tail)) => {
                let suffix = if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
                    tail.parse::<u32>().ok()
                } else {
                    None
                };
                (base, suffix)
            }
            None => (content, None),
        };

        let after = rest[close + 1..].trim();
        let texture_key = after
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .map(str::to_owned);

        Some(Self {
            base: base.to_owned(),
            suffix,
            texture_key,
        })
    }
}

impl fmt::Display for KeepTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Some(n) => write!(f, "[{}_{}]", self.base, n)?,
            None => write!(f, "[{}]", self.base)?,
        }
        if let Some(key) = &self.texture_key {
            write!(f, " ({key})")?;
        }
        Ok(())
    }
}

/// Discard-group tag. Rules are the static substrings that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardTag {
    /// Object name matched a discard rule.
    Name(&'static str),
    /// Texture key matched a discard rule.
    Texture(&'static str),
    /// Object had no resolvable texture.
    NoTexture,
}

impl fmt::Display for DiscardTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(rule) => write!(f, "[Name] {rule}"),
            Self::Texture(rule) => write!(f, "[Texture] {rule}"),
            Self::NoTexture => write!(f, "[No Texture]"),
        }
    }
}

/// Material name derived from a group name: the tag content before `]`, or
/// the literal group name when untagged.
pub fn canonical_material_name(group_name: &str) -> &str {
    if let Some(rest) = group_name.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            return &rest[..close];
        }
    }
    group_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_base() {
        let tag = KeepTag::parse("[Body]").unwrap();
        assert_eq!(tag.base, "Body");
        assert_eq!(tag.suffix, None);
        assert_eq!(tag.texture_key, None);
    }

    #[test]
    fn test_parse_suffixed_with_key() {
        let tag = KeepTag::parse("[Turret_2] (turret_01.dds)").unwrap();
        assert_eq!(tag.base, "Turret");
        assert_eq!(tag.suffix, Some(2));
        assert_eq!(tag.texture_key.as_deref(), Some("turret_01.dds"));
    }

    #[test]
    fn test_parse_non_numeric_tail_dropped() {
        // "TurretAdd" has no underscore, so it stays whole; "Foo_Bar" loses
        // its tail because only digits count as a suffix.
        let tag = KeepTag::parse("[TurretAdd] (x.dds)").unwrap();
        assert_eq!(tag.base, "TurretAdd");
        assert_eq!(tag.suffix, None);

        let tag = KeepTag::parse("[Foo_Bar]").unwrap();
        assert_eq!(tag.base, "Foo");
        assert_eq!(tag.suffix, None);
    }

    #[test]
    fn test_parse_rejects_untagged() {
        assert!(KeepTag::parse("Body").is_none());
        assert!(KeepTag::parse("[]").is_none());
        assert!(KeepTag::parse("[unclosed").is_none());
    }

    #[test]
    fn test_round_trip() {
        let names = [
            "[Body]",
            "[Gun] (gun_barrel.dds)",
            "[Turret_1] (turret_a.dds)",
            "[DropTank_12]",
        ];
        for name in names {
            let tag = KeepTag::parse(name).unwrap();
            assert_eq!(tag.to_string(), name);
            assert_eq!(KeepTag::parse(&tag.to_string()).unwrap(), tag);
        }
    }

    #[test]
    fn test_discard_tag_display() {
        assert_eq!(DiscardTag::Name("net_").to_string(), "[Name] net_");
        assert_eq!(DiscardTag::Texture("glass").to_string(), "[Texture] glass");
        assert_eq!(DiscardTag::NoTexture.to_string(), "[No Texture]");
    }

    #[test]
    fn test_canonical_material_name() {
        assert_eq!(canonical_material_name("[Turret_1] (a.dds)"), "Turret_1");
        assert_eq!(canonical_material_name("[Body]"), "Body");
        assert_eq!(canonical_material_name("loose_group"), "loose_group");
    }
}
