use indexmap::IndexMap;
use serde::Deserialize;

use crate::{error::Result, link_style::LinkStyle};

/// The raw `.clog.toml` configuration a repository may carry. The `sections`
/// table extends the default alias map, and `order` overrides the section
/// ordering of the rendered document. The remaining keys tune presentation.
///
/// ```toml
/// repository = "https://github.com/chlog-tool/chlog"
/// link-style = "github"
/// order = ["Bug Fixes", "Features"]
///
/// [sections]
/// Documentation = ["docs"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawCfg {
    pub sections: IndexMap<String, Vec<String>>,
    pub order: Vec<String>,
    pub repository: Option<String>,
    pub subtitle: Option<String>,
    pub link_style: Option<LinkStyle>,
    pub from_latest_tag: bool,
}

impl RawCfg {
    /// Parses a raw config out of the bytes a `Querier` supplies
    pub fn from_slice(bytes: &[u8]) -> Result<RawCfg> {
        toml::from_slice(bytes).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SectionAliasMap;

    #[test]
    fn from_config() {
        let cfg = r#"
            repository = "https://github.com/chlog-tool/chlog"
            subtitle = "my awesome title"
            link-style = "github"
            from-latest-tag = true
            order = ["Bug Fixes", "Features"]

            [sections]
            Documentation = ["docs"]
            "Continuous Integration" = ["ci"]
        "#;
        let cfg = RawCfg::from_slice(cfg.as_bytes()).unwrap();

        assert_eq!(
            cfg.repository,
            Some("https://github.com/chlog-tool/chlog".into())
        );
        assert_eq!(cfg.subtitle, Some("my awesome title".into()));
        assert_eq!(cfg.link_style, Some(LinkStyle::Github));
        assert!(cfg.from_latest_tag);
        assert_eq!(cfg.order, vec!["Bug Fixes", "Features"]);
        assert_eq!(cfg.sections.get("Documentation"), Some(&vec!["docs".into()]));
    }

    #[test]
    fn empty_config_is_valid() {
        let cfg = RawCfg::from_slice(b"").unwrap();
        assert!(cfg.sections.is_empty());
        assert!(cfg.order.is_empty());
        assert!(!cfg.from_latest_tag);
    }

    #[test]
    fn config_sections_extend_the_default_map() {
        let cfg = RawCfg::from_slice(b"[sections]\ndocumentation = [\"docs\"]\n").unwrap();
        let map = SectionAliasMap::from_config(&cfg).unwrap();
        assert_eq!(map.section_for("docs"), "Documentation");
        assert_eq!(map.section_for("feat"), "Features");
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(RawCfg::from_slice(b"sections = 42").is_err());
    }

    #[test]
    fn unknown_link_style_is_an_error() {
        let got = RawCfg::from_slice(b"link-style = \"sourcehut\"");
        assert!(matches!(got, Err(crate::error::Error::ConfigParse(_))));
    }
}
