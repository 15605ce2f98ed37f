use std::io;

use time::{macros::format_description, OffsetDateTime};

use crate::{
    changelog::ChangeLog,
    error::Result,
    fmt::FormatWriter,
    git::Commits,
    link_style::LinkStyle,
    sectionmap::{ComponentMap, SectionMap},
};

/// Wraps a `std::io::Write` object to write changelog output in Markdown
///
/// # Example
///
/// ```no_run
/// # use chlog::{build_changelog, ChangeLog, LinkStyle, SectionAliasMap};
/// let header = ChangeLog {
///     repo: "https://github.com/chlog-tool/chlog".into(),
///     version: "0.1.0".into(),
///     ..ChangeLog::default()
/// };
/// let text = build_changelog(
///     &header,
///     LinkStyle::Github,
///     vec![],
///     &SectionAliasMap::default(),
///     None,
///     false,
/// )
/// .unwrap();
/// ```
pub struct MarkdownWriter<'a>(&'a mut dyn io::Write);

impl<'a> MarkdownWriter<'a> {
    /// Creates a new `MarkdownWriter` wrapping a `std::io::Write` object
    pub fn new<T: io::Write + 'a>(writer: &'a mut T) -> MarkdownWriter<'a> {
        MarkdownWriter(writer)
    }

    fn write_header(&mut self, header: &ChangeLog) -> Result<()> {
        let version = &header.version;

        // Patch releases get a smaller heading
        let hashes = if header.patch_version { "###" } else { "##" };
        let title = match header.subtitle.as_deref() {
            Some(subtitle) if !subtitle.is_empty() => format!("{version} {subtitle}"),
            _ => version.clone(),
        };

        let date = OffsetDateTime::now_utc().format(format_description!("[year]-[month]-[day]"))?;
        writeln!(self.0, "<a name=\"{version}\"></a>")?;
        writeln!(self.0, "{hashes} {title} ({date})").map_err(Into::into)
    }

    fn write_section(
        &mut self,
        header: &ChangeLog,
        style: LinkStyle,
        title: &str,
        section: &ComponentMap,
    ) -> Result<()> {
        if section.is_empty() {
            return Ok(());
        }

        writeln!(self.0, "\n### {title}\n")?;

        for (component, entries) in section.iter() {
            writeln!(
                self.0,
                "* **{component}:** {}",
                format_commits(&header.repo, style, entries)
            )?;
        }

        Ok(())
    }
}

/// A single commit renders inline after the component bullet; multiple
/// commits become a nested bullet list.
fn format_commits(repo: &str, style: LinkStyle, commits: &Commits) -> String {
    if let [commit] = commits.as_slice() {
        return commit.summary(repo, style);
    }
    let lines = commits
        .iter()
        .map(|commit| format!("  * {}", commit.summary(repo, style)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n{lines}")
}

impl<'a> FormatWriter for MarkdownWriter<'a> {
    fn write_changelog(
        &mut self,
        header: &ChangeLog,
        style: LinkStyle,
        sm: &SectionMap,
    ) -> Result<()> {
        self.write_header(header)?;

        for section in sm.order() {
            if let Some(components) = sm.sections.get(section) {
                self.write_section(header, style, section, components)?;
            }
        }

        self.0.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Commit;

    fn feature(subject: &str, component: &str) -> Commit {
        Commit {
            hash: "029aafdc7579af19b3ce6acf0ce245a230633953".into(),
            subject: subject.into(),
            component: component.into(),
            raw_type: "feat".into(),
            commit_type: "Features".into(),
            ..Commit::default()
        }
    }

    fn render(commits: Commits, header: &ChangeLog) -> String {
        let sm = SectionMap::from_commits(commits);
        let mut buf = vec![];
        MarkdownWriter::new(&mut buf)
            .write_changelog(header, LinkStyle::Github, &sm)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn header() -> ChangeLog {
        ChangeLog {
            repo: "https://github.com/chlog-tool/chlog".into(),
            version: "1.0.0".into(),
            ..ChangeLog::default()
        }
    }

    #[test]
    fn writes_anchor_and_heading() {
        let out = render(vec![feature("Initial Commit", "README")], &header());
        assert!(out.starts_with("<a name=\"1.0.0\"></a>\n## 1.0.0 ("));
    }

    #[test]
    fn patch_version_uses_smaller_heading() {
        let mut h = header();
        h.patch_version = true;
        let out = render(vec![feature("Initial Commit", "README")], &h);
        assert!(out.contains("\n### 1.0.0 ("));
    }

    #[test]
    fn subtitle_follows_the_version() {
        let mut h = header();
        h.subtitle = Some("Nicknamed Release".into());
        let out = render(vec![feature("Initial Commit", "README")], &h);
        assert!(out.contains("## 1.0.0 Nicknamed Release ("));
    }

    #[test]
    fn single_commit_renders_inline() {
        let out = render(vec![feature("Initial Commit", "README")], &header());
        assert!(out.contains(
            "* **README:** Initial Commit ([029aafdc](https://github.com/chlog-tool/chlog/commit/029aafdc7579af19b3ce6acf0ce245a230633953))"
        ));
    }

    #[test]
    fn multiple_commits_render_nested() {
        let out = render(
            vec![feature("first", "core"), feature("second", "core")],
            &header(),
        );
        assert!(out.contains("* **core:** \n  * first (["));
        assert!(out.contains("\n  * second (["));
    }

    #[test]
    fn features_section_appears_once_and_first() {
        let mut unknown = feature("mystery", "misc");
        unknown.raw_type = "wat".into();
        unknown.commit_type = "Unknown".into();

        let out = render(vec![feature("Initial Commit", "README"), unknown], &header());
        assert_eq!(out.matches("### Features").count(), 1);
        let features_at = out.find("### Features").unwrap();
        let unknown_at = out.find("### Unknown").unwrap();
        assert!(features_at < unknown_at);
    }
}
