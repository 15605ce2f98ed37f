mod md_writer;

pub use self::md_writer::MarkdownWriter;
use crate::{changelog::ChangeLog, error::Result, link_style::LinkStyle, sectionmap::SectionMap};

/// A trait that allows writing an aggregated `SectionMap` out in an arbitrary
/// document format. The `SectionMap` can be thought of as the "AST" of a
/// changelog run; `MarkdownWriter` is the implementor this crate ships.
pub trait FormatWriter {
    /// Writes a changelog for the given release header from an aggregated
    /// `SectionMap`. Either the complete document is produced or an error is
    /// returned; implementors must not leave a partially-written record
    /// behind on failure.
    fn write_changelog(
        &mut self,
        header: &ChangeLog,
        style: LinkStyle,
        section_map: &SectionMap,
    ) -> Result<()>;
}
