//! Output buffers and final file assembly.
//!
//! Handlers append text to the named buffers of [`Sections`] while the
//! declaration graph is traversed. The two files are assembled from the
//! buffers exactly once, after traversal.

use fwrap_decl::InsertSection;
use std::fmt::Write;

/// Continuation lines start once a wrapped list reaches this column.
pub const MAX_LINE_LENGTH: usize = 128;

const BANNER_C: &str = "/* ----------------------------------------------------------------------------\n \
 * This file was automatically generated by fwrap.\n \
 * Do not make changes to this file unless you know what you are doing.\n \
 * ----------------------------------------------------------------------------- */\n";

const BANNER_F: &str = "! This file was automatically generated by fwrap.\n\
! Do not make changes to this file unless you know what you are doing.\n";

/// An output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Begin,
    Runtime,
    Header,
    Wrapper,
    Init,
    Fbegin,
    Fuse,
    Fdecl,
    Fsubprograms,
}

impl From<InsertSection> for Section {
    fn from(section: InsertSection) -> Self {
        match section {
            InsertSection::Begin => Section::Begin,
            InsertSection::Runtime => Section::Runtime,
            InsertSection::Header => Section::Header,
            InsertSection::Wrapper => Section::Wrapper,
            InsertSection::Init => Section::Init,
            InsertSection::Fbegin => Section::Fbegin,
            InsertSection::Fuse => Section::Fuse,
            InsertSection::Fdecl => Section::Fdecl,
            InsertSection::Fsubprograms => Section::Fsubprograms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub begin: String,
    pub runtime: String,
    pub policies: String,
    pub header: String,
    pub wrapper: String,
    pub init: String,
    pub fbegin: String,
    pub fuse: String,
    pub fdecl: String,
    pub finterfaces: String,
    pub fsubprograms: String,
}

impl Sections {
    pub fn get_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Begin => &mut self.begin,
            Section::Runtime => &mut self.runtime,
            Section::Header => &mut self.header,
            Section::Wrapper => &mut self.wrapper,
            Section::Init => &mut self.init,
            Section::Fbegin => &mut self.fbegin,
            Section::Fuse => &mut self.fuse,
            Section::Fdecl => &mut self.fdecl,
            Section::Fsubprograms => &mut self.fsubprograms,
        }
    }

    /// Assemble the C/C++ wrapper file.
    pub fn write_wrapper(&self, cplusplus: bool) -> String {
        let mut out = String::new();
        out.push_str(BANNER_C);
        out.push('\n');
        out.push_str(&self.begin);
        out.push_str(&self.runtime);
        if !self.policies.is_empty() {
            out.push('\n');
            out.push_str(&self.policies);
        }
        out.push('\n');
        out.push_str(&self.header);
        if cplusplus {
            out.push_str("\nextern \"C\" {\n");
        }
        out.push_str(&self.wrapper);
        if cplusplus {
            out.push_str("} // extern\n");
        }
        out.push('\n');
        out.push_str(&self.init);
        out
    }

    /// Assemble the Fortran module file. `overloads` is the already
    /// formatted block of module-level generic interfaces.
    pub fn write_module(&self, overloads: &str) -> String {
        let mut out = String::new();
        out.push_str(BANNER_F);
        out.push_str(&self.fbegin);
        out.push_str(&self.fuse);
        out.push_str(" implicit none\n private\n");
        out.push_str("\n ! DECLARATION CONSTRUCTS\n");
        out.push_str(&self.fdecl);
        out.push_str(overloads);
        if !self.finterfaces.is_empty() {
            out.push_str("\n! WRAPPER DECLARATIONS\ninterface\n");
            out.push_str(&self.finterfaces);
            out.push_str("end interface\n\n");
        }
        if !self.fsubprograms.is_empty() {
            out.push_str("\ncontains\n ! MODULE SUBPROGRAMS\n");
            out.push_str(&self.fsubprograms);
        }
        out.push_str("\nend module\n");
        out
    }
}

/// Append `items` as a comma-separated list, breaking with a `&`
/// continuation before an item that would reach [`MAX_LINE_LENGTH`].
/// `line_length` is the length of the text already on the current line;
/// returns the length of the last line.
pub fn print_wrapped_list<S: AsRef<str>>(out: &mut String, items: &[S], line_length: usize) -> usize {
    let mut len = line_length;
    let mut prefix = "";
    for item in items {
        let item = item.as_ref();
        len += 2 + item.len();
        if len >= MAX_LINE_LENGTH {
            out.push_str(prefix);
            prefix = "&\n    ";
            len = 4 + item.len();
        }
        out.push_str(prefix);
        out.push_str(item);
        prefix = ", ";
    }
    len
}

/// Write a docstring as Fortran comment lines, skipping leading blank lines.
pub fn write_docstring(out: &mut String, docstring: Option<&str>) {
    let Some(doc) = docstring else {
        return;
    };
    for line in doc.lines().skip_while(|line| line.trim().is_empty()) {
        let _ = writeln!(out, "! {}", line.trim_end());
    }
}
