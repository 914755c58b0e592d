//! Overload aggregation.
//!
//! Procedures that share a public name (compared case-insensitively) are
//! collected into one group per scope, in the order they were wrapped, and
//! written out as a generic interface once the scope is complete.

use crate::sections::print_wrapped_list;
use indexmap::IndexMap;
use smol_str::SmolStr;

#[derive(Debug, Clone)]
struct Group {
    /// Public name as first spelled.
    name: String,
    procedures: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Overloads {
    groups: IndexMap<SmolStr, Group>,
}

impl Overloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `procedure` to the group named `public`.
    pub fn add(&mut self, public: &str, procedure: impl Into<String>) {
        let key = SmolStr::new(public.to_lowercase());
        self.groups
            .entry(key)
            .or_insert_with(|| Group {
                name: public.to_string(),
                procedures: Vec::new(),
            })
            .procedures
            .push(procedure.into());
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order as `(public name, procedures)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .values()
            .map(|g| (g.name.as_str(), g.procedures.as_slice()))
    }

    /// Module-level generic interfaces.
    pub fn write_module(&self, out: &mut String) {
        for (name, procedures) in self.iter() {
            out.push_str(" interface ");
            out.push_str(name);
            out.push_str("\n  module procedure ");
            print_wrapped_list(out, procedures, 19);
            out.push_str("\n end interface\n public :: ");
            out.push_str(name);
            out.push('\n');
        }
    }

    /// Type-bound generic bindings, inside a derived type.
    pub fn write_generics(&self, out: &mut String) {
        for (name, procedures) in self.iter() {
            out.push_str("  generic :: ");
            out.push_str(name);
            out.push_str(" => ");
            print_wrapped_list(out, procedures, 13 + name.len() + 4 - 2);
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_fold_case_and_keep_order() {
        let mut overloads = Overloads::new();
        overloads.add("area", "swigf_area__SWIG_0");
        overloads.add("scale", "swigf_scale");
        overloads.add("AREA", "swigf_area__SWIG_1");
        let groups: Vec<_> = overloads.iter().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "area");
        assert_eq!(groups[0].1, ["swigf_area__SWIG_0", "swigf_area__SWIG_1"]);
        assert_eq!(groups[1].0, "scale");
    }

    #[test]
    fn test_module_interface_text() {
        let mut overloads = Overloads::new();
        overloads.add("Circle", "swigf_create_Circle__SWIG_0");
        overloads.add("Circle", "swigf_create_Circle__SWIG_1");
        let mut out = String::new();
        overloads.write_module(&mut out);
        assert_eq!(
            out,
            " interface Circle\n  module procedure swigf_create_Circle__SWIG_0, swigf_create_Circle__SWIG_1\n end interface\n public :: Circle\n"
        );
    }

    #[test]
    fn test_generic_binding_text() {
        let mut overloads = Overloads::new();
        overloads.add("assignment(=)", "swigf_Circle_op_assign__");
        overloads.add("area", "swigf_Circle_area__SWIG_0");
        overloads.add("area", "swigf_Circle_area__SWIG_1");
        let mut out = String::new();
        overloads.write_generics(&mut out);
        assert!(out.starts_with("  generic :: assignment(=) => swigf_Circle_op_assign__\n"));
        assert!(out.contains("  generic :: area => swigf_Circle_area__SWIG_0, swigf_Circle_area__SWIG_1\n"));
    }

    #[test]
    fn test_long_groups_wrap() {
        let mut overloads = Overloads::new();
        for i in 0..12 {
            overloads.add("compute", format!("swigf_compute_with_a_long_name__SWIG_{}", i));
        }
        let mut out = String::new();
        overloads.write_module(&mut out);
        assert!(out.contains(", &\n    swigf_compute"));
        assert!(out.lines().all(|line| line.len() < crate::sections::MAX_LINE_LENGTH));
    }
}
