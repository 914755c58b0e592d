//! Support code emitted into the generated files.
//!
//! The base runtime is always written. Everything else is a named fragment
//! pulled in on demand, usually through the `fragment` keyword of a
//! typemap, and written at most once together with its dependencies.

use crate::sections::{Section, Sections};
use rustc_hash::FxHashSet;

const EXPORT_MACROS: &str = r#"#ifndef SWIGEXPORT
# if defined(_WIN32) || defined(__WIN32__) || defined(__CYGWIN__)
#   define SWIGEXPORT __declspec(dllexport)
# elif defined(__GNUC__) && __GNUC__ >= 4
#   define SWIGEXPORT __attribute__ ((visibility("default")))
# else
#   define SWIGEXPORT
# endif
#endif

#ifndef SWIGINTERN
# define SWIGINTERN static
#endif

#ifndef SWIGEXTERN
# ifdef __cplusplus
#   define SWIGEXTERN extern
# else
#   define SWIGEXTERN
# endif
#endif
"#;

const CAST_MACROS: &str = r#"#if defined(__cplusplus) && defined(SWIG_CPLUSPLUS_CAST)
# define SWIG_const_cast(a,Type) const_cast< Type >(a)
# define SWIG_static_cast(a,Type) static_cast< Type >(a)
# define SWIG_reinterpret_cast(a,Type) reinterpret_cast< Type >(a)
#else
# define SWIG_const_cast(a,Type) (Type)(a)
# define SWIG_static_cast(a,Type) (Type)(a)
# define SWIG_reinterpret_cast(a,Type) (Type)(a)
#endif
"#;

const CONTRACT_MACRO: &str = r#"#include <stdio.h>
#define SWIG_contract_assert(RETURNNULL, EXPR, MSG) \
  if (!(EXPR)) { fprintf(stderr, "Contract violation: %s\n", MSG); RETURNNULL; }
"#;

const CLASS_WRAPPER: &str = r#"#include <stdlib.h>
#include <string.h>

enum {
  SWIG_MEM_OWN = 0x01,
  SWIG_MEM_RVALUE = 0x02
};

typedef struct {
  void* cptr;
  int cmemflags;
} SwigClassWrapper;

#ifdef __cplusplus
# define SWIG_new_copy(VAL, TYPE) (new TYPE(VAL))
#else
# define SWIG_new_copy(VAL, TYPE) memcpy(malloc(sizeof(TYPE)), &(VAL), sizeof(TYPE))
#endif
"#;

const CLASS_WRAPPER_F: &str = r#" integer, parameter :: swig_cmem_own_bit = 0
 integer, parameter :: swig_cmem_rvalue_bit = 1
 type, bind(C) :: SwigClassWrapper
  type(C_PTR), public :: cptr = C_NULL_PTR
  integer(C_INT), public :: cmemflags = 0
 end type
"#;

const ASSIGN_CXX: &str = r#"namespace swig {

enum AssignmentType {
  ASSIGNMENT_DEFAULT,
  ASSIGNMENT_NODESTRUCT,
  ASSIGNMENT_SMARTPTR
};

}

template<class T, swig::AssignmentType A>
SWIGINTERN void SWIG_assign(SwigClassWrapper* self, SwigClassWrapper other) {
  if (self->cptr == other.cptr) {
    return;
  }
  if (self->cptr && (self->cmemflags & SWIG_MEM_OWN) && A != swig::ASSIGNMENT_NODESTRUCT) {
    delete static_cast<T*>(self->cptr);
  }
  self->cptr = other.cptr;
  if (other.cmemflags & SWIG_MEM_RVALUE) {
    self->cmemflags = other.cmemflags & ~SWIG_MEM_RVALUE;
  } else {
    self->cmemflags = other.cmemflags & ~SWIG_MEM_OWN;
  }
}
"#;

const ASSIGN_C: &str = r#"SWIGINTERN void SWIG_assign(SwigClassWrapper* self, SwigClassWrapper other) {
  if (self->cptr == other.cptr) {
    return;
  }
  if (self->cptr && (self->cmemflags & SWIG_MEM_OWN)) {
    free(self->cptr);
  }
  self->cptr = other.cptr;
  if (other.cmemflags & SWIG_MEM_RVALUE) {
    self->cmemflags = other.cmemflags & ~SWIG_MEM_RVALUE;
  } else {
    self->cmemflags = other.cmemflags & ~SWIG_MEM_OWN;
  }
}
"#;

const ARRAY_WRAPPER: &str = r#"#include <stdlib.h>
#include <string.h>

typedef struct {
  void* data;
  size_t size;
} SwigArrayWrapper;
"#;

const ARRAY_WRAPPER_F: &str = r#" type, bind(C) :: SwigArrayWrapper
  type(C_PTR), public :: data = C_NULL_PTR
  integer(C_SIZE_T), public :: size = 0
 end type
"#;

const STRING_TO_CHARS_F: &str = r#"subroutine SWIG_string_to_chararray(string, chars, wrap)
  use, intrinsic :: ISO_C_BINDING
  character(kind=C_CHAR, len=*), intent(IN) :: string
  character(kind=C_CHAR), dimension(:), target, allocatable, intent(OUT) :: chars
  type(SwigArrayWrapper), intent(OUT) :: wrap
  integer :: i

  allocate(character(kind=C_CHAR) :: chars(len(string) + 1))
  do i=1,len(string)
    chars(i) = string(i:i)
  end do
  chars(len(string) + 1) = C_NULL_CHAR
  wrap%data = c_loc(chars)
  wrap%size = len(string)
end subroutine

"#;

const CHARS_TO_STRING_F: &str = r#"subroutine SWIG_chararray_to_string(wrap, string)
  use, intrinsic :: ISO_C_BINDING
  type(SwigArrayWrapper), intent(IN) :: wrap
  character(kind=C_CHAR, len=:), allocatable, intent(OUT) :: string
  character(kind=C_CHAR), dimension(:), pointer :: chars
  integer(kind=C_SIZE_T) :: i

  call c_f_pointer(wrap%data, chars, [wrap%size])
  allocate(character(kind=C_CHAR, len=wrap%size) :: string)
  do i=1, wrap%size
    string(i:i) = chars(i)
  end do
end subroutine

"#;

/// A named piece of support code.
struct Fragment {
    name: &'static str,
    section: Section,
    deps: &'static [&'static str],
    cxx: &'static str,
    c: &'static str,
}

const FRAGMENTS: &[Fragment] = &[
    Fragment {
        name: "SwigClassWrapper",
        section: Section::Runtime,
        deps: &[],
        cxx: CLASS_WRAPPER,
        c: CLASS_WRAPPER,
    },
    Fragment {
        name: "SwigClassWrapper_f",
        section: Section::Fdecl,
        deps: &[],
        cxx: CLASS_WRAPPER_F,
        c: CLASS_WRAPPER_F,
    },
    Fragment {
        name: "SWIG_assign",
        section: Section::Header,
        deps: &["SwigClassWrapper"],
        cxx: ASSIGN_CXX,
        c: ASSIGN_C,
    },
    Fragment {
        name: "SwigArrayWrapper",
        section: Section::Runtime,
        deps: &[],
        cxx: ARRAY_WRAPPER,
        c: ARRAY_WRAPPER,
    },
    Fragment {
        name: "SwigArrayWrapper_f",
        section: Section::Fdecl,
        deps: &[],
        cxx: ARRAY_WRAPPER_F,
        c: ARRAY_WRAPPER_F,
    },
    Fragment {
        name: "SWIG_string_to_chararray_f",
        section: Section::Fsubprograms,
        deps: &["SwigArrayWrapper_f"],
        cxx: STRING_TO_CHARS_F,
        c: STRING_TO_CHARS_F,
    },
    Fragment {
        name: "SWIG_chararray_to_string_f",
        section: Section::Fsubprograms,
        deps: &["SwigArrayWrapper_f"],
        cxx: CHARS_TO_STRING_F,
        c: CHARS_TO_STRING_F,
    },
];

/// Runtime code written at the top of every wrapper file.
pub fn base_runtime(cppcast: bool) -> String {
    let mut out = String::from(EXPORT_MACROS);
    out.push('\n');
    if cppcast {
        out.push_str("#define SWIG_CPLUSPLUS_CAST\n");
    }
    out.push_str(CAST_MACROS);
    out.push('\n');
    out.push_str(CONTRACT_MACRO);
    out.push('\n');
    out
}

/// Tracks which fragments have been written.
#[derive(Debug, Default)]
pub struct Fragments {
    emitted: FxHashSet<&'static str>,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `name` and its dependencies unless they are already present.
    /// Returns `false` for an unknown fragment.
    pub fn require(&mut self, name: &str, cplusplus: bool, sections: &mut Sections) -> bool {
        let Some(fragment) = FRAGMENTS.iter().find(|f| f.name == name) else {
            return false;
        };
        if self.emitted.contains(fragment.name) {
            return true;
        }
        self.emitted.insert(fragment.name);
        for dep in fragment.deps {
            self.require(dep, cplusplus, sections);
        }
        tracing::trace!(fragment = fragment.name, "emitting runtime fragment");
        let code = if cplusplus { fragment.cxx } else { fragment.c };
        sections.get_mut(fragment.section).push_str(code);
        true
    }

    /// Require every fragment of a comma-separated list, returning the
    /// names that are not known.
    pub fn require_list(
        &mut self,
        list: &str,
        cplusplus: bool,
        sections: &mut Sections,
    ) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| !self.require(name, cplusplus, sections))
            .map(str::to_string)
            .collect()
    }

    #[cfg(test)]
    fn is_emitted(&self, name: &str) -> bool {
        self.emitted.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_written_once_with_dependencies() {
        let mut sections = Sections::default();
        let mut fragments = Fragments::new();
        assert!(fragments.require("SWIG_assign", true, &mut sections));
        assert!(fragments.require("SWIG_assign", true, &mut sections));
        assert!(fragments.is_emitted("SwigClassWrapper"));
        assert_eq!(sections.header.matches("SWIG_assign(").count(), 1);
        assert_eq!(sections.runtime.matches("} SwigClassWrapper;").count(), 1);
        assert!(sections.header.contains("delete static_cast<T*>"));
    }

    #[test]
    fn test_c_assign_uses_free() {
        let mut sections = Sections::default();
        let mut fragments = Fragments::new();
        fragments.require("SWIG_assign", false, &mut sections);
        assert!(sections.header.contains("free(self->cptr)"));
        assert!(!sections.header.contains("namespace swig"));
    }

    #[test]
    fn test_require_list_reports_unknown() {
        let mut sections = Sections::default();
        let mut fragments = Fragments::new();
        let unknown = fragments.require_list(
            "SwigArrayWrapper, nope,SWIG_chararray_to_string_f",
            true,
            &mut sections,
        );
        assert_eq!(unknown, vec!["nope".to_string()]);
        assert!(sections.fdecl.contains("type, bind(C) :: SwigArrayWrapper"));
        assert!(sections.fsubprograms.contains("subroutine SWIG_chararray_to_string"));
    }

    #[test]
    fn test_base_runtime_cast_switch() {
        assert!(base_runtime(true).contains("#define SWIG_CPLUSPLUS_CAST"));
        assert!(!base_runtime(false).contains("#define SWIG_CPLUSPLUS_CAST"));
        assert!(base_runtime(false).contains("SWIG_contract_assert"));
    }
}
