use std::fmt::Debug;

/// Produces candidate spellings for matching a field or shape name against
/// table and column names.
///
/// The resolver compares every candidate ASCII case-insensitively, so an
/// implementation only needs to produce spelling variants, not case
/// variants.
pub trait Inflector: Debug + Send + Sync + 'static {
    /// Candidate names for `name`, most preferred first. The name itself
    /// must be included.
    fn candidates(&self, name: &str) -> Vec<String>;

    /// True if `name` is a plural spelling. A navigation named by a path
    /// rather than a typed field uses this to prefer a foreign key on the
    /// child.
    fn is_plural(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// True if `name` matches `target` through any candidate.
    fn matches(&self, name: &str, target: &str) -> bool {
        self.candidates(name)
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(target))
    }
}

/// The default inflector: the name itself, then its plural and singular
/// forms as produced by the `pluralizer` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pluralize;

impl Inflector for Pluralize {
    fn candidates(&self, name: &str) -> Vec<String> {
        let mut ret = vec![name.to_string()];

        for candidate in [
            pluralizer::pluralize(name, 2, false),
            pluralizer::pluralize(name, 1, false),
        ] {
            if !ret.iter().any(|c| c.eq_ignore_ascii_case(&candidate)) {
                ret.push(candidate);
            }
        }

        ret
    }

    fn is_plural(&self, name: &str) -> bool {
        // Uncountable words are their own singular too
        pluralizer::pluralize(name, 2, false).eq_ignore_ascii_case(name)
            && !pluralizer::pluralize(name, 1, false).eq_ignore_ascii_case(name)
    }
}

/// An inflector that only matches names exactly (ignoring ASCII case).
#[derive(Debug, Default, Clone, Copy)]
pub struct Exact;

impl Inflector for Exact {
    fn candidates(&self, name: &str) -> Vec<String> {
        vec![name.to_string()]
    }
}
