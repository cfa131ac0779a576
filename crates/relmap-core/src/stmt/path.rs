use std::fmt;

/// A dotted chain of field names, rooted at an argument or at the output
/// shape.
///
/// Paths name projected columns (`Department.Name`), locate argument values
/// at bind time (`filter.Name`) and appear in error messages.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    steps: Vec<String>,
}

impl Path {
    pub fn root() -> Path {
        Path::default()
    }

    pub fn from_steps<I, S>(steps: I) -> Path
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path {
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dotted string. Empty segments are dropped.
    pub fn parse(src: &str) -> Path {
        Path::from_steps(src.split('.').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn first(&self) -> Option<&str> {
        self.steps.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.steps.last().map(String::as_str)
    }

    /// Returns a new path with `step` appended.
    pub fn join(&self, step: impl Into<String>) -> Path {
        let mut steps = self.steps.clone();
        steps.push(step.into());
        Path { steps }
    }

    /// Returns a new path with every step of `other` appended.
    pub fn concat(&self, other: &Path) -> Path {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Path { steps }
    }

    pub fn push(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.steps.split_last()?;
        Some(Path {
            steps: rest.to_vec(),
        })
    }

    /// Strips `prefix` from the front of this path, if it is a prefix.
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if self.steps.len() < prefix.steps.len() {
            return None;
        }

        let (head, tail) = self.steps.split_at(prefix.steps.len());
        if head != prefix.steps.as_slice() {
            return None;
        }

        Some(Path {
            steps: tail.to_vec(),
        })
    }

    /// Renders the path as an identifier-safe name: every character outside
    /// `[A-Za-z0-9_]` becomes `_` and steps are joined with `_`.
    pub fn to_param_name(&self) -> String {
        let mut ret = String::new();

        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                ret.push('_');
            }
            ret.extend(step.chars().map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c
                } else {
                    '_'
                }
            }));
        }

        ret
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.steps.join("."))
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl From<&str> for Path {
    fn from(value: &str) -> Self {
        Path::parse(value)
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Path::from_steps(iter)
    }
}
