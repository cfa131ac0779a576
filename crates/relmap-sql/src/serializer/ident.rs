use super::{Formatter, ToSql};

/// A double-quoted identifier. Embedded quotes are doubled.
pub(super) struct Ident<S>(pub(super) S);

/// A table variable, `@name`.
pub(super) struct Variable<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('"');
        for ch in self.0.as_ref().chars() {
            if ch == '"' {
                f.dst.push('"');
            }
            f.dst.push(ch);
        }
        f.dst.push('"');
    }
}

impl<S: AsRef<str>> ToSql for Variable<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('@');
        f.dst.push_str(self.0.as_ref());
    }
}
