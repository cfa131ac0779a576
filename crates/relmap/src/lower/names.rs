use std::collections::HashSet;

/// Parameter names handed out while lowering.
///
/// Tokens derive parameter names at bind time from a base reserved here:
/// `{base}_{i}` for IN lists and key matches, `{base}_{i}_{j}` for composite
/// keys and `{base}_r{i}_c{j}` for VALUES rows. Reserving a base reserves
/// that whole space, so a declared parameter never shadows a derived one.
///
/// Names compare case-insensitively.
#[derive(Debug, Default)]
pub(super) struct Names {
    taken: HashSet<String>,
    bases: Vec<String>,
}

impl Names {
    /// A name for one parameter.
    pub(super) fn single(&mut self, base: &str) -> String {
        let name = self.unused(base, Names::is_free);
        self.taken.insert(name.to_ascii_lowercase());
        name
    }

    /// A base for derived parameter names.
    pub(super) fn base(&mut self, base: &str) -> String {
        let name = self.unused(base, Names::is_free_base);
        self.taken.insert(name.to_ascii_lowercase());
        self.bases.push(name.to_ascii_lowercase());
        name
    }

    /// `base` if free, else `base_n{k}` for the first free `k`. The last
    /// segment of a derived name is all digits or `c` and digits, so no
    /// clash suffix falls inside a reserved space and the search ends once
    /// `taken` is exhausted.
    fn unused(&self, base: &str, free: fn(&Names, &str) -> bool) -> String {
        let base = if base.is_empty() { "p" } else { base };

        if free(self, base) {
            return base.to_string();
        }

        let mut n = 2;
        loop {
            let name = format!("{base}_n{n}");
            if free(self, &name) {
                return name;
            }
            n += 1;
        }
    }

    fn is_free(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        !self.taken.contains(&name) && !self.bases.iter().any(|base| derives(base, &name))
    }

    /// Two spaces overlap when one base is the other's `{base}_{i}`, so
    /// checking `name` against the taken names in both directions covers
    /// other bases too.
    fn is_free_base(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.is_free(name) && !self.taken.iter().any(|taken| derives(&lower, taken))
    }
}

/// True when `name` lies in the space derived from `base`.
fn derives(base: &str, name: &str) -> bool {
    let Some(rest) = name
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    let segments: Vec<&str> = rest.split('_').collect();

    match segments[..] {
        [i] => is_digits(i),
        [i, j] if is_digits(i) => is_digits(j),
        [r, c] => {
            r.strip_prefix('r').is_some_and(is_digits) && c.strip_prefix('c').is_some_and(is_digits)
        }
        _ => false,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clashing_singles_get_a_suffix() {
        let mut names = Names::default();

        assert_eq!(names.single("Name"), "Name");
        assert_eq!(names.single("name"), "name_n2");
        assert_eq!(names.single(""), "p");
    }

    #[test]
    fn single_avoids_derived_space() {
        let mut names = Names::default();

        assert_eq!(names.base("Ids"), "Ids");
        assert_eq!(names.single("Ids_1"), "Ids_1_n2");
        assert_eq!(names.single("Ids_0_1"), "Ids_0_1_n2");
        assert_eq!(names.single("Ids_Name"), "Ids_Name");
    }

    #[test]
    fn base_avoids_declared_names() {
        let mut names = Names::default();

        assert_eq!(names.single("Ids_1"), "Ids_1");
        assert_eq!(names.base("Ids"), "Ids_n2");
        assert_eq!(names.base("n0"), "n0");
        assert_eq!(names.single("n0_r1_c2"), "n0_r1_c2_n2");
    }

    #[test]
    fn bases_do_not_overlap() {
        let mut names = Names::default();

        assert_eq!(names.base("Ids"), "Ids");
        // `Ids_1_0` would be both an element of `Ids_1` and a composite key
        // of `Ids`
        assert_eq!(names.base("Ids_1"), "Ids_1_n2");
        assert_eq!(names.base("Ids"), "Ids_n2");
    }

    #[test]
    fn derived_names() {
        assert!(derives("ids", "ids_0"));
        assert!(derives("ids", "ids_10_2"));
        assert!(derives("n3", "n3_r0_c4"));
        assert!(!derives("ids", "ids"));
        assert!(!derives("ids", "ids_name"));
        assert!(!derives("ids", "ids_n2"));
        assert!(!derives("ids", "idsx_0"));
    }
}
