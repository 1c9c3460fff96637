//! Case-insensitive set difference over field descriptors.

use std::collections::HashSet;

use fieldsync_core::FieldDescriptor;

/// Descriptors of `a` whose lowercase name does not appear in `b`.
///
/// Not symmetric: additions are `diff(source, local)`, removals are
/// `diff(local, source)`. Order follows `a`.
pub fn diff<'a>(a: &'a [FieldDescriptor], b: &[FieldDescriptor]) -> Vec<&'a FieldDescriptor> {
    let present: HashSet<String> = b.iter().map(FieldDescriptor::identity).collect();
    a.iter()
        .filter(|d| !present.contains(&d.identity()))
        .collect()
}

/// Drop later descriptors whose name repeats an earlier one case-insensitively.
pub(crate) fn dedup_by_identity<'a>(
    descriptors: impl IntoIterator<Item = &'a FieldDescriptor>,
) -> Vec<&'a FieldDescriptor> {
    let mut seen = HashSet::new();
    descriptors
        .into_iter()
        .filter(|d| seen.insert(d.identity()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fd(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, "type/Text")
    }

    fn names(descriptors: &[&FieldDescriptor]) -> Vec<String> {
        descriptors.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn diff_with_self_is_empty() {
        let a = vec![fd("id"), fd("Name"), fd("created_at")];
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn case_differences_are_not_mismatches() {
        let a = vec![fd("Foo"), fd("BAR")];
        let b = vec![fd("foo"), fd("bar")];
        assert!(diff(&a, &b).is_empty());
        assert!(diff(&b, &a).is_empty());
    }

    #[test]
    fn both_directions_partition_mismatches() {
        let source = vec![fd("id"), fd("email"), fd("Signup_Date")];
        let local = vec![fd("ID"), fd("legacy_code"), fd("email")];

        assert_eq!(names(&diff(&source, &local)), vec!["Signup_Date"]);
        assert_eq!(names(&diff(&local, &source)), vec!["legacy_code"]);
    }

    #[test]
    fn empty_sides() {
        let a = vec![fd("x")];
        assert_eq!(diff(&a, &[]).len(), 1);
        assert!(diff(&[], &a).is_empty());
    }

    #[test]
    fn diff_keeps_order_of_left_side() {
        let a = vec![fd("c"), fd("a"), fd("b")];
        assert_eq!(names(&diff(&a, &[fd("a")])), vec!["c", "b"]);
    }

    #[test]
    fn dedup_keeps_first_spelling() {
        let a = vec![fd("Email"), fd("email"), fd("phone")];
        assert_eq!(names(&dedup_by_identity(&a)), vec!["Email", "phone"]);
    }
}
