//! Child flattening.

use super::element::{Child, VNode};

/// Anything that can appear as the children of a VNode.
///
/// Implementations append to a flat list, so nested vectors, arrays, tuples
/// and options collapse into one ordered sequence.
pub trait IntoChildren {
    fn into_children(self, out: &mut Vec<Child>);
}

impl IntoChildren for Child {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(self);
    }
}

impl IntoChildren for VNode {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(Child::Element(self));
    }
}

impl IntoChildren for &VNode {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(Child::Element(self.clone()));
    }
}

impl IntoChildren for &str {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self.to_owned()));
    }
}

impl IntoChildren for String {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self));
    }
}

impl IntoChildren for &String {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self.clone()));
    }
}

impl IntoChildren for char {
    fn into_children(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self.to_string()));
    }
}

macro_rules! impl_number_children {
    ($($ty:ty),*) => {
        $(
            impl IntoChildren for $ty {
                fn into_children(self, out: &mut Vec<Child>) {
                    out.push(Child::Text(self.to_string()));
                }
            }
        )*
    };
}

impl_number_children!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Booleans render nothing, so `cond && child`-style conditionals collapse.
impl IntoChildren for bool {
    fn into_children(self, _out: &mut Vec<Child>) {}
}

impl IntoChildren for () {
    fn into_children(self, _out: &mut Vec<Child>) {}
}

impl<T: IntoChildren> IntoChildren for Option<T> {
    fn into_children(self, out: &mut Vec<Child>) {
        if let Some(inner) = self {
            inner.into_children(out);
        }
    }
}

impl<T: IntoChildren> IntoChildren for Vec<T> {
    fn into_children(self, out: &mut Vec<Child>) {
        for item in self {
            item.into_children(out);
        }
    }
}

impl<T: IntoChildren, const N: usize> IntoChildren for [T; N] {
    fn into_children(self, out: &mut Vec<Child>) {
        for item in self {
            item.into_children(out);
        }
    }
}

impl<T: IntoChildren + Clone> IntoChildren for &[T] {
    fn into_children(self, out: &mut Vec<Child>) {
        for item in self {
            item.clone().into_children(out);
        }
    }
}

macro_rules! impl_tuple_children {
    ($($name:ident),+) => {
        impl<$($name: IntoChildren),+> IntoChildren for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_children(self, out: &mut Vec<Child>) {
                let ($($name,)+) = self;
                $($name.into_children(out);)+
            }
        }
    };
}

impl_tuple_children!(A);
impl_tuple_children!(A, B);
impl_tuple_children!(A, B, C);
impl_tuple_children!(A, B, C, D);
impl_tuple_children!(A, B, C, D, E);
impl_tuple_children!(A, B, C, D, E, F);
impl_tuple_children!(A, B, C, D, E, F, G);
impl_tuple_children!(A, B, C, D, E, F, G, H);
impl_tuple_children!(A, B, C, D, E, F, G, H, I);
impl_tuple_children!(A, B, C, D, E, F, G, H, I, J);
impl_tuple_children!(A, B, C, D, E, F, G, H, I, J, K);
impl_tuple_children!(A, B, C, D, E, F, G, H, I, J, K, L);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::{create_element, Props};

    fn flatten(children: impl IntoChildren) -> Vec<Child> {
        let mut out = Vec::new();
        children.into_children(&mut out);
        out
    }

    fn texts(children: &[Child]) -> Vec<&str> {
        children.iter().filter_map(Child::as_text).collect()
    }

    #[test]
    fn nested_sequences_flatten_in_order() {
        let out = flatten(("a", vec![vec!["b", "c"], vec![]], ["d"], Some("e")));
        assert_eq!(texts(&out), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn none_unit_and_bools_are_dropped() {
        let out = flatten((None::<&str>, (), true, false, "x"));
        assert_eq!(texts(&out), vec!["x"]);
    }

    #[test]
    fn numbers_become_text() {
        let out = flatten(("Count: ", 3, ' ', 1.5));
        assert_eq!(texts(&out), vec!["Count: ", "3", " ", "1.5"]);
    }

    #[test]
    fn elements_and_slices() {
        let item = create_element("li", Props::new(), ());
        let shared = vec![Child::Text("t".into())];
        let out = flatten((&item, item.clone(), shared.as_slice()));
        assert_eq!(out.len(), 3);
        assert!(out[0].as_element().is_some_and(|v| v.ptr_eq(&item)));
        assert_eq!(out[2].as_text(), Some("t"));
    }
}
