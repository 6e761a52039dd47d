use std::collections::HashMap;

use itertools::Itertools;

pub type Bindings = HashMap<String, f64>;

pub trait IntoBindings {
    fn bind(self) -> Bindings;
}

impl<N: Into<String>> IntoBindings for (N, f64) {
    fn bind(self) -> Bindings {
        let (name, value) = self;
        let mut map = HashMap::new();
        map.insert(name.into(), value);
        map
    }
}

impl<N: Into<String> + Clone> IntoBindings for &[(N, f64)] {
    fn bind(self) -> Bindings {
        self.iter()
            .map(|(name, value)| (name.clone().into(), *value))
            .collect()
    }
}

impl<N: Into<String>, const K: usize> IntoBindings for [(N, f64); K] {
    fn bind(self) -> Bindings {
        self.into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect()
    }
}

fn replace_word(text: &str, name: &str, replacement: &str) -> String {
    if name.is_empty() {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(name) {
        let end = start + name.len();
        let left = text[..start].ends_with(' ');
        let right = text[end..].starts_with(|c: char| c == ' ' || c == ')');
        if left && right {
            out.push_str(&text[last..start]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Rewrites every whole-word occurrence of a bound name in `text` with its
/// value. A word is bounded by a space on the left and a space or `)` on the
/// right, so operator heads right after `(` are never touched. Names are
/// applied in sorted order.
pub fn substitute(text: &str, bindings: &Bindings) -> String {
    bindings
        .iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .fold(text.to_owned(), |text, (name, value)| {
            replace_word(&text, name, &value.to_string())
        })
}
