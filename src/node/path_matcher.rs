use std::collections::HashMap;

/// Resource lookup by longest registered prefix.  See [`PathMatcher::lookup`].
#[derive(Debug)]
pub struct PathMatcher<V> {
    map: HashMap<Vec<String>, V>,
}

impl<V> FromIterator<(Vec<String>, V)> for PathMatcher<V> {
    fn from_iter<I: IntoIterator<Item = (Vec<String>, V)>>(iter: I) -> Self {
        Self {
            map: HashMap::from_iter(iter),
        }
    }
}

impl<V> PathMatcher<V> {
    /// Input paths are in the form "/foo/bar".
    pub fn from_path_strings(src: impl IntoIterator<Item = (String, V)>) -> Self {
        src.into_iter()
            .map(|(k, v)| (key_from_path(&k), v))
            .collect()
    }

    /// Most specific registered prefix of `path`.  An exact match is not required.
    pub fn lookup(&self, path: &[String]) -> Option<MatchedResult<V>> {
        (0..path.len() + 1).rev().find_map(|search_depth| {
            self.map
                .get(&path[0..search_depth])
                .map(|value| MatchedResult {
                    value,
                    matched_index: search_depth,
                })
        })
    }
}

pub fn key_from_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Matched value plus how much of the input path it consumed: `&input[matched_index..]` is the
/// unmatched remainder.
pub struct MatchedResult<'a, V> {
    pub value: &'a V,
    pub matched_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(paths: &[&str]) -> PathMatcher<String> {
        PathMatcher::from_path_strings(paths.iter().map(|p| (p.to_string(), p.to_string())))
    }

    #[test]
    fn test_exact_match() {
        let matcher = matcher(&["/actuator/led", "/sensor/temperature"]);
        let result = matcher.lookup(&key_from_path("/actuator/led")).unwrap();
        assert_eq!(result.value, "/actuator/led");
        assert_eq!(result.matched_index, 2);
    }

    #[test]
    fn test_sibling_prefix_does_not_match() {
        let matcher = matcher(&["/actuator/led", "/actuator/buzzer"]);
        assert!(matcher.lookup(&key_from_path("/actuator")).is_none());
    }

    #[test]
    fn test_inexact_match_leaves_suffix() {
        let matcher = matcher(&["/actuator/led"]);
        let path = key_from_path("/actuator/led/blink");
        let result = matcher.lookup(&path).unwrap();
        assert_eq!(result.value, "/actuator/led");
        assert_eq!(path[result.matched_index..].to_vec(), vec!["blink"]);
    }

    #[test]
    fn test_root_registration_catches_everything() {
        let matcher = matcher(&["/"]);
        let result = matcher.lookup(&key_from_path("/anything/at/all")).unwrap();
        assert_eq!(result.matched_index, 0);
    }

    #[test]
    fn test_key_ignores_redundant_slashes() {
        assert_eq!(key_from_path("//cli//stats/"), vec!["cli", "stats"]);
    }
}
