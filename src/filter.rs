//! Entry selection by name and glob pattern.

/// Chooses which entries an extraction or listing covers.
///
/// - No include patterns: every entry is included.
/// - Include pattern with `*` or `?`: glob-matched against the full path.
/// - Plain include pattern: equal to the full path or to the file name.
/// - Exclude pattern: a substring of the path, or a glob match.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl EntryFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn matches(&self, path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|pattern| {
                if has_glob_chars(pattern) {
                    glob_match(pattern, path)
                } else {
                    path == pattern || file_name(path) == pattern
                }
            });

        included
            && !self
                .exclude
                .iter()
                .any(|pattern| path.contains(pattern.as_str()) || glob_match(pattern, path))
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Glob match supporting `*` (any run of characters, `/` included) and `?`
/// (exactly one character).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` and the text index it is currently matched up to
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some(&c) if c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    // Let the star swallow one more character
                    backtrack = Some((star, matched + 1));
                    p = star + 1;
                    t = matched + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
