use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn has_wildcards(value: &str) -> bool {
    value.contains(['*', '?', '['])
}

/// Translates a shell wildcard pattern into an anchored regex. Wildcards never cross `/`.
fn pattern_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '[' => {
                regex.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    regex.push('^');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    if c == '\\' {
                        regex.push('\\');
                    }
                    regex.push(c);
                }
                regex.push(']');
            }
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    Regex::new(&regex)
}

/// Expands a wildcard pattern against the local filesystem, returning sorted matches.
/// A pattern without wildcards matches itself when the path exists.
pub fn glob(pattern: &str) -> Result<Vec<PathBuf>, regex::Error> {
    if !has_wildcards(pattern) {
        return Ok(if Path::new(pattern).exists() {
            vec![PathBuf::from(pattern)]
        } else {
            Vec::new()
        });
    }

    let components: Vec<&str> = pattern.split('/').collect();
    let fixed = components.iter().take_while(|c| !has_wildcards(c)).count();
    let depth = components.len() - fixed;
    let base = match components[..fixed].join("/") {
        base if !base.is_empty() => base,
        _ if pattern.starts_with('/') => "/".to_string(),
        _ => ".".to_string(),
    };

    let regex = pattern_to_regex(pattern)?;
    let mut matches: Vec<PathBuf> = WalkDir::new(&base)
        .min_depth(depth)
        .max_depth(depth)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.into_path();
            match path.strip_prefix("./") {
                Ok(relative) if base == "." => relative.to_path_buf(),
                _ => path,
            }
        })
        .filter(|path| path.to_str().is_some_and(|p| regex.is_match(p)))
        .collect();
    matches.sort();
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_pattern_translation() {
        let regex = pattern_to_regex("/data/*.r?w").unwrap();
        assert!(regex.is_match("/data/input.raw"));
        assert!(!regex.is_match("/data/sub/input.raw"));

        let regex = pattern_to_regex("/data/[!x]*.dst").unwrap();
        assert!(regex.is_match("/data/a.dst"));
        assert!(!regex.is_match("/data/x.dst"));
    }

    #[test]
    fn test_glob_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.sim", "a.sim", "c.dst"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/d.sim"), b"x").unwrap();

        let pattern = format!("{}/*.sim", dir.path().display());
        let matches = glob(&pattern).unwrap();
        assert_eq!(
            matches,
            vec![dir.path().join("a.sim"), dir.path().join("b.sim")]
        );

        let pattern = format!("{}/*/*.sim", dir.path().display());
        assert_eq!(glob(&pattern).unwrap(), vec![dir.path().join("nested/d.sim")]);
    }

    #[test]
    fn test_literal_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.sim");
        fs::write(&file, b"x").unwrap();
        assert_eq!(glob(file.to_str().unwrap()).unwrap(), vec![file]);
        assert!(glob(dir.path().join("b.sim").to_str().unwrap())
            .unwrap()
            .is_empty());
    }
}
