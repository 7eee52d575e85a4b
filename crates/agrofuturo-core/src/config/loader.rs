//! Environment variable loading helpers.
//!
//! Keeps the fallback chains in one place so callers never repeat
//! `or_else` ladders around `std::env::var`.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory into the process environment.
/// Variables that are already set are left untouched. Runs at most once.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// Load `<dir>/.env` without overriding existing variables.
///
/// Must be called before any thread is spawned: it mutates the process
/// environment.
pub fn load_dotenv_from_dir(dir: &Path) {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_none() {
            env::set_var(key, value);
        }
    }
}

/// Parse `KEY=value` lines. Blank lines, `#` comments and lines without `=`
/// are skipped; matching surrounding quotes are stripped and an unquoted
/// trailing `# comment` is dropped.
pub(crate) fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read `primary`, then each alias; empty values count as unset.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read `primary`, then each alias. Values are trimmed; empty means `None`.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|key| {
            env::var(key).ok().and_then(|s| {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            })
        })
}

/// Boolean env var: `0`/`false`/`no`/`off` are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_basic_pairs() {
        let pairs = parse_dotenv("PORT=9000\n# comment\n\nFRONTEND_PORT = 9090\n");
        assert_eq!(
            pairs,
            vec![
                ("PORT".to_string(), "9000".to_string()),
                ("FRONTEND_PORT".to_string(), "9090".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_dotenv_quotes_and_inline_comment() {
        let pairs = parse_dotenv(
            "A=\"quoted # kept\"\nB='single'\nC=plain # dropped\nexport D=1\nbroken line\n",
        );
        assert_eq!(pairs[0], ("A".to_string(), "quoted # kept".to_string()));
        assert_eq!(pairs[1], ("B".to_string(), "single".to_string()));
        assert_eq!(pairs[2], ("C".to_string(), "plain".to_string()));
        assert_eq!(pairs[3], ("D".to_string(), "1".to_string()));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_load_dotenv_does_not_override() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "AGROFUTURO_TEST_DOTENV_NEW=from_file\nAGROFUTURO_TEST_DOTENV_SET=from_file\n",
        )
        .unwrap();
        env::set_var("AGROFUTURO_TEST_DOTENV_SET", "from_env");
        load_dotenv_from_dir(tmp.path());
        assert_eq!(env::var("AGROFUTURO_TEST_DOTENV_NEW").unwrap(), "from_file");
        assert_eq!(env::var("AGROFUTURO_TEST_DOTENV_SET").unwrap(), "from_env");
    }

    #[test]
    fn test_env_optional_aliases_and_empty() {
        env::set_var("AGROFUTURO_TEST_OPT_PRIMARY", "  ");
        env::set_var("AGROFUTURO_TEST_OPT_ALIAS", "alias");
        assert_eq!(
            env_optional("AGROFUTURO_TEST_OPT_PRIMARY", &["AGROFUTURO_TEST_OPT_ALIAS"]),
            Some("alias".to_string())
        );
        assert_eq!(env_optional("AGROFUTURO_TEST_OPT_MISSING", &[]), None);
        assert_eq!(
            env_or("AGROFUTURO_TEST_OPT_MISSING", &[], || "fallback".to_string()),
            "fallback"
        );
    }

    #[test]
    fn test_env_bool() {
        env::set_var("AGROFUTURO_TEST_BOOL_OFF", "off");
        env::set_var("AGROFUTURO_TEST_BOOL_ON", "1");
        assert!(!env_bool("AGROFUTURO_TEST_BOOL_OFF", &[], true));
        assert!(env_bool("AGROFUTURO_TEST_BOOL_ON", &[], false));
        assert!(env_bool("AGROFUTURO_TEST_BOOL_MISSING", &[], true));
    }
}
