//! Resolution of typed file paths.
//!
//! Paths entered at the "open file" prompt may contain `%`, replaced by the current
//! file's path, and may start with `~` or `~user`, expanded to a home directory.

use crate::error::{Result, RlpagerError};
use std::path::{Path, PathBuf};

const PASSWD_FILE: &str = "/etc/passwd";

/// Resolve `input` relative to the currently displayed file
pub fn resolve_path(input: &str, current: Option<&Path>) -> Result<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return Err(RlpagerError::invalid_argument("no file name given"));
    }

    let substituted = substitute_current(input, current)?;
    expand_home(&substituted)
}

/// Replace every `%` with the current file name
pub fn substitute_current(input: &str, current: Option<&Path>) -> Result<String> {
    if !input.contains('%') {
        return Ok(input.to_string());
    }
    let current = current.ok_or_else(|| {
        RlpagerError::invalid_argument("no current file name to substitute for %")
    })?;
    Ok(input.replace('%', &current.to_string_lossy()))
}

/// Expand a leading `~` or `~user`
pub fn expand_home(input: &str) -> Result<PathBuf> {
    let Some(rest) = input.strip_prefix('~') else {
        return Ok(PathBuf::from(input));
    };

    let (user, tail) = match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash + 1..]),
        None => (rest, ""),
    };

    let home = if user.is_empty() {
        dirs::home_dir()
            .ok_or_else(|| RlpagerError::invalid_argument("cannot determine home directory"))?
    } else {
        let passwd = std::fs::read_to_string(PASSWD_FILE)
            .map_err(|e| RlpagerError::file_error("Failed to read user database", e))?;
        passwd_home(&passwd, user)
            .ok_or_else(|| RlpagerError::invalid_argument(format!("unknown user: {}", user)))?
    };

    if tail.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(tail))
    }
}

/// Home directory of `user` in passwd(5) formatted text
pub fn passwd_home(passwd: &str, user: &str) -> Option<PathBuf> {
    passwd
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() >= 6 && fields[0] == user {
                Some(PathBuf::from(fields[5]))
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
# comment:x:1:1::/nowhere:/bin/false
alice:x:1000:1000:Alice,,,:/home/alice:/bin/zsh
";

    #[test]
    fn test_percent_substitution() {
        let current = Path::new("/var/log/app.log");
        assert_eq!(
            substitute_current("%.1", Some(current)).unwrap(),
            "/var/log/app.log.1"
        );
        assert_eq!(substitute_current("plain", None).unwrap(), "plain");
        assert!(substitute_current("%", None).is_err());
    }

    #[test]
    fn test_passwd_lookup() {
        assert_eq!(passwd_home(PASSWD, "alice"), Some(PathBuf::from("/home/alice")));
        assert_eq!(passwd_home(PASSWD, "root"), Some(PathBuf::from("/root")));
        assert_eq!(passwd_home(PASSWD, "comment"), None);
        assert_eq!(passwd_home(PASSWD, "bob"), None);
    }

    #[test]
    fn test_expand_plain_and_tilde() {
        assert_eq!(expand_home("/tmp/x").unwrap(), PathBuf::from("/tmp/x"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~").unwrap(), home);
            assert_eq!(expand_home("~/logs/a.log").unwrap(), home.join("logs/a.log"));
        }
    }

    #[test]
    fn test_resolve_rejects_empty_input() {
        assert!(matches!(
            resolve_path("   ", None),
            Err(RlpagerError::InvalidArgument { .. })
        ));
    }
}
