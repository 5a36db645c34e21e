//! `${VAR}` and `${VAR:-default}` references in path-valued settings.

use std::borrow::Cow;

use crate::ConfigError;

/// Marker returned by a lookup for a variable that is not set.
struct Unset;

/// Expand references in `value` from the process environment.
///
/// `field` names the setting in errors, e.g. `pdf.chrome_path`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |name| std::env::var(name).ok())
}

/// Expand references in `value` using `lookup` for variable values.
///
/// Strings without `${` are returned untouched, so a bare `$` in a path
/// never needs escaping.
fn expand_with(
    value: &str,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| lookup(name).map(Some).ok_or(Unset))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_templates_dir_under_variable_root() {
        let env = vars(&[("QUIRE_HOME", "/srv/quire")]);
        assert_eq!(
            expand_with("${QUIRE_HOME}/templates", "storage.templates_dir", env).unwrap(),
            "/srv/quire/templates"
        );
    }

    #[test]
    fn test_default_only_when_unset() {
        let path = "${CHROME:-/usr/bin/chromium}";
        assert_eq!(
            expand_with(path, "pdf.chrome_path", vars(&[])).unwrap(),
            "/usr/bin/chromium"
        );
        assert_eq!(
            expand_with(path, "pdf.chrome_path", vars(&[("CHROME", "/opt/chrome")])).unwrap(),
            "/opt/chrome"
        );
    }

    #[test]
    fn test_unset_without_default_names_field_and_variable() {
        let err = expand_with("${CHROME}", "pdf.chrome_path", vars(&[])).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in pdf.chrome_path: ${CHROME} not set"
        );
    }

    #[test]
    fn test_paths_without_references_untouched() {
        let env = vars(&[("HOME", "/home/q")]);
        assert_eq!(expand_with("templates", "f", &env).unwrap(), "templates");
        assert_eq!(expand_with("$HOME/quire", "f", &env).unwrap(), "$HOME/quire");
    }

    #[test]
    fn test_process_environment_is_used() {
        let Ok(path) = std::env::var("PATH") else {
            return;
        };
        assert_eq!(expand_env("${PATH}", "f").unwrap(), path);
    }
}
