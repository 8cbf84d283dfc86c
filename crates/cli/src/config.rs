//! `screenflow.toml` loading.
//!
//! ```toml
//! [navigator]
//! max_walk_steps = 500
//! honor_route_automatically = true
//! ```

use std::path::Path;

use serde::Deserialize;

use screenflow_eval::NavigatorConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    navigator: NavigatorConfig,
}

fn parse_config(text: &str, origin: &Path) -> Result<NavigatorConfig, String> {
    toml::from_str::<ConfigFile>(text)
        .map(|file| file.navigator)
        .map_err(|e| format!("error parsing config '{}': {}", origin.display(), e))
}

/// Navigator settings from the optional config file, with command line
/// overrides applied on top.
pub(crate) fn load_navigator_config(
    path: Option<&Path>,
    max_walk_steps: Option<usize>,
) -> Result<NavigatorConfig, String> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("error reading config '{}': {}", path.display(), e))?;
            parse_config(&text, path)?
        }
        None => NavigatorConfig::default(),
    };
    if let Some(limit) = max_walk_steps {
        config.max_walk_steps = limit;
    }
    tracing::debug!(?config, "navigator config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let cfg = parse_config("", Path::new("screenflow.toml")).unwrap();
        assert_eq!(cfg, NavigatorConfig::default());
    }

    #[test]
    fn navigator_table() {
        let cfg = parse_config(
            "[navigator]\nmax_walk_steps = 12\nhonor_route_automatically = false\n",
            Path::new("screenflow.toml"),
        )
        .unwrap();
        assert_eq!(cfg.max_walk_steps, 12);
        assert!(!cfg.honor_route_automatically);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config("[navigator]\nmax_steps = 1\n", Path::new("x.toml")).unwrap_err();
        assert!(err.contains("x.toml"));
        assert!(parse_config("[server]\nport = 1\n", Path::new("x.toml")).is_err());
    }

    #[test]
    fn flag_overrides_file() {
        let cfg = load_navigator_config(None, Some(3)).unwrap();
        assert_eq!(cfg.max_walk_steps, 3);
    }
}
