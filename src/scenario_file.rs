//! Scenario and site file loading.
//!
//! The engine consumes parsed structures only; files are a CLI
//! concern. JSON and YAML are both accepted, keyed on extension.

use anyhow::{bail, Context, Result};
use browser_session::SiteModel;
use pageproof_core_types::Scenario;
use serde::de::DeserializeOwned;
use std::path::Path;

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let scenario: Scenario = load(path)?;
    if scenario.steps.is_empty() {
        bail!("scenario {:?} has no steps", scenario.name);
    }
    Ok(scenario)
}

pub fn load_site(path: &Path) -> Result<SiteModel> {
    load(path)
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid yaml in {}", path.display()))?,
        _ => serde_json::from_str(&raw)
            .with_context(|| format!("invalid json in {}", path.display()))?,
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_json_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("login.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
              "name": "login",
              "steps": [
                {{"kind": "navigate", "url": "/login"}},
                {{"kind": "fill", "target": {{"kind": "by_label", "text": "Email"}}, "value": "a@b.com"}},
                {{"kind": "click", "target": {{"kind": "by_role", "role": "button", "name": "Login"}}}},
                {{"kind": "assert_visible", "target": {{"kind": "by_text", "text": "Dashboard"}}}}
              ]
            }}"#
        )
        .unwrap();

        let scenario = load_scenario(&path).unwrap();
        assert_eq!(scenario.name, "login");
        assert_eq!(scenario.steps.len(), 4);
    }

    #[test]
    fn empty_scenario_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"name":"empty","steps":[]}"#).unwrap();
        assert!(load_scenario(&path).is_err());
    }
}
