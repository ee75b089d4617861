//! `list` command: print the values of several credentials at once.

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Comma separated secret names
    #[arg(short = 'l', long, short_alias = 's', value_delimiter = ',')]
    pub secret_names: Vec<String>,

    /// Use the `secrets` list from the configuration file
    #[arg(short, long)]
    pub from_config: bool,

    /// Print a JSON object of name to value
    #[arg(long, conflicts_with = "as_tfvars")]
    pub as_json: bool,

    /// Print TF_VAR_<name>=<value> lines
    #[arg(long)]
    pub as_tfvars: bool,

    /// Replacement for '-' in variable names printed by --as-tfvars
    #[arg(long, default_value = "_")]
    pub override_replace_string: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Plain,
    Json,
    TfVars,
}

impl ListArgs {
    pub fn format(&self) -> ListFormat {
        if self.as_json {
            ListFormat::Json
        } else if self.as_tfvars {
            ListFormat::TfVars
        } else {
            ListFormat::Plain
        }
    }

    /// Names to list: the flag wins unless `--from-config` was given or the
    /// flag is empty.
    pub fn names(&self, config: &Config) -> Result<Vec<String>> {
        let names: Vec<String> = if self.from_config || self.secret_names.is_empty() {
            config.secrets.clone()
        } else {
            self.secret_names.clone()
        };

        let names: Vec<String> =
            names.into_iter().map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            anyhow::bail!(
                "No secret names to list. Pass --secret-names or set 'secrets' in the configuration"
            );
        }
        Ok(names)
    }
}

/// Terraform variable name for a secret.
pub fn tfvar_name(name: &str, replace: &str) -> String {
    format!("TF_VAR_{}", name.replace('-', replace))
}

/// Render listed values. `names` and `values` are parallel.
pub fn render(names: &[String], values: &[String], format: ListFormat, replace: &str) -> Result<String> {
    let rendered = match format {
        ListFormat::Plain => values.join("\n"),
        ListFormat::Json => {
            let object: Map<String, Value> = names
                .iter()
                .zip(values)
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            serde_json::to_string_pretty(&Value::Object(object))?
        }
        ListFormat::TfVars => names
            .iter()
            .zip(values)
            .map(|(name, value)| format!("{}={}", tfvar_name(name, replace), value))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ListArgs {
        ListArgs {
            secret_names: vec![],
            from_config: false,
            as_json: false,
            as_tfvars: false,
            override_replace_string: "_".into(),
        }
    }

    #[test]
    fn test_names_prefer_flag() {
        let config = Config { secrets: vec!["from-config".into()], ..Default::default() };
        let args = ListArgs { secret_names: vec!["a".into(), " b ".into()], ..args() };
        assert_eq!(args.names(&config).unwrap(), vec!["a", "b"]);

        let args = ListArgs { from_config: true, ..args };
        assert_eq!(args.names(&config).unwrap(), vec!["from-config"]);
    }

    #[test]
    fn test_names_required() {
        assert!(args().names(&Config::default()).is_err());
    }

    #[test]
    fn test_render_formats() {
        let names = vec!["api-token".to_string(), "db-pass".to_string()];
        let values = vec!["one".to_string(), "two".to_string()];

        assert_eq!(render(&names, &values, ListFormat::Plain, "_").unwrap(), "one\ntwo");
        assert_eq!(
            render(&names, &values, ListFormat::TfVars, "_").unwrap(),
            "TF_VAR_api_token=one\nTF_VAR_db_pass=two"
        );

        let json: Value =
            serde_json::from_str(&render(&names, &values, ListFormat::Json, "_").unwrap()).unwrap();
        assert_eq!(json["api-token"], "one");
        assert_eq!(json["db-pass"], "two");
    }

    #[test]
    fn test_tfvar_name_override() {
        assert_eq!(tfvar_name("my-secret-name", ""), "TF_VAR_mysecretname");
    }
}
