//! Support for `-c key=value` overrides of the select configuration.
//!
//! [`CliConfigOverrides`] is meant to be embedded into a `clap`-derived CLI
//! struct with `#[clap(flatten)]`. Each `-c key=value` (or
//! `--config key=value`) is kept as a raw string until the caller turns the
//! whole set into a TOML table that sits between the config file and the
//! dedicated CLI flags.

use clap::ArgAction;
use clap::Parser;
use toml::Table;
use toml::Value;

#[derive(Parser, Debug, Default, Clone)]
pub struct CliConfigOverrides {
    /// Override a value from `~/.rapid-select/config.toml`. Use a dotted path
    /// (`foo.bar`) for nested tables. The value is parsed as TOML; anything
    /// that does not parse is taken as a literal string.
    ///
    /// Examples:
    ///   - `-c quiet_millis=150`
    ///   - `-c results_key=items`
    ///   - `-c 'placeholder="Find a group"'`
    #[arg(
        short = 'c',
        long = "config",
        value_name = "key=value",
        action = ArgAction::Append,
        global = true,
    )]
    pub raw_overrides: Vec<String>,
}

impl CliConfigOverrides {
    /// Split each raw override into `(path, value)`.
    pub fn parse_overrides(&self) -> Result<Vec<(String, Value)>, String> {
        self.raw_overrides
            .iter()
            .map(|raw| {
                // Values may themselves contain '='.
                let Some((key, value)) = raw.split_once('=') else {
                    return Err(format!("Invalid override (missing '='): {raw}"));
                };
                let key = key.trim();
                if key.is_empty() {
                    return Err(format!("Empty key in override: {raw}"));
                }
                Ok((key.to_string(), parse_toml_value(value.trim())))
            })
            .collect()
    }

    /// Build a table containing only the overrides.
    pub fn to_table(&self) -> Result<Table, String> {
        let mut table = Table::new();
        self.apply_on_table(&mut table)?;
        Ok(table)
    }

    /// Write every override into `target`, creating intermediate tables and
    /// replacing whatever sat at the destination path.
    pub fn apply_on_table(&self, target: &mut Table) -> Result<(), String> {
        for (path, value) in self.parse_overrides()? {
            apply_single_override(target, &path, value);
        }
        Ok(())
    }
}

fn parse_toml_value(raw: &str) -> Value {
    format!("value = {raw}")
        .parse::<Table>()
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn apply_single_override(root: &mut Table, path: &str, value: Value) {
    let mut parts: Vec<&str> = path.split('.').collect();
    let Some(leaf) = parts.pop() else {
        return;
    };

    let mut current = root;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(leaf.to_string(), value);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use pretty_assertions::assert_eq;

    fn overrides(raw: &[&str]) -> CliConfigOverrides {
        CliConfigOverrides {
            raw_overrides: raw.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn values_are_parsed_as_toml() {
        let table = overrides(&["quiet_millis=150", "multi=true", "placeholder=\"Find\""])
            .to_table()
            .unwrap();
        assert_eq!(Some(&Value::Integer(150)), table.get("quiet_millis"));
        assert_eq!(Some(&Value::Boolean(true)), table.get("multi"));
        assert_eq!(
            Some(&Value::String("Find".to_string())),
            table.get("placeholder")
        );
    }

    #[test]
    fn unparseable_values_become_strings() {
        let table = overrides(&["endpoint=https://example.com/search?q="])
            .to_table()
            .unwrap();
        assert_eq!(
            Some(&Value::String("https://example.com/search?q=".to_string())),
            table.get("endpoint")
        );
    }

    #[test]
    fn dotted_paths_create_nested_tables() {
        let mut table: Table = "scalar = 1\n[headers]\naccept = \"json\"".parse().unwrap();
        assert_eq!(Some(&Value::Integer(1)), table.get("scalar"));
        overrides(&["headers.token=abc", "scalar.inner=2"])
            .apply_on_table(&mut table)
            .unwrap();

        let expected: Table =
            "[headers]\naccept = \"json\"\ntoken = \"abc\"\n[scalar]\ninner = 2"
                .parse()
                .unwrap();
        assert_eq!(expected, table);
    }

    #[test]
    fn missing_equals_or_key_is_rejected() {
        assert!(overrides(&["multi"]).parse_overrides().is_err());
        assert!(overrides(&["=1"]).parse_overrides().is_err());
    }
}
