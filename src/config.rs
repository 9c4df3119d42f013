/*!
# Analyzer Configuration

Optional TOML or YAML file that sets defaults for the CLI:

```toml
[analysis]
grammar = "auto"        # auto | c | java

[output]
format = "text"         # text | json
pretty = true

[intrinsics]
c = ["log_message"]     # extra constant-time routines per grammar
java = ["trace"]
```

Command-line flags override every value here.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::cli_common::OutputFormat;
use crate::core::errors::{AnalyzerError, AnalyzerResult};
use crate::parser::{detect_grammar, detect_grammar_from_path, Grammar};

/// Grammar requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarChoice {
    #[default]
    Auto,
    C,
    Java,
}

impl GrammarChoice {
    /// Explicit choice, else file extension, else marker detection
    pub fn resolve(self, source: &str, path: Option<&Path>) -> AnalyzerResult<Grammar> {
        match self {
            GrammarChoice::C => Ok(Grammar::CLike),
            GrammarChoice::Java => Ok(Grammar::JavaLike),
            GrammarChoice::Auto => match path.and_then(detect_grammar_from_path) {
                Some(grammar) => Ok(grammar),
                None => detect_grammar(source),
            },
        }
    }
}

impl FromStr for GrammarChoice {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(GrammarChoice::Auto);
        }
        Ok(match s.parse::<Grammar>()? {
            Grammar::CLike => GrammarChoice::C,
            Grammar::JavaLike => GrammarChoice::Java,
        })
    }
}

impl fmt::Display for GrammarChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarChoice::Auto => write!(f, "auto"),
            GrammarChoice::C => write!(f, "c"),
            GrammarChoice::Java => write!(f, "java"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub grammar: GrammarChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty: true,
        }
    }
}

/// Extra routine names treated as constant-time, per grammar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrinsicsSection {
    #[serde(default)]
    pub c: Vec<String>,
    #[serde(default)]
    pub java: Vec<String>,
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub intrinsics: IntrinsicsSection,
}

impl AnalyzerConfig {
    /// Loads a `.toml`, `.yaml` or `.yml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config from {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config from {}", path.display()))?
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Intrinsic names must be plain identifiers
    pub fn validate(&self) -> Result<()> {
        let names = self.intrinsics.c.iter().chain(self.intrinsics.java.iter());
        for name in names {
            let mut chars = name.chars();
            let valid = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                anyhow::bail!("Invalid intrinsic name {:?}: expected an identifier", name);
            }
        }
        Ok(())
    }

    pub fn intrinsics_for(&self, grammar: Grammar) -> &[String] {
        match grammar {
            Grammar::CLike => &self.intrinsics.c,
            Grammar::JavaLike => &self.intrinsics.java,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.analysis.grammar, GrammarChoice::Auto);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.pretty);
        assert!(config.intrinsics_for(Grammar::CLike).is_empty());
    }

    #[test]
    fn test_load_toml() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[analysis]\ngrammar = \"java\"\n\n[output]\nformat = \"json\"\n\n[intrinsics]\njava = [\"trace\"]"
        )
        .unwrap();

        let config = AnalyzerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.analysis.grammar, GrammarChoice::Java);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert_eq!(config.intrinsics_for(Grammar::JavaLike), &["trace".to_string()]);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "analysis:\n  grammar: c\noutput:\n  pretty: false").unwrap();

        let config = AnalyzerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.analysis.grammar, GrammarChoice::C);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_invalid_intrinsic_rejected() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[intrinsics]\nc = [\"not valid\"]").unwrap();
        assert!(AnalyzerConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("complexity.toml");
        let mut config = AnalyzerConfig::default();
        config.intrinsics.c.push("log_message".to_string());

        config.save_to_file(&path).unwrap();
        assert_eq!(AnalyzerConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_grammar_choice_resolution() {
        let c_source = "#include <stdio.h>";
        assert_eq!(GrammarChoice::Auto.resolve(c_source, None), Ok(Grammar::CLike));
        assert_eq!(
            GrammarChoice::Auto.resolve("x = 1;", Some(Path::new("Main.java"))),
            Ok(Grammar::JavaLike)
        );
        assert_eq!(
            GrammarChoice::Java.resolve(c_source, None),
            Ok(Grammar::JavaLike)
        );
        assert_eq!(
            GrammarChoice::Auto.resolve("x = 1;", None),
            Err(AnalyzerError::UnsupportedGrammar)
        );
        assert_eq!("AUTO".parse::<GrammarChoice>(), Ok(GrammarChoice::Auto));
        assert_eq!("java-like".parse::<GrammarChoice>(), Ok(GrammarChoice::Java));
    }
}
