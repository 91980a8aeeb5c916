//! tsbind_options: compiler options recognized by the binder.
//!
//! Options are read from a tsconfig.json `compilerOptions` object. Every
//! option is tri-state (`None` means unset) because several options treat
//! "unset" differently from `false`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Errors from loading a tsconfig.json.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Compiler Options
// ============================================================================

/// The binder-relevant subset of tsconfig `compilerOptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ScriptTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unreachable_code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unused_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_fallthrough_cases_in_switch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_const_enums: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolated_modules: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbatim_module_syntax: Option<bool>,
}

impl CompilerOptions {
    /// Effective language level.
    pub fn emit_script_target(&self) -> ScriptTarget {
        if let Some(target) = self.target {
            return target;
        }
        match self.module {
            Some(ModuleKind::Node16 | ModuleKind::Node18) => ScriptTarget::ES2022,
            Some(ModuleKind::NodeNext) => ScriptTarget::ESNext,
            _ => ScriptTarget::ES5,
        }
    }

    /// Whether every non-declaration file is bound in strict mode.
    pub fn bind_in_strict_mode(&self) -> bool {
        self.always_strict == Some(true) || self.strict == Some(true)
    }

    pub fn should_preserve_const_enums(&self) -> bool {
        self.preserve_const_enums == Some(true) || self.isolated_modules == Some(true)
    }

    /// Unreachable code is reported at all unless explicitly allowed.
    pub fn reports_unreachable_code(&self) -> bool {
        self.allow_unreachable_code != Some(true)
    }

    /// `allowUnreachableCode: false` upgrades the report from a suggestion.
    pub fn unreachable_code_is_error(&self) -> bool {
        self.allow_unreachable_code == Some(false)
    }

    pub fn reports_unused_labels(&self) -> bool {
        self.allow_unused_labels != Some(true)
    }

    pub fn unused_label_is_error(&self) -> bool {
        self.allow_unused_labels == Some(false)
    }

    pub fn no_fallthrough_cases_in_switch(&self) -> bool {
        self.no_fallthrough_cases_in_switch == Some(true)
    }
}

// ============================================================================
// Script Target / Module Kind
// ============================================================================

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.to_ascii_lowercase();
                match lower.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!("unknown {} '{}'", stringify!($name), s)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// Language level. Ordered, so `target >= ScriptTarget::ES2015` reads naturally.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum ScriptTarget {
        ES3 => "es3",
        ES5 => "es5",
        ES2015 => "es2015",
        ES2016 => "es2016",
        ES2017 => "es2017",
        ES2018 => "es2018",
        ES2019 => "es2019",
        ES2020 => "es2020",
        ES2021 => "es2021",
        ES2022 => "es2022",
        ES2023 => "es2023",
        ES2024 => "es2024",
        ESNext => "esnext",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ModuleKind {
        None => "none",
        CommonJS => "commonjs",
        AMD => "amd",
        UMD => "umd",
        System => "system",
        ES2015 => "es2015",
        ES2020 => "es2020",
        ES2022 => "es2022",
        ESNext => "esnext",
        Node16 => "node16",
        Node18 => "node18",
        NodeNext => "nodenext",
        Preserve => "preserve",
    }
}

// ============================================================================
// tsconfig.json
// ============================================================================

/// The parts of tsconfig.json the binder reads; other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

/// Parse a tsconfig.json from a string.
pub fn parse_tsconfig(content: &str) -> Result<TsConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a tsconfig.json from a path.
pub fn parse_tsconfig_file(path: &Path) -> Result<TsConfig, ConfigError> {
    tracing::debug!(path = %path.display(), "reading tsconfig");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tsconfig(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(json: &str) -> CompilerOptions {
        match parse_tsconfig(json) {
            Ok(config) => config.compiler_options,
            Err(e) => panic!("Expected valid tsconfig, got {}", e),
        }
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    #[test]
    fn test_parse_camel_case_options() {
        let opts = options(
            r#"{ "compilerOptions": { "target": "ES2015", "allowUnreachableCode": false, "noFallthroughCasesInSwitch": true } }"#,
        );
        assert_eq!(opts.target, Some(ScriptTarget::ES2015));
        assert_eq!(opts.allow_unreachable_code, Some(false));
        assert!(opts.no_fallthrough_cases_in_switch());
        assert_eq!(opts.strict, None);
    }

    #[test]
    fn test_target_is_case_insensitive() {
        assert_eq!("esnext".parse::<ScriptTarget>(), Ok(ScriptTarget::ESNext));
        assert_eq!("ESNext".parse::<ScriptTarget>(), Ok(ScriptTarget::ESNext));
        assert_eq!("NodeNext".parse::<ModuleKind>(), Ok(ModuleKind::NodeNext));
        assert!("es1".parse::<ScriptTarget>().is_err());
    }

    #[test]
    fn test_missing_compiler_options_uses_defaults() {
        let opts = options("{}");
        assert_eq!(opts, CompilerOptions::default());
    }

    #[test]
    fn test_invalid_target_is_error() {
        let result = parse_tsconfig(r#"{ "compilerOptions": { "target": "es1" } }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = parse_tsconfig_file(Path::new("/nonexistent/tsconfig.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_options_json_roundtrip_keeps_unset() {
        let opts = CompilerOptions {
            target: Some(ScriptTarget::ES2022),
            allow_unused_labels: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(json, r#"{"target":"es2022","allowUnusedLabels":false}"#);
        let back: CompilerOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
    }

    // ========================================================================
    // Derived accessors
    // ========================================================================

    #[test]
    fn test_emit_script_target_defaults() {
        assert_eq!(CompilerOptions::default().emit_script_target(), ScriptTarget::ES5);
        let node16 = CompilerOptions {
            module: Some(ModuleKind::Node16),
            ..Default::default()
        };
        assert_eq!(node16.emit_script_target(), ScriptTarget::ES2022);
        let nodenext = CompilerOptions {
            module: Some(ModuleKind::NodeNext),
            ..Default::default()
        };
        assert_eq!(nodenext.emit_script_target(), ScriptTarget::ESNext);
        assert!(ScriptTarget::ES2015 > ScriptTarget::ES5);
    }

    #[test]
    fn test_strict_mode_sources() {
        assert!(!CompilerOptions::default().bind_in_strict_mode());
        assert!(options(r#"{ "compilerOptions": { "strict": true } }"#).bind_in_strict_mode());
        assert!(options(r#"{ "compilerOptions": { "alwaysStrict": true } }"#).bind_in_strict_mode());
    }

    #[test]
    fn test_unreachable_code_tri_state() {
        let unset = CompilerOptions::default();
        assert!(unset.reports_unreachable_code() && !unset.unreachable_code_is_error());
        let denied = options(r#"{ "compilerOptions": { "allowUnreachableCode": false } }"#);
        assert!(denied.reports_unreachable_code() && denied.unreachable_code_is_error());
        let allowed = options(r#"{ "compilerOptions": { "allowUnreachableCode": true } }"#);
        assert!(!allowed.reports_unreachable_code());
    }

    #[test]
    fn test_preserve_const_enums_via_isolated_modules() {
        let opts = options(r#"{ "compilerOptions": { "isolatedModules": true } }"#);
        assert!(opts.should_preserve_const_enums());
        assert!(!CompilerOptions::default().should_preserve_const_enums());
    }
}
