//! Environment handling: `${VAR}` substitution inside config values and
//! the environment-variable override layer.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are substituted. `$${VAR}` is an
//! escape for a literal `${VAR}`.

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::schema::{DocentConfig, EmbeddingBackend};

/// `${VAR}`, optionally preceded by an escaping `$`.
static ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex"));

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`. Unset or empty variables are errors.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let out = ENV_REF.replace_all(s, |caps: &regex::Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(out.into_owned())
}

/// Names referenced by `${VAR}` anywhere in `value` (escaped ones excluded).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => {
                for caps in ENV_REF.captures_iter(s) {
                    if caps[1].is_empty() {
                        out.push(caps[2].to_string());
                    }
                }
            }
            Value::Array(arr) => arr.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut vars = Vec::new();
    walk(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

// ---------------------------------------------------------------------------
// Override layer
// ---------------------------------------------------------------------------

fn parse<T: FromStr>(env: &HashMap<String, String>, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
    }
}

fn string(env: &HashMap<String, String>, name: &str) -> Option<String> {
    env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `true`/`1`/`yes`/`on` (any case) are true; anything else is false.
fn flag(env: &HashMap<String, String>, name: &str) -> Option<bool> {
    string(env, name).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
}

/// Apply environment overrides on top of file/default values.
pub fn apply_env_overrides(mut config: DocentConfig, env: &HashMap<String, String>) -> Result<DocentConfig> {
    if let Some(v) = string(env, "DOCENT_BIND") {
        config.server.bind = v;
    }
    if let Some(v) = parse::<u16>(env, "DOCENT_PORT")? {
        config.server.port = v;
    }

    if let Some(v) = string(env, "DOCENT_SOURCE_DIR") {
        config.paths.source_dir = PathBuf::from(v);
    }
    if let Some(v) = string(env, "DOCENT_DATA_DIR") {
        config.paths.data_dir = PathBuf::from(v);
    }
    if let Some(v) = string(env, "DOCENT_LOG_DIR") {
        config.paths.log_dir = Some(PathBuf::from(v));
    }

    if let Some(v) = string(env, "OPENAI_API_KEY") {
        config.chat.openai_api_key = Some(v);
    }
    if let Some(v) = string(env, "OPENAI_BASE_URL") {
        config.chat.openai_base_url = Some(v);
    }
    if let Some(v) = flag(env, "USE_LOCAL_MODEL") {
        config.chat.use_local_model = v;
    }
    if let Some(v) = string(env, "LOCAL_MODEL_NAME") {
        config.chat.local_model = v;
    }
    if let Some(v) = string(env, "OLLAMA_URL") {
        config.chat.ollama_url = v;
    }
    if let Some(v) = string(env, "CHAT_MODEL") {
        config.chat.model = v;
    }

    if let Some(v) = parse::<EmbeddingBackend>(env, "EMBEDDING_BACKEND")? {
        config.embedding.backend = v;
    }
    if let Some(v) = string(env, "EMBEDDING_MODEL") {
        config.embedding.model = Some(v);
    }
    if let Some(v) = parse::<usize>(env, "CHUNK_SIZE")? {
        config.embedding.chunk_size = v;
    }
    if let Some(v) = parse::<usize>(env, "RETRIEVAL_TOP_K")? {
        config.embedding.top_k = v;
    }

    if let Some(v) = flag(env, "ENABLE_SELF_REVIEW") {
        config.review.enabled = v;
    }
    if let Some(v) = string(env, "REVIEW_MODE") {
        config.review.mode = v.to_lowercase();
    }
    if let Some(v) = string(env, "CLASSIFIER_MODEL") {
        config.review.classifier_model = v;
    }
    if let Some(v) = parse::<u32>(env, "TRUST_THRESHOLD")? {
        config.review.trust_threshold = v;
    }

    if let Some(v) = string(env, "TESSERACT_BIN") {
        config.ocr.tesseract_bin = v;
    }
    if let Some(v) = string(env, "PDFTOPPM_BIN") {
        config.ocr.pdftoppm_bin = v;
    }

    if let Some(v) = string(env, "RUST_LOG") {
        config.logging.level = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_vars() {
        let v = json!({"chat": {"openaiApiKey": "${OPENAI_API_KEY}", "ollamaUrl": "http://${HOST}:11434"}});
        let result = resolve_env_vars_with(&v, &env(&[("OPENAI_API_KEY", "sk-abc"), ("HOST", "gpu1")])).unwrap();
        assert_eq!(result["chat"]["openaiApiKey"], "sk-abc");
        assert_eq!(result["chat"]["ollamaUrl"], "http://gpu1:11434");
    }

    #[test]
    fn missing_var_names_path() {
        let v = json!({"chat": {"openaiApiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("chat.openaiApiKey"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "use $${HOME} literally"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "use ${HOME} literally");
        assert!(collect_referenced_vars(&v).is_empty());
    }

    #[test]
    fn overrides_take_precedence() {
        let config = apply_env_overrides(
            DocentConfig::default(),
            &env(&[
                ("USE_LOCAL_MODEL", "TRUE"),
                ("LOCAL_MODEL_NAME", "mistral"),
                ("ENABLE_SELF_REVIEW", "true"),
                ("REVIEW_MODE", "Inline"),
                ("DOCENT_PORT", "8080"),
                ("EMBEDDING_BACKEND", "ollama"),
                ("TRUST_THRESHOLD", "5"),
                ("OPENAI_API_KEY", "  "),
            ]),
        )
        .unwrap();
        assert!(config.chat.use_local_model);
        assert_eq!(config.chat.active_model(), "mistral");
        assert!(config.review.enabled);
        assert_eq!(config.review.mode, "inline");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Ollama);
        assert_eq!(config.review.trust_threshold, 5);
        assert_eq!(config.chat.openai_api_key, None);
    }

    #[test]
    fn bad_number_is_an_error() {
        let err = apply_env_overrides(DocentConfig::default(), &env(&[("DOCENT_PORT", "http")])).unwrap_err();
        assert!(format!("{err:#}").contains("DOCENT_PORT"));
    }

    #[test]
    fn non_true_flag_disables() {
        let config = apply_env_overrides(DocentConfig::default(), &env(&[("ENABLE_SELF_REVIEW", "false")])).unwrap();
        assert!(!config.review.enabled);
    }
}
