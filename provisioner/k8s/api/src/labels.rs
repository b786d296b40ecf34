use crate::LabelSelector;
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

/// Labels are kept ordered so that rendered objects are byte-stable.
pub type Map = BTreeMap<String, String>;

/// The label the API server stamps on every namespace with the namespace's own name.
pub const NAMESPACE_NAME: &str = "kubernetes.io/metadata.name";

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

const NAME_REGEX: &str = r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$";
const PREFIX_REGEX: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";

static NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_REGEX).expect("should compile"));
static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PREFIX_REGEX).expect("should compile"));

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("label key must not be empty")]
    EmptyKey,

    #[error(
        "label key prefix must be a DNS subdomain of at most {} characters",
        MAX_PREFIX_LEN
    )]
    InvalidPrefix,

    #[error(
        "label name must be at most {} alphanumeric characters, '-', '_' or '.', beginning and \
         ending with an alphanumeric character",
        MAX_NAME_LEN
    )]
    InvalidName,

    #[error(
        "label value must be empty or at most {} alphanumeric characters, '-', '_' or '.', \
         beginning and ending with an alphanumeric character",
        MAX_NAME_LEN
    )]
    InvalidValue,
}

/// Validates a label key of the form `[prefix/]name`.
pub fn validate_key(key: &str) -> Result<(), LabelError> {
    if key.is_empty() {
        return Err(LabelError::EmptyKey);
    }

    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !PREFIX.is_match(prefix) {
                return Err(LabelError::InvalidPrefix);
            }
            name
        }
        None => key,
    };

    if name.len() > MAX_NAME_LEN || !NAME.is_match(name) {
        return Err(LabelError::InvalidName);
    }

    Ok(())
}

pub fn validate_value(value: &str) -> Result<(), LabelError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LEN || !NAME.is_match(value) {
        return Err(LabelError::InvalidValue);
    }
    Ok(())
}

/// Builds a selector that matches objects carrying all of the given labels.
pub fn match_labels(labels: &Map) -> LabelSelector {
    LabelSelector {
        match_labels: Some(labels.clone()),
        ..Default::default()
    }
}

/// Builds a selector from static label pairs.
pub fn match_static<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> LabelSelector {
    let labels = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    match_labels(&labels)
}
