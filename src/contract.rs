//! Recording interactions into a contract, and reading contracts back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::MatchConfig;
use crate::errors::{CaseError, Result};
use crate::interaction::HttpInteraction;
use crate::matchers::{find_unknown_kind, CaseNode};
use crate::results::{combine_results, MatchResult};
use crate::value::AnyData;
use crate::Engine;

pub const CONTRACT_FILE_SUFFIX: &str = ".case.json";
pub const CONTRACT_TYPE: &str = "case::contract";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescription {
    pub consumer_name: String,
    pub provider_name: String,
}

/// One recorded interaction and the states it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExample {
    #[serde(default)]
    pub states: Vec<String>,
    pub interaction: HttpInteraction,
}

impl CaseExample {
    pub fn name(&self, index: usize, engine: &Engine) -> String {
        let root = crate::MatchContext::root(engine.config());
        let states = if self.states.is_empty() {
            String::new()
        } else {
            format!(
                "When {}, ",
                self.states.iter().map(|s| format!("'{s}'")).join(" and ")
            )
        };
        format!("[{index}] {states}{}", self.interaction.describe(&root))
    }
}

/// The on-disk artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractData {
    pub contract_type: String,
    pub description: ContractDescription,
    pub examples: Vec<CaseExample>,
}

/// A contract being recorded by a consumer.
pub struct CaseContract {
    description: ContractDescription,
    examples: Vec<CaseExample>,
    engine: Engine,
    run_id: String,
}

impl CaseContract {
    pub fn new(description: ContractDescription, config: MatchConfig) -> Self {
        let run_id = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis().to_string())
            .unwrap_or_else(|_| "0".to_string());
        Self {
            description,
            examples: Vec::new(),
            engine: Engine::new(config),
            run_id,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn examples(&self) -> &[CaseExample] {
        &self.examples
    }

    pub async fn check_match(&self, expected: &CaseNode, actual: &AnyData) -> Result<MatchResult> {
        self.engine.check_match(expected, actual).await
    }

    pub fn strip_matchers(&self, expected: &CaseNode) -> Result<AnyData> {
        self.engine.strip_matchers(expected)
    }

    /// Adds an example after confirming every matcher in it accepts its own
    /// example. A contradictory matcher would make the contract unverifiable.
    pub async fn record_example(
        &mut self,
        states: Vec<String>,
        interaction: HttpInteraction,
    ) -> Result<()> {
        let request = &interaction.request;
        let response = &interaction.response;
        let nodes = [
            Some(&request.method),
            Some(&request.path),
            request.body.as_ref(),
            Some(&response.status),
            response.body.as_ref(),
        ];
        let mut results = Vec::new();
        for node in nodes.into_iter().flatten() {
            results.push(self.engine.self_verify(node).await?);
        }
        let errors = combine_results(results);
        if !errors.is_empty() {
            return Err(CaseError::Configuration(format!(
                "The matchers in this interaction do not accept their own examples:\n{}",
                errors.iter().map(|e| format!("  {e}")).join("\n")
            )));
        }
        tracing::debug!(states = ?states, "recorded example {}", self.examples.len());
        self.examples.push(CaseExample { states, interaction });
        Ok(())
    }

    pub fn data(&self) -> ContractData {
        ContractData {
            contract_type: CONTRACT_TYPE.to_string(),
            description: self.description.clone(),
            examples: self.examples.clone(),
        }
    }

    /// Writes `<consumer>-<provider>-<run id>.case.json` into `dir` and
    /// returns its path.
    pub fn end_record(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let file_name = format!(
            "{}-{}-{}{CONTRACT_FILE_SUFFIX}",
            slug(&self.description.consumer_name),
            slug(&self.description.provider_name),
            slug(&self.run_id)
        );
        let path = dir.as_ref().join(file_name);
        write_contract(&path, &self.data())?;
        tracing::debug!(path = %path.display(), "contract written");
        Ok(path)
    }
}

/// Lowercases and collapses everything but ASCII alphanumerics into `-`.
fn slug(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .join("-")
}

pub fn write_contract(path: impl AsRef<Path>, data: &ContractData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| CaseError::Core(format!("Unable to serialise contract: {e}")))?;
    if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

pub fn read_contract(path: impl AsRef<Path>) -> Result<ContractData> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        CaseError::Configuration(format!("{} is not valid JSON: {e}", path.display()))
    })?;
    if let Some(unknown) = find_unknown_kind(&value) {
        return Err(unknown);
    }
    let data: ContractData = serde_json::from_value(value).map_err(|e| {
        CaseError::Configuration(format!("{} is not a valid contract: {e}", path.display()))
    })?;
    if data.contract_type != CONTRACT_TYPE {
        return Err(CaseError::Configuration(format!(
            "{} has contract type '{}', expected '{CONTRACT_TYPE}'",
            path.display(),
            data.contract_type
        )));
    }
    Ok(data)
}
