//! Provider-side replay of a recorded contract.

use std::sync::Arc;

use crate::context::{LogLevel, MatchConfig, MatchContext};
use crate::contract::ContractData;
use crate::errors::{CaseError, Result};
use crate::printer::ResultPrinter;
use crate::results::MatchResult;
use crate::states::StateSetups;
use crate::transport::HttpTransport;
use crate::Engine;

#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    pub base_url: Option<String>,
    /// Run examples whose states have no registered setup instead of failing.
    pub ignore_missing_states: bool,
    pub match_config: MatchConfig,
}

#[derive(Debug, Clone)]
pub struct ExampleOutcome {
    pub name: String,
    pub errors: MatchResult,
}

impl ExampleOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub outcomes: Vec<ExampleOutcome>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(ExampleOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExampleOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }
}

pub struct CaseVerifier {
    config: VerifierConfig,
    setups: StateSetups,
    printer: Arc<dyn ResultPrinter>,
    transport: HttpTransport,
}

impl CaseVerifier {
    pub fn new(
        config: VerifierConfig,
        setups: StateSetups,
        printer: Arc<dyn ResultPrinter>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config.base_url.clone())?;
        Ok(Self {
            config,
            setups,
            printer,
            transport,
        })
    }

    fn should_log(&self, event: LogLevel) -> bool {
        self.config.match_config.log_level.should_log(event)
    }

    fn prepare_states(&self, states: &[String]) -> Result<()> {
        for state in states {
            if self.setups.contains(state) {
                if self.should_log(LogLevel::Debug) {
                    tracing::debug!(state = %state, "running state setup");
                }
                self.setups.run(state)?;
            } else if self.config.ignore_missing_states {
                if self.should_log(LogLevel::Warn) {
                    tracing::warn!(state = %state, "no setup registered for state; continuing anyway");
                }
            } else {
                return Err(CaseError::Configuration(format!(
                    "No state setup registered for '{state}'. Register one, or set ignore_missing_states"
                )));
            }
        }
        Ok(())
    }

    /// Replays every example in order. Mismatches land in the report;
    /// faults stop the run.
    pub async fn verify(&self, contract: &ContractData) -> Result<VerificationReport> {
        let engine = Engine::new(self.config.match_config.clone());
        let root = MatchContext::root(&self.config.match_config);
        let mut report = VerificationReport::default();
        if self.should_log(LogLevel::Debug) {
            tracing::debug!(
                consumer = %contract.description.consumer_name,
                provider = %contract.description.provider_name,
                examples = contract.examples.len(),
                "verifying contract"
            );
        }
        for (index, example) in contract.examples.iter().enumerate() {
            let name = example.name(index, &engine);
            self.prepare_states(&example.states)?;
            let ctx = root.add_location(index);
            let errors = self.transport.verify(&example.interaction, &ctx).await?;
            if errors.is_empty() {
                self.printer.print_success_title(&name)?;
            } else {
                self.printer.print_failure_title(&name)?;
                for error in &errors {
                    self.printer.print_error(error)?;
                }
            }
            report.outcomes.push(ExampleOutcome { name, errors });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;
    use crate::printer::ConsolePrinter;

    fn verifier(ignore_missing_states: bool) -> CaseVerifier {
        CaseVerifier::new(
            VerifierConfig {
                base_url: Some("http://localhost:1".into()),
                ignore_missing_states,
                ..VerifierConfig::default()
            },
            StateSetups::new(),
            Arc::new(ConsolePrinter::new(Vec::new())),
        )
        .unwrap()
    }

    /// Collects formatted tracing output while `f` runs.
    fn captured_logs(f: impl FnOnce()) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || SharedBuffer(sink.clone()))
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn skipped_state_warnings_follow_the_configured_level() {
        let states = vec!["a user exists".to_string()];
        let at = |log_level| {
            let mut v = verifier(true);
            v.config.match_config.log_level = log_level;
            captured_logs(|| v.prepare_states(&states).unwrap())
        };
        assert!(at(LogLevel::Warn).contains("no setup registered for state"));
        assert_eq!(at(LogLevel::Error), "");
    }

    #[test]
    fn missing_states_fail_unless_ignored() {
        let states = vec!["a user exists".to_string()];
        assert!(matches!(
            verifier(false).prepare_states(&states),
            Err(CaseError::Configuration(_))
        ));
        assert!(verifier(true).prepare_states(&states).is_ok());
    }
}
