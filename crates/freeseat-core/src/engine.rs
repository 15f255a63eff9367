//! Acquisition state machine
//!
//! `Init → Resolving → CheckingExistence → Launching → {Satisfied,
//! Succeeded, Retrying, Fatal}`. `Retrying` loops back to `Launching`, or to
//! `CheckingExistence` when the quota ceiling was hit. The transition
//! function is pure over (state, event); the engine drives it with injected
//! collaborators so every path runs under test without real time or I/O.

use std::time::Duration;

use crate::error::{ErrorKind, ProviderError};
use crate::existence::{self, CHECK_SPACING, DEFAULT_ACCEPTED_STATES};
use crate::model::{AcquisitionTarget, InstanceSnapshot, RunOutcome};
use crate::provider::{ComputeProvider, Sleeper, TargetResolver};
use crate::recorder::Recorder;

/// States of the acquisition run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Init,
    Resolving,
    CheckingExistence,
    Launching,
    Retrying,
    Satisfied,
    Succeeded,
    Fatal,
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionState::Satisfied | AcquisitionState::Succeeded | AcquisitionState::Fatal
        )
    }
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AcquisitionState::Init => "init",
            AcquisitionState::Resolving => "resolving",
            AcquisitionState::CheckingExistence => "checking-existence",
            AcquisitionState::Launching => "launching",
            AcquisitionState::Retrying => "retrying",
            AcquisitionState::Satisfied => "satisfied",
            AcquisitionState::Succeeded => "succeeded",
            AcquisitionState::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Classified outcome of the last step, fed to [`transition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    RunStarted,
    TargetResolved,
    ResolutionFailed,
    ExistingFound,
    NothingFound,
    LaunchAccepted,
    /// A retryable error whose back-off has already elapsed
    RetryableAbsorbed,
    QuotaLimitHit,
    BackoffElapsed,
    /// Re-check existing instances after a quota signal
    QuotaRecheck,
    UnrecoverableError,
}

/// Pure transition function over (state, event)
///
/// Terminal states absorb every event. A pair outside the table means the
/// driver broke sequencing; the run degrades to `Fatal` rather than looping
/// in an undefined state.
pub fn transition(state: AcquisitionState, event: StateEvent) -> AcquisitionState {
    use AcquisitionState::*;
    use StateEvent::*;

    match (state, event) {
        (Init, RunStarted) => Resolving,
        (Resolving, TargetResolved) => CheckingExistence,
        (Resolving, ResolutionFailed) => Fatal,
        (CheckingExistence, ExistingFound) => Satisfied,
        (CheckingExistence, NothingFound) => Launching,
        (CheckingExistence, UnrecoverableError) => Fatal,
        (Launching, LaunchAccepted) => Succeeded,
        (Launching, RetryableAbsorbed) | (Launching, QuotaLimitHit) => Retrying,
        (Launching, UnrecoverableError) => Fatal,
        (Retrying, BackoffElapsed) => Launching,
        (Retrying, QuotaRecheck) => CheckingExistence,
        (s, _) if s.is_terminal() => s,
        (s, e) => {
            tracing::error!(state = %s, event = ?e, "transition outside the state table");
            Fatal
        }
    }
}

/// Engine knobs; defaults match the provider's capacity-refill cadence
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Polling tries for the patient existence check
    pub check_tries: u32,
    /// Spacing between polling tries
    pub check_spacing: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_tries: 3,
            check_spacing: CHECK_SPACING,
        }
    }
}

/// Drives one acquisition run to a terminal state
pub struct AcquisitionEngine<P, N, S> {
    provider: P,
    recorder: N,
    sleeper: S,
    config: EngineConfig,
}

impl<P, N, S> AcquisitionEngine<P, N, S>
where
    P: ComputeProvider,
    N: Recorder,
    S: Sleeper,
{
    pub fn new(provider: P, recorder: N, sleeper: S) -> Self {
        Self::with_config(provider, recorder, sleeper, EngineConfig::default())
    }

    pub fn with_config(provider: P, recorder: N, sleeper: S, config: EngineConfig) -> Self {
        Self {
            provider,
            recorder,
            sleeper,
            config,
        }
    }

    /// Run to a terminal state. The recorder is invoked exactly once, at the
    /// terminal transition; recorder failures are logged, never raised over
    /// the outcome being reported.
    pub async fn run(&self, resolver: &dyn TargetResolver) -> RunOutcome {
        let mut state = self.advance(AcquisitionState::Init, StateEvent::RunStarted);

        let target = match resolver.resolve(&self.recorder).await {
            Ok(target) => {
                state = self.advance(state, StateEvent::TargetResolved);
                target
            }
            Err(err) => {
                let _ = self.advance(state, StateEvent::ResolutionFailed);
                return self.fail(err).await;
            }
        };
        tracing::info!(
            shape = %target.shape,
            desired_count = target.desired_count,
            availability_domains = ?target.availability_domains,
            "target resolved"
        );

        // Quick initial probe, not the patient polling used later
        match self.check(&target, 1).await {
            Ok(Some(existing)) => {
                let _ = self.advance(state, StateEvent::ExistingFound);
                return self.satisfied(existing).await;
            }
            Ok(None) => {
                state = self.advance(state, StateEvent::NothingFound);
            }
            Err(err) => {
                let _ = self.advance(state, StateEvent::UnrecoverableError);
                return self.fail(err).await;
            }
        }

        let mut domains = target.availability_domains.iter().cycle();
        loop {
            let Some(availability_domain) = domains.next() else {
                let _ = self.advance(state, StateEvent::UnrecoverableError);
                return self
                    .fail(ProviderError::fatal(
                        "no eligible availability domain to launch into",
                    ))
                    .await;
            };

            tracing::info!(availability_domain = %availability_domain, "attempting launch");
            match self.provider.launch(&target, availability_domain).await {
                Ok(()) => {
                    let _ = self.advance(state, StateEvent::LaunchAccepted);
                    tracing::info!("launch accepted");
                    return self.confirm_launch(&target).await;
                }
                Err(err) if err.kind.is_retryable() => {
                    tracing::info!(
                        code = %err.code,
                        status = ?err.status,
                        "retryable provider error absorbed"
                    );
                    state = self.advance(state, StateEvent::RetryableAbsorbed);
                    // Back-off already elapsed inside the provider call
                    state = self.advance(state, StateEvent::BackoffElapsed);
                }
                Err(err) if err.kind == ErrorKind::LimitExceeded => {
                    tracing::info!(
                        code = %err.code,
                        "quota ceiling reported, re-checking existing instances"
                    );
                    state = self.advance(state, StateEvent::QuotaLimitHit);
                    state = self.advance(state, StateEvent::QuotaRecheck);
                    match self.check(&target, self.config.check_tries).await {
                        Ok(Some(existing)) => {
                            let _ = self.advance(state, StateEvent::ExistingFound);
                            return self.satisfied(existing).await;
                        }
                        Ok(None) => {
                            // Quota may be consumed by something else. Keep
                            // trying; this can spin against a hard ceiling.
                            tracing::warn!(
                                "quota ceiling hit but no matching instance found, \
                                 continuing launch attempts"
                            );
                            state = self.advance(state, StateEvent::NothingFound);
                        }
                        Err(err) => {
                            let _ = self.advance(state, StateEvent::UnrecoverableError);
                            return self.fail(err).await;
                        }
                    }
                }
                Err(err) => {
                    let _ = self.advance(state, StateEvent::UnrecoverableError);
                    return self.fail(err).await;
                }
            }
        }
    }

    /// Patient re-check after an accepted launch, for the authoritative
    /// snapshot. A miss here is benign: the accepted launch is not
    /// guaranteed to be visible in the listing yet, and a later run finds
    /// the instance via the initial probe.
    async fn confirm_launch(&self, target: &AcquisitionTarget) -> RunOutcome {
        match self.check(target, self.config.check_tries).await {
            Ok(Some(snapshot)) => {
                if let Err(err) = self.recorder.record_success(&snapshot).await {
                    tracing::warn!(error = %err, "success record could not be written");
                }
                RunOutcome::Succeeded(Some(snapshot))
            }
            Ok(None) => {
                tracing::info!(
                    "accepted launch not visible in the instance listing yet; \
                     a later run will pick it up"
                );
                if let Err(err) = self.recorder.record_success_pending().await {
                    tracing::warn!(error = %err, "success record could not be written");
                }
                RunOutcome::Succeeded(None)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "instance listing failed after an accepted launch"
                );
                if let Err(err) = self.recorder.record_success_pending().await {
                    tracing::warn!(error = %err, "success record could not be written");
                }
                RunOutcome::Succeeded(None)
            }
        }
    }

    async fn check(
        &self,
        target: &AcquisitionTarget,
        tries: u32,
    ) -> Result<Option<InstanceSnapshot>, ProviderError> {
        existence::find_satisfying(
            &self.provider,
            target,
            &DEFAULT_ACCEPTED_STATES,
            tries,
            self.config.check_spacing,
            &self.sleeper,
        )
        .await
    }

    async fn satisfied(&self, instance: InstanceSnapshot) -> RunOutcome {
        if let Err(err) = self.recorder.record_success(&instance).await {
            tracing::warn!(error = %err, "success record could not be written");
        }
        RunOutcome::Satisfied(instance)
    }

    async fn fail(&self, error: ProviderError) -> RunOutcome {
        tracing::error!(
            code = %error.code,
            status = ?error.status,
            message = %error.message,
            "acquisition run failed"
        );
        if let Err(err) = self.recorder.record_failure(&error).await {
            tracing::warn!(error = %err, "failure record could not be written");
        }
        RunOutcome::Failed(error)
    }

    fn advance(&self, state: AcquisitionState, event: StateEvent) -> AcquisitionState {
        let next = transition(state, event);
        tracing::debug!(from = %state, event = ?event, to = %next, "state transition");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, OUT_OF_HOST_CAPACITY};
    use crate::model::{LifecycleState, Shape};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn running(id: &str, shape: Shape) -> InstanceSnapshot {
        InstanceSnapshot {
            id: id.to_string(),
            display_name: format!("vm-{id}"),
            availability_domain: "xyz:EU-FRANKFURT-1-AD-1".to_string(),
            shape: shape.as_str().to_string(),
            lifecycle_state: LifecycleState::Running,
            time_created: None,
        }
    }

    fn target(shape: Shape, desired_count: u32) -> AcquisitionTarget {
        AcquisitionTarget {
            shape,
            desired_count,
            display_name: "seat".to_string(),
            compartment_id: "ocid1.tenancy.oc1..aaa".to_string(),
            image_id: "ocid1.image.oc1..aaa".to_string(),
            subnet_id: "ocid1.subnet.oc1..aaa".to_string(),
            ssh_public_key: "ssh-ed25519 AAAA".to_string(),
            availability_domains: vec![
                "xyz:EU-FRANKFURT-1-AD-1".to_string(),
                "xyz:EU-FRANKFURT-1-AD-2".to_string(),
            ],
        }
    }

    fn retryable() -> ProviderError {
        ProviderError::classify(Some(429), "TooManyRequests", "slow down")
    }

    fn capacity() -> ProviderError {
        ProviderError::classify(Some(500), "InternalServerError", OUT_OF_HOST_CAPACITY)
    }

    fn quota() -> ProviderError {
        ProviderError::classify(Some(400), "LimitExceeded", "quota consumed")
    }

    fn fatal() -> ProviderError {
        ProviderError::classify(Some(404), "NotAuthorizedOrNotFound", "gone")
    }

    #[derive(Clone, Default)]
    struct ScriptedProvider {
        lists: Arc<Mutex<VecDeque<Result<Vec<InstanceSnapshot>, ProviderError>>>>,
        launches: Arc<Mutex<VecDeque<Result<(), ProviderError>>>>,
        launched_into: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedProvider {
        fn push_list(&self, result: Result<Vec<InstanceSnapshot>, ProviderError>) {
            self.lists.lock().unwrap().push_back(result);
        }

        fn push_launch(&self, result: Result<(), ProviderError>) {
            self.launches.lock().unwrap().push_back(result);
        }

        fn launch_count(&self) -> usize {
            self.launched_into.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ComputeProvider for ScriptedProvider {
        async fn list_instances(
            &self,
            _compartment_id: &str,
        ) -> Result<Vec<InstanceSnapshot>, ProviderError> {
            self.lists
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn launch(
            &self,
            _target: &AcquisitionTarget,
            availability_domain: &str,
        ) -> Result<(), ProviderError> {
            self.launched_into
                .lock()
                .unwrap()
                .push(availability_domain.to_string());
            self.launches
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected launch attempt")
        }
    }

    #[derive(Clone, Default)]
    struct FakeSleeper {
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Sleeper for FakeSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[derive(Clone, Default)]
    struct MemoryRecorder {
        successes: Arc<Mutex<Vec<Option<InstanceSnapshot>>>>,
        failures: Arc<Mutex<Vec<ProviderError>>>,
    }

    #[async_trait]
    impl Recorder for MemoryRecorder {
        async fn record_success(&self, instance: &InstanceSnapshot) -> crate::error::Result<()> {
            self.successes.lock().unwrap().push(Some(instance.clone()));
            Ok(())
        }

        async fn record_success_pending(&self) -> crate::error::Result<()> {
            self.successes.lock().unwrap().push(None);
            Ok(())
        }

        async fn record_failure(&self, error: &ProviderError) -> crate::error::Result<()> {
            self.failures.lock().unwrap().push(error.clone());
            Ok(())
        }

        async fn record_image_list(&self, _images: &serde_json::Value) -> crate::error::Result<()> {
            Ok(())
        }
    }

    struct StaticResolver {
        target: Result<AcquisitionTarget, ProviderError>,
    }

    #[async_trait]
    impl TargetResolver for StaticResolver {
        async fn resolve(
            &self,
            _recorder: &dyn Recorder,
        ) -> Result<AcquisitionTarget, ProviderError> {
            self.target.clone()
        }
    }

    fn engine(
        provider: &ScriptedProvider,
        recorder: &MemoryRecorder,
        sleeper: &FakeSleeper,
    ) -> AcquisitionEngine<ScriptedProvider, MemoryRecorder, FakeSleeper> {
        AcquisitionEngine::new(provider.clone(), recorder.clone(), sleeper.clone())
    }

    fn resolver_for(target: AcquisitionTarget) -> StaticResolver {
        StaticResolver { target: Ok(target) }
    }

    #[test]
    fn transition_table_covers_the_specified_paths() {
        use AcquisitionState::*;
        use StateEvent::*;

        assert_eq!(transition(Init, RunStarted), Resolving);
        assert_eq!(transition(Resolving, TargetResolved), CheckingExistence);
        assert_eq!(transition(Resolving, ResolutionFailed), Fatal);
        assert_eq!(transition(CheckingExistence, ExistingFound), Satisfied);
        assert_eq!(transition(CheckingExistence, NothingFound), Launching);
        assert_eq!(transition(Launching, LaunchAccepted), Succeeded);
        assert_eq!(transition(Launching, RetryableAbsorbed), Retrying);
        assert_eq!(transition(Launching, QuotaLimitHit), Retrying);
        assert_eq!(transition(Launching, UnrecoverableError), Fatal);
        assert_eq!(transition(Retrying, BackoffElapsed), Launching);
        assert_eq!(transition(Retrying, QuotaRecheck), CheckingExistence);
    }

    #[test]
    fn terminal_states_absorb_every_event() {
        use AcquisitionState::*;
        for state in [Satisfied, Succeeded, Fatal] {
            assert_eq!(transition(state, StateEvent::RetryableAbsorbed), state);
            assert_eq!(transition(state, StateEvent::LaunchAccepted), state);
        }
    }

    #[tokio::test]
    async fn existing_instance_satisfies_without_launching() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(vec![running("pre", Shape::A1Flex)]));
        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        match outcome {
            RunOutcome::Satisfied(instance) => assert_eq!(instance.id, "pre"),
            other => panic!("expected Satisfied, got {other:?}"),
        }
        assert_eq!(provider.launch_count(), 0);
        assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        // Two consecutive runs against an account that already has the
        // instance: neither may issue a launch call.
        for _ in 0..2 {
            let provider = ScriptedProvider::default();
            provider.push_list(Ok(vec![running("pre", Shape::A1Flex)]));
            let recorder = MemoryRecorder::default();
            let sleeper = FakeSleeper::default();

            let outcome = engine(&provider, &recorder, &sleeper)
                .run(&resolver_for(target(Shape::A1Flex, 1)))
                .await;

            assert!(matches!(outcome, RunOutcome::Satisfied(_)));
            assert_eq!(provider.launch_count(), 0);
        }
    }

    #[tokio::test]
    async fn micro_with_one_running_instance_satisfies_with_zero_launches() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(vec![running("micro", Shape::E2Micro)]));
        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::E2Micro, 1)))
            .await;

        assert!(matches!(outcome, RunOutcome::Satisfied(_)));
        assert_eq!(provider.launch_count(), 0);
    }

    #[tokio::test]
    async fn first_launch_success_records_the_new_instance() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new())); // initial probe
        provider.push_launch(Ok(()));
        provider.push_list(Ok(vec![running("fresh", Shape::A1Flex)])); // confirm

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        match outcome {
            RunOutcome::Succeeded(Some(instance)) => assert_eq!(instance.id, "fresh"),
            other => panic!("expected Succeeded with snapshot, got {other:?}"),
        }
        assert_eq!(provider.launch_count(), 1);
        let successes = recorder.successes.lock().unwrap();
        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0].as_ref().map(|i| i.id.as_str()), Some("fresh"));
    }

    #[tokio::test]
    async fn invisible_instance_after_accepted_launch_is_benign() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new())); // initial probe
        provider.push_launch(Ok(()));
        // confirm check never observes the instance (3 tries, all empty —
        // the scripted provider defaults to an empty listing)

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        assert_eq!(outcome, RunOutcome::Succeeded(None));
        // pending success still recorded so an operator sees the outcome
        assert_eq!(recorder.successes.lock().unwrap().len(), 1);
        // patient check spaced its three tries with two sleeps
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn retryable_errors_loop_until_acceptance() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new())); // initial probe
        provider.push_launch(Err(retryable()));
        provider.push_launch(Err(capacity()));
        provider.push_launch(Err(retryable()));
        provider.push_launch(Ok(()));
        provider.push_list(Ok(vec![running("fresh", Shape::A1Flex)])); // confirm

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        assert!(matches!(outcome, RunOutcome::Succeeded(Some(_))));
        assert_eq!(provider.launch_count(), 4);
        assert!(recorder.failures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn launch_attempts_cycle_availability_domains() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new()));
        provider.push_launch(Err(capacity()));
        provider.push_launch(Err(capacity()));
        provider.push_launch(Ok(()));
        provider.push_list(Ok(vec![running("fresh", Shape::A1Flex)]));

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        let domains = provider.launched_into.lock().unwrap().clone();
        assert_eq!(
            domains,
            vec![
                "xyz:EU-FRANKFURT-1-AD-1",
                "xyz:EU-FRANKFURT-1-AD-2",
                "xyz:EU-FRANKFURT-1-AD-1",
            ]
        );
    }

    #[tokio::test]
    async fn quota_ceiling_with_existing_instance_satisfies() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new())); // initial probe
        provider.push_launch(Err(quota()));
        provider.push_list(Ok(vec![running("hidden", Shape::A1Flex)])); // recheck

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        match outcome {
            RunOutcome::Satisfied(instance) => assert_eq!(instance.id, "hidden"),
            other => panic!("expected Satisfied, got {other:?}"),
        }
        assert_eq!(provider.launch_count(), 1, "no further launch after quota");
    }

    #[tokio::test]
    async fn quota_ceiling_without_instance_keeps_launching() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new())); // initial probe
        provider.push_launch(Err(quota()));
        // recheck finds nothing (default empty listings), loop continues
        provider.push_launch(Ok(()));
        // confirm listing also empty → Succeeded(None)

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        assert_eq!(outcome, RunOutcome::Succeeded(None));
        assert_eq!(provider.launch_count(), 2);
    }

    #[tokio::test]
    async fn fatal_launch_error_records_a_failure() {
        let provider = ScriptedProvider::default();
        provider.push_list(Ok(Vec::new()));
        provider.push_launch(Err(fatal()));

        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let outcome = engine(&provider, &recorder, &sleeper)
            .run(&resolver_for(target(Shape::A1Flex, 1)))
            .await;

        match outcome {
            RunOutcome::Failed(err) => {
                assert_eq!(err.code, "NotAuthorizedOrNotFound");
                assert_eq!(err.status, Some(404));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        let failures = recorder.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, "NotAuthorizedOrNotFound");
    }

    #[tokio::test]
    async fn resolution_failure_is_fatal_and_recorded() {
        let provider = ScriptedProvider::default();
        let recorder = MemoryRecorder::default();
        let sleeper = FakeSleeper::default();

        let resolver = StaticResolver {
            target: Err(ProviderError::not_found("no image matches Canonical Ubuntu 24.04")),
        };
        let outcome = engine(&provider, &recorder, &sleeper).run(&resolver).await;

        assert!(matches!(outcome, RunOutcome::Failed(_)));
        assert_eq!(provider.launch_count(), 0);
        assert_eq!(recorder.failures.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recorder_errors_never_mask_the_outcome() {
        struct FailingRecorder;

        #[async_trait]
        impl Recorder for FailingRecorder {
            async fn record_success(
                &self,
                _instance: &InstanceSnapshot,
            ) -> crate::error::Result<()> {
                Err(CoreError::Recorder("disk full".to_string()))
            }

            async fn record_success_pending(&self) -> crate::error::Result<()> {
                Err(CoreError::Recorder("disk full".to_string()))
            }

            async fn record_failure(&self, _error: &ProviderError) -> crate::error::Result<()> {
                Err(CoreError::Recorder("disk full".to_string()))
            }

            async fn record_image_list(
                &self,
                _images: &serde_json::Value,
            ) -> crate::error::Result<()> {
                Err(CoreError::Recorder("disk full".to_string()))
            }
        }

        let provider = ScriptedProvider::default();
        provider.push_list(Ok(vec![running("pre", Shape::A1Flex)]));
        let sleeper = FakeSleeper::default();

        let engine = AcquisitionEngine::new(provider.clone(), FailingRecorder, sleeper);
        let outcome = engine.run(&resolver_for(target(Shape::A1Flex, 1))).await;

        assert!(matches!(outcome, RunOutcome::Satisfied(_)));
    }
}
