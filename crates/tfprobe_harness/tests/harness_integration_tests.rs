//! Integration tests for the harness and the staged apply scenario.

use std::path::PathBuf;
use std::sync::Arc;

use tfprobe_exec::{MockExecutor, MockResponse};
use tfprobe_harness::{StagedApply, TestHarness, TestOutcome};
use tfprobe_terraform::{Options, Terraform};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/unit-test")
}

fn terraform_over(executor: &MockExecutor) -> Terraform {
    Terraform::new(Arc::new(executor.clone()))
}

#[tokio::test]
async fn test_staged_apply_orders_bootstrap_before_full_apply() {
    let executor = MockExecutor::new();
    let terraform = terraform_over(&executor);

    let report = StagedApply::new(fixture_path())
        .bootstrap_target("module.vpc")
        .execute(&terraform)
        .await
        .unwrap();

    assert!(report.passed());

    // init+apply for the bootstrap stage, init+apply for the full stack,
    // then the deferred destroy.
    assert_eq!(
        executor.subcommands(),
        vec!["init", "apply", "init", "apply", "destroy"]
    );

    let applies = executor.invocations_of("apply");
    assert!(applies[0].args.contains(&"-target=module.vpc".to_string()));
    assert!(!applies[1].args.iter().any(|a| a.starts_with("-target")));
}

#[tokio::test]
async fn test_destroy_runs_when_the_full_apply_fails() {
    let executor = MockExecutor::new()
        .respond_to("apply", MockResponse::success("Apply complete! Resources: 1 added, 0 changed, 0 destroyed."))
        .respond_to("apply", MockResponse::failure(1, "Error: Unsupported argument"))
        .respond_to(
            "destroy",
            MockResponse::success("Destroy complete! Resources: 1 destroyed."),
        );
    let terraform = terraform_over(&executor);

    let report = StagedApply::new(fixture_path())
        .bootstrap_target("module.vpc")
        .execute(&terraform)
        .await
        .unwrap();

    assert!(!report.passed());
    assert!(matches!(report.outcome, TestOutcome::Failed(_)));
    assert!(executor.was_invoked("destroy"));
    assert!(report.teardown_failures.is_empty());
}

#[tokio::test]
async fn test_destroy_runs_when_the_bootstrap_fails() {
    let executor = MockExecutor::new()
        .respond_to("apply", MockResponse::failure(1, "Error: Invalid reference"))
        .respond_to(
            "destroy",
            MockResponse::success("Destroy complete! Resources: 0 destroyed."),
        );
    let terraform = terraform_over(&executor);

    let report = StagedApply::new(fixture_path())
        .bootstrap_target("module.vpc")
        .execute(&terraform)
        .await
        .unwrap();

    match &report.outcome {
        TestOutcome::Failed(message) => assert!(message.contains("Bootstrap")),
        other => panic!("expected a bootstrap failure, got {:?}", other),
    }
    // The full-stack apply was never attempted, but cleanup still ran.
    assert_eq!(executor.invocations_of("apply").len(), 1);
    assert!(executor.was_invoked("destroy"));
}

#[tokio::test]
async fn test_teardown_runs_when_the_body_panics() {
    let executor = MockExecutor::new();
    let terraform = terraform_over(&executor);

    let harness = TestHarness::new(terraform)
        .defer_destroy("full stack", Options::new(fixture_path()));

    let report = harness
        .run(|_terraform| async move { panic!("boom") })
        .await;

    match &report.outcome {
        TestOutcome::Panicked(message) => assert!(message.contains("boom")),
        other => panic!("expected a panic outcome, got {:?}", other),
    }
    assert!(executor.was_invoked("destroy"));
}

#[tokio::test]
async fn test_teardowns_run_in_lifo_order() {
    let executor = MockExecutor::new();
    let terraform = terraform_over(&executor);

    let first = Options::new(fixture_path()).target("module.vpc");
    let second = Options::new(fixture_path());

    let report = TestHarness::new(terraform)
        .defer_destroy("vpc only", first)
        .defer_destroy("full stack", second)
        .run(|_terraform| async move { Ok(()) })
        .await;

    assert!(report.passed());

    let destroys = executor.invocations_of("destroy");
    assert_eq!(destroys.len(), 2);
    // Registered second, destroyed first: the full-stack options carry no
    // target restriction.
    assert!(!destroys[0].args.iter().any(|a| a.starts_with("-target")));
    assert!(destroys[1].args.contains(&"-target=module.vpc".to_string()));
}

#[tokio::test]
async fn test_teardown_failure_fails_the_run_but_does_not_stop_others() {
    let executor = MockExecutor::new()
        .respond_to("destroy", MockResponse::failure(1, "Error: dependency in use"))
        .respond_to(
            "destroy",
            MockResponse::success("Destroy complete! Resources: 1 destroyed."),
        );
    let terraform = terraform_over(&executor);

    let report = TestHarness::new(terraform)
        .defer_destroy("first", Options::new(fixture_path()))
        .defer_destroy("second", Options::new(fixture_path()))
        .run(|_terraform| async move { Ok(()) })
        .await;

    assert!(!report.passed());
    assert_eq!(report.outcome, TestOutcome::Passed);
    assert_eq!(report.teardown_failures.len(), 1);
    assert_eq!(report.teardown_failures[0].label, "second");
    assert_eq!(executor.invocations_of("destroy").len(), 2);
}

#[tokio::test]
async fn test_rerun_after_destroy_converges_to_the_same_end_state() {
    // Destroying an already-destroyed stack reports zero resources; the
    // sequence is idempotent.
    let executor = MockExecutor::new()
        .respond_to(
            "destroy",
            MockResponse::success("Destroy complete! Resources: 2 destroyed."),
        )
        .respond_to(
            "destroy",
            MockResponse::success("Destroy complete! Resources: 0 destroyed."),
        );
    let terraform = terraform_over(&executor);
    let scenario = StagedApply::new(fixture_path()).bootstrap_target("module.vpc");

    let first = scenario.execute(&terraform).await.unwrap();
    let second = scenario.execute(&terraform).await.unwrap();

    assert!(first.passed());
    assert!(second.passed());
    assert_eq!(executor.invocations_of("destroy").len(), 2);
}

#[tokio::test]
async fn test_missing_fixture_fails_fast_without_invoking_terraform() {
    let executor = MockExecutor::new();
    let terraform = terraform_over(&executor);

    let result = StagedApply::new("/definitely/not/a/fixture")
        .execute(&terraform)
        .await;

    assert!(result.is_err());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn test_keep_resources_skips_teardown() {
    let executor = MockExecutor::new();
    let terraform = terraform_over(&executor);

    let report = StagedApply::new(fixture_path())
        .bootstrap_target("module.vpc")
        .keep_resources()
        .execute(&terraform)
        .await
        .unwrap();

    assert!(report.passed());
    assert!(!executor.was_invoked("destroy"));
}

#[tokio::test]
async fn test_scenario_without_bootstrap_targets_applies_once() {
    let executor = MockExecutor::new();
    let terraform = terraform_over(&executor);

    let report = StagedApply::new(fixture_path())
        .execute(&terraform)
        .await
        .unwrap();

    assert!(report.passed());
    assert_eq!(executor.subcommands(), vec!["init", "apply", "destroy"]);
}
